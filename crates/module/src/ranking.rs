//! Bid ranking engine: a single leader slot.

use auction_types::{Address, Amount};

use crate::error::AuctionError;
use crate::escrow::EscrowLedger;

/// Current highest bid and its bidder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Leader {
    pub bidder: Address,
    pub amount: Amount,
}

/// Result of ranking one genuine bid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// The bid took the lead; `displaced` was refunded
    Leading { displaced: Option<Leader> },
    /// The bid did not beat the leader and was refunded
    Outbid,
}

#[derive(Clone, Debug, Default)]
pub struct BidRanking {
    leader: Option<Leader>,
}

impl BidRanking {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rank a genuine, fully funded bid.
    ///
    /// Only a strictly higher amount displaces the leader. The displaced leader
    /// (or the losing bidder) is credited in the same step.
    pub fn consider_bid(
        &mut self,
        bidder: Address,
        amount: Amount,
        ledger: &mut EscrowLedger,
    ) -> Result<Placement, AuctionError> {
        if amount <= self.highest_bid() {
            ledger.credit_refund(bidder, amount)?;
            return Ok(Placement::Outbid);
        }

        let displaced = self.leader;
        if let Some(previous) = displaced {
            ledger.credit_refund(previous.bidder, previous.amount)?;
        }
        self.leader = Some(Leader { bidder, amount });

        Ok(Placement::Leading { displaced })
    }

    pub fn leader(&self) -> Option<Leader> {
        self.leader
    }

    pub fn highest_bid(&self) -> Amount {
        self.leader.map(|l| l.amount).unwrap_or(0)
    }

    pub fn highest_bidder(&self) -> Option<Address> {
        self.leader.map(|l| l.bidder)
    }
}
