//! Commitment store: per-bidder ordered sequences of blinded bids.

use std::collections::HashMap;

use auction_types::{Address, Amount, BidDigest, Commitment, RevealOutcome, Timestamp};

use crate::error::AuctionError;

/// Everything a single bidder has committed in one auction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BidderCommitments {
    /// Commitments in submission order
    pub commitments: Vec<Commitment>,
    /// Sum of all deposits attached by this bidder
    pub total_deposit: Amount,
    /// Set once the bidder has called reveal
    pub revealed: bool,
}

/// Commitments of all bidders in one auction.
#[derive(Clone, Debug, Default)]
pub struct CommitmentStore {
    accounts: HashMap<Address, BidderCommitments>,
    /// Bidders in order of first submission
    bidders: Vec<Address>,
}

impl CommitmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a commitment for `bidder`, returning their new total deposit.
    ///
    /// Phase gating is the caller's job.
    pub fn append(
        &mut self,
        bidder: Address,
        digest: BidDigest,
        deposit: Amount,
        submitted_at: Timestamp,
    ) -> Result<Amount, AuctionError> {
        if digest.is_empty() {
            return Err(AuctionError::EmptyDigest);
        }

        let current_total = self
            .accounts
            .get(&bidder)
            .map(|account| account.total_deposit)
            .unwrap_or(0);
        let total_deposit = current_total
            .checked_add(deposit)
            .ok_or(AuctionError::ArithmeticOverflow)?;

        if !self.accounts.contains_key(&bidder) {
            self.bidders.push(bidder);
        }
        let account = self.accounts.entry(bidder).or_default();
        account.commitments.push(Commitment {
            digest,
            deposit,
            submitted_at,
            outcome: None,
        });
        account.total_deposit = total_deposit;

        Ok(total_deposit)
    }

    /// Get a bidder's commitments.
    pub fn get(&self, bidder: &Address) -> Option<&BidderCommitments> {
        self.accounts.get(bidder)
    }

    /// Record reveal outcomes for the leading commitments and mark the bidder revealed.
    ///
    /// `outcomes[i]` applies to the i-th commitment; the rest stay unrevealed.
    pub fn mark_revealed(&mut self, bidder: &Address, outcomes: &[RevealOutcome]) {
        if let Some(account) = self.accounts.get_mut(bidder) {
            for (commitment, outcome) in account.commitments.iter_mut().zip(outcomes) {
                commitment.outcome = Some(*outcome);
            }
            account.revealed = true;
        }
    }

    /// Check whether a bidder already revealed.
    pub fn has_revealed(&self, bidder: &Address) -> bool {
        self.accounts
            .get(bidder)
            .map(|account| account.revealed)
            .unwrap_or(false)
    }

    /// Bidders in order of first submission.
    pub fn bidders(&self) -> &[Address] {
        &self.bidders
    }

    /// Total number of commitments across all bidders.
    pub fn commitment_count(&self) -> usize {
        self.accounts.values().map(|a| a.commitments.len()).sum()
    }
}
