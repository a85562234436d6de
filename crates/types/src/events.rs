//! Events emitted by the auction module and the settlement record.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::{Address, Amount, BidDigest, Timestamp};

/// Events emitted by auction operations.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub enum AuctionEvent {
    /// An auction was opened for a resource name.
    AuctionStarted {
        resource_name: String,
        bidding_deadline: Timestamp,
        reveal_deadline: Timestamp,
    },

    /// A blinded bid was stored. `total_deposit` is the bidder's running total.
    BidPlaced {
        bidder: Address,
        digest: BidDigest,
        total_deposit: Amount,
    },

    /// A bidder revealed. `refunded_amount` is what the call queued for them.
    Revealed {
        bidder: Address,
        refunded_amount: Amount,
        any_valid: bool,
    },

    /// A revealed bid took the lead.
    HighestBidIncreased { bidder: Address, amount: Amount },

    /// The auction was finalized.
    AuctionEnded {
        winner: Option<Address>,
        highest_bid: Amount,
        contract_balance: Amount,
    },

    /// Pending refunds were paid out.
    Withdrawn { bidder: Address, amount: Amount },
}

/// Auction settlement result
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct AuctionResult {
    pub resource_name: String,
    pub winner: Option<Address>,
    pub highest_bid: Amount,
    pub beneficiary: Address,
    /// Custody balance left after paying the beneficiary
    pub contract_balance: Amount,
    pub finalized_at: Timestamp,
}
