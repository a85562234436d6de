//! RPC-compatible types for the mock chain.
//!
//! These types are JSON-serializable versions of the core auction types, with
//! addresses, digests and secrets as hex strings.

use auction_module::queries::{AuctionSummary, OwnerListing};
use auction_module::RevealReport;
use auction_types::{AuctionEvent, AuctionResult, Commitment, RevealOutcome};
use serde::{Deserialize, Serialize};

/// Genesis configuration for RPC.
///
/// Unset fields keep the value the server was started with.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenesisConfigRpc {
    pub registry_address: Option<String>,
    pub bidding_time: Option<u64>,
    pub reveal_time: Option<u64>,
    pub initial_timestamp: Option<u64>,
}

/// Block info response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockInfo {
    pub height: u64,
    pub timestamp: u64,
}

/// Parameters for submitting a blinded bid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitBidParams {
    pub sender: String,
    pub resource_name: String,
    /// Hex-encoded digest (32 bytes)
    pub digest: String,
    pub deposit: u64,
}

/// Parameters for revealing bids, as parallel lists in submission order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealParams {
    pub sender: String,
    pub resource_name: String,
    pub amounts: Vec<u64>,
    pub genuine: Vec<bool>,
    /// Hex-encoded secrets (up to 32 bytes each)
    pub secrets: Vec<String>,
}

/// Outcome of a reveal call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealResultRpc {
    pub refunded_amount: u64,
    pub any_valid: bool,
    /// One of `genuine`, `fake`, `mismatch`, `underfunded` per entry
    pub outcomes: Vec<String>,
    pub leading: bool,
}

impl From<&RevealReport> for RevealResultRpc {
    fn from(r: &RevealReport) -> Self {
        Self {
            refunded_amount: r.refunded_amount,
            any_valid: r.any_valid,
            outcomes: r.outcomes.iter().map(outcome_name).collect(),
            leading: r.leader_changes.last().map_or(false, |l| l.bidder == r.bidder),
        }
    }
}

/// Auction summary for RPC responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionSummaryRpc {
    pub resource_name: String,
    pub beneficiary: String,
    pub phase: String,
    pub bidding_deadline: u64,
    pub reveal_deadline: u64,
    pub highest_bid: u64,
    pub highest_bidder: Option<String>,
    pub num_bidders: usize,
    pub num_commitments: usize,
    pub contract_balance: u64,
    pub ended: bool,
}

impl From<AuctionSummary> for AuctionSummaryRpc {
    fn from(s: AuctionSummary) -> Self {
        Self {
            resource_name: s.resource_name,
            beneficiary: hex::encode(s.beneficiary),
            phase: s.phase.to_string(),
            bidding_deadline: s.bidding_deadline,
            reveal_deadline: s.reveal_deadline,
            highest_bid: s.highest_bid,
            highest_bidder: s.highest_bidder.map(hex::encode),
            num_bidders: s.num_bidders,
            num_commitments: s.num_commitments,
            contract_balance: s.contract_balance,
            ended: s.ended,
        }
    }
}

/// Stored commitment for RPC responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitmentRpc {
    pub digest: String,
    pub deposit: u64,
    pub submitted_at: u64,
    pub outcome: Option<String>,
}

impl From<&Commitment> for CommitmentRpc {
    fn from(c: &Commitment) -> Self {
        Self {
            digest: hex::encode(c.digest.0),
            deposit: c.deposit,
            submitted_at: c.submitted_at,
            outcome: c.outcome.as_ref().map(outcome_name),
        }
    }
}

/// Auction result for RPC responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionResultRpc {
    pub resource_name: String,
    pub winner: Option<String>,
    pub highest_bid: u64,
    pub beneficiary: String,
    pub contract_balance: u64,
    pub finalized_at: u64,
}

impl From<AuctionResult> for AuctionResultRpc {
    fn from(r: AuctionResult) -> Self {
        Self {
            resource_name: r.resource_name,
            winner: r.winner.map(hex::encode),
            highest_bid: r.highest_bid,
            beneficiary: hex::encode(r.beneficiary),
            contract_balance: r.contract_balance,
            finalized_at: r.finalized_at,
        }
    }
}

/// Registry directory entry for RPC responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerListingRpc {
    pub owner: String,
    pub domains: Vec<String>,
}

impl From<OwnerListing> for OwnerListingRpc {
    fn from(l: OwnerListing) -> Self {
        Self {
            owner: hex::encode(l.owner),
            domains: l.domains,
        }
    }
}

/// Logged event for RPC responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRpc {
    pub timestamp: u64,
    pub kind: String,
    pub detail: String,
}

impl EventRpc {
    pub fn new(timestamp: u64, event: &AuctionEvent) -> Self {
        let (kind, detail) = match event {
            AuctionEvent::AuctionStarted {
                resource_name,
                bidding_deadline,
                reveal_deadline,
            } => (
                "auction_started",
                format!(
                    "{} bidding until {}, reveal until {}",
                    resource_name, bidding_deadline, reveal_deadline
                ),
            ),
            AuctionEvent::BidPlaced {
                bidder,
                digest,
                total_deposit,
            } => (
                "bid_placed",
                format!(
                    "{} committed {} (total deposit {})",
                    hex::encode(bidder),
                    hex::encode(digest.0),
                    total_deposit
                ),
            ),
            AuctionEvent::Revealed {
                bidder,
                refunded_amount,
                any_valid,
            } => (
                "revealed",
                format!(
                    "{} refunded {} (valid: {})",
                    hex::encode(bidder),
                    refunded_amount,
                    any_valid
                ),
            ),
            AuctionEvent::HighestBidIncreased { bidder, amount } => (
                "highest_bid_increased",
                format!("{} leads with {}", hex::encode(bidder), amount),
            ),
            AuctionEvent::AuctionEnded {
                winner,
                highest_bid,
                contract_balance,
            } => (
                "auction_ended",
                format!(
                    "winner {} at {}, balance {}",
                    winner.map(hex::encode).unwrap_or_else(|| "none".to_string()),
                    highest_bid,
                    contract_balance
                ),
            ),
            AuctionEvent::Withdrawn { bidder, amount } => (
                "withdrawn",
                format!("{} withdrew {}", hex::encode(bidder), amount),
            ),
        };
        Self {
            timestamp,
            kind: kind.to_string(),
            detail,
        }
    }
}

pub fn outcome_name(outcome: &RevealOutcome) -> String {
    match outcome {
        RevealOutcome::Genuine { .. } => "genuine",
        RevealOutcome::Fake => "fake",
        RevealOutcome::Mismatch => "mismatch",
        RevealOutcome::Underfunded => "underfunded",
    }
    .to_string()
}
