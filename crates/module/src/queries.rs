//! Query handlers for the auction module.
//!
//! These functions provide read-only access to auction state. Phase-dependent
//! answers take the current time explicitly.

use crate::auction::BlindAuction;
use crate::registry::OwnerRegistry;
use crate::state::ModuleState;
use auction_types::{Address, Amount, AuctionResult, Commitment, Phase, Timestamp};
use serde::{Deserialize, Serialize};

/// Query request types.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum AuctionQuery {
    /// Get auction summary by resource name.
    GetAuction { resource_name: String },

    /// Get all auctions (paginated, ordered by name).
    ListAuctions { offset: u64, limit: u64 },

    /// Get the current highest bid.
    GetHighestBid { resource_name: String },

    /// Get the current highest bidder.
    GetHighestBidder { resource_name: String },

    /// Get the current phase.
    GetPhase { resource_name: String },

    /// Get a bidder's commitments.
    GetCommitments {
        resource_name: String,
        bidder: Address,
    },

    /// Get a bidder's withdrawable refund.
    GetPendingRefund {
        resource_name: String,
        bidder: Address,
    },

    /// Get auction result.
    GetResult { resource_name: String },

    /// Resolve a name to its registered owner.
    Resolve { resource_name: String },

    /// Get the names owned by an address.
    GetDomains { owner: Address },

    /// Get the payouts received by an address.
    GetBalance { address: Address },

    /// List every owner with its names, in registration order.
    ListOwners,
}

/// Query response types.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionQueryResponse {
    Auction(Option<AuctionSummary>),
    AuctionList(Vec<AuctionSummary>),
    HighestBid(Option<Amount>),
    HighestBidder(Option<Address>),
    Phase(Option<Phase>),
    Commitments(Vec<Commitment>),
    PendingRefund(Amount),
    Result(Option<AuctionResult>),
    Owner(Option<Address>),
    Domains(Vec<String>),
    Balance(Amount),
    Owners(Vec<OwnerListing>),
}

/// Handle a query.
pub fn handle_query(
    state: &ModuleState,
    query: AuctionQuery,
    current_time: Timestamp,
) -> AuctionQueryResponse {
    match query {
        AuctionQuery::GetAuction { resource_name } => AuctionQueryResponse::Auction(
            state
                .get_auction(&resource_name)
                .map(|a| AuctionSummary::from_auction(a, current_time)),
        ),

        AuctionQuery::ListAuctions { offset, limit } => {
            AuctionQueryResponse::AuctionList(get_auction_summaries(
                state,
                offset as usize,
                limit as usize,
                current_time,
            ))
        }

        AuctionQuery::GetHighestBid { resource_name } => AuctionQueryResponse::HighestBid(
            state.get_auction(&resource_name).map(|a| a.highest_bid()),
        ),

        AuctionQuery::GetHighestBidder { resource_name } => AuctionQueryResponse::HighestBidder(
            state
                .get_auction(&resource_name)
                .and_then(|a| a.highest_bidder()),
        ),

        AuctionQuery::GetPhase { resource_name } => AuctionQueryResponse::Phase(
            state
                .get_auction(&resource_name)
                .map(|a| a.phase(current_time)),
        ),

        AuctionQuery::GetCommitments {
            resource_name,
            bidder,
        } => {
            let commitments = state
                .get_auction(&resource_name)
                .and_then(|a| a.commitments_of(&bidder))
                .map(|account| account.commitments.clone())
                .unwrap_or_default();
            AuctionQueryResponse::Commitments(commitments)
        }

        AuctionQuery::GetPendingRefund {
            resource_name,
            bidder,
        } => AuctionQueryResponse::PendingRefund(
            state
                .get_auction(&resource_name)
                .map(|a| a.pending_refund(&bidder))
                .unwrap_or(0),
        ),

        AuctionQuery::GetResult { resource_name } => AuctionQueryResponse::Result(
            state
                .get_auction(&resource_name)
                .and_then(|a| a.result().cloned()),
        ),

        AuctionQuery::Resolve { resource_name } => {
            AuctionQueryResponse::Owner(state.registry.resolve(&resource_name))
        }

        AuctionQuery::GetDomains { owner } => {
            AuctionQueryResponse::Domains(state.registry.domains_of(&owner))
        }

        AuctionQuery::GetBalance { address } => {
            AuctionQueryResponse::Balance(state.get_balance(&address))
        }

        AuctionQuery::ListOwners => AuctionQueryResponse::Owners(list_owners(state)),
    }
}

/// An owner and the names registered to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerListing {
    pub owner: Address,
    pub domains: Vec<String>,
}

/// Directory of owners, in order of their first registration.
pub fn list_owners(state: &ModuleState) -> Vec<OwnerListing> {
    let registry = &state.registry;
    registry
        .owners()
        .iter()
        .map(|owner| OwnerListing {
            owner: *owner,
            domains: (0..registry.domain_count(owner))
                .filter_map(|index| registry.domain_at(owner, index))
                .map(str::to_string)
                .collect(),
        })
        .collect()
}

/// Summary of an auction for listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionSummary {
    pub resource_name: String,
    pub beneficiary: Address,
    pub phase: Phase,
    pub bidding_deadline: Timestamp,
    pub reveal_deadline: Timestamp,
    pub highest_bid: Amount,
    pub highest_bidder: Option<Address>,
    pub num_bidders: usize,
    pub num_commitments: usize,
    pub contract_balance: Amount,
    pub ended: bool,
}

impl AuctionSummary {
    /// Create summary from an auction at `current_time`.
    pub fn from_auction(auction: &BlindAuction, current_time: Timestamp) -> Self {
        let config = auction.config();
        Self {
            resource_name: config.resource_name.clone(),
            beneficiary: config.beneficiary,
            phase: auction.phase(current_time),
            bidding_deadline: config.bidding_deadline,
            reveal_deadline: config.reveal_deadline,
            highest_bid: auction.highest_bid(),
            highest_bidder: auction.highest_bidder(),
            num_bidders: auction.bidders().len(),
            num_commitments: auction.commitment_count(),
            contract_balance: auction.contract_balance(),
            ended: auction.is_ended(),
        }
    }
}

/// Get auction summaries for listing.
pub fn get_auction_summaries(
    state: &ModuleState,
    offset: usize,
    limit: usize,
    current_time: Timestamp,
) -> Vec<AuctionSummary> {
    state
        .auctions
        .values()
        .skip(offset)
        .take(limit)
        .map(|auction| AuctionSummary::from_auction(auction, current_time))
        .collect()
}

/// Get auctions currently in `phase`.
pub fn list_auctions_in_phase(
    state: &ModuleState,
    current_time: Timestamp,
    phase: Phase,
) -> Vec<AuctionSummary> {
    state
        .auctions
        .values()
        .filter(|auction| auction.phase(current_time) == phase)
        .map(|auction| AuctionSummary::from_auction(auction, current_time))
        .collect()
}

/// Get auctions past their reveal deadline that nobody has finalized yet.
pub fn get_pending_finalization(state: &ModuleState, current_time: Timestamp) -> Vec<String> {
    state
        .auctions
        .values()
        .filter(|auction| !auction.is_ended() && auction.phase(current_time) == Phase::Ended)
        .map(|auction| auction.resource_name().to_string())
        .collect()
}
