//! Sealed-bid domain auction module.
//!
//! This module implements the logic of commit-reveal ("blind") auctions for
//! resource names:
//!
//! - Blinded bid submission with deposits during the bidding phase
//! - Reveal of bids in submission order, with decoy bids and forfeiture
//! - Ranking with a single leader slot and refund of displaced leaders
//! - Pull-based escrow of refunds
//! - Finalization that registers the winner and pays the beneficiary
//!
//! # Architecture
//!
//! - `phase`, `commitments`, `reveal`, `ranking`, `escrow`: protocol components
//! - `auction`: one auction combining the components
//! - `registry`: naming registry seam and in-memory registry
//! - `call`: Message types for state-changing operations
//! - `handlers`: Entry points for processing calls
//! - `queries`: Read-only state access
//! - `state`: Module state holding all auctions
//! - `genesis`: Initial configuration
//! - `error`: Error types
//!
//! # Example
//!
//! ```ignore
//! use auction_module::{handlers, CallContext, ModuleState};
//!
//! let mut state = ModuleState::from_genesis(&genesis)?;
//! let ctx = CallContext { ... };
//!
//! // Open an auction for a name
//! handlers::handle_start_auction(&mut state, &ctx, "dns.ntu")?;
//!
//! // Submit a blinded bid; the attached value is the deposit
//! handlers::handle_submit_bid(&mut state, &ctx, "dns.ntu", digest)?;
//! ```

pub mod auction;
pub mod call;
pub mod commitments;
pub mod error;
pub mod escrow;
pub mod genesis;
pub mod handlers;
pub mod phase;
pub mod queries;
pub mod ranking;
pub mod registry;
pub mod reveal;
pub mod state;

pub use auction::{BlindAuction, RevealReport};
pub use call::AuctionCall;
pub use error::AuctionError;
pub use genesis::{AuctionGenesisConfig, DefaultAuctionParams};
pub use handlers::{CallContext, HandlerResult};
pub use queries::{AuctionQuery, AuctionQueryResponse, AuctionSummary, OwnerListing};
pub use registry::{DomainRegistry, OwnerRegistry, RegistryError};
pub use state::ModuleState;
