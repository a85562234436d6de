//! Auction module error types.

use thiserror::Error;

use auction_types::Phase;

/// Errors that can occur in the auction module.
///
/// Every error aborts only the call that raised it and leaves state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuctionError {
    #[error("Auction not found: {0}")]
    AuctionNotFound(String),

    #[error("Auction already exists or name is taken: {0}")]
    AuctionAlreadyExists(String),

    #[error("Invalid resource name")]
    InvalidResourceName,

    #[error("Invalid timing configuration")]
    InvalidTiming,

    #[error("Wrong phase. Required: {required}, current: {current}")]
    WrongPhase { required: Phase, current: Phase },

    #[error("Empty bid digest")]
    EmptyDigest,

    #[error("Malformed reveal: {0}")]
    MalformedReveal(String),

    #[error("Already revealed")]
    AlreadyRevealed,

    #[error("Already finalized")]
    AlreadyFinalized,

    #[error("Nothing to withdraw")]
    NothingToWithdraw,

    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    #[error("Registry error: {0}")]
    Registry(String),
}
