//! Client SDK for bidding in sealed-bid domain auctions.
//!
//! This crate provides a high-level API for:
//! - Creating blinded bids and decoys with random secrets
//! - Keeping a bidder's bids in submission order until reveal
//! - Producing the openings the auction expects at reveal time

pub mod bid;

pub use bid::{create_bid, create_bid_with_secret, BidBuilder, BidError, PreparedBid, SealedBidBook};
