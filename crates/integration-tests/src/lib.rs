//! End-to-end integration tests for sealed-bid domain auctions.
//!
//! These tests exercise the full auction lifecycle through the module
//! handlers, with bids prepared by the client SDK:
//! 1. Auction start for a name
//! 2. Blinded bid submission with deposits
//! 3. Reveal, ranking and refunds
//! 4. Finalization into the name registry
//! 5. Refund withdrawal
