//! Core type definitions for sealed-bid domain auctions.
//!
//! This crate provides the shared data structures used across the auction system:
//! bid digests and secrets, auction configuration, protocol phases, reveal
//! entries and the events emitted by the auction module.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use std::fmt;
use thiserror::Error;

pub mod events;

pub use events::{AuctionEvent, AuctionResult};

// =========================
// PRIMITIVES
// =========================

/// Generic address type (32 bytes)
pub type Address = [u8; 32];

/// Amount of funds in base units
pub type Amount = u64;

/// Unix timestamp in seconds
pub type Timestamp = u64;

/// Domain separation tag for bid digests
pub const BID_DIGEST_TAG: &[u8] = b"BLIND_BID_V1:";

/// Errors raised while building core values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    #[error("Secret too long: {len} bytes, at most 32 allowed")]
    SecretTooLong { len: usize },
}

/// Blinded bid commitment (SHA-256 output)
#[serde_as]
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
pub struct BidDigest(#[serde_as(as = "Hex")] pub [u8; 32]);

impl BidDigest {
    /// The all-zero digest, which is never a valid commitment.
    pub const EMPTY: BidDigest = BidDigest([0u8; 32]);

    pub fn is_empty(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

/// Bidder-chosen secret blinding a bid (32 bytes)
#[serde_as]
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
pub struct Secret(#[serde_as(as = "Hex")] pub [u8; 32]);

impl Secret {
    /// Build a secret from a short phrase, right-padded with zeros.
    pub fn from_phrase(phrase: &str) -> Result<Self, TypesError> {
        Self::from_slice(phrase.as_bytes())
    }

    /// Build a secret from at most 32 bytes, right-padded with zeros.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypesError> {
        if bytes.len() > 32 {
            return Err(TypesError::SecretTooLong { len: bytes.len() });
        }
        let mut secret = [0u8; 32];
        secret[..bytes.len()].copy_from_slice(bytes);
        Ok(Self(secret))
    }
}

// =========================
// AUCTION TYPES
// =========================

/// Protocol phase, derived from the clock and the `ended` flag.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
pub enum Phase {
    /// Before the bidding deadline: commitments are accepted
    AcceptingBids,
    /// Between the bidding and reveal deadlines
    RevealWindow,
    /// Reveal deadline passed, or the auction was finalized
    Ended,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::AcceptingBids => "accepting_bids",
            Phase::RevealWindow => "reveal_window",
            Phase::Ended => "ended",
        };
        f.write_str(name)
    }
}

/// Full auction configuration
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct AuctionConfig {
    /// Name of the resource (domain) being auctioned
    pub resource_name: String,
    /// Receives the winning amount on finalization
    pub beneficiary: Address,

    // Timing
    pub started_at: Timestamp,
    pub bidding_deadline: Timestamp,
    pub reveal_deadline: Timestamp,
}

/// What a reveal established about one commitment.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub enum RevealOutcome {
    /// Genuine and fundable; the amount went to ranking
    Genuine { amount: Amount },
    /// Declared decoy; deposit refunded
    Fake,
    /// Opening did not match the digest; deposit forfeited
    Mismatch,
    /// Genuine claim larger than the deposit; deposit forfeited
    Underfunded,
}

/// A blinded bid stored during the bidding phase
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Commitment {
    pub digest: BidDigest,
    pub deposit: Amount,
    pub submitted_at: Timestamp,
    /// `None` until revealed; stays `None` for forfeited unrevealed bids
    pub outcome: Option<RevealOutcome>,
}

/// One opening supplied at reveal time, matched to commitments in order.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct RevealEntry {
    pub amount: Amount,
    pub is_genuine: bool,
    pub secret: Secret,
}

impl RevealEntry {
    pub fn new(amount: Amount, is_genuine: bool, secret: Secret) -> Self {
        Self {
            amount,
            is_genuine,
            secret,
        }
    }

    /// Combine parallel amount/flag/secret sequences.
    ///
    /// Returns `None` if the sequences differ in length.
    pub fn zip(amounts: &[Amount], flags: &[bool], secrets: &[Secret]) -> Option<Vec<Self>> {
        if amounts.len() != flags.len() || amounts.len() != secrets.len() {
            return None;
        }
        Some(
            amounts
                .iter()
                .zip(flags)
                .zip(secrets)
                .map(|((amount, flag), secret)| Self::new(*amount, *flag, *secret))
                .collect(),
        )
    }

    /// Digest this entry opens for the given bidder.
    pub fn digest_for(&self, bidder: &Address) -> BidDigest {
        compute_bid_digest(bidder, self.amount, self.is_genuine, &self.secret)
    }
}

// =========================
// HELPER FUNCTIONS
// =========================

/// Compute the blinded digest of a bid.
///
/// Binds the bidder address so that a digest cannot be replayed by another bidder.
pub fn compute_bid_digest(
    bidder: &Address,
    amount: Amount,
    is_genuine: bool,
    secret: &Secret,
) -> BidDigest {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(BID_DIGEST_TAG);
    hasher.update(bidder);
    hasher.update(amount.to_be_bytes());
    hasher.update([is_genuine as u8]);
    hasher.update(secret.0);
    BidDigest(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bid_digest_binds_every_field() {
        let bidder = [1u8; 32];
        let secret = Secret::from_phrase("secret").unwrap();
        let base = compute_bid_digest(&bidder, 100, true, &secret);

        assert_ne!(base, compute_bid_digest(&bidder, 101, true, &secret));
        assert_ne!(base, compute_bid_digest(&bidder, 100, false, &secret));
        assert_ne!(
            base,
            compute_bid_digest(&bidder, 100, true, &Secret::from_phrase("other").unwrap())
        );
        assert_ne!(base, compute_bid_digest(&[2u8; 32], 100, true, &secret));
        assert_eq!(base, compute_bid_digest(&bidder, 100, true, &secret));
        assert!(!base.is_empty());
    }

    #[test]
    fn test_secret_from_phrase_pads() {
        let secret = Secret::from_phrase("secret").unwrap();
        assert_eq!(&secret.0[..6], b"secret");
        assert!(secret.0[6..].iter().all(|b| *b == 0));

        let long = "x".repeat(33);
        assert_eq!(
            Secret::from_phrase(&long),
            Err(TypesError::SecretTooLong { len: 33 })
        );
    }

    #[test]
    fn test_reveal_entry_zip_length_mismatch() {
        let secret = Secret::default();
        assert!(RevealEntry::zip(&[1, 2], &[true], &[secret, secret]).is_none());

        let entries = RevealEntry::zip(&[1, 2], &[true, false], &[secret, secret]).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(!entries[1].is_genuine);
    }

    #[test]
    fn test_digest_serializes_as_hex() {
        let digest = BidDigest([0xabu8; 32]);
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(json, format!("\"{}\"", "ab".repeat(32)));
        let decoded: BidDigest = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, digest);
    }

    #[test]
    fn test_commitment_borsh_roundtrip() {
        let commitment = Commitment {
            digest: BidDigest([7u8; 32]),
            deposit: 250,
            submitted_at: 12,
            outcome: Some(RevealOutcome::Genuine { amount: 200 }),
        };
        let encoded = borsh::to_vec(&commitment).unwrap();
        let decoded: Commitment = borsh::from_slice(&encoded).unwrap();
        assert_eq!(commitment, decoded);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::RevealWindow.to_string(), "reveal_window");
    }
}
