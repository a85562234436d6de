//! Bid creation and blinding.

use rand::{CryptoRng, RngCore};
use thiserror::Error;

use auction_types::{compute_bid_digest, Address, Amount, BidDigest, RevealEntry, Secret};

/// Errors that can occur during bid creation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BidError {
    #[error("Genuine bid of {amount} exceeds deposit of {deposit}")]
    Underfunded { amount: Amount, deposit: Amount },

    #[error("Deposit must be non-zero")]
    ZeroDeposit,
}

/// A prepared bid ready for submission.
#[derive(Debug, Clone)]
pub struct PreparedBid {
    /// Address the digest is bound to
    pub bidder: Address,
    /// Blinded commitment to submit
    pub digest: BidDigest,
    /// Secret used for blinding (keep until reveal)
    pub secret: Secret,
    /// Claimed bid amount (keep secret)
    pub amount: Amount,
    /// Value to attach to the submission
    pub deposit: Amount,
    /// `false` for decoy bids
    pub is_genuine: bool,
}

impl PreparedBid {
    /// The opening to send at reveal time.
    pub fn reveal_entry(&self) -> RevealEntry {
        RevealEntry::new(self.amount, self.is_genuine, self.secret)
    }
}

/// Create a blinded bid with a fresh random secret.
///
/// # Arguments
/// * `bidder` - Address that will submit and reveal the bid
/// * `amount` - The bid amount
/// * `deposit` - Value attached on submission
/// * `is_genuine` - `false` to create a decoy
/// * `rng` - Cryptographically secure random number generator
pub fn create_bid<R: RngCore + CryptoRng>(
    bidder: Address,
    amount: Amount,
    deposit: Amount,
    is_genuine: bool,
    rng: &mut R,
) -> Result<PreparedBid, BidError> {
    let mut secret = [0u8; 32];
    rng.fill_bytes(&mut secret);
    create_bid_with_secret(bidder, amount, deposit, is_genuine, Secret(secret))
}

/// Create a blinded bid with a caller-chosen secret.
///
/// Genuine bids larger than their deposit are rejected here, since the
/// auction would forfeit the deposit at reveal.
pub fn create_bid_with_secret(
    bidder: Address,
    amount: Amount,
    deposit: Amount,
    is_genuine: bool,
    secret: Secret,
) -> Result<PreparedBid, BidError> {
    if deposit == 0 {
        return Err(BidError::ZeroDeposit);
    }
    if is_genuine && amount > deposit {
        return Err(BidError::Underfunded { amount, deposit });
    }

    Ok(PreparedBid {
        bidder,
        digest: compute_bid_digest(&bidder, amount, is_genuine, &secret),
        secret,
        amount,
        deposit,
        is_genuine,
    })
}

/// Builder for creating bids with additional options.
pub struct BidBuilder {
    bidder: Address,
    amount: Amount,
    deposit: Option<Amount>,
    is_genuine: bool,
    secret: Option<Secret>,
}

impl BidBuilder {
    /// Create a new bid builder.
    pub fn new(bidder: Address) -> Self {
        Self {
            bidder,
            amount: 0,
            deposit: None,
            is_genuine: true,
            secret: None,
        }
    }

    /// Set the bid amount.
    pub fn amount(mut self, amount: Amount) -> Self {
        self.amount = amount;
        self
    }

    /// Set the deposit. Defaults to the amount.
    pub fn deposit(mut self, deposit: Amount) -> Self {
        self.deposit = Some(deposit);
        self
    }

    /// Mark the bid as a decoy.
    pub fn fake(mut self) -> Self {
        self.is_genuine = false;
        self
    }

    /// Use a fixed secret instead of a random one.
    pub fn secret(mut self, secret: Secret) -> Self {
        self.secret = Some(secret);
        self
    }

    /// Build the prepared bid.
    pub fn build<R: RngCore + CryptoRng>(self, rng: &mut R) -> Result<PreparedBid, BidError> {
        let deposit = self.deposit.unwrap_or(self.amount);
        match self.secret {
            Some(secret) => {
                create_bid_with_secret(self.bidder, self.amount, deposit, self.is_genuine, secret)
            }
            None => create_bid(self.bidder, self.amount, deposit, self.is_genuine, rng),
        }
    }
}

/// A bidder's prepared bids for one auction, in submission order.
///
/// The auction matches reveal entries to commitments by position, so the
/// book must be revealed in the same order the bids were submitted.
#[derive(Debug, Clone, Default)]
pub struct SealedBidBook {
    bids: Vec<PreparedBid>,
}

impl SealedBidBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a bid once it has been submitted.
    pub fn push(&mut self, bid: PreparedBid) {
        self.bids.push(bid);
    }

    pub fn bids(&self) -> &[PreparedBid] {
        &self.bids
    }

    pub fn len(&self) -> usize {
        self.bids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty()
    }

    /// Sum of all attached deposits.
    pub fn total_deposit(&self) -> Amount {
        self.bids.iter().map(|b| b.deposit).fold(0, Amount::saturating_add)
    }

    /// Openings for every bid, in submission order.
    pub fn reveal_entries(&self) -> Vec<RevealEntry> {
        self.bids.iter().map(PreparedBid::reveal_entry).collect()
    }

    /// Parallel amount/flag/secret lists, as the RPC reveal method takes them.
    pub fn reveal_arrays(&self) -> (Vec<Amount>, Vec<bool>, Vec<Secret>) {
        let amounts = self.bids.iter().map(|b| b.amount).collect();
        let flags = self.bids.iter().map(|b| b.is_genuine).collect();
        let secrets = self.bids.iter().map(|b| b.secret).collect();
        (amounts, flags, secrets)
    }
}
