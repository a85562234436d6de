//! Reveal validator: checks an opening against a stored commitment.

use auction_types::{Address, Amount, Commitment, RevealEntry, RevealOutcome};

use crate::error::AuctionError;

/// Verdict for a single commitment/entry pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealVerdict {
    /// Opening does not reproduce the stored digest
    Mismatch,
    /// Valid decoy; the whole deposit is refundable
    Fake { refund: Amount },
    /// Valid genuine claim not covered by the deposit
    Underfunded,
    /// Valid genuine bid; `excess` is refundable whatever the ranking says
    Genuine { amount: Amount, excess: Amount },
}

impl RevealVerdict {
    /// Whether the opening matched its commitment and was honoured.
    pub fn is_valid(&self) -> bool {
        matches!(self, RevealVerdict::Fake { .. } | RevealVerdict::Genuine { .. })
    }

    pub fn outcome(&self) -> RevealOutcome {
        match self {
            RevealVerdict::Mismatch => RevealOutcome::Mismatch,
            RevealVerdict::Fake { .. } => RevealOutcome::Fake,
            RevealVerdict::Underfunded => RevealOutcome::Underfunded,
            RevealVerdict::Genuine { amount, .. } => RevealOutcome::Genuine { amount: *amount },
        }
    }
}

/// Check the shape of a reveal against the bidder's commitment count.
///
/// An empty reveal is refused rather than consuming the bidder's single
/// reveal, so the bidder can retry with their openings.
pub fn check_shape(
    entries: &[RevealEntry],
    commitment_count: usize,
) -> Result<(), AuctionError> {
    if entries.is_empty() {
        return Err(AuctionError::MalformedReveal("no entries supplied".into()));
    }
    if entries.len() > commitment_count {
        return Err(AuctionError::MalformedReveal(format!(
            "{} entries for {} commitments",
            entries.len(),
            commitment_count
        )));
    }
    Ok(())
}

/// Recompute the digest of `entry` and judge it against `commitment`.
pub fn validate_entry(
    bidder: &Address,
    commitment: &Commitment,
    entry: &RevealEntry,
) -> RevealVerdict {
    if entry.digest_for(bidder) != commitment.digest {
        return RevealVerdict::Mismatch;
    }

    if !entry.is_genuine {
        return RevealVerdict::Fake {
            refund: commitment.deposit,
        };
    }

    if entry.amount > commitment.deposit {
        return RevealVerdict::Underfunded;
    }

    RevealVerdict::Genuine {
        amount: entry.amount,
        excess: commitment.deposit - entry.amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auction_types::{compute_bid_digest, Secret};

    fn commitment(bidder: &Address, amount: Amount, genuine: bool, deposit: Amount) -> Commitment {
        Commitment {
            digest: compute_bid_digest(bidder, amount, genuine, &secret()),
            deposit,
            submitted_at: 0,
            outcome: None,
        }
    }

    fn secret() -> Secret {
        Secret::from_phrase("secret").unwrap()
    }

    #[test]
    fn test_genuine_with_excess() {
        let bidder = [1u8; 32];
        let c = commitment(&bidder, 80, true, 100);
        let verdict = validate_entry(&bidder, &c, &RevealEntry::new(80, true, secret()));

        assert_eq!(verdict, RevealVerdict::Genuine { amount: 80, excess: 20 });
        assert!(verdict.is_valid());
    }

    #[test]
    fn test_fake_refunds_whole_deposit() {
        let bidder = [1u8; 32];
        let c = commitment(&bidder, 50, false, 75);
        let verdict = validate_entry(&bidder, &c, &RevealEntry::new(50, false, secret()));

        assert_eq!(verdict, RevealVerdict::Fake { refund: 75 });
    }

    #[test]
    fn test_underfunded_claim() {
        let bidder = [1u8; 32];
        let c = commitment(&bidder, 300, true, 100);
        let verdict = validate_entry(&bidder, &c, &RevealEntry::new(300, true, secret()));

        assert_eq!(verdict, RevealVerdict::Underfunded);
        assert!(!verdict.is_valid());
    }

    #[test]
    fn test_mismatch_on_wrong_flag_or_bidder() {
        let bidder = [1u8; 32];
        let c = commitment(&bidder, 100, true, 100);

        let wrong_flag = validate_entry(&bidder, &c, &RevealEntry::new(100, false, secret()));
        assert_eq!(wrong_flag, RevealVerdict::Mismatch);

        let other_bidder = validate_entry(&[9u8; 32], &c, &RevealEntry::new(100, true, secret()));
        assert_eq!(other_bidder, RevealVerdict::Mismatch);
    }

    #[test]
    fn test_shape_checks() {
        let entry = RevealEntry::new(1, true, secret());
        assert!(matches!(check_shape(&[], 2), Err(AuctionError::MalformedReveal(_))));
        assert!(matches!(
            check_shape(&[entry.clone(), entry.clone()], 1),
            Err(AuctionError::MalformedReveal(_))
        ));
        assert!(check_shape(&[entry], 2).is_ok());
    }
}
