//! A single sealed-bid auction for one resource name.
//!
//! `BlindAuction` ties the phase clock, commitment store, reveal validator,
//! ranking engine and escrow ledger together. Every operation takes the
//! current time explicitly and either applies all of its effects or none.

use auction_types::{
    Address, Amount, AuctionConfig, AuctionEvent, AuctionResult, BidDigest, Phase, RevealEntry,
    RevealOutcome, Timestamp,
};

use crate::commitments::{BidderCommitments, CommitmentStore};
use crate::error::AuctionError;
use crate::escrow::EscrowLedger;
use crate::phase::PhaseClock;
use crate::ranking::{BidRanking, Leader, Placement};
use crate::registry::OwnerRegistry;
use crate::reveal::{check_shape, validate_entry, RevealVerdict};

/// What a successful reveal did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevealReport {
    pub bidder: Address,
    /// Increase of the bidder's pending refund caused by this reveal
    pub refunded_amount: Amount,
    /// At least one entry was a valid fake or genuine bid
    pub any_valid: bool,
    /// One outcome per supplied entry
    pub outcomes: Vec<RevealOutcome>,
    /// Leaders installed by this reveal, in order
    pub leader_changes: Vec<Leader>,
}

impl RevealReport {
    /// Events in emission order: leadership changes, then the reveal itself.
    pub fn events(&self) -> Vec<AuctionEvent> {
        let mut events: Vec<AuctionEvent> = self
            .leader_changes
            .iter()
            .map(|leader| AuctionEvent::HighestBidIncreased {
                bidder: leader.bidder,
                amount: leader.amount,
            })
            .collect();
        events.push(AuctionEvent::Revealed {
            bidder: self.bidder,
            refunded_amount: self.refunded_amount,
            any_valid: self.any_valid,
        });
        events
    }
}

#[derive(Clone, Debug)]
pub struct BlindAuction {
    config: AuctionConfig,
    clock: PhaseClock,
    ended: bool,
    commitments: CommitmentStore,
    ranking: BidRanking,
    ledger: EscrowLedger,
    result: Option<AuctionResult>,
}

impl BlindAuction {
    /// Create an auction. Fails with `InvalidTiming` unless the bidding
    /// deadline is strictly before the reveal deadline.
    pub fn new(config: AuctionConfig) -> Result<Self, AuctionError> {
        if config.resource_name.is_empty() {
            return Err(AuctionError::InvalidResourceName);
        }
        let clock = PhaseClock::from_config(&config)?;
        Ok(Self {
            config,
            clock,
            ended: false,
            commitments: CommitmentStore::new(),
            ranking: BidRanking::new(),
            ledger: EscrowLedger::new(),
            result: None,
        })
    }

    /// Store a blinded bid together with its deposit.
    pub fn submit_bid(
        &mut self,
        now: Timestamp,
        bidder: Address,
        digest: BidDigest,
        deposit: Amount,
    ) -> Result<AuctionEvent, AuctionError> {
        self.clock.require(now, self.ended, Phase::AcceptingBids)?;
        if digest.is_empty() {
            return Err(AuctionError::EmptyDigest);
        }

        let mut ledger = self.ledger.clone();
        ledger.deposit(deposit)?;
        let total_deposit = self.commitments.append(bidder, digest, deposit, now)?;
        self.ledger = ledger;

        Ok(AuctionEvent::BidPlaced {
            bidder,
            digest,
            total_deposit,
        })
    }

    /// Open the bidder's commitments in submission order.
    ///
    /// Mismatched and underfunded entries forfeit their deposit without failing
    /// the call. Commitments past the last entry stay sealed and are forfeited.
    pub fn reveal(
        &mut self,
        now: Timestamp,
        bidder: Address,
        entries: &[RevealEntry],
    ) -> Result<RevealReport, AuctionError> {
        self.clock.require(now, self.ended, Phase::RevealWindow)?;
        if self.commitments.has_revealed(&bidder) {
            return Err(AuctionError::AlreadyRevealed);
        }

        let stored = self
            .commitments
            .get(&bidder)
            .map(|account| account.commitments.as_slice())
            .unwrap_or(&[]);
        check_shape(entries, stored.len())?;

        // Work on copies so a failure part-way leaves the auction untouched.
        let mut ranking = self.ranking.clone();
        let mut ledger = self.ledger.clone();
        let refund_before = ledger.pending_refund(&bidder);

        let mut outcomes = Vec::with_capacity(entries.len());
        let mut leader_changes = Vec::new();
        let mut any_valid = false;

        for (commitment, entry) in stored.iter().zip(entries) {
            let verdict = validate_entry(&bidder, commitment, entry);
            match verdict {
                RevealVerdict::Fake { refund } => ledger.credit_refund(bidder, refund)?,
                RevealVerdict::Genuine { amount, excess } => {
                    ledger.credit_refund(bidder, excess)?;
                    if let Placement::Leading { .. } =
                        ranking.consider_bid(bidder, amount, &mut ledger)?
                    {
                        leader_changes.push(Leader { bidder, amount });
                    }
                }
                RevealVerdict::Mismatch | RevealVerdict::Underfunded => {}
            }
            any_valid |= verdict.is_valid();
            outcomes.push(verdict.outcome());
        }

        let refunded_amount = ledger
            .pending_refund(&bidder)
            .saturating_sub(refund_before);

        self.ranking = ranking;
        self.ledger = ledger;
        self.commitments.mark_revealed(&bidder, &outcomes);

        Ok(RevealReport {
            bidder,
            refunded_amount,
            any_valid,
            outcomes,
            leader_changes,
        })
    }

    /// End the auction: register the winner and pay the beneficiary.
    ///
    /// With no genuine revealed bid nothing is registered and nothing is paid.
    pub fn finalize(
        &mut self,
        now: Timestamp,
        registry: &mut dyn OwnerRegistry,
    ) -> Result<AuctionEvent, AuctionError> {
        if self.ended {
            return Err(AuctionError::AlreadyFinalized);
        }
        self.clock.require(now, false, Phase::Ended)?;

        let winner = self.ranking.highest_bidder();
        let highest_bid = self.ranking.highest_bid();

        let mut ledger = self.ledger.clone();
        ledger.release(highest_bid)?;

        if let Some(winner) = winner {
            registry
                .register_owner(&self.config.resource_name, winner)
                .map_err(|e| AuctionError::Registry(e.to_string()))?;
        }

        self.ledger = ledger;
        self.ended = true;

        let contract_balance = self.ledger.custody();
        self.result = Some(AuctionResult {
            resource_name: self.config.resource_name.clone(),
            winner,
            highest_bid,
            beneficiary: self.config.beneficiary,
            contract_balance,
            finalized_at: now,
        });

        Ok(AuctionEvent::AuctionEnded {
            winner,
            highest_bid,
            contract_balance,
        })
    }

    /// Pay out everything queued for `bidder`.
    pub fn withdraw(
        &mut self,
        now: Timestamp,
        bidder: Address,
    ) -> Result<AuctionEvent, AuctionError> {
        self.clock.require(now, self.ended, Phase::Ended)?;
        let amount = self.ledger.withdraw(&bidder)?;
        Ok(AuctionEvent::Withdrawn { bidder, amount })
    }

    // === Queries ===

    pub fn config(&self) -> &AuctionConfig {
        &self.config
    }

    pub fn resource_name(&self) -> &str {
        &self.config.resource_name
    }

    pub fn phase(&self, now: Timestamp) -> Phase {
        self.clock.current_phase(now, self.ended)
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn highest_bid(&self) -> Amount {
        self.ranking.highest_bid()
    }

    pub fn highest_bidder(&self) -> Option<Address> {
        self.ranking.highest_bidder()
    }

    pub fn commitments_of(&self, bidder: &Address) -> Option<&BidderCommitments> {
        self.commitments.get(bidder)
    }

    pub fn bidders(&self) -> &[Address] {
        self.commitments.bidders()
    }

    pub fn commitment_count(&self) -> usize {
        self.commitments.commitment_count()
    }

    pub fn pending_refund(&self, bidder: &Address) -> Amount {
        self.ledger.pending_refund(bidder)
    }

    /// Funds currently held by the auction.
    pub fn contract_balance(&self) -> Amount {
        self.ledger.custody()
    }

    pub fn total_deposited(&self) -> Amount {
        self.ledger.total_deposited()
    }

    pub fn result(&self) -> Option<&AuctionResult> {
        self.result.as_ref()
    }

    /// Amount reserved for the current leader until finalization.
    fn held_for_leader(&self) -> Amount {
        if self.ended {
            0
        } else {
            self.ranking.highest_bid()
        }
    }

    /// Custody not owed to anyone: unrevealed, mismatched and underfunded deposits.
    pub fn forfeited(&self) -> Amount {
        self.ledger
            .custody()
            .saturating_sub(self.ledger.pending_total())
            .saturating_sub(self.held_for_leader())
    }

    /// Pending refunds plus the leader's reserved amount are covered by custody.
    pub fn is_solvent(&self) -> bool {
        self.ledger
            .pending_total()
            .checked_add(self.held_for_leader())
            .map(|owed| owed <= self.ledger.custody())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::DomainRegistry;
    use auction_types::{compute_bid_digest, Secret};

    const BENEFICIARY: Address = [9u8; 32];
    const BIDDER1: Address = [1u8; 32];
    const BIDDER2: Address = [2u8; 32];
    const BIDDER3: Address = [3u8; 32];

    const BIDDING_END: Timestamp = 10;
    const REVEAL_END: Timestamp = 20;
    const DURING_BIDDING: Timestamp = 5;
    const DURING_REVEAL: Timestamp = 15;
    const AFTER_REVEAL: Timestamp = 25;

    fn secret() -> Secret {
        Secret::from_phrase("secret").unwrap()
    }

    fn new_auction() -> BlindAuction {
        BlindAuction::new(AuctionConfig {
            resource_name: "dns.ntu".to_string(),
            beneficiary: BENEFICIARY,
            started_at: 0,
            bidding_deadline: BIDDING_END,
            reveal_deadline: REVEAL_END,
        })
        .unwrap()
    }

    fn bid(
        auction: &mut BlindAuction,
        bidder: Address,
        amount: Amount,
        genuine: bool,
        deposit: Amount,
    ) {
        let digest = compute_bid_digest(&bidder, amount, genuine, &secret());
        auction
            .submit_bid(DURING_BIDDING, bidder, digest, deposit)
            .unwrap();
    }

    fn entry(amount: Amount, genuine: bool) -> RevealEntry {
        RevealEntry::new(amount, genuine, secret())
    }

    #[test]
    fn test_two_bidders_with_decoy() {
        let mut auction = new_auction();
        let mut registry = DomainRegistry::new();

        bid(&mut auction, BIDDER1, 100, true, 100);
        bid(&mut auction, BIDDER2, 200, true, 200);
        let digest = compute_bid_digest(&BIDDER2, 50, false, &secret());
        let placed = auction
            .submit_bid(DURING_BIDDING, BIDDER2, digest, 50)
            .unwrap();
        assert_eq!(
            placed,
            AuctionEvent::BidPlaced {
                bidder: BIDDER2,
                digest,
                total_deposit: 250,
            }
        );

        let first = auction
            .reveal(DURING_REVEAL, BIDDER1, &[entry(100, true)])
            .unwrap();
        assert_eq!(first.refunded_amount, 0);
        assert!(first.any_valid);
        assert_eq!(auction.highest_bidder(), Some(BIDDER1));

        let second = auction
            .reveal(DURING_REVEAL, BIDDER2, &[entry(200, true), entry(50, false)])
            .unwrap();
        assert_eq!(second.refunded_amount, 50);
        assert!(second.any_valid);
        assert_eq!(
            second.outcomes,
            vec![RevealOutcome::Genuine { amount: 200 }, RevealOutcome::Fake]
        );
        assert_eq!(auction.pending_refund(&BIDDER1), 100);
        assert_eq!(auction.pending_refund(&BIDDER2), 50);
        assert!(auction.is_solvent());

        let ended = auction.finalize(AFTER_REVEAL, &mut registry).unwrap();
        assert_eq!(
            ended,
            AuctionEvent::AuctionEnded {
                winner: Some(BIDDER2),
                highest_bid: 200,
                contract_balance: 150,
            }
        );
        assert_eq!(registry.resolve("dns.ntu"), Some(BIDDER2));

        assert_eq!(
            auction.withdraw(AFTER_REVEAL, BIDDER1),
            Ok(AuctionEvent::Withdrawn {
                bidder: BIDDER1,
                amount: 100
            })
        );
        assert_eq!(
            auction.withdraw(AFTER_REVEAL, BIDDER2),
            Ok(AuctionEvent::Withdrawn {
                bidder: BIDDER2,
                amount: 50
            })
        );
        assert_eq!(auction.contract_balance(), 0);
        assert_eq!(auction.forfeited(), 0);
    }

    #[test]
    fn test_reveal_order_does_not_change_winner() {
        let mut auction = new_auction();
        let mut registry = DomainRegistry::new();

        bid(&mut auction, BIDDER1, 100, true, 100);
        bid(&mut auction, BIDDER2, 200, true, 200);

        auction
            .reveal(DURING_REVEAL, BIDDER2, &[entry(200, true)])
            .unwrap();
        let late = auction
            .reveal(DURING_REVEAL, BIDDER1, &[entry(100, true)])
            .unwrap();

        assert_eq!(late.refunded_amount, 100);
        assert!(late.leader_changes.is_empty());
        assert_eq!(auction.highest_bidder(), Some(BIDDER2));

        auction.finalize(AFTER_REVEAL, &mut registry).unwrap();
        assert_eq!(auction.pending_refund(&BIDDER1), 100);
        assert_eq!(auction.contract_balance(), 100);
    }

    #[test]
    fn test_tie_goes_to_first_revealer() {
        let mut auction = new_auction();

        bid(&mut auction, BIDDER1, 100, true, 100);
        bid(&mut auction, BIDDER2, 100, true, 100);

        auction
            .reveal(DURING_REVEAL, BIDDER2, &[entry(100, true)])
            .unwrap();
        auction
            .reveal(DURING_REVEAL, BIDDER1, &[entry(100, true)])
            .unwrap();

        assert_eq!(auction.highest_bidder(), Some(BIDDER2));
        assert_eq!(auction.pending_refund(&BIDDER1), 100);
    }

    #[test]
    fn test_underfunded_claim_is_forfeited() {
        let mut auction = new_auction();

        bid(&mut auction, BIDDER1, 500, true, 100);
        let report = auction
            .reveal(DURING_REVEAL, BIDDER1, &[entry(500, true)])
            .unwrap();

        assert_eq!(report.outcomes, vec![RevealOutcome::Underfunded]);
        assert!(!report.any_valid);
        assert_eq!(report.refunded_amount, 0);
        assert_eq!(auction.highest_bidder(), None);
        assert_eq!(auction.forfeited(), 100);
    }

    #[test]
    fn test_excess_deposit_refunded_even_when_leading() {
        let mut auction = new_auction();

        bid(&mut auction, BIDDER1, 80, true, 300);
        let report = auction
            .reveal(DURING_REVEAL, BIDDER1, &[entry(80, true)])
            .unwrap();

        assert_eq!(report.refunded_amount, 220);
        assert_eq!(auction.highest_bid(), 80);
        assert!(auction.is_solvent());
    }

    #[test]
    fn test_mismatch_and_unrevealed_are_forfeited() {
        let mut auction = new_auction();
        let mut registry = DomainRegistry::new();

        bid(&mut auction, BIDDER1, 100, true, 100);
        bid(&mut auction, BIDDER1, 40, false, 40);
        bid(&mut auction, BIDDER2, 70, true, 70);

        let report = auction
            .reveal(
                DURING_REVEAL,
                BIDDER1,
                &[RevealEntry::new(100, true, Secret::from_phrase("wrong").unwrap())],
            )
            .unwrap();
        assert_eq!(report.outcomes, vec![RevealOutcome::Mismatch]);
        assert!(!report.any_valid);

        let sealed = auction.commitments_of(&BIDDER1).unwrap();
        assert_eq!(sealed.commitments[1].outcome, None);

        // BIDDER2 never reveals.
        let ended = auction.finalize(AFTER_REVEAL, &mut registry).unwrap();
        assert_eq!(
            ended,
            AuctionEvent::AuctionEnded {
                winner: None,
                highest_bid: 0,
                contract_balance: 210,
            }
        );
        assert_eq!(registry.resolve("dns.ntu"), None);
        assert_eq!(auction.forfeited(), 210);
        assert_eq!(
            auction.withdraw(AFTER_REVEAL, BIDDER1),
            Err(AuctionError::NothingToWithdraw)
        );
    }

    #[test]
    fn test_own_higher_bid_refunds_own_lower_bid() {
        let mut auction = new_auction();

        bid(&mut auction, BIDDER1, 100, true, 100);
        bid(&mut auction, BIDDER1, 150, true, 150);
        let report = auction
            .reveal(DURING_REVEAL, BIDDER1, &[entry(100, true), entry(150, true)])
            .unwrap();

        assert_eq!(report.leader_changes.len(), 2);
        assert_eq!(report.refunded_amount, 100);
        assert_eq!(auction.highest_bid(), 150);
        assert!(auction.is_solvent());
    }

    #[test]
    fn test_submit_after_deadline_leaves_balances() {
        let mut auction = new_auction();
        bid(&mut auction, BIDDER1, 100, true, 100);

        let digest = compute_bid_digest(&BIDDER2, 100, true, &secret());
        let result = auction.submit_bid(BIDDING_END, BIDDER2, digest, 100);

        assert_eq!(
            result,
            Err(AuctionError::WrongPhase {
                required: Phase::AcceptingBids,
                current: Phase::RevealWindow,
            })
        );
        assert_eq!(auction.contract_balance(), 100);
        assert!(auction.commitments_of(&BIDDER2).is_none());
    }

    #[test]
    fn test_empty_digest_rejected() {
        let mut auction = new_auction();
        let result = auction.submit_bid(DURING_BIDDING, BIDDER1, BidDigest::EMPTY, 100);

        assert_eq!(result, Err(AuctionError::EmptyDigest));
        assert_eq!(auction.contract_balance(), 0);
    }

    #[test]
    fn test_reveal_guards() {
        let mut auction = new_auction();
        bid(&mut auction, BIDDER1, 100, true, 100);

        assert!(matches!(
            auction.reveal(DURING_BIDDING, BIDDER1, &[entry(100, true)]),
            Err(AuctionError::WrongPhase { .. })
        ));
        assert!(matches!(
            auction.reveal(DURING_REVEAL, BIDDER1, &[entry(100, true), entry(1, false)]),
            Err(AuctionError::MalformedReveal(_))
        ));
        assert!(matches!(
            auction.reveal(DURING_REVEAL, BIDDER3, &[entry(100, true)]),
            Err(AuctionError::MalformedReveal(_))
        ));
        assert!(!auction.commitments_of(&BIDDER1).unwrap().revealed);

        auction
            .reveal(DURING_REVEAL, BIDDER1, &[entry(100, true)])
            .unwrap();
        assert_eq!(
            auction.reveal(DURING_REVEAL, BIDDER1, &[entry(100, true)]),
            Err(AuctionError::AlreadyRevealed)
        );
        assert!(matches!(
            auction.reveal(AFTER_REVEAL, BIDDER1, &[entry(100, true)]),
            Err(AuctionError::WrongPhase { .. })
        ));
    }

    #[test]
    fn test_empty_reveal_can_be_retried() {
        let mut auction = new_auction();
        bid(&mut auction, BIDDER1, 100, true, 100);

        assert!(matches!(
            auction.reveal(DURING_REVEAL, BIDDER1, &[]),
            Err(AuctionError::MalformedReveal(_))
        ));
        assert!(!auction.commitments_of(&BIDDER1).unwrap().revealed);
        assert_eq!(auction.highest_bid(), 0);

        let report = auction
            .reveal(DURING_REVEAL, BIDDER1, &[entry(100, true)])
            .unwrap();
        assert!(report.any_valid);
        assert_eq!(auction.highest_bidder(), Some(BIDDER1));
    }

    #[test]
    fn test_finalize_guards() {
        let mut auction = new_auction();
        let mut registry = DomainRegistry::new();

        assert_eq!(
            auction.finalize(DURING_REVEAL, &mut registry),
            Err(AuctionError::WrongPhase {
                required: Phase::Ended,
                current: Phase::RevealWindow,
            })
        );
        assert!(!auction.is_ended());

        auction.finalize(REVEAL_END, &mut registry).unwrap();
        assert_eq!(
            auction.finalize(AFTER_REVEAL, &mut registry),
            Err(AuctionError::AlreadyFinalized)
        );
        assert_eq!(auction.phase(DURING_BIDDING), Phase::Ended);
    }

    #[test]
    fn test_finalize_rolls_back_when_registry_refuses() {
        let mut auction = new_auction();
        let mut registry = DomainRegistry::new();
        registry.register_owner("dns.ntu", BIDDER3).unwrap();

        bid(&mut auction, BIDDER1, 100, true, 100);
        auction
            .reveal(DURING_REVEAL, BIDDER1, &[entry(100, true)])
            .unwrap();

        let result = auction.finalize(AFTER_REVEAL, &mut registry);
        assert!(matches!(result, Err(AuctionError::Registry(_))));
        assert!(!auction.is_ended());
        assert_eq!(auction.contract_balance(), 100);
        assert!(auction.result().is_none());
    }

    #[test]
    fn test_withdraw_before_end_rejected() {
        let mut auction = new_auction();
        bid(&mut auction, BIDDER1, 10, false, 10);
        auction
            .reveal(DURING_REVEAL, BIDDER1, &[entry(10, false)])
            .unwrap();

        assert!(matches!(
            auction.withdraw(DURING_REVEAL, BIDDER1),
            Err(AuctionError::WrongPhase { .. })
        ));
        assert_eq!(
            auction.withdraw(AFTER_REVEAL, BIDDER1),
            Ok(AuctionEvent::Withdrawn {
                bidder: BIDDER1,
                amount: 10
            })
        );
    }

    #[test]
    fn test_invalid_config() {
        let mut config = new_auction().config().clone();
        config.reveal_deadline = config.bidding_deadline;
        assert!(matches!(BlindAuction::new(config), Err(AuctionError::InvalidTiming)));
    }
}
