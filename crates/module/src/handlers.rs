//! Call handlers for the auction module.
//!
//! These functions look up the targeted auction, run the operation against the
//! caller's context and record the emitted events.

use tracing::{debug, info};

use crate::auction::{BlindAuction, RevealReport};
use crate::call::AuctionCall;
use crate::error::AuctionError;
use crate::state::ModuleState;
use auction_types::{Address, AuctionConfig, AuctionEvent, BidDigest, RevealEntry, RevealOutcome};

/// Context provided by the runtime for each call.
pub struct CallContext {
    /// Sender of the transaction
    pub sender: Address,
    /// Current block height
    pub block_height: u64,
    /// Current timestamp
    pub timestamp: u64,
    /// Value attached to the call (for deposits)
    pub value: u64,
}

/// Result type for handlers.
pub type HandlerResult<T> = Result<T, AuctionError>;

/// Handle StartAuction call.
///
/// Deadlines come from the module's default parameters; the registry address
/// becomes the beneficiary.
pub fn handle_start_auction(
    state: &mut ModuleState,
    ctx: &CallContext,
    resource_name: &str,
) -> HandlerResult<AuctionEvent> {
    validate_resource_name(resource_name, state.params.max_name_length)?;

    // One auction per name, ever
    if state.auctions.contains_key(resource_name) || state.registry.is_registered(resource_name) {
        return Err(AuctionError::AuctionAlreadyExists(resource_name.to_string()));
    }

    let bidding_deadline = ctx
        .timestamp
        .checked_add(state.params.bidding_time)
        .ok_or(AuctionError::InvalidTiming)?;
    let reveal_deadline = bidding_deadline
        .checked_add(state.params.reveal_time)
        .ok_or(AuctionError::InvalidTiming)?;

    let auction = BlindAuction::new(AuctionConfig {
        resource_name: resource_name.to_string(),
        beneficiary: state.registry_address,
        started_at: ctx.timestamp,
        bidding_deadline,
        reveal_deadline,
    })?;
    state.auctions.insert(resource_name.to_string(), auction);

    let event = AuctionEvent::AuctionStarted {
        resource_name: resource_name.to_string(),
        bidding_deadline,
        reveal_deadline,
    };
    state.record_events(resource_name, ctx.timestamp, [event.clone()]);

    info!(
        resource = resource_name,
        starter = %hex::encode(ctx.sender),
        bidding_deadline,
        reveal_deadline,
        "Auction started"
    );
    Ok(event)
}

/// Handle SubmitBid call. The attached value is the deposit.
pub fn handle_submit_bid(
    state: &mut ModuleState,
    ctx: &CallContext,
    resource_name: &str,
    digest: BidDigest,
) -> HandlerResult<AuctionEvent> {
    let auction = state
        .get_auction_mut(resource_name)
        .ok_or_else(|| AuctionError::AuctionNotFound(resource_name.to_string()))?;

    let event = auction.submit_bid(ctx.timestamp, ctx.sender, digest, ctx.value)?;
    state.record_events(resource_name, ctx.timestamp, [event.clone()]);

    info!(
        resource = resource_name,
        bidder = %hex::encode(ctx.sender),
        deposit = ctx.value,
        "Bid placed"
    );
    Ok(event)
}

/// Handle Reveal call.
pub fn handle_reveal(
    state: &mut ModuleState,
    ctx: &CallContext,
    resource_name: &str,
    entries: &[RevealEntry],
) -> HandlerResult<RevealReport> {
    let auction = state
        .get_auction_mut(resource_name)
        .ok_or_else(|| AuctionError::AuctionNotFound(resource_name.to_string()))?;

    let report = auction.reveal(ctx.timestamp, ctx.sender, entries)?;
    let highest_bid = auction.highest_bid();
    state.record_events(resource_name, ctx.timestamp, report.events());

    let forfeited = report
        .outcomes
        .iter()
        .filter(|o| matches!(o, RevealOutcome::Mismatch | RevealOutcome::Underfunded))
        .count();
    if forfeited > 0 {
        debug!(
            resource = resource_name,
            bidder = %hex::encode(ctx.sender),
            forfeited,
            "Reveal entries forfeited"
        );
    }
    info!(
        resource = resource_name,
        bidder = %hex::encode(ctx.sender),
        refunded = report.refunded_amount,
        any_valid = report.any_valid,
        highest_bid,
        "Bids revealed"
    );
    Ok(report)
}

/// Handle Finalize call (permissionless).
///
/// Credits the winning amount to the beneficiary's balance.
pub fn handle_finalize(
    state: &mut ModuleState,
    ctx: &CallContext,
    resource_name: &str,
) -> HandlerResult<AuctionEvent> {
    let auction = state
        .auctions
        .get_mut(resource_name)
        .ok_or_else(|| AuctionError::AuctionNotFound(resource_name.to_string()))?;

    let event = auction.finalize(ctx.timestamp, &mut state.registry)?;
    let beneficiary = auction.config().beneficiary;

    if let AuctionEvent::AuctionEnded {
        winner,
        highest_bid,
        contract_balance,
    } = &event
    {
        state.credit_balance(beneficiary, *highest_bid);
        info!(
            resource = resource_name,
            winner = %winner.map(hex::encode).unwrap_or_else(|| "none".into()),
            highest_bid,
            contract_balance,
            "Auction finalized"
        );
    }
    state.record_events(resource_name, ctx.timestamp, [event.clone()]);

    Ok(event)
}

/// Handle Withdraw call.
pub fn handle_withdraw(
    state: &mut ModuleState,
    ctx: &CallContext,
    resource_name: &str,
) -> HandlerResult<AuctionEvent> {
    let auction = state
        .get_auction_mut(resource_name)
        .ok_or_else(|| AuctionError::AuctionNotFound(resource_name.to_string()))?;

    let event = auction.withdraw(ctx.timestamp, ctx.sender)?;
    if let AuctionEvent::Withdrawn { bidder, amount } = &event {
        state.credit_balance(*bidder, *amount);
        info!(
            resource = resource_name,
            bidder = %hex::encode(bidder),
            amount,
            "Refund withdrawn"
        );
    }
    state.record_events(resource_name, ctx.timestamp, [event.clone()]);

    Ok(event)
}

/// Route a call message to its handler, returning every event it emitted.
pub fn handle_call(
    state: &mut ModuleState,
    ctx: &CallContext,
    call: AuctionCall,
) -> HandlerResult<Vec<AuctionEvent>> {
    match call {
        AuctionCall::StartAuction { resource_name } => {
            handle_start_auction(state, ctx, &resource_name).map(|e| vec![e])
        }
        AuctionCall::SubmitBid {
            resource_name,
            digest,
        } => handle_submit_bid(state, ctx, &resource_name, digest).map(|e| vec![e]),
        AuctionCall::Reveal {
            resource_name,
            entries,
        } => handle_reveal(state, ctx, &resource_name, &entries).map(|r| r.events()),
        AuctionCall::Finalize { resource_name } => {
            handle_finalize(state, ctx, &resource_name).map(|e| vec![e])
        }
        AuctionCall::Withdraw { resource_name } => {
            handle_withdraw(state, ctx, &resource_name).map(|e| vec![e])
        }
    }
}

/// Names need a dotted suffix such as `dns.ntu`.
fn validate_resource_name(name: &str, max_len: usize) -> HandlerResult<()> {
    if name.is_empty()
        || name.len() > max_len
        || !name.contains('.')
        || name.starts_with('.')
        || name.ends_with('.')
        || name.chars().any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(AuctionError::InvalidResourceName);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genesis::AuctionGenesisConfig;
    use crate::registry::OwnerRegistry;
    use auction_types::{compute_bid_digest, Phase, Secret};

    const REGISTRY: Address = [0xeeu8; 32];
    const BIDDER1: Address = [1u8; 32];
    const BIDDER2: Address = [2u8; 32];
    const URL: &str = "dns.ntu";

    fn test_context(sender: Address, timestamp: u64, value: u64) -> CallContext {
        CallContext {
            sender,
            block_height: 100,
            timestamp,
            value,
        }
    }

    fn setup_state() -> ModuleState {
        let mut config = AuctionGenesisConfig::with_registry(REGISTRY);
        config.default_params.bidding_time = 10;
        config.default_params.reveal_time = 10;
        let mut state = ModuleState::from_genesis(&config).unwrap();
        handle_start_auction(&mut state, &test_context([0u8; 32], 1000, 0), URL).unwrap();
        state
    }

    fn secret() -> Secret {
        Secret::from_phrase("secret").unwrap()
    }

    #[test]
    fn test_start_auction() {
        let state = setup_state();
        let auction = state.get_auction(URL).unwrap();

        assert_eq!(auction.config().beneficiary, REGISTRY);
        assert_eq!(auction.config().bidding_deadline, 1010);
        assert_eq!(auction.config().reveal_deadline, 1020);
        assert_eq!(auction.phase(1000), Phase::AcceptingBids);
        assert_eq!(state.events.len(), 1);
    }

    #[test]
    fn test_start_auction_duplicate_name() {
        let mut state = setup_state();
        let result = handle_start_auction(&mut state, &test_context([0u8; 32], 1001, 0), URL);
        assert!(matches!(result, Err(AuctionError::AuctionAlreadyExists(_))));
    }

    #[test]
    fn test_start_auction_invalid_name() {
        let mut state = setup_state();
        for name in ["", "has space.ntu", "tab\tname.ntu", "dns", ".ntu", "dns."] {
            let result = handle_start_auction(&mut state, &test_context([0u8; 32], 1000, 0), name);
            assert_eq!(result, Err(AuctionError::InvalidResourceName));
        }
        let long = "a".repeat(254);
        assert_eq!(
            handle_start_auction(&mut state, &test_context([0u8; 32], 1000, 0), &long),
            Err(AuctionError::InvalidResourceName)
        );
    }

    #[test]
    fn test_submit_bid_success() {
        let mut state = setup_state();
        let digest = compute_bid_digest(&BIDDER1, 100, true, &secret());

        let event =
            handle_submit_bid(&mut state, &test_context(BIDDER1, 1005, 100), URL, digest).unwrap();

        assert_eq!(
            event,
            AuctionEvent::BidPlaced {
                bidder: BIDDER1,
                digest,
                total_deposit: 100,
            }
        );
        assert_eq!(state.get_auction(URL).unwrap().contract_balance(), 100);
    }

    #[test]
    fn test_submit_bid_after_end() {
        let mut state = setup_state();
        let digest = compute_bid_digest(&BIDDER1, 100, true, &secret());

        let result = handle_submit_bid(&mut state, &test_context(BIDDER1, 1011, 100), URL, digest);

        assert!(matches!(result, Err(AuctionError::WrongPhase { .. })));
        assert_eq!(state.get_auction(URL).unwrap().contract_balance(), 0);
        assert_eq!(state.events.len(), 1);
    }

    #[test]
    fn test_unknown_auction() {
        let mut state = setup_state();
        let result = handle_withdraw(&mut state, &test_context(BIDDER1, 2000, 0), "nope.ntu");
        assert_eq!(result, Err(AuctionError::AuctionNotFound("nope.ntu".into())));
    }

    #[test]
    fn test_full_lifecycle_through_calls() {
        let mut state = setup_state();

        let calls = [
            (BIDDER1, 1001, 100, compute_bid_digest(&BIDDER1, 100, true, &secret())),
            (BIDDER2, 1002, 200, compute_bid_digest(&BIDDER2, 200, true, &secret())),
            (BIDDER2, 1003, 50, compute_bid_digest(&BIDDER2, 50, false, &secret())),
        ];
        for (sender, ts, value, digest) in calls {
            handle_call(
                &mut state,
                &test_context(sender, ts, value),
                AuctionCall::SubmitBid {
                    resource_name: URL.into(),
                    digest,
                },
            )
            .unwrap();
        }

        handle_call(
            &mut state,
            &test_context(BIDDER1, 1012, 0),
            AuctionCall::Reveal {
                resource_name: URL.into(),
                entries: vec![RevealEntry::new(100, true, secret())],
            },
        )
        .unwrap();
        let events = handle_call(
            &mut state,
            &test_context(BIDDER2, 1013, 0),
            AuctionCall::Reveal {
                resource_name: URL.into(),
                entries: vec![
                    RevealEntry::new(200, true, secret()),
                    RevealEntry::new(50, false, secret()),
                ],
            },
        )
        .unwrap();
        assert_eq!(
            events,
            vec![
                AuctionEvent::HighestBidIncreased {
                    bidder: BIDDER2,
                    amount: 200
                },
                AuctionEvent::Revealed {
                    bidder: BIDDER2,
                    refunded_amount: 50,
                    any_valid: true
                },
            ]
        );

        let early = handle_finalize(&mut state, &test_context(BIDDER1, 1019, 0), URL);
        assert!(matches!(early, Err(AuctionError::WrongPhase { .. })));

        let ended = handle_finalize(&mut state, &test_context(BIDDER1, 1021, 0), URL).unwrap();
        assert_eq!(
            ended,
            AuctionEvent::AuctionEnded {
                winner: Some(BIDDER2),
                highest_bid: 200,
                contract_balance: 150,
            }
        );
        assert_eq!(state.registry.resolve(URL), Some(BIDDER2));
        assert_eq!(state.get_balance(&REGISTRY), 200);
        assert_eq!(
            handle_finalize(&mut state, &test_context(BIDDER1, 1022, 0), URL),
            Err(AuctionError::AlreadyFinalized)
        );

        handle_withdraw(&mut state, &test_context(BIDDER1, 1022, 0), URL).unwrap();
        handle_withdraw(&mut state, &test_context(BIDDER2, 1022, 0), URL).unwrap();
        assert_eq!(state.get_balance(&BIDDER1), 100);
        assert_eq!(state.get_balance(&BIDDER2), 50);
        assert_eq!(
            handle_withdraw(&mut state, &test_context(BIDDER2, 1023, 0), URL),
            Err(AuctionError::NothingToWithdraw)
        );

        // Name is now owned; it cannot be auctioned again.
        assert!(matches!(
            handle_start_auction(&mut state, &test_context(BIDDER1, 1030, 0), URL),
            Err(AuctionError::AuctionAlreadyExists(_))
        ));
    }
}
