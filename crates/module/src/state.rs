//! On-chain state structures for the auction module.

use std::collections::{BTreeMap, HashMap};

use auction_types::{Address, Amount, AuctionEvent, Timestamp};

use crate::auction::BlindAuction;
use crate::genesis::{AuctionGenesisConfig, DefaultAuctionParams, GenesisValidationError};
use crate::registry::DomainRegistry;

/// An emitted event together with where and when it happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventRecord {
    pub resource_name: String,
    pub timestamp: Timestamp,
    pub event: AuctionEvent,
}

/// Auction module state.
///
/// One auction per resource name. In a real chain these would be
/// storage maps; this is the in-memory representation.
#[derive(Debug, Default)]
pub struct ModuleState {
    /// Beneficiary of every auction started here
    pub registry_address: Address,

    /// Parameters for new auctions
    pub params: DefaultAuctionParams,

    /// Auctions by resource name
    pub auctions: BTreeMap<String, BlindAuction>,

    /// Owners of names whose auctions have been won
    pub registry: DomainRegistry,

    /// Funds paid out by auctions, per recipient
    pub balances: HashMap<Address, Amount>,

    /// Every event, in emission order
    pub events: Vec<EventRecord>,
}

impl ModuleState {
    /// Create a new state with default genesis.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state from a validated genesis configuration.
    pub fn from_genesis(config: &AuctionGenesisConfig) -> Result<Self, GenesisValidationError> {
        config.validate()?;
        Ok(Self {
            registry_address: config.registry_address,
            params: config.default_params.clone(),
            ..Default::default()
        })
    }

    /// Get auction by resource name.
    pub fn get_auction(&self, resource_name: &str) -> Option<&BlindAuction> {
        self.auctions.get(resource_name)
    }

    /// Get mutable auction by resource name.
    pub fn get_auction_mut(&mut self, resource_name: &str) -> Option<&mut BlindAuction> {
        self.auctions.get_mut(resource_name)
    }

    /// Get an address's received payouts.
    pub fn get_balance(&self, address: &Address) -> Amount {
        self.balances.get(address).copied().unwrap_or(0)
    }

    /// Record a payout to `address`.
    pub fn credit_balance(&mut self, address: Address, amount: Amount) {
        let balance = self.balances.entry(address).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    /// Append events emitted by an operation on `resource_name`.
    pub fn record_events(
        &mut self,
        resource_name: &str,
        timestamp: Timestamp,
        events: impl IntoIterator<Item = AuctionEvent>,
    ) {
        self.events.extend(events.into_iter().map(|event| EventRecord {
            resource_name: resource_name.to_string(),
            timestamp,
            event,
        }));
    }

    /// Events emitted for one auction.
    pub fn events_for<'a>(
        &'a self,
        resource_name: &'a str,
    ) -> impl Iterator<Item = &'a AuctionEvent> + 'a {
        self.events
            .iter()
            .filter(move |record| record.resource_name == resource_name)
            .map(|record| &record.event)
    }
}
