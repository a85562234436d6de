//! Genesis configuration for the auction module.
//!
//! This module defines the registrar settings the chain starts with: which
//! address collects winning bids and how long new auctions run.

use auction_types::Address;
use serde::{Deserialize, Serialize};

/// Genesis configuration for the auction module.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuctionGenesisConfig {
    /// Registry address; beneficiary of every auction it starts
    pub registry_address: Address,

    /// Default auction parameters
    #[serde(default)]
    pub default_params: DefaultAuctionParams,
}

/// Default parameters for new auctions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultAuctionParams {
    /// Length of the bidding phase (seconds)
    pub bidding_time: u64,
    /// Length of the reveal phase (seconds)
    pub reveal_time: u64,
    /// Longest accepted resource name (bytes)
    pub max_name_length: usize,
}

impl Default for DefaultAuctionParams {
    fn default() -> Self {
        Self {
            bidding_time: 3600, // 1 hour
            reveal_time: 3600,  // 1 hour
            max_name_length: 253,
        }
    }
}

impl Default for AuctionGenesisConfig {
    fn default() -> Self {
        Self {
            registry_address: [0u8; 32],
            default_params: DefaultAuctionParams::default(),
        }
    }
}

impl AuctionGenesisConfig {
    /// Create a genesis config for the given registry address.
    pub fn with_registry(registry_address: Address) -> Self {
        Self {
            registry_address,
            ..Default::default()
        }
    }

    /// Validate the genesis configuration.
    pub fn validate(&self) -> Result<(), GenesisValidationError> {
        if self.default_params.bidding_time == 0 {
            return Err(GenesisValidationError::InvalidDefaultParams(
                "Bidding time cannot be zero".into(),
            ));
        }
        if self.default_params.reveal_time == 0 {
            return Err(GenesisValidationError::InvalidDefaultParams(
                "Reveal time cannot be zero".into(),
            ));
        }
        if self.default_params.max_name_length == 0 {
            return Err(GenesisValidationError::InvalidDefaultParams(
                "Maximum name length cannot be zero".into(),
            ));
        }
        self.default_params
            .bidding_time
            .checked_add(self.default_params.reveal_time)
            .ok_or_else(|| {
                GenesisValidationError::InvalidDefaultParams("Auction duration overflows".into())
            })?;

        Ok(())
    }
}

/// Errors that can occur during genesis validation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenesisValidationError {
    #[error("Invalid default parameters: {0}")]
    InvalidDefaultParams(String),
}
