// Ledger configuration - deployment parameters fixed at construction

use super::units::Wei;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 0.02 ether
pub const DEFAULT_SALE_PRICE: Wei = 20_000_000_000_000_000;

/// 0.5 ether
pub const DEFAULT_AUCTION_PRICE: Wei = 500_000_000_000_000_000;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Deployment parameters of a minting ledger
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Total tokens mintable across every phase
    pub max_supply: u64,
    /// Reserve mints are allowed while total minted stays within this
    pub reserve_cap: u64,
    /// Largest quantity accepted by a single mint call
    pub max_batch: u64,
    pub allow_list_per_account: u64,
    pub public_per_account: u64,
    pub auction_per_account: u64,
    pub allow_list_price: Wei,
    pub public_price: Wei,
    pub auction_price: Wei,
}

impl LedgerConfig {
    /// Create a new config with builder pattern
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_supply(mut self, max_supply: u64) -> Self {
        self.max_supply = max_supply;
        self
    }

    pub fn with_reserve_cap(mut self, cap: u64) -> Self {
        self.reserve_cap = cap;
        self
    }

    pub fn with_max_batch(mut self, max_batch: u64) -> Self {
        self.max_batch = max_batch;
        self
    }

    pub fn with_allow_list_per_account(mut self, cap: u64) -> Self {
        self.allow_list_per_account = cap;
        self
    }

    pub fn with_public_per_account(mut self, cap: u64) -> Self {
        self.public_per_account = cap;
        self
    }

    pub fn with_auction_per_account(mut self, cap: u64) -> Self {
        self.auction_per_account = cap;
        self
    }

    pub fn with_allow_list_price(mut self, price: Wei) -> Self {
        self.allow_list_price = price;
        self
    }

    pub fn with_public_price(mut self, price: Wei) -> Self {
        self.public_price = price;
        self
    }

    pub fn with_auction_price(mut self, price: Wei) -> Self {
        self.auction_price = price;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_supply == 0 {
            return Err(ConfigError::Invalid("max_supply must be > 0".to_string()));
        }
        if self.max_batch == 0 {
            return Err(ConfigError::Invalid("max_batch must be > 0".to_string()));
        }
        if self.reserve_cap > self.max_supply {
            return Err(ConfigError::Invalid(
                "reserve_cap must be <= max_supply".to_string(),
            ));
        }
        if self.allow_list_per_account == 0
            || self.public_per_account == 0
            || self.auction_per_account == 0
        {
            return Err(ConfigError::Invalid(
                "per-account caps must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_supply: 6,
            reserve_cap: 5,
            max_batch: 2,
            allow_list_per_account: 1,
            public_per_account: 2,
            auction_per_account: 2,
            allow_list_price: DEFAULT_SALE_PRICE,
            public_price: DEFAULT_SALE_PRICE,
            auction_price: DEFAULT_AUCTION_PRICE,
        }
    }
}
