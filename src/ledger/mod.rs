// Ledger module - THE MINTING STATE MACHINE
// Phase gates, per-account caps, supply accounting and the treasury

mod config;
mod error;
mod phase;
mod registry;
mod state;
mod units;

pub use config::{ConfigError, LedgerConfig, DEFAULT_AUCTION_PRICE, DEFAULT_SALE_PRICE};
pub use error::*;
pub use phase::{AuctionState, Phase, PhaseGates};
pub use registry::TokenRegistry;
pub use state::{LedgerStatus, MintLedger, MintReceipt, SnapshotError};
pub use units::{format_ether, parse_ether, UnitsError, Wei, ETHER_DECIMALS, ONE_ETHER};
