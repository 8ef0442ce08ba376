// Mint errors - the reason strings are part of the observable contract

use super::phase::Phase;
use super::units::Wei;
use thiserror::Error;

pub const ALLOW_LIST_NOT_STARTED: &str = "allowList sale has not begun yet";
pub const PUBLIC_SALE_NOT_STARTED: &str = "public sale has not begun yet";
pub const AUCTION_NOT_STARTED: &str = "sale has not started yet";
pub const NOT_ELIGIBLE: &str = "not eligible for allowList mint";
pub const REACHED_MAX: &str = "allowList mint reached max";
pub const BATCH_TOO_LARGE: &str = "reached public sale max amount";
pub const SUPPLY_EXHAUSTED: &str = "not enough remaining for auction";
pub const REACHED_MAX_SUPPLY: &str = "reached max supply";
pub const INSUFFICIENT_PAYMENT: &str = "Need to send more ETH.";
pub const RESERVE_CAP_EXCEEDED: &str = "too many already minted before dev mint";
pub const UNAUTHORIZED: &str = "Ownable: caller is not the owner";
pub const ZERO_QUANTITY: &str = "quantity must be greater than zero";
pub const TOKEN_NOT_FOUND: &str = "owner query for nonexistent token";
pub const TREASURY_OVERFLOW: &str = "treasury balance overflow";

/// Rejections from the minting ledger. A rejected operation never changes state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MintError {
    #[error("{}", not_started_reason(.0))]
    NotStarted(Phase),

    #[error("{}", NOT_ELIGIBLE)]
    NotEligible,

    #[error("{}", REACHED_MAX)]
    ReachedMax,

    #[error("{}", BATCH_TOO_LARGE)]
    BatchTooLarge,

    #[error("{}", SUPPLY_EXHAUSTED)]
    SupplyExhausted,

    #[error("{}", REACHED_MAX_SUPPLY)]
    ReachedMaxSupply,

    #[error("{}", INSUFFICIENT_PAYMENT)]
    InsufficientPayment { required: Wei, sent: Wei },

    #[error("{}", RESERVE_CAP_EXCEEDED)]
    ReserveCapExceeded,

    #[error("{}", UNAUTHORIZED)]
    Unauthorized,

    #[error("{}", ZERO_QUANTITY)]
    ZeroQuantity,

    #[error("{} {}", TOKEN_NOT_FOUND, .0)]
    TokenNotFound(u64),

    #[error("{}", TREASURY_OVERFLOW)]
    TreasuryOverflow,
}

fn not_started_reason(phase: &Phase) -> &'static str {
    match phase {
        Phase::AllowList => ALLOW_LIST_NOT_STARTED,
        Phase::PublicSale => PUBLIC_SALE_NOT_STARTED,
        Phase::Auction | Phase::Reserve => AUCTION_NOT_STARTED,
    }
}

impl MintError {
    /// The bare reason string, without any detail fields
    pub fn reason(&self) -> &'static str {
        match self {
            MintError::NotStarted(phase) => not_started_reason(phase),
            MintError::NotEligible => NOT_ELIGIBLE,
            MintError::ReachedMax => REACHED_MAX,
            MintError::BatchTooLarge => BATCH_TOO_LARGE,
            MintError::SupplyExhausted => SUPPLY_EXHAUSTED,
            MintError::ReachedMaxSupply => REACHED_MAX_SUPPLY,
            MintError::InsufficientPayment { .. } => INSUFFICIENT_PAYMENT,
            MintError::ReserveCapExceeded => RESERVE_CAP_EXCEEDED,
            MintError::Unauthorized => UNAUTHORIZED,
            MintError::ZeroQuantity => ZERO_QUANTITY,
            MintError::TokenNotFound(_) => TOKEN_NOT_FOUND,
            MintError::TreasuryOverflow => TREASURY_OVERFLOW,
        }
    }
}
