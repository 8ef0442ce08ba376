// Payment units - amounts are carried in wei, the smallest denomination

use thiserror::Error;

/// An amount of the native currency in wei
pub type Wei = u128;

/// Number of decimal places in one ether
pub const ETHER_DECIMALS: u32 = 18;

/// One ether in wei
pub const ONE_ETHER: Wei = 1_000_000_000_000_000_000;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum UnitsError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Too many decimal places: at most {max} allowed, got {got}")]
    TooPrecise { max: u32, got: usize },

    #[error("Amount overflows")]
    Overflow,
}

/// Parse a decimal ether string ("0.02", "1", "1.5") into wei without
/// going through floating point.
pub fn parse_ether(s: &str) -> Result<Wei, UnitsError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(UnitsError::InvalidAmount("amount cannot be empty".into()));
    }

    let (whole, fraction) = match s.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (s, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(UnitsError::InvalidAmount(s.to_string()));
    }

    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(UnitsError::InvalidAmount(s.to_string()));
    }

    if fraction.len() > ETHER_DECIMALS as usize {
        return Err(UnitsError::TooPrecise {
            max: ETHER_DECIMALS,
            got: fraction.len(),
        });
    }

    let whole_wei = if whole.is_empty() {
        0
    } else {
        whole
            .parse::<Wei>()
            .map_err(|_| UnitsError::Overflow)?
            .checked_mul(ONE_ETHER)
            .ok_or(UnitsError::Overflow)?
    };

    let fraction_wei = if fraction.is_empty() {
        0
    } else {
        let scale = 10u128.pow(ETHER_DECIMALS - fraction.len() as u32);
        fraction
            .parse::<Wei>()
            .map_err(|_| UnitsError::Overflow)?
            * scale
    };

    whole_wei.checked_add(fraction_wei).ok_or(UnitsError::Overflow)
}

/// Format wei as a decimal ether string, trimming trailing zeros
pub fn format_ether(wei: Wei) -> String {
    let whole = wei / ONE_ETHER;
    let fraction = wei % ONE_ETHER;
    if fraction == 0 {
        return whole.to_string();
    }

    let digits = format!("{:018}", fraction);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}
