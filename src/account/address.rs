use rand::rngs::OsRng;
use secp256k1::{PublicKey, Secp256k1};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const ADDRESS_LEN: usize = 20;
const HEX_PREFIX: &str = "0x";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AccountError {
    #[error("Invalid address length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("Invalid hex encoding: {0}")]
    InvalidHex(String),
}

/// A caller identity: the 20-byte address of an externally owned account
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Account([u8; ADDRESS_LEN]);

impl Account {
    /// The all-zero address
    pub const ZERO: Account = Account([0u8; ADDRESS_LEN]);

    /// Create an account from raw bytes
    pub fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Create an account from a byte slice, checking its length
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AccountError> {
        let array: [u8; ADDRESS_LEN] =
            bytes.try_into().map_err(|_| AccountError::InvalidLength {
                expected: ADDRESS_LEN,
                got: bytes.len(),
            })?;
        Ok(Self(array))
    }

    /// Derive the address of a secp256k1 public key.
    ///
    /// The address is the last 20 bytes of the Keccak-256 hash of the
    /// uncompressed key without its 0x04 tag byte.
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let uncompressed = public_key.serialize_uncompressed();
        let digest = Keccak256::digest(&uncompressed[1..]);
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&digest[32 - ADDRESS_LEN..]);
        Self(bytes)
    }

    /// Generate a fresh random account backed by a new secp256k1 key
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (_, public_key) = secp.generate_keypair(&mut OsRng);
        Self::from_public_key(&public_key)
    }

    /// Parse an address from hex, with or without the 0x prefix
    pub fn parse(s: &str) -> Result<Self, AccountError> {
        let digits = s
            .strip_prefix(HEX_PREFIX)
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);

        let bytes = hex::decode(digits).map_err(|e| AccountError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Get raw bytes
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }
}

impl FromStr for Account {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", HEX_PREFIX, hex::encode(self.0))
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Account({})", self)
    }
}
