// Account module - caller identities for the minting ledger
// Accounts are 20-byte addresses, derived from secp256k1 public keys

mod address;

pub use address::*;
