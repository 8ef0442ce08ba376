// Amadeus Mint - phased token issuance ledger
//
// account  - caller identities
// ledger   - the minting state machine
// storage  - sled persistence for ledger snapshots and receipts
// service  - single-writer actor in front of a ledger

pub mod account;
pub mod ledger;
pub mod service;
pub mod storage;
