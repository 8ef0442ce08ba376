// Service module - SINGLE WRITER
// Runs one ledger inside a tokio task and applies calls in submission order

mod actor;

pub use actor::*;
