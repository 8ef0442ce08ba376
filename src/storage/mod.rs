// Storage module - PERSISTENCE
// Keeps ledger snapshots and the mint receipt journal in sled

mod store;

pub use store::{MintStore, StoreError, StoreSummary};
