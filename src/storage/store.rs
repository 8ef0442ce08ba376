// MintStore - sled database holding one ledger
//
// Layout:
// - ledger:state         postcard snapshot of the whole ledger
// - receipt:<u64 be>     one receipt per successful mint, keyed by first token id

use crate::ledger::{MintLedger, MintReceipt, SnapshotError};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

mod keys {
    pub const LEDGER_STATE: &[u8] = b"ledger:state";
    pub const RECEIPT_PREFIX: &[u8] = b"receipt:";
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Cannot open ledger database: {0}")]
    Open(String),

    #[error("Ledger database error: {0}")]
    Database(String),

    #[error("Cannot encode {what}: {reason}")]
    Encode { what: &'static str, reason: String },

    #[error("Cannot decode {what}: {reason}")]
    Decode { what: &'static str, reason: String },

    #[error("Stored ledger is corrupt: {0}")]
    Corrupt(String),
}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<SnapshotError> for StoreError {
    fn from(err: SnapshotError) -> Self {
        match err {
            SnapshotError::Encode(reason) => StoreError::Encode { what: "ledger", reason },
            SnapshotError::Decode(reason) => StoreError::Decode { what: "ledger", reason },
            SnapshotError::Inconsistent(reason) => StoreError::Corrupt(reason),
        }
    }
}

/// What the store currently holds
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreSummary {
    pub has_ledger: bool,
    pub receipts: usize,
    pub disk_size_bytes: u64,
}

/// Durable home of a minting ledger and its receipt journal
pub struct MintStore {
    db: sled::Db,
}

impl MintStore {
    /// Open or create a store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path).map_err(|e| StoreError::Open(e.to_string()))?;
        Ok(Self { db })
    }

    /// Flush pending writes to disk
    pub fn flush(&self) -> Result<(), StoreError> {
        let bytes = self.db.flush()?;
        debug!(bytes, "Store flushed");
        Ok(())
    }

    pub fn summary(&self) -> Result<StoreSummary, StoreError> {
        Ok(StoreSummary {
            has_ledger: self.has_ledger()?,
            receipts: self.db.scan_prefix(keys::RECEIPT_PREFIX).count(),
            disk_size_bytes: self.db.size_on_disk()?,
        })
    }

    // ========================================================================
    // LEDGER SNAPSHOT
    // ========================================================================

    /// Whether a ledger has been deployed into this store
    pub fn has_ledger(&self) -> Result<bool, StoreError> {
        Ok(self.db.contains_key(keys::LEDGER_STATE)?)
    }

    /// Overwrite the stored snapshot
    pub fn save_ledger(&self, ledger: &MintLedger) -> Result<(), StoreError> {
        let bytes = ledger.to_bytes()?;
        self.db.insert(keys::LEDGER_STATE, bytes.as_slice())?;
        debug!(bytes = bytes.len(), "Ledger snapshot saved");
        Ok(())
    }

    /// Load the stored ledger, `None` when nothing has been deployed
    pub fn load_ledger(&self) -> Result<Option<MintLedger>, StoreError> {
        match self.db.get(keys::LEDGER_STATE)? {
            Some(bytes) => Ok(Some(MintLedger::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    // ========================================================================
    // RECEIPT JOURNAL
    // ========================================================================

    /// Record a receipt on its own, outside of a snapshot commit
    pub fn append_receipt(&self, receipt: &MintReceipt) -> Result<(), StoreError> {
        self.db
            .insert(receipt_key(receipt.first_token_id), encode_receipt(receipt)?)?;
        Ok(())
    }

    /// All recorded receipts in mint order
    pub fn load_receipts(&self) -> Result<Vec<MintReceipt>, StoreError> {
        self.db
            .scan_prefix(keys::RECEIPT_PREFIX)
            .map(|entry| {
                let (_, value) = entry?;
                postcard::from_bytes(&value).map_err(|e| StoreError::Decode {
                    what: "receipt",
                    reason: e.to_string(),
                })
            })
            .collect()
    }

    /// Save the ledger together with the receipt of the mint that produced
    /// it, in one atomic batch
    pub fn commit_mint(&self, ledger: &MintLedger, receipt: &MintReceipt) -> Result<(), StoreError> {
        let mut batch = sled::Batch::default();
        batch.insert(keys::LEDGER_STATE, ledger.to_bytes()?);
        batch.insert(receipt_key(receipt.first_token_id), encode_receipt(receipt)?);
        self.db.apply_batch(batch)?;
        debug!(first_token_id = receipt.first_token_id, "Mint committed");
        Ok(())
    }
}

fn encode_receipt(receipt: &MintReceipt) -> Result<Vec<u8>, StoreError> {
    postcard::to_allocvec(receipt).map_err(|e| StoreError::Encode {
        what: "receipt",
        reason: e.to_string(),
    })
}

fn receipt_key(first_token_id: u64) -> Vec<u8> {
    [keys::RECEIPT_PREFIX, &first_token_id.to_be_bytes()].concat()
}
