// Mint Ledger - the token issuance state machine
//
// Every operation checks first and mutates last, so a rejected call
// leaves the ledger exactly as it was.

use super::config::{ConfigError, LedgerConfig};
use super::error::MintError;
use super::phase::{AuctionState, Phase, PhaseGates};
use super::registry::TokenRegistry;
use super::units::Wei;
use crate::account::Account;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::ops::Range;
use thiserror::Error;
use tracing::{debug, info};

/// Errors encoding or decoding a ledger snapshot
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Snapshot encoding failed: {0}")]
    Encode(String),

    #[error("Snapshot decoding failed: {0}")]
    Decode(String),

    #[error("Snapshot is inconsistent: {0}")]
    Inconsistent(String),
}

/// Record of a successful mint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintReceipt {
    pub phase: Phase,
    pub minter: Account,
    pub first_token_id: u64,
    pub quantity: u64,
    pub paid: Wei,
}

impl MintReceipt {
    /// Ids of the tokens created by this mint
    pub fn token_ids(&self) -> Range<u64> {
        self.first_token_id..self.first_token_id + self.quantity
    }
}

/// Summary of the ledger's supply and phase state
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerStatus {
    pub owner: Account,
    pub total_minted: u64,
    pub max_supply: u64,
    pub reserve_minted: u64,
    pub treasury: Wei,
    pub allow_list_enabled: bool,
    pub public_sale_enabled: bool,
    pub auction_started: bool,
    pub allow_list_size: usize,
}

/// The minting ledger
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MintLedger {
    owner: Account,
    config: LedgerConfig,
    gates: PhaseGates,
    /// Accounts eligible for allow-list minting
    allow_list: HashSet<Account>,
    allow_list_minted: HashMap<Account, u64>,
    public_minted: HashMap<Account, u64>,
    auction_minted: HashMap<Account, u64>,
    /// Reserve tokens credited per recipient
    reserve_credited: HashMap<Account, u64>,
    balances: HashMap<Account, u64>,
    tokens: TokenRegistry,
    total_minted: u64,
    reserve_minted: u64,
    /// Payments collected and not yet withdrawn
    treasury: Wei,
    base_uri: String,
}

impl MintLedger {
    /// Deploy a ledger owned by `owner` with every phase closed
    pub fn new(owner: Account, config: LedgerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(owner, config))
    }

    /// Deploy with the default configuration
    pub fn deploy(owner: Account) -> Self {
        Self::with_valid_config(owner, LedgerConfig::default())
    }

    fn with_valid_config(owner: Account, config: LedgerConfig) -> Self {
        info!(owner = %owner, max_supply = config.max_supply, "Ledger deployed");

        Self {
            owner,
            config,
            gates: PhaseGates::default(),
            allow_list: HashSet::new(),
            allow_list_minted: HashMap::new(),
            public_minted: HashMap::new(),
            auction_minted: HashMap::new(),
            reserve_credited: HashMap::new(),
            balances: HashMap::new(),
            tokens: TokenRegistry::new(),
            total_minted: 0,
            reserve_minted: 0,
            treasury: 0,
            base_uri: String::new(),
        }
    }

    // ========================================================================
    // ADMINISTRATION (owner only)
    // ========================================================================

    fn only_owner(&self, caller: &Account) -> Result<(), MintError> {
        if *caller != self.owner {
            debug!(caller = %caller, "Rejected privileged call from non-owner");
            return Err(MintError::Unauthorized);
        }
        Ok(())
    }

    /// Open or close the allow-list sale
    pub fn set_allow_list_status(&mut self, caller: &Account, enabled: bool) -> Result<(), MintError> {
        self.only_owner(caller)?;
        self.gates.allow_list = enabled;
        info!(enabled, "Allow-list sale status changed");
        Ok(())
    }

    /// Replace the allow-list membership.
    ///
    /// Per-account allow-list counters survive, so re-listing an account
    /// does not let it mint again.
    pub fn set_allow_list<I>(&mut self, caller: &Account, accounts: I) -> Result<(), MintError>
    where
        I: IntoIterator<Item = Account>,
    {
        self.only_owner(caller)?;
        self.allow_list = accounts.into_iter().collect();
        info!(size = self.allow_list.len(), "Allow-list replaced");
        Ok(())
    }

    /// Open or close the public sale
    pub fn set_public_sale_status(&mut self, caller: &Account, enabled: bool) -> Result<(), MintError> {
        self.only_owner(caller)?;
        self.gates.public_sale = enabled;
        info!(enabled, "Public sale status changed");
        Ok(())
    }

    /// Start the auction. Calling again is a no-op.
    pub fn set_auction_sale_start(&mut self, caller: &Account) -> Result<(), MintError> {
        self.only_owner(caller)?;
        if self.gates.auction == AuctionState::NotStarted {
            self.gates.auction = AuctionState::Started;
            info!("Auction started");
        }
        Ok(())
    }

    /// Set the metadata base URI
    pub fn set_base_uri(&mut self, caller: &Account, base_uri: impl Into<String>) -> Result<(), MintError> {
        self.only_owner(caller)?;
        self.base_uri = base_uri.into();
        info!(base_uri = %self.base_uri, "Base URI set");
        Ok(())
    }

    /// Hand the ledger to a new owner
    pub fn transfer_ownership(&mut self, caller: &Account, new_owner: Account) -> Result<(), MintError> {
        self.only_owner(caller)?;
        info!(from = %self.owner, to = %new_owner, "Ownership transferred");
        self.owner = new_owner;
        Ok(())
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn owner(&self) -> &Account {
        &self.owner
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn allow_list_status(&self) -> bool {
        self.gates.allow_list
    }

    pub fn public_sale_status(&self) -> bool {
        self.gates.public_sale
    }

    pub fn auction_started(&self) -> bool {
        self.gates.auction == AuctionState::Started
    }

    /// Whether an account is on the allow-list
    pub fn is_allow_listed(&self, account: &Account) -> bool {
        self.allow_list.contains(account)
    }

    /// Total tokens owned by an account
    pub fn balance_of(&self, account: &Account) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Tokens minted to an account over the ledger's lifetime.
    /// Equal to the balance, since tokens never move.
    pub fn number_minted(&self, account: &Account) -> u64 {
        self.balance_of(account)
    }

    /// Tokens an account has received through one phase
    pub fn minted_in_phase(&self, phase: Phase, account: &Account) -> u64 {
        self.counter(phase).get(account).copied().unwrap_or(0)
    }

    pub fn total_minted(&self) -> u64 {
        self.total_minted
    }

    pub fn total_supply(&self) -> u64 {
        self.tokens.len()
    }

    pub fn max_supply(&self) -> u64 {
        self.config.max_supply
    }

    pub fn reserve_minted(&self) -> u64 {
        self.reserve_minted
    }

    /// Payments held pending withdrawal
    pub fn treasury(&self) -> Wei {
        self.treasury
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Get the owner of a token
    pub fn owner_of(&self, token_id: u64) -> Result<Account, MintError> {
        self.tokens
            .owner_of(token_id)
            .copied()
            .ok_or(MintError::TokenNotFound(token_id))
    }

    /// Metadata URI of a token: the base URI followed by the token id
    pub fn token_uri(&self, token_id: u64) -> Result<String, MintError> {
        self.owner_of(token_id)?;
        if self.base_uri.is_empty() {
            return Ok(String::new());
        }
        Ok(format!("{}{}", self.base_uri, token_id))
    }

    /// Token ids owned by an account
    pub fn tokens_of_owner(&self, account: &Account) -> Vec<u64> {
        self.tokens.tokens_of(account)
    }

    pub fn status(&self) -> LedgerStatus {
        LedgerStatus {
            owner: self.owner,
            total_minted: self.total_minted,
            max_supply: self.config.max_supply,
            reserve_minted: self.reserve_minted,
            treasury: self.treasury,
            allow_list_enabled: self.gates.allow_list,
            public_sale_enabled: self.gates.public_sale,
            auction_started: self.auction_started(),
            allow_list_size: self.allow_list.len(),
        }
    }

    // ========================================================================
    // MINTING
    // ========================================================================

    /// Mint through the allow-list at the allow-list price
    pub fn allow_list_mint(
        &mut self,
        caller: &Account,
        quantity: u64,
        payment: Wei,
    ) -> Result<MintReceipt, MintError> {
        self.check_allow_list_mint(caller, quantity, payment)
            .map_err(|e| rejected(Phase::AllowList, caller, quantity, e))?;
        Ok(self.credit(Phase::AllowList, *caller, quantity, payment))
    }

    fn check_allow_list_mint(&self, caller: &Account, quantity: u64, payment: Wei) -> Result<(), MintError> {
        self.check_open(Phase::AllowList, quantity)?;

        if !self.allow_list.contains(caller) || quantity > self.config.max_batch {
            return Err(MintError::NotEligible);
        }

        let minted = self.minted_in_phase(Phase::AllowList, caller);
        if minted.saturating_add(quantity) > self.config.allow_list_per_account {
            return Err(MintError::ReachedMax);
        }

        if !self.fits_supply(quantity) {
            return Err(MintError::ReachedMaxSupply);
        }

        self.ensure_paid(quantity, self.config.allow_list_price, payment)
    }

    /// Mint in the public sale at the public price
    pub fn public_sale_mint(
        &mut self,
        caller: &Account,
        quantity: u64,
        payment: Wei,
    ) -> Result<MintReceipt, MintError> {
        self.check_public_sale_mint(caller, quantity, payment)
            .map_err(|e| rejected(Phase::PublicSale, caller, quantity, e))?;
        Ok(self.credit(Phase::PublicSale, *caller, quantity, payment))
    }

    fn check_public_sale_mint(&self, caller: &Account, quantity: u64, payment: Wei) -> Result<(), MintError> {
        self.check_open(Phase::PublicSale, quantity)?;

        if quantity > self.config.max_batch {
            return Err(MintError::BatchTooLarge);
        }

        if !self.fits_supply(quantity) {
            return Err(MintError::ReachedMaxSupply);
        }

        self.ensure_paid(quantity, self.config.public_price, payment)?;

        // The per-account cap is only evaluated for requests that are paid for
        let minted = self.minted_in_phase(Phase::PublicSale, caller);
        if minted.saturating_add(quantity) > self.config.public_per_account {
            return Err(MintError::BatchTooLarge);
        }

        Ok(())
    }

    /// Mint in the auction at the auction price
    pub fn auction_mint(
        &mut self,
        caller: &Account,
        quantity: u64,
        payment: Wei,
    ) -> Result<MintReceipt, MintError> {
        self.check_auction_mint(caller, quantity, payment)
            .map_err(|e| rejected(Phase::Auction, caller, quantity, e))?;
        Ok(self.credit(Phase::Auction, *caller, quantity, payment))
    }

    fn check_auction_mint(&self, caller: &Account, quantity: u64, payment: Wei) -> Result<(), MintError> {
        self.check_open(Phase::Auction, quantity)?;

        let minted = self.minted_in_phase(Phase::Auction, caller);
        if quantity > self.config.max_batch
            || minted.saturating_add(quantity) > self.config.auction_per_account
            || !self.fits_supply(quantity)
        {
            return Err(MintError::SupplyExhausted);
        }

        self.ensure_paid(quantity, self.config.auction_price, payment)
    }

    /// Owner-only unpaid mint to `recipient`
    pub fn reserve_mint(
        &mut self,
        caller: &Account,
        recipient: Account,
        quantity: u64,
    ) -> Result<MintReceipt, MintError> {
        self.only_owner(caller)?;

        if quantity == 0 {
            return Err(rejected(Phase::Reserve, caller, quantity, MintError::ZeroQuantity));
        }

        if self.total_minted.saturating_add(quantity) > self.config.reserve_cap {
            return Err(rejected(
                Phase::Reserve,
                caller,
                quantity,
                MintError::ReserveCapExceeded,
            ));
        }

        Ok(self.credit(Phase::Reserve, recipient, quantity, 0))
    }

    /// Reserve mint credited to the owner
    pub fn reserve_mint_to_owner(&mut self, caller: &Account, quantity: u64) -> Result<MintReceipt, MintError> {
        let owner = self.owner;
        self.reserve_mint(caller, owner, quantity)
    }

    /// Pay out the whole treasury to the owner, returning the amount sent
    pub fn withdraw_money(&mut self, caller: &Account) -> Result<Wei, MintError> {
        self.only_owner(caller)?;
        let amount = std::mem::take(&mut self.treasury);
        info!(to = %self.owner, amount, "Treasury withdrawn");
        Ok(amount)
    }

    // ========================================================================
    // SNAPSHOTS
    // ========================================================================

    /// Serialize the whole ledger to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        postcard::to_allocvec(self).map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    /// Restore a ledger from bytes produced by `to_bytes`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let ledger: Self =
            postcard::from_bytes(bytes).map_err(|e| SnapshotError::Decode(e.to_string()))?;
        ledger.check_consistency()?;
        Ok(ledger)
    }

    fn check_consistency(&self) -> Result<(), SnapshotError> {
        self.config
            .validate()
            .map_err(|e| SnapshotError::Inconsistent(e.to_string()))?;

        if self.total_minted != self.tokens.len() {
            return Err(SnapshotError::Inconsistent(format!(
                "total minted {} but {} tokens registered",
                self.total_minted,
                self.tokens.len()
            )));
        }
        if self.total_minted > self.config.max_supply || self.reserve_minted > self.total_minted {
            return Err(SnapshotError::Inconsistent("supply counters out of range".into()));
        }

        let held: u64 = self.balances.values().sum();
        if held != self.total_minted {
            return Err(SnapshotError::Inconsistent(format!(
                "balances sum to {} but total minted is {}",
                held, self.total_minted
            )));
        }
        Ok(())
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    fn check_open(&self, phase: Phase, quantity: u64) -> Result<(), MintError> {
        if !self.gates.is_open(phase) {
            return Err(MintError::NotStarted(phase));
        }
        if quantity == 0 {
            return Err(MintError::ZeroQuantity);
        }
        Ok(())
    }

    fn fits_supply(&self, quantity: u64) -> bool {
        self.total_minted.saturating_add(quantity) <= self.config.max_supply
    }

    /// The payment must cover the batch and must fit in the treasury
    fn ensure_paid(&self, quantity: u64, unit_price: Wei, payment: Wei) -> Result<(), MintError> {
        let required = (quantity as Wei).saturating_mul(unit_price);
        if payment < required {
            return Err(MintError::InsufficientPayment {
                required,
                sent: payment,
            });
        }
        if self.treasury.checked_add(payment).is_none() {
            return Err(MintError::TreasuryOverflow);
        }
        Ok(())
    }

    fn counter(&self, phase: Phase) -> &HashMap<Account, u64> {
        match phase {
            Phase::AllowList => &self.allow_list_minted,
            Phase::PublicSale => &self.public_minted,
            Phase::Auction => &self.auction_minted,
            Phase::Reserve => &self.reserve_credited,
        }
    }

    fn counter_mut(&mut self, phase: Phase) -> &mut HashMap<Account, u64> {
        match phase {
            Phase::AllowList => &mut self.allow_list_minted,
            Phase::PublicSale => &mut self.public_minted,
            Phase::Auction => &mut self.auction_minted,
            Phase::Reserve => &mut self.reserve_credited,
        }
    }

    /// Apply every effect of an already validated mint
    fn credit(&mut self, phase: Phase, to: Account, quantity: u64, payment: Wei) -> MintReceipt {
        *self.counter_mut(phase).entry(to).or_insert(0) += quantity;
        *self.balances.entry(to).or_insert(0) += quantity;
        self.total_minted += quantity;
        if phase == Phase::Reserve {
            self.reserve_minted += quantity;
        }
        self.treasury += payment;

        let first_token_id = self.tokens.mint(to, quantity);

        info!(
            phase = %phase,
            to = %to,
            quantity,
            paid = payment,
            first_token_id,
            total_minted = self.total_minted,
            "Minted"
        );

        MintReceipt {
            phase,
            minter: to,
            first_token_id,
            quantity,
            paid: payment,
        }
    }
}

fn rejected(phase: Phase, caller: &Account, quantity: u64, err: MintError) -> MintError {
    debug!(phase = %phase, caller = %caller, quantity, reason = err.reason(), "Mint rejected");
    err
}
