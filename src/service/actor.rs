// Ledger actor - serializes every call to one MintLedger through a channel
//
// The ledger is owned by a single task. Callers hold cloneable handles and
// wait on a oneshot reply, so operations are applied one at a time and in
// the order they were submitted.

use crate::account::Account;
use crate::ledger::{LedgerStatus, MintError, MintLedger, MintReceipt, Wei};
use crate::storage::{MintStore, StoreError};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Errors returned through a `LedgerHandle`
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    Rejected(#[from] MintError),

    #[error("Persisting ledger failed: {0}")]
    Store(#[from] StoreError),

    #[error("Ledger service is closed")]
    Closed,
}

/// Configuration for the ledger service
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    /// Maximum queued commands before senders wait
    pub channel_capacity: usize,
}

impl ServiceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 128,
        }
    }
}

type Reply<T> = oneshot::Sender<Result<T, ServiceError>>;

/// Phases a buyer can mint in; reserve mints have their own command
#[derive(Clone, Copy, Debug)]
enum Sale {
    AllowList,
    PublicSale,
    Auction,
}

enum Command {
    SetAllowListStatus { caller: Account, enabled: bool, reply: Reply<()> },
    SetAllowList { caller: Account, accounts: Vec<Account>, reply: Reply<()> },
    SetPublicSaleStatus { caller: Account, enabled: bool, reply: Reply<()> },
    StartAuction { caller: Account, reply: Reply<()> },
    SetBaseUri { caller: Account, base_uri: String, reply: Reply<()> },
    Mint { sale: Sale, caller: Account, quantity: u64, payment: Wei, reply: Reply<MintReceipt> },
    ReserveMint { caller: Account, recipient: Account, quantity: u64, reply: Reply<MintReceipt> },
    Withdraw { caller: Account, reply: Reply<Wei> },
    BalanceOf { account: Account, reply: Reply<u64> },
    Status { reply: Reply<LedgerStatus> },
}

/// Owns the ledger and its optional backing store
pub struct LedgerService {
    ledger: MintLedger,
    store: Option<MintStore>,
    commands: mpsc::Receiver<Command>,
}

impl LedgerService {
    /// Spawn an in-memory service. The join handle yields the final ledger
    /// once every handle has been dropped.
    pub fn spawn(ledger: MintLedger, config: ServiceConfig) -> (LedgerHandle, JoinHandle<MintLedger>) {
        Self::start(ledger, None, config)
    }

    /// Spawn a service that persists every accepted change to `store`.
    /// The ledger is saved first so the store always holds a snapshot to
    /// fall back on.
    pub fn spawn_persistent(
        ledger: MintLedger,
        store: MintStore,
        config: ServiceConfig,
    ) -> Result<(LedgerHandle, JoinHandle<MintLedger>), ServiceError> {
        store.save_ledger(&ledger)?;
        Ok(Self::start(ledger, Some(store), config))
    }

    fn start(
        ledger: MintLedger,
        store: Option<MintStore>,
        config: ServiceConfig,
    ) -> (LedgerHandle, JoinHandle<MintLedger>) {
        let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
        let service = Self {
            ledger,
            store,
            commands: rx,
        };
        let task = tokio::spawn(service.run());
        (LedgerHandle { tx }, task)
    }

    async fn run(mut self) -> MintLedger {
        while let Some(command) = self.commands.recv().await {
            self.handle(command);
        }
        debug!("Ledger service stopped");
        self.ledger
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::SetAllowListStatus { caller, enabled, reply } => {
                let result = self.apply(|l| l.set_allow_list_status(&caller, enabled));
                respond(reply, result);
            }
            Command::SetAllowList { caller, accounts, reply } => {
                let result = self.apply(|l| l.set_allow_list(&caller, accounts));
                respond(reply, result);
            }
            Command::SetPublicSaleStatus { caller, enabled, reply } => {
                let result = self.apply(|l| l.set_public_sale_status(&caller, enabled));
                respond(reply, result);
            }
            Command::StartAuction { caller, reply } => {
                let result = self.apply(|l| l.set_auction_sale_start(&caller));
                respond(reply, result);
            }
            Command::SetBaseUri { caller, base_uri, reply } => {
                let result = self.apply(|l| l.set_base_uri(&caller, base_uri));
                respond(reply, result);
            }
            Command::Mint { sale, caller, quantity, payment, reply } => {
                let result = self.apply_mint(|l| match sale {
                    Sale::AllowList => l.allow_list_mint(&caller, quantity, payment),
                    Sale::PublicSale => l.public_sale_mint(&caller, quantity, payment),
                    Sale::Auction => l.auction_mint(&caller, quantity, payment),
                });
                respond(reply, result);
            }
            Command::ReserveMint { caller, recipient, quantity, reply } => {
                let result = self.apply_mint(|l| l.reserve_mint(&caller, recipient, quantity));
                respond(reply, result);
            }
            Command::Withdraw { caller, reply } => {
                let result = self.apply(|l| l.withdraw_money(&caller));
                respond(reply, result);
            }
            Command::BalanceOf { account, reply } => {
                respond(reply, Ok(self.ledger.balance_of(&account)));
            }
            Command::Status { reply } => {
                respond(reply, Ok(self.ledger.status()));
            }
        }
    }

    /// Run a mutating operation and persist the new snapshot
    fn apply<T, F>(&mut self, op: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut MintLedger) -> Result<T, MintError>,
    {
        self.apply_with(op, |store, ledger, _| store.save_ledger(ledger))
    }

    /// Run a mint and commit its snapshot together with its receipt
    fn apply_mint<F>(&mut self, op: F) -> Result<MintReceipt, ServiceError>
    where
        F: FnOnce(&mut MintLedger) -> Result<MintReceipt, MintError>,
    {
        self.apply_with(op, |store, ledger, receipt| store.commit_mint(ledger, receipt))
    }

    /// Ledger operations check before they mutate, so a rejected call has
    /// nothing to undo. When persisting an accepted change fails, the live
    /// ledger is reloaded from the last stored snapshot.
    fn apply_with<T, F, P>(&mut self, op: F, persist: P) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut MintLedger) -> Result<T, MintError>,
        P: FnOnce(&MintStore, &MintLedger, &T) -> Result<(), StoreError>,
    {
        let value = op(&mut self.ledger)?;

        let Some(store) = &self.store else {
            return Ok(value);
        };

        if let Err(err) = persist(store, &self.ledger, &value) {
            error!(error = %err, "Persisting ledger failed, rolling back");
            match store.load_ledger() {
                Ok(Some(saved)) => self.ledger = saved,
                Ok(None) => error!("No stored snapshot to roll back to"),
                Err(reload) => error!(error = %reload, "Rollback failed"),
            }
            return Err(err.into());
        }

        Ok(value)
    }
}

fn respond<T>(reply: Reply<T>, result: Result<T, ServiceError>) {
    if reply.send(result).is_err() {
        warn!("Caller dropped before the ledger replied");
    }
}

/// Cloneable front door to a running `LedgerService`
#[derive(Clone)]
pub struct LedgerHandle {
    tx: mpsc::Sender<Command>,
}

impl LedgerHandle {
    async fn call<T>(&self, build: impl FnOnce(Reply<T>) -> Command) -> Result<T, ServiceError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| ServiceError::Closed)?;
        response.await.map_err(|_| ServiceError::Closed)?
    }

    pub async fn set_allow_list_status(&self, caller: Account, enabled: bool) -> Result<(), ServiceError> {
        self.call(|reply| Command::SetAllowListStatus { caller, enabled, reply }).await
    }

    pub async fn set_allow_list(&self, caller: Account, accounts: Vec<Account>) -> Result<(), ServiceError> {
        self.call(|reply| Command::SetAllowList { caller, accounts, reply }).await
    }

    pub async fn set_public_sale_status(&self, caller: Account, enabled: bool) -> Result<(), ServiceError> {
        self.call(|reply| Command::SetPublicSaleStatus { caller, enabled, reply }).await
    }

    pub async fn set_auction_sale_start(&self, caller: Account) -> Result<(), ServiceError> {
        self.call(|reply| Command::StartAuction { caller, reply }).await
    }

    pub async fn set_base_uri(&self, caller: Account, base_uri: String) -> Result<(), ServiceError> {
        self.call(|reply| Command::SetBaseUri { caller, base_uri, reply }).await
    }

    pub async fn allow_list_mint(&self, caller: Account, quantity: u64, payment: Wei) -> Result<MintReceipt, ServiceError> {
        self.mint(Sale::AllowList, caller, quantity, payment).await
    }

    pub async fn public_sale_mint(&self, caller: Account, quantity: u64, payment: Wei) -> Result<MintReceipt, ServiceError> {
        self.mint(Sale::PublicSale, caller, quantity, payment).await
    }

    pub async fn auction_mint(&self, caller: Account, quantity: u64, payment: Wei) -> Result<MintReceipt, ServiceError> {
        self.mint(Sale::Auction, caller, quantity, payment).await
    }

    async fn mint(&self, sale: Sale, caller: Account, quantity: u64, payment: Wei) -> Result<MintReceipt, ServiceError> {
        self.call(|reply| Command::Mint { sale, caller, quantity, payment, reply }).await
    }

    pub async fn reserve_mint(&self, caller: Account, recipient: Account, quantity: u64) -> Result<MintReceipt, ServiceError> {
        self.call(|reply| Command::ReserveMint { caller, recipient, quantity, reply }).await
    }

    pub async fn withdraw_money(&self, caller: Account) -> Result<Wei, ServiceError> {
        self.call(|reply| Command::Withdraw { caller, reply }).await
    }

    pub async fn balance_of(&self, account: Account) -> Result<u64, ServiceError> {
        self.call(|reply| Command::BalanceOf { account, reply }).await
    }

    pub async fn status(&self) -> Result<LedgerStatus, ServiceError> {
        self.call(|reply| Command::Status { reply }).await
    }
}
