// mint - command line front end for a persisted minting ledger
//
// Every invocation loads the ledger from the database directory, applies
// one operation and writes the result back.

use amadeus_mint::account::Account;
use amadeus_mint::ledger::{
    format_ether, parse_ether, ConfigError, LedgerConfig, MintError, MintLedger, MintReceipt, Wei,
};
use amadeus_mint::storage::{MintStore, StoreError};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mint", version, about = "Phased token minting ledger")]
struct Cli {
    /// Directory holding the ledger database
    #[arg(long, default_value = "mint-db")]
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Deploy a new ledger into the database
    Deploy(DeployArgs),
    SetBaseUri {
        #[arg(long)]
        from: Account,
        uri: String,
    },
    AllowListStatus {
        #[arg(long)]
        from: Account,
        #[arg(action = ArgAction::Set)]
        enabled: bool,
    },
    SetAllowList {
        #[arg(long)]
        from: Account,
        accounts: Vec<Account>,
    },
    PublicSaleStatus {
        #[arg(long)]
        from: Account,
        #[arg(action = ArgAction::Set)]
        enabled: bool,
    },
    StartAuction {
        #[arg(long)]
        from: Account,
    },
    AllowListMint {
        #[arg(long)]
        from: Account,
        quantity: u64,
        /// Payment in ether, e.g. 0.02
        #[arg(long, value_parser = parse_ether, default_value = "0")]
        value: Wei,
    },
    PublicMint {
        #[arg(long)]
        from: Account,
        quantity: u64,
        #[arg(long, value_parser = parse_ether, default_value = "0")]
        value: Wei,
    },
    AuctionMint {
        #[arg(long)]
        from: Account,
        quantity: u64,
        #[arg(long, value_parser = parse_ether, default_value = "0")]
        value: Wei,
    },
    ReserveMint {
        #[arg(long)]
        from: Account,
        quantity: u64,
        /// Recipient, defaults to the owner
        #[arg(long)]
        to: Option<Account>,
    },
    Withdraw {
        #[arg(long)]
        from: Account,
    },
    TransferOwnership {
        #[arg(long)]
        from: Account,
        new_owner: Account,
    },
    Balance {
        account: Account,
    },
    OwnerOf {
        token_id: u64,
    },
    TokenUri {
        token_id: u64,
    },
    Status,
    /// List every recorded mint
    Receipts,
}

#[derive(Args, Debug)]
struct DeployArgs {
    #[arg(long)]
    owner: Account,
    #[arg(long)]
    max_supply: Option<u64>,
    #[arg(long)]
    reserve_cap: Option<u64>,
    #[arg(long)]
    max_batch: Option<u64>,
    #[arg(long)]
    allow_list_per_account: Option<u64>,
    #[arg(long)]
    public_per_account: Option<u64>,
    #[arg(long)]
    auction_per_account: Option<u64>,
    /// Metadata base URI set right after deployment
    #[arg(long)]
    base_uri: Option<String>,
}

#[derive(Error, Debug)]
enum CliError {
    #[error("{0}")]
    Rejected(#[from] MintError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("No ledger deployed in {0}")]
    NotDeployed(PathBuf),

    #[error("A ledger is already deployed in {0}")]
    AlreadyDeployed(PathBuf),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let store = MintStore::open(&cli.db)?;

    match cli.command {
        Command::Deploy(args) => deploy(&store, cli.db, args),
        command => execute(&store, cli.db, command),
    }
}

fn deploy(store: &MintStore, db: PathBuf, args: DeployArgs) -> Result<(), CliError> {
    if store.has_ledger()? {
        return Err(CliError::AlreadyDeployed(db));
    }

    let defaults = LedgerConfig::default();
    let config = LedgerConfig::new()
        .with_max_supply(args.max_supply.unwrap_or(defaults.max_supply))
        .with_reserve_cap(args.reserve_cap.unwrap_or(defaults.reserve_cap))
        .with_max_batch(args.max_batch.unwrap_or(defaults.max_batch))
        .with_allow_list_per_account(
            args.allow_list_per_account
                .unwrap_or(defaults.allow_list_per_account),
        )
        .with_public_per_account(args.public_per_account.unwrap_or(defaults.public_per_account))
        .with_auction_per_account(
            args.auction_per_account
                .unwrap_or(defaults.auction_per_account),
        );

    let owner = args.owner;
    let mut ledger = MintLedger::new(owner, config)?;
    if let Some(uri) = args.base_uri {
        ledger.set_base_uri(&owner, uri)?;
    }

    save(store, &ledger)?;
    info!(db = %db.display(), "Deployed");
    println!("deployed ledger owned by {}", owner);
    Ok(())
}

fn execute(store: &MintStore, db: PathBuf, command: Command) -> Result<(), CliError> {
    let mut ledger = store
        .load_ledger()?
        .ok_or_else(|| CliError::NotDeployed(db.clone()))?;

    match command {
        Command::Deploy(_) => return Err(CliError::AlreadyDeployed(db)),
        Command::SetBaseUri { from, uri } => {
            ledger.set_base_uri(&from, uri)?;
            save(store, &ledger)?;
        }
        Command::AllowListStatus { from, enabled } => {
            ledger.set_allow_list_status(&from, enabled)?;
            save(store, &ledger)?;
        }
        Command::SetAllowList { from, accounts } => {
            ledger.set_allow_list(&from, accounts)?;
            save(store, &ledger)?;
        }
        Command::PublicSaleStatus { from, enabled } => {
            ledger.set_public_sale_status(&from, enabled)?;
            save(store, &ledger)?;
        }
        Command::StartAuction { from } => {
            ledger.set_auction_sale_start(&from)?;
            save(store, &ledger)?;
        }
        Command::AllowListMint { from, quantity, value } => {
            let receipt = ledger.allow_list_mint(&from, quantity, value)?;
            commit(store, &ledger, &receipt)?;
        }
        Command::PublicMint { from, quantity, value } => {
            let receipt = ledger.public_sale_mint(&from, quantity, value)?;
            commit(store, &ledger, &receipt)?;
        }
        Command::AuctionMint { from, quantity, value } => {
            let receipt = ledger.auction_mint(&from, quantity, value)?;
            commit(store, &ledger, &receipt)?;
        }
        Command::ReserveMint { from, quantity, to } => {
            let recipient = to.unwrap_or(*ledger.owner());
            let receipt = ledger.reserve_mint(&from, recipient, quantity)?;
            commit(store, &ledger, &receipt)?;
        }
        Command::Withdraw { from } => {
            let amount = ledger.withdraw_money(&from)?;
            save(store, &ledger)?;
            println!("withdrew {} ETH to {}", format_ether(amount), ledger.owner());
        }
        Command::TransferOwnership { from, new_owner } => {
            ledger.transfer_ownership(&from, new_owner)?;
            save(store, &ledger)?;
        }
        Command::Balance { account } => {
            println!("{}", ledger.balance_of(&account));
        }
        Command::OwnerOf { token_id } => {
            println!("{}", ledger.owner_of(token_id)?);
        }
        Command::TokenUri { token_id } => {
            println!("{}", ledger.token_uri(token_id)?);
        }
        Command::Status => {
            let status = ledger.status();
            println!("owner:            {}", status.owner);
            println!("minted:           {}/{}", status.total_minted, status.max_supply);
            println!("reserve minted:   {}", status.reserve_minted);
            println!("treasury:         {} ETH", format_ether(status.treasury));
            println!("allow-list sale:  {}", on_off(status.allow_list_enabled));
            println!("allow-list size:  {}", status.allow_list_size);
            println!("public sale:      {}", on_off(status.public_sale_enabled));
            println!("auction:          {}", on_off(status.auction_started));

            let summary = store.summary()?;
            println!("receipts:         {}", summary.receipts);
            println!("database size:    {} bytes", summary.disk_size_bytes);
        }
        Command::Receipts => {
            for receipt in store.load_receipts()? {
                println!(
                    "{:<12} {} tokens {}..{} paid {} ETH",
                    receipt.phase.to_string(),
                    receipt.minter,
                    receipt.token_ids().start,
                    receipt.token_ids().end,
                    format_ether(receipt.paid)
                );
            }
        }
    }

    Ok(())
}

fn save(store: &MintStore, ledger: &MintLedger) -> Result<(), CliError> {
    store.save_ledger(ledger)?;
    store.flush()?;
    Ok(())
}

fn commit(store: &MintStore, ledger: &MintLedger, receipt: &MintReceipt) -> Result<(), CliError> {
    store.commit_mint(ledger, receipt)?;
    store.flush()?;
    println!(
        "minted {} to {} (tokens {}..{})",
        receipt.quantity,
        receipt.minter,
        receipt.token_ids().start,
        receipt.token_ids().end
    );
    Ok(())
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "open"
    } else {
        "closed"
    }
}
