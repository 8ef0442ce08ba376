// Actor Tests
// Tests for the single-writer ledger service

use amadeus_mint::account::Account;
use amadeus_mint::ledger::{parse_ether, MintError, MintLedger, Wei};
use amadeus_mint::service::{LedgerService, ServiceConfig, ServiceError};
use amadeus_mint::storage::MintStore;
use tempfile::TempDir;

fn eth(amount: &str) -> Wei {
    parse_ether(amount).unwrap()
}

#[tokio::test]
async fn test_mints_through_handle() {
    let owner = Account::generate();
    let buyer = Account::generate();
    let (handle, task) = LedgerService::spawn(MintLedger::deploy(owner), ServiceConfig::default());

    handle.set_public_sale_status(owner, true).await.unwrap();
    let receipt = handle.public_sale_mint(buyer, 2, eth("0.04")).await.unwrap();

    assert_eq!(receipt.first_token_id, 0);
    assert_eq!(receipt.quantity, 2);
    assert_eq!(handle.balance_of(buyer).await.unwrap(), 2);
    assert_eq!(handle.status().await.unwrap().treasury, eth("0.04"));

    drop(handle);
    let ledger = task.await.unwrap();
    assert_eq!(ledger.total_minted(), 2);
}

#[tokio::test]
async fn test_rejections_pass_through() {
    let owner = Account::generate();
    let stranger = Account::generate();
    let (handle, _task) = LedgerService::spawn(MintLedger::deploy(owner), ServiceConfig::default());

    let err = handle.auction_mint(stranger, 1, eth("0.5")).await.unwrap_err();
    assert_eq!(err.to_string(), "sale has not started yet");

    let err = handle.set_auction_sale_start(stranger).await.unwrap_err();
    assert!(matches!(err, ServiceError::Rejected(MintError::Unauthorized)));

    let err = handle.withdraw_money(stranger).await.unwrap_err();
    assert!(matches!(err, ServiceError::Rejected(MintError::Unauthorized)));
}

#[tokio::test]
async fn test_concurrent_mints_never_oversell() {
    let owner = Account::generate();
    let (handle, task) =
        LedgerService::spawn(MintLedger::deploy(owner), ServiceConfig::new().with_channel_capacity(4));
    handle.set_auction_sale_start(owner).await.unwrap();

    let mut joins = Vec::new();
    for _ in 0..10 {
        let handle = handle.clone();
        joins.push(tokio::spawn(async move {
            handle.auction_mint(Account::generate(), 2, eth("1.0")).await
        }));
    }

    let mut minted = 0;
    let mut exhausted = 0;
    for join in joins {
        match join.await.unwrap() {
            Ok(receipt) => minted += receipt.quantity,
            Err(ServiceError::Rejected(MintError::SupplyExhausted)) => exhausted += 1,
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    // Max supply 6 fits exactly three batches of two
    assert_eq!(minted, 6);
    assert_eq!(exhausted, 7);

    drop(handle);
    let ledger = task.await.unwrap();
    assert_eq!(ledger.total_minted(), 6);
    assert_eq!(ledger.treasury(), eth("3.0"));
}

#[tokio::test]
async fn test_reserve_mint_to_recipient() {
    let owner = Account::generate();
    let team = Account::generate();
    let (handle, _task) = LedgerService::spawn(MintLedger::deploy(owner), ServiceConfig::default());

    let receipt = handle.reserve_mint(owner, team, 2).await.unwrap();
    assert_eq!(receipt.minter, team);
    assert_eq!(receipt.paid, 0);
    assert_eq!(handle.balance_of(team).await.unwrap(), 2);
    assert_eq!(handle.status().await.unwrap().reserve_minted, 2);
}

#[tokio::test]
async fn test_closed_service() {
    let owner = Account::generate();
    let (handle, task) = LedgerService::spawn(MintLedger::deploy(owner), ServiceConfig::default());

    task.abort();
    let _ = task.await;

    let err = handle.status().await.unwrap_err();
    assert!(matches!(err, ServiceError::Closed));
}

#[tokio::test]
async fn test_store_receives_every_accepted_change() {
    let temp_dir = TempDir::new().unwrap();
    let owner = Account::generate();
    let buyer = Account::generate();

    {
        let store = MintStore::open(temp_dir.path()).unwrap();
        let (handle, task) =
            LedgerService::spawn_persistent(MintLedger::deploy(owner), store, ServiceConfig::default())
                .unwrap();

        handle.set_allow_list_status(owner, true).await.unwrap();
        handle.set_allow_list(owner, vec![buyer]).await.unwrap();
        handle.set_base_uri(owner, "ipfs://x/".to_string()).await.unwrap();
        let receipt = handle.allow_list_mint(buyer, 1, eth("0.02")).await.unwrap();
        assert_eq!(receipt.first_token_id, 0);

        // Rejected calls leave the persisted snapshot untouched
        assert!(handle.allow_list_mint(buyer, 1, eth("0.02")).await.is_err());

        drop(handle);
        task.await.unwrap();
    }

    let store = MintStore::open(temp_dir.path()).unwrap();
    let ledger = store.load_ledger().unwrap().unwrap();
    assert!(ledger.allow_list_status());
    assert_eq!(ledger.balance_of(&buyer), 1);
    assert_eq!(ledger.total_minted(), 1);
    assert_eq!(ledger.token_uri(0).unwrap(), "ipfs://x/0");

    let receipts = store.load_receipts().unwrap();
    assert_eq!(receipts.len(), 1);
    assert_eq!(receipts[0].minter, buyer);
    assert_eq!(receipts[0].paid, eth("0.02"));
}

#[tokio::test]
async fn test_persistent_service_journals_every_mint() {
    let temp_dir = TempDir::new().unwrap();
    let owner = Account::generate();
    let team = Account::generate();
    let buyer = Account::generate();

    {
        let store = MintStore::open(temp_dir.path()).unwrap();
        let (handle, task) =
            LedgerService::spawn_persistent(MintLedger::deploy(owner), store, ServiceConfig::default())
                .unwrap();

        handle.set_public_sale_status(owner, true).await.unwrap();
        handle.public_sale_mint(buyer, 1, eth("0.02")).await.unwrap();
        handle.reserve_mint(owner, team, 2).await.unwrap();
        handle.set_auction_sale_start(owner).await.unwrap();
        handle.auction_mint(buyer, 1, eth("0.5")).await.unwrap();

        drop(handle);
        task.await.unwrap();
    }

    let store = MintStore::open(temp_dir.path()).unwrap();
    let firsts: Vec<u64> = store
        .load_receipts()
        .unwrap()
        .iter()
        .map(|r| r.first_token_id)
        .collect();
    assert_eq!(firsts, vec![0, 1, 3]);
    assert_eq!(store.summary().unwrap().receipts, 3);
    assert_eq!(store.load_ledger().unwrap().unwrap().total_minted(), 4);
}

#[tokio::test]
async fn test_persistent_service_saves_initial_ledger() {
    let temp_dir = TempDir::new().unwrap();
    let owner = Account::generate();

    {
        let store = MintStore::open(temp_dir.path()).unwrap();
        let (handle, task) =
            LedgerService::spawn_persistent(MintLedger::deploy(owner), store, ServiceConfig::default())
                .unwrap();

        // Reads never write
        assert_eq!(handle.status().await.unwrap().owner, owner);
        drop(handle);
        task.await.unwrap();
    }

    let store = MintStore::open(temp_dir.path()).unwrap();
    let ledger = store.load_ledger().unwrap().unwrap();
    assert_eq!(ledger.owner(), &owner);
    assert_eq!(ledger.total_minted(), 0);
}
