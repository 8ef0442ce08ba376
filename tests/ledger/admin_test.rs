// Owner-only configuration and query tests

use crate::{eth, fixture};
use amadeus_mint::account::Account;
use amadeus_mint::ledger::{LedgerConfig, MintError, MintLedger};

#[test]
fn test_deploy_starts_closed() {
    let f = fixture();
    let status = f.ledger.status();

    assert_eq!(status.owner, f.owner);
    assert_eq!(status.total_minted, 0);
    assert_eq!(status.treasury, 0);
    assert!(!status.allow_list_enabled);
    assert!(!status.public_sale_enabled);
    assert!(!status.auction_started);
    assert_eq!(f.ledger.base_uri(), "");
}

#[test]
fn test_invalid_config_rejected_at_deploy() {
    let config = LedgerConfig::new().with_max_supply(0);
    assert!(MintLedger::new(Account::generate(), config).is_err());
}

#[test]
fn test_non_owner_configuration_rejected() {
    let mut f = fixture();
    let before = f.ledger.status();

    assert_eq!(f.ledger.set_allow_list_status(&f.alice, true), Err(MintError::Unauthorized));
    assert_eq!(f.ledger.set_allow_list(&f.alice, vec![f.alice]), Err(MintError::Unauthorized));
    assert_eq!(f.ledger.set_public_sale_status(&f.alice, true), Err(MintError::Unauthorized));
    assert_eq!(f.ledger.set_auction_sale_start(&f.alice), Err(MintError::Unauthorized));
    assert_eq!(f.ledger.set_base_uri(&f.alice, "ipfs://x/"), Err(MintError::Unauthorized));
    assert_eq!(f.ledger.transfer_ownership(&f.alice, f.alice), Err(MintError::Unauthorized));

    assert_eq!(f.ledger.status(), before);
    assert_eq!(f.ledger.base_uri(), "");
    assert!(!f.ledger.is_allow_listed(&f.alice));
}

#[test]
fn test_gates_are_independent() {
    let mut f = fixture();
    f.ledger.set_allow_list_status(&f.owner, true).unwrap();
    f.ledger.set_public_sale_status(&f.owner, true).unwrap();
    f.ledger.set_auction_sale_start(&f.owner).unwrap();

    assert!(f.ledger.allow_list_status());
    assert!(f.ledger.public_sale_status());
    assert!(f.ledger.auction_started());

    f.ledger.set_allow_list(&f.owner, vec![f.alice]).unwrap();
    f.ledger.allow_list_mint(&f.alice, 1, eth("0.02")).unwrap();
    f.ledger.public_sale_mint(&f.alice, 1, eth("0.02")).unwrap();
    f.ledger.auction_mint(&f.alice, 1, eth("0.5")).unwrap();
    assert_eq!(f.ledger.balance_of(&f.alice), 3);
}

#[test]
fn test_transfer_ownership() {
    let mut f = fixture();
    f.ledger.transfer_ownership(&f.owner, f.alice).unwrap();

    assert_eq!(f.ledger.owner(), &f.alice);
    assert_eq!(
        f.ledger.set_public_sale_status(&f.owner, true),
        Err(MintError::Unauthorized)
    );
    assert!(f.ledger.set_public_sale_status(&f.alice, true).is_ok());
}

// ============================================================================
// TOKEN QUERIES
// ============================================================================

#[test]
fn test_token_uri_uses_base_uri() {
    let mut f = fixture();
    f.ledger.set_base_uri(&f.owner, "ipfs://collection/").unwrap();
    f.ledger.reserve_mint_to_owner(&f.owner, 2).unwrap();

    assert_eq!(f.ledger.token_uri(0).unwrap(), "ipfs://collection/0");
    assert_eq!(f.ledger.token_uri(1).unwrap(), "ipfs://collection/1");
}

#[test]
fn test_token_uri_empty_without_base() {
    let mut f = fixture();
    f.ledger.reserve_mint_to_owner(&f.owner, 1).unwrap();
    assert_eq!(f.ledger.token_uri(0).unwrap(), "");
}

#[test]
fn test_unknown_token_not_found() {
    let f = fixture();
    assert_eq!(f.ledger.owner_of(0), Err(MintError::TokenNotFound(0)));
    assert_eq!(f.ledger.token_uri(7), Err(MintError::TokenNotFound(7)));
}

#[test]
fn test_token_ids_follow_mint_order() {
    let mut f = fixture();
    f.ledger.set_public_sale_status(&f.owner, true).unwrap();
    f.ledger.public_sale_mint(&f.alice, 2, eth("0.04")).unwrap();
    f.ledger.public_sale_mint(&f.bob, 1, eth("0.02")).unwrap();

    assert_eq!(f.ledger.tokens_of_owner(&f.alice), vec![0, 1]);
    assert_eq!(f.ledger.tokens_of_owner(&f.bob), vec![2]);
    assert_eq!(f.ledger.total_supply(), 3);
    assert_eq!(f.ledger.number_minted(&f.alice), 2);
}
