// Randomized operation sequences checked against the ledger invariants

use crate::eth;
use amadeus_mint::account::Account;
use amadeus_mint::ledger::{LedgerConfig, MintError, MintLedger, Phase, Wei};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn check_invariants(ledger: &MintLedger, accounts: &[Account], expected_treasury: Wei) {
    let config = ledger.config();

    assert!(ledger.total_minted() <= ledger.max_supply());
    assert_eq!(ledger.total_minted(), ledger.total_supply());
    assert_eq!(ledger.treasury(), expected_treasury);

    let mut sum = 0;
    for account in accounts {
        let allow = ledger.minted_in_phase(Phase::AllowList, account);
        let public = ledger.minted_in_phase(Phase::PublicSale, account);
        let auction = ledger.minted_in_phase(Phase::Auction, account);
        let reserve = ledger.minted_in_phase(Phase::Reserve, account);

        assert!(allow <= config.allow_list_per_account);
        assert!(public <= config.public_per_account);
        assert!(auction <= config.auction_per_account);
        assert_eq!(ledger.balance_of(account), allow + public + auction + reserve);
        assert_eq!(ledger.tokens_of_owner(account).len() as u64, ledger.balance_of(account));

        sum += ledger.balance_of(account);
    }
    assert_eq!(sum, ledger.total_minted());
}

fn run_random_sequence(seed: u64, config: LedgerConfig) {
    let mut rng = StdRng::seed_from_u64(seed);
    let owner = Account::generate();
    let buyers: Vec<Account> = (0..4).map(|_| Account::generate()).collect();
    let mut everyone = buyers.clone();
    everyone.push(owner);

    let mut ledger = MintLedger::new(owner, config).unwrap();
    ledger.set_allow_list(&owner, buyers[..2].to_vec()).unwrap();

    let mut expected_treasury: Wei = 0;
    let payments = [eth("0"), eth("0.01"), eth("0.02"), eth("0.04"), eth("0.5"), eth("1.0")];

    for _ in 0..300 {
        let caller = everyone[rng.gen_range(0..everyone.len())];
        let quantity = rng.gen_range(0..4u64);
        let payment = payments[rng.gen_range(0..payments.len())];

        let before_status = ledger.status();
        let before_balance = ledger.balance_of(&caller);

        let outcome = match rng.gen_range(0..9) {
            0 => ledger.set_allow_list_status(&caller, rng.gen_bool(0.7)).map(|_| None),
            1 => ledger.set_public_sale_status(&caller, rng.gen_bool(0.7)).map(|_| None),
            2 => ledger.set_auction_sale_start(&caller).map(|_| None),
            3 => ledger.allow_list_mint(&caller, quantity, payment).map(Some),
            4 => ledger.public_sale_mint(&caller, quantity, payment).map(Some),
            5 => ledger.auction_mint(&caller, quantity, payment).map(Some),
            6 => ledger.reserve_mint_to_owner(&caller, quantity).map(Some),
            7 => ledger.withdraw_money(&caller).map(|amount| {
                assert_eq!(amount, expected_treasury);
                expected_treasury = 0;
                None
            }),
            _ => ledger.set_allow_list(&caller, buyers[1..3].to_vec()).map(|_| None),
        };

        match outcome {
            Ok(Some(receipt)) => {
                expected_treasury += receipt.paid;
                assert_eq!(ledger.total_minted(), before_status.total_minted + receipt.quantity);
                assert_eq!(receipt.first_token_id, before_status.total_minted);
            }
            Ok(None) => {}
            Err(_) => {
                assert_eq!(ledger.total_minted(), before_status.total_minted);
                assert_eq!(ledger.treasury(), before_status.treasury);
                assert_eq!(ledger.balance_of(&caller), before_balance);
            }
        }

        check_invariants(&ledger, &everyone, expected_treasury);
    }
}

#[test]
fn test_random_sequences_default_config() {
    for seed in 0..20 {
        run_random_sequence(seed, LedgerConfig::default());
    }
}

#[test]
fn test_random_sequences_large_supply() {
    let config = LedgerConfig::new()
        .with_max_supply(40)
        .with_reserve_cap(10)
        .with_max_batch(3)
        .with_public_per_account(4)
        .with_auction_per_account(3);

    for seed in 100..120 {
        run_random_sequence(seed, config.clone());
    }
}

#[test]
fn test_failed_mints_change_nothing() {
    let owner = Account::generate();
    let buyer = Account::generate();
    let mut ledger = MintLedger::deploy(owner);
    ledger.set_auction_sale_start(&owner).unwrap();

    for quantity in 0..5 {
        let before = ledger.status();
        let _ = ledger.auction_mint(&buyer, quantity, 0);
        assert_eq!(ledger.status(), before);
    }

    assert_eq!(ledger.balance_of(&buyer), 0);
}

#[test]
fn test_treasury_overflow_rejected() {
    let owner = Account::generate();
    let a = Account::generate();
    let b = Account::generate();
    let mut ledger = MintLedger::deploy(owner);
    ledger.set_public_sale_status(&owner, true).unwrap();

    let huge = Wei::MAX / 2 + 1;
    ledger.public_sale_mint(&a, 1, huge).unwrap();

    let before = ledger.status();
    let result = ledger.public_sale_mint(&b, 1, huge);

    assert_eq!(result.unwrap_err(), MintError::TreasuryOverflow);
    assert_eq!(ledger.status(), before);
    assert_eq!(ledger.treasury(), huge);
    assert_eq!(ledger.balance_of(&b), 0);

    // Once withdrawn the same payment fits again
    assert_eq!(ledger.withdraw_money(&owner).unwrap(), huge);
    ledger.public_sale_mint(&b, 1, huge).unwrap();
    assert_eq!(ledger.treasury(), huge);
}
