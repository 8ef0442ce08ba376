// Token registry - grow-only record of which account owns each token id
// Token ids are dense and assigned in mint order starting at 0

use crate::account::Account;
use serde::{Deserialize, Serialize};

/// Append-only ownership table. Tokens are never burned or transferred.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRegistry {
    owners: Vec<Account>,
}

impl TokenRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self { owners: Vec::new() }
    }

    /// Number of tokens in existence
    pub fn len(&self) -> u64 {
        self.owners.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// The id the next minted token will receive
    pub fn next_id(&self) -> u64 {
        self.len()
    }

    /// Assign `quantity` consecutive ids to `to`, returning the first one
    pub fn mint(&mut self, to: Account, quantity: u64) -> u64 {
        let first = self.next_id();
        self.owners
            .extend(std::iter::repeat(to).take(quantity as usize));
        first
    }

    /// Get the owner of a token
    pub fn owner_of(&self, token_id: u64) -> Option<&Account> {
        usize::try_from(token_id)
            .ok()
            .and_then(|index| self.owners.get(index))
    }

    /// All token ids owned by an account, ascending
    pub fn tokens_of(&self, account: &Account) -> Vec<u64> {
        self.owners
            .iter()
            .enumerate()
            .filter(|(_, owner)| *owner == account)
            .map(|(id, _)| id as u64)
            .collect()
    }
}
