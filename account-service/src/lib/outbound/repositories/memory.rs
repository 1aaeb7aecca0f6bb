use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::account::errors::AccountError;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::models::NewAccount;
use crate::domain::account::ports::AccountRepository;

/// Process-local account store.
///
/// Used for tests and for running the service without PostgreSQL. Accounts
/// are keyed by normalized email; the existence check and the insert happen
/// under one write lock.
#[derive(Debug, Default)]
pub struct InMemoryAccountRepository {
    state: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    accounts: HashMap<String, Account>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    pub async fn len(&self) -> usize {
        self.state.read().await.accounts.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Account>, AccountError> {
        Ok(self
            .state
            .read()
            .await
            .accounts
            .get(&email.normalized())
            .cloned())
    }

    async fn create(&self, account: NewAccount) -> Result<Account, AccountError> {
        let key = account.email.normalized();
        let mut state = self.state.write().await;

        if state.accounts.contains_key(&key) {
            return Err(AccountError::EmailTaken(account.email.to_string()));
        }

        state.last_id += 1;
        let created = Account {
            id: AccountId(state.last_id),
            email: account.email,
            password_hash: account.password_hash,
            display_name: account.display_name,
            federated_identity: account.federated_identity,
            created_at: Utc::now(),
        };
        state.accounts.insert(key, created.clone());

        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            email: EmailAddress::new(email.to_string()).unwrap(),
            password_hash: "$argon2id$stub".to_string(),
            display_name: None,
            federated_identity: None,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let repository = InMemoryAccountRepository::new();

        let first = repository.create(new_account("a@x.com")).await.unwrap();
        let second = repository.create(new_account("b@x.com")).await.unwrap();

        assert_eq!(first.id, AccountId(1));
        assert_eq!(second.id, AccountId(2));
    }

    #[tokio::test]
    async fn test_non_ascii_case_is_folded() {
        let repository = InMemoryAccountRepository::new();
        repository.create(new_account("ÜSER@x.com")).await.unwrap();

        let found = repository
            .find_by_email(&EmailAddress::new("üser@x.com".to_string()).unwrap())
            .await
            .unwrap();
        assert!(found.is_some());

        let result = repository.create(new_account("üser@x.com")).await;
        assert!(matches!(result, Err(AccountError::EmailTaken(_))));
    }

    #[tokio::test]
    async fn test_find_by_email_ignores_case() {
        let repository = InMemoryAccountRepository::new();
        repository.create(new_account("Alice@X.com")).await.unwrap();

        let found = repository
            .find_by_email(&EmailAddress::new("alice@x.COM".to_string()).unwrap())
            .await
            .unwrap()
            .expect("account should be found");

        // Stored spelling is preserved
        assert_eq!(found.email.as_str(), "Alice@X.com");
    }

    #[tokio::test]
    async fn test_find_missing() {
        let repository = InMemoryAccountRepository::new();
        let found = repository
            .find_by_email(&EmailAddress::new("a@x.com".to_string()).unwrap())
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_create_duplicate_email() {
        let repository = InMemoryAccountRepository::new();
        repository.create(new_account("a@x.com")).await.unwrap();

        let result = repository.create(new_account("A@x.com")).await;
        assert!(matches!(result, Err(AccountError::EmailTaken(_))));
        assert_eq!(repository.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_yield_one_account() {
        let repository = Arc::new(InMemoryAccountRepository::new());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let repository = Arc::clone(&repository);
                tokio::spawn(async move { repository.create(new_account("a@x.com")).await })
            })
            .collect();

        let mut created = 0;
        let mut taken = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(AccountError::EmailTaken(_)) => taken += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(taken, 15);
        assert_eq!(repository.len().await, 1);
    }
}
