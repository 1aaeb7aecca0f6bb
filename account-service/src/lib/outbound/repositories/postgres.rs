use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;

use crate::account::errors::AccountError;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::models::FederatedIdentity;
use crate::domain::account::models::NewAccount;
use crate::domain::account::ports::AccountRepository;

const EMAIL_UNIQUE_INDEX: &str = "accounts_email_normalized_key";

pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: i64,
    email: String,
    password_hash: String,
    display_name: Option<String>,
    provider: Option<String>,
    provider_subject: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = AccountError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let federated_identity = match (row.provider, row.provider_subject) {
            (Some(provider), Some(subject)) => Some(FederatedIdentity { provider, subject }),
            _ => None,
        };

        Ok(Account {
            id: AccountId(row.id),
            email: EmailAddress::new(row.email)?,
            password_hash: row.password_hash,
            display_name: row.display_name,
            federated_identity,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Account>, AccountError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, email, password_hash, display_name, provider, provider_subject, created_at
            FROM accounts
            WHERE email_normalized = $1
            "#,
        )
        .bind(email.normalized())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        row.map(Account::try_from).transpose()
    }

    async fn create(&self, account: NewAccount) -> Result<Account, AccountError> {
        let (provider, provider_subject) = match &account.federated_identity {
            Some(identity) => (Some(identity.provider.as_str()), Some(identity.subject.as_str())),
            None => (None, None),
        };

        // Uniqueness is enforced by the email_normalized index, atomically with the insert
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO accounts (email, email_normalized, password_hash, display_name, provider, provider_subject)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, email, password_hash, display_name, provider, provider_subject, created_at
            "#,
        )
        .bind(account.email.as_str())
        .bind(account.email.normalized())
        .bind(&account.password_hash)
        .bind(account.display_name.as_deref())
        .bind(provider)
        .bind(provider_subject)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() && db_err.constraint() == Some(EMAIL_UNIQUE_INDEX) {
                    return AccountError::EmailTaken(account.email.to_string());
                }
            }
            AccountError::DatabaseError(e.to_string())
        })?;

        Account::try_from(row)
    }
}
