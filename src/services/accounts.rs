//! Account flows: signup, login, forgot password, reset password.

use std::sync::Arc;

use chrono::Duration;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::{
    hash_password, verify_password, ClaimSet, TokenError, TokenService,
    DEFAULT_RESET_TOKEN_TTL_MINUTES,
};
use crate::db::{StoreError, UserStore};
use crate::email::{reset_email, DispatchError, Mailer};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("account already exists")]
    AlreadyExists,

    #[error("account not found")]
    AccountNotFound,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid or expired token")]
    InvalidOrExpiredToken,

    #[error("password update matched no account")]
    UpdateFailed,

    #[error(transparent)]
    Store(StoreError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AlreadyExists => AccountError::AlreadyExists,
            other => AccountError::Store(other),
        }
    }
}

impl From<TokenError> for AccountError {
    fn from(err: TokenError) -> Self {
        AccountError::Internal(err.into())
    }
}

#[derive(Debug, Clone)]
pub struct AccountSettings {
    /// Lifetime of access tokens handed out at login.
    pub access_token_ttl: Duration,
    pub reset_token_ttl: Duration,
    /// Base of the reset link, e.g. `https://accounts.example.com`.
    pub reset_url_base: String,
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            access_token_ttl: Duration::minutes(30),
            reset_token_ttl: Duration::minutes(DEFAULT_RESET_TOKEN_TTL_MINUTES),
            reset_url_base: "http://localhost:8000".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Composes the user store, token service and mailer. Cheap to clone.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn UserStore>,
    tokens: TokenService,
    mailer: Arc<dyn Mailer>,
    settings: AccountSettings,
}

impl AccountService {
    pub fn new(
        store: Arc<dyn UserStore>,
        tokens: TokenService,
        mailer: Arc<dyn Mailer>,
        settings: AccountSettings,
    ) -> Self {
        Self {
            store,
            tokens,
            mailer,
            settings,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<CreatedUser, AccountError> {
        // Skip the hash for the common duplicate case; the insert itself is still conditional.
        if self.store.find_by_email(email).await?.is_some() {
            debug!(email = %email, "signup rejected: email taken");
            return Err(AccountError::AlreadyExists);
        }

        let password_hash = hash_password(password)?;
        let id = self.store.create_user(name, email, &password_hash).await?;
        info!(user_id = %id, email = %email, "account created");

        Ok(CreatedUser {
            id,
            name: name.to_string(),
            email: email.to_string(),
        })
    }

    /// Returns a signed access token whose `sub` is the account email.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AccountError> {
        let user = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(AccountError::AccountNotFound)?;

        if !verify_password(password, &user.password_hash)? {
            debug!(email = %email, "login rejected: wrong password");
            return Err(AccountError::InvalidCredentials);
        }

        let mut claims = ClaimSet::new();
        claims.insert("sub".to_string(), Value::from(user.email));
        let token = self
            .tokens
            .issue_access_token(&claims, self.settings.access_token_ttl)?;
        info!(user_id = %user.id, "login succeeded");
        Ok(token)
    }

    /// Issue a reset token and mail the link. Returns the issued token.
    pub async fn forgot_password(&self, email: &str) -> Result<String, AccountError> {
        if self.store.find_by_email(email).await?.is_none() {
            return Err(AccountError::AccountNotFound);
        }

        let token = self
            .tokens
            .issue_reset_token(email, self.settings.reset_token_ttl)?;
        let link = self.reset_link(&token);
        self.mailer.send(&reset_email(email, &link)).await?;
        info!(email = %email, "password reset email dispatched");
        Ok(token)
    }

    /// Set a new password for the account named by a valid reset token.
    ///
    /// The token stays usable until it expires; nothing marks it consumed.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AccountError> {
        let email = self
            .tokens
            .verify_reset_token(token)
            .ok_or(AccountError::InvalidOrExpiredToken)?;

        let password_hash = hash_password(new_password)?;
        if !self.store.update_password_hash(&email, &password_hash).await? {
            warn!(email = %email, "password reset matched no account");
            return Err(AccountError::UpdateFailed);
        }
        info!(email = %email, "password reset");
        Ok(())
    }

    pub fn reset_link(&self, token: &str) -> String {
        format!(
            "{}/reset-password?token={}",
            self.settings.reset_url_base, token
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryUserStore;
    use crate::email::EmailMessage;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<EmailMessage>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, message: &EmailMessage) -> Result<(), DispatchError> {
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    struct RejectingMailer;

    #[async_trait]
    impl Mailer for RejectingMailer {
        async fn send(&self, _message: &EmailMessage) -> Result<(), DispatchError> {
            Err(DispatchError::Rejected {
                status: 400,
                body: "invalid sender".to_string(),
            })
        }
    }

    fn service_with(store: MemoryUserStore, mailer: Arc<dyn Mailer>) -> AccountService {
        AccountService::new(
            Arc::new(store),
            TokenService::new("unit-secret"),
            mailer,
            AccountSettings::default(),
        )
    }

    fn service() -> (AccountService, Arc<RecordingMailer>) {
        let mailer = Arc::new(RecordingMailer::default());
        (service_with(MemoryUserStore::new(), mailer.clone()), mailer)
    }

    #[tokio::test]
    async fn signup_succeeds_once_per_email() {
        let (accounts, _) = service();
        let created = accounts.signup("Alice", "alice@x.com", "secret1").await.unwrap();
        assert_eq!(created.email, "alice@x.com");
        assert_eq!(created.name, "Alice");

        let err = accounts
            .signup("Alice", "alice@x.com", "secret1")
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::AlreadyExists));
    }

    #[tokio::test]
    async fn signup_stores_a_hash_not_the_password() {
        let store = MemoryUserStore::new();
        let accounts = service_with(store.clone(), Arc::new(RecordingMailer::default()));
        accounts.signup("Alice", "alice@x.com", "secret1").await.unwrap();
        let user = store.find_by_email("alice@x.com").await.unwrap().unwrap();
        assert_ne!(user.password_hash, "secret1");
        assert!(verify_password("secret1", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn login_issues_token_for_email() {
        let (accounts, _) = service();
        accounts.signup("Alice", "alice@x.com", "secret1").await.unwrap();

        let token = accounts.login("alice@x.com", "secret1").await.unwrap();
        let claims = accounts.tokens().decode_access_token(&token).unwrap();
        assert_eq!(claims["sub"], "alice@x.com");
    }

    #[tokio::test]
    async fn login_rejects_wrong_password_and_unknown_account() {
        let (accounts, _) = service();
        accounts.signup("Alice", "alice@x.com", "secret1").await.unwrap();

        assert!(matches!(
            accounts.login("alice@x.com", "wrong").await,
            Err(AccountError::InvalidCredentials)
        ));
        assert!(matches!(
            accounts.login("bob@x.com", "secret1").await,
            Err(AccountError::AccountNotFound)
        ));
    }

    #[tokio::test]
    async fn forgot_password_mails_a_working_link() {
        let (accounts, mailer) = service();
        accounts.signup("Alice", "alice@x.com", "secret1").await.unwrap();

        let token = accounts.forgot_password("alice@x.com").await.unwrap();
        let sent = mailer.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "alice@x.com");
        assert!(sent[0]
            .html
            .contains(&format!("http://localhost:8000/reset-password?token={}", token)));
    }

    #[tokio::test]
    async fn forgot_password_unknown_account_sends_nothing() {
        let (accounts, mailer) = service();
        assert!(matches!(
            accounts.forgot_password("ghost@x.com").await,
            Err(AccountError::AccountNotFound)
        ));
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn forgot_password_surfaces_dispatch_failure() {
        let store = MemoryUserStore::new();
        let accounts = service_with(store, Arc::new(RejectingMailer));
        accounts.signup("Alice", "alice@x.com", "secret1").await.unwrap();
        assert!(matches!(
            accounts.forgot_password("alice@x.com").await,
            Err(AccountError::Dispatch(_))
        ));
    }

    #[tokio::test]
    async fn two_reset_requests_give_two_valid_tokens() {
        let (accounts, _) = service();
        accounts.signup("Alice", "alice@x.com", "secret1").await.unwrap();

        let first = accounts.forgot_password("alice@x.com").await.unwrap();
        let second = accounts.forgot_password("alice@x.com").await.unwrap();
        for token in [&first, &second] {
            assert_eq!(
                accounts.tokens().verify_reset_token(token).as_deref(),
                Some("alice@x.com")
            );
        }
    }

    #[tokio::test]
    async fn reset_password_changes_login_password() {
        let (accounts, _) = service();
        accounts.signup("Alice", "alice@x.com", "secret1").await.unwrap();
        let token = accounts.forgot_password("alice@x.com").await.unwrap();

        accounts.reset_password(&token, "secret2").await.unwrap();
        assert!(accounts.login("alice@x.com", "secret2").await.is_ok());
        assert!(matches!(
            accounts.login("alice@x.com", "secret1").await,
            Err(AccountError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn reset_token_is_reusable_until_expiry() {
        let (accounts, _) = service();
        accounts.signup("Alice", "alice@x.com", "secret1").await.unwrap();
        let token = accounts.forgot_password("alice@x.com").await.unwrap();

        accounts.reset_password(&token, "secret2").await.unwrap();
        accounts.reset_password(&token, "secret3").await.unwrap();
        assert!(accounts.login("alice@x.com", "secret3").await.is_ok());
    }

    #[tokio::test]
    async fn reset_with_expired_or_bogus_token_fails() {
        let (accounts, _) = service();
        accounts.signup("Alice", "alice@x.com", "secret1").await.unwrap();
        let expired = accounts
            .tokens()
            .issue_reset_token("alice@x.com", Duration::seconds(-5))
            .unwrap();

        for token in [expired.as_str(), "bogus"] {
            assert!(matches!(
                accounts.reset_password(token, "secret2").await,
                Err(AccountError::InvalidOrExpiredToken)
            ));
        }
        assert!(accounts.login("alice@x.com", "secret1").await.is_ok());
    }

    #[tokio::test]
    async fn reset_for_vanished_account_is_update_failure() {
        let (accounts, _) = service();
        let token = accounts
            .tokens()
            .issue_reset_token("nobody@x.com", Duration::minutes(5))
            .unwrap();
        assert!(matches!(
            accounts.reset_password(&token, "secret2").await,
            Err(AccountError::UpdateFailed)
        ));
    }
}
