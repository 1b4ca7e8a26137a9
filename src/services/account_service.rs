use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::password::{check_password_policy, hash_password, validate_email_format, verify_password};
use crate::auth::TokenService;
use crate::database::models::{NewUser, User};
use crate::database::{DatabaseError, Store, UserRepository};
use crate::services::{ServiceError, ServiceResult};

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const EMAIL_TAKEN: &str = "Email is already registered";

#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone)]
pub struct LoginOutput {
    pub token: String,
    pub user_id: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

/// Email + password accounts and token issuance.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn Store>,
    tokens: Arc<TokenService>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>, tokens: Arc<TokenService>, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { store, tokens, clock }
    }

    pub async fn register(&self, input: RegisterInput) -> ServiceResult<User> {
        let email = normalize_email(&input.email);
        validate_email_format(&email).map_err(|msg| ServiceError::field("email", msg))?;
        if input.password != input.confirm_password {
            return Err(ServiceError::field("confirmPassword", "Passwords do not match"));
        }
        check_password_policy(&input.password).map_err(|msg| ServiceError::field("password", msg))?;

        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(ServiceError::field("email", EMAIL_TAKEN));
        }

        let password = input.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| ServiceError::Internal(format!("hashing task failed: {}", e)))?
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let user = self
            .store
            .create_user(NewUser {
                id: Uuid::new_v4().to_string(),
                email,
                password_hash,
                created_at: self.clock.utc(),
            })
            .await
            .map_err(|err| match err {
                // lost a race with a concurrent registration
                DatabaseError::UniqueViolation(_) => ServiceError::field("email", EMAIL_TAKEN),
                other => other.into(),
            })?;

        info!(user_id = %user.id, "account registered");
        Ok(user)
    }

    /// Unknown email and wrong password produce the same error.
    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<LoginOutput> {
        let email = normalize_email(email);
        let Some(user) = self.store.find_user_by_email(&email).await? else {
            warn!("login failed: unknown account");
            return Err(ServiceError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
        };

        let password = password.to_string();
        let stored_hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
            .await
            .map_err(|e| ServiceError::Internal(format!("verification task failed: {}", e)))?
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        if !matches {
            warn!(user_id = %user.id, "login failed: wrong password");
            return Err(ServiceError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
        }

        let issued = self
            .tokens
            .issue(&user.id, &user.email, self.clock.utc())
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        info!(user_id = %user.id, "login succeeded");
        Ok(LoginOutput {
            token: issued.token,
            user_id: user.id,
            email: user.email,
            expires_at: issued.expires_at,
        })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::current_user_id;
    use crate::testing::TestContext;

    fn registration(email: &str, password: &str, confirm: &str) -> RegisterInput {
        RegisterInput {
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    fn field_of(err: &ServiceError) -> Option<String> {
        match err {
            ServiceError::Validation {
                field_errors: Some(fields),
                ..
            } => fields.keys().next().cloned(),
            _ => None,
        }
    }

    #[tokio::test]
    async fn register_then_login_issues_token_for_user_id() {
        let ctx = TestContext::new().await;
        let accounts = ctx.state.accounts();

        let user = accounts
            .register(registration(" A@X.com ", "Passw0rd", "Passw0rd"))
            .await
            .unwrap();
        assert_eq!(user.email, "a@x.com");

        let login = accounts.login("a@x.com", "Passw0rd").await.unwrap();
        assert_eq!(login.user_id, user.id);
        assert_eq!(login.email, "a@x.com");

        let principal = ctx.state.tokens.validate(&login.token).unwrap();
        assert_eq!(current_user_id(&principal), Some(user.id.as_str()));
    }

    #[tokio::test]
    async fn register_rejects_policy_violations() {
        let ctx = TestContext::new().await;
        let accounts = ctx.state.accounts();

        let err = accounts.register(registration("a@x.com", "Passw0rd", "Passw0rx")).await.unwrap_err();
        assert_eq!(field_of(&err).as_deref(), Some("confirmPassword"));

        let err = accounts.register(registration("a@x.com", "abc1", "abc1")).await.unwrap_err();
        assert_eq!(field_of(&err).as_deref(), Some("password"));

        let err = accounts.register(registration("a@x.com", "password", "password")).await.unwrap_err();
        assert_eq!(field_of(&err).as_deref(), Some("password"));

        let err = accounts.register(registration("not-an-email", "Passw0rd", "Passw0rd")).await.unwrap_err();
        assert_eq!(field_of(&err).as_deref(), Some("email"));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_case_insensitively() {
        let ctx = TestContext::new().await;
        let accounts = ctx.state.accounts();
        accounts.register(registration("a@x.com", "Passw0rd", "Passw0rd")).await.unwrap();

        let err = accounts.register(registration("A@X.COM", "0therPass", "0therPass")).await.unwrap_err();
        assert_eq!(field_of(&err).as_deref(), Some("email"));
    }

    #[tokio::test]
    async fn bad_credentials_are_indistinguishable() {
        let ctx = TestContext::new().await;
        let accounts = ctx.state.accounts();
        accounts.register(registration("a@x.com", "Passw0rd", "Passw0rd")).await.unwrap();

        let wrong_password = accounts.login("a@x.com", "Wr0ngpass").await.unwrap_err();
        let unknown_user = accounts.login("b@x.com", "Passw0rd").await.unwrap_err();

        match (wrong_password, unknown_user) {
            (ServiceError::Unauthenticated(a), ServiceError::Unauthenticated(b)) => assert_eq!(a, b),
            other => panic!("expected two Unauthenticated errors, got {:?}", other),
        }
    }
}
