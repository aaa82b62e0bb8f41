//! Username/password verification against stored credentials.

use std::sync::Arc;

use super::UserDetailsService;
use common::{AppError, AppResult};
use domain::{PasswordEncoder, UserDetails};

/// Verifies login attempts.
///
/// Unknown usernames still pay for one hash verification, so response
/// time does not reveal which usernames exist.
pub struct Authenticator {
    details: Arc<dyn UserDetailsService>,
    encoder: Arc<dyn PasswordEncoder>,
    dummy_hash: String,
}

impl Authenticator {
    pub fn new(
        details: Arc<dyn UserDetailsService>,
        encoder: Arc<dyn PasswordEncoder>,
    ) -> AppResult<Self> {
        let dummy_hash = encoder.encode("dummy-password-for-timing")?;
        Ok(Self {
            details,
            encoder,
            dummy_hash,
        })
    }

    /// Check a username/password pair.
    ///
    /// The password is checked before the account state, so a disabled
    /// account is only reported to someone who knows its password.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<UserDetails> {
        let details = match self.details.load_user_by_username(username).await {
            Ok(details) => details,
            Err(AppError::UsernameNotFound(_)) => {
                let _ = self.encoder.matches(password, &self.dummy_hash);
                tracing::debug!(username = %username, "Login failed: unknown username");
                return Err(AppError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        if !self.encoder.matches(password, &details.password_hash) {
            tracing::debug!(username = %username, "Login failed: wrong password");
            return Err(AppError::InvalidCredentials);
        }

        if !details.is_enabled() {
            tracing::info!(username = %username, "Login refused: account disabled");
            return Err(AppError::AccountDisabled);
        }

        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::MockUserDetailsService;
    use domain::Argon2PasswordEncoder;

    fn details(password: &str, enabled: bool) -> UserDetails {
        UserDetails {
            username: "alice".to_string(),
            password_hash: Argon2PasswordEncoder::new().encode(password).unwrap(),
            enabled,
            authorities: vec!["user".to_string()],
        }
    }

    fn authenticator(mock: MockUserDetailsService) -> Authenticator {
        Authenticator::new(Arc::new(mock), Arc::new(Argon2PasswordEncoder::new())).unwrap()
    }

    #[tokio::test]
    async fn test_valid_credentials() {
        let record = details("p1", true);
        let mut mock = MockUserDetailsService::new();
        mock.expect_load_user_by_username()
            .times(1)
            .returning(move |name| {
                assert_eq!(name, "alice");
                Ok(record.clone())
            });

        let result = authenticator(mock).authenticate("alice", "p1").await.unwrap();
        assert_eq!(result.username, "alice");
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let record = details("p1", true);
        let mut mock = MockUserDetailsService::new();
        mock.expect_load_user_by_username()
            .returning(move |_| Ok(record.clone()));

        let result = authenticator(mock).authenticate("alice", "p2").await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_unknown_username_is_invalid_credentials() {
        let mut mock = MockUserDetailsService::new();
        mock.expect_load_user_by_username()
            .returning(|name| Err(AppError::username_not_found(name)));

        let result = authenticator(mock).authenticate("ghost", "p1").await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_disabled_account() {
        let record = details("p1", false);
        let mut mock = MockUserDetailsService::new();
        mock.expect_load_user_by_username()
            .returning(move |_| Ok(record.clone()));
        let auth = authenticator(mock);

        assert!(matches!(
            auth.authenticate("alice", "p1").await,
            Err(AppError::AccountDisabled)
        ));
        assert!(matches!(
            auth.authenticate("alice", "wrong").await,
            Err(AppError::InvalidCredentials)
        ));
    }
}
