//! Credential record handed to the authentication layer.

use crate::user::User;

/// Minimal data needed to verify a login attempt.
#[derive(Clone, PartialEq, Eq)]
pub struct UserDetails {
    pub username: String,
    pub password_hash: String,
    pub enabled: bool,
    pub authorities: Vec<String>,
}

impl UserDetails {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a == authority)
    }
}

impl std::fmt::Debug for UserDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserDetails")
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("enabled", &self.enabled)
            .field("authorities", &self.authorities)
            .finish()
    }
}

impl From<User> for UserDetails {
    fn from(user: User) -> Self {
        let authorities = user.authority_names();
        Self {
            username: user.username,
            password_hash: user.password_hash,
            enabled: user.enabled,
            authorities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::parse_authorities;
    use uuid::Uuid;

    #[test]
    fn test_from_user_keeps_hash_and_flags() {
        let mut user = User::new(
            Uuid::new_v4(),
            "carol".to_string(),
            "Carol".to_string(),
            parse_authorities(&["admin"]),
        );
        user.set_password_hash("hash".to_string());
        user.disable();

        let details = UserDetails::from(user);
        assert_eq!(details.username, "carol");
        assert_eq!(details.password_hash, "hash");
        assert!(!details.is_enabled());
        assert!(details.has_authority("admin"));
        assert!(!details.has_authority("user"));
    }
}
