//! Entity to view projection. Password hashes never leave through here.

use domain::{User, UserView};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Projects user entities into outward views.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait UserViewMapper: Send + Sync {
    fn to_user_view(&self, user: &User) -> UserView;

    /// Order-preserving batch projection
    fn to_user_views(&self, users: &[User]) -> Vec<UserView> {
        users.iter().map(|u| self.to_user_view(u)).collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UserProjector;

impl UserViewMapper for UserProjector {
    fn to_user_view(&self, user: &User) -> UserView {
        UserView {
            id: user.id,
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            authorities: user.authority_names(),
            enabled: user.enabled,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::parse_authorities;
    use uuid::Uuid;

    fn user(username: &str) -> User {
        let mut user = User::new(
            Uuid::new_v4(),
            username.to_string(),
            "Full Name".to_string(),
            parse_authorities(&["user", "admin"]),
        );
        user.set_password_hash("$argon2id$hash".to_string());
        user
    }

    #[test]
    fn test_view_copies_public_fields() {
        let user = user("alice");
        let view = UserProjector.to_user_view(&user);

        assert_eq!(view.id, user.id);
        assert_eq!(view.username, "alice");
        assert_eq!(view.full_name, "Full Name");
        assert_eq!(view.authorities, vec!["user".to_string(), "admin".to_string()]);
        assert!(view.enabled);
        assert_eq!(view.created_at, user.created_at);
    }

    #[test]
    fn test_view_authorities_are_deduplicated_in_role_order() {
        let user = User::new(
            Uuid::new_v4(),
            "carol".to_string(),
            "Carol".to_string(),
            parse_authorities(&["admin", "user", "admin"]),
        );

        let view = UserProjector.to_user_view(&user);
        assert_eq!(view.authorities, vec!["user".to_string(), "admin".to_string()]);
    }

    #[test]
    fn test_views_preserve_order() {
        let users = vec![user("zed"), user("amy"), user("bob")];
        let names: Vec<_> = UserProjector
            .to_user_views(&users)
            .into_iter()
            .map(|v| v.username)
            .collect();

        assert_eq!(names, vec!["zed", "amy", "bob"]);
        assert!(UserProjector.to_user_views(&[]).is_empty());
    }
}
