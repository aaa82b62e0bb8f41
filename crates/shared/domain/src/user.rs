//! User domain entity and related request/view types.

use std::borrow::Cow;
use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::constants::{
    is_valid_role, AUTHORITY_SEPARATOR, PASSWORD_MISMATCH_MESSAGE, ROLE_ADMIN, ROLE_USER,
};
use crate::error::{DomainError, DomainResult};
use crate::pagination::PaginationParams;

/// User roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    /// Authority name reported to the authentication layer
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => ROLE_ADMIN,
            UserRole::User => ROLE_USER,
        }
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s {
            ROLE_ADMIN => UserRole::Admin,
            _ => UserRole::User,
        }
    }
}

impl From<String> for UserRole {
    fn from(s: String) -> Self {
        UserRole::from(s.as_str())
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.as_str().to_string()
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a list of role names into a role set. Duplicates collapse and
/// the set iterates in role order (`user` before `admin`), whatever the
/// input order was.
pub fn parse_authorities<S: AsRef<str>>(names: &[S]) -> BTreeSet<UserRole> {
    names.iter().map(|name| UserRole::from(name.as_ref())).collect()
}

/// Join a role set into its single-column storage form (`"user,admin"`).
pub fn join_authorities(roles: &BTreeSet<UserRole>) -> String {
    roles
        .iter()
        .map(UserRole::as_str)
        .collect::<Vec<_>>()
        .join(AUTHORITY_SEPARATOR)
}

/// Split the storage form back into a role set. Empty input yields an empty set.
pub fn split_authorities(joined: &str) -> BTreeSet<UserRole> {
    joined
        .split(AUTHORITY_SEPARATOR)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(UserRole::from)
        .collect()
}

/// User domain entity
#[derive(Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    /// Unique login name, immutable after creation
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
    pub authorities: BTreeSet<UserRole>,
    /// Soft delete flag (false = deleted)
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Hash stays out of debug output
impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("full_name", &self.full_name)
            .field("authorities", &self.authorities)
            .field("enabled", &self.enabled)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

impl User {
    /// Create a new enabled user without a password hash.
    pub fn new(
        id: Uuid,
        username: String,
        full_name: String,
        authorities: BTreeSet<UserRole>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            username,
            password_hash: String::new(),
            full_name,
            authorities,
            enabled: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if user has admin role
    pub fn is_admin(&self) -> bool {
        self.authorities.iter().any(UserRole::is_admin)
    }

    /// Authority names in stable order
    pub fn authority_names(&self) -> Vec<String> {
        self.authorities.iter().map(|r| r.to_string()).collect()
    }

    /// Replace the stored hash
    pub fn set_password_hash(&mut self, hash: String) {
        self.password_hash = hash;
        self.updated_at = Utc::now();
    }

    /// Update user's display name
    pub fn update_full_name(&mut self, full_name: String) {
        self.full_name = full_name;
        self.updated_at = Utc::now();
    }

    /// Replace user's authorities
    pub fn update_authorities(&mut self, authorities: BTreeSet<UserRole>) {
        self.authorities = authorities;
        self.updated_at = Utc::now();
    }

    /// Mark the entity as modified without changing any field
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Soft delete the user. There is no way back.
    pub fn disable(&mut self) {
        self.enabled = false;
        self.updated_at = Utc::now();
    }
}

fn validate_roles(roles: &[String]) -> Result<(), ValidationError> {
    if roles.iter().all(|role| is_valid_role(role)) {
        return Ok(());
    }

    let mut error = ValidationError::new("invalid_role");
    error.message = Some(Cow::Borrowed("Invalid role. Must be 'user' or 'admin'"));
    Err(error)
}

/// Account creation request
#[derive(Clone, Deserialize, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateUserRequest {
    /// Login name
    #[validate(length(min = 1, message = "Username cannot be empty"))]
    pub username: String,
    /// Display name
    #[serde(default)]
    pub full_name: String,
    /// Role names ("user" or "admin"), stored as a set
    #[serde(default)]
    #[validate(custom(function = "validate_roles"))]
    pub authorities: Vec<String>,
    /// Plaintext password
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
    /// Plaintext password confirmation, must equal `password`
    pub re_password: String,
}

impl std::fmt::Debug for CreateUserRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserRequest")
            .field("username", &self.username)
            .field("full_name", &self.full_name)
            .field("authorities", &self.authorities)
            .field("password", &"[REDACTED]")
            .field("re_password", &"[REDACTED]")
            .finish()
    }
}

impl CreateUserRequest {
    /// Whether the confirmation equals the password, byte for byte
    pub fn passwords_match(&self) -> bool {
        self.password == self.re_password
    }

    /// Reject the request when the confirmation differs from the password
    pub fn check_passwords(&self) -> DomainResult<()> {
        if self.passwords_match() {
            Ok(())
        } else {
            Err(DomainError::validation(PASSWORD_MISMATCH_MESSAGE))
        }
    }
}

/// Profile update request. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateUserRequest {
    /// New display name
    #[validate(length(min = 1, message = "Full name cannot be empty"))]
    pub full_name: Option<String>,
    /// New role names
    #[validate(custom(function = "validate_roles"))]
    pub authorities: Option<Vec<String>>,
}

/// Search filters passed through to the repository
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SearchUsersRequest {
    /// Exact id match
    pub id: Option<Uuid>,
    /// Case-insensitive substring of the username
    pub username: Option<String>,
    /// Case-insensitive substring of the full name
    pub full_name: Option<String>,
    #[serde(flatten)]
    #[validate(nested)]
    pub pagination: PaginationParams,
}

/// User projection safe to return to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserView {
    /// Unique user identifier
    pub id: Uuid,
    /// Login name
    pub username: String,
    /// Display name
    pub full_name: String,
    /// Role names as a set: duplicates removed, `user` listed before `admin`
    pub authorities: Vec<String>,
    /// False once the account has been deleted
    pub enabled: bool,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request(password: &str, re_password: &str) -> CreateUserRequest {
        CreateUserRequest {
            username: "alice".to_string(),
            full_name: "Alice Liddell".to_string(),
            authorities: vec!["user".to_string()],
            password: password.to_string(),
            re_password: re_password.to_string(),
        }
    }

    #[test]
    fn test_passwords_match_is_exact() {
        assert!(create_request("p1", "p1").passwords_match());
        assert!(!create_request("p1", "P1").passwords_match());
        assert!(!create_request("p1", "p1 ").passwords_match());
    }

    #[test]
    fn test_check_passwords_reports_mismatch_as_validation() {
        assert_eq!(create_request("p1", "p1").check_passwords(), Ok(()));
        assert_eq!(
            create_request("p1", "p2").check_passwords(),
            Err(DomainError::Validation(PASSWORD_MISMATCH_MESSAGE.to_string()))
        );
    }

    #[test]
    fn test_parse_authorities_collapses_and_orders() {
        let roles = parse_authorities(&["admin", "user", "admin"]);
        let names: Vec<_> = roles.iter().map(UserRole::as_str).collect();
        assert_eq!(names, vec!["user", "admin"]);
    }

    #[test]
    fn test_create_request_debug_redacts_passwords() {
        let debug = format!("{:?}", create_request("hunter22", "hunter22"));
        assert!(!debug.contains("hunter22"));
        assert!(debug.contains("alice"));
    }

    #[test]
    fn test_user_debug_redacts_hash() {
        let mut user = User::new(Uuid::new_v4(), "bob".into(), "Bob".into(), BTreeSet::new());
        user.set_password_hash("$argon2id$secret".to_string());
        assert!(!format!("{:?}", user).contains("$argon2id$secret"));
    }

    #[test]
    fn test_new_user_is_enabled() {
        let user = User::new(Uuid::new_v4(), "bob".into(), "Bob".into(), BTreeSet::new());
        assert!(user.enabled);
        assert!(user.password_hash.is_empty());
    }

    #[test]
    fn test_disable_is_one_way() {
        let mut user = User::new(Uuid::new_v4(), "bob".into(), "Bob".into(), BTreeSet::new());
        user.disable();
        user.disable();
        assert!(!user.enabled);
    }

    #[test]
    fn test_authorities_round_trip_storage_form() {
        let roles = parse_authorities(&["user", "admin"]);
        let joined = join_authorities(&roles);
        assert_eq!(joined, "user,admin");
        assert_eq!(split_authorities(&joined), roles);
        assert!(split_authorities("").is_empty());
    }

    #[test]
    fn test_create_request_rejects_unknown_role() {
        let mut request = create_request("p1", "p1");
        request.authorities = vec!["root".to_string()];
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_request_rejects_empty_username() {
        let mut request = create_request("p1", "p1");
        request.username = String::new();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_request_skips_absent_fields() {
        let request = UpdateUserRequest::default();
        assert!(request.validate().is_ok());

        let request = UpdateUserRequest {
            full_name: Some(String::new()),
            authorities: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_search_request_defaults_pagination() {
        let request: SearchUsersRequest =
            serde_json::from_str(r#"{"username": "ali"}"#).unwrap();
        assert_eq!(request.username.as_deref(), Some("ali"));
        assert_eq!(request.pagination, PaginationParams::default());
    }
}
