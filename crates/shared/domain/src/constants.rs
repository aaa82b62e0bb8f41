//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// User Roles
// =============================================================================

/// Default role assigned to new users
pub const ROLE_USER: &str = "user";

/// Administrator role with elevated privileges
pub const ROLE_ADMIN: &str = "admin";

/// All valid role values
pub const VALID_ROLES: &[&str] = &[ROLE_USER, ROLE_ADMIN];

/// Check if a role value is valid
pub fn is_valid_role(role: &str) -> bool {
    VALID_ROLES.contains(&role)
}

/// Separator used when authorities are stored as a single text column
pub const AUTHORITY_SEPARATOR: &str = ",";

// =============================================================================
// Pagination
// =============================================================================

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Maximum allowed items per page to prevent excessive queries
pub const MAX_PAGE_SIZE: u64 = 100;

/// Default starting page number (1-indexed)
pub const DEFAULT_PAGE_NUMBER: u64 = 1;

/// Highest accepted page number. Keeps `page * MAX_PAGE_SIZE` well inside
/// the signed 64-bit offset a database accepts.
pub const MAX_PAGE_NUMBER: u64 = u32::MAX as u64;

// =============================================================================
// Messages
// =============================================================================

/// Returned when `password` and `re_password` differ on account creation
pub const PASSWORD_MISMATCH_MESSAGE: &str = "Passwords don't match!";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_roles() {
        assert!(is_valid_role("user"));
        assert!(is_valid_role("admin"));
        assert!(!is_valid_role("root"));
        assert!(!is_valid_role("Admin"));
    }
}
