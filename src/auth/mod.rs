pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::User;

// Re-export necessary items
pub use extractors::{AuthUser, AuthenticatedUser};
pub use middleware::{authenticate, bearer_token, AuthMiddleware};
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenError, TokenService};

lazy_static! {
    // Regex for username validation: alphanumeric, underscores, hyphens
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Represents the payload for a user login request.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Must be between 3 and 32 characters, alphanumeric, and can include underscores or hyphens.
    #[validate(
        length(min = 3, max = 32),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    #[validate(email)]
    pub email: String,
    /// Must be between 6 and 72 characters (bcrypt ignores anything longer).
    #[validate(length(min = 6, max = 72))]
    pub password: String,
}

/// Payload returned by register and login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The bearer token for subsequent requests.
    pub token: String,
    pub user: User,
}

/// Emails are compared case-insensitively across both store backends.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
