use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Public view of an account. Never carries credential material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A user row including the bcrypt hash, as read for login.
#[derive(Debug, Clone, FromRow)]
pub struct StoredUser {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl StoredUser {
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            created_at: self.created_at,
        }
    }
}

/// Data needed to insert a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serialization_has_no_hash() {
        let stored = StoredUser {
            id: 7,
            username: "testuser".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "$2b$04$abcdefghijklmnopqrstuv".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(stored.into_user()).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["username"], "testuser");
        assert!(json.get("password_hash").is_none());
    }
}
