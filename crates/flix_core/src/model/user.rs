//! User entity.
//!
//! # Invariants
//! - Usernames are trimmed and lowercased; the store keeps them unique.
//! - `password_hash` holds a PHC string, never plaintext.

use super::review::Review;
use super::UserId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Assigned by the store on insert.
    pub id: Option<UserId>,
    pub username: String,
    /// Never serialized; empty after deserialization.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub reviews: Vec<Review>,
}

impl User {
    pub fn new(username: &str, password_hash: impl Into<String>) -> Self {
        Self {
            id: None,
            username: normalize_username(username),
            password_hash: password_hash.into(),
            reviews: Vec::new(),
        }
    }

    pub fn has_review(&self, review: &Review) -> bool {
        self.reviews.contains(review)
    }
}

/// Normalizes a username for storage and lookup.
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}
