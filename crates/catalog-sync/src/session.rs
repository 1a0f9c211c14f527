//! # Session
//!
//! Local-only authentication flag. Any non-empty username/password pair is
//! accepted; nothing is sent to the remote.
//!
//! Library-only API for embedding front ends, which gate their edit screens
//! on it. The `catalog` CLI does not log in.

use catalog_core::validation::validate_credentials;
use catalog_core::User;
use chrono::Utc;
use tracing::info;

use crate::error::CatalogResult;

/// Id given to every locally logged-in user.
pub const LOCAL_USER_ID: u64 = 1;

/// Holds the current user, if any.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    user: Option<User>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs in, replacing any current user.
    pub fn login(&mut self, username: &str, password: &str) -> CatalogResult<&User> {
        let username = validate_credentials(username, password)?;

        info!(username = %username, "User logged in");
        let user = self.user.insert(User {
            id: LOCAL_USER_ID,
            email: format!("{}@example.com", username),
            username,
            logged_in_at: Utc::now(),
        });
        Ok(user)
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            info!(username = %user.username, "User logged out");
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}
