use dashmap::DashMap;

use crate::engine::BookingError;
use crate::limits::MAX_LOGIN_LEN;
use crate::model::{Role, User};

/// Known user identities. Logins compare case-insensitively; the first spelling wins.
#[derive(Default)]
pub struct UserDirectory {
    users: DashMap<String, User>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the existing user for `login`, or register it with `role`.
    pub fn add_or_get(&self, login: &str, role: Role) -> Result<User, BookingError> {
        let login = login.trim();
        if login.is_empty() {
            return Err(BookingError::InvalidArgument("login cannot be empty"));
        }
        if login.chars().count() > MAX_LOGIN_LEN {
            return Err(BookingError::InvalidArgument("login too long"));
        }
        let user = self
            .users
            .entry(login.to_lowercase())
            .or_insert_with(|| User {
                login: login.to_string(),
                role,
            })
            .value()
            .clone();
        Ok(user)
    }

    pub fn find(&self, login: &str) -> Option<User> {
        let login = login.trim();
        if login.is_empty() {
            return None;
        }
        self.users
            .get(&login.to_lowercase())
            .map(|e| e.value().clone())
    }

    /// All users, sorted by login.
    pub fn list(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.iter().map(|e| e.value().clone()).collect();
        users.sort_by(|a, b| a.login.to_lowercase().cmp(&b.login.to_lowercase()));
        users
    }
}
