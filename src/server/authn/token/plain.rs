use std::collections::HashSet;

use anyhow::{bail, Result};

use super::TokenValidator;

/// Treats the bearer token itself as the user key.
///
/// This is what the demo setup does (`Authorization: Bearer admin@permit-todo.app`):
/// identity is asserted, not proven. When `allow_users` is not empty, only the
/// listed keys are accepted.
pub struct PlainTokenValidator {
    allow_users: HashSet<String>,
}

impl PlainTokenValidator {
    pub fn new(allow_users: impl IntoIterator<Item = String>) -> Self {
        Self {
            allow_users: allow_users.into_iter().collect(),
        }
    }
}

impl TokenValidator for PlainTokenValidator {
    fn validate_token(&self, token: &str) -> Result<String> {
        let token = token.trim();
        if token.is_empty() {
            bail!("empty token");
        }

        if !self.allow_users.is_empty() && !self.allow_users.contains(token) {
            bail!("user '{token}' is not allowed");
        }

        Ok(token.to_string())
    }
}
