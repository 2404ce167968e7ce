mod anonymous;
mod bearer_token;
mod union;

pub mod chain;
pub mod config;
pub mod factory;
pub mod token;

use actix_web::HttpRequest;
use anyhow::Result;

/// Authenticates an incoming request.
///
/// Authenticators are chained, each one receives the user resolved by the
/// previous authenticators (if any).
pub trait Authenticator: Send + Sync {
    fn authenticate_request(
        &self,
        req: &HttpRequest,
        user: Option<AuthnUserInfo>,
    ) -> Result<AuthnResponse>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthnUserInfo {
    /// The user key, e.g. `admin@permit-todo.app`. Empty for anonymous users.
    pub name: String,
    pub is_anonymous: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthnResponse {
    /// The request carries a valid identity
    Ok(AuthnUserInfo),
    /// This authenticator has nothing to say about the request
    Continue,
    /// The request carries an invalid identity, stop the chain
    Unauthenticated,
}

impl AuthnUserInfo {
    pub fn anonymous() -> Self {
        Self {
            name: String::new(),
            is_anonymous: true,
        }
    }
}
