mod local;
mod pdp;
mod public;
mod union;

pub mod chain;
pub mod config;
pub mod factory;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

use super::authn::AuthnUserInfo;

/// The enforcement point asks the authorizer whether `user` may perform
/// `action` on a resource of type `resource` with the given attributes.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize_request(&self, req: &AuthzRequest) -> Result<AuthzResponse>;
}

#[derive(Debug, Clone)]
pub struct AuthzRequest {
    /// Resource type, e.g. `tasks`
    pub resource: String,
    /// Lower-cased http method: `get`, `post`, `put` or `delete`
    pub action: String,
    /// Attributes of the target resource, used by attribute based rules
    pub attributes: Map<String, Value>,
    pub user: AuthnUserInfo,
}

/// Possible responses from an authorization check.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum AuthzResponse {
    /// Access is granted
    Ok,
    /// Defers decision to next authorizer in chain
    Continue,
    /// Access is denied
    Unauthorized,
}
