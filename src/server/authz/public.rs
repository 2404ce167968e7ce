use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;

use super::{Authorizer, AuthzRequest, AuthzResponse};

/// Lets everybody, anonymous users included, read the configured resources.
pub struct PublicReadAuthorizer {
    resources: HashSet<String>,
}

impl PublicReadAuthorizer {
    pub fn new(resources: impl IntoIterator<Item = String>) -> Self {
        Self {
            resources: resources.into_iter().collect(),
        }
    }
}

#[async_trait]
impl Authorizer for PublicReadAuthorizer {
    async fn authorize_request(&self, req: &AuthzRequest) -> Result<AuthzResponse> {
        if req.action == "get" && self.resources.contains(&req.resource) {
            return Ok(AuthzResponse::Ok);
        }
        Ok(AuthzResponse::Continue)
    }
}
