use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::server::pdp::{Decider, DecisionRequest};

use super::{Authorizer, AuthzRequest, AuthzResponse};

/// Delegates the decision to the external policy decision point.
///
/// Anonymous users are denied locally: the PDP only knows synced users.
pub struct PdpAuthorizer {
    decider: Arc<dyn Decider>,
    tenant: String,
}

impl PdpAuthorizer {
    pub fn new(decider: Arc<dyn Decider>, tenant: String) -> Self {
        Self { decider, tenant }
    }
}

#[async_trait]
impl Authorizer for PdpAuthorizer {
    async fn authorize_request(&self, req: &AuthzRequest) -> Result<AuthzResponse> {
        if req.user.is_anonymous {
            return Ok(AuthzResponse::Unauthorized);
        }

        let decision = DecisionRequest::new(
            &req.user.name,
            &req.action,
            &req.resource,
            &self.tenant,
            req.attributes.clone(),
        );
        let allow = self
            .decider
            .check(&decision)
            .await
            .context("check permission with pdp")?;

        if allow {
            Ok(AuthzResponse::Ok)
        } else {
            Ok(AuthzResponse::Unauthorized)
        }
    }
}
