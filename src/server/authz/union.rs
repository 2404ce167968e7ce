use anyhow::Result;
use async_trait::async_trait;

use super::local::LocalAuthorizer;
use super::pdp::PdpAuthorizer;
use super::public::PublicReadAuthorizer;
use super::{Authorizer, AuthzRequest, AuthzResponse};

pub enum UnionAuthorizer {
    Public(PublicReadAuthorizer),
    Pdp(PdpAuthorizer),
    Local(LocalAuthorizer),
}

impl UnionAuthorizer {
    #[cfg(test)]
    pub fn name(&self) -> &'static str {
        match self {
            UnionAuthorizer::Public(_) => "public",
            UnionAuthorizer::Pdp(_) => "pdp",
            UnionAuthorizer::Local(_) => "local",
        }
    }
}

#[async_trait]
impl Authorizer for UnionAuthorizer {
    async fn authorize_request(&self, req: &AuthzRequest) -> Result<AuthzResponse> {
        match self {
            UnionAuthorizer::Public(a) => a.authorize_request(req).await,
            UnionAuthorizer::Pdp(a) => a.authorize_request(req).await,
            UnionAuthorizer::Local(a) => a.authorize_request(req).await,
        }
    }
}
