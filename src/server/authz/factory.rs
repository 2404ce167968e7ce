use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::info;

use crate::server::pdp::client::PdpClient;
use crate::server::pdp::Decider;

use super::chain::ChainAuthorizer;
use super::config::{AuthzConfig, AuthzMode};
use super::local::LocalAuthorizer;
use super::pdp::PdpAuthorizer;
use super::public::PublicReadAuthorizer;
use super::union::UnionAuthorizer;

/// Builds the authorization chain:
/// 1. Public reads (if any public resource is configured)
/// 2. The policy: the external decision point, or the local permission table
pub struct AuthzFactory;

impl AuthzFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn build_authorizer(&self, cfg: &AuthzConfig) -> Result<ChainAuthorizer> {
        let decider: Option<Arc<dyn Decider>> = match cfg.mode {
            AuthzMode::Pdp => {
                let client = PdpClient::new(&cfg.pdp).context("init pdp client")?;
                Some(Arc::new(client))
            }
            AuthzMode::Local => None,
        };
        self.build_with_decider(cfg, decider)
    }

    pub fn build_with_decider(
        &self,
        cfg: &AuthzConfig,
        decider: Option<Arc<dyn Decider>>,
    ) -> Result<ChainAuthorizer> {
        let mut authorizers = vec![];

        if !cfg.public_resources.is_empty() {
            info!("Public read access to: {}", cfg.public_resources.join(", "));
            let public = PublicReadAuthorizer::new(cfg.public_resources.clone());
            authorizers.push(UnionAuthorizer::Public(public));
        }

        match (cfg.mode, decider) {
            (AuthzMode::Pdp, Some(decider)) => {
                info!("Authorization decisions are delegated to pdp {}", cfg.pdp.url);
                let pdp = PdpAuthorizer::new(decider, cfg.pdp.tenant.clone());
                authorizers.push(UnionAuthorizer::Pdp(pdp));
            }
            (AuthzMode::Pdp, None) => bail!("pdp mode requires a decision point"),
            (AuthzMode::Local, _) => {
                info!(
                    "Authorization uses the local permission table with {} roles",
                    cfg.roles.len()
                );
                let local = LocalAuthorizer::new(cfg.roles.clone());
                authorizers.push(UnionAuthorizer::Local(local));
            }
        }

        Ok(ChainAuthorizer::new(authorizers))
    }
}
