use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;

use super::config::PdpConfig;
use super::{Decider, DecisionRequest, DecisionResponse, PdpError};

pub struct PdpClient {
    url: String,
    api_key: String,
    client: reqwest::Client,
}

impl PdpClient {
    const ALLOWED_PATH: &str = "/allowed";

    pub fn new(cfg: &PdpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("build pdp http client")?;
        Ok(Self {
            url: format!("{}{}", cfg.url, Self::ALLOWED_PATH),
            api_key: cfg.api_key.clone(),
            client,
        })
    }
}

#[async_trait]
impl Decider for PdpClient {
    async fn check(&self, req: &DecisionRequest) -> Result<bool, PdpError> {
        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(req)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(PdpError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let decision: DecisionResponse = serde_json::from_str(&body)?;
        debug!(
            "PDP decision for {} {} {}: {}",
            req.user.key, req.action, req.resource.kind, decision.allow
        );
        Ok(decision.allow)
    }
}
