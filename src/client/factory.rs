use anyhow::Result;

use super::config::ClientConfig;
use super::Client;

pub struct ClientFactory {
    cfg: ClientConfig,
}

impl ClientFactory {
    pub fn new(cfg: ClientConfig) -> Self {
        Self { cfg }
    }

    /// Overrides the token from config, e.g. with a `--token` flag.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        if let Some(token) = token {
            self.cfg.token = token;
        }
        self
    }

    pub async fn build_client(&self) -> Result<Client> {
        let mut client = Client::connect(&self.cfg.server, &self.cfg.cert_path).await?;
        if !self.cfg.token.is_empty() {
            client.set_token(self.cfg.token.clone());
        }
        Ok(client)
    }
}
