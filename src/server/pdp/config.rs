use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::config::{expandenv, CommonConfig, PathSet};

/// Connection to the policy decision point.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PdpConfig {
    /// Base url of the PDP, usually a sidecar container.
    /// Default: http://localhost:7766
    #[serde(default = "PdpConfig::default_url")]
    pub url: String,

    /// SDK key sent as bearer token to the PDP. Supports env expansion,
    /// e.g. `${PERMIT_SDK_KEY}`.
    #[serde(default = "PdpConfig::default_api_key")]
    pub api_key: String,

    /// Default: "default"
    #[serde(default = "PdpConfig::default_tenant")]
    pub tenant: String,

    /// Default: 5 seconds
    #[serde(default = "PdpConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl CommonConfig for PdpConfig {
    fn default() -> Self {
        Self {
            url: Self::default_url(),
            api_key: Self::default_api_key(),
            tenant: Self::default_tenant(),
            timeout_secs: Self::default_timeout_secs(),
        }
    }

    fn complete(&mut self, _ps: &PathSet) -> Result<()> {
        self.url = expandenv("url", &self.url)?;
        if self.url.is_empty() {
            bail!("url cannot be empty");
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            bail!("url must start with http:// or https://, found '{}'", self.url);
        }
        self.url = self.url.trim_end_matches('/').to_string();

        self.api_key = expandenv("api_key", &self.api_key)?;
        if self.api_key.is_empty() {
            bail!("api_key cannot be empty");
        }

        if self.tenant.is_empty() {
            bail!("tenant cannot be empty");
        }

        if self.timeout_secs == 0 {
            bail!("timeout_secs should not be 0");
        }

        Ok(())
    }
}

impl PdpConfig {
    pub fn default_url() -> String {
        String::from("http://localhost:7766")
    }

    pub fn default_api_key() -> String {
        String::from("${PERMIT_SDK_KEY}")
    }

    pub fn default_tenant() -> String {
        String::from("default")
    }

    pub fn default_timeout_secs() -> u64 {
        5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete() {
        let ps = PathSet::new_test("pdp_config");

        let mut cfg = PdpConfig::default();
        cfg.api_key = "permit_key_test".to_string();
        cfg.url = "http://localhost:7766/".to_string();
        cfg.complete(&ps).unwrap();
        assert_eq!(cfg.url, "http://localhost:7766");

        let mut cfg = PdpConfig::default();
        cfg.api_key = String::new();
        assert!(cfg.complete(&ps).is_err());

        let mut cfg = PdpConfig::default();
        cfg.api_key = "permit_key_test".to_string();
        cfg.url = "localhost:7766".to_string();
        assert!(cfg.complete(&ps).is_err());
    }
}
