use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::config::{expandenv, CommonConfig, PathSet};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ClientConfig {
    /// Default: http://127.0.0.1:8000
    #[serde(default = "ClientConfig::default_server")]
    pub server: String,

    /// Bearer token sent with every request. With plain tokens this is the
    /// user key, e.g. `admin@permit-todo.app`. Supports env expansion.
    #[serde(default = "ClientConfig::default_token")]
    pub token: String,

    /// Certificate trusted for https servers. Default: {pki_path}/server.crt
    #[serde(default = "ClientConfig::default_cert_path")]
    pub cert_path: String,
}

impl CommonConfig for ClientConfig {
    fn default() -> Self {
        Self {
            server: Self::default_server(),
            token: Self::default_token(),
            cert_path: Self::default_cert_path(),
        }
    }

    fn complete(&mut self, ps: &PathSet) -> Result<()> {
        self.server = expandenv("server", &self.server)?;
        if self.server.is_empty() {
            bail!("server cannot be empty");
        }

        self.token = expandenv("token", &self.token)?;

        self.cert_path = expandenv("cert_path", &self.cert_path)?;
        if self.cert_path.is_empty() {
            let path = ps.pki_path.join("server.crt");
            self.cert_path = format!("{}", path.display());
        }

        Ok(())
    }
}

impl ClientConfig {
    pub fn default_server() -> String {
        String::from("http://127.0.0.1:8000")
    }

    pub fn default_token() -> String {
        String::new()
    }

    pub fn default_cert_path() -> String {
        String::new()
    }
}
