use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::{expandenv, CommonConfig, PathSet};
use crate::logs;

use super::authn::config::AuthnConfig;
use super::authz::config::AuthzConfig;
use super::db::config::DbConfig;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_bind")]
    pub bind: String,

    #[serde(default = "ServerConfig::default_ssl")]
    pub ssl: bool,

    /// Default: {pki_path}/server.crt
    #[serde(default = "ServerConfig::default_cert_path")]
    pub cert_path: String,

    /// Default: {pki_path}/server.key
    #[serde(default = "ServerConfig::default_key_path")]
    pub key_path: String,

    #[serde(default = "ServerConfig::default_keep_alive_secs")]
    pub keep_alive_secs: u64,

    #[serde(default = "ServerConfig::default_workers")]
    pub workers: u64,

    #[serde(default = "ServerConfig::default_payload_limit_kib")]
    pub payload_limit_kib: usize,

    #[serde(default = "ServerConfig::default_log_level")]
    pub log_level: String,

    #[serde(default = "AuthnConfig::default")]
    pub authn: AuthnConfig,

    #[serde(default = "AuthzConfig::default")]
    pub authz: AuthzConfig,

    #[serde(default = "DbConfig::default")]
    pub db: DbConfig,
}

impl CommonConfig for ServerConfig {
    fn default() -> Self {
        Self {
            bind: Self::default_bind(),
            ssl: Self::default_ssl(),
            cert_path: Self::default_cert_path(),
            key_path: Self::default_key_path(),
            keep_alive_secs: Self::default_keep_alive_secs(),
            workers: Self::default_workers(),
            payload_limit_kib: Self::default_payload_limit_kib(),
            log_level: Self::default_log_level(),
            authn: AuthnConfig::default(),
            authz: AuthzConfig::default(),
            db: DbConfig::default(),
        }
    }

    fn complete(&mut self, ps: &PathSet) -> Result<()> {
        self.bind = expandenv("bind", &self.bind)?;
        if self.bind.is_empty() {
            bail!("bind cannot be empty");
        }

        if self.ssl {
            self.cert_path = expandenv("cert_path", &self.cert_path)?;
            if self.cert_path.is_empty() {
                let path = ps.pki_path.join("server.crt");
                self.cert_path = format!("{}", path.display());
            }

            self.key_path = expandenv("key_path", &self.key_path)?;
            if self.key_path.is_empty() {
                let path = ps.pki_path.join("server.key");
                self.key_path = format!("{}", path.display());
            }
        }

        if self.payload_limit_kib < Self::MIN_PAYLOAD_LIMIT_KIB {
            bail!(
                "payload_limit_kib must be greater than or equal to {}",
                Self::MIN_PAYLOAD_LIMIT_KIB
            );
        }
        if self.payload_limit_kib > Self::MAX_PAYLOAD_LIMIT_KIB {
            bail!(
                "payload_limit_kib must be less than or equal to {}",
                Self::MAX_PAYLOAD_LIMIT_KIB
            );
        }

        logs::parse_level(&self.log_level).context("log_level")?;

        self.authn.complete(ps).context("authn")?;
        self.authz.complete(ps).context("authz")?;
        self.db.complete(ps).context("db")?;

        Ok(())
    }
}

impl ServerConfig {
    const MAX_PAYLOAD_LIMIT_KIB: usize = 1024;
    const MIN_PAYLOAD_LIMIT_KIB: usize = 1;

    pub fn default_bind() -> String {
        String::from("127.0.0.1:8000")
    }

    pub fn default_ssl() -> bool {
        false
    }

    pub fn default_cert_path() -> String {
        String::new()
    }

    pub fn default_key_path() -> String {
        String::new()
    }

    pub fn default_keep_alive_secs() -> u64 {
        0
    }

    pub fn default_workers() -> u64 {
        0
    }

    pub fn default_payload_limit_kib() -> usize {
        64
    }

    pub fn default_log_level() -> String {
        String::from("info")
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::server::authz::config::AuthzMode;

    use super::*;

    #[test]
    fn test_load() {
        let ps = PathSet::new_test("server_config");
        let path = ps.config_path.join("server.toml");

        fs::write(
            &path,
            r#"
bind = "0.0.0.0:9000"
payload_limit_kib = 128

[authz]
mode = "local"
public_resources = []

[db.sqlite]
memory = true
"#,
        )
        .unwrap();
        let cfg: ServerConfig = ps.load_config("server", ServerConfig::default).unwrap();
        assert_eq!(cfg.bind, "0.0.0.0:9000");
        assert_eq!(cfg.payload_limit_kib, 128);
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.authz.mode, AuthzMode::Local);
        assert!(cfg.authz.public_resources.is_empty());
        assert!(cfg.authn.allow_anonymous);
        assert!(cfg.db.sqlite.memory);

        fs::write(&path, "payload_limit_kib = 4096\n").unwrap();
        assert!(ps
            .load_config("server", ServerConfig::default)
            .is_err());

        fs::write(&path, "log_level = \"trace\"\n").unwrap();
        assert!(ps
            .load_config("server", ServerConfig::default)
            .is_err());

        fs::remove_file(&path).unwrap();
        // Without a config file, pdp mode needs the sdk key from env
        std::env::set_var("PERMIT_SDK_KEY", "permit_key_test");
        let cfg: ServerConfig = ps.load_config("server", ServerConfig::default).unwrap();
        assert_eq!(cfg.bind, "127.0.0.1:8000");
        assert_eq!(cfg.authz.pdp.api_key, "permit_key_test");
        assert_eq!(
            cfg.db.sqlite.path,
            format!("{}", ps.data_path.join("tasks.db").display())
        );
    }
}
