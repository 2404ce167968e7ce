use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::dirs::ensure_dir_exists;

use super::config::SqliteConfig;
use super::Sqlite;

pub struct SqliteFactory;

impl SqliteFactory {
    pub fn new() -> Self {
        Self {}
    }

    pub fn build_sqlite(&self, cfg: &SqliteConfig) -> Result<Sqlite> {
        if cfg.memory {
            warn!("Using in-memory sqlite database, the data will be lost when the server stops");
            return Sqlite::memory();
        }

        let path = Path::new(&cfg.path);
        if let Some(dir) = path.parent() {
            ensure_dir_exists(dir).context("ensure sqlite dir")?;
        }

        info!("Using sqlite database: {}", cfg.path);
        Sqlite::open(path)
    }
}
