use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;

use super::config::{DbConfig, DbType};
use super::sqlite::factory::SqliteFactory;
use super::{Database, TaskRecord, UnionConnection};

pub struct DbFactory;

impl DbFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn build_db(&self, cfg: &DbConfig) -> Result<Arc<Database>> {
        let conn = match cfg.name {
            DbType::Sqlite => {
                let sqlite_factory = SqliteFactory::new();
                let sqlite = sqlite_factory.build_sqlite(&cfg.sqlite)?;
                UnionConnection::Sqlite(sqlite)
            }
        };

        let db = Database::new(conn);
        if cfg.seed {
            Self::seed(&db).context("seed demo tasks")?;
        }
        Ok(Arc::new(db))
    }

    /// Inserts the demo tasks into an empty database.
    fn seed(db: &Database) -> Result<()> {
        db.with_transaction(|tx| {
            if tx.count_tasks(None)? > 0 {
                return Ok(());
            }

            let tasks = [
                TaskRecord::new("Task 1", false, "admin@permit-todo.app"),
                TaskRecord::new("Task 2", true, "user@permit-todo.app"),
                TaskRecord::new("Task 3", false, "admin@permit-todo.app"),
            ];
            for task in tasks {
                tx.create_task(task)?;
            }
            info!("Seeded database with demo tasks");
            Ok(())
        })
    }
}
