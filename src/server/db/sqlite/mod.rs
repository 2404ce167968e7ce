mod task;

pub mod config;
pub mod factory;

use std::path::Path;

use anyhow::Result;
use rusqlite::Connection as RawConnection;
use rusqlite::Transaction as RawTransaction;

use crate::types::task::TaskQuery;

use super::{Connection, TaskRecord, Transaction};

/// SQLite-based database implementation, for single-node deployments.
/// Supports both file-based and in-memory databases.
pub struct Sqlite {
    conn: RawConnection,
}

pub struct SqliteTransaction<'a> {
    tx: RawTransaction<'a>,
}

impl Sqlite {
    /// Opens a SQLite database file, creating it if it doesn't exist.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = RawConnection::open(path)?;
        Self::init_tables(&conn)?;
        Ok(Self { conn })
    }

    /// Creates a new in-memory database. Content is lost when the program exits.
    pub fn memory() -> Result<Self> {
        let conn = RawConnection::open_in_memory()?;
        Self::init_tables(&conn)?;
        Ok(Self { conn })
    }

    fn init_tables(db: &RawConnection) -> Result<()> {
        task::create_task_tables(db)?;
        Ok(())
    }
}

impl<'a> Connection<'a, SqliteTransaction<'a>> for Sqlite {
    fn transaction(&'a mut self) -> Result<SqliteTransaction<'a>> {
        let tx = self.conn.transaction()?;
        Ok(SqliteTransaction { tx })
    }
}

impl Transaction for SqliteTransaction<'_> {
    fn create_task(&self, task: TaskRecord) -> Result<TaskRecord> {
        task::create_task(&self.tx, task)
    }

    fn is_task_exists(&self, id: u64) -> Result<bool> {
        task::is_task_exists(&self.tx, id)
    }

    fn get_task(&self, id: u64) -> Result<TaskRecord> {
        task::get_task(&self.tx, id)
    }

    fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<TaskRecord>> {
        task::list_tasks(&self.tx, query)
    }

    fn count_tasks(&self, owner: Option<&str>) -> Result<usize> {
        task::count_tasks(&self.tx, owner)
    }

    fn update_task(&self, id: u64, title: Option<&str>, checked: Option<bool>) -> Result<()> {
        task::update_task(&self.tx, id, title, checked)
    }

    fn delete_task(&self, id: u64) -> Result<()> {
        task::delete_task(&self.tx, id)
    }

    fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }

    fn rollback(self) -> Result<()> {
        self.tx.rollback()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::server::db::tests::run_all_tests;
    use crate::server::db::{Database, UnionConnection};

    use super::*;

    #[test]
    fn test_memory() {
        let db = Database::new(UnionConnection::Sqlite(Sqlite::memory().unwrap()));
        run_all_tests(&db);
    }

    #[test]
    fn test_file() {
        let path = std::env::temp_dir().join("permit-todo-test-sqlite.db");
        let _ = std::fs::remove_file(&path);

        let db = Database::new(UnionConnection::Sqlite(Sqlite::open(&path).unwrap()));
        run_all_tests(&db);
        drop(db);

        // Data survives reopening
        let db = Database::new(UnionConnection::Sqlite(Sqlite::open(&path).unwrap()));
        let count = db.with_transaction(|tx| tx.count_tasks(None)).unwrap();
        assert!(count > 0);

        std::fs::remove_file(&path).unwrap();
    }
}
