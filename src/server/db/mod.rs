mod sqlite;

#[cfg(test)]
mod tests;

pub mod config;
pub mod factory;

use std::sync::Mutex;

use anyhow::{bail, Result};

use crate::types::task::{Task, TaskQuery};

use sqlite::{Sqlite, SqliteTransaction};

/// Database connection trait that can create transactions
pub trait Connection<'a, T>
where
    T: Transaction + 'a,
{
    fn transaction(&'a mut self) -> Result<T>;
}

/// Database transaction trait that defines all database operations
pub trait Transaction {
    /// Creates a new task, `id` and times of the record are assigned by the database
    fn create_task(&self, task: TaskRecord) -> Result<TaskRecord>;
    fn is_task_exists(&self, id: u64) -> Result<bool>;
    fn get_task(&self, id: u64) -> Result<TaskRecord>;
    fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<TaskRecord>>;
    fn count_tasks(&self, owner: Option<&str>) -> Result<usize>;
    /// Updates the given fields and the update time
    fn update_task(&self, id: u64, title: Option<&str>, checked: Option<bool>) -> Result<()>;
    fn delete_task(&self, id: u64) -> Result<()>;

    fn commit(self) -> Result<()>;
    fn rollback(self) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskRecord {
    pub id: u64,
    pub title: String,
    pub checked: bool,
    pub owner: String,
    pub create_time: u64,
    pub update_time: u64,
}

impl From<TaskRecord> for Task {
    fn from(r: TaskRecord) -> Self {
        Task {
            id: r.id,
            title: r.title,
            checked: r.checked,
            owner: r.owner,
            create_time: r.create_time,
            update_time: r.update_time,
        }
    }
}

impl TaskRecord {
    pub fn new(title: impl Into<String>, checked: bool, owner: impl Into<String>) -> Self {
        Self {
            id: 0,
            title: title.into(),
            checked,
            owner: owner.into(),
            create_time: 0,
            update_time: 0,
        }
    }
}

pub struct Database {
    conn: Mutex<UnionConnection>,
}

pub enum UnionConnection {
    Sqlite(Sqlite),
}

enum UnionTransaction<'a> {
    Sqlite(SqliteTransaction<'a>),
}

impl Database {
    pub fn new(conn: UnionConnection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    #[cfg(test)]
    pub fn new_test() -> Self {
        let sqlite = Sqlite::memory().unwrap();
        Self::new(UnionConnection::Sqlite(sqlite))
    }

    /// Executes `f` within a transaction. The transaction is committed if `f`
    /// returns `Ok`, and rolled back otherwise.
    ///
    /// ```ignore
    /// let task = db.with_transaction(|tx| {
    ///     let task = tx.get_task(id)?;
    ///     tx.update_task(id, None, Some(true))?;
    ///     Ok(task)
    /// })?;
    /// ```
    pub fn with_transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn Transaction) -> Result<T>,
    {
        let mut conn = match self.conn.lock() {
            Ok(conn) => conn,
            Err(e) => bail!("failed to lock database: {e:#}"),
        };
        let tx = conn.transaction()?;

        let result = f(&tx);

        if result.is_ok() {
            tx.commit()
        } else {
            tx.rollback()
        }?;

        result
    }
}

impl<'a> Connection<'a, UnionTransaction<'a>> for UnionConnection {
    fn transaction(&'a mut self) -> Result<UnionTransaction<'a>> {
        match self {
            UnionConnection::Sqlite(sqlite) => sqlite.transaction().map(UnionTransaction::Sqlite),
        }
    }
}

impl Transaction for UnionTransaction<'_> {
    fn create_task(&self, task: TaskRecord) -> Result<TaskRecord> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.create_task(task),
        }
    }

    fn is_task_exists(&self, id: u64) -> Result<bool> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.is_task_exists(id),
        }
    }

    fn get_task(&self, id: u64) -> Result<TaskRecord> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.get_task(id),
        }
    }

    fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<TaskRecord>> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.list_tasks(query),
        }
    }

    fn count_tasks(&self, owner: Option<&str>) -> Result<usize> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.count_tasks(owner),
        }
    }

    fn update_task(&self, id: u64, title: Option<&str>, checked: Option<bool>) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.update_task(id, title, checked),
        }
    }

    fn delete_task(&self, id: u64) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.delete_task(id),
        }
    }

    fn commit(self) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.commit(),
        }
    }

    fn rollback(self) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.rollback(),
        }
    }
}
