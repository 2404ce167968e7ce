use anyhow::{bail, Result};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction};

use crate::server::db::TaskRecord;
use crate::time::current_timestamp;
use crate::types::task::TaskQuery;

const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS task (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    checked INTEGER NOT NULL DEFAULT 0,
    owner TEXT NOT NULL,
    create_time INTEGER NOT NULL,
    update_time INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_task_owner ON task(owner);
"#;

const SELECT_FIELDS: &str = "SELECT id, title, checked, owner, create_time, update_time FROM task";

pub fn create_task_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_TABLES)?;
    Ok(())
}

fn convert_task(row: &Row) -> rusqlite::Result<TaskRecord> {
    Ok(TaskRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        checked: row.get(2)?,
        owner: row.get(3)?,
        create_time: row.get(4)?,
        update_time: row.get(5)?,
    })
}

pub fn create_task(tx: &Transaction, mut task: TaskRecord) -> Result<TaskRecord> {
    let now = current_timestamp();
    tx.execute(
        "INSERT INTO task (title, checked, owner, create_time, update_time) VALUES (?, ?, ?, ?, ?)",
        params![task.title, task.checked, task.owner, now, now],
    )?;
    task.id = tx.last_insert_rowid() as u64;
    task.create_time = now;
    task.update_time = now;
    Ok(task)
}

pub fn is_task_exists(tx: &Transaction, id: u64) -> Result<bool> {
    let mut stmt = tx.prepare("SELECT COUNT(*) FROM task WHERE id = ?")?;
    let count: i64 = stmt.query_row(params![id], |row| row.get(0))?;
    Ok(count > 0)
}

pub fn get_task(tx: &Transaction, id: u64) -> Result<TaskRecord> {
    let sql = format!("{SELECT_FIELDS} WHERE id = ?");
    let mut stmt = tx.prepare(&sql)?;
    let task = stmt.query_row(params![id], convert_task)?;
    Ok(task)
}

pub fn list_tasks(tx: &Transaction, query: &TaskQuery) -> Result<Vec<TaskRecord>> {
    let mut sql = String::from(SELECT_FIELDS);
    let mut conds = Vec::new();
    let mut params = Vec::new();

    if let Some(owner) = query.owner.as_ref() {
        conds.push("owner = ?");
        params.push(Value::Text(owner.clone()));
    }
    if let Some(checked) = query.checked {
        conds.push("checked = ?");
        params.push(Value::Integer(checked as i64));
    }
    if !conds.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conds.join(" AND "));
    }

    sql.push_str(" ORDER BY id ASC");

    // SQLite requires LIMIT when OFFSET is used, -1 means no limit
    if query.limit.is_some() || query.offset.is_some() {
        sql.push_str(" LIMIT ? OFFSET ?");
        // Values above i64::MAX are clamped, sqlite integers are signed
        let limit = query
            .limit
            .map(|l| i64::try_from(l).unwrap_or(i64::MAX))
            .unwrap_or(-1);
        let offset = i64::try_from(query.offset.unwrap_or(0)).unwrap_or(i64::MAX);
        params.push(Value::Integer(limit));
        params.push(Value::Integer(offset));
    }

    let mut stmt = tx.prepare(&sql)?;
    let tasks = stmt
        .query_map(params_from_iter(params), convert_task)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(tasks)
}

pub fn count_tasks(tx: &Transaction, owner: Option<&str>) -> Result<usize> {
    let count: i64 = match owner {
        Some(owner) => tx.query_row(
            "SELECT COUNT(*) FROM task WHERE owner = ?",
            params![owner],
            |row| row.get(0),
        )?,
        None => tx.query_row("SELECT COUNT(*) FROM task", [], |row| row.get(0))?,
    };
    Ok(count as usize)
}

pub fn update_task(
    tx: &Transaction,
    id: u64,
    title: Option<&str>,
    checked: Option<bool>,
) -> Result<()> {
    let mut sets = vec!["update_time = ?"];
    let mut params = vec![Value::Integer(current_timestamp() as i64)];

    if let Some(title) = title {
        sets.push("title = ?");
        params.push(Value::Text(title.to_string()));
    }
    if let Some(checked) = checked {
        sets.push("checked = ?");
        params.push(Value::Integer(checked as i64));
    }
    params.push(Value::Integer(id as i64));

    let sql = format!("UPDATE task SET {} WHERE id = ?", sets.join(", "));
    let updated = tx.execute(&sql, params_from_iter(params))?;
    if updated == 0 {
        bail!("task {id} not found");
    }
    Ok(())
}

pub fn delete_task(tx: &Transaction, id: u64) -> Result<()> {
    let deleted = tx.execute("DELETE FROM task WHERE id = ?", params![id])?;
    if deleted == 0 {
        bail!("task {id} not found");
    }
    Ok(())
}
