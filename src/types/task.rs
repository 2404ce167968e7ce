use std::collections::HashMap;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::display::TerminalDisplay;
use crate::time::format_since;

/// The resource type name tasks are registered under in the policy decision point.
pub const TASKS_RESOURCE: &str = "tasks";

/// A task as returned by the api.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub checked: bool,
    pub owner: String,
    pub create_time: u64,
    pub update_time: u64,
}

/// Body of `POST /api/tasks` and `PUT /api/tasks/{id}`.
///
/// The owner is never read from the body, the server always takes it from the
/// authenticated identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
}

/// Filters for listing tasks. Passed as url query on `GET /api/tasks`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

impl Task {
    /// Attributes sent to the decision point along with the resource type.
    pub fn attributes(&self) -> Map<String, Value> {
        let mut attrs = Map::new();
        attrs.insert("title".to_string(), Value::String(self.title.clone()));
        attrs.insert("checked".to_string(), Value::Bool(self.checked));
        attrs.insert("owner".to_string(), Value::String(self.owner.clone()));
        attrs
    }
}

impl TaskRequest {
    /// Validates the request for creating a new task.
    pub fn validate_create(&self) -> Result<()> {
        match self.title.as_deref() {
            Some(title) if !title.trim().is_empty() => Ok(()),
            _ => bail!("title is required"),
        }
    }

    /// Validates the request for updating an existing task.
    pub fn validate_update(&self) -> Result<()> {
        if self.title.is_none() && self.checked.is_none() {
            bail!("nothing to update");
        }
        if let Some(title) = self.title.as_deref() {
            if title.trim().is_empty() {
                bail!("title cannot be empty");
            }
        }
        Ok(())
    }

    /// Attributes of the task this request would create, owned by `owner`.
    pub fn attributes(&self, owner: &str) -> Map<String, Value> {
        let mut attrs = Map::new();
        if let Some(title) = self.title.as_ref() {
            attrs.insert("title".to_string(), Value::String(title.clone()));
        }
        attrs.insert(
            "checked".to_string(),
            Value::Bool(self.checked.unwrap_or(false)),
        );
        attrs.insert("owner".to_string(), Value::String(owner.to_string()));
        attrs
    }
}

impl TerminalDisplay for Task {
    fn table_titles() -> Vec<&'static str> {
        vec!["ID", "TITLE", "DONE", "OWNER", "UPDATE"]
    }

    fn table_row(self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.title,
            if self.checked { "yes" } else { "no" }.to_string(),
            self.owner,
            format_since(self.update_time),
        ]
    }

    fn csv_row(self) -> HashMap<&'static str, String> {
        let mut row = HashMap::new();
        row.insert("ID", self.id.to_string());
        row.insert("TITLE", self.title);
        row.insert("DONE", self.checked.to_string());
        row.insert("OWNER", self.owner);
        row.insert("UPDATE", self.update_time.to_string());
        row
    }
}
