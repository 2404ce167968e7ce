use std::collections::HashSet;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::{CommonConfig, PathSet};
use crate::server::pdp::config::PdpConfig;
use crate::types::task::TASKS_RESOURCE;

/// Authorization related configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthzConfig {
    /// Where decisions are made. Default: pdp.
    #[serde(default = "AuthzConfig::default_mode")]
    pub mode: AuthzMode,

    /// Resources everybody (anonymous included) may read without asking the
    /// policy. Default: ["tasks"].
    #[serde(default = "AuthzConfig::default_public_resources")]
    pub public_resources: Vec<String>,

    #[serde(default = "PdpConfig::default")]
    pub pdp: PdpConfig,

    /// Permission table used in local mode.
    #[serde(default = "AuthzConfig::default_roles")]
    pub roles: Vec<RolePolicy>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub enum AuthzMode {
    /// Ask the external policy decision point
    #[serde(rename = "pdp")]
    Pdp,
    /// Evaluate the `roles` table in process, no network involved
    #[serde(rename = "local")]
    Local,
}

/// A role and the users assigned to it. `*` in users matches every
/// authenticated user.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RolePolicy {
    pub name: String,

    #[serde(default)]
    pub users: HashSet<String>,

    #[serde(default)]
    pub rules: Vec<PolicyRule>,
}

/// `*` in resources or actions matches everything.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PolicyRule {
    pub resources: HashSet<String>,

    pub actions: HashSet<String>,

    /// Only when the resource's `owner` attribute is the requesting user
    #[serde(default)]
    pub owner_only: bool,

    /// Only when the resource's `checked` attribute is true
    #[serde(default)]
    pub checked_only: bool,
}

impl CommonConfig for AuthzConfig {
    fn default() -> Self {
        Self {
            mode: Self::default_mode(),
            public_resources: Self::default_public_resources(),
            pdp: PdpConfig::default(),
            roles: Self::default_roles(),
        }
    }

    fn complete(&mut self, ps: &PathSet) -> Result<()> {
        match self.mode {
            AuthzMode::Pdp => self.pdp.complete(ps).context("pdp")?,
            AuthzMode::Local => {
                if self.roles.is_empty() {
                    bail!("roles cannot be empty in local mode");
                }
                for role in self.roles.iter() {
                    role.validate()
                        .with_context(|| format!("validate role '{}'", role.name))?;
                }
            }
        }
        Ok(())
    }
}

impl RolePolicy {
    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            bail!("role name cannot be empty");
        }
        for rule in self.rules.iter() {
            if rule.resources.is_empty() {
                bail!("rule resources cannot be empty");
            }
            if rule.actions.is_empty() {
                bail!("rule actions cannot be empty");
            }
        }
        Ok(())
    }
}

impl AuthzConfig {
    pub fn default_mode() -> AuthzMode {
        AuthzMode::Pdp
    }

    pub fn default_public_resources() -> Vec<String> {
        vec![String::from(TASKS_RESOURCE)]
    }

    /// The demo permission table:
    ///
    /// | Role  | get | post | put       | delete                 |
    /// |-------|-----|------|-----------|------------------------|
    /// | admin | ✓   | ✓    | ✓         | ✓                      |
    /// | user  | ✓   | ✓    | own tasks | own tasks, when done   |
    pub fn default_roles() -> Vec<RolePolicy> {
        let tasks = || -> HashSet<String> { [String::from(TASKS_RESOURCE)].into() };
        let actions = |actions: &[&str]| -> HashSet<String> {
            actions.iter().map(|a| a.to_string()).collect()
        };
        vec![
            RolePolicy {
                name: String::from("admin"),
                users: [String::from("admin@permit-todo.app")].into(),
                rules: vec![PolicyRule {
                    resources: tasks(),
                    actions: actions(&["*"]),
                    owner_only: false,
                    checked_only: false,
                }],
            },
            RolePolicy {
                name: String::from("user"),
                users: [String::from("*")].into(),
                rules: vec![
                    PolicyRule {
                        resources: tasks(),
                        actions: actions(&["get", "post"]),
                        owner_only: false,
                        checked_only: false,
                    },
                    PolicyRule {
                        resources: tasks(),
                        actions: actions(&["put"]),
                        owner_only: true,
                        checked_only: false,
                    },
                    PolicyRule {
                        resources: tasks(),
                        actions: actions(&["delete"]),
                        owner_only: true,
                        checked_only: true,
                    },
                ],
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_local() {
        let ps = PathSet::new_test("authz_config");
        let toml_str = r#"
mode = "local"

[[roles]]
name = "editor"
users = ["editor@permit-todo.app"]

[[roles.rules]]
resources = ["tasks"]
actions = ["put", "delete"]
owner_only = true
"#;
        let mut cfg: AuthzConfig = toml::from_str(toml_str).unwrap();
        cfg.complete(&ps).unwrap();
        assert_eq!(cfg.mode, AuthzMode::Local);
        assert_eq!(cfg.public_resources, vec!["tasks".to_string()]);
        assert_eq!(cfg.roles.len(), 1);
        let rule = &cfg.roles[0].rules[0];
        assert!(rule.owner_only);
        assert!(!rule.checked_only);
        assert!(rule.actions.contains("delete"));

        let toml_str = r#"
mode = "local"

[[roles]]
name = "broken"
users = ["*"]

[[roles.rules]]
resources = ["tasks"]
actions = []
"#;
        let mut cfg: AuthzConfig = toml::from_str(toml_str).unwrap();
        assert!(cfg.complete(&ps).is_err());
    }

    #[test]
    fn test_pdp_mode_requires_key() {
        let ps = PathSet::new_test("authz_config_pdp");
        let mut cfg: AuthzConfig = toml::from_str("[pdp]\napi_key = \"\"\n").unwrap();
        assert_eq!(cfg.mode, AuthzMode::Pdp);
        assert!(cfg.complete(&ps).is_err());

        let mut cfg: AuthzConfig =
            toml::from_str("[pdp]\napi_key = \"permit_key_abc\"\ntenant = \"acme\"\n").unwrap();
        cfg.complete(&ps).unwrap();
        assert_eq!(cfg.pdp.tenant, "acme");
    }
}
