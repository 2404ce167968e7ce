use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use super::config::{PolicyRule, RolePolicy};
use super::{Authorizer, AuthzRequest, AuthzResponse};

/// Evaluates the configured permission table in process.
///
/// A request is allowed when any role the user holds has a rule matching the
/// resource and action whose attribute conditions hold.
pub struct LocalAuthorizer {
    roles: Vec<RolePolicy>,
}

impl LocalAuthorizer {
    pub fn new(roles: Vec<RolePolicy>) -> Self {
        Self { roles }
    }

    fn roles_of<'a>(&'a self, user: &'a str) -> impl Iterator<Item = &'a RolePolicy> + 'a {
        self.roles
            .iter()
            .filter(move |role| role.users.contains("*") || role.users.contains(user))
    }
}

#[async_trait]
impl Authorizer for LocalAuthorizer {
    async fn authorize_request(&self, req: &AuthzRequest) -> Result<AuthzResponse> {
        if req.user.is_anonymous {
            return Ok(AuthzResponse::Unauthorized);
        }

        for role in self.roles_of(&req.user.name) {
            if is_authorized(&role.rules, req) {
                return Ok(AuthzResponse::Ok);
            }
        }

        Ok(AuthzResponse::Unauthorized)
    }
}

/// Checks if any rule allows the request.
pub fn is_authorized(rules: &[PolicyRule], req: &AuthzRequest) -> bool {
    for rule in rules.iter() {
        if !rule.resources.contains("*") && !rule.resources.contains(&req.resource) {
            continue;
        }
        if !rule.actions.contains("*") && !rule.actions.contains(&req.action) {
            continue;
        }
        if rule.owner_only {
            let owner = req.attributes.get("owner").and_then(Value::as_str);
            if owner != Some(req.user.name.as_str()) {
                continue;
            }
        }
        if rule.checked_only {
            let checked = req.attributes.get("checked").and_then(Value::as_bool);
            if checked != Some(true) {
                continue;
            }
        }
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map};

    use crate::config::CommonConfig;
    use crate::server::authn::AuthnUserInfo;
    use crate::server::authz::config::AuthzConfig;

    use super::*;

    const ADMIN: &str = "admin@permit-todo.app";
    const USER: &str = "user@permit-todo.app";

    fn request(user: &str, action: &str, owner: &str, checked: bool) -> AuthzRequest {
        let mut attributes = Map::new();
        attributes.insert("title".to_string(), json!("Task"));
        attributes.insert("owner".to_string(), json!(owner));
        attributes.insert("checked".to_string(), json!(checked));
        AuthzRequest {
            resource: "tasks".to_string(),
            action: action.to_string(),
            attributes,
            user: AuthnUserInfo {
                name: user.to_string(),
                is_anonymous: false,
            },
        }
    }

    #[tokio::test]
    async fn test_default_table() {
        let authz = LocalAuthorizer::new(AuthzConfig::default().roles);

        // (user, action, owner, checked, allow)
        let cases = [
            (ADMIN, "get", USER, false, true),
            (ADMIN, "post", ADMIN, false, true),
            (ADMIN, "put", USER, false, true),
            (ADMIN, "delete", USER, false, true),
            (USER, "get", ADMIN, false, true),
            (USER, "post", USER, false, true),
            (USER, "put", USER, false, true),
            (USER, "put", ADMIN, false, false),
            (USER, "delete", USER, true, true),
            (USER, "delete", USER, false, false),
            (USER, "delete", ADMIN, true, false),
            (USER, "patch", USER, true, false),
        ];
        for (user, action, owner, checked, allow) in cases {
            let req = request(user, action, owner, checked);
            let resp = authz.authorize_request(&req).await.unwrap();
            let expect = if allow {
                AuthzResponse::Ok
            } else {
                AuthzResponse::Unauthorized
            };
            assert_eq!(resp, expect, "{user} {action} owner={owner} checked={checked}");
        }

        let mut req = request(USER, "get", USER, false);
        req.user = AuthnUserInfo::anonymous();
        let resp = authz.authorize_request(&req).await.unwrap();
        assert_eq!(resp, AuthzResponse::Unauthorized);
    }

    #[test]
    fn test_is_authorized() {
        let rules = vec![
            PolicyRule {
                resources: ["tasks".to_string()].into(),
                actions: ["get".to_string()].into(),
                owner_only: false,
                checked_only: false,
            },
            PolicyRule {
                resources: ["*".to_string()].into(),
                actions: ["delete".to_string()].into(),
                owner_only: false,
                checked_only: true,
            },
        ];

        assert!(is_authorized(&rules, &request(USER, "get", ADMIN, false)));
        assert!(!is_authorized(&rules, &request(USER, "put", USER, false)));
        assert!(is_authorized(&rules, &request(USER, "delete", ADMIN, true)));
        assert!(!is_authorized(&rules, &request(USER, "delete", ADMIN, false)));

        // Missing attributes never satisfy a condition
        let mut req = request(USER, "delete", USER, true);
        req.attributes.clear();
        assert!(!is_authorized(&rules, &req));
    }
}
