use std::sync::Arc;

use actix_web::web::Query;
use actix_web::HttpRequest;
use async_trait::async_trait;
use log::{debug, error, info};
use serde_json::{Map, Value};

use crate::server::authn::chain::ChainAuthenticator;
use crate::server::authn::token::UnionTokenValidator;
use crate::server::authn::{Authenticator, AuthnResponse, AuthnUserInfo};
use crate::server::authz::chain::ChainAuthorizer;
use crate::server::authz::{Authorizer, AuthzRequest, AuthzResponse};
use crate::server::db::{Database, TaskRecord};
use crate::server::response::{Failure, Response};
use crate::types::task::{Task, TaskQuery, TaskRequest, TASKS_RESOURCE};
use crate::types::user::{CaniResponse, WhoamiResponse};

use super::Handler;

pub struct ApiHandler {
    authn: ChainAuthenticator<UnionTokenValidator>,
    authz: ChainAuthorizer,

    db: Arc<Database>,
}

/// Outcome of asking the authorizer, already mapped to the response the
/// caller gets when access is not granted.
enum Decision {
    Allow,
    Deny(Response),
}

impl ApiHandler {
    const ACTIONS: [&str; 4] = ["get", "post", "put", "delete"];

    pub fn new(
        authn: ChainAuthenticator<UnionTokenValidator>,
        authz: ChainAuthorizer,
        db: Arc<Database>,
    ) -> Self {
        Self { authn, authz, db }
    }

    fn split_api_path(path: &str) -> Result<(String, Option<String>), &'static str> {
        let path = path.trim_end_matches('/');
        let parts: Vec<&str> = path.split('/').collect();

        match parts.as_slice() {
            [] => Err("empty path"),
            [""] => Err("empty resource"),
            [resource] => Ok((resource.to_string(), None)),
            [resource, id] => Ok((resource.to_string(), Some(id.to_string()))),
            _ => Err("invalid path format"),
        }
    }

    fn parse_id(id: &str) -> Result<u64, Response> {
        match id.parse::<u64>() {
            // Ids are stored as sqlite integers
            Ok(id) if id > 0 && id <= i64::MAX as u64 => Ok(id),
            _ => Err(Response::bad_request(format!("Invalid task id '{id}'"))),
        }
    }

    fn parse_task_request(body: Option<Vec<u8>>) -> Result<TaskRequest, Response> {
        let body = match body {
            Some(body) => body,
            None => return Err(Response::bad_request("Request body is required")),
        };
        match serde_json::from_slice(&body) {
            Ok(req) => Ok(req),
            Err(e) => Err(Response::bad_request(format!("Invalid task json: {e}"))),
        }
    }

    /// Only authenticated (non-anonymous) users may write or ask about
    /// themselves.
    fn require_user(user: &AuthnUserInfo) -> Option<Response> {
        if user.is_anonymous {
            return Some(Response::unauthenticated("Token is required"));
        }
        None
    }

    fn load_task(&self, id: u64) -> Result<Task, Response> {
        let result = self.db.with_transaction(|tx| {
            if !tx.is_task_exists(id)? {
                return Ok(None);
            }
            tx.get_task(id).map(Some)
        });
        match result {
            Ok(Some(record)) => Ok(record.into()),
            Ok(None) => Err(Response::not_found()),
            Err(e) => {
                error!("Failed to get task {id}: {e:#}");
                Err(Response::failure(Failure::Database))
            }
        }
    }

    async fn authorize(
        &self,
        action: &str,
        attributes: Map<String, Value>,
        user: &AuthnUserInfo,
    ) -> Decision {
        let req = AuthzRequest {
            resource: TASKS_RESOURCE.to_string(),
            action: action.to_string(),
            attributes,
            user: user.clone(),
        };
        match self.authz.authorize_request(&req).await {
            Ok(AuthzResponse::Ok) => {
                debug!("Allow {action} on {TASKS_RESOURCE} for '{}'", user.name);
                Decision::Allow
            }
            Ok(_) => {
                info!("Deny {action} on {TASKS_RESOURCE} for '{}'", user.name);
                Decision::Deny(Response::denied())
            }
            Err(e) => {
                error!("Authorization for {action} on {TASKS_RESOURCE} failed: {e:#}");
                Decision::Deny(Response::failure(Failure::Authz))
            }
        }
    }

    fn handle_whoami(&self, user: AuthnUserInfo) -> Response {
        Response::json(WhoamiResponse { name: user.name })
    }

    /// `cani/{action}/tasks[/{id}]`, answers whether the caller would be
    /// allowed to perform the action, without performing it.
    async fn handle_cani(&self, path: &str, user: AuthnUserInfo) -> Response {
        let parts: Vec<&str> = path.split('/').collect();
        let (action, resource, id) = match parts.as_slice() {
            [action, resource] => (*action, *resource, None),
            [action, resource, id] => (*action, *resource, Some(*id)),
            _ => return Response::bad_request("Invalid path format"),
        };

        if !Self::ACTIONS.contains(&action) {
            return Response::bad_request(format!("Invalid action '{action}'"));
        }
        if resource != TASKS_RESOURCE {
            return Response::not_found();
        }

        let attributes = match id {
            Some(id) => {
                let id = match Self::parse_id(id) {
                    Ok(id) => id,
                    Err(resp) => return resp,
                };
                match self.load_task(id) {
                    Ok(task) => task.attributes(),
                    Err(resp) => return resp,
                }
            }
            None if action == "post" => TaskRequest::default().attributes(&user.name),
            None => Map::new(),
        };

        match self.authorize(action, attributes, &user).await {
            Decision::Allow => Response::json(CaniResponse { allow: true }),
            // Only a plain deny is an answer, errors stay errors
            Decision::Deny(resp) if resp.is_denied() => {
                Response::json(CaniResponse { allow: false })
            }
            Decision::Deny(resp) => resp,
        }
    }

    async fn handle_list(&self, req: &HttpRequest, user: AuthnUserInfo) -> Response {
        let query = match Query::<TaskQuery>::from_query(req.query_string()) {
            Ok(query) => query.into_inner(),
            Err(e) => return Response::bad_request(format!("Invalid query: {e}")),
        };

        if let Decision::Deny(resp) = self.authorize("get", Map::new(), &user).await {
            return resp;
        }

        let result = self.db.with_transaction(|tx| tx.list_tasks(&query));
        match result {
            Ok(records) => {
                let tasks: Vec<Task> = records.into_iter().map(Task::from).collect();
                Response::json(tasks)
            }
            Err(e) => {
                error!("Failed to list tasks: {e:#}");
                Response::failure(Failure::Database)
            }
        }
    }

    async fn handle_get(&self, id: u64, user: AuthnUserInfo) -> Response {
        let task = match self.load_task(id) {
            Ok(task) => task,
            Err(resp) => return resp,
        };

        if let Decision::Deny(resp) = self.authorize("get", task.attributes(), &user).await {
            return resp;
        }

        Response::json(task)
    }

    async fn handle_create(&self, body: Option<Vec<u8>>, user: AuthnUserInfo) -> Response {
        let task_req = match Self::parse_task_request(body) {
            Ok(req) => req,
            Err(resp) => return resp,
        };
        if let Err(e) = task_req.validate_create() {
            return Response::bad_request(format!("{e:#}"));
        }

        let attributes = task_req.attributes(&user.name);
        if let Decision::Deny(resp) = self.authorize("post", attributes, &user).await {
            return resp;
        }

        let record = TaskRecord::new(
            task_req.title.unwrap_or_default().trim(),
            task_req.checked.unwrap_or(false),
            user.name.as_str(),
        );
        let result = self.db.with_transaction(|tx| tx.create_task(record));
        match result {
            Ok(record) => {
                info!("Task {} created by '{}'", record.id, user.name);
                Response::json(Task::from(record))
            }
            Err(e) => {
                error!("Failed to create task: {e:#}");
                Response::failure(Failure::Database)
            }
        }
    }

    async fn handle_update(
        &self,
        id: u64,
        body: Option<Vec<u8>>,
        user: AuthnUserInfo,
    ) -> Response {
        let task_req = match Self::parse_task_request(body) {
            Ok(req) => req,
            Err(resp) => return resp,
        };
        if let Err(e) = task_req.validate_update() {
            return Response::bad_request(format!("{e:#}"));
        }

        let task = match self.load_task(id) {
            Ok(task) => task,
            Err(resp) => return resp,
        };
        if let Decision::Deny(resp) = self.authorize("put", task.attributes(), &user).await {
            return resp;
        }

        let title = task_req.title.as_deref().map(str::trim);
        let result = self.db.with_transaction(|tx| {
            if !tx.is_task_exists(id)? {
                return Ok(None);
            }
            tx.update_task(id, title, task_req.checked)?;
            tx.get_task(id).map(Some)
        });
        match result {
            Ok(Some(record)) => {
                info!("Task {id} updated by '{}'", user.name);
                Response::json(Task::from(record))
            }
            Ok(None) => Response::not_found(),
            Err(e) => {
                error!("Failed to update task {id}: {e:#}");
                Response::failure(Failure::Database)
            }
        }
    }

    async fn handle_delete(&self, id: u64, user: AuthnUserInfo) -> Response {
        let task = match self.load_task(id) {
            Ok(task) => task,
            Err(resp) => return resp,
        };
        if let Decision::Deny(resp) = self.authorize("delete", task.attributes(), &user).await {
            return resp;
        }

        let result = self.db.with_transaction(|tx| {
            if !tx.is_task_exists(id)? {
                return Ok(false);
            }
            tx.delete_task(id)?;
            Ok(true)
        });
        match result {
            Ok(true) => {
                info!("Task {id} deleted by '{}'", user.name);
                Response::json(task)
            }
            Ok(false) => Response::not_found(),
            Err(e) => {
                error!("Failed to delete task {id}: {e:#}");
                Response::failure(Failure::Database)
            }
        }
    }
}

#[async_trait(?Send)]
impl Handler for ApiHandler {
    async fn handle(&self, path: &str, req: HttpRequest, body: Option<Vec<u8>>) -> Response {
        let method = req.method().as_str().to_lowercase();
        let authn_resp = match self.authn.authenticate_request(&req, None) {
            Ok(resp) => resp,
            Err(e) => {
                error!("Authentication failed: {e:#}");
                return Response::failure(Failure::Authn);
            }
        };
        let user_info = match authn_resp {
            AuthnResponse::Ok(user_info) => user_info,
            AuthnResponse::Unauthenticated => return Response::unauthenticated("Invalid token"),
            AuthnResponse::Continue => return Response::unauthenticated("Token is required"),
        };

        if let Some(path) = path.strip_prefix("cani/") {
            if method != "get" {
                return Response::method_not_allowed();
            }
            if let Some(resp) = Self::require_user(&user_info) {
                return resp;
            }
            return self.handle_cani(path.trim_matches('/'), user_info).await;
        }

        let (resource, id) = match Self::split_api_path(path) {
            Ok((resource, id)) => (resource, id),
            Err(msg) => return Response::bad_request(msg),
        };

        if resource == "whoami" {
            if id.is_some() {
                return Response::bad_request("whoami does not take an id");
            }
            if method != "get" {
                return Response::method_not_allowed();
            }
            if let Some(resp) = Self::require_user(&user_info) {
                return resp;
            }
            return self.handle_whoami(user_info);
        }

        if resource != TASKS_RESOURCE {
            return Response::not_found();
        }

        let id = match id {
            Some(id) => match Self::parse_id(&id) {
                Ok(id) => Some(id),
                Err(resp) => return resp,
            },
            None => None,
        };

        if method != "get" {
            if let Some(resp) = Self::require_user(&user_info) {
                return resp;
            }
        }

        match (method.as_str(), id) {
            ("get", None) => self.handle_list(&req, user_info).await,
            ("get", Some(id)) => self.handle_get(id, user_info).await,
            ("post", None) => self.handle_create(body, user_info).await,
            ("put", Some(id)) => self.handle_update(id, body, user_info).await,
            ("delete", Some(id)) => self.handle_delete(id, user_info).await,
            ("post", Some(_)) => Response::bad_request("Task id is assigned by the server"),
            ("put", None) | ("delete", None) => Response::bad_request("Task id is required"),
            _ => Response::method_not_allowed(),
        }
    }
}
