pub mod config;
pub mod factory;

use std::{fs, io};

use anyhow::{bail, Context, Result};
use chrono::Local;
use log::{debug, info};
use reqwest::{Certificate, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::types::healthz::HealthzResponse;
use crate::types::response::{ResourceResponse, MIME_JSON};
use crate::types::task::{Task, TaskQuery, TaskRequest};
use crate::types::user::{CaniResponse, WhoamiResponse};

#[derive(Debug, Clone)]
pub struct Client {
    url: String,
    client: reqwest::Client,
    token: Option<String>,
}

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server error: code {code}, {message}")]
    Server { code: u16, message: String },

    #[error("Check health error: {0}")]
    Health(String),

    #[error("Unexpected error: {0}")]
    Unexpected(&'static str),

    #[error("Server returned invalid json: {0:?}")]
    InvalidJson(String),
}

impl Client {
    pub const MAX_TIME_DELTA_WITH_SERVER: u64 = 30;

    pub async fn connect(url: &str, cert_path: &str) -> Result<Self> {
        let url = url.trim_end_matches('/');
        let parsed = match Url::parse(url) {
            Ok(url) => url,
            Err(_) => bail!("invalid server url '{url}'"),
        };
        match parsed.scheme() {
            "http" | "https" => {}
            _ => bail!(
                "invalid url scheme, expect 'http' or 'https', not '{}'",
                parsed.scheme()
            ),
        }

        if parsed.path() != "/" {
            bail!(
                "invalid server url, path should be '/', not '{}'",
                parsed.path()
            );
        }

        let client = if cert_path.is_empty() || parsed.scheme() == "http" {
            reqwest::Client::new()
        } else {
            match fs::read(cert_path) {
                Ok(data) => {
                    let cert = Certificate::from_pem(&data).context("load cert file")?;
                    reqwest::Client::builder()
                        .add_root_certificate(cert)
                        .build()
                        .context("build server client")?
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => reqwest::Client::new(),
                Err(err) => return Err(err).context("read cert file"),
            }
        };

        let client = Client {
            url: url.to_string(),
            client,
            token: None,
        };
        client.check_health().await?;

        Ok(client)
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub async fn healthz(&self) -> Result<HealthzResponse, RequestError> {
        self.do_request(Method::GET, "healthz", None::<&()>, None::<&()>)
            .await
    }

    async fn check_health(&self) -> Result<(), RequestError> {
        let resp = self.healthz().await?;

        let now = Local::now().timestamp() as u64;
        let delta = now.abs_diff(resp.now);
        if delta > Self::MAX_TIME_DELTA_WITH_SERVER {
            return Err(RequestError::Health(format!(
                "system time differs too much from server time: difference: {delta}s, maximum tolerance: {}s",
                Self::MAX_TIME_DELTA_WITH_SERVER
            )));
        }

        let client_ip = resp.client_ip.unwrap_or(String::from("unknown"));
        info!(
            "Connected to server '{}', with client ip '{client_ip}'",
            self.url
        );

        Ok(())
    }

    pub async fn whoami(&self) -> Result<String, RequestError> {
        let resp: WhoamiResponse = self
            .do_request(Method::GET, "api/whoami", None::<&()>, None::<&()>)
            .await?;
        Ok(resp.name)
    }

    pub async fn cani(&self, action: &str, id: Option<u64>) -> Result<bool, RequestError> {
        let path = match id {
            Some(id) => format!("api/cani/{action}/tasks/{id}"),
            None => format!("api/cani/{action}/tasks"),
        };
        let resp: CaniResponse = self
            .do_request(Method::GET, &path, None::<&()>, None::<&()>)
            .await?;
        Ok(resp.allow)
    }

    pub async fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>, RequestError> {
        self.do_request(Method::GET, "api/tasks", Some(query), None::<&()>)
            .await
    }

    pub async fn get_task(&self, id: u64) -> Result<Task, RequestError> {
        let path = format!("api/tasks/{id}");
        self.do_request(Method::GET, &path, None::<&()>, None::<&()>)
            .await
    }

    pub async fn create_task(&self, req: &TaskRequest) -> Result<Task, RequestError> {
        self.do_request(Method::POST, "api/tasks", None::<&()>, Some(req))
            .await
    }

    pub async fn update_task(&self, id: u64, req: &TaskRequest) -> Result<Task, RequestError> {
        let path = format!("api/tasks/{id}");
        self.do_request(Method::PUT, &path, None::<&()>, Some(req))
            .await
    }

    pub async fn delete_task(&self, id: u64) -> Result<Task, RequestError> {
        let path = format!("api/tasks/{id}");
        self.do_request(Method::DELETE, &path, None::<&()>, None::<&()>)
            .await
    }

    async fn do_request<Q, B, T>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> Result<T, RequestError>
    where
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
        T: Serialize + DeserializeOwned,
    {
        let url = format!("{}/{}", self.url, path);
        debug!("Request server: {method} {url}");
        let mut req = self.client.request(method, &url);

        if let Some(query) = query {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req = req.header("Accept", MIME_JSON);

        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        let resp: ResourceResponse<T> = match serde_json::from_str(&text) {
            Ok(resp) => resp,
            // Errors raised by the http layer itself (e.g. payload too large)
            // are plain text
            Err(_) if !status.is_success() => {
                return Err(RequestError::Server {
                    code: status.as_u16(),
                    message: text,
                })
            }
            Err(_) => return Err(RequestError::InvalidJson(text)),
        };

        if resp.code != StatusCode::OK {
            return Err(RequestError::Server {
                code: resp.code,
                message: resp.message.unwrap_or_default(),
            });
        }
        match resp.data {
            Some(data) => Ok(data),
            None => Err(RequestError::Unexpected(
                "server didn't return data in json",
            )),
        }
    }
}

impl RequestError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RequestError::Server { code, .. } if *code == StatusCode::NOT_FOUND)
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, RequestError::Server { code, .. } if *code == StatusCode::FORBIDDEN)
    }
}

#[cfg(test)]
mod tests {
    use actix_web::HttpServer;

    use crate::server::config::ServerConfig;
    use crate::server::factory::ServerFactory;
    use crate::server::restful::RestfulServer;

    use super::*;

    #[actix_web::test]
    async fn test_client() {
        let cfg: ServerConfig = toml::from_str(
            r#"
[authz]
mode = "local"

[db.sqlite]
memory = true
"#,
        )
        .unwrap();
        let ctx = ServerFactory::new(cfg).unwrap().build_context().unwrap();

        let srv = HttpServer::new(move || RestfulServer::build_app(ctx.clone(), 64 * 1024))
            .workers(1)
            .bind(("127.0.0.1", 0))
            .unwrap();
        let addr = srv.addrs()[0];
        let srv = srv.run();
        let handle = srv.handle();
        actix_web::rt::spawn(srv);

        let url = format!("http://{addr}");
        assert!(Client::connect("ftp://127.0.0.1", "").await.is_err());
        assert!(Client::connect(&format!("{url}/api"), "").await.is_err());

        let mut client = Client::connect(&url, "").await.unwrap();

        let tasks = client.list_tasks(&TaskQuery::default()).await.unwrap();
        assert_eq!(tasks.len(), 3);

        let query = TaskQuery {
            owner: Some("admin@permit-todo.app".to_string()),
            ..Default::default()
        };
        let tasks = client.list_tasks(&query).await.unwrap();
        assert_eq!(tasks.len(), 2);

        let err = client.whoami().await.unwrap_err();
        assert!(matches!(err, RequestError::Server { code: 401, .. }));

        client.set_token("user@permit-todo.app".to_string());
        assert_eq!(client.whoami().await.unwrap(), "user@permit-todo.app");

        let req = TaskRequest {
            title: Some("Task 4".to_string()),
            checked: None,
        };
        let task = client.create_task(&req).await.unwrap();
        assert_eq!(task.owner, "user@permit-todo.app");

        assert!(!client.cani("delete", Some(task.id)).await.unwrap());
        let req = TaskRequest {
            title: None,
            checked: Some(true),
        };
        let task = client.update_task(task.id, &req).await.unwrap();
        assert!(task.checked);
        assert!(client.cani("delete", Some(task.id)).await.unwrap());

        let deleted = client.delete_task(task.id).await.unwrap();
        assert_eq!(deleted.id, task.id);
        assert!(client.get_task(task.id).await.unwrap_err().is_not_found());

        assert!(client.delete_task(1).await.unwrap_err().is_forbidden());

        handle.stop(false).await;
    }
}
