use std::sync::Arc;
use std::time::Duration;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::web::{self, Bytes, Data, PayloadConfig};
use actix_web::{App, Error, HttpRequest, HttpResponse, HttpServer};
use anyhow::{Context, Result};
use log::{info, warn};
use openssl::ssl::SslAcceptorBuilder;
use sd_notify::NotifyState;

use crate::types::response::CommonResponse;

use super::handlers::api::ApiHandler;
use super::handlers::healthz::HealthzHandler;
use super::handlers::Handler;
use super::response::Response;

pub struct RestfulServer {
    ssl: Option<SslAcceptorBuilder>,
    ctx: Arc<RestfulContext>,

    keep_alive_secs: Option<u64>,
    workers: Option<u64>,

    bind: String,

    payload_limit_kib: usize,
}

pub struct RestfulContext {
    pub api_handler: ApiHandler,
    pub healthz_handler: HealthzHandler,
}

impl RestfulServer {
    const API_PATH: &str = "/api";
    const HEALTHZ_PATH: &str = "/healthz";

    pub fn new(
        bind: String,
        ssl: Option<SslAcceptorBuilder>,
        ctx: Arc<RestfulContext>,
        payload_limit_kib: usize,
    ) -> Self {
        Self {
            ssl,
            ctx,
            keep_alive_secs: None,
            workers: None,
            bind,
            payload_limit_kib,
        }
    }

    pub fn set_keep_alive_secs(&mut self, keep_alive_secs: u64) {
        self.keep_alive_secs = Some(keep_alive_secs);
    }

    pub fn set_workers(&mut self, workers: u64) {
        self.workers = Some(workers);
    }

    pub async fn run(mut self) -> Result<()> {
        // The HttpServer builder is not Send, only the running Server may be
        // held across an await.
        let server = {
            let ctx = self.ctx.clone();
            let payload_limit = self.payload_limit_kib * 1024;
            let mut srv = HttpServer::new(move || Self::build_app(ctx.clone(), payload_limit));

            if let Some(ssl) = self.ssl.take() {
                info!("Binding to https://{}", self.bind);
                srv = srv.bind_openssl(&self.bind, ssl).context("bind with ssl")?
            } else {
                warn!("Using HTTP (without SSL). Bearer tokens are sent in clear text, DO NOT USE IN PRODUCTION");
                info!("Binding to http://{}", self.bind);
                srv = srv.bind(&self.bind).context("bind without ssl")?
            };

            if let Some(keep_alive) = self.keep_alive_secs {
                srv = srv.keep_alive(Duration::from_secs(keep_alive));
            }
            if let Some(workers) = self.workers {
                srv = srv.workers(workers as usize);
            }
            srv.run()
        };

        if let Err(e) = sd_notify::notify(true, &[NotifyState::Ready]) {
            warn!("Failed to notify systemd: {e:#}");
        }
        info!("Starting restful server");
        server.await.context("run server")?;

        info!("Server stopped by user");
        Ok(())
    }

    pub fn build_app(
        ctx: Arc<RestfulContext>,
        payload_limit: usize,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(Data::new(ctx))
            .app_data(PayloadConfig::new(payload_limit))
            .service(
                web::scope(Self::API_PATH)
                    .route("/{path:.*}", web::get().to(Self::handle_api))
                    .route("/{path:.*}", web::post().to(Self::handle_api))
                    .route("/{path:.*}", web::put().to(Self::handle_api))
                    .route("/{path:.*}", web::delete().to(Self::handle_api)),
            )
            .service(web::resource(Self::HEALTHZ_PATH).route(web::get().to(Self::handle_healthz)))
            .default_service(web::route().to(Self::default_handler))
    }

    async fn handle_api(
        req: HttpRequest,
        body: Bytes,
        ctx: Data<Arc<RestfulContext>>,
    ) -> HttpResponse {
        let path = match Self::parse_path(Self::API_PATH, &req) {
            Some(path) => path,
            None => return Response::bad_request("Resource type is required").into(),
        };
        let body = Self::parse_body(body);

        ctx.api_handler.handle(&path, req, body).await.into()
    }

    async fn handle_healthz(req: HttpRequest, ctx: Data<Arc<RestfulContext>>) -> HttpResponse {
        ctx.healthz_handler.handle("", req, None).await.into()
    }

    async fn default_handler(req: HttpRequest) -> HttpResponse {
        let path = req.uri().path().to_string();
        let method = req.method().as_str().to_string();
        let message = format!("No route to {method} {path}");
        let ret = CommonResponse {
            code: StatusCode::NOT_FOUND.into(),
            message: Some(message),
        };
        HttpResponse::NotFound().json(ret)
    }

    fn parse_path(route: &str, req: &HttpRequest) -> Option<String> {
        let path = req.uri().path().to_string();
        let path = path.strip_prefix(route)?;
        let path = path.trim_matches('/');
        if path.is_empty() {
            return None;
        }

        Some(String::from(path))
    }

    fn parse_body(body: Bytes) -> Option<Vec<u8>> {
        if body.is_empty() {
            return None;
        }
        Some(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use actix_web::test::{self, TestRequest};

    use crate::config::CommonConfig;
    use crate::server::config::ServerConfig;
    use crate::server::factory::ServerFactory;
    use crate::types::response::ResourceResponse;
    use crate::types::task::Task;

    use super::*;

    fn build_context() -> Arc<RestfulContext> {
        let mut cfg = ServerConfig::default();
        cfg.authz.mode = crate::server::authz::config::AuthzMode::Local;
        cfg.db.sqlite.memory = true;
        let factory = ServerFactory::new(cfg).unwrap();
        factory.build_context().unwrap()
    }

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn test_run_future_is_send() {
        let srv = RestfulServer::new("127.0.0.1:0".to_string(), None, build_context(), 64);
        // Commands are Send async traits, so is the future they await
        let fut = srv.run();
        assert_send(&fut);
    }

    #[actix_web::test]
    async fn test_routes() {
        let app = test::init_service(RestfulServer::build_app(build_context(), 64 * 1024)).await;

        let req = TestRequest::get().uri("/healthz").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let req = TestRequest::get().uri("/api/tasks/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let body = to_bytes(resp.into_body()).await.unwrap();
        let resp: ResourceResponse<Vec<Task>> = serde_json::from_slice(&body).unwrap();
        assert_eq!(resp.data.unwrap().len(), 3);

        let req = TestRequest::post()
            .uri("/api/tasks")
            .insert_header(("Authorization", "Bearer user@permit-todo.app"))
            .insert_header(("Content-Type", "application/json"))
            .set_payload(r#"{"title": "Task 4"}"#)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let req = TestRequest::delete()
            .uri("/api/tasks/1")
            .insert_header(("Authorization", "Bearer user@permit-todo.app"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403);

        let req = TestRequest::get().uri("/login").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);

        let req = TestRequest::patch().uri("/api/tasks/1").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn test_payload_limit() {
        let app = test::init_service(RestfulServer::build_app(build_context(), 16)).await;

        let req = TestRequest::post()
            .uri("/api/tasks")
            .insert_header(("Authorization", "Bearer user@permit-todo.app"))
            .set_payload(r#"{"title": "A title longer than the limit"}"#)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 413);
    }
}
