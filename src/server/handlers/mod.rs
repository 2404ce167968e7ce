pub mod api;
pub mod healthz;

use actix_web::HttpRequest;
use async_trait::async_trait;

use super::response::Response;

/// Handles the requests routed to one url prefix. `path` is the part of the
/// url after the prefix, with surrounding slashes trimmed.
#[async_trait(?Send)]
pub trait Handler {
    async fn handle(&self, path: &str, req: HttpRequest, body: Option<Vec<u8>>) -> Response;
}
