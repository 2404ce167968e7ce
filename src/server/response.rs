use actix_web::http::StatusCode;
use actix_web::{HttpResponse, HttpResponseBuilder};
use serde::{de::DeserializeOwned, Serialize};

use crate::types::response::{CommonResponse, ResourceResponse};

/// Internal failures, reported to the caller as 500 without details. The
/// cause is only logged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Failure {
    Authn,
    Authz,
    Database,
}

impl Failure {
    fn message(self) -> &'static str {
        match self {
            Failure::Authn => "Authentication failed",
            Failure::Authz => "Authorization failed",
            Failure::Database => "Database error",
        }
    }
}

/// Handler result, converted into the `{code, message, data}` envelope.
pub struct Response {
    http_response: HttpResponse,
}

impl Response {
    pub fn json<T: Serialize + DeserializeOwned>(data: T) -> Self {
        let resp = ResourceResponse::<T> {
            code: StatusCode::OK.into(),
            message: None,
            data: Some(data),
        };
        Self {
            http_response: HttpResponse::Ok().json(resp),
        }
    }

    pub fn bad_request(message: impl AsRef<str>) -> Self {
        Self::envelope(
            StatusCode::BAD_REQUEST,
            format!("Bad request: {}", message.as_ref()),
        )
    }

    /// 401, the caller has no (valid) identity.
    pub fn unauthenticated(message: &str) -> Self {
        Self::envelope(StatusCode::UNAUTHORIZED, format!("Unauthenticated: {message}"))
    }

    /// 403, the policy denied the action.
    pub fn denied() -> Self {
        Self::envelope(
            StatusCode::FORBIDDEN,
            String::from("Unauthorized: Not authorized"),
        )
    }

    pub fn not_found() -> Self {
        Self::envelope(StatusCode::NOT_FOUND, String::from("Resource not found"))
    }

    pub fn method_not_allowed() -> Self {
        Self::envelope(
            StatusCode::METHOD_NOT_ALLOWED,
            String::from("Method not allowed"),
        )
    }

    pub fn failure(failure: Failure) -> Self {
        Self::envelope(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Server error: {}", failure.message()),
        )
    }

    pub fn is_denied(&self) -> bool {
        self.http_response.status() == StatusCode::FORBIDDEN
    }

    fn envelope(status: StatusCode, message: String) -> Self {
        let resp = CommonResponse {
            code: status.into(),
            message: Some(message),
        };
        Self {
            http_response: HttpResponseBuilder::new(status).json(resp),
        }
    }
}

impl From<Response> for HttpResponse {
    fn from(val: Response) -> Self {
        val.http_response
    }
}
