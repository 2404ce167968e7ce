//! Client side of the external policy decision point (PDP).
//!
//! The PDP is a black box: the server describes who wants to do what on which
//! resource, and the PDP answers allow or deny. The wire format follows the
//! `POST /allowed` endpoint of the Permit.io PDP.

pub mod client;
pub mod config;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Anything that can answer an authorization question. Implemented by the
/// HTTP [`client::PdpClient`], and by fakes in tests.
#[async_trait]
pub trait Decider: Send + Sync {
    async fn check(&self, req: &DecisionRequest) -> Result<bool, PdpError>;
}

#[derive(Debug, Error)]
pub enum PdpError {
    #[error("request policy decision point: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("policy decision point returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("decode policy decision point response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub user: DecisionUser,
    pub action: String,
    pub resource: DecisionResource,
    #[serde(default)]
    pub context: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionUser {
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResource {
    #[serde(rename = "type")]
    pub kind: String,
    pub tenant: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionResponse {
    pub allow: bool,
}

impl DecisionRequest {
    pub fn new(
        user: &str,
        action: &str,
        kind: &str,
        tenant: &str,
        attributes: Map<String, Value>,
    ) -> Self {
        Self {
            user: DecisionUser {
                key: user.to_string(),
            },
            action: action.to_string(),
            resource: DecisionResource {
                kind: kind.to_string(),
                tenant: tenant.to_string(),
                attributes,
            },
            context: Map::new(),
        }
    }
}
