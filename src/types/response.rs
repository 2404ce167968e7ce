use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// MIME type for JSON content
pub const MIME_JSON: &str = "application/json";

/// Common response structure for all API calls that don't return data.
///
/// A successful response has code 200 and no message.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommonResponse {
    /// HTTP status code indicating the result of the operation
    pub code: u16,

    /// Error details when the operation fails
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Generic response structure for API calls that return data.
#[derive(Debug, Serialize, Deserialize)]
#[serde(bound = "T: Serialize + DeserializeOwned")]
pub struct ResourceResponse<T: Serialize + DeserializeOwned> {
    pub code: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    pub data: Option<T>,
}
