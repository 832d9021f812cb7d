//! Public types for the auth API
use serde::{Deserialize, Serialize};

/// Login body sent by the web tier. Device fields are accepted and ignored.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub device_category: Option<String>,
    pub device_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminData {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub status: bool,
    pub message: String,
    pub access_token: String,
    pub refresh_token: String,
    pub data: AdminData,
}

#[derive(Debug, Default, Deserialize)]
pub struct ValidateTokensRequest {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateTokensResponse {
    pub status: bool,
    pub access_token: String,
    pub refresh_token: String,
}
