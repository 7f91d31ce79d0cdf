//! Wire DTOs for the auth and notification endpoints.

use serde::{Deserialize, Serialize};

/// Notification kind counted separately for the invitations badge.
pub const TEAM_INVITATION: &str = "team_invitation";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub jwt_token: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// A user notification. Fields beyond `type` and `isRead` are kept verbatim
/// for the views.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(rename = "isRead", default)]
    pub is_read: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Body of `POST /api/tournaments/:id/reviews`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReviewInput {
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Page selection for list endpoints. A zero field is left out of the query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Paging {
    pub page: u32,
    pub limit: u32,
}

impl Default for Paging {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}
