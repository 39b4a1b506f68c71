//! HTTP API request/response DTOs.

use serde::{Deserialize, Serialize};

use super::websocket::PlaybackStateDto;

/// `POST /create` request body
///
/// Either `url` (resolved to a video id) or `videoId` (with an optional
/// `videoTitle`) must be present. `url` wins when both are given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub video_title: Option<String>,
}

/// `POST /create` response body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    pub room_id: String,
}

/// Error body: `{"error": "..."}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Room summary for list API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryDto {
    pub id: String,
    pub video_id: String,
    pub video_title: String,
    pub participant_count: usize,
    /// RFC 3339
    pub created_at: String,
}

/// Participant detail for room detail API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDetailDto {
    pub client_id: String,
    /// RFC 3339
    pub connected_at: String,
}

/// Room detail for room detail API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetailDto {
    pub id: String,
    pub video_id: String,
    pub video_title: String,
    pub icebreakers: Vec<String>,
    pub last_state: PlaybackStateDto,
    pub participants: Vec<ParticipantDetailDto>,
    /// RFC 3339
    pub created_at: String,
}
