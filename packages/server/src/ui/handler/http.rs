//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    domain::RoomId,
    infrastructure::dto::http::{
        CreateRoomRequest, CreateRoomResponse, ErrorResponse, RoomDetailDto, RoomSummaryDto,
    },
    ui::state::AppState,
    usecase::{CreateRoomError, GetRoomDetailError, VideoReference},
};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse::new(message)))
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Create a room for a YouTube video
///
/// Returns as soon as the room is stored; title and icebreakers follow via
/// `roomInfoUpdate` on connected sockets.
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateRoomRequest>, JsonRejection>,
) -> Result<Json<CreateRoomResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        tracing::warn!("Invalid create room request: {}", e);
        api_error(StatusCode::BAD_REQUEST, "Invalid request body")
    })?;

    let result =
        match VideoReference::from_parts(request.url, request.video_id, request.video_title) {
            Ok(reference) => state.create_room_usecase.execute(reference).await,
            Err(e) => Err(e),
        };

    match result {
        Ok(room_id) => Ok(Json(CreateRoomResponse {
            room_id: room_id.into_string(),
        })),
        Err(e @ CreateRoomError::Repository(_)) => {
            tracing::error!("Failed to store room: {}", e);
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create room",
            ))
        }
        Err(e) => {
            tracing::warn!("Rejected create room request: {}", e);
            Err(api_error(
                StatusCode::BAD_REQUEST,
                "Invalid or unsupported YouTube URL",
            ))
        }
    }
}

/// Get list of rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.get_rooms_usecase.execute().await;
    Json(rooms.iter().map(RoomSummaryDto::from).collect())
}

/// Get room detail
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, ApiError> {
    let not_found = |room_id: &str| {
        api_error(
            StatusCode::NOT_FOUND,
            format!("Room '{}' not found", room_id),
        )
    };

    let Ok(room_id) = RoomId::new(room_id.clone()) else {
        return Err(not_found(&room_id));
    };

    match state.get_room_detail_usecase.execute(&room_id).await {
        Ok(snapshot) => Ok(Json(RoomDetailDto::from(&snapshot))),
        Err(GetRoomDetailError::RoomNotFound(id)) => Err(not_found(&id)),
    }
}
