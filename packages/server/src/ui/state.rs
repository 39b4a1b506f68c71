//! Server state shared by all handlers.

use std::{sync::Arc, time::Duration};

use crate::usecase::{
    ConnectParticipantUseCase, CreateRoomUseCase, DisconnectParticipantUseCase,
    GetRoomDetailUseCase, GetRoomsUseCase, RelayEventUseCase,
};

/// Per-connection settings for the WebSocket adapter
#[derive(Debug, Clone, Copy)]
pub struct ConnectionSettings {
    /// Bound of the participant's outbound queue
    pub outbound_capacity: usize,
    /// Keep-alive ping period
    pub ping_interval: Option<Duration>,
    /// Create unknown rooms on join (`?v=<videoId>` required)
    pub create_on_join: bool,
}

/// Shared application state
pub struct AppState {
    /// CreateRoomUseCase（Room 作成のユースケース）
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    /// ConnectParticipantUseCase（参加者接続のユースケース）
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    /// DisconnectParticipantUseCase（参加者切断のユースケース）
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    /// RelayEventUseCase（受信イベント中継のユースケース）
    pub relay_event_usecase: Arc<RelayEventUseCase>,
    /// GetRoomsUseCase（Room 一覧取得のユースケース）
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    /// GetRoomDetailUseCase（Room 詳細取得のユースケース）
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    /// WebSocket 接続の設定
    pub connection: ConnectionSettings,
}
