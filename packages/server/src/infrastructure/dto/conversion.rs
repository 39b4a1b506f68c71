//! Conversion logic between DTOs and domain entities.

use sajiki_shared::time::timestamp_to_rfc3339;

use crate::domain::{
    ParticipantInfo, PlaybackState, PlaybackStatus, RoomSnapshot, ValueObjectError,
};
use crate::infrastructure::dto::{http, websocket as ws};

// ========================================
// DTO → Domain
// ========================================

impl TryFrom<ws::PlaybackStateDto> for PlaybackState {
    type Error = ValueObjectError;

    fn try_from(dto: ws::PlaybackStateDto) -> Result<Self, Self::Error> {
        PlaybackState::new(PlaybackStatus::try_from(dto.status)?, dto.time)
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<PlaybackState> for ws::PlaybackStateDto {
    fn from(state: PlaybackState) -> Self {
        Self {
            status: state.status.code(),
            time: state.position_seconds,
        }
    }
}

impl From<&RoomSnapshot> for ws::InitialStateMessage {
    fn from(snapshot: &RoomSnapshot) -> Self {
        Self {
            r#type: ws::MessageType::InitialState,
            room_id: snapshot.id.as_str().to_string(),
            video_id: snapshot.video_id.as_str().to_string(),
            video_title: snapshot.video_title.clone(),
            icebreakers: snapshot.icebreakers.clone(),
            player_state: snapshot.last_playback.into(),
        }
    }
}

impl From<&RoomSnapshot> for ws::RoomInfoUpdateMessage {
    fn from(snapshot: &RoomSnapshot) -> Self {
        Self {
            r#type: ws::MessageType::RoomInfoUpdate,
            payload: ws::RoomInfoDto {
                id: snapshot.id.as_str().to_string(),
                video_id: snapshot.video_id.as_str().to_string(),
                video_title: snapshot.video_title.clone(),
                icebreakers: snapshot.icebreakers.clone(),
                last_state: snapshot.last_playback.into(),
            },
        }
    }
}

impl From<&ParticipantInfo> for http::ParticipantDetailDto {
    fn from(participant: &ParticipantInfo) -> Self {
        Self {
            client_id: participant.id.as_str().to_string(),
            connected_at: timestamp_to_rfc3339(participant.connected_at.value()),
        }
    }
}

impl From<&RoomSnapshot> for http::RoomSummaryDto {
    fn from(snapshot: &RoomSnapshot) -> Self {
        Self {
            id: snapshot.id.as_str().to_string(),
            video_id: snapshot.video_id.as_str().to_string(),
            video_title: snapshot.video_title.clone(),
            participant_count: snapshot.participants.len(),
            created_at: timestamp_to_rfc3339(snapshot.created_at.value()),
        }
    }
}

impl From<&RoomSnapshot> for http::RoomDetailDto {
    fn from(snapshot: &RoomSnapshot) -> Self {
        Self {
            id: snapshot.id.as_str().to_string(),
            video_id: snapshot.video_id.as_str().to_string(),
            video_title: snapshot.video_title.clone(),
            icebreakers: snapshot.icebreakers.clone(),
            last_state: snapshot.last_playback.into(),
            participants: snapshot.participants.iter().map(Into::into).collect(),
            created_at: timestamp_to_rfc3339(snapshot.created_at.value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClientId, RoomId, Timestamp, VideoId};

    fn create_snapshot() -> RoomSnapshot {
        RoomSnapshot {
            id: RoomId::new("r1".to_string()).unwrap(),
            video_id: VideoId::new("dQw4w9WgXcQ".to_string()).unwrap(),
            video_title: "Never Gonna Give You Up".to_string(),
            icebreakers: vec!["Favorite lyric?".to_string()],
            last_playback: PlaybackState::new(PlaybackStatus::Paused, 30.0).unwrap(),
            participants: vec![ParticipantInfo {
                id: ClientId::new("alice".to_string()).unwrap(),
                connected_at: Timestamp::new(1_672_531_200_000),
            }],
            created_at: Timestamp::new(1_672_531_200_000),
        }
    }

    #[test]
    fn test_dto_playback_state_to_domain() {
        // テスト項目: DTO の再生状態がドメインの値オブジェクトに変換される
        // given (前提条件):
        let dto = ws::PlaybackStateDto {
            status: 1,
            time: 12.0,
        };

        // when (操作):
        let state = PlaybackState::try_from(dto).unwrap();

        // then (期待する結果):
        assert_eq!(state.status, PlaybackStatus::Playing);
        assert_eq!(state.position_seconds, 12.0);
    }

    #[test]
    fn test_snapshot_to_initial_state() {
        // テスト項目: スナップショットから initialState が組み立てられる
        // given (前提条件):
        let snapshot = create_snapshot();

        // when (操作):
        let message = ws::InitialStateMessage::from(&snapshot);

        // then (期待する結果):
        assert_eq!(message.r#type, ws::MessageType::InitialState);
        assert_eq!(message.video_id, "dQw4w9WgXcQ");
        assert_eq!(message.player_state.status, 2);
        assert_eq!(message.player_state.time, 30.0);
    }

    #[test]
    fn test_snapshot_to_room_info_update() {
        // テスト項目: スナップショットから roomInfoUpdate が組み立てられる
        // given (前提条件):
        let snapshot = create_snapshot();

        // when (操作):
        let message = ws::RoomInfoUpdateMessage::from(&snapshot);
        let json = serde_json::to_value(&message).unwrap();

        // then (期待する結果):
        assert_eq!(json["type"], "roomInfoUpdate");
        assert_eq!(json["payload"]["videoTitle"], "Never Gonna Give You Up");
        assert_eq!(json["payload"]["icebreakers"][0], "Favorite lyric?");
        assert_eq!(json["payload"]["lastState"]["status"], 2);
    }

    #[test]
    fn test_snapshot_to_room_detail() {
        // テスト項目: スナップショットから詳細 DTO が組み立てられ、日時は RFC 3339
        // given (前提条件):
        let snapshot = create_snapshot();

        // when (操作):
        let detail = http::RoomDetailDto::from(&snapshot);
        let summary = http::RoomSummaryDto::from(&snapshot);

        // then (期待する結果):
        assert_eq!(detail.participants.len(), 1);
        assert_eq!(detail.participants[0].client_id, "alice");
        assert!(detail.created_at.starts_with("2023-01-01T00:00:00"));
        assert_eq!(summary.participant_count, 1);
    }
}
