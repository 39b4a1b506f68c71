//! WebSocket message DTOs.
//!
//! Field names follow the browser client (`camelCase`, `videoID` in the
//! initial state message).

use serde::{Deserialize, Serialize};

use crate::domain::PlaybackState;

/// Message type discriminator (`"type"` field)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum MessageType {
    /// Full room snapshot, sent once per join
    InitialState,
    /// Playback position/status update
    PlayerState,
    /// Title and icebreakers resolved after room creation
    RoomInfoUpdate,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InitialState => "initialState",
            Self::PlayerState => "playerState",
            Self::RoomInfoUpdate => "roomInfoUpdate",
        }
    }
}

/// Wire form of the playback state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PlaybackStateDto {
    pub status: i64,
    pub time: f64,
}

/// Inbound envelope: `{"type": string, "payload": any}`
#[derive(Debug, Clone, Deserialize)]
pub struct InboundEnvelope {
    pub r#type: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Initial state sent to a participant right after joining
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InitialStateMessage {
    pub r#type: MessageType,
    pub room_id: String,
    #[serde(rename = "videoID")]
    pub video_id: String,
    pub video_title: String,
    pub icebreakers: Vec<String>,
    pub player_state: PlaybackStateDto,
}

/// Room information carried by `roomInfoUpdate`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoomInfoDto {
    pub id: String,
    pub video_id: String,
    pub video_title: String,
    pub icebreakers: Vec<String>,
    pub last_state: PlaybackStateDto,
}

/// Sent to every participant once enrichment completes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomInfoUpdateMessage {
    pub r#type: MessageType,
    pub payload: RoomInfoDto,
}

/// Decoded inbound event
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// `playerState` with a payload that decoded into a valid playback state
    Playback(PlaybackState),
    /// Anything else. Relayed verbatim without touching room state.
    Relay { kind: Option<String> },
}

impl InboundEvent {
    /// Classify an inbound text frame.
    ///
    /// Never fails: undecodable frames degrade to [`InboundEvent::Relay`].
    pub fn decode(text: &str) -> Self {
        let envelope = match serde_json::from_str::<InboundEnvelope>(text) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::debug!("Inbound frame is not an event envelope: {}", e);
                return Self::Relay { kind: None };
            }
        };

        if envelope.r#type != MessageType::PlayerState.as_str() {
            return Self::Relay {
                kind: Some(envelope.r#type),
            };
        }

        let playback = serde_json::from_value::<PlaybackStateDto>(envelope.payload)
            .map_err(|e| e.to_string())
            .and_then(|dto| PlaybackState::try_from(dto).map_err(|e| e.to_string()));

        match playback {
            Ok(playback) => Self::Playback(playback),
            Err(e) => {
                tracing::warn!("Malformed playerState payload, relaying only: {}", e);
                Self::Relay {
                    kind: Some(envelope.r#type),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PlaybackStatus;

    #[test]
    fn test_decode_player_state() {
        // テスト項目: playerState は再生状態として解釈される
        // given (前提条件):
        let text = r#"{"type":"playerState","payload":{"status":1,"time":42.5}}"#;

        // when (操作):
        let event = InboundEvent::decode(text);

        // then (期待する結果):
        assert_eq!(
            event,
            InboundEvent::Playback(PlaybackState::new(PlaybackStatus::Playing, 42.5).unwrap())
        );
    }

    #[test]
    fn test_decode_player_state_with_integer_time() {
        // テスト項目: time が整数でも再生状態として解釈される
        // given (前提条件):
        let text = r#"{"type":"playerState","payload":{"status":2,"time":7}}"#;

        // when (操作):
        let event = InboundEvent::decode(text);

        // then (期待する結果):
        assert_eq!(
            event,
            InboundEvent::Playback(PlaybackState::new(PlaybackStatus::Paused, 7.0).unwrap())
        );
    }

    #[test]
    fn test_decode_malformed_player_state_degrades_to_relay() {
        // テスト項目: 壊れた playerState は状態更新せずに中継のみ
        // given (前提条件):
        let missing_time = r#"{"type":"playerState","payload":{"status":1}}"#;
        let unknown_status = r#"{"type":"playerState","payload":{"status":9,"time":1.0}}"#;

        // when (操作) / then (期待する結果):
        for text in [missing_time, unknown_status] {
            assert_eq!(
                InboundEvent::decode(text),
                InboundEvent::Relay {
                    kind: Some("playerState".to_string())
                }
            );
        }
    }

    #[test]
    fn test_decode_other_types_are_relayed() {
        // テスト項目: playerState 以外の type はそのまま中継される
        // given (前提条件):
        let text = r#"{"type":"chatMessage","payload":{"nickname":"a","message":"hi"}}"#;

        // when (操作):
        let event = InboundEvent::decode(text);

        // then (期待する結果):
        assert_eq!(
            event,
            InboundEvent::Relay {
                kind: Some("chatMessage".to_string())
            }
        );
    }

    #[test]
    fn test_decode_non_json_is_relayed() {
        // テスト項目: JSON でないテキストも落とさずに中継扱いになる
        // given (前提条件):
        let text = "hello there";

        // when (操作):
        let event = InboundEvent::decode(text);

        // then (期待する結果):
        assert_eq!(event, InboundEvent::Relay { kind: None });
    }

    #[test]
    fn test_initial_state_wire_format() {
        // テスト項目: initialState がブラウザ側の期待するキー名で出力される
        // given (前提条件):
        let message = InitialStateMessage {
            r#type: MessageType::InitialState,
            room_id: "r1".to_string(),
            video_id: "dQw4w9WgXcQ".to_string(),
            video_title: "Title".to_string(),
            icebreakers: vec!["Q?".to_string()],
            player_state: PlaybackStateDto {
                status: -1,
                time: 0.0,
            },
        };

        // when (操作):
        let json = serde_json::to_value(&message).unwrap();

        // then (期待する結果):
        assert_eq!(json["type"], "initialState");
        assert_eq!(json["roomId"], "r1");
        assert_eq!(json["videoID"], "dQw4w9WgXcQ");
        assert_eq!(json["videoTitle"], "Title");
        assert_eq!(json["playerState"]["status"], -1);
    }
}
