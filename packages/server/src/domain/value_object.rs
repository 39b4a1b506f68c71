//! 値オブジェクト
//!
//! 生成時に検証を行い、不正な値がドメイン層に入り込まないようにします。

use std::fmt;

use uuid::Uuid;

use super::error::ValueObjectError;

const MAX_ID_LENGTH: usize = 64;

/// ID として許可する文字（URL パスにそのまま載せられるもの）
fn is_valid_id(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_ID_LENGTH
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

// ========================================
// RoomId
// ========================================

/// Room の識別子
///
/// 生存中の Room の間で一意。生成後は不変。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if is_valid_id(&value) {
            Ok(Self(value))
        } else {
            Err(ValueObjectError::InvalidRoomId(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// RoomId の採番
pub struct RoomIdFactory;

impl RoomIdFactory {
    /// UUID v4（ハイフンなし）で新しい RoomId を採番
    pub fn generate() -> RoomId {
        RoomId(Uuid::new_v4().simple().to_string())
    }
}

// ========================================
// VideoId
// ========================================

/// 視聴対象の動画 ID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if is_valid_id(&value) {
            Ok(Self(value))
        } else {
            Err(ValueObjectError::InvalidVideoId(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for VideoId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ========================================
// ClientId
// ========================================

/// 接続（Connection Adapter）ごとの識別子
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if is_valid_id(&value) {
            Ok(Self(value))
        } else {
            Err(ValueObjectError::InvalidClientId(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ClientId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ClientId の採番（接続ごとにサーバー側で発行）
pub struct ClientIdFactory;

impl ClientIdFactory {
    pub fn generate() -> ClientId {
        ClientId(Uuid::new_v4().simple().to_string())
    }
}

// ========================================
// Timestamp
// ========================================

/// Unix タイムスタンプ（ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

// ========================================
// PlaybackState
// ========================================

/// プレイヤーの再生ステータス
///
/// 数値は YouTube IFrame Player API の状態コードに合わせています。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    /// まだ再生イベントを一度も受け取っていない
    #[default]
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
}

impl PlaybackStatus {
    pub fn code(self) -> i64 {
        match self {
            Self::Unstarted => -1,
            Self::Ended => 0,
            Self::Playing => 1,
            Self::Paused => 2,
            Self::Buffering => 3,
            Self::Cued => 5,
        }
    }
}

impl TryFrom<i64> for PlaybackStatus {
    type Error = ValueObjectError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            -1 => Ok(Self::Unstarted),
            0 => Ok(Self::Ended),
            1 => Ok(Self::Playing),
            2 => Ok(Self::Paused),
            3 => Ok(Self::Buffering),
            5 => Ok(Self::Cued),
            other => Err(ValueObjectError::UnknownPlaybackStatus(other)),
        }
    }
}

/// 最後に受け取った再生状態（後勝ち）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlaybackState {
    pub status: PlaybackStatus,
    pub position_seconds: f64,
}

impl PlaybackState {
    pub fn new(status: PlaybackStatus, position_seconds: f64) -> Result<Self, ValueObjectError> {
        if !position_seconds.is_finite() || position_seconds < 0.0 {
            return Err(ValueObjectError::InvalidPosition(position_seconds));
        }
        Ok(Self {
            status,
            position_seconds,
        })
    }

    /// 一度でも再生イベントを受け取ったか
    pub fn is_started(&self) -> bool {
        self.status != PlaybackStatus::Unstarted
    }
}
