//! ドメイン層のエラー型

use thiserror::Error;

/// 値オブジェクトの生成・検証エラー
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValueObjectError {
    #[error("invalid room id: '{0}'")]
    InvalidRoomId(String),

    #[error("invalid video id: '{0}'")]
    InvalidVideoId(String),

    #[error("invalid client id: '{0}'")]
    InvalidClientId(String),

    #[error("unknown playback status code: {0}")]
    UnknownPlaybackStatus(i64),

    #[error("invalid playback position: {0}")]
    InvalidPosition(f64),
}

/// Room エンティティの操作エラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoomError {
    /// 動画情報の補完は Room ごとに一度だけ
    #[error("room '{0}' has already been enriched")]
    AlreadyEnriched(String),
}

/// Repository のエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("room '{0}' already exists")]
    RoomAlreadyExists(String),

    #[error("room '{0}' not found")]
    RoomNotFound(String),
}

/// MessagePusher（Hub）への投入エラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MessagePushError {
    /// Hub のイベントループが停止している
    #[error("hub is not running")]
    HubUnavailable,
}

/// 外部連携（タイトル取得・アイスブレイク生成）のエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EnrichmentError {
    #[error("API key is not configured")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected status: {0}")]
    Status(u16),

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("response contained no usable content")]
    EmptyResponse,
}
