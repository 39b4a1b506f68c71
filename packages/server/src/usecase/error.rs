//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::{RepositoryError, ValueObjectError};

/// Room 作成のエラー
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CreateRoomError {
    /// URL から動画 ID を解決できない
    #[error("could not resolve a YouTube video from '{0}'")]
    UnresolvableVideo(String),

    /// URL も動画 ID も指定されていない
    #[error("either 'url' or 'videoId' is required")]
    MissingVideoReference,

    #[error(transparent)]
    InvalidId(#[from] ValueObjectError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// 参加者接続のエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectError {
    #[error("room '{0}' not found")]
    RoomNotFound(String),

    #[error("hub is not running")]
    HubUnavailable,
}

/// Room 詳細取得のエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GetRoomDetailError {
    #[error("room '{0}' not found")]
    RoomNotFound(String),
}
