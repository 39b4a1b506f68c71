//! UseCase: Room 詳細取得

use std::sync::Arc;

use crate::domain::{RoomId, RoomRepository, RoomSnapshot};

use super::error::GetRoomDetailError;

/// Room 詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomDetailUseCase {
    /// 新しい GetRoomDetailUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// 指定 Room の現在のスナップショットを返す
    pub async fn execute(&self, room_id: &RoomId) -> Result<RoomSnapshot, GetRoomDetailError> {
        match self.repository.find(room_id).await {
            Some(room) => Ok(room.snapshot().await),
            None => Err(GetRoomDetailError::RoomNotFound(room_id.as_str().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{PlaybackState, PlaybackStatus, Room, Timestamp, VideoId},
        infrastructure::repository::InMemoryRoomRepository,
    };

    #[tokio::test]
    async fn test_get_room_detail() {
        // テスト項目: 存在する Room の詳細（再生状態を含む）が取得できる
        // given (前提条件):
        let repository = Arc::new(InMemoryRoomRepository::new());
        let room_id = RoomId::new("movie-night".to_string()).unwrap();
        let room = repository
            .insert(Room::new(
                room_id.clone(),
                VideoId::new("dQw4w9WgXcQ".to_string()).unwrap(),
                Some("Title".to_string()),
                Timestamp::new(0),
            ))
            .await
            .unwrap();
        let playback = PlaybackState::new(PlaybackStatus::Playing, 3.0).unwrap();
        room.update_playback(playback).await;
        let usecase = GetRoomDetailUseCase::new(repository);

        // when (操作):
        let snapshot = usecase.execute(&room_id).await.unwrap();

        // then (期待する結果):
        assert_eq!(snapshot.video_title, "Title");
        assert_eq!(snapshot.last_playback, playback);
    }

    #[tokio::test]
    async fn test_get_room_detail_not_found() {
        // テスト項目: 存在しない Room はエラーになる
        // given (前提条件):
        let usecase = GetRoomDetailUseCase::new(Arc::new(InMemoryRoomRepository::new()));
        let room_id = RoomId::new("missing".to_string()).unwrap();

        // when (操作):
        let result = usecase.execute(&room_id).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(GetRoomDetailError::RoomNotFound("missing".to_string()))
        );
    }
}
