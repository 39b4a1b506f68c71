//! UseCase: Room 一覧取得

use std::sync::Arc;

use crate::domain::{RoomRepository, RoomSnapshot};

/// Room 一覧取得のユースケース
pub struct GetRoomsUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomsUseCase {
    /// 新しい GetRoomsUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// 生存中の全 Room のスナップショットを作成日時順に返す
    pub async fn execute(&self) -> Vec<RoomSnapshot> {
        let rooms = self.repository.list().await;
        let mut snapshots = Vec::with_capacity(rooms.len());
        for room in rooms {
            snapshots.push(room.snapshot().await);
        }
        snapshots
    }
}
