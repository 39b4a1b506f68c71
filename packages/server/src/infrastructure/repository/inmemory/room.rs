//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! HashMap をインメモリのレジストリとして使用します（プロセス再起動で消える）。
//!
//! ## ロック順序
//!
//! レジストリのロック → Room のロック の順でのみ取得します。
//! Room のロックを保持したままレジストリのロックを取る経路はありません。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{RepositoryError, Room, RoomId, RoomRepository};

/// インメモリ Room Repository 実装
#[derive(Default)]
pub struct InMemoryRoomRepository {
    /// RoomId → Room
    rooms: RwLock<HashMap<RoomId, Arc<Room>>>,
}

impl InMemoryRoomRepository {
    /// 空の InMemoryRoomRepository を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn insert(&self, room: Room) -> Result<Arc<Room>, RepositoryError> {
        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(&room.id) {
            return Err(RepositoryError::RoomAlreadyExists(
                room.id.as_str().to_string(),
            ));
        }
        let room = Arc::new(room);
        rooms.insert(room.id.clone(), room.clone());
        Ok(room)
    }

    async fn find(&self, room_id: &RoomId) -> Option<Arc<Room>> {
        self.rooms.read().await.get(room_id).cloned()
    }

    async fn remove_if_reclaimable(&self, room_id: &RoomId, epoch: u64) -> bool {
        let mut rooms = self.rooms.write().await;
        let reclaimable = match rooms.get(room_id) {
            Some(room) => room.is_reclaimable(epoch).await,
            None => false,
        };
        if reclaimable {
            rooms.remove(room_id);
        }
        reclaimable
    }

    async fn list(&self) -> Vec<Arc<Room>> {
        let mut rooms: Vec<Arc<Room>> = self.rooms.read().await.values().cloned().collect();
        rooms.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        rooms
    }

    async fn count(&self) -> usize {
        self.rooms.read().await.len()
    }
}
