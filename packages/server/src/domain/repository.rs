//! Repository trait 定義
//!
//! ドメイン層が必要とする Room レジストリへのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use std::sync::Arc;

use async_trait::async_trait;

use super::{entity::Room, error::RepositoryError, value_object::RoomId};

/// Room Repository trait
///
/// 生存中の Room の集合を管理します。Repository から到達できる Room だけが
/// 「生きている」Room で、一度削除された Room が復活することはありません。
///
/// 実装はマップへのアクセスの間だけ自身のロックを保持し、
/// ファンアウト中や外部呼び出し中には保持しません。
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Room を登録する（同じ ID の Room が既にあればエラー）
    async fn insert(&self, room: Room) -> Result<Arc<Room>, RepositoryError>;

    /// Room を取得する
    async fn find(&self, room_id: &RoomId) -> Option<Arc<Room>>;

    /// 空室エポック `epoch` から参加者がいないままなら Room を削除する
    ///
    /// 削除した場合は `true` を返します。
    async fn remove_if_reclaimable(&self, room_id: &RoomId, epoch: u64) -> bool;

    /// 全ての Room を取得する（作成日時順）
    async fn list(&self) -> Vec<Arc<Room>>;

    /// 生存中の Room 数
    async fn count(&self) -> usize;
}
