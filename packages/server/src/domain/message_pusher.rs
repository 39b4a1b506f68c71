//! MessagePusher trait 定義
//!
//! 参加者の登録・解除とメッセージのファンアウトを行うポートです。
//! 実装（Hub）は 3 つの操作を単一のイベントループで直列に処理します。
//! 呼び出し側はキューへの投入だけを待ち、処理の完了は待ちません。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{
    entity::Participant,
    error::MessagePushError,
    value_object::{ClientId, RoomId},
};

/// 接続ごとの送信キュー（有界）
///
/// Hub は `try_send` のみを行い、満杯なら参加者を切断します。
pub type PusherChannel = mpsc::Sender<String>;

#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 参加者を Room に登録する
    ///
    /// 登録が処理されると、参加者の送信キューに Room の初期状態が届きます。
    /// Room が存在しない場合は参加者を破棄し、送信キューを閉じます。
    async fn register(&self, participant: Participant) -> Result<(), MessagePushError>;

    /// 参加者を Room から解除する（冪等）
    async fn unregister(&self, room_id: RoomId, client_id: ClientId)
    -> Result<(), MessagePushError>;

    /// Room の参加者全員（`sender` を除く）にメッセージを送る
    async fn broadcast(
        &self,
        room_id: RoomId,
        sender: Option<ClientId>,
        payload: String,
    ) -> Result<(), MessagePushError>;
}
