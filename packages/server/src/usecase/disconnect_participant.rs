//! UseCase: 参加者切断処理

use std::sync::Arc;

use crate::domain::{ClientId, MessagePushError, MessagePusher, RoomId};

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// 参加者切断を実行
    ///
    /// 同じ参加者に対して複数回呼ばれても 2 回目以降は何も起きません。
    /// 最後の参加者が抜けると Room の回収タイマーが始まります。
    pub async fn execute(
        &self,
        room_id: RoomId,
        client_id: ClientId,
    ) -> Result<(), MessagePushError> {
        self.message_pusher.unregister(room_id, client_id).await
    }
}
