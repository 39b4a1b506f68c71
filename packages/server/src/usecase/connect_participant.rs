//! UseCase: 参加者接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::execute() メソッド
//! - 参加者の Hub への登録と、初期状態の受信
//!
//! ### なぜこのテストが必要か
//! - 存在しない Room への参加が拒否されることを保証
//! - 後から参加した人が現在の再生状態をすぐに受け取れることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：既存の Room への参加
//! - 異常系：存在しない Room への参加
//! - エッジケース：Hub が停止している

use std::sync::Arc;

use sajiki_shared::time::Clock;

use crate::domain::{
    ClientId, MessagePusher, Participant, PusherChannel, RoomId, RoomRepository, Timestamp,
};

use super::error::ConnectError;

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// 接続時刻の取得
    clock: Arc<dyn Clock>,
}

impl ConnectParticipantUseCase {
    /// 新しい ConnectParticipantUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
        }
    }

    /// Room が参加可能（存在する）か
    pub async fn room_exists(&self, room_id: &RoomId) -> bool {
        self.repository.find(room_id).await.is_some()
    }

    /// 参加者接続を実行
    ///
    /// # Arguments
    ///
    /// * `room_id` - 参加する Room の ID
    /// * `client_id` - 接続ごとに採番したクライアント ID
    /// * `sender` - クライアントの送信キュー（登録が処理されると初期状態が届く）
    ///
    /// # Returns
    ///
    /// * `Ok(Timestamp)` - 登録を Hub に投入した（接続時刻を返す）
    /// * `Err(ConnectError)` - Room が存在しない、または Hub が停止している
    pub async fn execute(
        &self,
        room_id: RoomId,
        client_id: ClientId,
        sender: PusherChannel,
    ) -> Result<Timestamp, ConnectError> {
        // 1. Room の存在確認
        if !self.room_exists(&room_id).await {
            return Err(ConnectError::RoomNotFound(room_id.into_string()));
        }

        // 2. Hub に登録を投入（Room が直後に削除された場合は Hub が送信キューを閉じる）
        let connected_at = Timestamp::new(self.clock.now_millis());
        let participant = Participant::new(client_id, room_id, connected_at, sender);
        self.message_pusher
            .register(participant)
            .await
            .map_err(|_| ConnectError::HubUnavailable)?;

        Ok(connected_at)
    }
}
