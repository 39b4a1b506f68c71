//! UseCase: 受信イベントの中継処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RelayEventUseCase::execute() メソッド
//! - 再生状態の Room への反映と、送信者を除く参加者への中継
//!
//! ### なぜこのテストが必要か
//! - イベントが送信者に戻らないことを保証
//! - 壊れた再生状態が Room を書き換えずに中継だけされることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：playerState の反映と中継
//! - 異常系：壊れた payload、JSON でないテキスト
//! - エッジケース：playerState 以外の種別（チャットなど）

use std::sync::Arc;

use crate::{
    domain::{ClientId, MessagePushError, MessagePusher, RoomId, RoomRepository},
    infrastructure::dto::websocket::InboundEvent,
};

/// 受信イベント中継のユースケース
pub struct RelayEventUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl RelayEventUseCase {
    /// 新しい RelayEventUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 受信イベントの中継を実行
    ///
    /// # Arguments
    ///
    /// * `room_id` - 送信者が参加している Room の ID
    /// * `sender` - 送信者のクライアント ID（中継先から除外される）
    /// * `text` - 受信したテキストフレーム（そのまま中継する）
    ///
    /// # Returns
    ///
    /// * `Ok(InboundEvent)` - 解釈したイベント
    /// * `Err(MessagePushError)` - Hub が停止している
    pub async fn execute(
        &self,
        room_id: RoomId,
        sender: ClientId,
        text: String,
    ) -> Result<InboundEvent, MessagePushError> {
        // 1. 再生状態なら Room に反映してから中継する
        let event = InboundEvent::decode(&text);
        if let InboundEvent::Playback(playback) = &event {
            match self.repository.find(&room_id).await {
                Some(room) => room.update_playback(*playback).await,
                None => tracing::debug!("Room '{}' is gone, playback not stored", room_id),
            }
        }

        // 2. 送信者を除く参加者へ中継
        tracing::debug!("Relaying {:?} from '{}' in room '{}'", event, sender, room_id);
        self.message_pusher
            .broadcast(room_id, Some(sender), text)
            .await?;

        Ok(event)
    }
}
