//! UseCase: Room 作成処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - CreateRoomUseCase::execute() / ensure_room() メソッド
//! - 動画の指定方法（URL / 動画 ID）の解決と Room の登録
//!
//! ### なぜこのテストが必要か
//! - 作成が外部連携の完了を待たずに返ることを保証
//! - 解決できない動画指定が Room を作らずにエラーになることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：URL からの作成、動画 ID とタイトルからの作成
//! - 異常系：解決できない URL、動画指定なし
//! - エッジケース：参加時作成で既存の Room を再利用する

use std::sync::Arc;

use sajiki_shared::time::Clock;

use crate::{
    domain::{RepositoryError, Room, RoomId, RoomIdFactory, RoomRepository, Timestamp, VideoId},
    infrastructure::external::parse_video_id,
};

use super::{enrich_room::EnrichRoomUseCase, error::CreateRoomError};

/// 作成する Room の動画の指定
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoReference {
    /// YouTube の URL
    Url(String),
    /// 動画 ID（クライアントが既にタイトルを知っていれば併せて指定）
    Id {
        video_id: String,
        video_title: Option<String>,
    },
}

impl VideoReference {
    /// リクエストの各フィールドから組み立てる（空文字は未指定扱い、`url` 優先）
    pub fn from_parts(
        url: Option<String>,
        video_id: Option<String>,
        video_title: Option<String>,
    ) -> Result<Self, CreateRoomError> {
        let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        match (present(url), present(video_id)) {
            (Some(url), _) => Ok(Self::Url(url)),
            (None, Some(video_id)) => Ok(Self::Id {
                video_id,
                video_title: present(video_title),
            }),
            (None, None) => Err(CreateRoomError::MissingVideoReference),
        }
    }
}

/// Room 作成のユースケース
pub struct CreateRoomUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// 作成後に起動する補完処理
    enrich_room: Arc<EnrichRoomUseCase>,
    /// 作成日時の取得
    clock: Arc<dyn Clock>,
}

impl CreateRoomUseCase {
    /// 新しい CreateRoomUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        enrich_room: Arc<EnrichRoomUseCase>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            enrich_room,
            clock,
        }
    }

    /// Room 作成を実行
    ///
    /// Room を登録した時点で ID を返します。タイトルとアイスブレイクの補完は
    /// バックグラウンドで行われ、完了すると参加者に `roomInfoUpdate` が届きます。
    ///
    /// # Returns
    ///
    /// * `Ok(RoomId)` - 作成された Room の ID
    /// * `Err(CreateRoomError)` - 動画指定が解決できない
    pub async fn execute(&self, reference: VideoReference) -> Result<RoomId, CreateRoomError> {
        // 1. 動画指定を解決
        let (video_id, video_title) = resolve(reference)?;

        // 2. Room を登録
        let room = Room::new(
            RoomIdFactory::generate(),
            video_id.clone(),
            video_title.clone(),
            self.now(),
        );
        let room = self.repository.insert(room).await?;
        tracing::info!(
            "Room '{}' created for video '{}'. Total rooms: {}",
            room.id,
            video_id,
            self.repository.count().await
        );

        // 3. 補完処理を起動（完了は待たない）
        self.enrich_room
            .spawn(room.id.clone(), video_id, video_title);

        Ok(room.id.clone())
    }

    /// 参加時作成: 指定 ID の Room がなければ作成し、あればそれを返す
    pub async fn ensure_room(
        &self,
        room_id: RoomId,
        video_id: VideoId,
    ) -> Result<Arc<Room>, CreateRoomError> {
        if let Some(room) = self.repository.find(&room_id).await {
            return Ok(room);
        }

        let room = Room::new(room_id.clone(), video_id.clone(), None, self.now());
        match self.repository.insert(room).await {
            Ok(room) => {
                tracing::info!(
                    "Room '{}' created on join for video '{}'",
                    room.id,
                    video_id
                );
                self.enrich_room.spawn(room.id.clone(), video_id, None);
                Ok(room)
            }
            // 同時に作成された場合は先に登録された方を使う
            Err(RepositoryError::RoomAlreadyExists(_)) => self
                .repository
                .find(&room_id)
                .await
                .ok_or_else(|| RepositoryError::RoomNotFound(room_id.into_string()).into()),
            Err(e) => Err(e.into()),
        }
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }
}

/// 動画指定を動画 ID と（あれば）タイトルに解決する
fn resolve(reference: VideoReference) -> Result<(VideoId, Option<String>), CreateRoomError> {
    match reference {
        VideoReference::Url(url) => match parse_video_id(&url) {
            Some(video_id) => Ok((video_id, None)),
            None => Err(CreateRoomError::UnresolvableVideo(url)),
        },
        VideoReference::Id {
            video_id,
            video_title,
        } => Ok((VideoId::new(video_id)?, video_title)),
    }
}
