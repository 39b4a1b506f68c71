//! UseCase: Room 情報の補完（動画タイトルとアイスブレイク）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - EnrichRoomUseCase::execute() メソッド
//! - 外部連携の成功・失敗それぞれでの書き込み内容と通知
//!
//! ### なぜこのテストが必要か
//! - 外部連携の失敗が Room 作成や参加をブロックしないことを保証
//! - 書き込みが Room ごとに一度だけであることを保証
//! - 途中で削除された Room への書き込みが何も起こさないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：タイトル取得とアイスブレイク生成が成功
//! - 異常系：タイトル取得の失敗、アイスブレイク生成の失敗
//! - エッジケース：完了前に Room が削除された、二度目の実行

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::{
    domain::{
        FALLBACK_TITLE, MessagePusher, PromptGenerator, RoomError, RoomId, RoomRepository,
        TitleLookup, VideoId, default_icebreakers,
    },
    infrastructure::dto::websocket::RoomInfoUpdateMessage,
};

/// 補完処理の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichOutcome {
    /// Room に書き込み、参加者に通知した
    Applied,
    /// 完了時点で Room が存在しなかった（何もしない）
    RoomGone,
    /// 既に補完済みだった（何もしない）
    AlreadyEnriched,
}

/// Room 情報補完のユースケース
pub struct EnrichRoomUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// 動画タイトルの取得
    title_lookup: Arc<dyn TitleLookup>,
    /// アイスブレイクの生成
    prompt_generator: Arc<dyn PromptGenerator>,
}

impl EnrichRoomUseCase {
    /// 新しい EnrichRoomUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        title_lookup: Arc<dyn TitleLookup>,
        prompt_generator: Arc<dyn PromptGenerator>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            title_lookup,
            prompt_generator,
        }
    }

    /// 補完処理を独立したタスクとして起動
    ///
    /// 呼び出し元（Room 作成）は完了を待ちません。
    pub fn spawn(
        self: &Arc<Self>,
        room_id: RoomId,
        video_id: VideoId,
        fallback_title: Option<String>,
    ) -> JoinHandle<EnrichOutcome> {
        let usecase = Arc::clone(self);
        tokio::spawn(async move { usecase.execute(room_id, video_id, fallback_title).await })
    }

    /// 補完処理を実行
    ///
    /// # Arguments
    ///
    /// * `room_id` - 対象の Room ID
    /// * `video_id` - タイトル取得に使う動画 ID
    /// * `fallback_title` - タイトル取得に失敗したときに使うタイトル（作成時に指定されたもの）
    ///
    /// # Returns
    ///
    /// 書き込みを行ったかどうか。外部連携の失敗は既定値で置き換えるため、エラーにはなりません。
    pub async fn execute(
        &self,
        room_id: RoomId,
        video_id: VideoId,
        fallback_title: Option<String>,
    ) -> EnrichOutcome {
        // 1. 動画タイトルを取得（失敗したらフォールバック）
        let video_title = match self.title_lookup.fetch_title(&video_id).await {
            Ok(title) => title,
            Err(e) => {
                tracing::warn!(
                    "Title lookup for video '{}' failed, using fallback: {}",
                    video_id,
                    e
                );
                fallback_title.unwrap_or_else(|| FALLBACK_TITLE.to_string())
            }
        };

        // 2. アイスブレイクを生成（失敗したら既定セット）
        let icebreakers = match self.prompt_generator.generate_prompts(&video_title).await {
            Ok(prompts) if !prompts.is_empty() => prompts,
            Ok(_) => {
                tracing::warn!("Prompt generation returned nothing, using defaults");
                default_icebreakers()
            }
            Err(e) => {
                tracing::warn!("Prompt generation failed, using defaults: {}", e);
                default_icebreakers()
            }
        };

        // 3. 現在のレジストリから Room を引き直してから書き込む
        let room = match self.repository.find(&room_id).await {
            Some(room) if room.video_id == video_id => room,
            _ => {
                tracing::debug!(
                    "Room '{}' was deleted before enrichment completed",
                    room_id
                );
                return EnrichOutcome::RoomGone;
            }
        };

        let snapshot = match room.apply_enrichment(video_title, icebreakers).await {
            Ok(snapshot) => snapshot,
            Err(RoomError::AlreadyEnriched(_)) => {
                tracing::debug!("Room '{}' is already enriched", room_id);
                return EnrichOutcome::AlreadyEnriched;
            }
        };
        tracing::info!(
            "Room '{}' enriched: '{}' ({} icebreakers)",
            room_id,
            snapshot.video_title,
            snapshot.icebreakers.len()
        );

        // 4. 接続中の参加者全員に通知
        match serde_json::to_string(&RoomInfoUpdateMessage::from(&snapshot)) {
            Ok(json) => {
                if let Err(e) = self.message_pusher.broadcast(room_id, None, json).await {
                    tracing::warn!("Failed to broadcast room info update: {}", e);
                }
            }
            Err(e) => tracing::error!("Failed to serialize room info update: {}", e),
        }

        EnrichOutcome::Applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            ClientIdFactory, EnrichmentError, MockPromptGenerator, MockTitleLookup, Participant,
            PLACEHOLDER_TITLE, Room, RoomIdFactory, Timestamp,
        },
        infrastructure::{
            message_pusher::{Hub, HubConfig},
            repository::InMemoryRoomRepository,
        },
    };
    use tokio::sync::mpsc;

    fn video_id() -> VideoId {
        VideoId::new("dQw4w9WgXcQ".to_string()).unwrap()
    }

    fn title_lookup_ok(title: &'static str) -> MockTitleLookup {
        let mut mock = MockTitleLookup::new();
        mock.expect_fetch_title()
            .times(1)
            .returning(move |_| Ok(title.to_string()));
        mock
    }

    fn title_lookup_err() -> MockTitleLookup {
        let mut mock = MockTitleLookup::new();
        mock.expect_fetch_title()
            .times(1)
            .returning(|_| Err(EnrichmentError::Status(404)));
        mock
    }

    struct Fixture {
        repository: Arc<InMemoryRoomRepository>,
        room: Arc<Room>,
        receiver: mpsc::Receiver<String>,
        usecase: EnrichRoomUseCase,
    }

    /// Room を 1 つ作り、参加者を 1 人登録した状態を用意する
    async fn setup(
        title_lookup: MockTitleLookup,
        prompt_generator: MockPromptGenerator,
        creation_title: Option<String>,
    ) -> Fixture {
        let repository = Arc::new(InMemoryRoomRepository::new());
        let (pusher, _handle) = Hub::spawn(repository.clone(), HubConfig::default());
        let room = repository
            .insert(Room::new(
                RoomIdFactory::generate(),
                video_id(),
                creation_title,
                Timestamp::new(0),
            ))
            .await
            .unwrap();

        let (tx, mut receiver) = mpsc::channel(8);
        pusher
            .register(Participant::new(
                ClientIdFactory::generate(),
                room.id.clone(),
                Timestamp::new(0),
                tx,
            ))
            .await
            .unwrap();
        receiver.recv().await.expect("initial state");

        let usecase = EnrichRoomUseCase::new(
            repository.clone(),
            Arc::new(pusher),
            Arc::new(title_lookup),
            Arc::new(prompt_generator),
        );
        Fixture {
            repository,
            room,
            receiver,
            usecase,
        }
    }

    #[tokio::test]
    async fn test_enrich_writes_title_and_prompts_and_notifies() {
        // テスト項目: 取得したタイトルと生成したアイスブレイクが書き込まれ、参加者に通知される
        // given (前提条件):
        let mut prompt_generator = MockPromptGenerator::new();
        prompt_generator
            .expect_generate_prompts()
            .withf(|title| title == "Never Gonna Give You Up")
            .times(1)
            .returning(|_| Ok(vec!["Q1?".to_string(), "Q2?".to_string()]));
        let mut fixture = setup(
            title_lookup_ok("Never Gonna Give You Up"),
            prompt_generator,
            None,
        )
        .await;

        // when (操作):
        let outcome = fixture
            .usecase
            .execute(fixture.room.id.clone(), video_id(), None)
            .await;

        // then (期待する結果):
        assert_eq!(outcome, EnrichOutcome::Applied);
        let snapshot = fixture.room.snapshot().await;
        assert_eq!(snapshot.video_title, "Never Gonna Give You Up");
        assert_eq!(snapshot.icebreakers, vec!["Q1?", "Q2?"]);

        let update: serde_json::Value =
            serde_json::from_str(&fixture.receiver.recv().await.unwrap()).unwrap();
        assert_eq!(update["type"], "roomInfoUpdate");
        assert_eq!(update["payload"]["videoTitle"], "Never Gonna Give You Up");
        assert_eq!(update["payload"]["icebreakers"][1], "Q2?");
    }

    #[tokio::test]
    async fn test_title_failure_uses_fallback_title() {
        // テスト項目: タイトル取得に失敗しても既定のタイトルで続行する
        // given (前提条件):
        let mut prompt_generator = MockPromptGenerator::new();
        prompt_generator
            .expect_generate_prompts()
            .withf(|title| title == FALLBACK_TITLE)
            .times(1)
            .returning(|_| Ok(vec!["Q?".to_string()]));
        let fixture = setup(title_lookup_err(), prompt_generator, None).await;

        // when (操作):
        let outcome = fixture
            .usecase
            .execute(fixture.room.id.clone(), video_id(), None)
            .await;

        // then (期待する結果):
        assert_eq!(outcome, EnrichOutcome::Applied);
        assert_eq!(fixture.room.snapshot().await.video_title, FALLBACK_TITLE);
    }

    #[tokio::test]
    async fn test_title_failure_keeps_creation_title() {
        // テスト項目: 作成時にタイトルが指定されていれば、取得失敗時はそれを使う
        // given (前提条件):
        let mut prompt_generator = MockPromptGenerator::new();
        prompt_generator
            .expect_generate_prompts()
            .times(1)
            .returning(|_| Ok(vec!["Q?".to_string()]));
        let fixture = setup(
            title_lookup_err(),
            prompt_generator,
            Some("My Title".to_string()),
        )
        .await;

        // when (操作):
        fixture
            .usecase
            .execute(
                fixture.room.id.clone(),
                video_id(),
                Some("My Title".to_string()),
            )
            .await;

        // then (期待する結果):
        assert_eq!(fixture.room.snapshot().await.video_title, "My Title");
    }

    #[tokio::test]
    async fn test_prompt_failure_uses_default_icebreakers() {
        // テスト項目: アイスブレイク生成に失敗したら既定セットが書き込まれる
        // given (前提条件):
        let mut prompt_generator = MockPromptGenerator::new();
        prompt_generator
            .expect_generate_prompts()
            .times(1)
            .returning(|_| Err(EnrichmentError::MissingApiKey));
        let fixture = setup(title_lookup_ok("Title"), prompt_generator, None).await;

        // when (操作):
        fixture
            .usecase
            .execute(fixture.room.id.clone(), video_id(), None)
            .await;

        // then (期待する結果):
        let snapshot = fixture.room.snapshot().await;
        assert_eq!(snapshot.video_title, "Title");
        assert_eq!(snapshot.icebreakers, default_icebreakers());
    }

    #[tokio::test]
    async fn test_enrichment_applies_at_most_once() {
        // テスト項目: 二度目の実行は Room を書き換えず、通知もしない
        // given (前提条件):
        let mut title_lookup = MockTitleLookup::new();
        let mut calls = 0;
        title_lookup.expect_fetch_title().times(2).returning(move |_| {
            calls += 1;
            Ok(format!("Title {calls}"))
        });
        let mut prompt_generator = MockPromptGenerator::new();
        prompt_generator
            .expect_generate_prompts()
            .times(2)
            .returning(|_| Ok(vec!["Q?".to_string()]));
        let mut fixture = setup(title_lookup, prompt_generator, None).await;
        let room_id = fixture.room.id.clone();

        // when (操作):
        let first = fixture.usecase.execute(room_id.clone(), video_id(), None).await;
        let second = fixture.usecase.execute(room_id, video_id(), None).await;

        // then (期待する結果):
        assert_eq!(first, EnrichOutcome::Applied);
        assert_eq!(second, EnrichOutcome::AlreadyEnriched);
        assert_eq!(fixture.room.snapshot().await.video_title, "Title 1");
        assert!(fixture.receiver.recv().await.is_some());
        assert!(fixture.receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_deleted_room_is_left_untouched() {
        // テスト項目: 完了前に Room が削除されていたら何もしない
        // given (前提条件):
        let mut prompt_generator = MockPromptGenerator::new();
        prompt_generator
            .expect_generate_prompts()
            .times(1)
            .returning(|_| Ok(vec!["Q?".to_string()]));
        let repository = Arc::new(InMemoryRoomRepository::new());
        let (pusher, _handle) = Hub::spawn(repository.clone(), HubConfig::default());
        let usecase = EnrichRoomUseCase::new(
            repository.clone(),
            Arc::new(pusher),
            Arc::new(title_lookup_ok("Title")),
            Arc::new(prompt_generator),
        );

        // when (操作): 登録されていない Room ID で実行
        let outcome = usecase
            .execute(RoomIdFactory::generate(), video_id(), None)
            .await;

        // then (期待する結果):
        assert_eq!(outcome, EnrichOutcome::RoomGone);
        assert_eq!(repository.count().await, 0);
    }

    #[tokio::test]
    async fn test_spawned_enrichment_runs_in_background() {
        // テスト項目: spawn した補完処理は呼び出し元を待たせずに完了する
        // given (前提条件):
        let mut prompt_generator = MockPromptGenerator::new();
        prompt_generator
            .expect_generate_prompts()
            .times(1)
            .returning(|_| Ok(vec!["Q?".to_string()]));
        let fixture = setup(title_lookup_ok("Title"), prompt_generator, None).await;
        assert_eq!(fixture.room.snapshot().await.video_title, PLACEHOLDER_TITLE);
        let usecase = Arc::new(fixture.usecase);

        // when (操作):
        let handle = usecase.spawn(fixture.room.id.clone(), video_id(), None);

        // then (期待する結果):
        assert_eq!(handle.await.unwrap(), EnrichOutcome::Applied);
        assert_eq!(fixture.room.snapshot().await.video_title, "Title");
        assert_eq!(fixture.repository.count().await, 1);
    }
}
