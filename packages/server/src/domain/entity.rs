//! エンティティ
//!
//! ## Room の排他制御
//!
//! Room は自身のフィールドを `RwLock` で保護します。ロックは Room ごとに独立しており、
//! フィールドの読み書きの間だけ保持されます（ネットワーク I/O やファンアウト中は保持しない）。
//!
//! 参加者集合の変更（`add_participant` / `remove_participant`）は
//! Hub のイベントループからのみ呼び出されます。そのためこれらは `pub(crate)` です。

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::{
    enrichment::PLACEHOLDER_TITLE,
    error::RoomError,
    message_pusher::PusherChannel,
    value_object::{ClientId, PlaybackState, RoomId, Timestamp, VideoId},
};

/// Room に参加している 1 接続
///
/// `sender` は接続の送信キュー（有界）への入口です。Room から取り除かれて
/// drop されるとキューが閉じ、接続の書き込みループが終了します。
#[derive(Debug)]
pub struct Participant {
    pub id: ClientId,
    pub room_id: RoomId,
    pub connected_at: Timestamp,
    pub sender: PusherChannel,
}

impl Participant {
    pub fn new(
        id: ClientId,
        room_id: RoomId,
        connected_at: Timestamp,
        sender: PusherChannel,
    ) -> Self {
        Self {
            id,
            room_id,
            connected_at,
            sender,
        }
    }

    pub fn info(&self) -> ParticipantInfo {
        ParticipantInfo {
            id: self.id.clone(),
            connected_at: self.connected_at,
        }
    }
}

/// 参加者の公開情報（送信キューを含まない）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantInfo {
    pub id: ClientId,
    pub connected_at: Timestamp,
}

/// Room のある時点の状態のコピー
#[derive(Debug, Clone, PartialEq)]
pub struct RoomSnapshot {
    pub id: RoomId,
    pub video_id: VideoId,
    pub video_title: String,
    pub icebreakers: Vec<String>,
    pub last_playback: PlaybackState,
    pub participants: Vec<ParticipantInfo>,
    pub created_at: Timestamp,
}

/// 参加者の削除結果
#[derive(Debug)]
pub struct Vacancy {
    /// 取り除かれた参加者（既にいなければ `None`）
    pub removed: Option<Participant>,
    /// この削除で Room が空になった場合、その空室エポック
    pub emptied_epoch: Option<u64>,
}

#[derive(Debug)]
struct RoomState {
    video_title: String,
    icebreakers: Vec<String>,
    participants: HashMap<ClientId, Participant>,
    last_playback: PlaybackState,
    enriched: bool,
    /// 参加者数が 0 になるたびに進むカウンタ
    vacancy_epoch: u64,
}

/// ウォッチパーティ 1 セッション
#[derive(Debug)]
pub struct Room {
    pub id: RoomId,
    pub video_id: VideoId,
    pub created_at: Timestamp,
    state: RwLock<RoomState>,
}

impl Room {
    /// 新しい Room を作成
    ///
    /// `video_title` が `None` の場合はプレースホルダーのタイトルで作成します。
    pub fn new(
        id: RoomId,
        video_id: VideoId,
        video_title: Option<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            video_id,
            created_at,
            state: RwLock::new(RoomState {
                video_title: video_title.unwrap_or_else(|| PLACEHOLDER_TITLE.to_string()),
                icebreakers: Vec::new(),
                participants: HashMap::new(),
                last_playback: PlaybackState::default(),
                enriched: false,
                vacancy_epoch: 0,
            }),
        }
    }

    pub async fn snapshot(&self) -> RoomSnapshot {
        let state = self.state.read().await;
        self.snapshot_of(&state)
    }

    fn snapshot_of(&self, state: &RoomState) -> RoomSnapshot {
        let mut participants: Vec<ParticipantInfo> =
            state.participants.values().map(Participant::info).collect();
        participants.sort_by(|a, b| a.connected_at.cmp(&b.connected_at).then(a.id.cmp(&b.id)));

        RoomSnapshot {
            id: self.id.clone(),
            video_id: self.video_id.clone(),
            video_title: state.video_title.clone(),
            icebreakers: state.icebreakers.clone(),
            last_playback: state.last_playback,
            participants,
            created_at: self.created_at,
        }
    }

    pub async fn participant_count(&self) -> usize {
        self.state.read().await.participants.len()
    }

    pub async fn last_playback(&self) -> PlaybackState {
        self.state.read().await.last_playback
    }

    /// 参加者を追加し、追加直後の状態を返す
    ///
    /// 追加とスナップショット取得は同じ書き込みロック内で行うため、
    /// 返されるスナップショットは参加時点の状態と一致します。
    /// 同じ ID の参加者が既にいる場合は置き換えます（古い送信キューは閉じる）。
    pub(crate) async fn add_participant(&self, participant: Participant) -> RoomSnapshot {
        let mut state = self.state.write().await;
        state.participants.insert(participant.id.clone(), participant);
        self.snapshot_of(&state)
    }

    /// 参加者を削除する（冪等）
    pub(crate) async fn remove_participant(&self, client_id: &ClientId) -> Vacancy {
        let mut state = self.state.write().await;
        let removed = state.participants.remove(client_id);
        let emptied_epoch = if removed.is_some() && state.participants.is_empty() {
            state.vacancy_epoch += 1;
            Some(state.vacancy_epoch)
        } else {
            None
        };
        Vacancy {
            removed,
            emptied_epoch,
        }
    }

    /// ファンアウト対象（送信者を除く参加者）の送信キューを複製して返す
    pub(crate) async fn broadcast_targets(
        &self,
        exclude: Option<&ClientId>,
    ) -> Vec<(ClientId, PusherChannel)> {
        let state = self.state.read().await;
        state
            .participants
            .values()
            .filter(|p| Some(&p.id) != exclude)
            .map(|p| (p.id.clone(), p.sender.clone()))
            .collect()
    }

    /// 最後の再生状態を上書きする（後勝ち）
    pub async fn update_playback(&self, playback: PlaybackState) {
        self.state.write().await.last_playback = playback;
    }

    /// 動画タイトルとアイスブレイクを書き込む
    ///
    /// Room の生存期間中に一度だけ成功します。
    pub async fn apply_enrichment(
        &self,
        video_title: String,
        icebreakers: Vec<String>,
    ) -> Result<RoomSnapshot, RoomError> {
        let mut state = self.state.write().await;
        if state.enriched {
            return Err(RoomError::AlreadyEnriched(self.id.as_str().to_string()));
        }
        state.video_title = video_title;
        state.icebreakers = icebreakers;
        state.enriched = true;
        Ok(self.snapshot_of(&state))
    }

    /// 指定エポックで空になってから誰も参加していないか
    pub async fn is_reclaimable(&self, epoch: u64) -> bool {
        let state = self.state.read().await;
        state.participants.is_empty() && state.vacancy_epoch == epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClientIdFactory, PlaybackStatus, RoomIdFactory};
    use tokio::sync::mpsc;

    fn create_test_room() -> Room {
        Room::new(
            RoomIdFactory::generate(),
            VideoId::new("dQw4w9WgXcQ".to_string()).unwrap(),
            None,
            Timestamp::new(1000),
        )
    }

    fn create_participant(room: &Room, name: &str, connected_at: i64) -> Participant {
        let (tx, _rx) = mpsc::channel(8);
        Participant::new(
            ClientId::new(name.to_string()).unwrap(),
            room.id.clone(),
            Timestamp::new(connected_at),
            tx,
        )
    }

    #[tokio::test]
    async fn test_new_room_uses_placeholder_title() {
        // テスト項目: タイトル未指定の Room はプレースホルダーと未再生状態で始まる
        // given (前提条件):
        let room = create_test_room();

        // when (操作):
        let snapshot = room.snapshot().await;

        // then (期待する結果):
        assert_eq!(snapshot.video_title, PLACEHOLDER_TITLE);
        assert!(snapshot.icebreakers.is_empty());
        assert!(!snapshot.last_playback.is_started());
        assert!(snapshot.participants.is_empty());
    }

    #[tokio::test]
    async fn test_add_participant_returns_snapshot_including_new_participant() {
        // テスト項目: 参加直後のスナップショットに本人が含まれる
        // given (前提条件):
        let room = create_test_room();
        let alice = create_participant(&room, "alice", 2000);

        // when (操作):
        let snapshot = room.add_participant(alice).await;

        // then (期待する結果):
        assert_eq!(snapshot.participants.len(), 1);
        assert_eq!(snapshot.participants[0].id.as_str(), "alice");
        assert_eq!(room.participant_count().await, 1);
    }

    #[tokio::test]
    async fn test_remove_participant_is_idempotent() {
        // テスト項目: 同じ参加者を二度削除しても二度目は何も起きない
        // given (前提条件):
        let room = create_test_room();
        let alice = create_participant(&room, "alice", 2000);
        let alice_id = alice.id.clone();
        room.add_participant(alice).await;

        // when (操作):
        let first = room.remove_participant(&alice_id).await;
        let second = room.remove_participant(&alice_id).await;

        // then (期待する結果):
        assert!(first.removed.is_some());
        assert_eq!(first.emptied_epoch, Some(1));
        assert!(second.removed.is_none());
        assert_eq!(second.emptied_epoch, None);
    }

    #[tokio::test]
    async fn test_vacancy_epoch_advances_on_each_empty_transition() {
        // テスト項目: 空になるたびにエポックが進み、古いエポックでは回収できない
        // given (前提条件):
        let room = create_test_room();
        let alice = create_participant(&room, "alice", 2000);
        let alice_id = alice.id.clone();
        room.add_participant(alice).await;
        let first = room.remove_participant(&alice_id).await.emptied_epoch.unwrap();

        // when (操作): 再参加して再び空になる
        room.add_participant(create_participant(&room, "alice", 3000))
            .await;
        let second = room.remove_participant(&alice_id).await.emptied_epoch.unwrap();

        // then (期待する結果):
        assert_eq!(second, first + 1);
        assert!(!room.is_reclaimable(first).await);
        assert!(room.is_reclaimable(second).await);
    }

    #[tokio::test]
    async fn test_room_with_participants_is_not_reclaimable() {
        // テスト項目: 参加者がいる Room はエポックが一致しても回収対象にならない
        // given (前提条件):
        let room = create_test_room();
        room.add_participant(create_participant(&room, "alice", 2000))
            .await;

        // when (操作) / then (期待する結果):
        assert!(!room.is_reclaimable(0).await);
    }

    #[tokio::test]
    async fn test_broadcast_targets_excludes_sender() {
        // テスト項目: ファンアウト対象から送信者が除外される
        // given (前提条件):
        let room = create_test_room();
        room.add_participant(create_participant(&room, "alice", 1)).await;
        room.add_participant(create_participant(&room, "bob", 2)).await;
        room.add_participant(create_participant(&room, "charlie", 3))
            .await;
        let alice = ClientId::new("alice".to_string()).unwrap();

        // when (操作):
        let targets = room.broadcast_targets(Some(&alice)).await;
        let everyone = room.broadcast_targets(None).await;

        // then (期待する結果):
        let ids: Vec<&str> = targets.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(targets.len(), 2);
        assert!(!ids.contains(&"alice"));
        assert_eq!(everyone.len(), 3);
    }

    #[tokio::test]
    async fn test_apply_enrichment_only_once() {
        // テスト項目: タイトルとアイスブレイクの書き込みは一度だけ成功する
        // given (前提条件):
        let room = create_test_room();

        // when (操作):
        let first = room
            .apply_enrichment("Title".to_string(), vec!["Q1".to_string()])
            .await;
        let second = room
            .apply_enrichment("Other".to_string(), vec!["Q2".to_string()])
            .await;

        // then (期待する結果):
        assert_eq!(first.unwrap().video_title, "Title");
        assert!(matches!(second, Err(RoomError::AlreadyEnriched(_))));
        let snapshot = room.snapshot().await;
        assert_eq!(snapshot.video_title, "Title");
        assert_eq!(snapshot.icebreakers, vec!["Q1".to_string()]);
    }

    #[tokio::test]
    async fn test_update_playback_is_last_writer_wins() {
        // テスト項目: 再生状態は最後に書いたものが残る
        // given (前提条件):
        let room = create_test_room();
        let playing = PlaybackState::new(PlaybackStatus::Playing, 10.0).unwrap();
        let paused = PlaybackState::new(PlaybackStatus::Paused, 12.5).unwrap();

        // when (操作):
        room.update_playback(playing).await;
        room.update_playback(paused).await;

        // then (期待する結果):
        assert_eq!(room.last_playback().await, paused);
    }

    #[tokio::test]
    async fn test_participant_ids_are_unique_per_connection() {
        // テスト項目: 接続ごとに採番した ID の参加者は別々に管理される
        // given (前提条件):
        let room = create_test_room();
        let (tx1, _rx1) = mpsc::channel(1);
        let (tx2, _rx2) = mpsc::channel(1);

        // when (操作):
        room.add_participant(Participant::new(
            ClientIdFactory::generate(),
            room.id.clone(),
            Timestamp::new(1),
            tx1,
        ))
        .await;
        room.add_participant(Participant::new(
            ClientIdFactory::generate(),
            room.id.clone(),
            Timestamp::new(2),
            tx2,
        ))
        .await;

        // then (期待する結果):
        assert_eq!(room.participant_count().await, 2);
    }
}
