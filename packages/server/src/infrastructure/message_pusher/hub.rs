//! Hub: 参加者の登録・解除とファンアウトを直列に処理するイベントループ
//!
//! ## 責務
//!
//! - `Register`: 参加者を Room に追加し、Room の初期状態を本人にだけ送る
//! - `Unregister`: 参加者を Room から取り除き、送信キューを閉じる（冪等）
//! - `Broadcast`: 送信者以外の参加者の送信キューへ `try_send` する
//! - `Reclaim`: 空室猶予の満了時に Room がまだ空なら Repository から削除する
//!
//! ## 設計ノート
//!
//! 全てのコマンドは 1 本の有界キューに投入され、到着順に処理されます。
//! そのため同じ Room に対する登録・解除・ファンアウトが途中で交錯することはありません。
//!
//! ファンアウトは非ブロッキングです。送信キューが満杯の参加者（書き込みが詰まっている接続）は
//! その場で Room から取り除かれ、キューが閉じられます。遅い 1 人のために他の参加者や
//! 次のコマンドが待たされることはありません。
//!
//! 空室回収のタイマーは別タスクで眠り、満了したら `Reclaim` をこのキューに投入します。
//! 判定はイベントループ上で行うため、登録と削除が競合することはありません。

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::{
    sync::mpsc::{self, error::TrySendError},
    task::JoinHandle,
};

use crate::{
    domain::{ClientId, MessagePushError, MessagePusher, Participant, Room, RoomId, RoomRepository},
    infrastructure::dto::websocket::InitialStateMessage,
};

/// Hub のイベントループが処理するコマンド
#[derive(Debug)]
pub enum HubCommand {
    Register(Participant),
    Unregister {
        room_id: RoomId,
        client_id: ClientId,
    },
    Broadcast {
        room_id: RoomId,
        sender: Option<ClientId>,
        payload: String,
    },
    Reclaim {
        room_id: RoomId,
        epoch: u64,
    },
}

/// Hub の設定
#[derive(Debug, Clone, Copy)]
pub struct HubConfig {
    /// 最後の参加者が抜けてから Room を削除するまでの猶予
    pub grace_period: Duration,
    /// コマンドキューの容量
    pub command_capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            grace_period: Duration::from_secs(300),
            command_capacity: 1024,
        }
    }
}

/// Hub のイベントループ本体
pub struct Hub {
    receiver: mpsc::Receiver<HubCommand>,
    /// 回収タイマーが `Reclaim` を投入するための弱参照（ループの寿命を延ばさない）
    commands: mpsc::WeakSender<HubCommand>,
    repository: Arc<dyn RoomRepository>,
    grace_period: Duration,
}

impl Hub {
    /// Hub と、そこへコマンドを投入する `HubMessagePusher` を作成
    pub fn new(repository: Arc<dyn RoomRepository>, config: HubConfig) -> (Self, HubMessagePusher) {
        let (sender, receiver) = mpsc::channel(config.command_capacity.max(1));
        let hub = Self {
            receiver,
            commands: sender.downgrade(),
            repository,
            grace_period: config.grace_period,
        };
        (hub, HubMessagePusher { sender })
    }

    /// Hub を作成してイベントループをタスクとして起動
    pub fn spawn(
        repository: Arc<dyn RoomRepository>,
        config: HubConfig,
    ) -> (HubMessagePusher, JoinHandle<()>) {
        let (hub, pusher) = Self::new(repository, config);
        let handle = tokio::spawn(hub.run());
        (pusher, handle)
    }

    /// イベントループ
    ///
    /// 全ての `HubMessagePusher` が drop されると終了します。
    pub async fn run(mut self) {
        tracing::info!(
            "Hub started (grace period: {}s)",
            self.grace_period.as_secs()
        );

        while let Some(command) = self.receiver.recv().await {
            self.handle_command(command).await;
        }

        tracing::info!("Hub stopped");
    }

    async fn handle_command(&self, command: HubCommand) {
        match command {
            HubCommand::Register(participant) => self.handle_register(participant).await,
            HubCommand::Unregister { room_id, client_id } => {
                self.handle_unregister(&room_id, &client_id).await
            }
            HubCommand::Broadcast {
                room_id,
                sender,
                payload,
            } => self.handle_broadcast(&room_id, sender.as_ref(), payload).await,
            HubCommand::Reclaim { room_id, epoch } => self.handle_reclaim(&room_id, epoch).await,
        }
    }

    async fn handle_register(&self, participant: Participant) {
        let Some(room) = self.repository.find(&participant.room_id).await else {
            // participant を drop して送信キューを閉じる → 接続は close される
            tracing::warn!(
                "Room '{}' no longer exists, closing connection of '{}'",
                participant.room_id,
                participant.id
            );
            return;
        };

        let client_id = participant.id.clone();
        let sender = participant.sender.clone();
        let snapshot = room.add_participant(participant).await;
        tracing::info!(
            "Client '{}' registered to room '{}'. Total clients: {}",
            client_id,
            room.id,
            snapshot.participants.len()
        );

        let initial_state = match serde_json::to_string(&InitialStateMessage::from(&snapshot)) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize initial state: {}", e);
                return;
            }
        };
        if let Err(e) = sender.try_send(initial_state) {
            tracing::warn!(
                "Failed to send initial state to '{}': {}, disconnecting",
                client_id,
                e
            );
            self.detach(&room, &client_id).await;
        }
    }

    async fn handle_unregister(&self, room_id: &RoomId, client_id: &ClientId) {
        match self.repository.find(room_id).await {
            Some(room) => self.detach(&room, client_id).await,
            None => tracing::debug!(
                "Unregister for '{}' ignored: room '{}' no longer exists",
                client_id,
                room_id
            ),
        }
    }

    async fn handle_broadcast(&self, room_id: &RoomId, sender: Option<&ClientId>, payload: String) {
        let Some(room) = self.repository.find(room_id).await else {
            tracing::debug!("Broadcast to unknown room '{}' dropped", room_id);
            return;
        };

        let targets = room.broadcast_targets(sender).await;
        let mut delivered = 0;
        let mut stalled = Vec::new();
        for (client_id, channel) in targets {
            match channel.try_send(payload.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(
                        "Outbound queue of '{}' is full, disconnecting slow client",
                        client_id
                    );
                    stalled.push(client_id);
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!("Outbound queue of '{}' already closed", client_id);
                    stalled.push(client_id);
                }
            }
        }

        for client_id in &stalled {
            self.detach(&room, client_id).await;
        }

        tracing::debug!(
            "Broadcast in room '{}' delivered to {} client(s), {} dropped",
            room_id,
            delivered,
            stalled.len()
        );
    }

    async fn handle_reclaim(&self, room_id: &RoomId, epoch: u64) {
        if self.repository.remove_if_reclaimable(room_id, epoch).await {
            tracing::info!(
                "Room '{}' deleted after {}s without participants",
                room_id,
                self.grace_period.as_secs()
            );
        } else {
            tracing::debug!(
                "Room '{}' kept: rejoined or already removed (epoch {})",
                room_id,
                epoch
            );
        }
    }

    /// 参加者を取り除き、空になったら回収タイマーを開始する
    async fn detach(&self, room: &Room, client_id: &ClientId) {
        let vacancy = room.remove_participant(client_id).await;

        // 取り出した Participant はここで drop され、送信キューが閉じる
        if vacancy.removed.is_some() {
            tracing::info!(
                "Client '{}' unregistered from room '{}'. Total clients: {}",
                client_id,
                room.id,
                room.participant_count().await
            );
        }

        if let Some(epoch) = vacancy.emptied_epoch {
            self.schedule_reclaim(room.id.clone(), epoch);
        }
    }

    fn schedule_reclaim(&self, room_id: RoomId, epoch: u64) {
        tracing::info!(
            "Room '{}' is empty, scheduling deletion in {}s",
            room_id,
            self.grace_period.as_secs()
        );

        let commands = self.commands.clone();
        let grace_period = self.grace_period;
        tokio::spawn(async move {
            tokio::time::sleep(grace_period).await;
            if let Some(commands) = commands.upgrade() {
                let _ = commands.send(HubCommand::Reclaim { room_id, epoch }).await;
            }
        });
    }
}

/// Hub へコマンドを投入する MessagePusher 実装
///
/// 複製して各接続・各タスクに配ります。投入はキューへの送信だけを待ちます。
#[derive(Clone)]
pub struct HubMessagePusher {
    sender: mpsc::Sender<HubCommand>,
}

impl HubMessagePusher {
    async fn submit(&self, command: HubCommand) -> Result<(), MessagePushError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| MessagePushError::HubUnavailable)
    }
}

#[async_trait]
impl MessagePusher for HubMessagePusher {
    async fn register(&self, participant: Participant) -> Result<(), MessagePushError> {
        self.submit(HubCommand::Register(participant)).await
    }

    async fn unregister(
        &self,
        room_id: RoomId,
        client_id: ClientId,
    ) -> Result<(), MessagePushError> {
        self.submit(HubCommand::Unregister { room_id, client_id })
            .await
    }

    async fn broadcast(
        &self,
        room_id: RoomId,
        sender: Option<ClientId>,
        payload: String,
    ) -> Result<(), MessagePushError> {
        self.submit(HubCommand::Broadcast {
            room_id,
            sender,
            payload,
        })
        .await
    }
}
