//! WebSocket connection handlers.
//!
//! Each connection runs two tasks: a reader that turns inbound frames into
//! relay requests, and a writer (`pusher_loop`) that drains the participant's
//! outbound queue onto the socket. The hub closes the outbound queue when the
//! participant is unregistered, which ends the writer with a close frame.

use std::{sync::Arc, time::Duration};

use axum::{
    body::Bytes,
    extract::{
        Path, Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use serde::Deserialize;
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, Interval, MissedTickBehavior},
};

use crate::{
    domain::{ClientId, ClientIdFactory, RoomId, VideoId},
    ui::state::AppState,
};

/// How long the writer may take to flush and send the close frame after the peer left
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct JoinQuery {
    /// Video id, used only when rooms are created on join
    pub v: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Query(query): Query<JoinQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    // Convert String -> RoomId (Domain Model)
    let room_id = match RoomId::try_from(room_id.clone()) {
        Ok(id) => id,
        Err(_) => {
            tracing::warn!("Invalid room id format: '{}'", room_id);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    if state.connection.create_on_join
        && let Some(video) = query.v.filter(|v| !v.is_empty())
    {
        let video_id = VideoId::new(video).map_err(|e| {
            tracing::warn!("Rejecting join of '{}': {}", room_id, e);
            StatusCode::BAD_REQUEST
        })?;
        state
            .create_room_usecase
            .ensure_room(room_id.clone(), video_id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create room '{}' on join: {}", room_id, e);
                StatusCode::INTERNAL_SERVER_ERROR
            })?;
    }

    if !state.connect_participant_usecase.room_exists(&room_id).await {
        tracing::warn!("Room '{}' not found. Rejecting connection.", room_id);
        return Err(StatusCode::NOT_FOUND);
    }

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, room_id)))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// Ends with a close frame once the hub closes the queue, or silently on a
/// write error. Sends a ping every `ping_interval` while idle.
fn pusher_loop(
    mut rx: mpsc::Receiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
    ping_interval: Option<Duration>,
    client_id: ClientId,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ping = ping_interval.map(|period| {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        loop {
            let outbound = tokio::select! {
                message = rx.recv() => match message {
                    Some(text) => Message::Text(text.into()),
                    None => {
                        tracing::debug!("Outbound queue of '{}' closed", client_id);
                        let _ = sender.send(Message::Close(None)).await;
                        break;
                    }
                },
                _ = next_ping(&mut ping) => Message::Ping(Bytes::new()),
            };

            if let Err(e) = sender.send(outbound).await {
                tracing::debug!("Failed to write to '{}': {}", client_id, e);
                break;
            }
        }
    })
}

async fn next_ping(ping: &mut Option<Interval>) {
    match ping {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Spawns a task that reads frames from this client and relays them to the room.
fn reader_loop(
    mut receiver: SplitStream<WebSocket>,
    state: Arc<AppState>,
    room_id: RoomId,
    client_id: ClientId,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!("WebSocket error from '{}': {}", client_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    if let Err(e) = state
                        .relay_event_usecase
                        .execute(room_id.clone(), client_id.clone(), text.as_str().to_owned())
                        .await
                    {
                        tracing::error!("Failed to relay message from '{}': {}", client_id, e);
                        break;
                    }
                }
                Message::Close(_) => {
                    tracing::info!("Client '{}' requested close", client_id);
                    break;
                }
                Message::Binary(_) => {
                    tracing::debug!("Ignoring binary frame from '{}'", client_id);
                }
                // Ping/pong is handled automatically by the WebSocket protocol
                Message::Ping(_) | Message::Pong(_) => {}
            }
        }
    })
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>, room_id: RoomId) {
    let client_id = ClientIdFactory::generate();
    let (tx, rx) = mpsc::channel(state.connection.outbound_capacity.max(1));

    // Register with the hub; the initial state arrives through `rx`
    if let Err(e) = state
        .connect_participant_usecase
        .execute(room_id.clone(), client_id.clone(), tx)
        .await
    {
        tracing::warn!("Client '{}' could not join: {}", client_id, e);
        let _ = socket.send(Message::Close(None)).await;
        return;
    }
    tracing::info!("Client '{}' connected to room '{}'", client_id, room_id);

    let (sender, receiver) = socket.split();
    let mut send_task = pusher_loop(
        rx,
        sender,
        state.connection.ping_interval,
        client_id.clone(),
    );
    let mut recv_task = reader_loop(receiver, state.clone(), room_id.clone(), client_id.clone());

    tokio::select! {
        _ = &mut recv_task => {
            // Unregistering closes the outbound queue, so the writer sends a close frame and ends
            disconnect(&state, &room_id, &client_id).await;
            if tokio::time::timeout(CLOSE_TIMEOUT, &mut send_task).await.is_err() {
                send_task.abort();
            }
        }
        _ = &mut send_task => {
            recv_task.abort();
            let _ = recv_task.await;
            disconnect(&state, &room_id, &client_id).await;
        }
    };

    tracing::info!("Client '{}' disconnected from room '{}'", client_id, room_id);
}

async fn disconnect(state: &AppState, room_id: &RoomId, client_id: &ClientId) {
    if let Err(e) = state
        .disconnect_participant_usecase
        .execute(room_id.clone(), client_id.clone())
        .await
    {
        tracing::warn!("Failed to disconnect participant '{}': {}", client_id, e);
    }
}
