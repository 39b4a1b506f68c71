//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
use sajiki_shared::time::{Clock, SystemClock};
use tokio::{net::TcpListener, task::JoinHandle};
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::{
    config::ServerConfig,
    domain::{MessagePusher, PromptGenerator, RoomRepository, TitleLookup},
    infrastructure::{message_pusher::Hub, repository::InMemoryRoomRepository},
    usecase::{
        ConnectParticipantUseCase, CreateRoomUseCase, DisconnectParticipantUseCase,
        EnrichRoomUseCase, GetRoomDetailUseCase, GetRoomsUseCase, RelayEventUseCase,
    },
};

use super::{
    handler::{create_room, get_room_detail, get_rooms, health_check, websocket_handler},
    signal::shutdown_signal,
    state::{AppState, ConnectionSettings},
};

/// Watch party server
///
/// Owns the room registry and the hub event loop for the lifetime of the process.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     ServerConfig::default(),
///     Arc::new(YouTubeTitleLookup::new()),
///     Arc::new(GeminiPromptGenerator::new(api_key)),
/// );
/// server.run().await?;
/// ```
pub struct Server {
    config: ServerConfig,
    state: Arc<AppState>,
    /// Hub event loop
    hub_handle: JoinHandle<()>,
}

impl Server {
    /// Create a new Server instance and start its hub.
    ///
    /// Must be called inside a Tokio runtime.
    ///
    /// # Arguments
    ///
    /// * `config` - Runtime configuration
    /// * `title_lookup` - Resolves video titles after room creation
    /// * `prompt_generator` - Generates icebreakers from a title
    pub fn new(
        config: ServerConfig,
        title_lookup: Arc<dyn TitleLookup>,
        prompt_generator: Arc<dyn PromptGenerator>,
    ) -> Self {
        let repository: Arc<dyn RoomRepository> = Arc::new(InMemoryRoomRepository::new());
        let (pusher, hub_handle) = Hub::spawn(repository.clone(), config.hub_config());
        let message_pusher: Arc<dyn MessagePusher> = Arc::new(pusher);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let enrich_room_usecase = Arc::new(EnrichRoomUseCase::new(
            repository.clone(),
            message_pusher.clone(),
            title_lookup,
            prompt_generator,
        ));

        let state = Arc::new(AppState {
            create_room_usecase: Arc::new(CreateRoomUseCase::new(
                repository.clone(),
                enrich_room_usecase,
                clock.clone(),
            )),
            connect_participant_usecase: Arc::new(ConnectParticipantUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                clock,
            )),
            disconnect_participant_usecase: Arc::new(DisconnectParticipantUseCase::new(
                message_pusher.clone(),
            )),
            relay_event_usecase: Arc::new(RelayEventUseCase::new(
                repository.clone(),
                message_pusher,
            )),
            get_rooms_usecase: Arc::new(GetRoomsUseCase::new(repository.clone())),
            get_room_detail_usecase: Arc::new(GetRoomDetailUseCase::new(repository)),
            connection: ConnectionSettings {
                outbound_capacity: config.outbound_capacity,
                ping_interval: config.ping_interval,
                create_on_join: config.create_on_join,
            },
        });

        Self {
            config,
            state,
            hub_handle,
        }
    }

    /// Build the HTTP router
    pub fn router(&self) -> Router {
        let mut app = Router::new()
            // Room 作成
            .route("/create", post(create_room))
            // WebSocket エンドポイント
            .route("/ws/{room_id}", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .route("/api/rooms/{room_id}", get(get_room_detail))
            .with_state(self.state.clone());

        // Front-end assets with SPA fallback
        if let Some(dir) = &self.config.static_dir {
            let index = ServeFile::new(dir.join("index.html"));
            app = app.fallback_service(ServeDir::new(dir).fallback(index));
        }

        app.layer(TraceLayer::new_for_http())
    }

    /// Run the server on the configured address until Ctrl+C / SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the configured address or
    /// if there's an error during server execution.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        // Bind the server to the host and port
        let bind_addr = self.config.bind_addr();
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Watch party server listening on {}", listener.local_addr()?);
        tracing::info!("Create rooms with: POST http://{}/create", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        // Upgraded sockets may still hold pusher handles, so stop the hub explicitly
        self.hub_handle.abort();
        Ok(())
    }
}
