//! UseCase 層
//!
//! ドメインのポート（Repository, MessagePusher, 外部連携）を組み合わせて
//! アプリケーションの操作を実装します。

pub mod connect_participant;
pub mod create_room;
pub mod disconnect_participant;
pub mod enrich_room;
pub mod error;
pub mod get_room_detail;
pub mod get_rooms;
pub mod relay_event;

pub use connect_participant::ConnectParticipantUseCase;
pub use create_room::{CreateRoomUseCase, VideoReference};
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use enrich_room::{EnrichOutcome, EnrichRoomUseCase};
pub use error::{ConnectError, CreateRoomError, GetRoomDetailError};
pub use get_room_detail::GetRoomDetailUseCase;
pub use get_rooms::GetRoomsUseCase;
pub use relay_event::RelayEventUseCase;
