//! ドメイン層
//!
//! ウォッチパーティの中核となる概念（Room, Participant, 再生状態）と、
//! 外側の層が実装するポート（Repository, MessagePusher, 外部連携）を定義します。

pub mod enrichment;
pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod repository;
pub mod value_object;

pub use enrichment::{
    FALLBACK_TITLE, PLACEHOLDER_TITLE, PromptGenerator, TitleLookup, default_icebreakers,
};
#[cfg(test)]
pub use enrichment::{MockPromptGenerator, MockTitleLookup};
pub use entity::{Participant, ParticipantInfo, Room, RoomSnapshot, Vacancy};
pub use error::{
    EnrichmentError, MessagePushError, RepositoryError, RoomError, ValueObjectError,
};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use repository::RoomRepository;
pub use value_object::{
    ClientId, ClientIdFactory, PlaybackState, PlaybackStatus, RoomId, RoomIdFactory, Timestamp,
    VideoId,
};
