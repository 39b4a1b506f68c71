//! Infrastructure 層
//!
//! ドメイン層のポートの具体的な実装を提供します。

pub mod dto;
pub mod external;
pub mod message_pusher;
pub mod repository;
