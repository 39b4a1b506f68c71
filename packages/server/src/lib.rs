//! Watch party server library.
//!
//! Rooms bind a group of viewers to one YouTube video. Viewers join a room over
//! WebSocket, receive the room's current playback state, and relay playback and
//! chat events to each other through a single serialized hub. Video titles and
//! conversation starters are resolved in the background after room creation.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;

pub use config::ServerConfig;
