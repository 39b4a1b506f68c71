//! メッセージ送信（通知）の実装
//!
//! ## 概要
//!
//! このモジュールは `MessagePusher` trait の具体的な実装を提供します。
//!
//! ## 実装
//!
//! - `hub`: 単一のイベントループで登録・解除・ファンアウトを直列化する実装

pub mod hub;

pub use hub::{Hub, HubCommand, HubConfig, HubMessagePusher};
