//! 外部サービス連携
//!
//! - `youtube`: 動画 URL の解析と oEmbed によるタイトル取得
//! - `gemini`: Gemini API によるアイスブレイク生成

pub mod gemini;
pub mod youtube;

pub use gemini::{GeminiPromptGenerator, parse_icebreakers};
pub use youtube::{YouTubeTitleLookup, parse_video_id};
