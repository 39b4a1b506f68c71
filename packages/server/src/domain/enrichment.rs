//! 外部連携のポート（動画タイトル取得・アイスブレイク生成）
//!
//! Room 作成後に非同期で呼び出されます。どちらも失敗しうるため、
//! 呼び出し側は必ずフォールバック値を用意します。

use async_trait::async_trait;

use super::{error::EnrichmentError, value_object::VideoId};

/// タイトル取得前に表示するプレースホルダー
pub const PLACEHOLDER_TITLE: &str = "Loading title...";

/// タイトル取得に失敗したときのタイトル
pub const FALLBACK_TITLE: &str = "A YouTube Video";

/// アイスブレイク生成に失敗したときの既定セット
pub fn default_icebreakers() -> Vec<String> {
    vec!["What do you think of the video so far?".to_string()]
}

/// 動画 ID から表示用タイトルを取得する
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TitleLookup: Send + Sync {
    async fn fetch_title(&self, video_id: &VideoId) -> Result<String, EnrichmentError>;
}

/// タイトルから会話のきっかけ（アイスブレイク）を生成する
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PromptGenerator: Send + Sync {
    async fn generate_prompts(&self, video_title: &str) -> Result<Vec<String>, EnrichmentError>;
}
