//! YouTube client: video URL parsing and title lookup via oEmbed.

use std::{sync::LazyLock, time::Duration};

use async_trait::async_trait;
use regex_lite::Regex;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::domain::{EnrichmentError, TitleLookup, VideoId};

/// Default oEmbed endpoint.
pub const DEFAULT_OEMBED_URL: &str = "https://www.youtube.com/oembed";

static EMBED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/embed/([a-zA-Z0-9_-]{11})").expect("valid regex"));

/// Extract the video id from a YouTube URL.
///
/// Recognized shapes:
/// - `https://youtu.be/<id>`
/// - `https://www.youtube.com/watch?v=<id>` (also `youtube.com`)
/// - `https://www.youtube.com/embed/<id>` where `<id>` is 11 URL-safe characters
///
/// Returns `None` for anything else.
pub fn parse_video_id(url: &str) -> Option<VideoId> {
    let url = Url::parse(url).ok()?;
    let candidate = match url.host_str()? {
        "youtu.be" => url.path().trim_start_matches('/').to_string(),
        "www.youtube.com" | "youtube.com" => {
            if url.path() == "/watch" {
                url.query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned())?
            } else {
                embed_id(url.path())?
            }
        }
        _ => return None,
    };
    VideoId::new(candidate).ok()
}

fn embed_id(path: &str) -> Option<String> {
    EMBED_RE
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map(|id| id.as_str().to_string())
}

#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    title: String,
}

/// Title lookup backed by YouTube's oEmbed endpoint.
#[derive(Clone)]
pub struct YouTubeTitleLookup {
    client: Client,
    endpoint: String,
}

impl YouTubeTitleLookup {
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_OEMBED_URL, 10)
    }

    /// Create a lookup against a custom oEmbed endpoint.
    pub fn with_endpoint(endpoint: &str, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            endpoint: endpoint.to_string(),
        }
    }
}

impl Default for YouTubeTitleLookup {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TitleLookup for YouTubeTitleLookup {
    async fn fetch_title(&self, video_id: &VideoId) -> Result<String, EnrichmentError> {
        let watch_url = format!("http://www.youtube.com/watch?v={}", video_id);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("url", watch_url.as_str()), ("format", "json")])
            .send()
            .await
            .map_err(|e| EnrichmentError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EnrichmentError::Status(response.status().as_u16()));
        }

        let body: OEmbedResponse = response
            .json()
            .await
            .map_err(|e| EnrichmentError::Decode(e.to_string()))?;

        let title = body.title.trim();
        if title.is_empty() {
            return Err(EnrichmentError::EmptyResponse);
        }
        Ok(title.to_string())
    }
}
