//! Gemini client for icebreaker generation.

use std::{sync::LazyLock, time::Duration};

use async_trait::async_trait;
use regex_lite::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::domain::{EnrichmentError, PromptGenerator};

/// Default `generateContent` endpoint (API key is appended as `?key=`).
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash-latest:generateContent";

const REQUEST_TIMEOUT_SECS: u64 = 20;

fn build_prompt(video_title: &str) -> String {
    format!(
        "Based on the YouTube video title '{}', generate exactly 3 short, fun, and engaging \
         conversation starters or 'icebreakers' for a watch party. Format them as a numbered \
         list, like '1. Question one?'. Do not add any extra introduction or conclusion.",
        video_title
    )
}

/// `<digits>.` followed by the item text, which may start on the next line
static NUMBERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\s*(.+)").expect("valid regex"));

/// Split a model answer into individual icebreakers.
///
/// Numbered items (`1. ...`) win. When nothing is numbered, every non-blank
/// line is taken as-is (trimmed).
pub fn parse_icebreakers(raw: &str) -> Vec<String> {
    let numbered: Vec<String> = NUMBERED_RE
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1))
        .map(|item| item.as_str().trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect();
    if !numbered.is_empty() {
        return numbered;
    }

    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

/// Prompt generator backed by the Gemini `generateContent` API.
#[derive(Clone)]
pub struct GeminiPromptGenerator {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl GeminiPromptGenerator {
    /// `api_key` of `None` (or empty) makes every call fail with `MissingApiKey`.
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_endpoint(DEFAULT_GEMINI_URL, api_key)
    }

    pub fn with_endpoint(endpoint: &str, api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }
}

#[async_trait]
impl PromptGenerator for GeminiPromptGenerator {
    async fn generate_prompts(&self, video_title: &str) -> Result<Vec<String>, EnrichmentError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(EnrichmentError::MissingApiKey)?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(video_title),
                }],
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| EnrichmentError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EnrichmentError::Status(response.status().as_u16()));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| EnrichmentError::Decode(e.to_string()))?;

        let raw = body
            .candidates
            .first()
            .and_then(|candidate| candidate.content.parts.first())
            .map(|part| part.text.as_str())
            .ok_or(EnrichmentError::EmptyResponse)?;

        let icebreakers = parse_icebreakers(raw);
        if icebreakers.is_empty() {
            return Err(EnrichmentError::EmptyResponse);
        }
        Ok(icebreakers)
    }
}
