use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::settings::SlackSettings;

/// A single channel message. Only the fields used for export are kept.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub text: String,
    /// Seconds since epoch, normally a string such as `"1704056400.000200"`.
    #[serde(default)]
    pub ts: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    messages: Option<Vec<Message>>,
    #[serde(default)]
    has_more: bool,
}

pub struct Client {
    http: reqwest::Client,
    base_url: String,
    token: String,
    channel_id: String,
}

impl Client {
    pub fn new(settings: &SlackSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            token: settings.token.clone(),
            channel_id: settings.channel_id.clone(),
        }
    }

    /// Fetches one page of channel history, newest first, starting at `oldest`
    /// inclusive. Anything past `limit` is not requested.
    pub async fn fetch_messages(&self, oldest: &str, limit: usize) -> Result<Vec<Message>> {
        let url = format!("{}/conversations.history", self.base_url);
        debug!(%url, channel = %self.channel_id, oldest, limit, "Requesting channel history");
        let limit = limit.to_string();
        let response: HistoryResponse = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[
                ("channel", self.channel_id.as_str()),
                ("inclusive", "true"),
                ("oldest", oldest),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .context("Failed to send conversations.history request")?
            .error_for_status()?
            .json()
            .await
            .context("Failed to decode conversations.history response")?;

        if !response.ok {
            bail!(
                "conversations.history returned error: {}",
                response.error.as_deref().unwrap_or("unknown_error")
            )
        }
        let messages = response
            .messages
            .context("conversations.history response has no messages")?;
        if response.has_more {
            warn!(
                limit = %limit,
                "More messages exist in the window; only the first page is exported"
            );
        }
        Ok(messages)
    }
}
