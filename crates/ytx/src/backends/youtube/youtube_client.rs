use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::app_config::{RuntimeConfig, YouTubeSourceConfig};
use crate::backends::{PageFetcher, PageRequest};
use crate::error::YtxError;

/// 📡 Talks to the YouTube Data API v3 list endpoints. One request per `fetch_page`.
///
/// No retries and, unless `runtime.request_timeout_secs` is set, no timeout beyond
/// reqwest's own defaults. A hung call hangs the run. Known weakness, now with a knob.
pub(crate) struct YouTubeClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for YouTubeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 🔒 api_key omitted on purpose. Debug output ends up in bug reports.
        f.debug_struct("YouTubeClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl YouTubeClient {
    pub(crate) fn new(config: &YouTubeSourceConfig, runtime: &RuntimeConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = runtime.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context(
            "💀 The HTTP client refused to be born. Probably the TLS stack. \
             We tried to build a reqwest::Client and the universe said 'no'.",
        )?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.google_api_key.clone(),
        })
    }

    fn page_url(&self, request: &PageRequest<'_>) -> Result<reqwest::Url> {
        let endpoint = format!("{}/{}", self.base_url, request.resource.path());
        let mut params: Vec<(&str, &str)> = vec![
            ("key", self.api_key.as_str()),
            (request.resource.id_param(), request.id),
            ("part", request.resource.part()),
        ];
        if let Some(token) = request.page_token {
            params.push(("pageToken", token));
        }

        reqwest::Url::parse_with_params(&endpoint, &params).with_context(|| {
            format!("💀 '{endpoint}' is not a URL we can send anything to. Check youtube.base_url.")
        })
    }
}

/// 🧾 Pulls `error.message` out of a platform error body, if there is one.
fn platform_error_message(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    parsed
        .pointer("/error/message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl PageFetcher for YouTubeClient {
    async fn fetch_page(&self, request: PageRequest<'_>) -> Result<Value> {
        let endpoint = request.resource.path();
        let url = self.page_url(&request)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| YtxError::Transport {
                endpoint: endpoint.to_string(),
                // 🔒 the url carries the api key; keep it out of the error text
                source: source.without_url(),
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| YtxError::Transport {
                endpoint: endpoint.to_string(),
                source: source.without_url(),
            })?;

        if !status.is_success() {
            let reason = match platform_error_message(&body) {
                Some(message) => format!("HTTP {status}: {message}"),
                None => format!("HTTP {status}"),
            };
            return Err(YtxError::api(endpoint, reason).into());
        }

        let payload: Value = serde_json::from_str(&body)
            .map_err(|err| YtxError::api(endpoint, format!("body is not JSON: {err}")))?;

        debug!("📡 GOT {} page for '{}': {}", endpoint, request.id, payload);

        Ok(payload)
    }
}
