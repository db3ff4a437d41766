use anyhow::Result;
use serde::Deserialize;
use tracing::{debug, info};

use super::SchemaRegistryConfig;
use crate::error::YtxError;

/// 📜 One registered schema version, as `/subjects/{subject}/versions/latest` returns it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RegisteredSchema {
    pub(crate) subject: String,
    pub(crate) version: u32,
    pub(crate) id: u32,
    pub(crate) schema: String,
    /// Absent means AVRO. The registry only spells it out for JSON and PROTOBUF.
    #[serde(default)]
    pub(crate) schema_type: Option<String>,
}

impl RegisteredSchema {
    pub(crate) fn is_avro(&self) -> bool {
        self.schema_type
            .as_deref()
            .is_none_or(|kind| kind.eq_ignore_ascii_case("AVRO"))
    }
}

/// 📚 A very small Confluent schema registry client: it knows how to ask for "latest".
#[derive(Debug)]
pub(crate) struct SchemaRegistryClient {
    client: reqwest::Client,
    config: SchemaRegistryConfig,
}

impl SchemaRegistryClient {
    pub(crate) fn new(config: SchemaRegistryConfig) -> Result<Self, YtxError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|source| YtxError::SchemaRegistry {
                subject: String::new(),
                reason: "could not build an HTTP client".to_string(),
                source: Some(source),
            })?;
        Ok(Self { client, config })
    }

    /// 🔍 Fetches the newest registered version of `subject`.
    ///
    /// Unreachable registry, unknown subject, or a body we cannot read all come back as
    /// [`YtxError::SchemaRegistry`].
    pub(crate) async fn latest_version(&self, subject: &str) -> Result<RegisteredSchema, YtxError> {
        let url = format!(
            "{}/subjects/{}/versions/latest",
            self.config.url.trim_end_matches('/'),
            subject
        );
        let failed = |reason: String, source: Option<reqwest::Error>| YtxError::SchemaRegistry {
            subject: subject.to_string(),
            reason,
            source,
        };

        debug!("📚 asking the schema registry for {}", url);
        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.schemaregistry.v1+json");
        if let Some(ref username) = self.config.username {
            request = request.basic_auth(username, self.config.password.as_ref());
        }

        let response = request
            .send()
            .await
            .map_err(|err| failed(format!("registry at {} is unreachable", self.config.url), Some(err)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| failed("response body could not be read".to_string(), Some(err)))?;

        if !status.is_success() {
            return Err(failed(format!("HTTP {status}: {body}"), None));
        }

        let registered: RegisteredSchema = serde_json::from_str(&body)
            .map_err(|err| failed(format!("response is not a schema version: {err}"), None))?;

        info!(
            "📚 schema registry handed us '{}' version {} (id {})",
            registered.subject, registered.version, registered.id
        );
        Ok(registered)
    }
}
