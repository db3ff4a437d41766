//! # 📡 THE KAFKA BACKEND
//!
//! 🎬 COLD OPEN. INT. BROKER ROOM, 3:47 AM.
//!
//! The topic is called `youtube_videos`. It has a schema. The schema has opinions.
//! The schema lives in a registry, and the registry is the first thing we call, before
//! a single playlist page is fetched. If it does not answer, nothing else happens.
//!
//! Startup, in order:
//! 1. `SchemaRegistryClient` fetches the latest version of `{topic}-value`.
//! 2. `AvroRecordEncoder` binds itself to that schema and its registry id.
//! 3. A librdkafka `ThreadedProducer` is built from `[sink_config.Kafka.producer]`, with a
//!    delivery report context that logs and counts every failed delivery.
//!
//! Per record: encode (Confluent framing: `0x00`, schema id, Avro datum), enqueue, move on.
//! At close: flush on a blocking thread, then turn any failed delivery into an error.
//!
//! 🦆 (mandatory duck, no context provided, none shall be requested)

use std::collections::BTreeMap;

use serde::Deserialize;

mod avro;
mod kafka_sink;
mod schema_registry;

pub(crate) use kafka_sink::KafkaSink;

/// 🔧 `[sink_config.Kafka]`
#[derive(Debug, Deserialize, Clone)]
pub struct KafkaSinkConfig {
    /// 📬 Destination topic.
    #[serde(default = "default_topic")]
    pub topic: String,
    /// 📚 Registry subject holding the value schema. Defaults to `{topic}-value`.
    #[serde(default)]
    pub subject: Option<String>,
    pub schema_registry: SchemaRegistryConfig,
    /// 🐙 Raw librdkafka properties (`bootstrap.servers`, `security.protocol`, `sasl.*`, ...).
    #[serde(default)]
    pub producer: BTreeMap<String, String>,
    /// ⏱️ Upper bound on the final flush. Unset means "as long as librdkafka keeps trying",
    /// which `message.timeout.ms` bounds anyway.
    #[serde(default)]
    pub flush_timeout_secs: Option<u64>,
}

fn default_topic() -> String {
    "youtube_videos".to_string()
}

impl KafkaSinkConfig {
    /// 📚 The registry subject, following the topic-name strategy unless overridden.
    pub fn subject(&self) -> String {
        self.subject
            .clone()
            .unwrap_or_else(|| format!("{}-value", self.topic))
    }
}

/// 🔒 `[sink_config.Kafka.schema_registry]`
#[derive(Deserialize, Clone)]
pub struct SchemaRegistryConfig {
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl std::fmt::Debug for SchemaRegistryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistryConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
