//! 🔌 Backends: where the real I/O happens.
//!
//! 🚰 The platform API pours pages in, Sink backends slurp summaries up.
//! And in between, we panic! (kidding, we use anyhow)
//!
//! Two seams live here:
//! - [`PageFetcher`]: one GET, one page, JSON in hand. `youtube::YouTubeClient` is the real one.
//! - [`Sink`]: take a keyed record, get it somewhere, and flush on `close`.
//!   [`SinkBackend`] is the enum the pipeline actually holds.
//!
//! 🦆 The duck is here because every file must have one. This is law. Do not question the duck.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use crate::app_config::SinkConfig;
use crate::common::OutgoingRecord;

pub(crate) mod file;
pub(crate) mod in_mem;
pub(crate) mod kafka;
pub(crate) mod youtube;

pub use file::FileSinkConfig;
pub use kafka::{KafkaSinkConfig, SchemaRegistryConfig};

// ===== Page fetching =====

/// 📚 Which list endpoint a page request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Resource {
    /// `playlistItems`, filtered by `playlistId`, `part=contentDetails`
    PlaylistItems,
    /// `videos`, filtered by `id`, `part=snippet,statistics`
    Videos,
}

impl Resource {
    pub(crate) fn path(self) -> &'static str {
        match self {
            Resource::PlaylistItems => "playlistItems",
            Resource::Videos => "videos",
        }
    }

    /// The query parameter that carries the resource identifier.
    pub(crate) fn id_param(self) -> &'static str {
        match self {
            Resource::PlaylistItems => "playlistId",
            Resource::Videos => "id",
        }
    }

    pub(crate) fn part(self) -> &'static str {
        match self {
            Resource::PlaylistItems => "contentDetails",
            Resource::Videos => "snippet,statistics",
        }
    }
}

/// 📄 Everything needed to ask for exactly one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageRequest<'a> {
    pub(crate) resource: Resource,
    pub(crate) id: &'a str,
    pub(crate) page_token: Option<&'a str>,
}

/// 🚰 Fetches one raw page per call, maximally ignorant of what the page means.
///
/// # Contract 📜
/// - Exactly one request per call. No retries, no caching, no pagination.
/// - The decoded JSON body comes back unchanged. Interpreting `items` and
///   `nextPageToken` is the `Paginator`'s job.
/// - Transport trouble is a `YtxError::Transport`; bad status or non-JSON is a `YtxError::Api`.
#[async_trait]
pub(crate) trait PageFetcher: std::fmt::Debug + Send + Sync {
    async fn fetch_page(&self, request: PageRequest<'_>) -> Result<Value>;
}

// ===== Sink Trait and Backend Enum =====

/// 🕳️ A sink that publishes keyed records. Pure I/O, zero business logic.
///
/// # Contract 📜
/// - `send` hands one record to the destination. It may return before the record is
///   durable (the Kafka sink only enqueues).
/// - `close` flushes whatever is in flight and reports anything that failed along the way.
///   MUST be called. Calling it twice is harmless.
#[async_trait]
pub(crate) trait Sink: std::fmt::Debug + Send {
    /// 📡 Publish one record under `key`.
    async fn send(&mut self, key: &str, record: &OutgoingRecord) -> Result<()>;
    /// 🗑️ Flush, finalize, and release. Call this. Always. No exceptions. Not even on Fridays.
    async fn close(&mut self) -> Result<()>;
}

/// 🎭 The many faces of a Sink. The pipeline never needs to know which one it got.
#[derive(Debug)]
pub(crate) enum SinkBackend {
    Kafka(kafka::KafkaSink),
    File(file::FileSink),
    InMemory(in_mem::InMemorySink),
}

impl SinkBackend {
    /// 🏗️ Builds the configured sink. For Kafka this is where the schema registry gets
    /// its one and only phone call, so a dead registry stops the run right here.
    pub(crate) async fn from_config(config: SinkConfig) -> Result<Self> {
        Ok(match config {
            SinkConfig::Kafka(kafka_config) => SinkBackend::Kafka(
                kafka::KafkaSink::new(kafka_config)
                    .await
                    .context("💀 Could not stand up the Kafka sink")?,
            ),
            SinkConfig::File(file_config) => SinkBackend::File(
                file::FileSink::new(file_config)
                    .await
                    .context("💀 Could not stand up the file sink")?,
            ),
            SinkConfig::InMemory => SinkBackend::InMemory(in_mem::InMemorySink::new()),
        })
    }
}

#[async_trait]
impl Sink for SinkBackend {
    async fn send(&mut self, key: &str, record: &OutgoingRecord) -> Result<()> {
        match self {
            SinkBackend::Kafka(sink) => sink.send(key, record).await,
            SinkBackend::File(sink) => sink.send(key, record).await,
            SinkBackend::InMemory(sink) => sink.send(key, record).await,
        }
    }

    async fn close(&mut self) -> Result<()> {
        match self {
            SinkBackend::Kafka(sink) => sink.close().await,
            SinkBackend::File(sink) => sink.close().await,
            SinkBackend::InMemory(sink) => sink.close().await,
        }
    }
}
