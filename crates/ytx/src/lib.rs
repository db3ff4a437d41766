//! # 📺 ytx
//!
//! Walks a YouTube playlist, boils every video down to title, views, likes and comments,
//! and publishes each one to Kafka as Confluent-framed Avro, keyed by video id.
//!
//! ```text
//!  YouTube Data API ──▶ Paginator ──▶ summarize_video ──▶ Sink (Kafka | File | InMemory)
//! ```
//!
//! Entry point is [`run`]; configuration comes from [`app_config::load_config`].

use anyhow::{Context, Result};
use tracing::info;

pub mod app_config;
mod backends;
mod common;
pub mod error;
mod pipeline;
mod progress;
mod transforms;

pub use backends::{FileSinkConfig, KafkaSinkConfig, SchemaRegistryConfig};
pub use progress::RunReport;

use crate::app_config::AppConfig;
use crate::backends::SinkBackend;
use crate::backends::youtube::YouTubeClient;
use crate::pipeline::Pipeline;

/// 🚀 One full run: build the sink, walk the playlist, flush, report.
///
/// The sink comes first. For Kafka that means the schema registry is asked
/// before YouTube is, and a registry that has nothing for us ends the run right there.
pub async fn run(config: AppConfig) -> Result<RunReport> {
    let AppConfig {
        youtube,
        sink_config,
        runtime,
    } = config;

    let sink = SinkBackend::from_config(sink_config)
        .await
        .context("💀 The sink never got off the ground, so YouTube was not even asked")?;
    let client = YouTubeClient::new(&youtube, &runtime)?;
    info!("📡 source ready: {:?}", client);

    Pipeline::new(client, sink, youtube.youtube_playlist_id, runtime.show_progress)
        .run()
        .await
        .context("💀 The playlist run did not finish")
}
