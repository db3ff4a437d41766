//! 🎬 The pipeline: playlist in, keyed records out, one video at a time.
//!
//! ```text
//!   playlistItems pages ──▶ PlaylistItem ──▶ videos?id=.. pages ──▶ Video
//!                                                                    │
//!                              Sink ◀── OutgoingRecord ◀── VideoSummary
//! ```
//!
//! Strictly sequential. The only thing running in the background is librdkafka.
//! The sink is closed exactly once, whether the walk finished or blew up halfway,
//! and the first error is the one that gets reported.

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::backends::youtube::Paginator;
use crate::backends::{PageFetcher, Resource, Sink};
use crate::common::{OutgoingRecord, PlaylistItem, Video};
use crate::error::YtxError;
use crate::progress::{ProgressMetrics, RunReport};
use crate::transforms::summarize_video;

/// 🚂 One run over one playlist.
#[derive(Debug)]
pub(crate) struct Pipeline<F: PageFetcher, S: Sink> {
    fetcher: F,
    sink: S,
    playlist_id: String,
    progress: ProgressMetrics,
}

impl<F: PageFetcher, S: Sink> Pipeline<F, S> {
    pub(crate) fn new(fetcher: F, sink: S, playlist_id: impl Into<String>, show_progress: bool) -> Self {
        let playlist_id = playlist_id.into();
        let progress = ProgressMetrics::new(&playlist_id, show_progress);
        Self {
            fetcher,
            sink,
            playlist_id,
            progress,
        }
    }

    /// 🚀 Walk the playlist, publish every video, close the sink. In that order, no matter what.
    pub(crate) async fn run(&mut self) -> Result<RunReport> {
        info!("🚀 walking playlist '{}'", self.playlist_id);

        let drained = self.drain_playlist().await;
        let closed = self
            .sink
            .close()
            .await
            .context("💀 The sink could not be closed cleanly. Some records may not have made it.");
        let report = self.progress.finish();

        // -- 🥇 first error wins; a close failure only surfaces if the walk itself was clean
        drained?;
        closed?;

        info!(
            "✅ playlist '{}' done: {} item(s), {} published, {} missing",
            self.playlist_id, report.playlist_items, report.videos_published, report.videos_missing
        );
        Ok(report)
    }

    async fn drain_playlist(&mut self) -> Result<()> {
        let mut playlist = Paginator::new(&self.fetcher, Resource::PlaylistItems, self.playlist_id.as_str());
        let mut sized = false;

        while let Some(raw_item) = playlist.next_item().await? {
            if !sized {
                self.progress.set_total(playlist.total_results());
                sized = true;
            }
            self.progress.observe_item();

            let item: PlaylistItem = parse_item(Resource::PlaylistItems, raw_item)?;
            let video_id = item.content_details.video_id;

            // 🔍 a lookup by id is just another paginated list that happens to be short
            let mut videos = Paginator::new(&self.fetcher, Resource::Videos, video_id.as_str());
            let mut found = 0u64;
            while let Some(raw_video) = videos.next_item().await? {
                let video: Video = parse_item(Resource::Videos, raw_video)?;
                let summary = summarize_video(&video)
                    .with_context(|| format!("💀 Could not summarize video '{}'", video.id))?;
                info!("📺 GOT {:#?}", summary);

                self.sink
                    .send(&summary.video_id, &OutgoingRecord::from(&summary))
                    .await
                    .with_context(|| format!("💀 Could not publish video '{}'", summary.video_id))?;
                self.progress.observe_published();
                found += 1;
            }

            if found == 0 {
                warn!(
                    "👻 video '{}' is in playlist '{}' but the videos endpoint has never heard of it \
                     (private? deleted?). Skipping.",
                    video_id, self.playlist_id
                );
                self.progress.observe_missing();
            }
        }
        debug!("📚 {} playlist page(s) fetched", playlist.pages_fetched());
        Ok(())
    }
}

fn parse_item<T: serde::de::DeserializeOwned>(resource: Resource, raw: Value) -> Result<T, YtxError> {
    serde_json::from_value(raw).map_err(|err| {
        YtxError::api(
            resource.path(),
            format!("item does not have the expected shape: {err}"),
        )
    })
}
