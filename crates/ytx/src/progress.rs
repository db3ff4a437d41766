//! 📊 progress.rs: "How many videos are left?" Asked once per playlist item, forever.
//!
//! 🚀 A progress bar while the run is going, a [`RunReport`] when it is over.
//! The bar length comes from the first playlist page's `pageInfo.totalResults`,
//! which YouTube describes as an estimate and we describe as "close enough".
//!
//! ⚠️ Watching the bar will not make the quota last longer.

use std::time::{Duration, Instant};

use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::NOTHING};
use indicatif::{ProgressBar, ProgressStyle};

/// 🔢 "1234567" → "1,234,567". Eyes: you're welcome.
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// ⏱️ MM:SS, or HH:MM:SS for the playlists that should really be channels.
fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// 🧾 What one run did. Returned by `ytx::run`, printed by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// 📄 Playlist items seen, across every page.
    pub playlist_items: u64,
    /// 📬 Summaries handed to the sink.
    pub videos_published: u64,
    /// 👻 Playlist items whose video lookup came back empty (deleted, private, region locked).
    pub videos_missing: u64,
    pub elapsed: Duration,
}

impl RunReport {
    /// 🍽️ The end-of-run table. Borderless, right-aligned, comfy.
    pub fn render(&self) -> String {
        let mut table = Table::new();
        table.load_preset(NOTHING);
        table.set_content_arrangement(ContentArrangement::Dynamic);

        let rows = [
            ("playlist items", format_number(self.playlist_items)),
            ("videos published", format_number(self.videos_published)),
            ("videos missing", format_number(self.videos_missing)),
            ("elapsed", format_duration(self.elapsed)),
        ];
        for (label, value) in rows {
            table.add_row(vec![
                Cell::new(label),
                Cell::new(value).set_alignment(CellAlignment::Right),
            ]);
        }
        table.to_string()
    }
}

/// 📊 Counts items as they go by and keeps the bar honest about it.
pub(crate) struct ProgressMetrics {
    playlist_id: String,
    playlist_items: u64,
    videos_published: u64,
    videos_missing: u64,
    progress_bar: ProgressBar,
    start_time: Instant,
}

impl std::fmt::Debug for ProgressMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // -- 🎭 ProgressBar does not derive Debug, so the counters speak for it
        f.debug_struct("ProgressMetrics")
            .field("playlist_id", &self.playlist_id)
            .field("playlist_items", &self.playlist_items)
            .field("videos_published", &self.videos_published)
            .field("videos_missing", &self.videos_missing)
            .finish()
    }
}

impl ProgressMetrics {
    /// 🚀 `visible = false` gives a hidden bar: counters still count, nothing is drawn.
    pub(crate) fn new(playlist_id: &str, visible: bool) -> Self {
        let progress_bar = if visible {
            ProgressBar::new(0)
        } else {
            ProgressBar::hidden()
        };
        let style = ProgressStyle::default_bar()
            .template("{msg}\n| [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        progress_bar.set_style(style);

        let metrics = Self {
            playlist_id: playlist_id.to_string(),
            playlist_items: 0,
            videos_published: 0,
            videos_missing: 0,
            progress_bar,
            start_time: Instant::now(),
        };
        metrics.render();
        metrics
    }

    /// 📏 Sets the bar length, once the first page tells us how long the playlist is.
    pub(crate) fn set_total(&self, total_results: Option<u64>) {
        if let Some(total) = total_results {
            self.progress_bar.set_length(total);
        }
    }

    pub(crate) fn observe_item(&mut self) {
        self.playlist_items += 1;
        self.progress_bar.set_position(self.playlist_items);
        self.render();
    }

    pub(crate) fn observe_published(&mut self) {
        self.videos_published += 1;
        self.render();
    }

    pub(crate) fn observe_missing(&mut self) {
        self.videos_missing += 1;
        self.render();
    }

    /// ✅ Stops the bar and hands back the final tally.
    pub(crate) fn finish(&self) -> RunReport {
        self.progress_bar.finish();
        RunReport {
            playlist_items: self.playlist_items,
            videos_published: self.videos_published,
            videos_missing: self.videos_missing,
            elapsed: self.start_time.elapsed(),
        }
    }

    fn render(&self) {
        let mut table = Table::new();
        table.load_preset(NOTHING);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.add_row(vec![
            Cell::new(format!("{} published", format_number(self.videos_published)))
                .set_alignment(CellAlignment::Right),
            Cell::new(format!("{} missing", format_number(self.videos_missing)))
                .set_alignment(CellAlignment::Right),
            Cell::new(format!("{} elapsed", format_duration(self.start_time.elapsed())))
                .set_alignment(CellAlignment::Right),
        ]);
        self.progress_bar
            .set_message(format!("playlist: {}\n{}", self.playlist_id, table));
    }
}
