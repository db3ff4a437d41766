//! 🔄 Transforms: raw platform records in, publishable digests out.
//!
//! ```text
//!   Platform JSON            Intermediate            Wire format
//!  ┌──────────────┐       ┌──────────────┐       ┌────────────────┐
//!  │ Video        │──────▶│ VideoSummary │──────▶│ OutgoingRecord │
//!  │  statistics  │ ingest│  video_id    │ egress│  TITLE VIEWS   │
//!  │  (strings)   │       │  u64 counts  │       │  LIKES COMMENTS│
//!  └──────────────┘       └──────────────┘       └────────────────┘
//! ```
//!
//! Ingest is [`summarize_video`]. Egress is `OutgoingRecord::from(&VideoSummary)` in
//! `common`. Both are pure: no I/O, no clocks, no hidden state. Run them twice, get the
//! same answer twice. That is the whole personality. 🦆

pub(crate) mod summarize;

pub(crate) use summarize::summarize_video;
