//! 📦 Common data structures: the things that ride the pipeline from the platform API to the broker.
//!
//! 🎬 INT. PLAYLIST, SOME TIME AFTER UPLOAD
//!
//! A `PlaylistItem` arrives carrying nothing but a video id, like a coat check ticket.
//! We trade the ticket for a `Video`, squint at its statistics, write a `VideoSummary`
//! on a napkin, and hand an `OutgoingRecord` to the broker. Nobody keeps the napkin.
//!
//! Raw API shapes (`PlaylistItem`, `Video`) deserialize from camelCase JSON.
//! The wire projection (`OutgoingRecord`) serializes with the SHOUTY field names the
//! registered schema expects. 🦆

use serde::{Deserialize, Serialize};

/// 🎟️ One playlist entry. We only care which video it points at.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItem {
    pub content_details: ContentDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDetails {
    pub video_id: String,
}

/// 📺 A `videos.list` resource with `part=snippet,statistics`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Video {
    pub id: String,
    pub snippet: Snippet,
    /// Some videos hide their statistics entirely. An absent object counts as all-zero.
    #[serde(default)]
    pub statistics: Statistics,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Snippet {
    pub title: String,
}

/// 🔢 String-encoded counters, exactly as the platform sends them. Any of them may be missing
/// (likes and comments can be disabled by the uploader).
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    #[serde(default)]
    pub view_count: Option<String>,
    #[serde(default)]
    pub like_count: Option<String>,
    #[serde(default)]
    pub comment_count: Option<String>,
}

/// 📝 The digest we log and publish. Counters are never negative and never absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoSummary {
    pub video_id: String,
    pub title: String,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
}

/// 📬 The value half of a published message. Field names are the schema contract, do not rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingRecord {
    #[serde(rename = "TITLE")]
    pub title: String,
    #[serde(rename = "VIEWS")]
    pub views: u64,
    #[serde(rename = "LIKES")]
    pub likes: u64,
    #[serde(rename = "COMMENTS")]
    pub comments: u64,
}

/// One field of an [`OutgoingRecord`], as the schema-driven encoder sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldValue<'a> {
    Text(&'a str),
    Count(u64),
}

impl OutgoingRecord {
    /// 🧾 The record as (schema field name, value) pairs, in contract order.
    pub(crate) fn fields(&self) -> [(&'static str, FieldValue<'_>); 4] {
        [
            ("TITLE", FieldValue::Text(&self.title)),
            ("VIEWS", FieldValue::Count(self.views)),
            ("LIKES", FieldValue::Count(self.likes)),
            ("COMMENTS", FieldValue::Count(self.comments)),
        ]
    }
}

impl From<&VideoSummary> for OutgoingRecord {
    fn from(summary: &VideoSummary) -> Self {
        Self {
            title: summary.title.clone(),
            views: summary.views,
            likes: summary.likes,
            comments: summary.comments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn the_one_where_a_video_without_statistics_still_deserializes() {
        let video: Video = serde_json::from_value(json!({
            "id": "shy",
            "snippet": {"title": "Stats hidden"}
        }))
        .expect("💀 statistics is optional, serde should shrug and move on");

        assert_eq!(video.statistics, Statistics::default());
    }

    #[test]
    fn the_one_where_the_outgoing_record_shouts_its_field_names() {
        let summary = VideoSummary {
            video_id: "abc".into(),
            title: "T".into(),
            views: 10,
            likes: 2,
            comments: 0,
        };

        let wire = serde_json::to_value(OutgoingRecord::from(&summary))
            .expect("💀 a four-field struct refused to become JSON");

        assert_eq!(wire, json!({"TITLE": "T", "VIEWS": 10, "LIKES": 2, "COMMENTS": 0}));
    }
}
