use crate::common::{Video, VideoSummary};
use crate::error::YtxError;

/// 📝 Boils a raw [`Video`] down to a [`VideoSummary`].
///
/// Missing counters become `0`. Present counters must parse as unsigned integers; anything
/// else ("1.5k", "-3", "", "lots") is a [`YtxError::Format`] naming the field and the value.
pub(crate) fn summarize_video(video: &Video) -> Result<VideoSummary, YtxError> {
    let stats = &video.statistics;
    Ok(VideoSummary {
        video_id: video.id.clone(),
        title: video.snippet.title.clone(),
        views: parse_count("viewCount", stats.view_count.as_deref())?,
        likes: parse_count("likeCount", stats.like_count.as_deref())?,
        comments: parse_count("commentCount", stats.comment_count.as_deref())?,
    })
}

// -- 🔢 absent means zero. present means "prove it".
fn parse_count(field: &str, raw: Option<&str>) -> Result<u64, YtxError> {
    match raw {
        None => Ok(0),
        Some(value) => value.parse::<u64>().map_err(|err| YtxError::Format {
            field: field.to_string(),
            value: value.to_string(),
            reason: err.to_string(),
        }),
    }
}
