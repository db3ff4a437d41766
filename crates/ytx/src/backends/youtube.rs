//! 📺 The platform side of the pipeline.
//!
//! `YouTubeClient` does one GET per call and hands back JSON. `Paginator` keeps calling
//! it, page token by page token, and hands back items one at a time until the platform
//! stops sending tokens. Neither one retries. Neither one caches. Both log what they see.
//!
//! 🚰 `Paginator` → `PageFetcher::fetch_page` → GET `{base_url}/{resource}?...` → JSON

mod paginator;
mod youtube_client;

pub(crate) use paginator::Paginator;
pub(crate) use youtube_client::YouTubeClient;
