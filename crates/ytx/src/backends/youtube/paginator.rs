use std::collections::VecDeque;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::trace;

use crate::backends::{PageFetcher, PageRequest, Resource};
use crate::error::YtxError;

/// 🧭 Where the paginator is in its (strictly one-way) life.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Cursor {
    /// Nothing fetched yet. The next fetch is page one.
    Start,
    /// The last page handed us this token.
    Next(String),
    /// The last page had no token. Drain the buffer and go home.
    Done,
}

/// 📚 Lazily walks every page of one list request, one item at a time.
///
/// Page one is fetched on the first `next_item` call, and each following page only when
/// the buffered one runs dry. The walk is a plain loop, not recursion, so a ten-thousand
/// page playlist costs ten thousand iterations and zero extra stack frames.
///
/// A fresh `Paginator` always starts from page one. One that has started cannot be rewound.
#[derive(Debug)]
pub(crate) struct Paginator<'a, F: PageFetcher + ?Sized> {
    fetcher: &'a F,
    resource: Resource,
    id: String,
    cursor: Cursor,
    buffer: VecDeque<Value>,
    pages_fetched: u64,
    total_results: Option<u64>,
}

impl<'a, F: PageFetcher + ?Sized> Paginator<'a, F> {
    pub(crate) fn new(fetcher: &'a F, resource: Resource, id: impl Into<String>) -> Self {
        Self {
            fetcher,
            resource,
            id: id.into(),
            cursor: Cursor::Start,
            buffer: VecDeque::new(),
            pages_fetched: 0,
            total_results: None,
        }
    }

    /// 📄 The next raw item, `Ok(None)` once the last page is drained.
    pub(crate) async fn next_item(&mut self) -> Result<Option<Value>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Ok(Some(item));
            }

            let page_token = match &self.cursor {
                Cursor::Done => return Ok(None),
                Cursor::Start => None,
                Cursor::Next(token) => Some(token.clone()),
            };

            let payload = self
                .fetcher
                .fetch_page(PageRequest {
                    resource: self.resource,
                    id: &self.id,
                    page_token: page_token.as_deref(),
                })
                .await
                .with_context(|| {
                    format!(
                        "💀 Page {} of {} for '{}' never made it back to us",
                        self.pages_fetched + 1,
                        self.resource.path(),
                        self.id
                    )
                })?;

            self.absorb(payload)?;
        }
    }

    /// 📊 `pageInfo.totalResults` from page one, when the platform bothered to send it.
    pub(crate) fn total_results(&self) -> Option<u64> {
        self.total_results
    }

    pub(crate) fn pages_fetched(&self) -> u64 {
        self.pages_fetched
    }

    // -- 🍽️ take a page apart: items into the buffer, token into the cursor
    fn absorb(&mut self, payload: Value) -> Result<(), YtxError> {
        let endpoint = self.resource.path();
        let Value::Object(mut page) = payload else {
            return Err(YtxError::api(endpoint, "page is not a JSON object"));
        };

        let items = match page.remove("items") {
            Some(Value::Array(items)) => items,
            Some(_) => return Err(YtxError::api(endpoint, "'items' is not an array")),
            None => return Err(YtxError::api(endpoint, "page has no 'items' key")),
        };

        self.cursor = match page.remove("nextPageToken") {
            None | Some(Value::Null) => Cursor::Done,
            // -- 🌀 "" would ask for page one again, forever
            Some(Value::String(token)) if token.is_empty() => Cursor::Done,
            Some(Value::String(token)) => Cursor::Next(token),
            Some(other) => {
                return Err(YtxError::api(
                    endpoint,
                    format!("'nextPageToken' should be a string, got {other}"),
                ));
            }
        };

        if self.pages_fetched == 0 {
            self.total_results = page
                .get("pageInfo")
                .and_then(|info| info.get("totalResults"))
                .and_then(Value::as_u64);
        }
        self.pages_fetched += 1;

        trace!(
            "📄 {} page {} for '{}' brought {} items, more pages: {}",
            endpoint,
            self.pages_fetched,
            self.id,
            items.len(),
            matches!(self.cursor, Cursor::Next(_))
        );

        self.buffer.extend(items);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::in_mem::InMemoryPages;
    use serde_json::json;

    async fn drain<F: PageFetcher>(paginator: &mut Paginator<'_, F>) -> Result<Vec<Value>> {
        let mut seen = Vec::new();
        while let Some(item) = paginator.next_item().await? {
            seen.push(item);
        }
        Ok(seen)
    }

    #[tokio::test]
    async fn the_one_where_three_linked_pages_arrive_in_order_exactly_once() -> Result<()> {
        let pages = InMemoryPages::new()
            .with_page(
                Resource::PlaylistItems,
                "PL",
                None,
                json!({"items": [1, 2], "nextPageToken": "p2", "pageInfo": {"totalResults": 5}}),
            )
            .with_page(
                Resource::PlaylistItems,
                "PL",
                Some("p2"),
                json!({"items": [3], "nextPageToken": "p3"}),
            )
            .with_page(Resource::PlaylistItems, "PL", Some("p3"), json!({"items": [4, 5]}));

        let mut paginator = Paginator::new(&pages, Resource::PlaylistItems, "PL");
        let items = drain(&mut paginator).await?;

        assert_eq!(items, vec![json!(1), json!(2), json!(3), json!(4), json!(5)]);
        assert_eq!(paginator.pages_fetched(), 3);
        assert_eq!(paginator.total_results(), Some(5));
        assert_eq!(
            pages.requested_tokens(),
            vec![None, Some("p2".to_string()), Some("p3".to_string())]
        );
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_nothing_is_fetched_until_someone_asks() -> Result<()> {
        let pages = InMemoryPages::new().with_page(
            Resource::Videos,
            "abc",
            None,
            json!({"items": [{"id": "abc"}]}),
        );

        let mut paginator = Paginator::new(&pages, Resource::Videos, "abc");
        assert!(pages.requested_tokens().is_empty());

        let first = paginator.next_item().await?;
        assert_eq!(first, Some(json!({"id": "abc"})));
        assert_eq!(pages.requested_tokens().len(), 1);

        // 🏁 drained: asking again costs nothing
        assert_eq!(paginator.next_item().await?, None);
        assert_eq!(paginator.next_item().await?, None);
        assert_eq!(pages.requested_tokens().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_the_playlist_is_empty_and_null_means_done() -> Result<()> {
        let pages = InMemoryPages::new().with_page(
            Resource::PlaylistItems,
            "PL",
            None,
            json!({"items": [], "nextPageToken": null}),
        );

        let mut paginator = Paginator::new(&pages, Resource::PlaylistItems, "PL");

        assert!(drain(&mut paginator).await?.is_empty());
        assert_eq!(paginator.pages_fetched(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_an_empty_page_still_points_somewhere() -> Result<()> {
        let pages = InMemoryPages::new()
            .with_page(
                Resource::PlaylistItems,
                "PL",
                None,
                json!({"items": [], "nextPageToken": "p2"}),
            )
            .with_page(Resource::PlaylistItems, "PL", Some("p2"), json!({"items": ["late"]}));

        let mut paginator = Paginator::new(&pages, Resource::PlaylistItems, "PL");

        assert_eq!(drain(&mut paginator).await?, vec![json!("late")]);
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_a_page_forgot_its_items() {
        let pages = InMemoryPages::new().with_page(
            Resource::PlaylistItems,
            "PL",
            None,
            json!({"kind": "youtube#playlistItemListResponse"}),
        );

        let mut paginator = Paginator::new(&pages, Resource::PlaylistItems, "PL");
        let err = paginator
            .next_item()
            .await
            .expect_err("💀 no items key should be fatal");

        match YtxError::find(&err) {
            Some(YtxError::Api { reason, .. }) => assert!(reason.contains("items")),
            plot_twist => panic!("💀 expected an Api error, got {plot_twist:?}"),
        }
    }

    #[tokio::test]
    async fn the_one_where_the_token_is_a_number_for_some_reason() {
        let pages = InMemoryPages::new().with_page(
            Resource::Videos,
            "abc",
            None,
            json!({"items": [], "nextPageToken": 42}),
        );

        let mut paginator = Paginator::new(&pages, Resource::Videos, "abc");
        let err = paginator
            .next_item()
            .await
            .expect_err("💀 a numeric token is not a token");

        assert!(matches!(YtxError::find(&err), Some(YtxError::Api { .. })));
    }

    #[tokio::test]
    async fn the_one_where_an_empty_token_is_the_last_page_not_a_loop() -> Result<()> {
        let pages = InMemoryPages::new().with_page(
            Resource::PlaylistItems,
            "PL",
            None,
            json!({"items": [{"id": "only"}], "nextPageToken": ""}),
        );

        let mut paginator = Paginator::new(&pages, Resource::PlaylistItems, "PL");
        let items = drain(&mut paginator).await?;

        assert_eq!(items, vec![json!({"id": "only"})]);
        assert_eq!(pages.requested_tokens(), vec![None]);
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_a_second_paginator_starts_over_from_page_one() -> Result<()> {
        let pages = InMemoryPages::new()
            .with_page(
                Resource::PlaylistItems,
                "PL",
                None,
                json!({"items": ["a"], "nextPageToken": "p2"}),
            )
            .with_page(Resource::PlaylistItems, "PL", Some("p2"), json!({"items": ["b"]}));

        let first_pass = drain(&mut Paginator::new(&pages, Resource::PlaylistItems, "PL")).await?;
        let second_pass = drain(&mut Paginator::new(&pages, Resource::PlaylistItems, "PL")).await?;

        assert_eq!(first_pass, second_pass);
        assert_eq!(
            pages.requested_tokens(),
            vec![None, Some("p2".to_string()), None, Some("p2".to_string())]
        );
        Ok(())
    }
}
