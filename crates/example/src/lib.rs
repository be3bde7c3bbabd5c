//! Example live search built with Ripple.
//!
//! A query signal drives a search resource. Every keystroke supersedes the
//! in-flight search: its cleanup logs the cancellation, its abort signal
//! stops the simulated backend early, and its result, should it still
//! arrive, is discarded.
//!
//! ```text
//!  query: Signal<String>
//!        │  track
//!        ▼
//!  ┌──────────────┐  state   ┌──────────────────┐
//!  │   Resource   │─────────▶│ ResourceRenderer │──▶ frame
//!  │ search(query)│          │ pending/ok/error │
//!  └──────────────┘          └──────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use ripple_reactive::Signal;
use ripple_resource::{AbortSignal, Resource, ResourceError, ResourceOptions, ResourceRenderer};

/// Errors returned by the simulated search backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The query was empty after trimming.
    #[error("empty query")]
    EmptyQuery,
    /// The search was cancelled before the backend answered.
    #[error("search for '{0}' cancelled")]
    Cancelled(String),
}

/// An in-memory catalog searched by substring.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Arc<[String]>,
    latency: Duration,
}

impl Catalog {
    /// Creates a catalog that answers after `latency`.
    pub fn new<I, S>(entries: I, latency: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
            latency,
        }
    }

    /// A small catalog of fruit.
    #[must_use]
    pub fn fruit(latency: Duration) -> Self {
        Self::new(
            [
                "apple",
                "apricot",
                "banana",
                "blackberry",
                "blueberry",
                "cherry",
                "grape",
                "grapefruit",
                "lemon",
                "lime",
                "mango",
                "pineapple",
            ],
            latency,
        )
    }

    /// Returns every entry containing `query`, case-insensitively.
    ///
    /// Resolves after the catalog's latency unless `signal` fires first.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::EmptyQuery`] for a blank query and
    /// [`SearchError::Cancelled`] if `signal` fires while waiting.
    pub async fn search(
        &self,
        query: &str,
        signal: &AbortSignal,
    ) -> Result<Vec<String>, SearchError> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        tokio::select! {
            () = signal.cancelled() => Err(SearchError::Cancelled(needle)),
            () = tokio::time::sleep(self.latency) => Ok(self
                .entries
                .iter()
                .filter(|entry| entry.contains(&needle))
                .cloned()
                .collect()),
        }
    }
}

/// Creates a resource that searches `catalog` for the current `query`.
pub fn search_resource(
    catalog: Catalog,
    query: &Signal<String>,
) -> Resource<Vec<String>, SearchError> {
    let query = query.clone();
    Resource::with_options(
        move |ctx| {
            let catalog = catalog.clone();
            let text = ctx.track_signal(&query);
            let generation = ctx.generation();
            {
                let text = text.clone();
                ctx.cleanup(move || {
                    tracing::debug!(generation, query = %text, "search superseded");
                });
            }
            let signal = ctx.signal();
            async move { catalog.search(&text, &signal).await }
        },
        ResourceOptions::new()
            .with_name("search")
            .with_timeout(Duration::from_secs(5)),
    )
}

/// Renders search state as a single status line.
#[must_use]
pub fn results_renderer() -> ResourceRenderer<Vec<String>, SearchError, String> {
    ResourceRenderer::new()
        .on_pending(|| "searching...".to_string())
        .on_resolved(|hits: &Vec<String>| match hits.len() {
            0 => "no matches".to_string(),
            n => format!("{n} match(es): {}", hits.join(", ")),
        })
        .on_rejected(|error: &ResourceError<SearchError>| match error.failure() {
            Some(SearchError::EmptyQuery) => "type something to search".to_string(),
            _ => format!("search failed: {error}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::fruit(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn search_matches_substrings() {
        let hits = catalog()
            .search("Berry", &AbortSignal::new())
            .await
            .expect("search");
        assert_eq!(hits, vec!["blackberry", "blueberry"]);
    }

    #[tokio::test]
    async fn blank_query_is_rejected() {
        let result = catalog().search("  ", &AbortSignal::new()).await;
        assert_eq!(result, Err(SearchError::EmptyQuery));
    }

    #[tokio::test]
    async fn cancelled_search_stops_early() {
        let slow = Catalog::fruit(Duration::from_secs(60));
        let signal = AbortSignal::new();
        signal.cancel();

        let result = slow.search("lime", &signal).await;
        assert_eq!(result, Err(SearchError::Cancelled("lime".into())));
    }

    #[tokio::test]
    async fn resource_follows_query() {
        let query = Signal::new("ap".to_string());
        let resource = search_resource(catalog(), &query);
        let renderer = results_renderer();

        let state = resource.settled().await;
        assert_eq!(
            renderer.render(&state).as_deref(),
            Some("5 match(es): apple, apricot, grape, grapefruit, pineapple")
        );

        query.set(String::new());
        let state = resource.settled().await;
        assert_eq!(
            renderer.render(&state).as_deref(),
            Some("type something to search")
        );
        assert_eq!(resource.generation(), 1);
    }
}
