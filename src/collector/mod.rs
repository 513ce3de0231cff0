//! Article collection from the Naver news search API.
//!
//! Collection is the only networked part of the crate and is kept apart
//! from the analysis pipeline, which only ever reads corpus files.
//!
//! # Flow
//!
//! 1. [`SearchRequest::page_starts`] lists the page start indices
//! 2. Pages are fetched a few at a time through [`RetryFetch`]
//! 3. Failed pages are logged and skipped; the run continues
//! 4. Items become [`Article`]s, duplicates by link are dropped
//! 5. The caller writes the result with [`crate::corpus::write_corpus`]

pub mod naver;
pub mod retry;

pub use naver::{parse_page, Credentials, NaverClient, SearchRequest, SortOrder, NAVER_NEWS_ENDPOINT};
pub use retry::{FetchPage, RetryFetch};

use crate::models::Article;
use futures::stream::{self, StreamExt};
use rustc_hash::FxHashSet;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Pages requested concurrently; the API allows about ten calls per second.
pub const CONCURRENT_PAGES: usize = 3;

/// Fetch every page and convert the items to articles, in page order.
///
/// # Arguments
///
/// * `fetcher` - Page source, usually a retrying Naver client
/// * `starts` - 1-based `start` offsets, one per page
///
/// # Returns
///
/// Articles from every page that succeeded, duplicates by link removed.
/// Failed pages are logged and skipped.
#[instrument(level = "info", skip(fetcher), fields(pages = starts.len()))]
pub async fn collect_articles<F: FetchPage>(fetcher: &F, starts: &[u32]) -> Vec<Article> {
    let t0 = Instant::now();
    let pages: Vec<_> = stream::iter(starts.iter().copied())
        .map(|start| async move { (start, fetcher.fetch_page(start).await) })
        .buffered(CONCURRENT_PAGES)
        .collect()
        .await;

    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut articles = Vec::new();
    let mut failed_pages = 0usize;
    let mut bad_items = 0usize;

    for (start, page) in pages {
        let page = match page {
            Ok(page) => page,
            Err(e) => {
                failed_pages += 1;
                warn!(start, error = %e, "Skipping page");
                continue;
            }
        };
        for item in page.items {
            let key = if item.link.is_empty() { item.originallink.clone() } else { item.link.clone() };
            match Article::try_from(item) {
                Ok(article) => {
                    if key.is_empty() || seen.insert(key) {
                        articles.push(article);
                    }
                }
                Err(e) => {
                    bad_items += 1;
                    warn!(start, error = %e, "Skipping item with unparseable pubDate");
                }
            }
        }
    }

    info!(
        count = articles.len(),
        failed_pages,
        bad_items,
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "Collected articles"
    );
    articles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CollectError;
    use crate::models::{NaverNewsItem, NaverSearchResponse};

    /// Serves canned pages; start 201 always fails.
    struct Canned;

    fn item(n: u32, link: &str) -> NaverNewsItem {
        NaverNewsItem {
            title: format!("기사 {n}"),
            originallink: String::new(),
            link: link.to_string(),
            description: "케이팝 데몬 헌터스".to_string(),
            pubDate: "Mon, 23 Jun 2025 09:12:00 +0900".to_string(),
        }
    }

    impl FetchPage for Canned {
        async fn fetch_page(&self, start: u32) -> Result<NaverSearchResponse, CollectError> {
            if start == 201 {
                return Err(CollectError::Status { status: 401 });
            }
            let mut items = vec![item(start, &format!("https://n.news.naver.com/{start}"))];
            if start == 101 {
                // Same article as page 1, seen again after new items shifted the listing
                items.push(item(1, "https://n.news.naver.com/1"));
                let mut bad = item(start + 1, "https://n.news.naver.com/bad");
                bad.pubDate = "sometime".to_string();
                items.push(bad);
            }
            Ok(NaverSearchResponse {
                lastBuildDate: String::new(),
                total: 300,
                start,
                display: 100,
                items,
            })
        }
    }

    #[tokio::test]
    async fn test_collect_skips_failed_pages_and_duplicates() {
        let articles = collect_articles(&Canned, &[1, 101, 201, 301]).await;
        let titles: Vec<&str> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["기사 1", "기사 101", "기사 301"]);
        assert!(articles.iter().all(|a| a.link.is_some()));
    }

    #[tokio::test]
    async fn test_collect_with_no_pages() {
        assert!(collect_articles(&Canned, &[]).await.is_empty());
    }
}
