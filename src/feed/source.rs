//! Feed sources: where pages of items actually come from.
//!
//! A [`FeedSource`] resolves one [`FeedQuery`] to one page of items with a
//! single attempt. There is no retry or backoff at this boundary; the
//! controller never re-issues a failed fetch on its own, so any resilience
//! belongs to the caller. Timeouts are this layer's responsibility.

use super::{FeedItem, FeedKind, FeedQuery};
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Response bodies larger than this are rejected outright.
const MAX_BODY_SIZE: usize = 2 * 1024 * 1024; // 2MB

/// Errors from a single page fetch.
///
/// The controller treats this type as opaque; the variants exist so the
/// status line can show something more useful than "fetch error".
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Response body exceeded the size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Response body was not a valid item list
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
    /// The configured endpoint could not be combined with the feed path
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Asynchronous provider of feed pages.
///
/// One query in, one page of items (or an error) out. Implementations are
/// injected into the app explicitly; there is no process-wide instance.
pub trait FeedSource: Send + Sync {
    fn fetch(&self, query: FeedQuery) -> BoxFuture<'static, Result<Vec<FeedItem>, FetchError>>;
}

// ============================================================================
// HTTP Source
// ============================================================================

/// Fetches feed pages from an HTTP endpoint as JSON.
///
/// Issues `GET {endpoint}/feed?page=N&tab=N[&q=...]` and expects a JSON
/// array of items. Single attempt per fetch, bounded body size, per-request
/// timeout.
pub struct HttpFeedSource {
    client: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
}

impl HttpFeedSource {
    pub fn new(client: reqwest::Client, endpoint: Url, timeout: Duration) -> Self {
        Self {
            client,
            endpoint,
            timeout,
        }
    }

    async fn fetch_page(
        client: reqwest::Client,
        endpoint: Url,
        timeout: Duration,
        query: FeedQuery,
    ) -> Result<Vec<FeedItem>, FetchError> {
        let url = endpoint.join("feed")?;
        let mut request = client.get(url).query(&[
            ("page", query.page.to_string()),
            ("tab", query.tab_index.to_string()),
        ]);
        if !query.search_text.is_empty() {
            request = request.query(&[("q", query.search_text.as_str())]);
        }

        let response = tokio::time::timeout(timeout, request.send())
            .await
            .map_err(|_| FetchError::Timeout)?
            .map_err(FetchError::Network)?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        let bytes = read_limited_bytes(response, MAX_BODY_SIZE).await?;
        let items: Vec<FeedItem> = serde_json::from_slice(&bytes)?;

        tracing::debug!(
            page = query.page,
            tab = query.tab_index,
            count = items.len(),
            "Fetched feed page"
        );
        Ok(items)
    }
}

impl FeedSource for HttpFeedSource {
    fn fetch(&self, query: FeedQuery) -> BoxFuture<'static, Result<Vec<FeedItem>, FetchError>> {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let timeout = self.timeout;
        Box::pin(Self::fetch_page(client, endpoint, timeout, query))
    }
}

/// Read a response body while enforcing a size cap.
async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: trust Content-Length when present
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

// ============================================================================
// Sample Source
// ============================================================================

/// In-process deterministic source for offline and demo runs.
///
/// Each tab carries a fixed catalog of two and a half pages, so load-more
/// and the exhausted-feed path are both exercisable without a server.
/// Search filters the catalog by case-insensitive substring match on title
/// and source before paging.
pub struct SampleFeedSource {
    page_size: usize,
    /// Artificial delay per fetch; zero in tests.
    latency: Duration,
}

const SAMPLE_HEADLINES: &[(&str, FeedKind)] = &[
    ("Morning briefing: what moved overnight", FeedKind::NewsArticle),
    ("Inside the launch control room", FeedKind::Video),
    ("Senior Rust engineer, distributed systems", FeedKind::JobPosting),
    ("City council approves transit expansion", FeedKind::NewsArticle),
    ("Field report: monsoon season logistics", FeedKind::NewsArticle),
    ("Keynote highlights in four minutes", FeedKind::Video),
    ("Backend developer, payments platform", FeedKind::JobPosting),
    ("Markets close mixed after rate decision", FeedKind::NewsArticle),
];

const SAMPLE_SOURCES: &[&str] = &["Daily Wire Desk", "Metro Herald", "TechCast", "OpenRoles"];

impl SampleFeedSource {
    pub fn new(page_size: usize, latency: Duration) -> Self {
        Self { page_size, latency }
    }

    /// Total catalog size per tab: enough for two full pages plus a partial
    /// third, so the third load-more returns a short page.
    fn catalog_len(&self) -> usize {
        self.page_size * 2 + self.page_size / 2
    }

    fn catalog(&self, tab_index: usize) -> Vec<FeedItem> {
        let now = Utc::now();
        (0..self.catalog_len())
            .map(|i| {
                let (headline, kind) = SAMPLE_HEADLINES[(i + tab_index) % SAMPLE_HEADLINES.len()];
                let source = SAMPLE_SOURCES[(i + tab_index) % SAMPLE_SOURCES.len()];
                let published = now - chrono::Duration::minutes(30 * (i as i64 + 1));
                FeedItem {
                    kind,
                    title: format!("{} ({})", headline, i + 1),
                    source: source.to_string(),
                    time_ago: time_ago(published, now),
                    image_url: None,
                }
            })
            .collect()
    }

    fn page(&self, query: &FeedQuery) -> Vec<FeedItem> {
        let needle = query.search_text.to_lowercase();
        let matches: Vec<FeedItem> = self
            .catalog(query.tab_index)
            .into_iter()
            .filter(|item| {
                needle.is_empty()
                    || item.title.to_lowercase().contains(&needle)
                    || item.source.to_lowercase().contains(&needle)
            })
            .collect();

        let start = (query.page.saturating_sub(1) as usize).saturating_mul(self.page_size);
        matches
            .into_iter()
            .skip(start)
            .take(self.page_size)
            .collect()
    }
}

impl FeedSource for SampleFeedSource {
    fn fetch(&self, query: FeedQuery) -> BoxFuture<'static, Result<Vec<FeedItem>, FetchError>> {
        let items = self.page(&query);
        let latency = self.latency;
        Box::pin(async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            Ok(items)
        })
    }
}

/// Format a published timestamp relative to `now` ("just now", "5m ago",
/// "3h ago", "2d ago").
fn time_ago(published: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(published);
    if elapsed.num_minutes() < 1 {
        "just now".to_string()
    } else if elapsed.num_hours() < 1 {
        format!("{}m ago", elapsed.num_minutes())
    } else if elapsed.num_days() < 1 {
        format!("{}h ago", elapsed.num_hours())
    } else {
        format!("{}d ago", elapsed.num_days())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE_JSON: &str = r#"[
        {"kind": "news_article", "title": "Headline", "source": "Wire", "time_ago": "1h ago"},
        {"kind": "video", "title": "Clip", "source": "Cast", "time_ago": "2h ago",
         "image_url": "https://example.com/thumb.jpg"}
    ]"#;

    fn http_source(uri: &str) -> HttpFeedSource {
        HttpFeedSource::new(
            reqwest::Client::new(),
            Url::parse(uri).unwrap(),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_http_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .and(query_param("page", "1"))
            .and(query_param("tab", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE_JSON))
            .mount(&server)
            .await;

        let source = http_source(&format!("{}/", server.uri()));
        let items = source.fetch(FeedQuery::default()).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].kind, FeedKind::NewsArticle);
        assert_eq!(items[1].image_url.as_deref(), Some("https://example.com/thumb.jpg"));
    }

    #[tokio::test]
    async fn test_http_fetch_forwards_search_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .and(query_param("q", "ai"))
            .and(query_param("page", "3"))
            .and(query_param("tab", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .mount(&server)
            .await;

        let source = http_source(&format!("{}/", server.uri()));
        let items = source.fetch(FeedQuery::new(3, 2, "ai")).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_http_fetch_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let source = http_source(&format!("{}/", server.uri()));
        match source.fetch(FeedQuery::default()).await {
            Err(FetchError::HttpStatus(503)) => {}
            other => panic!("Expected HttpStatus(503), got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_fetch_no_retry_on_server_error() {
        // A single attempt only: the mock counts requests.
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let source = http_source(&format!("{}/", server.uri()));
        assert!(source.fetch(FeedQuery::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_http_fetch_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"not\": \"a list\"}"))
            .mount(&server)
            .await;

        let source = http_source(&format!("{}/", server.uri()));
        match source.fetch(FeedQuery::default()).await {
            Err(FetchError::Decode(_)) => {}
            other => panic!("Expected Decode error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_fetch_oversized_body_rejected() {
        let server = MockServer::start().await;
        let body = "x".repeat(MAX_BODY_SIZE + 1);
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let source = http_source(&format!("{}/", server.uri()));
        match source.fetch(FeedQuery::default()).await {
            Err(FetchError::ResponseTooLarge) => {}
            other => panic!("Expected ResponseTooLarge, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_sample_full_page_then_partial_then_empty() {
        let source = SampleFeedSource::new(8, Duration::ZERO);

        let page1 = source.fetch(FeedQuery::new(1, 0, "")).await.unwrap();
        assert_eq!(page1.len(), 8);
        let page2 = source.fetch(FeedQuery::new(2, 0, "")).await.unwrap();
        assert_eq!(page2.len(), 8);
        let page3 = source.fetch(FeedQuery::new(3, 0, "")).await.unwrap();
        assert_eq!(page3.len(), 4); // Partial trailing page
        let page4 = source.fetch(FeedQuery::new(4, 0, "")).await.unwrap();
        assert!(page4.is_empty());
    }

    #[tokio::test]
    async fn test_sample_search_filters_catalog() {
        let source = SampleFeedSource::new(8, Duration::ZERO);
        let items = source.fetch(FeedQuery::new(1, 0, "rust")).await.unwrap();
        assert!(!items.is_empty());
        for item in &items {
            assert!(item.title.to_lowercase().contains("rust"));
        }

        let none = source
            .fetch(FeedQuery::new(1, 0, "zzz-no-such-term"))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_sample_tabs_differ() {
        let source = SampleFeedSource::new(8, Duration::ZERO);
        let tab0 = source.fetch(FeedQuery::new(1, 0, "")).await.unwrap();
        let tab1 = source.fetch(FeedQuery::new(1, 1, "")).await.unwrap();
        assert_ne!(tab0[0].title, tab1[0].title);
    }

    #[test]
    fn test_time_ago_buckets() {
        let now = Utc::now();
        assert_eq!(time_ago(now, now), "just now");
        assert_eq!(time_ago(now - chrono::Duration::minutes(5), now), "5m ago");
        assert_eq!(time_ago(now - chrono::Duration::hours(3), now), "3h ago");
        assert_eq!(time_ago(now - chrono::Duration::days(2), now), "2d ago");
    }
}
