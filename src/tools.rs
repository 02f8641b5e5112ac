//! # Tools Module
//!
//! The web search tool the research agent calls, backed by the Tavily
//! Search API. It demonstrates:
//! - Trait implementation (Rig's Tool trait)
//! - Typed HTTP error mapping with thiserror
//! - Serde for the request and response bodies

use reqwest::Client;
use rig::completion::ToolDefinition;
use rig::tool::Tool;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Public Tavily endpoint.
pub const DEFAULT_TAVILY_BASE_URL: &str = "https://api.tavily.com";

/// Result cap for every search.
pub const DEFAULT_MAX_RESULTS: usize = 5;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// CUSTOM ERROR TYPE
// =============================================================================
/// Failures from the search backend.
///
/// None of these are retried. They bubble up through the Rig agent and end
/// the research participant's turn.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Unauthorized - check the Tavily API key")]
    Unauthorized,

    #[error("Rate limited by search provider")]
    RateLimited,

    #[error("Search request rejected ({status}): {body}")]
    Http { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to parse search response: {0}")]
    Parse(String),
}

// =============================================================================
// SEARCH RESULT STRUCT
// =============================================================================
/// A single ranked search hit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    /// Extracted snippet of the page.
    pub content: String,
    /// Relevance in `0.0..=1.0`.
    #[serde(default)]
    pub score: f64,
}

impl SearchResult {
    fn to_markdown(&self, rank: usize) -> String {
        format!(
            "{}. **{}**\n   URL: {}\n   Relevance: {:.0}%\n   {}\n",
            rank,
            self.title,
            self.url,
            self.score * 100.0,
            self.content
        )
    }
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    max_results: usize,
    search_depth: &'static str,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

// =============================================================================
// WEB SEARCH TOOL
// =============================================================================
/// Tavily-backed web search.
///
/// The API key is passed in explicitly; nothing is read from or written to
/// the process environment.
///
/// Rig hands a failed tool call back to the model as text and keeps going,
/// so `call` also records the failure. Clones share the slot; use
/// [`TavilySearchTool::for_turn`] to get a copy with an empty one.
#[derive(Clone)]
pub struct TavilySearchTool {
    api_key: String,
    base_url: String,
    max_results: usize,
    client: Client,
    failure: Arc<Mutex<Option<String>>>,
}

impl TavilySearchTool {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_TAVILY_BASE_URL.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            client: http_client(),
            failure: Arc::new(Mutex::new(None)),
        }
    }

    /// A copy sharing the HTTP client but with a fresh failure slot.
    pub fn for_turn(&self) -> Self {
        Self {
            failure: Arc::new(Mutex::new(None)),
            ..self.clone()
        }
    }

    /// The first search failure since this slot was created, if any.
    /// Clears the slot.
    pub fn take_failure(&self) -> Option<String> {
        match self.failure.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }

    fn record_failure(&self, error: &SearchError) {
        let mut slot = match self.failure.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        if slot.is_none() {
            *slot = Some(error.to_string());
        }
    }

    /// Point the tool at another endpoint (a proxy, or a mock server in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Run one search and return at most `max_results` hits, best first.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        info!(query = %query, "Performing web search");

        let url = format!("{}/search", self.base_url);
        debug!(url = %url, max_results = self.max_results, "Sending Tavily request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&TavilyRequest {
                query,
                max_results: self.max_results,
                search_depth: "basic",
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 => SearchError::Unauthorized,
                429 => SearchError::RateLimited,
                code => SearchError::Http { status: code, body },
            });
        }

        let body = response.text().await?;
        let parsed: TavilyResponse =
            serde_json::from_str(&body).map_err(|e| SearchError::Parse(e.to_string()))?;

        let results: Vec<SearchResult> = parsed.results.into_iter().take(self.max_results).collect();

        if results.is_empty() {
            warn!(query = %query, "No search results found");
        } else {
            info!(query = %query, count = results.len(), "Search completed");
        }

        Ok(results)
    }
}

/// Client with the request timeout; falls back to reqwest's defaults (no
/// timeout) only if the TLS backend cannot be initialised.
fn http_client() -> Client {
    match Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "Failed to build search client with timeout, using defaults");
            Client::new()
        }
    }
}

// Keeps the API key out of logs.
impl std::fmt::Debug for TavilySearchTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TavilySearchTool")
            .field("base_url", &self.base_url)
            .field("max_results", &self.max_results)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// RIG TOOL TRAIT IMPLEMENTATION
// =============================================================================
/// Input arguments for the search tool.
#[derive(Debug, Deserialize, Serialize)]
pub struct SearchArgs {
    pub query: String,
}

/// Format hits for the model.
pub fn format_results(query: &str, results: &[SearchResult]) -> String {
    if results.is_empty() {
        return format!("No results found for: {}", query);
    }

    let formatted = results
        .iter()
        .enumerate()
        .map(|(i, r)| r.to_markdown(i + 1))
        .collect::<Vec<_>>()
        .join("\n");

    format!("## Search Results for: {}\n\n{}", query, formatted)
}

impl Tool for TavilySearchTool {
    const NAME: &'static str = "tavily_search";

    type Args = SearchArgs;
    type Output = String;
    type Error = SearchError;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Search the web for market data, competitors, pricing and news about a business idea. Returns ranked pages with snippets.".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query to run"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        match self.search(&args.query).await {
            Ok(results) => Ok(format_results(&args.query, &results)),
            Err(e) => {
                warn!(query = %args.query, error = %e, "Search tool call failed");
                self.record_failure(&e);
                Err(e)
            }
        }
    }
}


/// HTTP tests against a mock Tavily server.
#[cfg(test)]
mod http_tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn results_body(count: usize) -> serde_json::Value {
        let results: Vec<serde_json::Value> = (0..count)
            .map(|i| {
                serde_json::json!({
                    "title": format!("Result {}", i),
                    "url": format!("https://example.com/{}", i),
                    "content": "Specialty coffee subscriptions grew 12% last year.",
                    "score": 0.9
                })
            })
            .collect();
        serde_json::json!({ "query": "coffee", "results": results })
    }

    #[tokio::test]
    async fn test_search_sends_key_and_cap() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({ "query": "coffee", "max_results": 5 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(results_body(2)))
            .expect(1)
            .mount(&server)
            .await;

        let tool = TavilySearchTool::new("test-key").with_base_url(server.uri());
        let results = tool.search("coffee").await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Result 0");
    }

    #[tokio::test]
    async fn test_search_truncates_to_cap() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(results_body(8)))
            .mount(&server)
            .await;

        let tool = TavilySearchTool::new("k").with_base_url(server.uri());
        let results = tool.search("coffee").await.unwrap();

        assert_eq!(results.len(), DEFAULT_MAX_RESULTS);
    }

    #[tokio::test]
    async fn test_search_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
            .expect(1)
            .mount(&server)
            .await;

        let tool = TavilySearchTool::new("bad-key").with_base_url(server.uri());
        let err = tool.search("coffee").await.unwrap_err();

        assert!(matches!(err, SearchError::Unauthorized));
    }

    #[tokio::test]
    async fn test_search_rate_limited_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(429))
            .expect(1)
            .mount(&server)
            .await;

        let tool = TavilySearchTool::new("k").with_base_url(server.uri());
        let err = tool.search("coffee").await.unwrap_err();

        assert!(matches!(err, SearchError::RateLimited));
    }

    #[tokio::test]
    async fn test_search_server_error_keeps_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let tool = TavilySearchTool::new("k").with_base_url(server.uri());
        let err = tool.search("coffee").await.unwrap_err();

        match err {
            SearchError::Http { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_search_malformed_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let tool = TavilySearchTool::new("k").with_base_url(server.uri());
        let err = tool.search("coffee").await.unwrap_err();

        assert!(matches!(err, SearchError::Parse(_)));
    }

    #[tokio::test]
    async fn test_tool_call_formats_results() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(results_body(1)))
            .mount(&server)
            .await;

        let tool = TavilySearchTool::new("k").with_base_url(server.uri());
        let output = tool
            .call(SearchArgs { query: "coffee".to_string() })
            .await
            .unwrap();

        assert!(output.contains("## Search Results for: coffee"));
        assert!(output.contains("Specialty coffee subscriptions"));
        assert_eq!(tool.take_failure(), None);
    }

    #[tokio::test]
    async fn test_failed_call_is_recorded_for_the_turn() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(500).set_body_string("search backend down"))
            .mount(&server)
            .await;

        let base = TavilySearchTool::new("k").with_base_url(server.uri());
        let turn_tool = base.for_turn();
        // The agent owns a clone; it must report into the same slot.
        let agent_copy = turn_tool.clone();

        let result = agent_copy
            .call(SearchArgs { query: "coffee".to_string() })
            .await;
        assert!(result.is_err());

        let failure = turn_tool.take_failure().unwrap();
        assert!(failure.contains("500"));
        assert!(failure.contains("search backend down"));

        // Taken once; other turns never see it.
        assert_eq!(turn_tool.take_failure(), None);
        assert_eq!(base.take_failure(), None);
    }

    #[tokio::test]
    async fn test_first_failure_wins() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(401))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let tool = TavilySearchTool::new("k").with_base_url(server.uri()).for_turn();
        for _ in 0..2 {
            let _ = tool.call(SearchArgs { query: "coffee".to_string() }).await;
        }

        assert_eq!(
            tool.take_failure().as_deref(),
            Some("Unauthorized - check the Tavily API key")
        );
    }
}
