//! Web and news search over a SearXNG-compatible JSON endpoint, plus page fetch.

use super::args::decode_args;
use super::http::build_client;
use super::ToolId;
use crate::agent::Tool;
use crate::config::SearchSettings;
use crate::error::{PalaverError, Result};
use crate::llm::{ParamKind, ToolDescriptor};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// SearXNG result category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    General,
    News,
    Images,
}

impl Category {
    fn as_str(&self) -> &'static str {
        match self {
            Category::General => "general",
            Category::News => "news",
            Category::Images => "images",
        }
    }
}

/// One search result. Field names follow the SearXNG JSON format.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "publishedDate")]
    pub published_date: Option<String>,
    pub source: Option<String>,
    pub engine: Option<String>,
    pub img_src: Option<String>,
}

impl SearchHit {
    fn title_or_default(&self) -> &str {
        non_empty(&self.title).unwrap_or("No title")
    }

    fn snippet(&self) -> &str {
        non_empty(&self.content).unwrap_or("No description")
    }

    fn source_name(&self) -> &str {
        self.source
            .as_deref()
            .or(self.engine.as_deref())
            .and_then(non_empty)
            .unwrap_or("Unknown source")
    }

    fn date(&self) -> &str {
        self.published_date
            .as_deref()
            .and_then(non_empty)
            .unwrap_or("Unknown date")
    }

    fn format_web(&self, index: usize) -> String {
        format!(
            "[{}] Title: {}\nSnippet: {}\nURL: {}",
            index,
            self.title_or_default(),
            self.snippet(),
            self.url
        )
    }

    fn format_news(&self, index: usize) -> String {
        format!(
            "[{}] Title: {}\nSource: {}\nDate: {}\nSnippet: {}\nURL: {}",
            index,
            self.title_or_default(),
            self.source_name(),
            self.date(),
            self.snippet(),
            self.url
        )
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

/// Client for the search instance and for fetching arbitrary pages.
pub struct SearchClient {
    http: Client,
    base_url: Url,
    fetch_max_chars: usize,
}

impl SearchClient {
    pub fn new(settings: &SearchSettings) -> Result<Self> {
        Ok(Self {
            http: build_client(
                Duration::from_secs(settings.timeout_secs),
                Some(&settings.user_agent),
            )?,
            base_url: Url::parse(&settings.base_url)?,
            fetch_max_chars: settings.fetch_max_chars,
        })
    }

    /// HTTP client carrying the browser user agent.
    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Up to `limit` hits for `query` in `category`.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, category: Category, limit: usize) -> Result<Vec<SearchHit>> {
        let url = self.base_url.join("search")?;
        debug!("GET {} q={}", url, query);
        let response: SearchResponse = self
            .http
            .get(url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("categories", category.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut hits = response.results;
        hits.truncate(limit);
        debug!("{} hits", hits.len());
        Ok(hits)
    }

    pub async fn web(&self, query: &str, limit: usize) -> Result<String> {
        let hits = self.search(query, Category::General, limit).await?;
        if hits.is_empty() {
            return Ok(format!("No results found for: {}", query));
        }
        Ok(join_numbered(&hits, SearchHit::format_web))
    }

    pub async fn news(&self, query: &str, limit: usize) -> Result<String> {
        let hits = self.search(query, Category::News, limit).await?;
        if hits.is_empty() {
            return Ok(format!("No news found for: {}", query));
        }
        Ok(join_numbered(&hits, SearchHit::format_news))
    }

    /// First characters of the page body.
    #[instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let url = Url::parse(url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(PalaverError::InvalidInput(format!(
                "unsupported URL scheme: {}",
                url.scheme()
            )));
        }
        let body = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body.chars().take(self.fetch_max_chars).collect())
    }
}

fn join_numbered(hits: &[SearchHit], format: fn(&SearchHit, usize) -> String) -> String {
    hits.iter()
        .enumerate()
        .map(|(i, hit)| format(hit, i + 1))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[derive(Debug, Deserialize)]
struct QueryArgs {
    query: String,
}

#[derive(Debug, Deserialize)]
struct FetchArgs {
    url: String,
}

/// `web_search`, `news_search` or `fetch_url`.
pub struct WebTool {
    id: ToolId,
    descriptor: ToolDescriptor,
    client: Arc<SearchClient>,
    num_results: usize,
}

impl WebTool {
    pub fn web_search(client: Arc<SearchClient>, num_results: u32) -> Self {
        Self {
            id: ToolId::WebSearch,
            descriptor: ToolDescriptor::new(
                ToolId::WebSearch.as_str(),
                "Search the web and return results with titles, snippets and URLs",
            )
            .required("query", ParamKind::String, "The search query"),
            client,
            num_results: num_results as usize,
        }
    }

    pub fn news_search(client: Arc<SearchClient>, num_results: u32) -> Self {
        Self {
            id: ToolId::NewsSearch,
            descriptor: ToolDescriptor::new(
                ToolId::NewsSearch.as_str(),
                "Search for recent news and return titles, sources, dates, snippets and URLs",
            )
            .required("query", ParamKind::String, "The search query"),
            client,
            num_results: num_results as usize,
        }
    }

    pub fn fetch_url(client: Arc<SearchClient>) -> Self {
        Self {
            id: ToolId::FetchUrl,
            descriptor: ToolDescriptor::new(
                ToolId::FetchUrl.as_str(),
                "Fetch content from a URL and return the start of its text",
            )
            .required("url", ParamKind::String, "The URL to fetch"),
            client,
            num_results: 0,
        }
    }
}

#[async_trait]
impl Tool for WebTool {
    fn id(&self) -> ToolId {
        self.id
    }

    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn error_context(&self) -> &'static str {
        match self.id {
            ToolId::NewsSearch => "searching news",
            ToolId::FetchUrl => "fetching URL",
            _ => "searching",
        }
    }

    async fn call(&self, arguments: &Value) -> Result<String> {
        match self.id {
            ToolId::FetchUrl => {
                let args: FetchArgs = decode_args(self.id, arguments)?;
                self.client.fetch(&args.url).await
            }
            ToolId::NewsSearch => {
                let args: QueryArgs = decode_args(self.id, arguments)?;
                self.client.news(&args.query, self.num_results).await
            }
            _ => {
                let args: QueryArgs = decode_args(self.id, arguments)?;
                self.client.web(&args.query, self.num_results).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> Arc<SearchClient> {
        let settings = SearchSettings {
            base_url: server.uri(),
            fetch_max_chars: 10,
            ..SearchSettings::default()
        };
        Arc::new(SearchClient::new(&settings).unwrap())
    }

    #[tokio::test]
    async fn test_web_search_formats_and_truncates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "rust async"))
            .and(query_param("format", "json"))
            .and(query_param("categories", "general"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {"title": "Tokio", "content": "An async runtime", "url": "https://tokio.rs"},
                    {"title": "", "url": "https://example.com"},
                    {"title": "Third", "content": "dropped", "url": "https://three.example"}
                ]
            })))
            .mount(&server)
            .await;

        let tool = WebTool::web_search(client(&server), 2);
        let result = tool.call(&json!({"query": "rust async"})).await.unwrap();
        assert_eq!(
            result,
            "[1] Title: Tokio\nSnippet: An async runtime\nURL: https://tokio.rs\n\n\
             [2] Title: No title\nSnippet: No description\nURL: https://example.com"
        );
    }

    #[tokio::test]
    async fn test_news_search_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("categories", "news"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {"title": "Launch", "content": "It flew", "url": "https://news.example/1",
                     "publishedDate": "2026-10-15T08:00:00", "engine": "bing news"}
                ]
            })))
            .mount(&server)
            .await;

        let tool = WebTool::news_search(client(&server), 10);
        let result = tool.call(&json!({"query": "launch"})).await.unwrap();
        assert_eq!(
            result,
            "[1] Title: Launch\nSource: bing news\nDate: 2026-10-15T08:00:00\nSnippet: It flew\nURL: https://news.example/1"
        );
    }

    #[tokio::test]
    async fn test_empty_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .mount(&server)
            .await;

        let web = WebTool::web_search(client(&server), 10);
        assert_eq!(
            web.call(&json!({"query": "zzz"})).await.unwrap(),
            "No results found for: zzz"
        );
        let news = WebTool::news_search(client(&server), 10);
        assert_eq!(
            news.call(&json!({"query": "zzz"})).await.unwrap(),
            "No news found for: zzz"
        );
    }

    #[tokio::test]
    async fn test_fetch_url_truncates_and_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string("héllo wörld, long page"))
            .mount(&server)
            .await;

        let tool = WebTool::fetch_url(client(&server));
        let result = tool
            .call(&json!({"url": format!("{}/page", server.uri())}))
            .await
            .unwrap();
        assert_eq!(result, "héllo wörl");

        let requests = server.received_requests().await.unwrap();
        let user_agent = requests[0].headers.get("user-agent").unwrap();
        assert_eq!(user_agent.to_str().unwrap(), SearchSettings::default().user_agent);
    }

    #[tokio::test]
    async fn test_fetch_url_rejects_bad_input() {
        let server = MockServer::start().await;
        let tool = WebTool::fetch_url(client(&server));
        assert!(matches!(
            tool.call(&json!({"url": "not a url"})).await.unwrap_err(),
            PalaverError::Url(_)
        ));
        assert!(matches!(
            tool.call(&json!({"url": "file:///etc/passwd"})).await.unwrap_err(),
            PalaverError::InvalidInput(_)
        ));
        assert_eq!(tool.error_context(), "fetching URL");
    }
}
