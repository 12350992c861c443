//! Hacker News tools over the public Firebase API.

use super::args::{decode_args, lenient_opt_uint, lenient_uint};
use super::http::build_client;
use super::ToolId;
use crate::agent::Tool;
use crate::config::HackerNewsSettings;
use crate::error::{PalaverError, Result};
use crate::llm::{ParamKind, ToolDescriptor};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const DEFAULT_LIMIT: u32 = 10;

/// A story, job, poll or comment as returned by `/item/{id}.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub id: u64,
    pub title: Option<String>,
    pub url: Option<String>,
    pub text: Option<String>,
    pub by: Option<String>,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub descendants: i64,
    #[serde(default)]
    pub kids: Vec<u64>,
}

impl Item {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("No title")
    }

    pub fn author(&self) -> &str {
        self.by.as_deref().unwrap_or("unknown")
    }

    pub fn discussion_url(&self) -> String {
        format!("https://news.ycombinator.com/item?id={}", self.id)
    }

    fn link(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.is_empty())
    }

    fn stats_line(&self) -> String {
        format!(
            "Score: {} | Comments: {} | By: {}",
            self.score,
            self.descendants,
            self.author()
        )
    }

    /// Listing entry with a 1-based position.
    pub fn format_story(&self, index: usize) -> String {
        let mut out = format!("[{}] {}\n    {}\n", index, self.title(), self.stats_line());
        if let Some(url) = self.link() {
            out.push_str(&format!("    URL: {}\n", url));
        }
        out.push_str(&format!("    HN: {}", self.discussion_url()));
        out
    }

    /// Job listings carry no score or comment count.
    pub fn format_job(&self, index: usize) -> String {
        let mut out = format!("[{}] {}\n", index, self.title());
        if let Some(url) = self.link() {
            out.push_str(&format!("    URL: {}\n", url));
        }
        out.push_str(&format!("    HN: {}", self.discussion_url()));
        out
    }
}

/// Thin client for the Firebase API.
///
/// Fetch failures are logged and treated as missing data so that one bad
/// item never fails a whole listing.
pub struct HackerNewsClient {
    http: Client,
    base_url: String,
    settings: HackerNewsSettings,
}

impl HackerNewsClient {
    pub fn new(settings: &HackerNewsSettings) -> Result<Self> {
        Ok(Self {
            http: build_client(Duration::from_secs(settings.timeout_secs), None)?,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            settings: settings.clone(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let url = format!("{}/{}.json", self.base_url, path);
        debug!("GET {}", url);
        let value = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<Option<T>>()
            .await?;
        Ok(value)
    }

    /// Story ids from a listing endpoint such as `topstories`.
    pub async fn fetch_story_ids(&self, endpoint: &str) -> Vec<u64> {
        match self.get_json::<Vec<u64>>(endpoint).await {
            Ok(ids) => ids.unwrap_or_default(),
            Err(e) => {
                warn!("Failed to fetch {}: {}", endpoint, e);
                Vec::new()
            }
        }
    }

    pub async fn fetch_item(&self, id: u64) -> Option<Item> {
        match self.get_json::<Item>(&format!("item/{}", id)).await {
            Ok(item) => item,
            Err(e) => {
                warn!("Failed to fetch item {}: {}", id, e);
                None
            }
        }
    }

    async fn fetch_items(&self, ids: &[u64]) -> Vec<Item> {
        let mut items = Vec::with_capacity(ids.len());
        for &id in ids {
            if let Some(item) = self.fetch_item(id).await {
                items.push(item);
            }
        }
        items
    }

    /// Formatted listing, or `empty` when nothing could be fetched.
    pub async fn listing(&self, endpoint: &str, limit: u32, jobs: bool, empty: &str) -> String {
        let limit = limit.min(self.settings.max_stories) as usize;
        info!("Fetching {} items from {}", limit, endpoint);

        let ids = self.fetch_story_ids(endpoint).await;
        let ids = &ids[..ids.len().min(limit)];
        let entries: Vec<String> = self
            .fetch_items(ids)
            .await
            .iter()
            .enumerate()
            .map(|(i, item)| {
                if jobs {
                    item.format_job(i + 1)
                } else {
                    item.format_story(i + 1)
                }
            })
            .collect();

        if entries.is_empty() {
            empty.to_string()
        } else {
            entries.join("\n\n")
        }
    }

    /// Story with its text and the first few comments.
    pub async fn story_details(&self, story_id: u64) -> String {
        let Some(item) = self.fetch_item(story_id).await else {
            return format!("Story {} not found.", story_id);
        };

        let mut out = format!("Title: {}\n{}\n", item.title(), item.stats_line());
        if let Some(url) = item.link() {
            out.push_str(&format!("URL: {}\n", url));
        }
        if let Some(text) = item.text.as_deref().filter(|t| !t.is_empty()) {
            out.push_str(&format!("\nContent:\n{}\n", text));
        }

        let kids: Vec<u64> = item
            .kids
            .iter()
            .copied()
            .take(self.settings.comment_count)
            .collect();
        if !kids.is_empty() {
            out.push_str("\nTop Comments:\n");
            for comment in self.fetch_items(&kids).await {
                let Some(text) = comment.text.as_deref().filter(|t| !t.is_empty()) else {
                    continue;
                };
                let text: String = text.chars().take(self.settings.comment_chars).collect();
                out.push_str(&format!("\n[{}]: {}\n", comment.author(), text));
            }
        }
        out.trim_end().to_string()
    }

    /// Case-insensitive title search over the top, best and new pools.
    pub async fn search(&self, query: &str, limit: u32) -> String {
        let needle = query.to_lowercase();
        let [top, best, new] = self.settings.search_pool;

        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        for (endpoint, take) in [("topstories", top), ("beststories", best), ("newstories", new)] {
            for id in self.fetch_story_ids(endpoint).await.into_iter().take(take) {
                if seen.insert(id) {
                    ids.push(id);
                }
            }
        }
        debug!("Searching {} stories for '{}'", ids.len(), query);

        let mut matches = Vec::new();
        for id in ids {
            if matches.len() >= limit as usize {
                break;
            }
            if let Some(item) = self.fetch_item(id).await {
                if item.title.as_deref().unwrap_or("").to_lowercase().contains(&needle) {
                    matches.push(item);
                }
            }
        }

        if matches.is_empty() {
            return format!("No stories found matching '{}'.", query);
        }
        matches
            .iter()
            .enumerate()
            .map(|(i, item)| item.format_story(i + 1))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[derive(Debug, Deserialize)]
struct ListingArgs {
    #[serde(default, deserialize_with = "lenient_opt_uint")]
    limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct DetailArgs {
    #[serde(deserialize_with = "lenient_uint")]
    story_id: u64,
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default, deserialize_with = "lenient_opt_uint")]
    limit: Option<u32>,
}

struct Listing {
    endpoint: &'static str,
    empty: &'static str,
    jobs: bool,
}

fn listing_for(id: ToolId) -> Option<Listing> {
    let (endpoint, empty) = match id {
        ToolId::GetTopStories => ("topstories", "No top stories found."),
        ToolId::GetNewStories => ("newstories", "No new stories found."),
        ToolId::GetBestStories => ("beststories", "No best stories found."),
        ToolId::GetAskHn => ("askstories", "No Ask HN posts found."),
        ToolId::GetShowHn => ("showstories", "No Show HN posts found."),
        ToolId::GetJobs => ("jobstories", "No job postings found."),
        _ => return None,
    };
    Some(Listing {
        endpoint,
        empty,
        jobs: id == ToolId::GetJobs,
    })
}

fn describe(id: ToolId, max_stories: u32) -> Option<ToolDescriptor> {
    let limit_desc = format!("Number of items to fetch (max {})", max_stories);
    let listing = |description: &str| {
        ToolDescriptor::new(id.as_str(), description).optional(
            "limit",
            ParamKind::Integer,
            &limit_desc,
        )
    };
    let descriptor = match id {
        ToolId::GetTopStories => {
            listing("Get top stories from Hacker News with scores and links")
        }
        ToolId::GetNewStories => listing("Get the newest stories from Hacker News"),
        ToolId::GetBestStories => listing("Get best stories from Hacker News (highest rated)"),
        ToolId::GetAskHn => listing("Get Ask HN posts, questions from the community"),
        ToolId::GetShowHn => {
            listing("Get Show HN posts, projects and demos shared by the community")
        }
        ToolId::GetJobs => listing("Get job postings from Hacker News"),
        ToolId::GetStoryDetails => ToolDescriptor::new(
            id.as_str(),
            "Get full details of a story including its text and top comments",
        )
        .required("story_id", ParamKind::Integer, "The HN story ID"),
        ToolId::SearchStories => ToolDescriptor::new(
            id.as_str(),
            "Search for stories whose titles match a query in top, best and new stories",
        )
        .required("query", ParamKind::String, "Search term to match in titles")
        .optional(
            "limit",
            ParamKind::Integer,
            "Maximum number of results to return",
        ),
        _ => return None,
    };
    Some(descriptor)
}

/// One Hacker News tool, sharing a client with its siblings.
pub struct HackerNewsTool {
    id: ToolId,
    descriptor: ToolDescriptor,
    client: Arc<HackerNewsClient>,
}

impl HackerNewsTool {
    pub fn new(id: ToolId, client: Arc<HackerNewsClient>) -> Result<Self> {
        let descriptor = describe(id, client.settings.max_stories)
            .ok_or_else(|| PalaverError::Config(format!("{} is not a Hacker News tool", id)))?;
        Ok(Self {
            id,
            descriptor,
            client,
        })
    }
}

#[async_trait]
impl Tool for HackerNewsTool {
    fn id(&self) -> ToolId {
        self.id
    }

    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn error_context(&self) -> &'static str {
        "fetching from Hacker News"
    }

    async fn call(&self, arguments: &Value) -> Result<String> {
        if let Some(listing) = listing_for(self.id) {
            let args: ListingArgs = decode_args(self.id, arguments)?;
            let limit = args.limit.unwrap_or(DEFAULT_LIMIT);
            return Ok(self
                .client
                .listing(listing.endpoint, limit, listing.jobs, listing.empty)
                .await);
        }

        match self.id {
            ToolId::GetStoryDetails => {
                let args: DetailArgs = decode_args(self.id, arguments)?;
                Ok(self.client.story_details(args.story_id).await)
            }
            ToolId::SearchStories => {
                let args: SearchArgs = decode_args(self.id, arguments)?;
                let limit = args.limit.unwrap_or(DEFAULT_LIMIT);
                Ok(self.client.search(&args.query, limit).await)
            }
            other => Err(PalaverError::ToolNotFound(other.to_string())),
        }
    }
}
