//! Image search with terminal rendering through an external program (chafa).

use super::args::decode_args;
use super::web::{Category, SearchClient};
use super::ToolId;
use crate::agent::Tool;
use crate::config::ImageSettings;
use crate::error::Result;
use crate::llm::{ParamKind, ToolDescriptor};
use async_trait::async_trait;
use console::style;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, REFERER};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::{debug, info, warn};

const IMAGE_ACCEPT: &str = "image/avif,image/webp,image/apng,image/svg+xml,image/*,*/*;q=0.8";

/// An image result: page title and direct image URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHit {
    pub title: String,
    pub url: String,
}

/// Result of one renderer invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Rendered terminal art.
    Rendered(String),
    /// Renderer exited unsuccessfully, with its stderr.
    Failed(String),
    TimedOut,
    NotInstalled,
}

/// Invokes the renderer as `<program> --size=WxH --colors=N <file>`.
#[derive(Debug, Clone)]
pub struct Renderer {
    program: String,
    size: String,
    colors: u32,
    timeout: Duration,
}

impl Renderer {
    pub fn new(settings: &ImageSettings) -> Self {
        Self {
            program: settings.renderer.clone(),
            size: settings.size.clone(),
            colors: settings.colors,
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn not_installed_message(&self) -> String {
        format!(
            "Error: {} is not installed. Install with: sudo apt install {}",
            self.program, self.program
        )
    }

    pub async fn render(&self, path: &Path) -> RenderOutcome {
        let output = Command::new(&self.program)
            .arg(format!("--size={}", self.size))
            .arg(format!("--colors={}", self.colors))
            .arg(path)
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(self.timeout, output).await {
            Err(_) => RenderOutcome::TimedOut,
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => RenderOutcome::NotInstalled,
            Ok(Err(e)) => RenderOutcome::Failed(e.to_string()),
            Ok(Ok(out)) if out.status.success() => {
                RenderOutcome::Rendered(String::from_utf8_lossy(&out.stdout).into_owned())
            }
            Ok(Ok(out)) => {
                RenderOutcome::Failed(String::from_utf8_lossy(&out.stderr).trim().to_string())
            }
        }
    }
}

/// File extension for an image content type.
fn extension_for(content_type: &str) -> &'static str {
    let content_type = content_type.to_ascii_lowercase();
    if content_type.contains("jpeg") || content_type.contains("jpg") {
        ".jpg"
    } else if content_type.contains("png") {
        ".png"
    } else if content_type.contains("gif") {
        ".gif"
    } else if content_type.contains("webp") {
        ".webp"
    } else {
        ".jpg"
    }
}

/// Print rendered art under a header naming the image.
pub fn print_image(index: usize, hit: &ImageHit, art: &str) {
    println!(
        "\n{}",
        style(format!("[Image {}: {}]", index, hit.title)).bold().magenta()
    );
    println!("{}\n", style(&hit.url).cyan());
    println!("{}", art);
}

/// Outcome of trying to show the first displayable image for a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageDisplay {
    Shown { index: usize, hit: ImageHit },
    NoImages,
    NotInstalled(String),
    AllFailed(Vec<String>),
}

impl ImageDisplay {
    /// Text handed back to the model.
    pub fn summary(&self, query: &str) -> String {
        match self {
            ImageDisplay::Shown { hit, .. } => {
                format!("Displayed image: {} (URL: {})", hit.title, hit.url)
            }
            ImageDisplay::NoImages => format!("No images found for: {}", query),
            ImageDisplay::NotInstalled(message) => message.clone(),
            ImageDisplay::AllFailed(errors) => {
                let details = if errors.is_empty() {
                    "unknown error".to_string()
                } else {
                    errors.join("; ")
                };
                format!("Could not display any images for: {}. Errors: {}", query, details)
            }
        }
    }
}

/// Finds images through the search client and renders them.
pub struct ImageSearcher {
    client: Arc<SearchClient>,
    renderer: Renderer,
}

impl ImageSearcher {
    pub fn new(client: Arc<SearchClient>, renderer: Renderer) -> Self {
        Self { client, renderer }
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Image hits with a usable URL, at most `count`.
    pub async fn search(&self, query: &str, count: usize) -> Result<Vec<ImageHit>> {
        let hits = self.client.search(query, Category::Images, count).await?;
        Ok(hits
            .into_iter()
            .filter_map(|hit| {
                let url = hit.img_src.filter(|u| !u.is_empty())?;
                let title = if hit.title.is_empty() {
                    "No title".to_string()
                } else {
                    hit.title
                };
                Some(ImageHit { title, url })
            })
            .collect())
    }

    /// Download an image into a temp file named after its content type.
    ///
    /// The file is removed when the returned handle drops.
    pub async fn download(&self, url: &str) -> Result<NamedTempFile> {
        let response = self
            .client
            .http()
            .get(url)
            .header(ACCEPT, IMAGE_ACCEPT)
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(REFERER, url)
            .send()
            .await?
            .error_for_status()?;

        let ext = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(extension_for)
            .unwrap_or(".jpg");
        let bytes = response.bytes().await?;
        debug!("Downloaded {} bytes from {}", bytes.len(), url);

        let file = tempfile::Builder::new()
            .prefix("palaver-")
            .suffix(ext)
            .tempfile()?;
        tokio::fs::write(file.path(), &bytes).await?;
        Ok(file)
    }

    /// Download and render one hit.
    pub async fn render_hit(&self, hit: &ImageHit) -> Result<RenderOutcome> {
        let file = self.download(&hit.url).await?;
        Ok(self.renderer.render(file.path()).await)
    }

    /// Show the first image that downloads and renders.
    pub async fn display_first(&self, query: &str, count: usize) -> Result<ImageDisplay> {
        let hits = self.search(query, count).await?;
        if hits.is_empty() {
            return Ok(ImageDisplay::NoImages);
        }

        let mut errors = Vec::new();
        for (i, hit) in hits.iter().enumerate() {
            let index = i + 1;
            match self.render_hit(hit).await {
                Ok(RenderOutcome::Rendered(art)) => {
                    info!("Rendered image {} for '{}'", index, query);
                    print_image(index, hit, &art);
                    return Ok(ImageDisplay::Shown {
                        index,
                        hit: hit.clone(),
                    });
                }
                Ok(RenderOutcome::NotInstalled) => {
                    return Ok(ImageDisplay::NotInstalled(self.renderer.not_installed_message()));
                }
                Ok(RenderOutcome::TimedOut) => {
                    errors.push(format!("[{}] {} timeout", index, self.renderer.program()));
                }
                Ok(RenderOutcome::Failed(stderr)) => {
                    errors.push(format!("[{}] {} error: {}", index, self.renderer.program(), stderr));
                }
                Err(e) => {
                    warn!("Image {} download failed: {}", index, e);
                    errors.push(format!("[{}] download error: {}", index, e));
                }
            }
        }
        Ok(ImageDisplay::AllFailed(errors))
    }
}

#[derive(Debug, Deserialize)]
struct ImageArgs {
    query: String,
}

/// `image_search`: shows an image in the terminal and tells the model which one.
pub struct ImageSearchTool {
    descriptor: ToolDescriptor,
    searcher: ImageSearcher,
    count: usize,
}

impl ImageSearchTool {
    pub fn new(searcher: ImageSearcher, count: u32) -> Self {
        Self {
            descriptor: ToolDescriptor::new(
                ToolId::ImageSearch.as_str(),
                "Search for images related to a query and display the first result in the terminal",
            )
            .required("query", ParamKind::String, "The search query for images"),
            searcher,
            count: count as usize,
        }
    }
}

#[async_trait]
impl Tool for ImageSearchTool {
    fn id(&self) -> ToolId {
        ToolId::ImageSearch
    }

    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn error_context(&self) -> &'static str {
        "searching images"
    }

    async fn call(&self, arguments: &Value) -> Result<String> {
        let args: ImageArgs = decode_args(ToolId::ImageSearch, arguments)?;
        let display = self.searcher.display_first(&args.query, self.count).await?;
        Ok(display.summary(&args.query))
    }
}
