//! Image search and rendering diagnostic.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::tools::{print_image, ImageSearcher, RenderOutcome, Renderer, SearchClient};
use anyhow::{Context, Result};
use std::sync::Arc;

const DEFAULT_TERM: &str = "llama";

/// Search each term and render every image found, reporting each step.
pub async fn run_images(terms: &[String], settings: &Settings) -> Result<()> {
    let terms: Vec<&str> = if terms.is_empty() {
        Output::info(&format!("No search terms given, using default: {}", DEFAULT_TERM));
        vec![DEFAULT_TERM]
    } else {
        terms.iter().map(String::as_str).collect()
    };

    Output::header("Image search & display");
    Output::kv("Search terms", &terms.join(", "));

    let renderer = Renderer::new(&settings.image);
    println!("\n[1] Checking {}...", renderer.program());
    preflight::check(Operation::Images, settings).with_context(|| {
        format!(
            "{} is required. Install with: sudo apt install {}",
            renderer.program(),
            renderer.program()
        )
    })?;
    Output::check(true, &format!("{} found", renderer.program()));

    let client = Arc::new(SearchClient::new(&settings.search)?);
    let searcher = ImageSearcher::new(client, renderer);
    let count = settings.image.max_images as usize;

    let mut total_shown = 0;
    for term in &terms {
        total_shown += search_and_display(&searcher, term, count).await;
    }

    println!();
    if total_shown > 0 {
        Output::success(&format!("Displayed {} image(s)", total_shown));
    } else {
        Output::warning("No images could be displayed");
    }
    Ok(())
}

async fn search_and_display(searcher: &ImageSearcher, term: &str, count: usize) -> usize {
    println!("\n--- Searching: {} ---", term);
    println!("[2] Image search for '{}'...", term);

    let hits = match searcher.search(term, count).await {
        Ok(hits) => hits,
        Err(e) => {
            Output::check(false, &format!("Search failed: {}", e));
            return 0;
        }
    };
    Output::check(true, &format!("Found {} images", hits.len()));
    for (i, hit) in hits.iter().enumerate() {
        println!("    [{}] {}", i + 1, preview(&hit.url, 80));
    }

    println!("\n[3] Downloading and displaying images...");
    let mut shown = 0;
    for (i, hit) in hits.iter().enumerate() {
        let index = i + 1;
        match searcher.render_hit(hit).await {
            Ok(RenderOutcome::Rendered(art)) => {
                print_image(index, hit, &art);
                shown += 1;
            }
            Ok(RenderOutcome::Failed(stderr)) => {
                Output::check(false, &format!("[{}] {} failed: {}", index, searcher.renderer().program(), stderr));
            }
            Ok(RenderOutcome::TimedOut) => {
                Output::check(false, &format!("[{}] {} timed out", index, searcher.renderer().program()));
            }
            Ok(RenderOutcome::NotInstalled) => {
                Output::check(false, &searcher.renderer().not_installed_message());
                break;
            }
            Err(e) => {
                Output::check(false, &format!("[{}] Download failed: {}", index, e));
            }
        }
    }
    Output::kv(term, &format!("{}/{} displayed", shown, hits.len()));
    shown
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_counts_chars() {
        assert_eq!(preview("short", 80), "short");
        assert_eq!(preview("ééééé", 3), "ééé...");
    }

    #[tokio::test]
    async fn test_missing_renderer_stops_before_search() {
        let mut settings = Settings::default();
        settings.image.renderer = "palaver-no-such-renderer".to_string();
        settings.search.base_url = "http://127.0.0.1:9".to_string();

        let err = run_images(&[], &settings).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "palaver-no-such-renderer is required. Install with: sudo apt install palaver-no-such-renderer"
        );
        assert!(format!("{:#}", err).contains("palaver-no-such-renderer"));
    }
}
