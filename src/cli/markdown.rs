//! Terminal rendering of the model's markdown-ish answers and of tool results.

use console::Style;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static LINK_OR_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]+)\]\(([^)]+)\)|\[([^\]]+)\]|(https?://[^\s)\]<>]+)").expect("valid regex")
});
static BOLD_STARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid regex"));
static BOLD_UNDERSCORES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__(.+?)__").expect("valid regex"));
static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{1,6}[ \t]+(.+)$").expect("valid regex"));
static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^([ \t]*)-[ \t]+").expect("valid regex"));
static NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^([ \t]*)(\d+)\.[ \t]+").expect("valid regex"));
static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("valid regex"));

static RESULT_INDEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\[(\d+)\]").expect("valid regex"));
static RESULT_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(Title:|Snippet:|URL:|Source:|Date:|Displayed image:|Could not display|Error|No images)")
        .expect("valid regex")
});
static RESULT_STATS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(Score: \d+|Comments: \d+)").expect("valid regex"));
static RESULT_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("valid regex"));

struct Palette {
    bold: Style,
    url: Style,
    header: Style,
    marker: Style,
    code: Style,
}

impl Palette {
    fn new(styled: bool) -> Self {
        let base = Style::new().force_styling(styled);
        Self {
            bold: base.clone().bold(),
            url: base.clone().cyan().underlined(),
            header: base.clone().bold().magenta(),
            marker: base.clone().cyan(),
            code: base.yellow().bright(),
        }
    }
}

/// Rewrite the final answer for the terminal.
///
/// Links become bold text followed by the URL, emphasis and headers lose
/// their markers, list markers become `•` or `N.`, bare URLs are underlined
/// and brackets without a URL are dropped. With `styled` false the same
/// rewrite happens without escape codes.
pub fn format_answer(text: &str, styled: bool) -> String {
    let p = Palette::new(styled);

    // Links, bracketed text and bare URLs in one pass so a URL is styled once.
    let text = LINK_OR_URL.replace_all(text, |caps: &Captures| {
        if let (Some(label), Some(url)) = (caps.get(1), caps.get(2)) {
            return format!(
                "{} {}",
                p.bold.apply_to(label.as_str()),
                p.url.apply_to(url.as_str())
            );
        }
        if let Some(inner) = caps.get(3) {
            return inner.as_str().to_string();
        }
        let m = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
        p.url.apply_to(m).to_string()
    });

    let text = BOLD_STARS.replace_all(&text, |caps: &Captures| p.bold.apply_to(&caps[1]).to_string());
    let text =
        BOLD_UNDERSCORES.replace_all(&text, |caps: &Captures| p.bold.apply_to(&caps[1]).to_string());
    let text = HEADER.replace_all(&text, |caps: &Captures| p.header.apply_to(&caps[1]).to_string());
    let text = BULLET.replace_all(&text, |caps: &Captures| {
        format!("{}{} ", &caps[1], p.marker.apply_to("•"))
    });
    let text = NUMBERED.replace_all(&text, |caps: &Captures| {
        format!("{}{} ", &caps[1], p.marker.apply_to(format!("{}.", &caps[2])))
    });
    let text = INLINE_CODE.replace_all(&text, |caps: &Captures| p.code.apply_to(&caps[1]).to_string());

    text.into_owned()
}

/// Colorize a tool result for the verbose transcript.
pub fn highlight_tool_result(text: &str, styled: bool) -> String {
    let base = Style::new().force_styling(styled);

    let text = RESULT_INDEX.replace_all(text, |caps: &Captures| {
        base.clone().bold().yellow().apply_to(format!("[{}]", &caps[1])).to_string()
    });
    let text = RESULT_LABEL.replace_all(&text, |caps: &Captures| {
        let label = &caps[1];
        let style = match label {
            "Title:" => base.clone().bold().magenta(),
            "Snippet:" => base.clone().black().bright(),
            "URL:" => base.clone().cyan(),
            "Source:" => base.clone().yellow(),
            "Date:" => base.clone().blue(),
            "Displayed image:" => base.clone().bold().green(),
            _ => base.clone().red(),
        };
        style.apply_to(label).to_string()
    });
    let text = RESULT_STATS.replace_all(&text, |caps: &Captures| {
        let stat = &caps[1];
        let style = if stat.starts_with("Score") {
            base.clone().green()
        } else {
            base.clone().blue()
        };
        style.apply_to(stat).to_string()
    });
    let text = RESULT_URL.replace_all(&text, |caps: &Captures| {
        base.clone().cyan().underlined().apply_to(&caps[0]).to_string()
    });

    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_rewrite() {
        let input = "# Summary\n- **Rust** is fast\n  - see [docs](https://doc.rust-lang.org)\n1. Use `cargo`\nMore at https://rust-lang.org and [1].";
        assert_eq!(
            format_answer(input, false),
            "Summary\n• Rust is fast\n  • see docs https://doc.rust-lang.org\n1. Use cargo\nMore at https://rust-lang.org and 1."
        );
    }

    #[test]
    fn test_url_in_brackets_left_plain() {
        assert_eq!(
            format_answer("source: [https://a.example/x]", false),
            "source: https://a.example/x"
        );
    }

    #[test]
    fn test_styled_output_has_escapes() {
        let out = format_answer("**hi** https://x.io", true);
        assert!(out.contains("\u{1b}[1mhi\u{1b}[0m"));
        assert!(out.contains("https://x.io"));
        assert_eq!(out.matches("https://x.io").count(), 1);
        assert!(out.contains("\u{1b}[4m"));
    }

    #[test]
    fn test_link_url_styled_once() {
        let out = format_answer("[Tokio](https://tokio.rs)", true);
        assert_eq!(out.matches("\u{1b}[4m").count(), 1);
        assert!(!out.contains('('));
    }

    #[test]
    fn test_highlight_tool_result() {
        let result = "[1] Title: Tokio\nSnippet: runtime\nURL: https://tokio.rs";
        assert_eq!(highlight_tool_result(result, false), result);

        let colored = highlight_tool_result(result, true);
        assert!(colored.contains("\u{1b}[33m"));
        assert!(colored.contains("Tokio"));
        assert_ne!(colored, result);

        let stats = highlight_tool_result("    Score: 12 | Comments: 3 | By: pg", true);
        assert!(stats.contains("\u{1b}[32mScore: 12\u{1b}[0m"));
        assert!(stats.contains("\u{1b}[34mComments: 3\u{1b}[0m"));
    }
}
