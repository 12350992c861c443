//! CLI output formatting utilities.

use super::markdown::highlight_tool_result;
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;

const DIVIDER_WIDTH: usize = 50;

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a passed or failed check.
    pub fn check(ok: bool, msg: &str) {
        if ok {
            println!("    {} {}", style("✓").green(), msg);
        } else {
            println!("    {} {}", style("✗").red(), msg);
        }
    }

    /// Print a `[Label] value` line of the verbose transcript.
    pub fn label(label: &str, value: &str) {
        println!(
            "{} {}",
            style(format!("[{}]", label)).bold().blue(),
            style(value).cyan().bright()
        );
    }

    pub fn divider() {
        println!("{}", style("-".repeat(DIVIDER_WIDTH)).dim());
    }

    /// Print a tool call with its effective arguments.
    pub fn tool_call(name: &str, arguments: &Value) {
        println!(
            "{} {}",
            style("[Tool Call]").bold().yellow(),
            style(name).yellow().bright()
        );
        println!(
            "{} {}",
            style("[Arguments]").bold().cyan(),
            style(arguments).dim()
        );
        Self::divider();
    }

    pub fn tool_result(result: &str) {
        println!("{}", style("[Tool Result]").bold().green());
        println!("{}", highlight_tool_result(result, Self::colors_enabled()));
        Self::divider();
    }

    pub fn final_answer_header() {
        println!("{}", style("[Final Answer]").bold().green());
        Self::divider();
    }

    /// Whether stdout gets escape codes.
    pub fn colors_enabled() -> bool {
        Term::stdout().features().colors_supported() && console::colors_enabled()
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}
