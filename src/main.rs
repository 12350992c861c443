//! palaver CLI entry point.

use anyhow::Result;
use clap::Parser;
use palaver::cli::{commands, Cli, Commands};
use palaver::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Usage errors exit with 1; help and version exit with 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("palaver={}", log_level)),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config_path = match &cli.config {
        Some(path) => Settings::expand_path(path),
        None => Settings::default_config_path(),
    };
    // Loaded per command so `config init` and `config path` work on a broken file.
    let load_settings = || Settings::load_from(Some(config_path.as_path()));
    let verbose = cli.verbose > 0;

    match &cli.command {
        Commands::Weather { query, model } => {
            commands::run_weather(query, model.clone(), &load_settings()?, verbose).await?;
        }

        Commands::Temperature { city, model } => {
            commands::run_temperature(city, model.clone(), &load_settings()?, verbose).await?;
        }

        Commands::Hn {
            query,
            model,
            num_results,
        } => {
            let settings = load_settings()?;
            commands::run_hn(query, model.clone(), *num_results, &settings, verbose).await?;
        }

        Commands::Search {
            query,
            model,
            format,
            num_results,
        } => {
            let settings = load_settings()?;
            commands::run_search(query, model.clone(), *format, *num_results, &settings, verbose)
                .await?;
        }

        Commands::Images { terms } => {
            commands::run_images(terms, &load_settings()?).await?;
        }

        Commands::Probe { models } => {
            commands::run_probe(models, &load_settings()?).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, &config_path)?;
        }
    }

    Ok(())
}
