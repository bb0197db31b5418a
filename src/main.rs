//! Sumi-Weir main entry point
//!
//! Command-line front-end for the single-host crawl engine.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use scraper::Selector;
use sumi_weir::config::load_config;
use sumi_weir::crawler::{Engine, ParseCallback};
use sumi_weir::url::dedup_key;
use tracing_subscriber::EnvFilter;

/// Sumi-Weir: a single-host web crawler
///
/// Crawls one host from its configured seeds (and optional sitemap),
/// staying inside the accept/reject patterns and the host's robots.txt,
/// until it runs out of pages, hits the enqueue cap, or idles out.
#[derive(Parser, Debug)]
#[command(name = "sumi-weir")]
#[command(version)]
#[command(about = "A single-host web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Write each fetched page body into this directory
    #[arg(long, value_name = "DIR")]
    dump: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("loading configuration from {}", cli.config.display());
    let config = load_config(&cli.config)?;
    let plan = config.resolve()?;

    if let Some(dir) = &cli.dump {
        std::fs::create_dir_all(dir)?;
    }

    let seeds = plan.seeds.clone();
    let sitemap = plan.sitemap.clone();
    let callback = page_logger(cli.dump.clone());

    let engine = Engine::new(plan, Some(callback)).await?;
    engine.start(sitemap, &seeds).await?;

    tokio::select! {
        () = engine.done() => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupt received, draining crawl");
            if let Err(e) = engine.close().await {
                tracing::debug!(error = %e, "close after interrupt");
            }
            engine.done().await;
        }
    }

    tracing::info!("crawl finished");
    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_weir=info,warn"),
            1 => EnvFilter::new("sumi_weir=debug,info"),
            2 => EnvFilter::new("sumi_weir=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Builds the page callback: logs every visited page and optionally dumps
/// the raw body under `dump_dir`.
fn page_logger(dump_dir: Option<PathBuf>) -> ParseCallback {
    let title_selector = Selector::parse("title").ok();

    Arc::new(move |url, document, body| {
        let title = title_selector.as_ref().and_then(|selector| {
            document
                .select(selector)
                .next()
                .map(|element| element.text().collect::<String>().trim().to_string())
        });

        tracing::info!(
            url = %url,
            bytes = body.len(),
            title = title.as_deref().unwrap_or(""),
            "visited"
        );

        if let Some(dir) = &dump_dir {
            let name: String = dedup_key(url)
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                .collect();
            let path = dir.join(format!("{}.html", name));
            std::fs::write(&path, body)?;
        }
        Ok(())
    })
}
