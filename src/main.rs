//! Wikivault main entry point
//!
//! Command-line interface for the wiki-to-vault exporter. Configuration is
//! env-style (optionally via a `.env` file); flags override the environment.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wikivault::config::Overrides;
use wikivault::{crawl_index, fetch_and_save, Config, RetryClient, SaveOutcome};

/// Wikivault: export a legacy wiki into an Obsidian-style vault
///
/// Crawls the wiki's paginated page listing, downloads every page, converts
/// it to markdown with `[[Title]]` cross-references, and writes one file
/// per page with frontmatter.
#[derive(Parser, Debug)]
#[command(name = "wikivault")]
#[command(version)]
#[command(about = "Export a legacy wiki into an Obsidian-style vault", long_about = None)]
struct Cli {
    /// Wiki base URL, e.g. https://seesaawiki.jp/mywiki (env: BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Output directory (env: OUTPUT_DIR, default "output")
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Delay between page fetches in seconds (env: SLEEP_TIME, default 1.0)
    #[arg(long)]
    delay: Option<f64>,

    /// Per-request timeout in seconds (env: TIMEOUT, default 10)
    #[arg(long)]
    timeout: Option<u64>,

    /// Skip pages whose output file already exists (env: SKIP_EXISTING)
    #[arg(long)]
    skip_existing: bool,

    /// Download referenced images into a content-addressed cache (env: FETCH_MEDIA)
    #[arg(long)]
    fetch_media: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A .env file is optional; real environment variables win
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    // Only configuration errors are fatal; everything past this point is
    // logged per item and the run continues
    let config = Config::load(&Overrides {
        base_url: cli.base_url.clone(),
        output_dir: cli.output_dir.clone(),
        delay: cli.delay,
        timeout: cli.timeout,
        skip_existing: cli.skip_existing,
        fetch_media: cli.fetch_media,
    })?;

    tracing::info!("Target wiki: {}", config.base_url);
    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            config.output_dir.display()
        )
    })?;

    let client = RetryClient::new(config.timeout)?;

    // Phase 1: the index crawl runs to completion before any page fetch;
    // link resolution depends on seeing the full page map
    let page_map = crawl_index(&client, &config).await;
    if page_map.is_empty() {
        tracing::info!("Nothing to process");
        return Ok(());
    }

    let pages = page_map.normalize();
    let total = pages.len();
    tracing::info!("Processing {} pages", total);

    // Phase 2: sequential page fetches with a politeness delay between
    // them. Deliberately not parallel; the target is somebody's wiki host.
    let mut written = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;

    for (count, (_url, title)) in pages.iter().enumerate() {
        tracing::info!("[{}/{}] {}", count + 1, total, title);

        match fetch_and_save(&client, title, &config, &page_map).await {
            SaveOutcome::Written => written += 1,
            SaveOutcome::Skipped => skipped += 1,
            SaveOutcome::Failed => failed += 1,
        }

        tokio::time::sleep(config.delay).await;
    }

    println!(
        "Done: {} written, {} skipped, {} failed (of {} pages)",
        written, skipped, failed, total
    );

    Ok(())
}

/// Sets up the tracing subscriber based on verbosity flags
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("wikivault=info,warn"),
            1 => EnvFilter::new("wikivault=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
