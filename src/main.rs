//! # PTT Crawler
//!
//! Crawls boards of [PTT](https://www.ptt.cc), the largest online community
//! in Taiwan, through its web front end and stores every article, with its
//! pushes and push statistics, as structured JSON.
//!
//! ## Usage
//!
//! ```sh
//! ptt_crawler -b Gossiping -i 100 102
//! ptt_crawler -b PublicServan -a M.1127742013.A.240
//! ptt_crawler -b Gossiping -n 2
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Resolving**: Turn the selection into listing page indices (asking the
//!    board index for the newest page when needed)
//! 2. **Indexing**: Collect article links from each listing page
//! 3. **Fetching**: Download each article, throttled to stay polite
//! 4. **Extracting**: Parse metadata, body text and pushes from the HTML
//! 5. **Output**: Write one JSON file per run

use clap::Parser;
use std::error::Error;
use std::path::Path;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod crawler;
mod error;
mod fetch;
mod models;
mod outputs;
mod scrapers;
mod utils;

use cli::{Cli, Selection};
use config::CrawlerConfig;
use crawler::Crawler;
use fetch::{HttpFetcher, ThrottledFetcher};
use outputs::json;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("ptt_crawler starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");
    let selection = args.selection()?;

    let config = CrawlerConfig::load(args.config.as_deref())
        .await?
        .with_overrides(args.delay_ms, args.concurrency, args.timeout_secs);
    info!(
        base_url = %config.base_url,
        delay_ms = config.politeness_delay_ms,
        concurrency = config.concurrency(),
        "Configuration ready"
    );

    // Early check: ensure output dir is writable
    let output_dir = Path::new(&args.output_dir);
    if let Err(e) = ensure_writable_dir(output_dir).await {
        error!(
            path = %args.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let fetcher = ThrottledFetcher::new(
        HttpFetcher::new(&config)?,
        config.politeness_delay(),
        config.jitter(),
    );
    let crawler = Crawler::new(fetcher, &config)?;
    let board = args.board.as_str();

    match selection {
        Selection::Pages(range) => {
            let (start, end) = crawler.resolve_range(board, range).await?;
            let records = crawler.crawl_pages(board, start, end).await;
            json::write_batch(output_dir, board, start, end, &records).await?;
        }
        Selection::LastPages(count) => {
            let (start, end) = crawler.resolve_last_pages(board, count).await?;
            let records = crawler.crawl_pages(board, start, end).await;
            json::write_batch(output_dir, board, start, end, &records).await?;
        }
        Selection::Article(article_id) => {
            let outcome = crawler.crawl_article(board, &article_id).await;
            json::write_article_outcome(output_dir, board, &article_id, outcome).await?;
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
