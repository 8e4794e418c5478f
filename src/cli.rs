//! Command-line interface definitions for the PTT crawler.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Exactly one selection mode is required: a page range (`-i`), a single
//! article (`-a`) or the newest N pages (`-n`).

use crate::error::CrawlError;
use crate::models::{PageEnd, PageRange};
use clap::{ArgGroup, Parser};

/// A crawler for the web version of PTT, the largest online community in Taiwan.
///
/// Input: board name and page indices (or article id).
/// Output: BOARD_NAME-START_INDEX-END_INDEX.json (or BOARD_NAME-ID.json).
///
/// # Examples
///
/// ```sh
/// # Pages 100 to 102 of Gossiping
/// ptt_crawler -b Gossiping -i 100 102
///
/// # From page 3000 to the newest page
/// ptt_crawler -b PublicServan -i 3000 -1
///
/// # A single article
/// ptt_crawler -b PublicServan -a M.1127742013.A.240
///
/// # The newest 2 pages, into ./out
/// ptt_crawler -b Gossiping -n 2 -o out
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
#[command(group(
    ArgGroup::new("selection")
        .required(true)
        .args(["index", "article", "last"]),
))]
pub struct Cli {
    /// Board name
    #[arg(short = 'b', value_name = "BOARD_NAME")]
    pub board: String,

    /// Output directory
    #[arg(short, long, default_value = "data")]
    pub output_dir: String,

    /// Start and end index (end may be -1 for the newest page)
    #[arg(
        short = 'i',
        num_args = 2,
        value_names = ["START_INDEX", "END_INDEX"],
        allow_negative_numbers = true
    )]
    pub index: Option<Vec<i64>>,

    /// Article id
    #[arg(short = 'a', value_name = "ARTICLE_ID")]
    pub article: Option<String>,

    /// Number of newest pages to retrieve
    #[arg(short = 'n', value_name = "N")]
    pub last: Option<u32>,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Minimum delay between requests in milliseconds
    #[arg(long, env = "PTT_DELAY_MS")]
    pub delay_ms: Option<u64>,

    /// Number of article requests in flight at once
    #[arg(long, env = "PTT_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

/// What to crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Listing pages `start..=end`.
    Pages(PageRange),
    /// The newest N listing pages.
    LastPages(u32),
    /// One article by id.
    Article(String),
}

impl Cli {
    /// Validate the selection arguments.
    pub fn selection(&self) -> Result<Selection, CrawlError> {
        if let Some(article) = &self.article {
            return Ok(Selection::Article(article.clone()));
        }
        if let Some(count) = self.last {
            if count == 0 {
                return Err(CrawlError::Range("-n must be at least 1".to_string()));
            }
            return Ok(Selection::LastPages(count));
        }
        match self.index.as_deref() {
            Some(&[start, end]) => {
                let start = u32::try_from(start)
                    .map_err(|_| CrawlError::Range(format!("invalid start index {start}")))?;
                let end = PageEnd::from_raw(end)
                    .ok_or_else(|| CrawlError::Range(format!("invalid end index {end}")))?;
                Ok(Selection::Pages(PageRange { start, end }))
            }
            _ => Err(CrawlError::Range(
                "one of -i, -a or -n is required".to_string(),
            )),
        }
    }
}
