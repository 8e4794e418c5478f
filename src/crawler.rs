//! Crawl orchestration: page ranges → listing pages → articles.
//!
//! The crawler follows a two-phase pattern per listing page:
//!
//! 1. **Indexing**: fetch `/bbs/{board}/index{N}.html` and pull the article
//!    links out of it
//! 2. **Fetching**: fetch and extract every linked article through an
//!    order-preserving stream of bounded width
//!
//! Failures of a single listing page or article are logged with their URL
//! and skipped; the batch always returns whatever parsed successfully, in
//! input order.

use crate::config::CrawlerConfig;
use crate::error::{CrawlError, ItemError, Result};
use crate::fetch::PageFetcher;
use crate::models::{ArticleRecord, ListingEntry, PageEnd, PageRange};
use crate::scrapers::{article, listing};
use crate::utils::truncate_for_log;
use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Drives a [`PageFetcher`] over one board.
#[derive(Debug)]
pub struct Crawler<F> {
    fetcher: F,
    base_url: Url,
    concurrency: usize,
}

impl<F> Crawler<F>
where
    F: PageFetcher,
{
    /// Create a crawler for the site at `config.base_url`.
    pub fn new(fetcher: F, config: &CrawlerConfig) -> Result<Self> {
        Ok(Self {
            fetcher,
            base_url: Url::parse(&config.base_url)?,
            concurrency: config.concurrency(),
        })
    }

    fn page_url(&self, path: &str) -> std::result::Result<String, url::ParseError> {
        Ok(self.base_url.join(path)?.to_string())
    }

    /// Highest listing page index of `board`.
    ///
    /// # Errors
    ///
    /// [`CrawlError::LastPage`] when the board index cannot be fetched.
    #[instrument(level = "info", skip(self))]
    pub async fn last_page(&self, board: &str) -> Result<u32> {
        let url = self.page_url(&format!("/bbs/{board}/index.html"))?;
        let html = self
            .fetcher
            .fetch(&url)
            .await
            .map_err(CrawlError::LastPage)?;
        let last = listing::resolve_last_page(&html);
        info!(last, "Resolved last page");
        Ok(last)
    }

    /// Turn a [`PageRange`] into concrete inclusive indices.
    pub async fn resolve_range(&self, board: &str, range: PageRange) -> Result<(u32, u32)> {
        let end = match range.end {
            PageEnd::Last => self.last_page(board).await?,
            PageEnd::Index(end) => end,
        };
        if range.start > end {
            return Err(CrawlError::Range(format!(
                "start index {} is past end index {end}",
                range.start
            )));
        }
        Ok((range.start, end))
    }

    /// Indices of the newest `count` listing pages.
    pub async fn resolve_last_pages(&self, board: &str, count: u32) -> Result<(u32, u32)> {
        if count == 0 {
            return Err(CrawlError::Range("page count must be at least 1".to_string()));
        }
        let end = self.last_page(board).await?;
        let start = end.saturating_sub(count - 1).max(1);
        Ok((start, end))
    }

    /// Article links on listing page `index` of `board`.
    #[instrument(level = "info", skip(self))]
    pub async fn listing(
        &self,
        board: &str,
        index: u32,
    ) -> std::result::Result<Vec<ListingEntry>, ItemError> {
        let url = self.page_url(&format!("/bbs/{board}/index{index}.html"))?;
        let html = self.fetcher.fetch(&url).await?;
        let entries = listing::extract_links(&html);
        info!(count = entries.len(), "Indexed listing page");
        Ok(entries)
    }

    /// Fetch and extract the article at site-relative `href`.
    #[instrument(level = "info", skip(self))]
    pub async fn article(
        &self,
        board: &str,
        article_id: &str,
        href: &str,
    ) -> std::result::Result<ArticleRecord, ItemError> {
        let link = self.page_url(href)?;
        info!(%article_id, "Processing article");
        let html = self.fetcher.fetch(&link).await?;
        article::extract(&html, article_id, &link, board).map_err(|e| {
            debug!(preview = %truncate_for_log(&html, 300), "Page without main content");
            ItemError::from(e)
        })
    }

    /// Fetch and extract a single article by id.
    pub async fn crawl_article(
        &self,
        board: &str,
        article_id: &str,
    ) -> std::result::Result<ArticleRecord, ItemError> {
        self.article(board, article_id, &format!("/bbs/{board}/{article_id}.html"))
            .await
    }

    /// Crawl listing pages `start..=end` and every article they link to.
    ///
    /// Records come back in listing order. Failed pages and articles are
    /// logged and left out.
    #[instrument(level = "info", skip(self))]
    pub async fn crawl_pages(&self, board: &str, start: u32, end: u32) -> Vec<ArticleRecord> {
        let mut records = Vec::new();
        let mut failed = 0usize;

        for index in start..=end {
            info!(index, "Processing index");
            let entries = match self.listing(board, index).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(index, error = %e, "Skipping listing page");
                    continue;
                }
            };

            let results: Vec<Option<ArticleRecord>> = stream::iter(entries)
                .map(move |entry| async move {
                    match self.article(board, &entry.article_id, &entry.href).await {
                        Ok(record) => Some(record),
                        Err(e) => {
                            error!(
                                index,
                                article_id = %entry.article_id,
                                href = %entry.href,
                                error = %e,
                                "Skipping article"
                            );
                            None
                        }
                    }
                })
                .buffered(self.concurrency)
                .collect()
                .await;

            for result in results {
                match result {
                    Some(record) => records.push(record),
                    None => failed += 1,
                }
            }
        }

        info!(
            successful = records.len(),
            failed,
            "Completed page range"
        );
        records
    }
}
