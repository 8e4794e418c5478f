//! JSON output of crawled articles.
//!
//! Files are human-readable UTF-8: keys sorted, two-space indentation and
//! Chinese text left unescaped.
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── Gossiping-100-102.json      # page range: array of articles
//! └── Gossiping-M.1.A.240.json    # single article, or {"error": "invalid url"}
//! ```

use crate::error::{ItemError, Result};
use crate::models::{ArticleRecord, ErrorRecord};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// `{board}-{start}-{end}.json`
pub fn range_filename(board: &str, start: u32, end: u32) -> String {
    format!("{board}-{start}-{end}.json")
}

/// `{board}-{article_id}.json`
pub fn article_filename(board: &str, article_id: &str) -> String {
    format!("{board}-{article_id}.json")
}

/// Serialize `value` with sorted keys and two-space indentation.
///
/// Going through [`serde_json::Value`] sorts object keys, since its map is
/// ordered by key.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value)?;
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Write `value` to `dir/filename` and return the full path.
#[instrument(level = "info", skip(value))]
pub async fn write_json<T: Serialize>(dir: &Path, filename: &str, value: &T) -> Result<PathBuf> {
    let path = dir.join(filename);
    let json = to_pretty_json(value)?;
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote JSON");
    Ok(path)
}

/// Write the records of a page range crawl.
pub async fn write_batch(
    dir: &Path,
    board: &str,
    start: u32,
    end: u32,
    records: &[ArticleRecord],
) -> Result<PathBuf> {
    info!(count = records.len(), start, end, "Writing batch");
    write_json(dir, &range_filename(board, start, end), &records).await
}

/// Write a single crawled article.
pub async fn write_article(dir: &Path, record: &ArticleRecord) -> Result<PathBuf> {
    write_json(dir, &article_filename(&record.board, &record.article_id), record).await
}

/// Write the error payload for an article that could not be crawled.
pub async fn write_article_error(dir: &Path, board: &str, article_id: &str) -> Result<PathBuf> {
    write_json(dir, &article_filename(board, article_id), &ErrorRecord::invalid_url()).await
}

/// Write the outcome of a single-article crawl.
///
/// A record is written as is. Any failure is logged and replaced by the
/// `{"error": "invalid url"}` payload under the same file name.
pub async fn write_article_outcome(
    dir: &Path,
    board: &str,
    article_id: &str,
    outcome: std::result::Result<ArticleRecord, ItemError>,
) -> Result<PathBuf> {
    match outcome {
        Ok(record) => write_article(dir, &record).await,
        Err(e) => {
            error!(%article_id, error = %e, "Article could not be crawled");
            write_article_error(dir, board, article_id).await
        }
    }
}
