//! Board listing pages: article links and pagination.
//!
//! A listing page (`/bbs/{board}/index{N}.html`) shows one `div.r-ent` per
//! article. Deleted posts keep their entry but lose the anchor. The page
//! header carries the paging buttons; the "‹ 上頁" button links to the
//! previous numbered page, which is how the newest page number is found.

use crate::models::ListingEntry;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

static ENTRY: Lazy<Selector> = Lazy::new(|| Selector::parse("div.r-ent").unwrap());
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());

/// The "previous page" button: `href="/bbs/{board}/index{N}.html">&lsaquo;`.
static PREVIOUS_PAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"href="/bbs/[^/"]+/index(\d+)\.html">(?:&lsaquo;|‹)"#).unwrap()
});

/// Extract `(href, article_id)` pairs from a listing page, in document order.
///
/// Entries without an anchor (deleted posts) are skipped. Duplicates are
/// kept.
pub fn extract_links(html: &str) -> Vec<ListingEntry> {
    let document = Html::parse_document(html);
    let entries: Vec<ListingEntry> = document
        .select(&ENTRY)
        .filter_map(|entry| entry.select(&ANCHOR).next())
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(|href| ListingEntry {
            href: href.to_string(),
            article_id: article_id_from_href(href),
        })
        .collect();

    debug!(count = entries.len(), "Extracted listing entries");
    entries
}

/// `/bbs/Test/M.123.A.html` → `M.123.A`
pub fn article_id_from_href(href: &str) -> String {
    let segment = href.rsplit('/').next().unwrap_or(href);
    segment.strip_suffix(".html").unwrap_or(segment).to_string()
}

/// Determine the highest listing page index of a board from its index page.
///
/// The newest page has no number of its own, so the result is the number of
/// the previous page plus one. Boards with a single page (or markup without
/// a previous-page button) resolve to `1`.
pub fn resolve_last_page(html: &str) -> u32 {
    PREVIOUS_PAGE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .and_then(|n| n.as_str().parse::<u32>().ok())
        .map(|previous| previous.saturating_add(1))
        .unwrap_or(1)
}
