//! Data models for parsed PTT articles and board listings.
//!
//! This module defines the core data structures used throughout the application:
//! - [`ArticleRecord`]: One fully parsed article with its comments
//! - [`Comment`]: A single push (reply) under an article
//! - [`SentimentTally`]: Push counts derived from an article's comments
//! - [`ListingEntry`]: An article link found on a board listing page
//! - [`PageRange`]: The inclusive range of listing pages to crawl
//!
//! Serialized field names follow the JSON schema the crawler has always
//! produced (`article_title`, `message_count`, `messages`, `push_*`), so the
//! Rust field names are mapped with `#[serde(rename)]`.

use serde::{Deserialize, Serialize};

/// Tag glyph of an approving push.
pub const TAG_AGREE: &str = "推";
/// Tag glyph of a disapproving push.
pub const TAG_DISAGREE: &str = "噓";
/// Value stored in [`ArticleRecord::ip`] when no signature IP could be found.
pub const IP_FALLBACK: &str = "None";

/// A fully parsed article.
///
/// Records are built fresh by each extraction call and never mutated
/// afterwards; they are handed straight to the JSON writer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArticleRecord {
    /// Absolute URL the article was fetched from.
    pub url: String,
    /// Board the article was posted on.
    pub board: String,
    /// Article identifier, e.g. `M.1127742013.A.240`.
    pub article_id: String,
    /// Article title, empty when the metadata block is missing.
    #[serde(rename = "article_title")]
    pub title: String,
    /// Author line as shown, empty when missing.
    pub author: String,
    /// Posting date as shown, empty when missing.
    pub date: String,
    /// Filtered, whitespace-collapsed body text.
    pub content: String,
    /// Poster IP from the signature line, or [`IP_FALLBACK`].
    pub ip: String,
    /// Aggregate push counts over `comments`.
    #[serde(rename = "message_count")]
    pub sentiment_tally: SentimentTally,
    /// Pushes in document order.
    #[serde(rename = "messages")]
    pub comments: Vec<Comment>,
}

/// One push (reply) under an article.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Comment {
    #[serde(rename = "push_tag")]
    pub tag: String,
    #[serde(rename = "push_userid")]
    pub user_id: String,
    #[serde(rename = "push_content")]
    pub text: String,
    #[serde(rename = "push_ipdatetime")]
    pub ip_date_time: String,
}

/// How a push tag is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Comment {
    /// Classify this push by its tag glyph.
    pub fn sentiment(&self) -> Sentiment {
        match self.tag.as_str() {
            TAG_AGREE => Sentiment::Positive,
            TAG_DISAGREE => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }
}

/// Push counts for one article.
///
/// `impact` is always `positive + negative + neutral`, and `polarity` is
/// `positive - negative`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SentimentTally {
    pub impact: usize,
    pub polarity: i64,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl SentimentTally {
    /// Count the pushes in `comments`.
    pub fn from_comments(comments: &[Comment]) -> Self {
        let (mut positive, mut negative, mut neutral) = (0usize, 0usize, 0usize);
        for comment in comments {
            match comment.sentiment() {
                Sentiment::Positive => positive += 1,
                Sentiment::Negative => negative += 1,
                Sentiment::Neutral => neutral += 1,
            }
        }
        Self {
            impact: positive + negative + neutral,
            polarity: positive as i64 - negative as i64,
            positive,
            negative,
            neutral,
        }
    }
}

/// An article link found on a board listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Site-relative link, e.g. `/bbs/Test/M.123.A.html`.
    pub href: String,
    /// Identifier derived from the last path segment, e.g. `M.123.A`.
    pub article_id: String,
}

/// Last page of a [`PageRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEnd {
    /// Resolve to the newest listing page of the board.
    Last,
    /// An explicit listing page index.
    Index(u32),
}

impl PageEnd {
    /// Interpret a raw end index, where `-1` means "last available page".
    pub fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            -1 => Some(PageEnd::Last),
            n if n >= 0 => u32::try_from(n).ok().map(PageEnd::Index),
            _ => None,
        }
    }
}

/// Inclusive range of listing page indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: u32,
    pub end: PageEnd,
}

/// Payload written in place of an article that could not be fetched or parsed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorRecord {
    pub error: String,
}

impl ErrorRecord {
    pub fn invalid_url() -> Self {
        Self {
            error: "invalid url".to_string(),
        }
    }
}
