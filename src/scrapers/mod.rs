//! HTML extraction for PTT pages.
//!
//! Everything in this module is a pure function of the HTML it is given: no
//! I/O, no shared state, safe to call concurrently on independent pages.
//!
//! # Submodules
//!
//! | Module | Input | Output |
//! |--------|-------|--------|
//! | [`article`] | Article page | [`ArticleRecord`](crate::models::ArticleRecord) or `MalformedDocument` |
//! | [`listing`] | Board listing page | `(href, article_id)` pairs, last page index |
//! | [`text`] | Raw text fragments | Normalized body text and push fields |

pub mod article;
pub mod listing;
pub mod text;
