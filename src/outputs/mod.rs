//! Output generation.
//!
//! # Submodules
//!
//! - [`json`]: Writes crawled articles (or the error payload) to JSON files
//!   named after the board and the page range or article id

pub mod json;
