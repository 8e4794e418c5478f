//! Text cleaning for article bodies and push fields.
//!
//! Article bodies on PTT mix Chinese text, ASCII, box-drawing art, emoji and
//! the station's own footer lines. The helpers here turn the raw text
//! fragments of a post into one normalized `content` string:
//!
//! 1. Footer lines (`※ 發信站:`, `◆ From:`, `--` separators) are dropped.
//! 2. Every remaining fragment is reduced to the allowed character set.
//! 3. Empty fragments and the permalink line are dropped.
//! 4. Fragments are joined and whitespace runs collapsed.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

/// Marker that starts the posting-station signature line.
pub const SIGNATURE_MARKER: &str = "※ 發信站:";

/// Anything outside CJK ideographs, CJK punctuation, ASCII alphanumerics,
/// whitespace and `:/-_.?~%()`.
static DISALLOWED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"[^\x{4e00}-\x{9fa5}\x{3002}\x{ff1b}\x{ff0c}\x{ff1a}\x{201c}\x{201d}\x{ff08}\x{ff09}\x{3001}\x{ff1f}\x{300a}\x{300b}\sA-Za-z0-9:/_.?~%()\-]",
    )
    .unwrap()
});

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static IPV4: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+\.\d+\.\d+\.\d+").unwrap());

/// Strip every character outside the allowed set.
///
/// Applying the filter twice yields the same string as applying it once.
pub fn filter_chars(s: &str) -> String {
    DISALLOWED.replace_all(s, "").into_owned()
}

/// `true` if `s` only holds characters [`filter_chars`] keeps.
pub fn is_filtered(s: &str) -> bool {
    !DISALLOWED.is_match(s)
}

/// Replace every run of whitespace with a single space.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RUN.replace_all(s, " ").into_owned()
}

/// Station footer lines: signature (`※`), origin (`◆`) and `--` separators.
pub fn is_footer_line(fragment: &str) -> bool {
    fragment.starts_with(['※', '◆']) || fragment.starts_with("--")
}

/// Build the normalized body from stripped text fragments in document order.
///
/// Fragments containing `article_id` are dropped, which removes the
/// permalink line the site appends to every post.
pub fn build_content<'a, I>(fragments: I, article_id: &str) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let joined = fragments
        .into_iter()
        .filter(|fragment| !is_footer_line(fragment))
        .map(|fragment| filter_chars(fragment).trim().to_string())
        .filter(|fragment| !fragment.is_empty())
        .filter(|fragment| article_id.is_empty() || !fragment.contains(article_id))
        .join(" ");
    collapse_whitespace(&joined).trim().to_string()
}

/// Pull the first IPv4-shaped substring out of a signature line.
pub fn extract_ip(line: &str) -> Option<String> {
    IPV4.find(line).map(|m| m.as_str().to_string())
}

/// Trim the characters the site pads push fields with.
pub fn trim_field(s: &str) -> String {
    s.trim_matches([' ', '\t', '\n', '\r']).to_string()
}

/// Drop the single leading separator (`:`) of a push body, then trim.
pub fn strip_separator(s: &str) -> String {
    let mut chars = s.chars();
    chars.next();
    trim_field(chars.as_str())
}
