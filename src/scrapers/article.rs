//! Article page extraction.
//!
//! An article page on PTT wraps everything in `#main-content`:
//!
//! ```text
//! div#main-content
//! ├── div.article-metaline        (作者 / 標題 / 時間, in that order)
//! ├── div.article-metaline-right  (看板)
//! ├── body text nodes and spans   (post body, signature, permalink)
//! └── div.push                    (one per push / reply)
//! ```
//!
//! [`extract`] splits the container into three disjoint parts (metadata,
//! pushes, body) while walking the parsed tree once. Nothing is removed from
//! the document; metadata and push subtrees are skipped during the body walk.

use crate::error::MalformedDocument;
use crate::models::{ArticleRecord, Comment, IP_FALLBACK, SentimentTally};
use crate::scrapers::text::{
    SIGNATURE_MARKER, build_content, extract_ip, is_filtered, strip_separator, trim_field,
};
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::node::{Element, Node};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

static MAIN_CONTENT: Lazy<Selector> = Lazy::new(|| Selector::parse("#main-content").unwrap());
static METALINE: Lazy<Selector> = Lazy::new(|| Selector::parse("div.article-metaline").unwrap());
static META_VALUE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.article-meta-value").unwrap());
static PUSH: Lazy<Selector> = Lazy::new(|| Selector::parse("div.push").unwrap());
static PUSH_TAG: Lazy<Selector> = Lazy::new(|| Selector::parse("span.push-tag").unwrap());
static PUSH_USERID: Lazy<Selector> = Lazy::new(|| Selector::parse("span.push-userid").unwrap());
static PUSH_CONTENT: Lazy<Selector> = Lazy::new(|| Selector::parse("span.push-content").unwrap());
static PUSH_IPDATETIME: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.push-ipdatetime").unwrap());

/// Classes of `div`s whose text never belongs to the article body.
const EXCLUDED_CLASSES: [&str; 3] = ["article-metaline", "article-metaline-right", "push"];

/// Metadata positions inside `#main-content`.
const AUTHOR: usize = 0;
const TITLE: usize = 1;
const DATE: usize = 2;

/// Parse one article page into an [`ArticleRecord`].
///
/// # Arguments
///
/// * `html` - Raw article page HTML
/// * `article_id` - Identifier such as `M.1127742013.A.240`
/// * `link` - Absolute URL the page was fetched from
/// * `board` - Board name
///
/// # Errors
///
/// Returns [`MalformedDocument`] when the page has no `#main-content`
/// container. Missing metadata, untagged pushes and a missing signature line
/// fall back to defaults instead.
pub fn extract(
    html: &str,
    article_id: &str,
    link: &str,
    board: &str,
) -> Result<ArticleRecord, MalformedDocument> {
    let document = Html::parse_document(html);
    let main = document
        .select(&MAIN_CONTENT)
        .next()
        .ok_or_else(|| MalformedDocument {
            article_id: article_id.to_string(),
        })?;

    let metas: Vec<ElementRef<'_>> = main.select(&METALINE).collect();
    let meta_value = |position: usize| {
        metas
            .get(position)
            .and_then(|meta| meta.select(&META_VALUE).next())
            .map(|value| value.text().collect::<String>())
            .unwrap_or_default()
    };
    let author = meta_value(AUTHOR);
    let title = meta_value(TITLE);
    let date = meta_value(DATE);

    let mut body_nodes = Vec::new();
    collect_body_text(main, &mut body_nodes);

    let ip = body_nodes
        .iter()
        .find(|text| text.contains(SIGNATURE_MARKER))
        .and_then(|line| extract_ip(line))
        .unwrap_or_else(|| IP_FALLBACK.to_string());

    let content = build_content(
        body_nodes
            .iter()
            .map(|text| text.trim())
            .filter(|text| !text.is_empty()),
        article_id,
    );
    debug_assert!(is_filtered(&content));

    let comments: Vec<Comment> = main.select(&PUSH).filter_map(parse_comment).collect();
    let sentiment_tally = SentimentTally::from_comments(&comments);

    debug!(
        %article_id,
        metas = metas.len(),
        comments = comments.len(),
        content_chars = content.chars().count(),
        "Extracted article"
    );

    Ok(ArticleRecord {
        url: link.to_string(),
        board: board.to_string(),
        article_id: article_id.to_string(),
        title,
        author,
        date,
        content,
        ip,
        sentiment_tally,
        comments,
    })
}

/// `true` for metadata and push blocks.
fn is_excluded(element: &Element) -> bool {
    element.name() == "div"
        && element
            .classes()
            .any(|class| EXCLUDED_CLASSES.contains(&class))
}

/// Collect raw text nodes under `element` in document order, skipping
/// excluded subtrees.
fn collect_body_text<'a>(element: ElementRef<'a>, out: &mut Vec<&'a str>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push(&**text),
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    if !is_excluded(child_element.value()) {
                        collect_body_text(child_element, out);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Parse one `div.push`. Pushes without a tag span are dropped.
fn parse_comment(push: ElementRef<'_>) -> Option<Comment> {
    let tag = push.select(&PUSH_TAG).next()?;
    let field = |selector: &Selector| {
        push.select(selector)
            .next()
            .map(|span| trim_field(&span.text().collect::<String>()))
            .unwrap_or_default()
    };

    Some(Comment {
        tag: trim_field(&tag.text().collect::<String>()),
        user_id: field(&*PUSH_USERID),
        text: push
            .select(&PUSH_CONTENT)
            .next()
            .map(|span| strip_separator(&span.text().join(" ")))
            .unwrap_or_default(),
        ip_date_time: field(&*PUSH_IPDATETIME),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINK: &str = "https://www.ptt.cc/bbs/Test/M.1700000000.A.ABC.html";
    const ID: &str = "M.1700000000.A.ABC";

    fn push(tag: &str, user: &str, content: &str, when: &str) -> String {
        format!(
            r#"<div class="push"><span class="hl push-tag">{tag} </span><span class="f3 hl push-userid">{user}</span><span class="f3 push-content">{content}</span><span class="push-ipdatetime"> {when}
</span></div>"#
        )
    }

    fn page(metas: &str, body: &str, pushes: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html><head><meta charset="utf-8"><title>test</title></head>
<body>
<div id="topbar-container"><div id="topbar" class="bbs-content"><a id="logo" href="/bbs/">批踢踢實業坊</a></div></div>
<div id="main-container">
<div id="main-content" class="bbs-screen bbs-content">{metas}{body}
<span class="f2">※ 發信站: 批踢踢實業坊(ptt.cc), 來自: 36.224.1.2 (臺灣)
</span><span class="f2">※ 文章網址: <a href="{LINK}" target="_blank" rel="noreferrer noopener nofollow">{LINK}</a>
</span>{pushes}</div>
</div>
</body></html>"#
        )
    }

    fn full_metas(author: &str, title: &str, date: &str) -> String {
        format!(
            r#"<div class="article-metaline"><span class="article-meta-tag">作者</span><span class="article-meta-value">{author}</span></div><div class="article-metaline-right"><span class="article-meta-tag">看板</span><span class="article-meta-value">Test</span></div><div class="article-metaline"><span class="article-meta-tag">標題</span><span class="article-meta-value">{title}</span></div><div class="article-metaline"><span class="article-meta-tag">時間</span><span class="article-meta-value">{date}</span></div>"#
        )
    }

    #[test]
    fn test_end_to_end_article() {
        let pushes = format!(
            "{}{}",
            push("推", "alice", ": 好文", "01/01 10:00"),
            push("噓", "carol", ": 不認同", "01/01 10:05")
        );
        let html = page(
            &full_metas("bob", "Hello", "Mon"),
            "\n測試 content 😀\n",
            &pushes,
        );

        let record = extract(&html, ID, LINK, "Test").unwrap();
        assert_eq!(record.title, "Hello");
        assert_eq!(record.author, "bob");
        assert_eq!(record.date, "Mon");
        assert_eq!(record.content, "測試 content");
        assert_eq!(record.url, LINK);
        assert_eq!(record.board, "Test");
        assert_eq!(record.article_id, ID);
        assert_eq!(record.sentiment_tally.impact, 2);
        assert_eq!(record.sentiment_tally.polarity, 0);
        assert_eq!(record.sentiment_tally.positive, 1);
        assert_eq!(record.sentiment_tally.negative, 1);
        assert_eq!(record.sentiment_tally.neutral, 0);
    }

    #[test]
    fn test_metadata_exact_text() {
        let html = page(
            &full_metas("bob (Bobby)", "[問題] 職等", "Mon Jan  1 10:00:00 2024"),
            "\n本文\n",
            "",
        );
        let record = extract(&html, ID, LINK, "Test").unwrap();
        assert_eq!(record.author, "bob (Bobby)");
        assert_eq!(record.title, "[問題] 職等");
        assert_eq!(record.date, "Mon Jan  1 10:00:00 2024");
        // metadata and board line never leak into the body
        assert_eq!(record.content, "本文");
    }

    #[test]
    fn test_missing_metadata_defaults_to_empty() {
        let metas = r#"<div class="article-metaline"><span class="article-meta-tag">作者</span><span class="article-meta-value">bob</span></div>"#;
        let record = extract(&page(metas, "\n本文\n", ""), ID, LINK, "Test").unwrap();
        assert_eq!(record.author, "bob");
        assert_eq!(record.title, "");
        assert_eq!(record.date, "");

        let record = extract(&page("", "\n本文\n", ""), ID, LINK, "Test").unwrap();
        assert_eq!(record.author, "");
        assert_eq!(record.title, "");
        assert_eq!(record.date, "");
        assert_eq!(record.content, "本文");
    }

    #[test]
    fn test_metaline_without_value_span() {
        let metas = r#"<div class="article-metaline"><span class="article-meta-tag">作者</span></div><div class="article-metaline"><span class="article-meta-tag">標題</span><span class="article-meta-value">Hello</span></div>"#;
        let record = extract(&page(metas, "\n本文\n", ""), ID, LINK, "Test").unwrap();
        assert_eq!(record.author, "");
        assert_eq!(record.title, "Hello");
    }

    #[test]
    fn test_missing_main_content_is_malformed() {
        let html = "<html><body><div class=\"bbs-screen\">404 - Not Found.</div></body></html>";
        let err = extract(html, ID, LINK, "Test").unwrap_err();
        assert_eq!(err.article_id, ID);
    }

    #[test]
    fn test_ip_from_signature() {
        let html = page(&full_metas("bob", "Hello", "Mon"), "\n本文\n", "");
        let record = extract(&html, ID, LINK, "Test").unwrap();
        assert_eq!(record.ip, "36.224.1.2");
    }

    #[test]
    fn test_ip_fallback_without_signature() {
        let html = r#"<div id="main-content">本文<span class="f2">◆ From: somewhere</span></div>"#;
        let record = extract(html, ID, LINK, "Test").unwrap();
        assert_eq!(record.ip, "None");
        assert_eq!(record.content, "本文");
    }

    #[test]
    fn test_ip_fallback_when_signature_has_no_ip() {
        let html = r#"<div id="main-content">本文
<span class="f2">※ 發信站: 批踢踢實業坊(ptt.cc)</span></div>"#;
        let record = extract(html, ID, LINK, "Test").unwrap();
        assert_eq!(record.ip, "None");
    }

    #[test]
    fn test_content_excludes_id_comments_and_disallowed_chars() {
        let pushes = format!(
            "{}{}",
            push("推", "alice", ": 推文內容獨特字串", "01/01 10:00"),
            push("→", "dave", ": 箭頭留言", "01/01 10:01")
        );
        let html = page(
            &full_metas("bob", "Hello", "Mon"),
            "\n第一段 ★☆ text!\n\n第二段 ♥ 😀 (ok)\n",
            &pushes,
        );
        let record = extract(&html, ID, LINK, "Test").unwrap();
        assert!(!record.content.contains(ID));
        assert!(!record.content.contains("推文內容獨特字串"));
        assert!(!record.content.contains("箭頭留言"));
        assert!(is_filtered(&record.content));
        assert_eq!(record.content, "第一段 text 第二段 (ok)");
    }

    #[test]
    fn test_comment_fields() {
        let html = page(
            "",
            "\n本文\n",
            &push("→", "dave", ": 箭頭 <a href=\"https://x.y\">https://x.y</a> 留言  ", "1.2.3.4 01/01 10:01"),
        );
        let record = extract(&html, ID, LINK, "Test").unwrap();
        assert_eq!(record.comments.len(), 1);
        let comment = &record.comments[0];
        assert_eq!(comment.tag, "→");
        assert_eq!(comment.user_id, "dave");
        assert_eq!(comment.text, "箭頭  https://x.y  留言");
        assert_eq!(comment.ip_date_time, "1.2.3.4 01/01 10:01");
        assert_eq!(record.sentiment_tally.neutral, 1);
        assert_eq!(record.sentiment_tally.impact, 1);
    }

    #[test]
    fn test_push_missing_spans_keeps_empty_fields() {
        let partial = r#"<div class="push"><span class="push-tag">→ </span><span class="push-userid">x</span></div>"#;
        let record = extract(&page("", "\n本文\n", partial), ID, LINK, "Test").unwrap();
        assert_eq!(
            record.comments,
            vec![Comment {
                tag: "→".to_string(),
                user_id: "x".to_string(),
                text: String::new(),
                ip_date_time: String::new(),
            }]
        );
        assert_eq!(record.sentiment_tally.neutral, 1);
        assert_eq!(record.sentiment_tally.impact, 1);
        assert_eq!(record.sentiment_tally.polarity, 0);
    }

    #[test]
    fn test_untagged_push_is_dropped() {
        let untagged = r#"<div class="push center warning-box">檔案過大！部分文章無法顯示</div>"#;
        let pushes = format!(
            "{}{}{}",
            push("推", "alice", ": 一", "01/01 10:00"),
            untagged,
            push("推", "bob", ": 二", "01/01 10:01")
        );
        let html = page("", "\n本文\n", &pushes);
        let record = extract(&html, ID, LINK, "Test").unwrap();
        assert_eq!(record.comments.len(), 2);
        assert_eq!(record.comments[0].user_id, "alice");
        assert_eq!(record.comments[1].user_id, "bob");
        let tally = record.sentiment_tally;
        assert_eq!(tally.impact, 2);
        assert_eq!(tally.positive, 2);
        assert_eq!(tally.impact, tally.positive + tally.negative + tally.neutral);
        assert!(!record.content.contains("檔案過大"));
    }

    #[test]
    fn test_content_is_filter_fixed_point() {
        let html = page("", "\n混合 Mixed ＠＃ text 🎉 ~%()\n", "");
        let record = extract(&html, ID, LINK, "Test").unwrap();
        assert_eq!(
            crate::scrapers::text::filter_chars(&record.content),
            record.content
        );
    }
}
