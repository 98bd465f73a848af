// src/wiki/links.rs
// =============================================================================
// Picks the "important" links out of a rendered Wikipedia article.
//
// The lead of an article (its first paragraphs) links the concepts the
// article is built on, so we only look at:
// - the article body container (div.mw-parser-output)
// - its first two <p> children, direct children only; paragraphs inside
//   infoboxes, tables or hatnotes don't count
// - links into the wiki itself (/wiki/...)
// - minus links to media files (File:, Файл:, Datei:...)
// =============================================================================

use percent_encoding::percent_decode_str;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

const WIKI_PATH_PREFIX: &str = "/wiki/";

// How many lead paragraphs we read links from
const LEAD_PARAGRAPHS: usize = 2;

/// An outbound link: its label and its relative path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArticleLink {
    pub title: String,
    pub href: String,
}

// Extracts the lead links of an article
//
// Parameters:
//   html: the article HTML; None yields no links
//   file_namespaces: local names of the File namespace ("Файл", "File")
//
// Returns: links in document order, duplicates kept
pub fn extract_links(html: Option<&str>, file_namespaces: &[String]) -> Vec<ArticleLink> {
    let mut links = Vec::new();
    let Some(html) = html else {
        return links;
    };

    let document = Html::parse_document(html);

    // Both selectors are constants, so parsing them can't fail at runtime
    let content_selector = Selector::parse("div.mw-parser-output").unwrap();
    let anchor_selector = Selector::parse("a[href]").unwrap();

    let Some(content) = document.select(&content_selector).next() else {
        return links;
    };

    let paragraphs = content
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "p")
        .take(LEAD_PARAGRAPHS);

    for paragraph in paragraphs {
        for anchor in paragraph.select(&anchor_selector) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            if !href.starts_with(WIKI_PATH_PREFIX) || is_file_link(href, file_namespaces) {
                continue;
            }

            links.push(ArticleLink {
                title: link_label(&anchor),
                href: href.to_string(),
            });
        }
    }

    links
}

// Prefer the title attribute (the target article's name), fall back to
// whatever text the link shows
fn link_label(anchor: &ElementRef) -> String {
    match anchor.value().attr("title") {
        Some(title) if !title.trim().is_empty() => title.trim().to_string(),
        _ => anchor.text().collect::<String>().trim().to_string(),
    }
}

// True when a /wiki/ href points into one of the file namespaces.
// Hrefs are percent-encoded (/wiki/%D0%A4%D0%B0%D0%B9%D0%BB:X.jpg), so the
// target is decoded before comparing; namespace names ignore case.
pub fn is_file_link(href: &str, file_namespaces: &[String]) -> bool {
    let Some(target) = href.strip_prefix(WIKI_PATH_PREFIX) else {
        return false;
    };
    let target = percent_decode_str(target).decode_utf8_lossy().to_lowercase();

    file_namespaces.iter().any(|ns| {
        let prefix = format!("{}:", ns.to_lowercase());
        target.starts_with(&prefix)
    })
}
