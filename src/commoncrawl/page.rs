// src/commoncrawl/page.rs
// =============================================================================
// Turns an archived HTML payload into something we can keyword-match:
// the page title and its visible text.
// =============================================================================

use percent_encoding::percent_decode_str;
use scraper::{Html, Selector};

const UNTITLED: &str = "Untitled";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub title: String,
    pub text: String,
}

// Parses HTML bytes (lossily decoded as UTF-8) into title + text.
//
// Text nodes are joined with spaces so that words from neighbouring
// elements ("<td>конь</td><td>...") don't run together.
pub fn extract_page(payload: &[u8]) -> PageText {
    let html = String::from_utf8_lossy(payload);
    let document = Html::parse_document(&html);

    // The selector is a constant, so parsing it can't fail at runtime
    let title_selector = Selector::parse("title").unwrap();

    let title = document
        .select(&title_selector)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string());

    let text = document
        .root_element()
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    PageText { title, text }
}

/// Human-readable form of an archived URL: %XX escapes decoded, '+' as space
pub fn display_url(url: &str) -> String {
    let spaced = url.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title_and_text() {
        let html = b"<html><head><title> \xd0\x9a\xd0\xbe\xd0\xbd\xd1\x8c </title></head>\
                     <body><p>first</p><div>second</div></body></html>";
        let page = extract_page(html);
        assert_eq!(page.title, "Конь");
        assert!(page.text.contains("first second"));
    }

    #[test]
    fn test_missing_title() {
        let page = extract_page(b"<p>no head here</p>");
        assert_eq!(page.title, "Untitled");
        assert_eq!(page.text, "no head here");
    }

    #[test]
    fn test_adjacent_cells_do_not_merge() {
        let page = extract_page(b"<table><tr><td>horse</td><td>race</td></tr></table>");
        assert_eq!(page.text, "horse race");
    }

    #[test]
    fn test_display_url_decodes_cyrillic() {
        assert_eq!(
            display_url("https://ru.wikipedia.org/wiki/%D0%9A%D0%BE%D0%BD%D1%8C"),
            "https://ru.wikipedia.org/wiki/Конь"
        );
        assert_eq!(display_url("a+b"), "a b");
    }
}
