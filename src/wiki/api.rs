// src/wiki/api.rs
// =============================================================================
// Fetches an article's rendered HTML from the MediaWiki parse API.
//
//   GET {wiki}/w/api.php?action=parse&page=<title>&prop=text&format=json
//
// A successful answer looks like:
//   {"parse": {"title": "...", "pageid": 1, "text": {"*": "<div ...>"}}}
//
// A missing page still comes back as HTTP 200, but with an "error" object
// instead of "parse". Every field is optional on our side, so a surprising
// shape becomes ContentAbsent instead of a panic.
// =============================================================================

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::config::join_url;
use crate::error::{ProbeError, Result};

#[derive(Debug, Deserialize)]
struct ParseResponse {
    parse: Option<ParsedPage>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ParsedPage {
    text: Option<ParsedText>,
}

#[derive(Debug, Deserialize)]
struct ParsedText {
    #[serde(rename = "*")]
    html: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<String>,
    info: Option<String>,
}

// Returns the article HTML for `title`
//
// Errors:
//   Transport: status other than 200
//   Parse: body is not JSON
//   ContentAbsent: JSON without parse.text["*"] (missing page, API error)
pub async fn fetch_article(client: &Client, wiki_url: &str, title: &str) -> Result<String> {
    let url = join_url(wiki_url, "w/api.php")?;
    debug!(%url, title, "Fetching article");

    let response = client
        .get(url.clone())
        .query(&[
            ("action", "parse"),
            ("page", title),
            ("prop", "text"),
            ("format", "json"),
        ])
        .send()
        .await?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(ProbeError::Transport {
            url: url.to_string(),
            status,
        });
    }

    let body = response.text().await?;
    let parsed: ParseResponse = serde_json::from_str(&body)?;

    if let Some(err) = parsed.error {
        return Err(ProbeError::ContentAbsent(format!(
            "API error for '{}': {} ({})",
            title,
            err.info.unwrap_or_default(),
            err.code.unwrap_or_default()
        )));
    }

    parsed
        .parse
        .and_then(|p| p.text)
        .and_then(|t| t.html)
        .ok_or_else(|| ProbeError::ContentAbsent(format!("no parsed text for '{}'", title)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn client() -> Client {
        crate::config::build_client(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_article_html() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("action", "parse"))
            .and(query_param("page", "Лошадь"))
            .and(query_param("format", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "parse": {"title": "Лошадь", "pageid": 7, "text": {"*": "<p>hi</p>"}}
            })))
            .mount(&server)
            .await;

        let html = fetch_article(&client(), &server.uri(), "Лошадь").await.unwrap();
        assert_eq!(html, "<p>hi</p>");
    }

    #[tokio::test]
    async fn test_missing_page_is_content_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": {"code": "missingtitle", "info": "The page you specified doesn't exist."}
            })))
            .mount(&server)
            .await;

        let err = fetch_article(&client(), &server.uri(), "Nope").await.unwrap_err();
        assert!(matches!(err, ProbeError::ContentAbsent(_)));
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_content_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "parse": {"title": "X"}
            })))
            .mount(&server)
            .await;

        let err = fetch_article(&client(), &server.uri(), "X").await.unwrap_err();
        assert!(matches!(err, ProbeError::ContentAbsent(_)));
    }

    #[tokio::test]
    async fn test_bad_status_and_bad_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("page", "Down"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("page", "Garbled"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = client();
        let down = fetch_article(&client, &server.uri(), "Down").await.unwrap_err();
        assert!(matches!(down, ProbeError::Transport { .. }));

        let garbled = fetch_article(&client, &server.uri(), "Garbled").await.unwrap_err();
        assert!(matches!(garbled, ProbeError::Parse(_)));
    }
}
