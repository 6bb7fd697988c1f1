//! Resource metadata extraction for shared articles and PDFs.

pub mod article;
pub mod pdf;

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::ScrapeError;
use crate::safety::SafetyLayer;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Summaries longer than this are cut.
pub const SUMMARY_MAX_CHARS: usize = 300;

/// Metadata attached to a community resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Fetches remote documents and extracts metadata, rejecting forbidden content.
pub struct MetadataFetcher {
    client: reqwest::Client,
    article_timeout: Duration,
    safety: Arc<SafetyLayer>,
}

impl MetadataFetcher {
    pub fn new(article_timeout: Duration, safety: Arc<SafetyLayer>) -> Self {
        Self {
            client: reqwest::Client::new(),
            article_timeout,
            safety,
        }
    }

    /// Metadata for an HTML article.
    pub async fn article(&self, url: &str) -> Result<ResourceMetadata, ScrapeError> {
        let url = parse_url(url)?;
        let response = self
            .client
            .get(url.clone())
            .timeout(self.article_timeout)
            .send()
            .await
            .map_err(|e| fetch_error(&url, e))?;
        let response = check_status(&url, response)?;
        let html = response.text().await.map_err(|e| fetch_error(&url, e))?;

        let metadata = article::parse_article(&html, &url);
        tracing::debug!(%url, title = ?metadata.title, "Parsed article metadata");
        self.screen(metadata)
    }

    /// Metadata for a PDF document. No timeout beyond the client default.
    pub async fn pdf(&self, url: &str) -> Result<ResourceMetadata, ScrapeError> {
        let url = parse_url(url)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| fetch_error(&url, e))?;
        let response = check_status(&url, response)?;
        let bytes = response.bytes().await.map_err(|e| fetch_error(&url, e))?;

        // PDF parsing is CPU-bound
        let metadata = tokio::task::spawn_blocking(move || pdf::parse_pdf(&bytes))
            .await
            .map_err(|e| ScrapeError::Parse(format!("pdf task failed: {e}")))??;
        tracing::debug!(%url, title = ?metadata.title, "Parsed PDF metadata");
        self.screen(metadata)
    }

    /// Reject metadata whose title or summary trips the forbidden filter.
    pub fn screen(&self, metadata: ResourceMetadata) -> Result<ResourceMetadata, ScrapeError> {
        let mut matches: Vec<String> = Vec::new();
        for text in [metadata.title.as_deref(), metadata.summary.as_deref()]
            .into_iter()
            .flatten()
        {
            for word in self.safety.forbidden_matches(text) {
                if !matches.iter().any(|m| m == word) {
                    matches.push(word.to_string());
                }
            }
        }
        if matches.is_empty() {
            Ok(metadata)
        } else {
            tracing::warn!(?matches, "Rejected resource metadata");
            Err(ScrapeError::Forbidden(matches))
        }
    }
}

fn parse_url(raw: &str) -> Result<Url, ScrapeError> {
    let url = Url::parse(raw.trim()).map_err(|e| ScrapeError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ScrapeError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme {other}"),
        }),
    }
}

fn fetch_error(url: &Url, e: reqwest::Error) -> ScrapeError {
    ScrapeError::Fetch {
        url: url.to_string(),
        reason: e.to_string(),
    }
}

fn check_status(url: &Url, response: reqwest::Response) -> Result<reqwest::Response, ScrapeError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ScrapeError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

/// Collapse runs of whitespace to single spaces and trim.
pub fn normalize_whitespace(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").into_owned()
}

/// Normalize, drop if empty, and cap at `SUMMARY_MAX_CHARS`.
pub fn clean_summary(raw: &str) -> Option<String> {
    let text = normalize_whitespace(raw);
    if text.is_empty() {
        return None;
    }
    if text.chars().count() <= SUMMARY_MAX_CHARS {
        return Some(text);
    }
    let cut: String = text.chars().take(SUMMARY_MAX_CHARS - 3).collect();
    Some(format!("{}...", cut.trim_end()))
}

fn non_empty(raw: &str) -> Option<String> {
    let text = normalize_whitespace(raw);
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::Router;
    use axum::http::{StatusCode, header};
    use axum::routing::get;

    fn fetcher() -> MetadataFetcher {
        MetadataFetcher::new(Duration::from_secs(5), Arc::new(SafetyLayer::new()))
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://127.0.0.1:{port}")
    }

    #[test]
    fn whitespace_is_collapsed() {
        assert_eq!(normalize_whitespace("  a \n\t b  c "), "a b c");
    }

    #[test]
    fn summary_is_capped() {
        let long = "word ".repeat(200);
        let summary = clean_summary(&long).unwrap();
        assert!(summary.chars().count() <= SUMMARY_MAX_CHARS);
        assert!(summary.ends_with("..."));
        assert_eq!(clean_summary("   "), None);
        assert_eq!(clean_summary("short one").as_deref(), Some("short one"));
    }

    #[test]
    fn rejects_bad_urls() {
        assert!(matches!(parse_url("not a url"), Err(ScrapeError::InvalidUrl { .. })));
        assert!(matches!(
            parse_url("ftp://example.com/file.pdf"),
            Err(ScrapeError::InvalidUrl { .. })
        ));
        assert!(parse_url(" https://example.com/a ").is_ok());
    }

    #[test]
    fn screen_reports_forbidden_words_once() {
        let metadata = ResourceMetadata {
            title: Some("Gambling addiction".into()),
            summary: Some("More on gambling and gore".into()),
            ..Default::default()
        };
        match fetcher().screen(metadata) {
            Err(ScrapeError::Forbidden(words)) => assert_eq!(words, vec!["gambling", "gore"]),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn screen_passes_clean_metadata() {
        let metadata = ResourceMetadata {
            title: Some("Sleep hygiene basics".into()),
            ..Default::default()
        };
        assert!(fetcher().screen(metadata).is_ok());
    }

    #[tokio::test]
    async fn fetches_article_over_http() {
        let app = Router::new().route(
            "/post",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "text/html")],
                    "<html><head><title>Mindful Mornings</title></head>\
                     <body><p>Start the day slowly.</p></body></html>",
                )
            }),
        );
        let base = serve(app).await;
        let metadata = fetcher().article(&format!("{base}/post")).await.unwrap();
        assert_eq!(metadata.title.as_deref(), Some("Mindful Mornings"));
        assert_eq!(metadata.summary.as_deref(), Some("Start the day slowly."));
    }

    #[tokio::test]
    async fn http_errors_are_reported_with_status() {
        let app = Router::new().route("/gone", get(|| async { StatusCode::NOT_FOUND }));
        let base = serve(app).await;
        let err = fetcher().article(&format!("{base}/gone")).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn non_pdf_bytes_fail_to_parse() {
        let app = Router::new().route("/doc.pdf", get(|| async { "plain text, not a pdf" }));
        let base = serve(app).await;
        let err = fetcher().pdf(&format!("{base}/doc.pdf")).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Parse(_)));
    }
}
