//! HTML article metadata via OpenGraph tags and document fallbacks.

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Url;
use scraper::{Html, Selector};

use super::{ResourceMetadata, clean_summary, non_empty};

/// Extract metadata from an HTML page fetched from `base`.
pub fn parse_article(html: &str, base: &Url) -> ResourceMetadata {
    let doc = Html::parse_document(html);

    let title = meta_content(&doc, r#"meta[property="og:title"]"#)
        .or_else(|| first_text(&doc, "title"))
        .or_else(|| first_text(&doc, "h1"));

    let thumbnail = meta_content(&doc, r#"meta[property="og:image"]"#)
        .and_then(|src| base.join(&src).ok())
        .map(String::from);

    let mut authors: Vec<String> = Vec::new();
    for css in [r#"meta[name="author"]"#, r#"meta[property="article:author"]"#] {
        for author in all_meta_content(&doc, css) {
            if !authors.contains(&author) {
                authors.push(author);
            }
        }
    }

    let publish_date = meta_content(&doc, r#"meta[property="article:published_time"]"#)
        .and_then(|raw| parse_date(&raw));

    let summary = meta_content(&doc, r#"meta[property="og:description"]"#)
        .or_else(|| meta_content(&doc, r#"meta[name="description"]"#))
        .or_else(|| first_text(&doc, "p"))
        .and_then(|raw| clean_summary(&raw));

    ResourceMetadata {
        title,
        thumbnail,
        authors,
        publish_date,
        summary,
    }
}

fn meta_content(doc: &Html, css: &str) -> Option<String> {
    all_meta_content(doc, css).into_iter().next()
}

fn all_meta_content(doc: &Html, css: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(css) else {
        return Vec::new();
    };
    doc.select(&selector)
        .filter_map(|el| el.value().attr("content"))
        .filter_map(non_empty)
        .collect()
}

/// Text of the first matching element that has any.
fn first_text(doc: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    doc.select(&selector)
        .find_map(|el| non_empty(&el.text().collect::<String>()))
}

/// RFC 3339 timestamps, or bare `YYYY-MM-DD` dates at midnight UTC.
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    fn base() -> Url {
        Url::parse("https://blog.example.com/posts/sleep").unwrap()
    }

    #[test]
    fn prefers_open_graph_tags() {
        let html = r#"<html><head>
            <title>Fallback title</title>
            <meta property="og:title" content="  Better   Sleep for Students ">
            <meta property="og:image" content="/img/cover.jpg">
            <meta property="og:description" content="Seven habits that help.">
            <meta name="description" content="Not this one">
            <meta name="author" content="Dr. Meera Iyer">
            <meta property="article:author" content="Dr. Meera Iyer">
            <meta property="article:author" content="Sam Patel">
            <meta property="article:published_time" content="2024-03-15T08:30:00+05:30">
        </head><body><p>Body text</p></body></html>"#;

        let meta = parse_article(html, &base());
        assert_eq!(meta.title.as_deref(), Some("Better Sleep for Students"));
        assert_eq!(
            meta.thumbnail.as_deref(),
            Some("https://blog.example.com/img/cover.jpg")
        );
        assert_eq!(meta.summary.as_deref(), Some("Seven habits that help."));
        assert_eq!(meta.authors, vec!["Dr. Meera Iyer", "Sam Patel"]);
        assert_eq!(
            meta.publish_date,
            Some(Utc.with_ymd_and_hms(2024, 3, 15, 3, 0, 0).unwrap())
        );
    }

    #[test]
    fn falls_back_to_document_content() {
        let html = r#"<html><body>
            <h1>Exam Week Survival</h1>
            <p>   </p>
            <p>Plan short breaks
               between study blocks.</p>
        </body></html>"#;

        let meta = parse_article(html, &base());
        assert_eq!(meta.title.as_deref(), Some("Exam Week Survival"));
        assert_eq!(
            meta.summary.as_deref(),
            Some("Plan short breaks between study blocks.")
        );
        assert!(meta.thumbnail.is_none());
        assert!(meta.authors.is_empty());
        assert!(meta.publish_date.is_none());
    }

    #[test]
    fn description_meta_used_before_paragraph() {
        let html = r#"<head><meta name="description" content="Short intro"></head>
            <body><p>Long paragraph</p></body>"#;
        let meta = parse_article(html, &base());
        assert_eq!(meta.summary.as_deref(), Some("Short intro"));
    }

    #[test]
    fn parses_plain_dates() {
        assert_eq!(
            parse_date("2023-12-01"),
            Some(Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_date("last tuesday"), None);
    }

    #[test]
    fn empty_page_yields_empty_metadata() {
        assert_eq!(parse_article("", &base()), ResourceMetadata::default());
    }
}
