//! PDF metadata from the document Info dictionary, with a first-page fallback.

use chrono::{DateTime, NaiveDate, Utc};
use lopdf::{Dictionary, Document, Object};

use super::{ResourceMetadata, clean_summary, non_empty};
use crate::error::ScrapeError;

pub fn parse_pdf(bytes: &[u8]) -> Result<ResourceMetadata, ScrapeError> {
    let doc = Document::load_mem(bytes).map_err(|e| ScrapeError::Parse(e.to_string()))?;
    let info = info_dictionary(&doc);

    let title = info_text(&doc, info, b"Title").and_then(|t| non_empty(&t));
    let authors = info_text(&doc, info, b"Author")
        .map(|a| split_authors(&a))
        .unwrap_or_default();
    let publish_date = info_text(&doc, info, b"CreationDate").and_then(|d| parse_pdf_date(&d));
    let summary = info_text(&doc, info, b"Subject")
        .and_then(|s| clean_summary(&s))
        .or_else(|| first_page_text(&doc).and_then(|t| clean_summary(&t)));

    Ok(ResourceMetadata {
        title,
        thumbnail: None,
        authors,
        publish_date,
        summary,
    })
}

fn info_dictionary(doc: &Document) -> Option<&Dictionary> {
    match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

fn info_text(doc: &Document, info: Option<&Dictionary>, key: &[u8]) -> Option<String> {
    string_entry(doc, info?, key)
}

fn string_entry(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    let object = match dict.get(key).ok()? {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    match object {
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        _ => None,
    }
}

fn first_page_text(doc: &Document) -> Option<String> {
    let first = *doc.get_pages().keys().next()?;
    doc.extract_text(&[first]).ok()
}

/// Decode a PDF text string: UTF-16BE with BOM, otherwise a single-byte encoding.
fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(rest).into_owned();
    }
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// `D:YYYYMMDDHHmmSS...`; only the date part is required.
fn parse_pdf_date(raw: &str) -> Option<DateTime<Utc>> {
    let digits: String = raw
        .trim()
        .trim_start_matches("D:")
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    if digits.len() < 8 {
        return None;
    }
    let field = |range: std::ops::Range<usize>, default: u32| {
        digits
            .get(range)
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(default)
    };
    let year = digits.get(0..4)?.parse::<i32>().ok()?;
    NaiveDate::from_ymd_opt(year, field(4..6, 1), field(6..8, 1))?
        .and_hms_opt(field(8..10, 0), field(10..12, 0), field(12..14, 0))
        .map(|dt| dt.and_utc())
}

fn split_authors(raw: &str) -> Vec<String> {
    raw.split(';').filter_map(non_empty).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;
    use lopdf::content::{Content, Operation};
    use lopdf::{Stream, dictionary};

    /// One-page PDF with a line of text and an optional Info dictionary.
    fn build_pdf(info: Option<Dictionary>) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal("Breathing exercises")]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        if let Some(info) = info {
            let info_id = doc.add_object(info);
            doc.trailer.set("Info", info_id);
        }

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn reads_info_dictionary() {
        let bytes = build_pdf(Some(dictionary! {
            "Title" => Object::string_literal("Managing Exam Stress"),
            "Author" => Object::string_literal("A. Rao; B. Chen"),
            "Subject" => Object::string_literal("A short guide for first-year students."),
            "CreationDate" => Object::string_literal("D:20240315093000+05'30'"),
        }));

        let meta = parse_pdf(&bytes).unwrap();
        assert_eq!(meta.title.as_deref(), Some("Managing Exam Stress"));
        assert_eq!(meta.authors, vec!["A. Rao", "B. Chen"]);
        assert_eq!(
            meta.summary.as_deref(),
            Some("A short guide for first-year students.")
        );
        assert_eq!(
            meta.publish_date,
            Some(Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap())
        );
        assert!(meta.thumbnail.is_none());
    }

    #[test]
    fn missing_info_is_not_an_error() {
        let meta = parse_pdf(&build_pdf(None)).unwrap();
        assert!(meta.title.is_none());
        assert!(meta.authors.is_empty());
        assert!(meta.publish_date.is_none());
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(parse_pdf(b"%PDF-nope"), Err(ScrapeError::Parse(_))));
    }

    #[test]
    fn decodes_utf16_and_single_byte_strings() {
        assert_eq!(decode_text_string(&[0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69]), "Hi");
        assert_eq!(decode_text_string(b"caf\xe9"), "café");
    }

    #[test]
    fn parses_partial_dates() {
        assert_eq!(
            parse_pdf_date("D:20231101"),
            Some(Utc.with_ymd_and_hms(2023, 11, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_pdf_date("2023"), None);
        assert_eq!(parse_pdf_date("D:20231345"), None);
    }
}
