//! Document parsing
//!
//! Turns fetched bytes into a `scraper` document tree. The HTML tokenizer is
//! forgiving, so the only hard failure is a body with nothing in it.

use crate::ParseError;
use scraper::Html;

/// Parses raw page bytes into a document tree
///
/// Bytes that are not valid UTF-8 are decoded lossily.
///
/// # Example
///
/// ```
/// use robly::crawler::parse_document;
///
/// let document = parse_document(b"<html><head><title>Test</title></head></html>").unwrap();
/// assert_eq!(document.root_element().value().name(), "html");
/// ```
pub fn parse_document(bytes: &[u8]) -> Result<Html, ParseError> {
    let source = String::from_utf8_lossy(bytes);

    if source.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    Ok(Html::parse_document(&source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    #[test]
    fn test_parse_simple_document() {
        let document = parse_document(b"<html><body><h1>Hello</h1></body></html>").unwrap();
        let h1 = Selector::parse("h1").unwrap();
        assert_eq!(document.select(&h1).count(), 1);
    }

    #[test]
    fn test_parse_fragment_gets_wrapped() {
        let document = parse_document(b"<p>just a paragraph</p>").unwrap();
        assert_eq!(document.root_element().value().name(), "html");
    }

    #[test]
    fn test_empty_body_is_error() {
        assert!(matches!(parse_document(b""), Err(ParseError::Empty)));
        assert!(matches!(parse_document(b"  \n\t "), Err(ParseError::Empty)));
    }

    #[test]
    fn test_invalid_utf8_is_decoded_lossily() {
        let bytes = b"<html><title>caf\xe9</title></html>";
        let document = parse_document(bytes).unwrap();
        let title = Selector::parse("title").unwrap();
        let text: String = document.select(&title).next().unwrap().text().collect();
        assert!(text.starts_with("caf"));
    }
}
