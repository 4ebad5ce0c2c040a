//! Page extractor
//!
//! Builds the body of a `PageRecord` from a parsed document. Every field has
//! its own extraction rule returning `Result<_, FieldExtractionError>`; a
//! failing rule yields that field's default and never affects the others.
//!
//! | Field | Source | Default |
//! |-------|--------|---------|
//! | title | first `<title>` | `""` |
//! | description | `<meta name="description" content>` | `""` |
//! | keywords | `<meta name="keywords" content>`, comma separated | empty |
//! | h1s | every `<h1>` | empty |
//! | links | every `<a href>`, unresolved | empty |
//! | images | every `<img src>`, resolved against the page URL | empty |
//! | text | visible text nodes, cleaned | `""` |
//! | indexable | `<meta name="robots" content>` lacks `noindex` | `true` |

use crate::crawler::text::{TextCleaner, WhitespacePruner};
use crate::record::PageContent;
use crate::url::resolve;
use crate::FieldExtractionError;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeSet;

/// Elements whose text content is never shown to a reader
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

type FieldResult<T> = Result<T, FieldExtractionError>;

/// Extracts page content with a pluggable text cleaner
pub struct Extractor {
    cleaner: Box<dyn TextCleaner>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(Box::new(WhitespacePruner))
    }
}

impl Extractor {
    pub fn new(cleaner: Box<dyn TextCleaner>) -> Self {
        Self { cleaner }
    }

    /// Extracts every field of a page
    ///
    /// `page_url` is used to resolve relative image sources.
    ///
    /// # Example
    ///
    /// ```
    /// use robly::crawler::{parse_document, Extractor};
    ///
    /// let html = br#"<html><head><title>Home</title></head>
    ///     <body><img src="/logo.png"><a href="/about">About</a></body></html>"#;
    /// let document = parse_document(html).unwrap();
    /// let content = Extractor::default().extract("http://example.com/", &document);
    ///
    /// assert_eq!(content.title, "Home");
    /// assert_eq!(content.links, vec!["/about".to_string()]);
    /// assert!(content.images.contains("http://example.com/logo.png"));
    /// ```
    pub fn extract(&self, page_url: &str, document: &Html) -> PageContent {
        let defaults = PageContent::default();

        PageContent {
            title: field(page_url, "title", extract_title(document)),
            description: field(page_url, "description", meta_content(document, "description")),
            keywords: field(page_url, "keywords", extract_keywords(document)),
            h1s: field(page_url, "h1s", extract_h1s(document)),
            links: field(page_url, "links", extract_links(document)),
            images: field(page_url, "images", extract_images(document, page_url)),
            text: self.cleaner.clean(&visible_text(document)),
            indexable: extract_indexable(document).unwrap_or_else(|e| {
                tracing::trace!("{}: robots directive unavailable ({}), indexing allowed", page_url, e);
                defaults.indexable
            }),
        }
    }
}

/// Unwraps a field result, falling back to the field's default
fn field<T: Default>(page_url: &str, name: &str, result: FieldResult<T>) -> T {
    result.unwrap_or_else(|e| {
        tracing::trace!("{}: no {} ({})", page_url, name, e);
        T::default()
    })
}

fn selector(css: &str) -> FieldResult<Selector> {
    Selector::parse(css).map_err(|e| FieldExtractionError::Selector {
        selector: css.to_string(),
        reason: format!("{:?}", e),
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn extract_title(document: &Html) -> FieldResult<String> {
    let title = selector("title")?;
    document
        .select(&title)
        .next()
        .map(element_text)
        .ok_or(FieldExtractionError::MissingElement("title"))
}

/// Reads the `content` attribute of the first `<meta name="...">` tag
fn meta_content(document: &Html, name: &str) -> FieldResult<String> {
    let meta = selector(&format!(r#"meta[name="{}"]"#, name))?;
    let element = document
        .select(&meta)
        .next()
        .ok_or(FieldExtractionError::MissingElement("meta"))?;

    element
        .value()
        .attr("content")
        .map(str::to_string)
        .ok_or(FieldExtractionError::MissingAttribute {
            element: "meta",
            attribute: "content",
        })
}

fn extract_keywords(document: &Html) -> FieldResult<BTreeSet<String>> {
    let content = meta_content(document, "keywords")?;
    Ok(content
        .split(',')
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .map(str::to_string)
        .collect())
}

fn extract_h1s(document: &Html) -> FieldResult<BTreeSet<String>> {
    let h1 = selector("h1")?;
    Ok(document
        .select(&h1)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect())
}

/// Collects `<a href>` values in document order, first occurrence wins
fn extract_links(document: &Html) -> FieldResult<Vec<String>> {
    let anchor = selector("a[href]")?;
    let mut seen = BTreeSet::new();
    let mut links = Vec::new();

    for element in document.select(&anchor) {
        if let Some(href) = element.value().attr("href") {
            let href = href.trim();
            if !href.is_empty() && seen.insert(href.to_string()) {
                links.push(href.to_string());
            }
        }
    }

    Ok(links)
}

fn extract_images(document: &Html, page_url: &str) -> FieldResult<BTreeSet<String>> {
    let img = selector("img[src]")?;
    let sources: BTreeSet<&str> = document
        .select(&img)
        .filter_map(|element| element.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .collect();

    let mut images = BTreeSet::new();
    for src in sources {
        match resolve(page_url, src) {
            Ok(absolute) => {
                images.insert(absolute);
            }
            Err(e) => tracing::debug!("{}: dropping image {} ({})", page_url, src, e),
        }
    }

    Ok(images)
}

/// Text nodes outside script-like elements, one per line
fn visible_text(document: &Html) -> String {
    let mut chunks = Vec::new();

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map(|element| HIDDEN_ELEMENTS.contains(&element.name()))
                .unwrap_or(false)
        });

        if !hidden {
            chunks.push(&**text);
        }
    }

    chunks.join("\n")
}

/// Case-sensitive `noindex` test on the robots meta directive
fn extract_indexable(document: &Html) -> FieldResult<bool> {
    let directive = meta_content(document, "robots")?;
    Ok(!directive.contains("noindex"))
}
