// src/checker/html.rs
// =============================================================================
// This module pulls link candidates out of HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever, so broken markup still parses into *something*
//
// Every element with an `href` attribute yields a hyperlink, and every
// element with a `src` attribute yields an embedded resource. Values are
// returned raw; resolving them to absolute URLs is the crawler's job.
//
// Rust concepts:
// - Enums: LinkKind says which attribute a link came from
// - Iterators: select() walks all matching elements lazily
// =============================================================================

use scraper::{Html, Selector};

/// Which attribute a link was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// An `href` attribute (`<a>`, `<link>`, `<area>`, ...)
    Hyperlink,
    /// A `src` attribute (`<img>`, `<script>`, `<iframe>`, ...)
    Resource,
}

impl LinkKind {
    fn attribute(self) -> &'static str {
        match self {
            LinkKind::Hyperlink => "href",
            LinkKind::Resource => "src",
        }
    }
}

/// One raw attribute value found on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLink {
    pub kind: LinkKind,
    pub raw: String,
}

impl ExtractedLink {
    pub fn new(kind: LinkKind, raw: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
        }
    }
}

/// What we learned from parsing one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// Value of the first `<base href="...">`, if the page has one
    pub base_href: Option<String>,
    pub links: Vec<ExtractedLink>,
}

/// Parses an HTML document and collects every `href` and `src` value.
///
/// Never fails: malformed markup just yields fewer (or zero) links.
///
/// Example:
///   html = "<a href='/docs'>Docs</a><img src='logo.png'>"
///   links = [Hyperlink("/docs"), Resource("logo.png")]
pub fn parse_page(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    // These selectors are constants and known to be valid, so unwrap() can
    // only panic on a programmer error
    let base_selector = Selector::parse("base[href]").unwrap();
    let base_href = document
        .select(&base_selector)
        .next()
        .and_then(|element| element.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty());

    let mut links = Vec::new();
    for kind in [LinkKind::Hyperlink, LinkKind::Resource] {
        let attribute = kind.attribute();
        let selector = Selector::parse(&format!("[{}]", attribute)).unwrap();

        for element in document.select(&selector) {
            if let Some(value) = element.value().attr(attribute) {
                links.push(ExtractedLink::new(kind, value));
            }
        }
    }

    ParsedPage { base_href, links }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_href_and_src() {
        let html = r#"
            <a href="/docs">Docs</a>
            <link rel="stylesheet" href="style.css">
            <img src="logo.png">
            <script src="https://cdn.example.test/app.js"></script>
        "#;
        let page = parse_page(html);
        assert_eq!(
            page.links,
            vec![
                ExtractedLink::new(LinkKind::Hyperlink, "/docs"),
                ExtractedLink::new(LinkKind::Hyperlink, "style.css"),
                ExtractedLink::new(LinkKind::Resource, "logo.png"),
                ExtractedLink::new(LinkKind::Resource, "https://cdn.example.test/app.js"),
            ]
        );
        assert_eq!(page.base_href, None);
    }

    #[test]
    fn test_base_href() {
        let html = r#"<head><base href=" /static/ "></head><a href="x">X</a>"#;
        let page = parse_page(html);
        assert_eq!(page.base_href.as_deref(), Some("/static/"));
    }

    #[test]
    fn test_malformed_markup_does_not_fail() {
        let page = parse_page("<a href='/ok'><div <<< </a");
        assert!(page.links.iter().any(|l| l.raw == "/ok"));

        let page = parse_page("");
        assert!(page.links.is_empty());
    }

    #[test]
    fn test_plain_text_has_no_links() {
        let page = parse_page("just some text with http://example.test inside");
        assert!(page.links.is_empty());
    }
}
