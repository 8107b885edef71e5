//! Parse stage: lenient HTML → (title, plain-text body) extraction.

mod pool;

pub use pool::spawn_pool;

use articlecrawler_core::types::{FetchResult, ParseResult};
use scraper::{Html, Selector};

/// Extract title and body text from a fetch result. Propagates upstream
/// errors unchanged (same URL, same error text).
pub fn parse(input: FetchResult) -> ParseResult {
    if let Some(error) = input.error {
        return ParseResult::err(input.url, error);
    }

    let body_str = String::from_utf8_lossy(&input.body);
    let document = Html::parse_document(&body_str);

    let title = title_selector()
        .and_then(|sel| document.select(&sel).next())
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let paragraphs: Vec<String> = paragraph_selector()
        .map(|sel| {
            document
                .select(&sel)
                .map(|el| el.text().collect::<String>().trim().to_string())
                .filter(|t| !t.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let body = if paragraphs.is_empty() {
        document
            .root_element()
            .text()
            .collect::<String>()
            .trim()
            .to_string()
    } else {
        paragraphs.join("\n\n").trim().to_string()
    };

    ParseResult::ok(input.url, title, body)
}

fn title_selector() -> Option<Selector> {
    Selector::parse("title").ok()
}

fn paragraph_selector() -> Option<Selector> {
    Selector::parse("p").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn url() -> Url {
        Url::parse("https://example.com").unwrap()
    }

    #[test]
    fn extracts_title_and_paragraphs() {
        let html = "<html><title>T</title><body><p>Hello world.</p></body></html>";
        let input = FetchResult::ok(url(), html.as_bytes().to_vec(), 200);
        let result = parse(input);
        assert_eq!(result.title, "T");
        assert_eq!(result.body, "Hello world.");
        assert!(!result.is_err());
    }

    #[test]
    fn joins_multiple_paragraphs_with_blank_line() {
        let html = "<html><body><p> First. </p><p>Second.</p></body></html>";
        let input = FetchResult::ok(url(), html.as_bytes().to_vec(), 200);
        let result = parse(input);
        assert_eq!(result.body, "First.\n\nSecond.");
    }

    #[test]
    fn empty_title_when_absent() {
        let html = "<html><body><p>Body.</p></body></html>";
        let input = FetchResult::ok(url(), html.as_bytes().to_vec(), 200);
        let result = parse(input);
        assert_eq!(result.title, "");
    }

    #[test]
    fn falls_back_to_document_text_without_paragraphs() {
        let html = "<html><body><div>Just a div, no p tags.</div></body></html>";
        let input = FetchResult::ok(url(), html.as_bytes().to_vec(), 200);
        let result = parse(input);
        assert_eq!(result.body, "Just a div, no p tags.");
    }

    #[test]
    fn propagates_upstream_error() {
        let input = FetchResult::err(url(), "connection refused");
        let result = parse(input);
        assert!(result.is_err());
        assert_eq!(result.error.as_deref(), Some("connection refused"));
    }

    #[test]
    fn lenient_with_malformed_html() {
        let html = "<html><title>Broken<body><p>Unclosed tags everywhere";
        let input = FetchResult::ok(url(), html.as_bytes().to_vec(), 200);
        let result = parse(input);
        assert!(result.body.contains("Unclosed tags everywhere"));
    }
}
