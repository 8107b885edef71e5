use articlecrawler_core::types::FetchResult;
use articlecrawler_enricher::enrich;
use articlecrawler_parser::parse;
use url::Url;

/// S1: a single-paragraph page fetched, parsed, and enriched end to end
/// produces the exact derived fields the pipeline promises.
#[test]
fn single_paragraph_page_produces_expected_fields() {
    let url = Url::parse("https://example.com").unwrap();
    let html = "<html><title>T</title><body><p>Hello world.</p></body></html>";
    let fetched = FetchResult::ok(url, html.as_bytes().to_vec(), 200);

    let parsed = parse(fetched);
    assert_eq!(parsed.title, "T");
    assert_eq!(parsed.body, "Hello world.");

    let enriched = enrich(parsed);
    assert_eq!(enriched.summary, "Hello world.");
    assert_eq!(enriched.read_time_minutes, 1);
    assert_eq!(
        enriched.content_hash,
        "aa3ec16e6acc809d8b2818662276256abfd2f1b441cb51574933f3d4bd115d1"
    );
    assert!(!enriched.is_err());
}
