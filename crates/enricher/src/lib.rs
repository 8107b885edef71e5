//! Enrich stage: summary, content hash, language tag, read-time estimate.

mod pool;

pub use pool::spawn_pool;

use articlecrawler_core::types::{EnrichResult, ParseResult};
use sha2::{Digest, Sha256};

const SUMMARY_PREFIX_CHARS: usize = 400;
const WORDS_PER_MINUTE: usize = 200;

pub fn enrich(input: ParseResult) -> EnrichResult {
    if let Some(error) = input.error {
        return EnrichResult::err(input.url, error);
    }

    let summary = summarize(&input.body);
    let content_hash = content_hash(&input.body);
    let language = detect_language(&input.body);
    let read_time_minutes = read_time_minutes(&input.body);

    EnrichResult {
        url: input.url,
        title: input.title,
        body: input.body,
        summary,
        content_hash,
        language,
        read_time_minutes,
        error: None,
    }
}

fn summarize(body: &str) -> String {
    let char_count = body.chars().count();
    if char_count <= SUMMARY_PREFIX_CHARS {
        return body.to_string();
    }
    let prefix: String = body.chars().take(SUMMARY_PREFIX_CHARS).collect();
    format!("{}...", prefix.trim_end())
}

fn content_hash(body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn detect_language(body: &str) -> String {
    whatlang::detect(body)
        .map(|info| info.lang().code().to_string())
        .unwrap_or_default()
}

fn read_time_minutes(body: &str) -> i32 {
    let words = body.split_whitespace().count();
    let minutes = (words + WORDS_PER_MINUTE - 1) / WORDS_PER_MINUTE;
    minutes.max(1) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn url() -> Url {
        Url::parse("https://example.com").unwrap()
    }

    #[test]
    fn short_body_summary_is_unchanged() {
        let input = ParseResult::ok(url(), "T".to_string(), "Hello world.".to_string());
        let result = enrich(input);
        assert_eq!(result.summary, "Hello world.");
    }

    #[test]
    fn long_body_summary_is_truncated_with_ellipsis() {
        let body = "word ".repeat(200); // well over 400 chars
        let input = ParseResult::ok(url(), "T".to_string(), body.clone());
        let result = enrich(input);
        assert!(result.summary.ends_with("..."));
        assert!(result.summary.len() <= SUMMARY_PREFIX_CHARS + 3);
        assert_ne!(result.summary, body);
    }

    #[test]
    fn content_hash_is_sha256_of_body() {
        let input = ParseResult::ok(url(), "T".to_string(), "Hello world.".to_string());
        let result = enrich(input);
        assert_eq!(
            result.content_hash,
            "aa3ec16e6acc809d8b2818662276256abfd2f1b441cb51574933f3d4bd115d1"
        );
    }

    #[test]
    fn read_time_floors_at_one() {
        let input = ParseResult::ok(url(), "T".to_string(), "a few words".to_string());
        let result = enrich(input);
        assert_eq!(result.read_time_minutes, 1);
    }

    #[test]
    fn read_time_scales_with_word_count() {
        let body = "word ".repeat(450); // 450 words -> ceil(450/200) = 3
        let input = ParseResult::ok(url(), "T".to_string(), body);
        let result = enrich(input);
        assert_eq!(result.read_time_minutes, 3);
    }

    #[test]
    fn propagates_upstream_error() {
        let input = ParseResult::err(url(), "parse failed");
        let result = enrich(input);
        assert!(result.is_err());
        assert_eq!(result.error.as_deref(), Some("parse failed"));
    }
}
