use chrono::{DateTime, Utc};
use url::Url;

/// A URL accepted by ingress, not yet fetched.
#[derive(Debug, Clone)]
pub struct FetchJob {
    pub url: Url,
}

/// Outcome of a fetch attempt: either a body with a success-range status, or a terminal error.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub url: Url,
    pub body: Vec<u8>,
    pub status_code: u16,
    pub error: Option<String>,
}

impl FetchResult {
    pub fn ok(url: Url, body: Vec<u8>, status_code: u16) -> Self {
        Self {
            url,
            body,
            status_code,
            error: None,
        }
    }

    pub fn err(url: Url, error: impl Into<String>) -> Self {
        Self {
            url,
            body: Vec::new(),
            status_code: 0,
            error: Some(error.into()),
        }
    }

    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }
}

/// Title + plain-text body extracted from an HTML document, or a propagated error.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub url: Url,
    pub title: String,
    pub body: String,
    pub error: Option<String>,
}

impl ParseResult {
    pub fn ok(url: Url, title: String, body: String) -> Self {
        Self {
            url,
            title,
            body,
            error: None,
        }
    }

    pub fn err(url: Url, error: impl Into<String>) -> Self {
        Self {
            url,
            title: String::new(),
            body: String::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }
}

/// Derived metadata computed from a parsed article body, or a propagated error.
#[derive(Debug, Clone)]
pub struct EnrichResult {
    pub url: Url,
    pub title: String,
    pub body: String,
    pub summary: String,
    pub content_hash: String,
    pub language: String,
    pub read_time_minutes: i32,
    pub error: Option<String>,
}

impl EnrichResult {
    pub fn err(url: Url, error: impl Into<String>) -> Self {
        Self {
            url,
            title: String::new(),
            body: String::new(),
            summary: String::new(),
            content_hash: String::new(),
            language: String::new(),
            read_time_minutes: 0,
            error: Some(error.into()),
        }
    }

    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }
}

/// Persisted article row.
#[derive(Debug, Clone)]
pub struct Article {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub body: String,
    pub summary: String,
    pub content_hash: String,
    pub language: String,
    pub read_time_minutes: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of a save: whether a write occurred, and the row as it now stands
/// (either the freshly written row, or the pre-existing duplicate when
/// `inserted` is false).
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    pub inserted: bool,
    pub article: Article,
}

/// Append-only record of a terminal fetch/store outcome for a URL, recorded
/// exactly once per pipeline traversal (success or failure, never both).
#[derive(Debug, Clone)]
pub struct FetchAttempt {
    pub url: String,
    pub success: bool,
    pub response_code: i32,
    pub error_text: String,
    pub timestamp: DateTime<Utc>,
}
