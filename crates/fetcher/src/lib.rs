//! Fetch stage: per-domain rate-limited HTTP GET with bounded retries.

mod fetcher;
mod pool;

pub use fetcher::{Fetcher, FetcherConfig};
pub use pool::spawn_pool;
