use std::time::{Duration, Instant};

use articlecrawler_limiter::DomainLimiter;

/// Over a steady-state window of duration T against a single host, the
/// number of accepted fetches must not exceed `rps * T + burst` (S5/property 7).
#[test]
fn steady_state_respects_rps_plus_burst() {
    let rps = 10;
    let burst = 5;
    let limiter = DomainLimiter::new(rps, burst);
    let window = Duration::from_millis(500);

    let start = Instant::now();
    let mut accepted = 0u32;
    while start.elapsed() < window {
        if limiter.allow("steady.example") {
            accepted += 1;
        }
    }

    let elapsed_secs = start.elapsed().as_secs_f64();
    let ceiling = rps as f64 * elapsed_secs + burst as f64 + 1.0; // +1 for rounding slack
    assert!(
        (accepted as f64) <= ceiling,
        "accepted {accepted} fetches in {elapsed_secs}s, ceiling was {ceiling}"
    );
}

#[test]
fn independent_hosts_do_not_share_a_budget() {
    let limiter = DomainLimiter::new(1, 1);
    assert!(limiter.allow("first.example"));
    assert!(limiter.allow("second.example"));
    assert!(!limiter.allow("first.example"));
    assert!(!limiter.allow("second.example"));
}
