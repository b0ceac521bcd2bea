use std::time::Duration;

use ratelimit_registry::{AlgorithmKind, Decision, RateLimitConfig, RateLimiterRegistry};

fn registry(max_requests: u32, window: Duration, algorithm: AlgorithmKind) -> RateLimiterRegistry {
    let registry = RateLimiterRegistry::new();
    registry
        .register("client", RateLimitConfig::new(max_requests, window, algorithm))
        .unwrap();
    registry
}

fn ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

#[test]
fn log_prunes_exactly_one_window_back() {
    let lim = registry(3, ms(1000), AlgorithmKind::SlidingWindowLog);

    assert!(lim.allow_at("client", ms(0)).unwrap().is_allowed());
    assert!(lim.allow_at("client", ms(500)).unwrap().is_allowed());
    assert!(lim.allow_at("client", ms(900)).unwrap().is_allowed());

    let info = lim.allow_at("client", ms(950)).unwrap();
    assert!(!info.is_allowed());
    // Capacity frees when the oldest entry (t=0) ages out of the window.
    assert_eq!(info.reset_at, ms(1000));
    assert!(lim.allow_at("client", ms(1000)).unwrap().is_allowed());
}

#[test]
fn log_has_no_boundary_burst() {
    // The very trace that double-admits under a fixed window stays exactly
    // limited under the log.
    let lim = registry(3, ms(1000), AlgorithmKind::SlidingWindowLog);

    for t in [800, 850, 900] {
        assert!(lim.allow_at("client", ms(t)).unwrap().is_allowed());
    }
    let info = lim.allow_at("client", ms(1050)).unwrap();
    assert!(!info.is_allowed());
    assert_eq!(info.reset_at, ms(1800));
    assert!(lim.allow_at("client", ms(1800)).unwrap().is_allowed());
}

#[test]
fn log_remaining_quota_is_read_only() {
    let lim = registry(3, ms(1000), AlgorithmKind::SlidingWindowLog);
    lim.allow_at("client", ms(100)).unwrap();
    lim.allow_at("client", ms(600)).unwrap();

    assert_eq!(lim.remaining_quota_at("client", ms(700)).unwrap(), 1);
    // At t=1.2s the t=0.1s entry has aged out of the trailing window.
    assert_eq!(lim.remaining_quota_at("client", ms(1200)).unwrap(), 2);
    // The projection must not have pruned anything for real.
    assert_eq!(lim.remaining_quota_at("client", ms(700)).unwrap(), 1);
}

#[test]
fn counter_interpolates_previous_window() {
    let lim = registry(4, ms(1000), AlgorithmKind::SlidingWindowCounter);

    // Fill the first window.
    for t in [0, 200, 400, 600] {
        assert!(lim.allow_at("client", ms(t)).unwrap().is_allowed());
    }

    // At the boundary the previous window still carries full weight.
    assert!(!lim.allow_at("client", ms(1000)).unwrap().is_allowed());
    // At t=1.2s its weight has decayed to 0.8: estimate 4 * 0.8 = 3.2 < 4.
    assert!(lim.allow_at("client", ms(1200)).unwrap().is_allowed());
}

#[test]
fn counter_agrees_with_log_at_low_rate() {
    let log = registry(10, ms(1000), AlgorithmKind::SlidingWindowLog);
    let counter = registry(10, ms(1000), AlgorithmKind::SlidingWindowCounter);

    // Well below max_requests the approximation is exact: identical
    // decision sequences.
    for step in 0..14 {
        let now = ms(300 * step);
        let from_log = log.allow_at("client", now).unwrap().decision;
        let from_counter = counter.allow_at("client", now).unwrap().decision;
        assert!(from_log.is_allowed());
        assert_eq!(from_log, from_counter, "diverged at step {step}");
    }
}

#[test]
fn counter_divergence_from_log_is_bounded_at_the_limit() {
    // Offered rate exactly max_requests per window. The log admits the
    // whole trace; the two-bucket estimate may reject at most one request
    // per window boundary it crosses.
    let log = registry(4, ms(1000), AlgorithmKind::SlidingWindowLog);
    let counter = registry(4, ms(1000), AlgorithmKind::SlidingWindowCounter);

    let trace = [0, 200, 400, 600, 1000, 1200, 1400, 1600, 2000, 2200, 2400, 2600];
    let mut log_decisions = Vec::new();
    let mut counter_decisions = Vec::new();
    for &t in &trace {
        log_decisions.push(log.allow_at("client", ms(t)).unwrap().decision);
        counter_decisions.push(counter.allow_at("client", ms(t)).unwrap().decision);
    }

    assert!(log_decisions.iter().all(|d| d.is_allowed()));

    let rejected: Vec<u64> = trace
        .iter()
        .zip(&counter_decisions)
        .filter(|(_, d)| **d == Decision::Rejected)
        .map(|(&t, _)| t)
        .collect();
    assert_eq!(rejected, vec![1000, 2600]);

    let divergences = log_decisions
        .iter()
        .zip(&counter_decisions)
        .filter(|(l, c)| l != c)
        .count();
    let boundaries_crossed = 2;
    assert!(divergences <= boundaries_crossed);
}

#[test]
fn counter_rejected_then_allowed_at_reset_time() {
    let lim = registry(2, ms(1000), AlgorithmKind::SlidingWindowCounter);
    assert!(lim.allow_at("client", ms(100)).unwrap().is_allowed());
    assert!(lim.allow_at("client", ms(500)).unwrap().is_allowed());

    let info = lim.allow_at("client", ms(600)).unwrap();
    assert!(!info.is_allowed());
    // The estimate only dips below the limit just past the rollover.
    assert_eq!(info.reset_at, Duration::new(1, 1));
    assert!(lim.allow_at("client", info.reset_at).unwrap().is_allowed());
}

#[test]
fn counter_remaining_quota_follows_decay_read_only() {
    let lim = registry(4, ms(1000), AlgorithmKind::SlidingWindowCounter);
    for t in [0, 200, 400, 600] {
        lim.allow_at("client", ms(t)).unwrap();
    }

    assert_eq!(lim.remaining_quota_at("client", ms(1000)).unwrap(), 0);
    // estimate = 4 * 0.8 = 3.2, ceil = 4.
    assert_eq!(lim.remaining_quota_at("client", ms(1200)).unwrap(), 0);
    // estimate = 4 * 0.5 = 2.
    assert_eq!(lim.remaining_quota_at("client", ms(1500)).unwrap(), 2);
    assert_eq!(lim.remaining_quota_at("client", ms(1500)).unwrap(), 2);
}
