//! Process-wide capture clock.
//!
//! Event timestamps are wall-clock UTC, truncated to microseconds so they
//! survive a text round-trip unchanged, and never go backwards within a
//! process even if the system clock is stepped.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// Last timestamp handed out, in microseconds since the Unix epoch.
static LAST_MICROS: AtomicI64 = AtomicI64::new(i64::MIN);

/// Current capture time, monotonic non-decreasing per process.
pub fn now() -> DateTime<Utc> {
    let wall = Utc::now();
    let wall_micros = wall.timestamp_micros();

    let mut prev = LAST_MICROS.load(Ordering::Acquire);
    let issued = loop {
        let next = wall_micros.max(prev);
        match LAST_MICROS.compare_exchange_weak(prev, next, Ordering::AcqRel, Ordering::Acquire) {
            Ok(_) => break next,
            Err(actual) => prev = actual,
        }
    };

    DateTime::from_timestamp_micros(issued).unwrap_or(wall)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_is_non_decreasing() {
        let mut last = now();
        for _ in 0..10_000 {
            let t = now();
            assert!(t >= last);
            last = t;
        }
    }

    #[test]
    fn test_now_has_microsecond_precision() {
        let t = now();
        assert_eq!(t.timestamp_subsec_nanos() % 1_000, 0);
    }

    #[test]
    fn test_now_is_non_decreasing_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                std::thread::spawn(|| {
                    let mut last = now();
                    for _ in 0..1_000 {
                        let t = now();
                        assert!(t >= last);
                        last = t;
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
