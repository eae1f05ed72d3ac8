//! Bounded retry with exponential backoff.

use std::fmt::Display;
use std::thread;
use std::time::Duration;

use tracing::warn;

/// Runs `op` up to `attempts` times, sleeping `base_delay`, then double,
/// between tries. Returns the first success or the last error.
pub fn retry_with_backoff<T, E, F>(attempts: u32, base_delay: Duration, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    E: Display,
{
    let attempts = attempts.max(1);
    let mut delay = base_delay;
    let mut attempt = 0;

    loop {
        attempt += 1;
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if attempt < attempts => {
                warn!(attempt, %err, "attempt failed, retrying");
                thread::sleep(delay);
                delay = delay.saturating_mul(2);
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_first_try_succeeds() {
        let calls = Cell::new(0);
        let out: Result<i32, String> = retry_with_backoff(3, Duration::ZERO, || {
            calls.set(calls.get() + 1);
            Ok(7)
        });
        assert_eq!(out.expect("ok"), 7);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_recovers_after_failures() {
        let calls = Cell::new(0);
        let out: Result<i32, String> = retry_with_backoff(3, Duration::ZERO, || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err("transient".to_string())
            } else {
                Ok(1)
            }
        });
        assert!(out.is_ok());
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_exhausts_attempts() {
        let calls = Cell::new(0);
        let out: Result<(), String> = retry_with_backoff(3, Duration::ZERO, || {
            calls.set(calls.get() + 1);
            Err("down".to_string())
        });
        assert_eq!(out.expect_err("fails"), "down");
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_zero_attempts_still_runs_once() {
        let calls = Cell::new(0);
        let _: Result<(), String> = retry_with_backoff(0, Duration::ZERO, || {
            calls.set(calls.get() + 1);
            Err("x".to_string())
        });
        assert_eq!(calls.get(), 1);
    }
}
