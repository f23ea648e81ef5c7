//! Bounded retry with capped exponential backoff.
//!
//! Transport and the login flow share this policy type; each call site picks
//! its own attempt count, delays and retryable-error predicate.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::debug;

/// Attempt budget and backoff schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Total attempts including the first one. Values below 1 are treated as 1.
	pub max_attempts: u32,
	/// Wait before the first retry.
	pub initial_delay: Duration,
	/// Upper bound for any single wait.
	pub max_delay: Duration,
}

/// Final failure of a retried operation.
#[derive(Debug)]
pub struct RetryError<E> {
	pub attempts: u32,
	pub error: E,
	/// False when the operation stopped early on a non-retryable error.
	pub exhausted: bool,
}

impl RetryPolicy {
	pub const fn new(max_attempts: u32, initial_delay: Duration, max_delay: Duration) -> Self {
		Self {
			max_attempts,
			initial_delay,
			max_delay,
		}
	}

	/// Portal requests: three retries, waiting 5s, 10s, then 20s.
	pub const fn transport() -> Self {
		Self::new(4, Duration::from_secs(5), Duration::from_secs(20))
	}

	/// Login attempts: three tries, one second apart.
	pub const fn login() -> Self {
		Self::new(3, Duration::from_secs(1), Duration::from_secs(1))
	}

	/// No waiting between attempts.
	pub const fn immediate(max_attempts: u32) -> Self {
		Self::new(max_attempts, Duration::ZERO, Duration::ZERO)
	}

	fn attempts(&self) -> u32 {
		self.max_attempts.max(1)
	}

	/// Wait before retry number `retry` (1-based).
	pub fn delay_before(&self, retry: u32) -> Duration {
		let factor = 1u32.checked_shl(retry.saturating_sub(1)).unwrap_or(u32::MAX);
		self.initial_delay.saturating_mul(factor).min(self.max_delay)
	}

	/// Runs `op` until it succeeds, fails with a non-retryable error, or the
	/// attempt budget runs out. `op` receives the 1-based attempt number.
	pub async fn run<T, E, F, Fut, P>(&self, mut op: F, retryable: P) -> Result<T, RetryError<E>>
	where
		F: FnMut(u32) -> Fut,
		Fut: Future<Output = Result<T, E>>,
		P: Fn(&E) -> bool,
		E: Display,
	{
		let max = self.attempts();
		let mut attempt = 1;
		loop {
			match op(attempt).await {
				Ok(value) => return Ok(value),
				Err(error) if !retryable(&error) => {
					return Err(RetryError {
						attempts: attempt,
						error,
						exhausted: false,
					});
				}
				Err(error) if attempt >= max => {
					return Err(RetryError {
						attempts: attempt,
						error,
						exhausted: true,
					});
				}
				Err(error) => {
					let delay = self.delay_before(attempt);
					debug!(target = "wms.retry", attempt, max, delay_ms = delay.as_millis() as u64, error = %error, "attempt failed; retrying");
					if !delay.is_zero() {
						tokio::time::sleep(delay).await;
					}
					attempt += 1;
				}
			}
		}
	}
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self::transport()
	}
}
