// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for gateway dispatches and refresh rounds.
#[derive(Debug, Default)]
pub struct GatewayMetrics {
	requests: AtomicU64,
	retries: AtomicU64,
	stale_reuses: AtomicU64,
	refresh_attempts: AtomicU64,
	refresh_success: AtomicU64,
	refresh_failure: AtomicU64,
	sign_outs: AtomicU64,
}
impl GatewayMetrics {
	/// Returns the number of requests accepted by `send`.
	pub fn requests(&self) -> u64 {
		self.requests.load(Ordering::Relaxed)
	}

	/// Returns the number of retried dispatches.
	pub fn retries(&self) -> u64 {
		self.retries.load(Ordering::Relaxed)
	}

	/// Returns how often a 401 was answered by reusing an already-renewed token.
	pub fn stale_reuses(&self) -> u64 {
		self.stale_reuses.load(Ordering::Relaxed)
	}

	/// Returns the number of refresh exchanges started.
	pub fn refresh_attempts(&self) -> u64 {
		self.refresh_attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of successful refresh exchanges.
	pub fn refresh_successes(&self) -> u64 {
		self.refresh_success.load(Ordering::Relaxed)
	}

	/// Returns the number of failed refresh exchanges.
	pub fn refresh_failures(&self) -> u64 {
		self.refresh_failure.load(Ordering::Relaxed)
	}

	/// Returns the number of sign-out events emitted.
	pub fn sign_outs(&self) -> u64 {
		self.sign_outs.load(Ordering::Relaxed)
	}

	pub(crate) fn record_request(&self) {
		self.requests.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_retry(&self) {
		self.retries.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_stale_reuse(&self) {
		self.stale_reuses.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh_attempt(&self) {
		self.refresh_attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh_success(&self) {
		self.refresh_success.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh_failure(&self) {
		self.refresh_failure.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_sign_out(&self) {
		self.sign_outs.fetch_add(1, Ordering::Relaxed);
	}
}
