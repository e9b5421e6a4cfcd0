//! Optional observability helpers for gateway operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit spans named `helpdesk_gateway.call` with `op` and `stage` fields
//!   and the final HTTP `status`, plus debug/warn events around refresh transitions.
//! - Enable `metrics` to increment `helpdesk_gateway_call_total{op, outcome}` per call and
//!   `helpdesk_gateway_sign_out_total{reason}` whenever a session ends.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

pub(crate) use self::tracing::{trace_debug, trace_warn};

// self
use crate::_prelude::*;

/// Gateway operations observed by the instrumentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Authenticated request dispatched through [`Gateway::send`](crate::gateway::Gateway::send).
	Send,
	/// Access-token refresh exchange.
	Refresh,
	/// Username/password login.
	Login,
	/// Public signup.
	Signup,
	/// Organization registration.
	Register,
	/// Explicit logout.
	Logout,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::Send => "send",
			CallKind::Refresh => "refresh",
			CallKind::Login => "login",
			CallKind::Signup => "signup",
			CallKind::Register => "register",
			CallKind::Logout => "logout",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to a gateway operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Records the terminal outcome of `result` for `kind`.
pub(crate) fn record_result<T, E>(kind: CallKind, result: &Result<T, E>) {
	match result {
		Ok(_) => record_call_outcome(kind, CallOutcome::Success),
		Err(_) => record_call_outcome(kind, CallOutcome::Failure),
	}
}
