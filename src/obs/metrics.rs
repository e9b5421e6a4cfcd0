// self
use crate::obs::{CallKind, CallOutcome};

/// Counts a gateway call outcome as `helpdesk_gateway_call_total{op, outcome}`.
pub fn record_call_outcome(kind: CallKind, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"helpdesk_gateway_call_total",
			"op" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Counts an ended session as `helpdesk_gateway_sign_out_total{reason}`.
pub fn record_sign_out(reason: &'static str) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("helpdesk_gateway_sign_out_total", "reason" => reason).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = reason;
	}
}
