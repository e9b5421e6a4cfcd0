// self
use crate::{_prelude::*, obs::CallKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// Span wrapping one gateway call.
///
/// Carries `op` and `stage` from creation; `status` is filled once a response is known.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Opens a span for `kind` at the given call site.
	pub fn new(kind: CallKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"helpdesk_gateway.call",
				op = kind.as_str(),
				stage,
				status = tracing::field::Empty
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Records the final HTTP status of the call, when one was received.
	pub fn record_status(&self, status: Option<u16>) {
		#[cfg(feature = "tracing")]
		{
			if let Some(status) = status {
				self.span.record("status", status);
			}
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = status;
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a debug-level event when tracing is enabled.
macro_rules! trace_debug {
	($($arg:tt)*) => {
		#[cfg(feature = "tracing")]
		{
			tracing::debug!($($arg)*);
		}
	};
}
/// Emits a warn-level event when tracing is enabled.
macro_rules! trace_warn {
	($($arg:tt)*) => {
		#[cfg(feature = "tracing")]
		{
			tracing::warn!($($arg)*);
		}
	};
}
pub(crate) use {trace_debug, trace_warn};
