//! Process-wide refresh coordination.
//!
//! [`RefreshCoordinator`] owns the `Idle`/`Refreshing` state machine. The first caller that
//! observes `Idle` receives a [`RefreshLease`] and performs the network exchange; everyone
//! arriving while the lease is held is queued as a waiter. The check-and-set happens inside a
//! single lock section, so the coordinator is safe on multi-threaded runtimes.

// std
use std::mem;
// crates.io
use tokio::sync::oneshot;
// self
use crate::{_prelude::*, auth::TokenSecret};

/// Completion handle held by a queued waiter.
///
/// Resolves to the renewed access token, or errors with
/// [`RecvError`](oneshot::error::RecvError) when the refresh was abandoned.
pub(crate) type Waiter = oneshot::Receiver<TokenSecret>;

/// Coarse refresh state exposed for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshPhase {
	/// No refresh is in flight.
	Idle,
	/// A refresh is in flight.
	Refreshing,
}

#[derive(Default)]
enum RefreshState {
	#[default]
	Idle,
	Refreshing { waiters: Vec<oneshot::Sender<TokenSecret>> },
}

/// Role assigned to a caller that needs a renewed access token.
pub(crate) enum Ticket<'a> {
	/// Caller must perform the refresh and settle the lease.
	Leader(RefreshLease<'a>),
	/// Caller must await the leader's outcome.
	Waiter(Waiter),
}

/// Single-flight refresh state shared by every clone of a gateway.
#[derive(Default)]
pub(crate) struct RefreshCoordinator {
	state: Mutex<RefreshState>,
}
impl RefreshCoordinator {
	/// Returns the current phase.
	pub(crate) fn phase(&self) -> RefreshPhase {
		match &*self.state.lock() {
			RefreshState::Idle => RefreshPhase::Idle,
			RefreshState::Refreshing { .. } => RefreshPhase::Refreshing,
		}
	}

	/// Number of callers queued behind the in-flight refresh.
	pub(crate) fn waiting(&self) -> usize {
		match &*self.state.lock() {
			RefreshState::Idle => 0,
			RefreshState::Refreshing { waiters } => waiters.len(),
		}
	}

	/// Transitions `Idle → Refreshing` for the first caller, queues everyone else.
	pub(crate) fn join(&self) -> Ticket<'_> {
		let mut state = self.state.lock();

		if let RefreshState::Refreshing { waiters } = &mut *state {
			let (tx, rx) = oneshot::channel();

			waiters.push(tx);

			return Ticket::Waiter(rx);
		}

		*state = RefreshState::Refreshing { waiters: Vec::new() };

		Ticket::Leader(RefreshLease { coordinator: self, settled: false })
	}

	/// Transitions back to `Idle`, handing out the queued waiters in registration order.
	fn release(&self) -> Vec<oneshot::Sender<TokenSecret>> {
		match mem::replace(&mut *self.state.lock(), RefreshState::Idle) {
			RefreshState::Idle => Vec::new(),
			RefreshState::Refreshing { waiters } => waiters,
		}
	}
}
impl Debug for RefreshCoordinator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshCoordinator")
			.field("phase", &self.phase())
			.field("waiting", &self.waiting())
			.finish()
	}
}

/// Exclusive right to perform the in-flight refresh.
///
/// Dropping an unsettled lease abandons the waiters so a cancelled leader can never wedge the
/// coordinator in `Refreshing`.
pub(crate) struct RefreshLease<'a> {
	coordinator: &'a RefreshCoordinator,
	settled: bool,
}
impl RefreshLease<'_> {
	/// Returns to `Idle` and hands `token` to every waiter; yields the number notified.
	pub(crate) fn complete(mut self, token: &TokenSecret) -> usize {
		self.settled = true;

		let waiters = self.coordinator.release();
		let notified = waiters.len();

		for waiter in waiters {
			// A waiter whose task was dropped no longer needs the token.
			let _ = waiter.send(token.clone());
		}

		notified
	}

	/// Returns to `Idle` and drops every waiter unresolved; yields the number abandoned.
	pub(crate) fn abandon(mut self) -> usize {
		self.settled = true;

		self.coordinator.release().len()
	}
}
impl Drop for RefreshLease<'_> {
	fn drop(&mut self) {
		if !self.settled {
			self.coordinator.release();
		}
	}
}
