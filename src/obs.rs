//! Observability helpers for host flows.
//!
//! Every flow runs inside a `party_queue.flow` span carrying `flow` and `stage` fields.
//! Enable the `metrics` feature to increment the `party_queue_flow_total` counter for
//! every attempt/success/failure, labeled by `flow` + `outcome`.

mod tracing;

pub use tracing::*;

// self
use crate::_prelude::*;

/// Counter incremented per flow outcome when the `metrics` feature is enabled.
pub const FLOW_COUNTER: &str = "party_queue_flow_total";

/// Flow kinds observed by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// One-time authorization-code exchange.
	Authorization,
	/// Refresh token exchange.
	Refresh,
	/// Catalog search proxied for a guest.
	Search,
	/// Enqueue-track proxied for a guest.
	Enqueue,
	/// Readiness status resolution.
	Status,
	/// Scheduled background renewal.
	Renewal,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Authorization => "authorization",
			FlowKind::Refresh => "refresh",
			FlowKind::Search => "search",
			FlowKind::Enqueue => "enqueue",
			FlowKind::Status => "status",
			FlowKind::Renewal => "renewal",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a host helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside a flow span and records attempt plus success/failure outcomes.
pub(crate) async fn observe<T, Fut>(kind: FlowKind, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = FlowSpan::new(kind, stage);

	count(kind, FlowOutcome::Attempt);

	let result = span.instrument(fut).await;

	count(kind, if result.is_ok() { FlowOutcome::Success } else { FlowOutcome::Failure });

	result
}

#[cfg(feature = "metrics")]
fn count(kind: FlowKind, outcome: FlowOutcome) {
	metrics::counter!(FLOW_COUNTER, "flow" => kind.as_str(), "outcome" => outcome.as_str())
		.increment(1);
}

#[cfg(not(feature = "metrics"))]
fn count(_: FlowKind, _: FlowOutcome) {}
