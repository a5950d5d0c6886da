// crates.io
use tracing::instrument::Instrumented;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
// self
use crate::{_prelude::*, obs::FlowKind};

/// Default filter applied when `RUST_LOG` is unset.
pub const DEFAULT_LOG_DIRECTIVE: &str = "party_queue=info";

/// A span builder used by host flows.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided flow kind + stage.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		let span = tracing::info_span!("party_queue.flow", flow = kind.as_str(), stage);

		Self { span }
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		tracing::Instrument::instrument(fut, self.span.clone())
	}
}

/// Installs the global fmt subscriber, honoring `RUST_LOG` and falling back to
/// [`DEFAULT_LOG_DIRECTIVE`].
pub fn install_subscriber() {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE));

	tracing_subscriber::registry()
		.with(filter)
		.with(tracing_subscriber::fmt::layer())
		.try_init()
		.ok();
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = FlowSpan::new(FlowKind::Refresh, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}

	#[test]
	fn install_subscriber_is_idempotent() {
		install_subscriber();
		install_subscriber();
	}
}
