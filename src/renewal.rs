//! Background renewal keeping the host credential warm between guest requests.

// std
use std::time::Duration as StdDuration;
// crates.io
use tokio::{
	task::JoinHandle,
	time::{self, MissedTickBehavior},
};
// self
use crate::{
	flows::Host,
	obs::{FlowKind, FlowSpan},
};

/// Spawns a task that refreshes the host credential every `period`.
///
/// Ticks are skipped while no refresh token is stored, and failures are logged without
/// stopping the schedule. Renewals go through the same single-flight guard as on-demand
/// refreshes. Abort the returned handle to stop the schedule.
pub fn spawn_renewal(host: Host, period: StdDuration) -> JoinHandle<()> {
	tokio::spawn(async move {
		let mut interval = time::interval_at(time::Instant::now() + period, period);

		interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

		loop {
			interval.tick().await;

			renew_once(&host).await;
		}
	})
}

async fn renew_once(host: &Host) {
	if host.store.get().refresh_token.is_none() {
		tracing::debug!("Renewal skipped; no refresh token stored.");

		return;
	}

	let span = FlowSpan::new(FlowKind::Renewal, "scheduled_refresh");

	match span.instrument(host.refresh()).await {
		Ok(_) => tracing::info!("Scheduled renewal completed."),
		Err(err) => tracing::warn!(error = %err, "Scheduled renewal failed."),
	}
}
