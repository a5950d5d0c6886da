//! Refresh token orchestration with a single-flight guard, CAS rotation, and metrics.
//!
//! Callers take a [`RefreshTicket`] from the same credential snapshot they use for an
//! upstream attempt. When that attempt fails authorization they call
//! [`Host::refresh_after`] with the ticket. The first caller through the guard performs the
//! `grant_type=refresh_token` exchange; callers that were waiting on the guard observe that
//! the credential (or the completed-attempt counter) moved past their ticket and share the
//! outcome instead of issuing their own exchange. Successful refreshes are written with
//! `CredentialStore::compare_and_swap_refresh` so a concurrent authorization is never
//! overwritten by an older refresh response.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::{CredentialState, TokenSecret},
	flows::Host,
	obs::{self, FlowKind},
	store::CompareAndSwapOutcome,
};

/// Marker of the credential revision and completed refresh attempts a caller last observed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshTicket {
	revision: u64,
	generation: u64,
}

#[derive(Debug, Default)]
pub(crate) struct RefreshFlight {
	guard: AsyncMutex<()>,
	completed: Mutex<CompletedRefresh>,
}
impl RefreshFlight {
	fn generation(&self) -> u64 {
		self.completed.lock().generation
	}

	fn completed_since(&self, ticket: RefreshTicket) -> Option<RefreshOutcome> {
		let completed = self.completed.lock();

		if completed.generation > ticket.generation { completed.outcome.clone() } else { None }
	}

	fn complete(&self, outcome: RefreshOutcome) {
		let mut completed = self.completed.lock();

		completed.generation += 1;
		completed.outcome = Some(outcome);
	}
}

#[derive(Debug, Default)]
struct CompletedRefresh {
	generation: u64,
	outcome: Option<RefreshOutcome>,
}

#[derive(Clone, Debug)]
enum RefreshOutcome {
	Refreshed(TokenSecret),
	Failed { reason: String },
}
impl RefreshOutcome {
	fn into_result(self) -> Result<TokenSecret> {
		match self {
			Self::Refreshed(token) => Ok(token),
			Self::Failed { reason } => Err(Error::RefreshFailed { reason }),
		}
	}
}

impl Host {
	/// Issues a ticket for the current credential state.
	pub fn refresh_ticket(&self) -> RefreshTicket {
		self.refresh_ticket_for(&self.store.get())
	}

	/// Issues a ticket tied to a snapshot the caller already holds.
	pub fn refresh_ticket_for(&self, state: &CredentialState) -> RefreshTicket {
		RefreshTicket { revision: state.revision, generation: self.refresh_flight.generation() }
	}

	/// Exchanges the stored refresh token for a new access token.
	pub async fn refresh(&self) -> Result<TokenSecret> {
		self.refresh_after(self.refresh_ticket()).await
	}

	/// Refreshes unless the credential already moved past `ticket`, in which case the newer
	/// credential (or the failure of the attempt that moved it) is returned without another
	/// exchange.
	pub async fn refresh_after(&self, ticket: RefreshTicket) -> Result<TokenSecret> {
		obs::observe(FlowKind::Refresh, "refresh_access_token", async move {
			if self.store.get().refresh_token.is_none() {
				return Err(Error::NoRefreshToken);
			}

			let _singleflight = self.refresh_flight.guard.lock().await;
			let current = self.store.get();

			if current.revision > ticket.revision
				&& let Some(access) = current.access_token
			{
				self.refresh_metrics.record_coalesced();
				tracing::debug!(revision = current.revision, "Credential already renewed.");

				return Ok(access);
			}
			if let Some(outcome) = self.refresh_flight.completed_since(ticket) {
				self.refresh_metrics.record_coalesced();
				tracing::debug!("Joined a refresh that completed while waiting.");

				return outcome.into_result();
			}

			let expected_refresh = current.refresh_token.ok_or(Error::NoRefreshToken)?;

			self.refresh_metrics.record_attempt();

			let outcome = self.exchange_refresh(&expected_refresh).await;

			match &outcome {
				RefreshOutcome::Refreshed(_) => self.refresh_metrics.record_success(),
				RefreshOutcome::Failed { .. } => self.refresh_metrics.record_failure(),
			}

			self.refresh_flight.complete(outcome.clone());

			outcome.into_result()
		})
		.await
	}

	async fn exchange_refresh(&self, expected_refresh: &TokenSecret) -> RefreshOutcome {
		let grant = match self.token_endpoint.refresh(expected_refresh.expose()).await {
			Ok(grant) => grant,
			Err(err) => {
				tracing::warn!(error = %err, "Access token refresh failed.");

				return RefreshOutcome::Failed { reason: err.to_string() };
			},
		};
		let rotated = grant.refresh_token.is_some();
		let update = grant.into_update(OffsetDateTime::now_utc());
		let access = update.access_token.clone();

		match self.store.compare_and_swap_refresh(Some(expected_refresh.expose()), update) {
			CompareAndSwapOutcome::Updated => {
				tracing::info!(rotated, "Access token refreshed.");

				RefreshOutcome::Refreshed(access)
			},
			CompareAndSwapOutcome::RefreshMismatch => {
				tracing::info!("Credential was replaced during refresh; keeping the newer pair.");

				RefreshOutcome::Refreshed(self.store.get().access_token.unwrap_or(access))
			},
		}
	}
}
