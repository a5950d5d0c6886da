//! Authorization-code flow that connects the host account.
//!
//! [`Host::begin_authorization`] produces the consent URL and moves the handler into
//! [`AuthorizationPhase::PendingExchange`]; the redirect lands on
//! [`Host::complete_callback`], which validates the query and hands the code to
//! [`Host::complete_authorization`].

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	flows::Host,
	obs::{self, FlowKind},
};

/// Scopes requested from the host: control the queue and read the playback state.
pub const PLAYBACK_SCOPES: [&str; 2] = ["user-modify-playback-state", "user-read-playback-state"];

const STATE_LEN: usize = 32;

/// Progress of the host connection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AuthorizationPhase {
	/// No consent round trip has started.
	#[default]
	Unauthorized,
	/// The host was sent to the authorization server and the redirect is outstanding.
	PendingExchange {
		/// Opaque value expected back on the redirect.
		state: String,
	},
	/// A code exchange stored a credential pair.
	Authorized,
}

/// Query parameters delivered to the redirect endpoint.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CallbackParams {
	/// One-time authorization code.
	pub code: Option<String>,
	/// Opaque value echoed by the authorization server.
	pub state: Option<String>,
	/// OAuth error code when the host declined or the request was invalid.
	pub error: Option<String>,
}

impl Host {
	/// Builds the consent URL the host must visit and records the pending `state`.
	pub fn begin_authorization(&self) -> Url {
		let state = random_state();
		let url = build_authorize_url(
			&self.endpoints.authorization,
			&self.client_id,
			&self.redirect_uri,
			&state,
		);

		*self.authorization.lock() = AuthorizationPhase::PendingExchange { state };

		tracing::info!("Authorization started.");

		url
	}

	/// Returns the current phase of the host connection.
	pub fn authorization_phase(&self) -> AuthorizationPhase {
		self.authorization.lock().clone()
	}

	/// Validates the redirect query and exchanges its code.
	pub async fn complete_callback(&self, params: &CallbackParams) -> Result<()> {
		if let Some(error) = &params.error {
			tracing::warn!(error = %error, "Authorization server reported an error on redirect.");

			return Err(Error::AuthorizationFailed {
				reason: format!("authorization server returned `{error}`"),
			});
		}

		let pending_state = match &*self.authorization.lock() {
			AuthorizationPhase::PendingExchange { state } => Some(state.clone()),
			_ => None,
		};

		if let Some(expected) = pending_state
			&& params.state.as_deref() != Some(expected.as_str())
		{
			return Err(Error::AuthorizationFailed { reason: "authorization state mismatch".into() });
		}

		self.complete_authorization(params.code.as_deref().unwrap_or_default()).await
	}

	/// Exchanges a one-time authorization code and stores the resulting credential pair.
	///
	/// The store is left untouched when the exchange fails.
	pub async fn complete_authorization(&self, code: &str) -> Result<()> {
		obs::observe(FlowKind::Authorization, "complete_authorization", async move {
			if code.trim().is_empty() {
				return Err(Error::AuthorizationFailed { reason: "missing authorization code".into() });
			}

			let grant = self.token_endpoint.exchange_code(code).await.map_err(|err| {
				tracing::warn!(error = %err, "Authorization code exchange failed.");

				Error::AuthorizationFailed { reason: err.to_string() }
			})?;
			let has_refresh = grant.refresh_token.is_some();

			self.store.set(grant.into_update(OffsetDateTime::now_utc()));

			*self.authorization.lock() = AuthorizationPhase::Authorized;

			tracing::info!(has_refresh, "Host connected.");

			Ok(())
		})
		.await
	}
}

fn build_authorize_url(base: &Url, client_id: &str, redirect_uri: &Url, state: &str) -> Url {
	let mut url = base.clone();

	url.query_pairs_mut()
		.append_pair("response_type", "code")
		.append_pair("client_id", client_id)
		.append_pair("scope", &PLAYBACK_SCOPES.join(" "))
		.append_pair("redirect_uri", redirect_uri.as_str())
		.append_pair("state", state);

	url
}

fn random_state() -> String {
	rand::rng().sample_iter(Alphanumeric).take(STATE_LEN).map(char::from).collect()
}
