//! High-level flow orchestrators powered by the [`Host`] facade.

pub mod authorize;
pub mod refresh;

pub use authorize::*;
pub use refresh::*;

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	config::Config,
	http::ReqwestHttpClient,
	oauth::TokenEndpoint,
	provider::ProviderEndpoints,
	store::{CredentialStore, MemoryStore},
};

/// Owns the host account's credential lifecycle and every upstream call made on its behalf.
///
/// The host holds the credential store, the token endpoint facade, the provider endpoints,
/// and the single-flight refresh state so the authorization flow, the refresher, the
/// playback gateway, and the status resolver all share one view of the credential pair.
/// Cloning is cheap; clones share the same state.
#[derive(Clone)]
pub struct Host {
	/// Credential store shared by every flow.
	pub store: Arc<dyn CredentialStore>,
	/// Endpoints of the authorization server and the Web API.
	pub endpoints: ProviderEndpoints,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// Fixed callback address registered with the authorization server.
	pub redirect_uri: Url,
	/// HTTP client used for every outbound Web API request.
	pub http_client: ReqwestHttpClient,
	/// Shared counters for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	token_endpoint: Arc<TokenEndpoint>,
	refresh_flight: Arc<RefreshFlight>,
	authorization: Arc<Mutex<AuthorizationPhase>>,
}
impl Host {
	/// Creates a host that reuses the caller-provided transport.
	pub fn with_http_client(
		store: Arc<dyn CredentialStore>,
		endpoints: ProviderEndpoints,
		client_id: impl Into<String>,
		client_secret: impl Into<TokenSecret>,
		redirect_uri: Url,
		http_client: ReqwestHttpClient,
	) -> Self {
		let client_id = client_id.into();
		let client_secret = client_secret.into();
		let token_endpoint = TokenEndpoint::new(
			&endpoints,
			&client_id,
			client_secret.expose(),
			&redirect_uri,
			http_client.clone(),
		);

		Self {
			store,
			endpoints,
			client_id,
			redirect_uri,
			http_client,
			refresh_metrics: Default::default(),
			token_endpoint: Arc::new(token_endpoint),
			refresh_flight: Default::default(),
			authorization: Default::default(),
		}
	}

	/// Creates a host with its own non-redirecting reqwest transport.
	pub fn new(
		store: Arc<dyn CredentialStore>,
		endpoints: ProviderEndpoints,
		client_id: impl Into<String>,
		client_secret: impl Into<TokenSecret>,
		redirect_uri: Url,
	) -> Result<Self> {
		let http_client = ReqwestHttpClient::new()?;

		Ok(Self::with_http_client(
			store,
			endpoints,
			client_id,
			client_secret,
			redirect_uri,
			http_client,
		))
	}

	/// Creates a host with an empty in-memory store from resolved configuration.
	pub fn from_config(config: &Config) -> Result<Self> {
		Self::new(
			Arc::new(MemoryStore::default()),
			config.endpoints.clone(),
			config.client_id.clone(),
			config.client_secret.clone(),
			config.redirect_uri.clone(),
		)
	}
}
impl Debug for Host {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Host")
			.field("endpoints", &self.endpoints)
			.field("client_id", &self.client_id)
			.field("redirect_uri", &self.redirect_uri.as_str())
			.field("credentials", &self.store.get())
			.finish()
	}
}
