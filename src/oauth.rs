//! Token endpoint facade over the `oauth2` crate.
//!
//! [`TokenEndpoint`] performs the two exchanges the host needs (authorization code and
//! refresh token) with `client_secret_basic` authentication and converts every failure into
//! a [`TokenEndpointError`] whose message is safe to surface as diagnostic text.

pub use oauth2;

// std
use std::time::Duration as StdDuration;
// crates.io
use oauth2::{
	AuthUrl, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, RedirectUrl, RefreshToken, RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError, BasicTokenResponse},
};
// self
use crate::{
	_prelude::*,
	auth::{CredentialUpdate, TokenSecret},
	error::BoxError,
	http::{ReqwestHttpClient, ResponseMetadata, ResponseMetadataSlot},
	provider::{GrantType, ProviderEndpoints},
};

type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Failures produced by a token endpoint exchange.
#[derive(Debug, ThisError)]
pub enum TokenEndpointError {
	/// The endpoint answered with an OAuth error payload.
	#[error("Token endpoint rejected the {grant} grant{}: {message}", status_suffix(.status))]
	Rejected {
		/// Grant that was attempted.
		grant: GrantType,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// OAuth `error` plus `error_description` when supplied.
		message: String,
	},
	/// The endpoint answered with a body that is not a token response.
	#[error("Token endpoint returned malformed JSON for the {grant} grant{}: {source}", status_suffix(.status))]
	Malformed {
		/// Grant that was attempted.
		grant: GrantType,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// The request never produced a response.
	#[error("Network error occurred while calling the token endpoint: {source}")]
	Transport {
		/// Transport-specific failure.
		#[source]
		source: BoxError,
	},
	/// Any other client-side failure.
	#[error("HTTP client error occurred while calling the token endpoint: {message}")]
	Other {
		/// Diagnostic text.
		message: String,
	},
}

/// Access/refresh pair issued by a successful exchange.
#[derive(Clone, Debug)]
pub struct TokenGrant {
	/// Newly issued access token.
	pub access_token: TokenSecret,
	/// Refresh token, present when the server issued or rotated one.
	pub refresh_token: Option<TokenSecret>,
	/// Declared lifetime of the access token.
	pub expires_in: Option<Duration>,
}
impl TokenGrant {
	/// Converts the grant into a store update, stamping expiry relative to `issued_at`.
	pub fn into_update(self, issued_at: OffsetDateTime) -> CredentialUpdate {
		let mut update = CredentialUpdate::new(self.access_token.expose());

		if let Some(refresh) = self.refresh_token {
			update = update.refresh_token(refresh.expose());
		}
		if let Some(lifetime) = self.expires_in {
			update = update.expires_in(issued_at, lifetime);
		}

		update
	}
}

/// Confidential-client facade for the provider's token endpoint.
pub struct TokenEndpoint {
	oauth_client: ConfiguredBasicClient,
	http_client: ReqwestHttpClient,
	client_id: String,
	token_url: Url,
}
impl TokenEndpoint {
	/// Builds the facade for the given endpoints and client credentials.
	pub fn new(
		endpoints: &ProviderEndpoints,
		client_id: &str,
		client_secret: &str,
		redirect_uri: &Url,
		http_client: ReqwestHttpClient,
	) -> Self {
		let oauth_client = BasicClient::new(ClientId::new(client_id.to_owned()))
			.set_client_secret(ClientSecret::new(client_secret.to_owned()))
			.set_auth_uri(AuthUrl::from_url(endpoints.authorization.clone()))
			.set_token_uri(TokenUrl::from_url(endpoints.token.clone()))
			.set_redirect_uri(RedirectUrl::from_url(redirect_uri.clone()));

		Self {
			oauth_client,
			http_client,
			client_id: client_id.to_owned(),
			token_url: endpoints.token.clone(),
		}
	}

	/// Exchanges a one-time authorization code for a credential pair.
	pub async fn exchange_code(&self, code: &str) -> Result<TokenGrant, TokenEndpointError> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.instrumented(meta.clone());
		let response = self
			.oauth_client
			.exchange_code(AuthorizationCode::new(code.to_owned()))
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(GrantType::AuthorizationCode, meta.take(), err))?;

		Ok(map_token_response(response))
	}

	/// Exchanges a refresh token for a new access token (and possibly a rotated refresh token).
	pub async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, TokenEndpointError> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.instrumented(meta.clone());
		let refresh_secret = RefreshToken::new(refresh_token.to_owned());
		let response = self
			.oauth_client
			.exchange_refresh_token(&refresh_secret)
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(GrantType::RefreshToken, meta.take(), err))?;

		Ok(map_token_response(response))
	}
}
impl Debug for TokenEndpoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenEndpoint")
			.field("client_id", &self.client_id)
			.field("token_url", &self.token_url.as_str())
			.finish()
	}
}

fn map_token_response(response: BasicTokenResponse) -> TokenGrant {
	TokenGrant {
		access_token: TokenSecret::new(response.access_token().secret().to_owned()),
		refresh_token: response
			.refresh_token()
			.map(|token| TokenSecret::new(token.secret().to_owned())),
		expires_in: response.expires_in().and_then(lifetime_from_std),
	}
}

fn lifetime_from_std(value: StdDuration) -> Option<Duration> {
	let lifetime = Duration::try_from(value).ok()?;

	lifetime.is_positive().then_some(lifetime)
}

fn map_request_error(
	grant: GrantType,
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<ReqwestError>>,
) -> TokenEndpointError {
	let status = meta.and_then(|value| value.status);

	match err {
		RequestTokenError::ServerResponse(response) =>
			map_server_response_error(grant, status, response),
		RequestTokenError::Request(error) => map_transport_error(error),
		RequestTokenError::Parse(source, _body) =>
			TokenEndpointError::Malformed { grant, status, source },
		RequestTokenError::Other(message) => TokenEndpointError::Other { message },
	}
}

fn map_server_response_error(
	grant: GrantType,
	status: Option<u16>,
	response: BasicErrorResponse,
) -> TokenEndpointError {
	let message = match response.error_description() {
		Some(description) => format!("{} ({description})", response.error().as_ref()),
		None => response.error().as_ref().to_string(),
	};

	TokenEndpointError::Rejected { grant, status, message }
}

fn map_transport_error(err: HttpClientError<ReqwestError>) -> TokenEndpointError {
	match err {
		HttpClientError::Reqwest(inner) => TokenEndpointError::Transport { source: inner },
		HttpClientError::Io(inner) => TokenEndpointError::Transport { source: Box::new(inner) },
		HttpClientError::Http(inner) => TokenEndpointError::Other { message: inner.to_string() },
		HttpClientError::Other(message) => TokenEndpointError::Other { message },
		_ => TokenEndpointError::Other { message: "unrecognized transport failure".into() },
	}
}

fn status_suffix(status: &Option<u16>) -> String {
	status.map(|code| format!(" (HTTP {code})")).unwrap_or_default()
}
