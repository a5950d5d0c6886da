//! Provider endpoint set, grant labels, and validation shared by all flows.
//!
//! The upstream is described by three base locations: the authorization page guests never
//! see, the token endpoint used for code exchanges and refreshes, and the Web API base that
//! the gateway and status resolver proxy to.

// std
use std::net::IpAddr;
// self
use crate::_prelude::*;

/// Default authorization endpoint (Spotify accounts service).
pub const DEFAULT_AUTHORIZATION_ENDPOINT: &str = "https://accounts.spotify.com/authorize";
/// Default token endpoint (Spotify accounts service).
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://accounts.spotify.com/api/token";
/// Default Web API base (Spotify Web API).
pub const DEFAULT_API_BASE: &str = "https://api.spotify.com";

/// OAuth 2.0 grant types used against the token endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GrantType {
	/// Authorization Code grant driven by the host's one-time login.
	AuthorizationCode,
	/// Refresh Token grant used to renew the access token.
	RefreshToken,
}
impl GrantType {
	/// Returns the RFC 6749 identifier for the grant type.
	pub fn as_str(self) -> &'static str {
		match self {
			GrantType::AuthorizationCode => "authorization_code",
			GrantType::RefreshToken => "refresh_token",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Errors raised while constructing or validating endpoints.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ProviderEndpointsError {
	/// Authorization endpoint is required.
	#[error("Missing authorization endpoint.")]
	MissingAuthorizationEndpoint,
	/// Token endpoint is required.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// API base is required.
	#[error("Missing API base URL.")]
	MissingApiBase,
	/// Endpoints must use HTTPS unless they point at a loopback host.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// The API base cannot carry path segments.
	#[error("The API base cannot be used as a base URL: {url}.")]
	CannotBeBase {
		/// Offending URL.
		url: String,
	},
}

/// Endpoint set the host talks to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderEndpoints {
	/// Authorization endpoint the host is redirected to.
	pub authorization: Url,
	/// Token endpoint used for exchanges and refreshes.
	pub token: Url,
	/// Base URL of the playback Web API.
	pub api: Url,
}
impl ProviderEndpoints {
	/// Creates a new builder.
	pub fn builder() -> ProviderEndpointsBuilder {
		ProviderEndpointsBuilder::default()
	}

	/// Resolves `path` (e.g. `v1/me/player`) beneath the API base.
	pub fn api_url(&self, path: &str) -> Result<Url, ProviderEndpointsError> {
		let mut url = self.api.clone();

		url.path_segments_mut()
			.map_err(|_| ProviderEndpointsError::CannotBeBase { url: self.api.to_string() })?
			.pop_if_empty()
			.extend(path.split('/').filter(|segment| !segment.is_empty()));

		Ok(url)
	}

	fn validate(&self) -> Result<(), ProviderEndpointsError> {
		validate_endpoint("authorization", &self.authorization)?;
		validate_endpoint("token", &self.token)?;
		validate_endpoint("api", &self.api)?;

		if self.api.cannot_be_a_base() {
			return Err(ProviderEndpointsError::CannotBeBase { url: self.api.to_string() });
		}

		Ok(())
	}
}
/// Builder for [`ProviderEndpoints`] values.
#[derive(Debug, Default)]
pub struct ProviderEndpointsBuilder {
	/// Authorization endpoint.
	pub authorization_endpoint: Option<Url>,
	/// Token endpoint.
	pub token_endpoint: Option<Url>,
	/// API base URL.
	pub api_base: Option<Url>,
}
impl ProviderEndpointsBuilder {
	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the API base URL.
	pub fn api_base(mut self, url: Url) -> Self {
		self.api_base = Some(url);

		self
	}

	/// Consumes the builder and validates the resulting endpoint set.
	pub fn build(self) -> Result<ProviderEndpoints, ProviderEndpointsError> {
		let endpoints = ProviderEndpoints {
			authorization: self
				.authorization_endpoint
				.ok_or(ProviderEndpointsError::MissingAuthorizationEndpoint)?,
			token: self.token_endpoint.ok_or(ProviderEndpointsError::MissingTokenEndpoint)?,
			api: self.api_base.ok_or(ProviderEndpointsError::MissingApiBase)?,
		};

		endpoints.validate()?;

		Ok(endpoints)
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ProviderEndpointsError> {
	if url.scheme() == "https" || is_loopback(url) {
		Ok(())
	} else {
		Err(ProviderEndpointsError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host_str() {
		Some("localhost") => true,
		Some(host) => host
			.trim_start_matches('[')
			.trim_end_matches(']')
			.parse::<IpAddr>()
			.is_ok_and(|ip| ip.is_loopback()),
		None => false,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse endpoint fixture.")
	}

	#[test]
	fn rejects_plain_http_for_remote_hosts() {
		let err = ProviderEndpoints::builder()
			.authorization_endpoint(url("http://accounts.example.com/authorize"))
			.token_endpoint(url("https://accounts.example.com/api/token"))
			.api_base(url("https://api.example.com"))
			.build()
			.expect_err("Remote plain-HTTP endpoints should be rejected.");

		assert!(matches!(
			err,
			ProviderEndpointsError::InsecureEndpoint { endpoint: "authorization", .. }
		));
	}

	#[test]
	fn accepts_loopback_http() {
		let endpoints = ProviderEndpoints::builder()
			.authorization_endpoint(url("http://127.0.0.1:8080/authorize"))
			.token_endpoint(url("http://localhost:8080/api/token"))
			.api_base(url("http://[::1]:8080"))
			.build()
			.expect("Loopback endpoints should validate.");

		assert_eq!(endpoints.token.as_str(), "http://localhost:8080/api/token");
	}

	#[test]
	fn reports_missing_endpoints() {
		let err = ProviderEndpoints::builder()
			.authorization_endpoint(url("https://accounts.example.com/authorize"))
			.build()
			.expect_err("Token endpoint should be required.");

		assert_eq!(err, ProviderEndpointsError::MissingTokenEndpoint);
	}

	#[test]
	fn api_url_appends_segments() {
		let mut endpoints = ProviderEndpoints::builder()
			.authorization_endpoint(url(DEFAULT_AUTHORIZATION_ENDPOINT))
			.token_endpoint(url(DEFAULT_TOKEN_ENDPOINT))
			.api_base(url(DEFAULT_API_BASE))
			.build()
			.expect("Default endpoints should validate.");

		assert_eq!(
			endpoints.api_url("v1/me/player/queue").expect("API path should join.").as_str(),
			"https://api.spotify.com/v1/me/player/queue"
		);

		endpoints.api = url("https://proxy.example.com/spotify/");

		assert_eq!(
			endpoints.api_url("/v1/search").expect("API path should join.").as_str(),
			"https://proxy.example.com/spotify/v1/search"
		);
	}

	#[test]
	fn grant_labels_match_rfc() {
		assert_eq!(GrantType::AuthorizationCode.to_string(), "authorization_code");
		assert_eq!(GrantType::RefreshToken.as_str(), "refresh_token");
	}
}
