//! Crate-level error types shared across flows, the gateway, and the HTTP surface.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// Every upstream or network failure is converted into one of these kinds before it leaves
/// a component, so the HTTP surface can decide how much of it a guest gets to see.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// No refresh token has been stored yet.
	#[error("No refresh token is available; the host must authorize first.")]
	NoRefreshToken,
	/// The authorization server refused or garbled the refresh exchange.
	#[error("Refreshing the access token failed: {reason}")]
	RefreshFailed {
		/// Upstream diagnostic text.
		reason: String,
	},
	/// The authorization-code exchange did not yield credentials.
	#[error("Authorization failed: {reason}")]
	AuthorizationFailed {
		/// Upstream or local diagnostic text.
		reason: String,
	},
	/// A proxied call hit an authorization failure that a refresh could not recover.
	#[error("The host session is no longer authorized; please reconnect.")]
	Unauthenticated,
	/// Upstream answered with a non-success status other than an authorization failure.
	#[error("Upstream rejected the request with HTTP {status}.")]
	UpstreamRejected {
		/// HTTP status code returned by upstream.
		status: u16,
		/// Response body (or a local diagnostic when the body was unusable).
		body: String,
	},
	/// Transport-level failure (DNS, TCP, TLS, timeouts).
	#[error("Upstream service is unreachable.")]
	UpstreamUnreachable {
		/// Underlying transport failure.
		#[source]
		source: BoxError,
	},
}
impl Error {
	/// Wraps a transport failure inside [`Error::UpstreamUnreachable`].
	pub fn unreachable(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::UpstreamUnreachable { source: Box::new(src) }
	}
}
impl From<ReqwestError> for Error {
	fn from(e: ReqwestError) -> Self {
		if e.is_builder() {
			return ConfigError::http_client_build(e).into();
		}

		Self::unreachable(e)
	}
}

/// Configuration and validation failures raised at startup.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A required option was not supplied by any recognized variable.
	#[error("Missing required configuration `{name}`; set one of {candidates}.")]
	Missing {
		/// Canonical option name.
		name: &'static str,
		/// Comma-separated list of accepted variable names.
		candidates: String,
	},
	/// An option that must be a URL failed to parse.
	#[error("Configuration `{name}` is not a valid URL.")]
	InvalidUrl {
		/// Canonical option name.
		name: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The listening port is not a valid TCP port.
	#[error("Configuration `port` is not a valid TCP port: {value}.")]
	InvalidPort {
		/// Raw value that failed to parse.
		value: String,
	},
	/// The renewal period is not a positive number of seconds.
	#[error("Configuration `renew_secs` must be a positive integer: {value}.")]
	InvalidRenewPeriod {
		/// Raw value that failed to parse.
		value: String,
	},
	/// A provider endpoint failed validation.
	#[error(transparent)]
	Endpoint(#[from] crate::provider::ProviderEndpointsError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<reqwest::Error> for ConfigError {
	fn from(e: reqwest::Error) -> Self {
		Self::http_client_build(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn upstream_rejected_reports_status_only() {
		let err =
			Error::UpstreamRejected { status: 404, body: "{\"error\":\"NO_ACTIVE_DEVICE\"}".into() };

		assert_eq!(err.to_string(), "Upstream rejected the request with HTTP 404.");
	}

	#[test]
	fn unreachable_exposes_transport_source() {
		let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
		let err = Error::unreachable(io);
		let source = StdError::source(&err).expect("Unreachable errors should keep their source.");

		assert_eq!(source.to_string(), "refused");
	}

	#[test]
	fn config_error_converts_transparently() {
		let err: Error = ConfigError::InvalidPort { value: "http".into() }.into();

		assert!(matches!(err, Error::Config(ConfigError::InvalidPort { .. })));
		assert!(err.to_string().contains("http"));
	}
}
