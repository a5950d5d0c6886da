//! Startup configuration resolved once from the process environment.
//!
//! Each option is looked up under a ranked list of variable names: the `PARTY_QUEUE_*`
//! name first, then the names earlier deployments used. A `.env` file in the working
//! directory is loaded before resolution by [`Config::from_env`].

// std
use std::time::Duration as StdDuration;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::ConfigError,
	provider::{
		DEFAULT_API_BASE, DEFAULT_AUTHORIZATION_ENDPOINT, DEFAULT_TOKEN_ENDPOINT,
		ProviderEndpoints,
	},
};

/// Listening port used when none is configured.
pub const DEFAULT_PORT: u16 = 3000;
/// Interval between background renewals when none is configured.
pub const DEFAULT_RENEW_PERIOD: StdDuration = StdDuration::from_secs(50 * 60);

const CLIENT_ID_VARS: &[&str] = &["PARTY_QUEUE_CLIENT_ID", "SPOTIFY_CLIENT_ID", "CLIENT_ID"];
const CLIENT_SECRET_VARS: &[&str] =
	&["PARTY_QUEUE_CLIENT_SECRET", "SPOTIFY_CLIENT_SECRET", "CLIENT_SECRET"];
const REDIRECT_URI_VARS: &[&str] =
	&["PARTY_QUEUE_REDIRECT_URI", "REDIRECT_URI", "SPOTIFY_REDIRECT_URI"];
const PORT_VARS: &[&str] = &["PARTY_QUEUE_PORT", "PORT"];
const RENEW_SECS_VARS: &[&str] = &["PARTY_QUEUE_RENEW_SECS"];
const AUTHORIZE_URL_VARS: &[&str] = &["PARTY_QUEUE_AUTHORIZE_URL"];
const TOKEN_URL_VARS: &[&str] = &["PARTY_QUEUE_TOKEN_URL"];
const API_URL_VARS: &[&str] = &["PARTY_QUEUE_API_URL"];

/// Fully resolved service configuration.
#[derive(Clone, Debug)]
pub struct Config {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: TokenSecret,
	/// Callback address registered with the authorization server.
	pub redirect_uri: Url,
	/// TCP port the HTTP surface listens on.
	pub port: u16,
	/// Authorization server and Web API locations.
	pub endpoints: ProviderEndpoints,
	/// Interval between background renewals.
	pub renew_period: StdDuration,
}
impl Config {
	/// Loads `.env` (when present) and resolves the configuration from the environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		if let Ok(path) = dotenvy::dotenv() {
			tracing::debug!(path = %path.display(), "Loaded environment file.");
		}

		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Resolves the configuration through `lookup`, which maps a variable name to its value.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let client_id = require(&lookup, "client_id", CLIENT_ID_VARS)?;
		let client_secret = require(&lookup, "client_secret", CLIENT_SECRET_VARS)?;
		let redirect_uri = require(&lookup, "redirect_uri", REDIRECT_URI_VARS)?;
		let redirect_uri = parse_url("redirect_uri", &redirect_uri)?;
		let port = match first(&lookup, PORT_VARS) {
			Some(value) => value.parse().map_err(|_| ConfigError::InvalidPort { value })?,
			None => DEFAULT_PORT,
		};
		let renew_period = match first(&lookup, RENEW_SECS_VARS) {
			Some(value) => match value.parse::<u64>() {
				Ok(secs) if secs > 0 => StdDuration::from_secs(secs),
				_ => return Err(ConfigError::InvalidRenewPeriod { value }),
			},
			None => DEFAULT_RENEW_PERIOD,
		};
		let endpoints = ProviderEndpoints::builder()
			.authorization_endpoint(endpoint(
				&lookup,
				"authorize_url",
				AUTHORIZE_URL_VARS,
				DEFAULT_AUTHORIZATION_ENDPOINT,
			)?)
			.token_endpoint(endpoint(&lookup, "token_url", TOKEN_URL_VARS, DEFAULT_TOKEN_ENDPOINT)?)
			.api_base(endpoint(&lookup, "api_url", API_URL_VARS, DEFAULT_API_BASE)?)
			.build()?;

		Ok(Self {
			client_id,
			client_secret: TokenSecret::new(client_secret),
			redirect_uri,
			port,
			endpoints,
			renew_period,
		})
	}
}

fn first<F>(lookup: &F, names: &[&str]) -> Option<String>
where
	F: Fn(&str) -> Option<String>,
{
	names.iter().find_map(|name| {
		lookup(name).map(|value| value.trim().to_owned()).filter(|value| !value.is_empty())
	})
}

fn require<F>(lookup: &F, name: &'static str, names: &[&str]) -> Result<String, ConfigError>
where
	F: Fn(&str) -> Option<String>,
{
	first(lookup, names).ok_or_else(|| ConfigError::Missing { name, candidates: names.join(", ") })
}

fn endpoint<F>(
	lookup: &F,
	name: &'static str,
	names: &[&str],
	default: &str,
) -> Result<Url, ConfigError>
where
	F: Fn(&str) -> Option<String>,
{
	match first(lookup, names) {
		Some(value) => parse_url(name, &value),
		None => parse_url(name, default),
	}
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
	Url::parse(value).map_err(|source| ConfigError::InvalidUrl { name, source })
}
