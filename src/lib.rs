//! Shared playback queue proxy: guests search the catalog and enqueue tracks on one host's
//! session while a single-flight OAuth 2.0 credential broker keeps the host token fresh.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]
#![cfg_attr(test, allow(unused_crate_dependencies))]

pub mod auth;
pub mod config;
pub mod error;
pub mod flows;
pub mod gateway;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
pub mod renewal;
pub mod server;
pub mod status;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::CredentialUpdate,
		flows::Host,
		http::ReqwestHttpClient,
		provider::ProviderEndpoints,
		store::{CredentialStore, MemoryStore},
	};

	/// Client identifier used by test hosts.
	pub const TEST_CLIENT_ID: &str = "client-it";
	/// Client secret used by test hosts.
	pub const TEST_CLIENT_SECRET: &str = "secret-it";
	/// `Authorization` header value matching [`TEST_CLIENT_ID`] + [`TEST_CLIENT_SECRET`].
	pub const TEST_BASIC_AUTH: &str = "Basic Y2xpZW50LWl0OnNlY3JldC1pdA==";
	/// Redirect URI registered for test hosts.
	pub const TEST_REDIRECT_URI: &str = "http://127.0.0.1:3000/callback";

	/// Builds provider endpoints that route every call to the mock server at `base`.
	pub fn test_endpoints(base: &str) -> ProviderEndpoints {
		let base = Url::parse(base).expect("Mock server base URL should parse.");

		ProviderEndpoints::builder()
			.authorization_endpoint(
				base.join("/authorize").expect("Mock authorize endpoint should join."),
			)
			.token_endpoint(base.join("/api/token").expect("Mock token endpoint should join."))
			.api_base(base)
			.build()
			.expect("Mock provider endpoints should validate.")
	}

	/// Constructs a [`Host`] backed by an in-memory store and pointed at the mock server.
	pub fn build_test_host(base: &str) -> (Host, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn CredentialStore> = store_backend.clone();
		let redirect_uri =
			Url::parse(TEST_REDIRECT_URI).expect("Test redirect URI should parse successfully.");
		let host = Host::with_http_client(
			store,
			test_endpoints(base),
			TEST_CLIENT_ID,
			TEST_CLIENT_SECRET,
			redirect_uri,
			ReqwestHttpClient::default(),
		);

		(host, store_backend)
	}

	/// Seeds the store with an access token and an optional refresh token.
	pub fn seed_credentials(store: &MemoryStore, access: &str, refresh: Option<&str>) {
		let mut update = CredentialUpdate::new(access);

		if let Some(refresh) = refresh {
			update = update.refresh_token(refresh);
		}

		store.set(update);
	}

	/// Returns a loopback base URL with no listener behind it.
	pub fn unreachable_base() -> String {
		let listener = std::net::TcpListener::bind("127.0.0.1:0")
			.expect("Binding an ephemeral loopback port should succeed.");
		let port = listener.local_addr().expect("Ephemeral listener should expose its port.").port();

		drop(listener);

		format!("http://127.0.0.1:{port}")
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
// Reporting is installed by the binary target.
use color_eyre as _;
