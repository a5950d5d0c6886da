//! Playback gateway proxying guest requests to the Web API with the host's credential.
//!
//! Every proxied call follows the same pipeline: attempt with the current access token, and
//! on `401` ask the refresher for a new token exactly once before retrying exactly once.
//! Any other non-success status is surfaced as [`Error::UpstreamRejected`] and transport
//! failures as [`Error::UpstreamUnreachable`]; neither is retried.

mod track;

pub use track::*;

// crates.io
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::ConfigError,
	flows::Host,
	obs::{self, FlowKind},
};

/// Maximum number of tracks returned by a search.
pub const SEARCH_LIMIT: u8 = 10;

const SEARCH_PATH: &str = "v1/search";
const QUEUE_PATH: &str = "v1/me/player/queue";

/// Web API call described independently of the credential attached to it.
#[derive(Clone, Debug)]
pub struct ProxiedRequest {
	method: Method,
	path: &'static str,
	query: Vec<(&'static str, String)>,
}
impl ProxiedRequest {
	/// Describes a `GET` beneath the API base.
	pub fn get(path: &'static str) -> Self {
		Self { method: Method::GET, path, query: Vec::new() }
	}

	/// Describes a bodiless `POST` beneath the API base.
	pub fn post(path: &'static str) -> Self {
		Self { method: Method::POST, path, query: Vec::new() }
	}

	/// Appends a query parameter.
	pub fn query(mut self, name: &'static str, value: impl Into<String>) -> Self {
		self.query.push((name, value.into()));

		self
	}
}

/// Status and raw body of an upstream answer.
#[derive(Clone, Debug)]
pub struct UpstreamResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body as text; empty for bodiless answers.
	pub body: String,
}
impl UpstreamResponse {
	/// Returns `true` for `2xx` statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Decodes the body, reporting the failing JSON path as an upstream rejection.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_str(&self.body);

		serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
			tracing::warn!(status = self.status, path = %err.path(), "Upstream body is malformed.");

			Error::UpstreamRejected {
				status: self.status,
				body: format!("malformed response at `{}`: {}", err.path(), err.inner()),
			}
		})
	}

	fn into_success(self) -> Result<Self> {
		if self.is_success() {
			return Ok(self);
		}

		tracing::warn!(status = self.status, "Upstream rejected the request.");

		Err(Error::UpstreamRejected { status: self.status, body: self.body })
	}
}

impl Host {
	/// Searches the catalog for tracks matching `query`.
	///
	/// Blank queries and a disconnected host yield an empty list without contacting
	/// upstream.
	pub async fn search(&self, query: &str) -> Result<Vec<Track>> {
		if query.trim().is_empty() {
			return Ok(Vec::new());
		}
		if !self.store.get().is_connected() {
			tracing::debug!("Search skipped; host is not connected.");

			return Ok(Vec::new());
		}

		obs::observe(FlowKind::Search, "search_tracks", async move {
			let request = ProxiedRequest::get(SEARCH_PATH)
				.query("type", "track")
				.query("limit", SEARCH_LIMIT.to_string())
				.query("q", query);
			let page = self.execute(&request).await?.json::<SearchPage>()?;

			Ok(page.tracks.map(|tracks| tracks.items).unwrap_or_default())
		})
		.await
	}

	/// Appends the track identified by `uri` to the host's playback queue.
	pub async fn enqueue(&self, uri: &str) -> Result<()> {
		obs::observe(FlowKind::Enqueue, "enqueue_track", async move {
			if uri.trim().is_empty() {
				return Err(Error::UpstreamRejected {
					status: StatusCode::BAD_REQUEST.as_u16(),
					body: "missing track uri".into(),
				});
			}

			self.execute(&ProxiedRequest::post(QUEUE_PATH).query("uri", uri)).await?;

			tracing::info!("Track enqueued.");

			Ok(())
		})
		.await
	}

	/// Runs `request` through the attempt, refresh, and single-retry pipeline and returns
	/// the successful answer.
	pub async fn execute(&self, request: &ProxiedRequest) -> Result<UpstreamResponse> {
		let state = self.store.get();
		let ticket = self.refresh_ticket_for(&state);

		match state.usable_access_token(OffsetDateTime::now_utc()) {
			Some(token) => {
				let response = self.dispatch(request, token).await?;

				if response.status != StatusCode::UNAUTHORIZED.as_u16() {
					return response.into_success();
				}

				tracing::debug!(path = request.path, "Upstream refused the access token.");
			},
			None => tracing::debug!(path = request.path, "No usable access token."),
		}

		let token = self.refresh_after(ticket).await.map_err(|err| {
			tracing::warn!(error = %err, "Credential could not be renewed for a proxied call.");

			Error::Unauthenticated
		})?;
		let response = self.dispatch(request, &token).await?;

		if response.status == StatusCode::UNAUTHORIZED.as_u16() {
			tracing::warn!(path = request.path, "Upstream refused the renewed access token.");

			return Err(Error::Unauthenticated);
		}

		response.into_success()
	}

	async fn dispatch(
		&self,
		request: &ProxiedRequest,
		token: &TokenSecret,
	) -> Result<UpstreamResponse> {
		let url = self.endpoints.api_url(request.path).map_err(ConfigError::from)?;
		let mut builder = self
			.http_client
			.request(request.method.clone(), url)
			.query(&request.query)
			.header(reqwest::header::AUTHORIZATION, token.bearer());

		if request.method == Method::POST {
			builder = builder.body(Vec::new());
		}

		let response = builder.send().await?;
		let status = response.status().as_u16();
		let body = response.text().await?;

		tracing::debug!(path = request.path, status, "Upstream answered.");

		Ok(UpstreamResponse { status, body })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn non_success_becomes_rejection_with_body() {
		let err = UpstreamResponse { status: 404, body: "no device".into() }
			.into_success()
			.expect_err("A 404 answer should be rejected.");

		assert!(matches!(err, Error::UpstreamRejected { status: 404, body } if body == "no device"));
	}

	#[test]
	fn malformed_body_reports_path() {
		let response =
			UpstreamResponse { status: 200, body: r#"{"tracks":{"items":[{"uri":1}]}}"#.into() };
		let err = response.json::<SearchPage>().expect_err("A numeric uri should not decode.");

		assert!(matches!(
			err,
			Error::UpstreamRejected { status: 200, body } if body.contains("tracks.items[0].uri")
		));
	}
}
