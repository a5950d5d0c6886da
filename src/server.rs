//! Guest-facing HTTP surface.
//!
//! Routes translate between HTTP and the [`Host`] operations; every error kind is mapped to
//! a status code here and nowhere else.

// crates.io
use axum::{
	Json, Router,
	extract::{Query, State},
	http::{StatusCode, header},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
// self
use crate::{
	_prelude::*,
	flows::{CallbackParams, Host},
	gateway::Track,
	status::StatusBody,
};

const CONNECTED_TEXT: &str = "Connected. You can close this window.";
const CONNECT_FAILED_TEXT: &str = "Connecting the host account failed.";

#[derive(Debug, Default, Deserialize)]
struct SearchParams {
	#[serde(default)]
	q: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EnqueueBody {
	#[serde(default)]
	uri: String,
}

/// Builds the router serving every guest and host route.
pub fn router(host: Host) -> Router {
	Router::new()
		.route("/login", get(login))
		.route("/callback", get(callback))
		.route("/search", get(search))
		.route("/add", post(add))
		.route("/status", get(status))
		.route("/device-status", get(status))
		.route("/health", get(health))
		.layer(TraceLayer::new_for_http())
		.layer(CorsLayer::permissive())
		.with_state(host)
}

/// Serves [`router`] on `listener` until Ctrl-C or SIGTERM.
pub async fn serve(host: Host, listener: TcpListener) -> std::io::Result<()> {
	tracing::info!(addr = %listener.local_addr()?, "Party queue listening.");

	axum::serve(listener, router(host)).with_graceful_shutdown(shutdown_signal()).await
}

/// Maps an error kind onto the status code a guest sees.
pub fn status_for(err: &Error) -> StatusCode {
	match err {
		Error::Unauthenticated | Error::NoRefreshToken | Error::RefreshFailed { .. } =>
			StatusCode::UNAUTHORIZED,
		Error::UpstreamRejected { .. } | Error::AuthorizationFailed { .. } =>
			StatusCode::BAD_REQUEST,
		Error::UpstreamUnreachable { .. } => StatusCode::BAD_GATEWAY,
		Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
	}
}

fn error_response(err: &Error) -> Response {
	let body = match err {
		Error::UpstreamRejected { body, .. } if !body.is_empty() => body.clone(),
		_ => err.to_string(),
	};

	(status_for(err), body).into_response()
}

async fn login(State(host): State<Host>) -> Response {
	let url = host.begin_authorization();

	(StatusCode::FOUND, [(header::LOCATION, url.to_string())]).into_response()
}

async fn callback(State(host): State<Host>, Query(params): Query<CallbackParams>) -> Response {
	match host.complete_callback(&params).await {
		Ok(()) => (StatusCode::OK, CONNECTED_TEXT).into_response(),
		Err(err) => {
			tracing::warn!(error = %err, "Authorization callback failed.");

			(StatusCode::BAD_REQUEST, CONNECT_FAILED_TEXT).into_response()
		},
	}
}

async fn search(State(host): State<Host>, Query(params): Query<SearchParams>) -> Json<Vec<Track>> {
	match host.search(params.q.as_deref().unwrap_or_default()).await {
		Ok(tracks) => Json(tracks),
		Err(err) => {
			tracing::warn!(error = %err, "Search failed; answering with no results.");

			Json(Vec::new())
		},
	}
}

async fn add(State(host): State<Host>, Json(body): Json<EnqueueBody>) -> Response {
	match host.enqueue(&body.uri).await {
		Ok(()) => StatusCode::NO_CONTENT.into_response(),
		Err(err) => {
			tracing::warn!(error = %err, "Enqueue failed.");

			error_response(&err)
		},
	}
}

async fn status(State(host): State<Host>) -> Json<StatusBody> {
	Json(host.resolve_status().await.into())
}

async fn health() -> &'static str {
	"ok"
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(err) = tokio::signal::ctrl_c().await {
			tracing::error!(error = %err, "Ctrl-C handler could not be installed.");
			std::future::pending::<()>().await;
		}
	};
	#[cfg(unix)]
	let terminate = async {
		match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
			Ok(mut signal) => {
				signal.recv().await;
			},
			Err(err) => {
				tracing::error!(error = %err, "SIGTERM handler could not be installed.");
				std::future::pending::<()>().await;
			},
		}
	};
	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}

	tracing::info!("Shutdown signal received.");
}
