// crates.io
use httpmock::prelude::*;
// self
use party_queue::{_preludet::*, status::ReadinessStatus};

#[tokio::test]
async fn disconnected_host_skips_upstream() {
	let server = MockServer::start_async().await;
	let (host, _store) = build_test_host(&server.base_url());
	let player = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/me/player");
			then.status(204);
		})
		.await;

	assert_eq!(host.resolve_status().await, ReadinessStatus::Disconnected);

	player.assert_calls_async(0).await;
}

#[tokio::test]
async fn no_content_means_idle() {
	let server = MockServer::start_async().await;
	let (host, store) = build_test_host(&server.base_url());

	seed_credentials(&store, "current", Some("refresh"));

	let player = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/me/player").header("authorization", "Bearer current");
			then.status(204);
		})
		.await;

	assert_eq!(host.resolve_status().await, ReadinessStatus::ConnectedIdle);

	player.assert_async().await;
}

#[tokio::test]
async fn device_flag_selects_active_or_idle() {
	let server = MockServer::start_async().await;
	let (host, store) = build_test_host(&server.base_url());

	seed_credentials(&store, "current", Some("refresh"));

	let mut active = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/me/player");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"device\":{\"id\":\"d1\",\"is_active\":true},\"is_playing\":true}");
		})
		.await;

	assert_eq!(host.resolve_status().await, ReadinessStatus::ConnectedActive);

	active.delete_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/me/player");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"device\":{\"id\":\"d1\",\"is_active\":false}}");
		})
		.await;

	assert_eq!(host.resolve_status().await, ReadinessStatus::ConnectedIdle);
}

#[tokio::test]
async fn unparsable_or_failed_player_lookup_reads_as_disconnected() {
	let server = MockServer::start_async().await;
	let (host, store) = build_test_host(&server.base_url());

	seed_credentials(&store, "current", Some("refresh"));

	let mut garbage = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/me/player");
			then.status(200).header("content-type", "application/json").body("not json");
		})
		.await;

	assert_eq!(host.resolve_status().await, ReadinessStatus::Disconnected);

	garbage.delete_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/me/player");
			then.status(500);
		})
		.await;

	assert_eq!(host.resolve_status().await, ReadinessStatus::Disconnected);
}

#[tokio::test]
async fn unauthorized_player_lookup_refreshes_then_resolves() {
	let server = MockServer::start_async().await;
	let (host, store) = build_test_host(&server.base_url());

	seed_credentials(&store, "stale", Some("refresh"));

	server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/me/player").header("authorization", "Bearer stale");
			then.status(401);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/me/player").header("authorization", "Bearer fresh");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"device\":{\"is_active\":true}}");
		})
		.await;

	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"fresh\",\"token_type\":\"Bearer\",\"expires_in\":3600}");
		})
		.await;

	assert_eq!(host.resolve_status().await, ReadinessStatus::ConnectedActive);

	token.assert_async().await;
}

#[tokio::test]
async fn unauthorized_player_lookup_with_failed_refresh_is_disconnected() {
	let server = MockServer::start_async().await;
	let (host, store) = build_test_host(&server.base_url());

	seed_credentials(&store, "stale", Some("refresh"));

	server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/me/player");
			then.status(401);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\"}");
		})
		.await;

	assert_eq!(host.resolve_status().await, ReadinessStatus::Disconnected);
}
