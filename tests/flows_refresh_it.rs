// crates.io
use httpmock::prelude::*;
// self
use party_queue::{_preludet::*, store::CredentialStore};

const ROTATED_BODY: &str = "{\"access_token\":\"access-new\",\"refresh_token\":\"refresh-new\",\"token_type\":\"Bearer\",\"expires_in\":3600}";
const UNROTATED_BODY: &str =
	"{\"access_token\":\"access-new\",\"token_type\":\"Bearer\",\"expires_in\":3600}";

#[tokio::test]
async fn refresh_rotates_tokens_and_updates_store() {
	let server = MockServer::start_async().await;
	let (host, store) = build_test_host(&server.base_url());

	seed_credentials(&store, "access-old", Some("refresh-old"));

	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token").header("authorization", TEST_BASIC_AUTH);
			then.status(200).header("content-type", "application/json").body(ROTATED_BODY);
		})
		.await;
	let token = host.refresh().await.expect("Refresh should succeed.");

	mock.assert_async().await;

	assert_eq!(token.expose(), "access-new");

	let state = store.get();

	assert_eq!(state.access_token.as_ref().map(|token| token.expose()), Some("access-new"));
	assert_eq!(state.refresh_token.as_ref().map(|token| token.expose()), Some("refresh-new"));
	assert_eq!(host.refresh_metrics.attempts(), 1);
	assert_eq!(host.refresh_metrics.successes(), 1);
}

#[tokio::test]
async fn refresh_without_rotation_keeps_refresh_token() {
	let server = MockServer::start_async().await;
	let (host, store) = build_test_host(&server.base_url());

	seed_credentials(&store, "access-old", Some("refresh-old"));

	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token");
			then.status(200).header("content-type", "application/json").body(UNROTATED_BODY);
		})
		.await;

	host.refresh().await.expect("Refresh should succeed.");

	mock.assert_async().await;

	assert_eq!(
		store.get().refresh_token.as_ref().map(|token| token.expose()),
		Some("refresh-old")
	);
}

#[tokio::test]
async fn missing_refresh_token_skips_token_endpoint() {
	let server = MockServer::start_async().await;
	let (host, store) = build_test_host(&server.base_url());

	seed_credentials(&store, "access-only", None);

	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token");
			then.status(200).header("content-type", "application/json").body(ROTATED_BODY);
		})
		.await;
	let err = host.refresh().await.expect_err("Refreshing without a refresh token should fail.");

	mock.assert_calls_async(0).await;

	assert!(matches!(err, Error::NoRefreshToken));
}

#[tokio::test]
async fn failed_refresh_leaves_store_unchanged() {
	let server = MockServer::start_async().await;
	let (host, store) = build_test_host(&server.base_url());

	seed_credentials(&store, "access-old", Some("refresh-old"));

	let before = store.get();
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\",\"error_description\":\"Refresh token revoked\"}");
		})
		.await;
	let err = host.refresh().await.expect_err("A revoked refresh token should fail.");

	mock.assert_async().await;

	assert!(matches!(err, Error::RefreshFailed { ref reason } if reason.contains("invalid_grant")));
	assert_eq!(store.get(), before);
	assert_eq!(host.refresh_metrics.failures(), 1);
}

#[tokio::test]
async fn malformed_success_body_fails_and_leaves_store_unchanged() {
	let server = MockServer::start_async().await;
	let (host, store) = build_test_host(&server.base_url());

	seed_credentials(&store, "access-old", Some("refresh-old"));

	let before = store.get();
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token");
			then.status(200).header("content-type", "application/json").body("{}");
		})
		.await;
	let err = host.refresh().await.expect_err("A token response without a token should fail.");

	mock.assert_async().await;

	assert!(matches!(err, Error::RefreshFailed { ref reason } if reason.contains("access_token")));
	assert_eq!(store.get(), before);
	assert_eq!(host.refresh_metrics.failures(), 1);
}

#[tokio::test]
async fn concurrent_refreshes_share_one_exchange() {
	let server = MockServer::start_async().await;
	let (host, store) = build_test_host(&server.base_url());

	seed_credentials(&store, "access-old", Some("refresh-old"));

	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token");
			then.status(200).header("content-type", "application/json").body(ROTATED_BODY);
		})
		.await;
	let (a, b, c, d) = tokio::join!(host.refresh(), host.refresh(), host.refresh(), host.refresh());

	mock.assert_calls_async(1).await;

	for result in [a, b, c, d] {
		assert_eq!(result.expect("Every caller should observe the refresh.").expose(), "access-new");
	}

	assert_eq!(host.refresh_metrics.attempts(), 1);
	assert_eq!(host.refresh_metrics.coalesced(), 3);
}

#[tokio::test]
async fn concurrent_refreshes_share_one_failure() {
	let server = MockServer::start_async().await;
	let (host, store) = build_test_host(&server.base_url());

	seed_credentials(&store, "access-old", Some("refresh-old"));

	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\"}");
		})
		.await;
	let (a, b, c) = tokio::join!(host.refresh(), host.refresh(), host.refresh());

	mock.assert_calls_async(1).await;

	for result in [a, b, c] {
		assert!(matches!(result, Err(Error::RefreshFailed { .. })));
	}
}

#[tokio::test]
async fn unreachable_token_endpoint_reports_refresh_failure() {
	let (host, store) = build_test_host(&unreachable_base());

	seed_credentials(&store, "access-old", Some("refresh-old"));

	let err = host.refresh().await.expect_err("An unreachable token endpoint should fail.");

	assert!(matches!(err, Error::RefreshFailed { .. }));
	assert!(store.get().is_connected());
}
