// std
use std::time::Duration as StdDuration;
// crates.io
use httpmock::prelude::*;
// self
use party_queue::{_preludet::*, renewal::spawn_renewal, store::CredentialStore};

#[tokio::test]
async fn renewal_refreshes_on_schedule() {
	let server = MockServer::start_async().await;
	let (host, store) = build_test_host(&server.base_url());

	seed_credentials(&store, "access-old", Some("refresh-old"));

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"access-renewed\",\"token_type\":\"Bearer\",\"expires_in\":3600}");
		})
		.await;

	let handle = spawn_renewal(host, StdDuration::from_millis(50));

	tokio::time::sleep(StdDuration::from_millis(400)).await;
	handle.abort();

	assert_eq!(
		store.get().access_token.as_ref().map(|token| token.expose()),
		Some("access-renewed")
	);
}

#[tokio::test]
async fn renewal_waits_for_a_refresh_token() {
	let server = MockServer::start_async().await;
	let (host, _store) = build_test_host(&server.base_url());
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token");
			then.status(200);
		})
		.await;
	let handle = spawn_renewal(host, StdDuration::from_millis(20));

	tokio::time::sleep(StdDuration::from_millis(150)).await;
	handle.abort();

	token.assert_calls_async(0).await;
}
