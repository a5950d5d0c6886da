// self
use party_queue::{
	_preludet::*,
	auth::CredentialUpdate,
	store::{CompareAndSwapOutcome, CredentialStore, MemoryStore},
};

#[test]
fn set_keeps_refresh_token_when_update_omits_it() {
	let store = MemoryStore::default();

	seed_credentials(&store, "access-1", Some("refresh-1"));
	store.set(CredentialUpdate::new("access-2"));

	let state = store.get();

	assert_eq!(state.access_token.as_ref().map(|token| token.expose()), Some("access-2"));
	assert_eq!(state.refresh_token.as_ref().map(|token| token.expose()), Some("refresh-1"));
	assert_eq!(state.revision, 2);
}

#[test]
fn compare_and_swap_rejects_stale_refresh_token() {
	let store = MemoryStore::default();

	seed_credentials(&store, "access-1", Some("refresh-1"));

	let rotated = store.compare_and_swap_refresh(
		Some("refresh-1"),
		CredentialUpdate::new("access-2").refresh_token("refresh-2"),
	);
	let stale = store.compare_and_swap_refresh(
		Some("refresh-1"),
		CredentialUpdate::new("access-stale").refresh_token("refresh-stale"),
	);

	assert_eq!(rotated, CompareAndSwapOutcome::Updated);
	assert_eq!(stale, CompareAndSwapOutcome::RefreshMismatch);

	let state = store.get();

	assert_eq!(state.access_token.as_ref().map(|token| token.expose()), Some("access-2"));
	assert_eq!(state.refresh_token.as_ref().map(|token| token.expose()), Some("refresh-2"));
}

#[test]
fn clones_share_one_credential_pair() {
	let store = MemoryStore::default();
	let clone = store.clone();

	seed_credentials(&clone, "shared", None);

	assert!(store.get().is_connected());
	assert!(store.get().refresh_token.is_none());
}

#[test]
fn expired_access_token_is_not_usable() {
	let store = MemoryStore::default();
	let issued = OffsetDateTime::now_utc() - Duration::hours(2);

	store.set(CredentialUpdate::new("old").expires_in(issued, Duration::hours(1)));

	let state = store.get();

	assert!(state.is_connected());
	assert!(state.usable_access_token(OffsetDateTime::now_utc()).is_none());
}
