//! Thread-safe in-memory [`CredentialStore`] implementation.

// self
use crate::{
	_prelude::*,
	auth::{CredentialState, CredentialUpdate, TokenSecret},
	store::{CompareAndSwapOutcome, CredentialStore},
};

/// Process-lifetime storage backend guarding the credential pair with one lock.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<RwLock<CredentialState>>);
impl MemoryStore {
	fn refresh_matches(current: Option<&TokenSecret>, expected: Option<&str>) -> bool {
		match (current.map(TokenSecret::expose), expected) {
			(None, None) => true,
			(Some(cur), Some(exp)) => cur == exp,
			_ => false,
		}
	}
}
impl CredentialStore for MemoryStore {
	fn get(&self) -> CredentialState {
		self.0.read().clone()
	}

	fn set(&self, update: CredentialUpdate) {
		self.0.write().apply(update);
	}

	fn compare_and_swap_refresh(
		&self,
		expected_refresh: Option<&str>,
		update: CredentialUpdate,
	) -> CompareAndSwapOutcome {
		let mut guard = self.0.write();

		if !Self::refresh_matches(guard.refresh_token.as_ref(), expected_refresh) {
			return CompareAndSwapOutcome::RefreshMismatch;
		}

		guard.apply(update);

		CompareAndSwapOutcome::Updated
	}
}
