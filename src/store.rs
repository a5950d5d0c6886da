//! Storage contract and the built-in store for the host credential pair.

pub mod memory;

pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{CredentialState, CredentialUpdate},
};

/// Storage backend contract for the single host credential pair.
///
/// Implementations must make every call atomic with respect to the others: a reader never
/// observes a half-written pair. Stores never contact the network.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Returns a snapshot of the current credential state.
	fn get(&self) -> CredentialState;

	/// Replaces the stored fields, keeping the refresh token when the update omits one.
	fn set(&self, update: CredentialUpdate);

	/// Applies `update` only if the stored refresh token still equals `expected_refresh`.
	fn compare_and_swap_refresh(
		&self,
		expected_refresh: Option<&str>,
		update: CredentialUpdate,
	) -> CompareAndSwapOutcome;
}

/// Result of a refresh-token compare-and-swap attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareAndSwapOutcome {
	/// The refresh secret matched the expected value and the state was updated.
	Updated,
	/// The stored refresh secret changed underneath the caller; nothing was written.
	RefreshMismatch,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn empty_store_swaps_only_against_no_refresh_token() {
		let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::default());

		assert_eq!(
			store.compare_and_swap_refresh(Some("unknown"), CredentialUpdate::new("access")),
			CompareAndSwapOutcome::RefreshMismatch
		);
		assert_eq!(store.get().revision, 0);
		assert_eq!(
			store.compare_and_swap_refresh(None, CredentialUpdate::new("access")),
			CompareAndSwapOutcome::Updated
		);
		assert!(store.get().is_connected());
	}
}
