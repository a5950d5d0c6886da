//! The host's credential pair, its snapshot view, and atomic update payloads.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Point-in-time snapshot of the host credential pair.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialState {
	/// Access token attached to upstream calls; absent until the first exchange.
	pub access_token: Option<TokenSecret>,
	/// Refresh token; survives access-token rotation.
	pub refresh_token: Option<TokenSecret>,
	/// Expiry derived from the last exchange's declared lifetime, if known.
	pub expires_at: Option<OffsetDateTime>,
	/// Write counter bumped on every update.
	pub revision: u64,
}
impl CredentialState {
	/// Returns `true` when an access token is present.
	pub fn is_connected(&self) -> bool {
		self.access_token.is_some()
	}

	/// Returns `true` when the expiry is known and has passed at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expires_at| instant >= expires_at)
	}

	/// Returns the access token only while it is not known to be expired.
	pub fn usable_access_token(&self, instant: OffsetDateTime) -> Option<&TokenSecret> {
		if self.is_expired_at(instant) {
			return None;
		}

		self.access_token.as_ref()
	}

	/// Applies an update in place, preserving the refresh token when none is supplied.
	pub(crate) fn apply(&mut self, update: CredentialUpdate) {
		self.access_token = Some(update.access_token);

		if let Some(refresh) = update.refresh_token {
			self.refresh_token = Some(refresh);
		}

		self.expires_at = update.expires_at;
		self.revision += 1;
	}
}
impl Debug for CredentialState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialState")
			.field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("expires_at", &self.expires_at)
			.field("revision", &self.revision)
			.finish()
	}
}

/// Replacement values written atomically into the credential store.
#[derive(Clone, Debug)]
pub struct CredentialUpdate {
	/// New access token.
	pub access_token: TokenSecret,
	/// New refresh token; `None` keeps the stored one.
	pub refresh_token: Option<TokenSecret>,
	/// New expiry; `None` clears any previously known expiry.
	pub expires_at: Option<OffsetDateTime>,
}
impl CredentialUpdate {
	/// Creates an update carrying only a new access token.
	pub fn new(access_token: impl Into<String>) -> Self {
		Self { access_token: TokenSecret::new(access_token), refresh_token: None, expires_at: None }
	}

	/// Provides a (rotated) refresh token.
	pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(token));

		self
	}

	/// Sets an absolute expiry instant.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets the expiry relative to `issued_at`.
	pub fn expires_in(self, issued_at: OffsetDateTime, lifetime: Duration) -> Self {
		self.expires_at(issued_at + lifetime)
	}
}
