//! Host credential models: redacted secrets, the stored credential pair, and updates.

pub mod credential;
pub mod secret;

pub use credential::*;
pub use secret::*;
