//! Catalog payloads returned by the search proxy.

// self
use crate::_prelude::*;

/// Track summary relayed to guests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
	/// Opaque identifier accepted by the enqueue endpoint.
	pub uri: String,
	/// Track title.
	pub name: String,
	/// Credited artists, in upstream order.
	#[serde(default)]
	pub artists: Vec<Artist>,
	/// Album the track appears on.
	#[serde(default)]
	pub album: Option<Album>,
	/// Track length in milliseconds.
	#[serde(default)]
	pub duration_ms: Option<u64>,
}

/// Credited artist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
	/// Display name.
	pub name: String,
}

/// Album reference with its cover art.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
	/// Album title.
	pub name: String,
	/// Cover images, widest first as delivered upstream.
	#[serde(default)]
	pub images: Vec<Image>,
}

/// Cover image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
	/// Image location.
	pub url: String,
	/// Pixel height, when known.
	#[serde(default)]
	pub height: Option<u32>,
	/// Pixel width, when known.
	#[serde(default)]
	pub width: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchPage {
	#[serde(default)]
	pub(crate) tracks: Option<TrackPage>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TrackPage {
	#[serde(default)]
	pub(crate) items: Vec<Track>,
}
