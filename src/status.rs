//! Readiness status resolution for guest-facing front ends.

// self
use crate::{
	_prelude::*,
	flows::Host,
	gateway::ProxiedRequest,
	obs::{self, FlowKind},
};

const PLAYER_PATH: &str = "v1/me/player";

/// Whether the host is connected and whether a playback device is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReadinessStatus {
	/// No usable credential.
	Disconnected,
	/// Connected, but no device is active.
	ConnectedIdle,
	/// Connected with an active device.
	ConnectedActive,
}
impl ReadinessStatus {
	/// Returns `true` for both connected variants.
	pub fn is_connected(self) -> bool {
		!matches!(self, Self::Disconnected)
	}

	/// Returns the device flag; unknown while disconnected.
	pub fn device_active(self) -> Option<bool> {
		match self {
			Self::Disconnected => None,
			Self::ConnectedIdle => Some(false),
			Self::ConnectedActive => Some(true),
		}
	}

	/// Returns a stable label suitable for logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Disconnected => "disconnected",
			Self::ConnectedIdle => "connected-idle",
			Self::ConnectedActive => "connected-active",
		}
	}
}
impl Display for ReadinessStatus {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Wire shape of a readiness status: `{"connected": bool, "deviceActive"?: bool}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBody {
	/// Whether the host holds a credential.
	pub connected: bool,
	/// Whether a playback device is active; omitted while disconnected.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub device_active: Option<bool>,
}
impl From<ReadinessStatus> for StatusBody {
	fn from(status: ReadinessStatus) -> Self {
		Self { connected: status.is_connected(), device_active: status.device_active() }
	}
}

#[derive(Debug, Deserialize)]
struct PlayerState {
	#[serde(default)]
	device: Option<Device>,
}

#[derive(Debug, Deserialize)]
struct Device {
	#[serde(default)]
	is_active: bool,
}

impl Host {
	/// Reports whether the host is connected and has an active device. Never fails; any
	/// upstream trouble reads as [`ReadinessStatus::Disconnected`].
	pub async fn resolve_status(&self) -> ReadinessStatus {
		if !self.store.get().is_connected() {
			return ReadinessStatus::Disconnected;
		}

		let lookup = obs::observe(FlowKind::Status, "read_player", async move {
			self.execute(&ProxiedRequest::get(PLAYER_PATH)).await
		})
		.await;
		let status = match lookup {
			Ok(response) if response.status == 204 || response.body.trim().is_empty() =>
				ReadinessStatus::ConnectedIdle,
			Ok(response) => match response.json::<PlayerState>() {
				Ok(PlayerState { device: Some(Device { is_active: true }) }) =>
					ReadinessStatus::ConnectedActive,
				Ok(_) => ReadinessStatus::ConnectedIdle,
				Err(_) => ReadinessStatus::Disconnected,
			},
			Err(err) => {
				tracing::debug!(error = %err, "Player lookup failed.");

				ReadinessStatus::Disconnected
			},
		};

		tracing::debug!(%status, "Readiness resolved.");

		status
	}
}
