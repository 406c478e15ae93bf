// ── Inventory domain types ──
//
// Records are owned by the backend; the client holds possibly-stale
// cached copies keyed by `id`, in server response order.

use serde::{Deserialize, Serialize};

/// A camera/encoder device record as returned by `GET /devices`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: i64,
    /// Region grouping tag.
    pub region: String,
    /// Store/site the device is installed at.
    pub store: String,
    pub ip: String,
    pub port: Option<u16>,
    /// Device account used by the streaming service (opaque to us).
    pub user: String,
    pub pwd: String,
    /// Channel count.
    pub chs: u16,
    pub name: String,
    /// `"online"` / `"offline"`; absent until first probed.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default = "default_protocol")]
    pub protocol: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Device {
    pub fn is_online(&self) -> bool {
        self.status.as_deref() == Some("online")
    }
}

fn default_protocol() -> String {
    "rtsp".to_owned()
}

/// Payload for `POST /import`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDevice {
    pub region: String,
    pub store: String,
    pub ip: String,
    pub port: Option<u16>,
    pub user: String,
    pub pwd: String,
    pub chs: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

/// Partial update payload for `PUT /devices/{id}`.
///
/// Only present fields are changed; the server rejects an empty update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pwd: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chs: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

/// Region grouping tag. `GET /regions` returns a bare string array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Region(pub String);

impl Region {
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// `GET /devices/stats` summary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeviceStats {
    pub total: u64,
    pub online: u64,
    pub offline: u64,
}

/// Result of a `POST /devices/{id}/check-status` probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCheck {
    pub device_id: i64,
    pub name: String,
    pub ip: String,
    pub status: String,
    pub is_online: bool,
    pub checked_at: String,
}

/// Result of a `POST /devices/check-all-status` fleet sweep.
///
/// Devices whose probe errored server-side are skipped, so
/// `checked_devices` can be lower than the fleet size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetCheck {
    pub checked_devices: u64,
    pub online_devices: u64,
    pub offline_devices: u64,
    pub results: Vec<StatusCheck>,
    pub checked_at: String,
    /// Percentage of checked devices that are online, 0 when none checked.
    pub online_rate: f64,
}

/// `GET /health` service liveness report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    /// `"healthy"` / `"unhealthy"`.
    pub status: String,
    pub timestamp: String,
    /// Database state when healthy.
    #[serde(default)]
    pub database: Option<String>,
    /// Failure description when unhealthy.
    #[serde(default)]
    pub error: Option<String>,
}

impl Health {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Outcome of an action surfaced to the UI: success flag plus an
/// optional human-readable failure message.
///
/// Failures carry the server's `detail` wording when available, or the
/// caller's default. Nothing here panics or escapes as an exception.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: Option<String>,
}

impl ActionOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}
