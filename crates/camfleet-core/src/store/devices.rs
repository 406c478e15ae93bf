// ── Device / region store ──
//
// CRUD facade over the HTTP client with a cached copy of the server's
// collections. Every mutation re-fetches the device collection so the
// cache tracks the server's view rather than being patched locally.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use camfleet_api::{ApiClient, Error};

use crate::model::{
    ActionOutcome, Device, DeviceStats, DeviceUpdate, FleetCheck, NewDevice, Region, StatusCheck,
};

const IMPORT_FAILED: &str = "Import failed";
const UPDATE_FAILED: &str = "Update failed";
const DELETE_FAILED: &str = "Delete failed";

/// `POST /import` response.
#[derive(Debug, serde::Deserialize)]
struct ImportResponse {
    #[allow(dead_code)]
    status: String,
    device_id: i64,
}

/// Cached device and region collections.
///
/// The cache holds a possibly-stale copy keyed by `id`, in server
/// response order. 401s pass straight through to the caller: this store
/// never clears session state or redirects -- the guards own that.
pub struct DeviceStore {
    api: ApiClient,
    devices: RwLock<Vec<Device>>,
    regions: RwLock<Vec<Region>>,
    loading: AtomicBool,
}

impl DeviceStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            devices: RwLock::new(Vec::new()),
            regions: RwLock::new(Vec::new()),
            loading: AtomicBool::new(false),
        }
    }

    /// `true` while a device fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Relaxed)
    }

    // ── Fetches ──────────────────────────────────────────────────────

    /// Replace the device cache from `GET /devices`. Returns the count.
    pub async fn refresh_devices(&self) -> Result<usize, Error> {
        self.loading.store(true, Ordering::Relaxed);
        let result = self.api.get_json::<Vec<Device>>("devices").await;
        self.loading.store(false, Ordering::Relaxed);

        let fetched = result?;
        let count = fetched.len();
        debug!(count, "refreshed device collection");
        *self.devices.write().expect("device cache lock poisoned") = fetched;
        Ok(count)
    }

    /// Replace the region cache from `GET /regions`. Returns the count.
    pub async fn refresh_regions(&self) -> Result<usize, Error> {
        let fetched = self.api.get_json::<Vec<Region>>("regions").await?;
        let count = fetched.len();
        *self.regions.write().expect("region cache lock poisoned") = fetched;
        Ok(count)
    }

    /// `GET /devices/stats` summary counts.
    pub async fn stats(&self) -> Result<DeviceStats, Error> {
        self.api.get_json("devices/stats").await
    }

    /// Probe one device's reachability via `POST /devices/{id}/check-status`.
    pub async fn check_status(&self, id: i64) -> Result<StatusCheck, Error> {
        self.api.post_empty(&format!("devices/{id}/check-status")).await
    }

    /// Probe every device via `POST /devices/check-all-status`.
    ///
    /// The sweep updates statuses server-side, so the device cache is
    /// refreshed afterward to pick them up.
    pub async fn check_all(&self) -> Result<FleetCheck, Error> {
        let report: FleetCheck = self.api.post_empty("devices/check-all-status").await?;
        debug!(
            checked = report.checked_devices,
            online = report.online_devices,
            "fleet status sweep finished"
        );
        self.refetch_after_mutation().await;
        Ok(report)
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Register a new device via `POST /import`, then re-fetch.
    pub async fn import_device(&self, device: &NewDevice) -> ActionOutcome {
        match self.api.post_json::<ImportResponse>("import", device).await {
            Ok(resp) => {
                debug!(device_id = resp.device_id, "imported device");
                self.refetch_after_mutation().await;
                ActionOutcome::ok()
            }
            Err(err) => failure(&err, IMPORT_FAILED),
        }
    }

    /// Update fields on an existing device, then re-fetch.
    pub async fn update_device(&self, id: i64, update: &DeviceUpdate) -> ActionOutcome {
        match self.api.put_json(&format!("devices/{id}"), update).await {
            Ok(()) => {
                self.refetch_after_mutation().await;
                ActionOutcome::ok()
            }
            Err(err) => failure(&err, UPDATE_FAILED),
        }
    }

    /// Delete a device, then re-fetch.
    pub async fn delete_device(&self, id: i64) -> ActionOutcome {
        match self.api.delete(&format!("devices/{id}")).await {
            Ok(()) => {
                self.refetch_after_mutation().await;
                ActionOutcome::ok()
            }
            Err(err) => failure(&err, DELETE_FAILED),
        }
    }

    // ── Cache lookups ────────────────────────────────────────────────

    pub fn device_by_id(&self, id: i64) -> Option<Device> {
        self.devices
            .read()
            .expect("device cache lock poisoned")
            .iter()
            .find(|d| d.id == id)
            .cloned()
    }

    pub fn devices_in_region(&self, region: &str) -> Vec<Device> {
        self.devices
            .read()
            .expect("device cache lock poisoned")
            .iter()
            .filter(|d| d.region == region)
            .cloned()
            .collect()
    }

    pub fn devices_snapshot(&self) -> Vec<Device> {
        self.devices.read().expect("device cache lock poisoned").clone()
    }

    pub fn regions_snapshot(&self) -> Vec<Region> {
        self.regions.read().expect("region cache lock poisoned").clone()
    }

    // ── Internals ────────────────────────────────────────────────────

    /// The mutation already committed server-side; a failed re-fetch
    /// only leaves the cache stale, so it is logged rather than
    /// surfaced as a mutation failure.
    async fn refetch_after_mutation(&self) {
        if let Err(err) = self.refresh_devices().await {
            warn!(error = %err, "post-mutation refresh failed, cache is stale");
        }
    }
}

/// Failure outcome carrying the server's `detail` when present.
fn failure(err: &Error, default: &str) -> ActionOutcome {
    match err {
        Error::Api {
            detail: Some(detail),
            ..
        } => ActionOutcome::failed(detail.clone()),
        _ => ActionOutcome::failed(default),
    }
}
