//! Session, navigation, and inventory logic between `camfleet-api` and
//! UI consumers (the CLI today).
//!
//! - **[`SessionGuard`]** — authentication state derived from the token
//!   lifecycle: `login` / `check_auth` / `logout`, with all mutations
//!   serialized through a single-writer lock.
//! - **[`NavigationGuard`]** — pre-transition hook deciding whether a
//!   route change may proceed; protected routes are never allowed
//!   without at least one successful validation.
//! - **[`DeviceStore`]** — cached CRUD facade over the device and region
//!   collections; every mutation re-fetches from the server.
//! - **Domain model** ([`model`]) — `Device`, `Region`, and the
//!   `ActionOutcome` result shape shared by login and mutations.

pub mod model;
pub mod nav;
pub mod session;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use nav::{LOGIN_PATH, NavDecision, NavigationGuard, Route, RouteTable};
pub use session::{Role, SessionGuard, User};
pub use store::DeviceStore;

pub use model::{
    ActionOutcome, Device, DeviceStats, DeviceUpdate, FleetCheck, Health, NewDevice, Region,
    StatusCheck,
};
