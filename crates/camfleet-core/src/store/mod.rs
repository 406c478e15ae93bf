// Cached resource stores over the HTTP facade.

mod devices;

pub use devices::DeviceStore;
