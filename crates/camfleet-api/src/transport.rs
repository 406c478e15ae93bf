// Shared transport configuration for building reqwest::Client instances.

use std::time::Duration;

/// Transport settings shared by every request the facade sends.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Connect + response timeout for each request.
    pub timeout: Duration,
    /// Accept self-signed certificates (camera NVR appliances rarely
    /// carry CA-signed ones).
    pub accept_invalid_certs: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            accept_invalid_certs: false,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("camfleet/", env!("CARGO_PKG_VERSION")));

        if self.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder.build().map_err(crate::error::Error::Transport)
    }
}
