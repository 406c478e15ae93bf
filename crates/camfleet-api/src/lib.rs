// camfleet-api: Async Rust client for the Camfleet camera inventory service

pub mod classify;
pub mod client;
pub mod error;
pub mod retry;
pub mod token;
pub mod transport;

pub use classify::user_message;
pub use client::ApiClient;
pub use error::Error;
pub use retry::{RetryPolicy, retry};
pub use token::TokenStore;
pub use transport::TransportConfig;
