//! Client for the autolink plugin's link API, for use from another plugin.
//!
//! Requests never touch a socket: they are handed to a host-provided
//! [`PluginApi`] which delivers them to the autolink plugin's HTTP handler.

pub mod client;
pub mod config;
pub mod error;
pub mod plugin;
pub mod transport;

pub use autolink_sdk::Autolink;
pub use client::{BatchFailure, BatchReport, Client};
pub use config::ClientConfig;
pub use error::{ClientError, Operation};
pub use plugin::{plugin_api_fn, Body, PluginApi, PluginRequest, PluginResponse};
pub use transport::PluginTransport;

/// Returns the crate version baked in at compile time.
pub const fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
