//! A small Rust client for the NREL PVWatts v4 API.
//!
//! Describe a photovoltaic system with [`RequestParams`], send it with
//! [`Client::request`], and read the estimate from the returned
//! [`PvWattsResult`]. Every parameter is checked against the service's
//! documented limits before anything goes over the wire.
//!
//! ## Quick start
//! ```no_run
//! use pvwatts::{Client, RequestParams};
//!
//! fn main() -> pvwatts::Result<()> {
//!     let client = Client::new("DEMO_KEY", None)?;
//!     let params = RequestParams::default()
//!         .system_size(4.0)
//!         .lat(40.0)
//!         .lon(-105.0)
//!         .azimuth(180.0)
//!         .tilt(40.0)
//!         .derate(0.77)
//!         .track_mode(0.0);
//!     let result = client.request(&params)?;
//!     println!("AC output: {:?} kWh/year", result.ac_annual());
//!     Ok(())
//! }
//! ```
//!
//! ## API keys
//! [`Client::new`] mirrors the Python `pypvwatts` client: the key is stored in
//! a process-wide slot that every shared-key client reads at request time, so
//! constructing a second client with another key switches the key of the first
//! one too. Clients built with [`Client::with_config`] or [`Client::from_env`]
//! own their key instead. Configuration for `from_env` comes from
//! `PVWATTS_URL`, `PVWATTS_API_KEY`, `PVWATTS_HTTP_PROXY`,
//! `PVWATTS_HTTPS_PROXY` or a `.pvwattsrc` file.

#![forbid(unsafe_code)]

mod client;
mod config;
mod error;
mod params;
mod result;
mod util;
pub mod validation;

pub use client::{
    Client, ClientConfig, DEFAULT_URL, DEMO_KEY, Proxies, set_shared_api_key, shared_api_key,
};
pub use error::{Error, Result, ValidationError};
pub use params::RequestParams;
pub use result::{MonthlyOutputs, PvWattsResult, StationInfo};

/// Crate version, also sent in the `User-Agent` header.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns [`VERSION`].
pub fn version() -> &'static str {
    VERSION
}

/// Sends a request without constructing a client.
///
/// Uses the public endpoint, no proxy and the process-wide API key.
pub fn request(params: &RequestParams) -> Result<PvWattsResult> {
    request_to(DEFAULT_URL, params)
}

pub(crate) fn request_to(url: &str, params: &RequestParams) -> Result<PvWattsResult> {
    Client::unbound(url)?.request(params)
}
