//! Network layer for StudySync
//!
//! This crate speaks to the remote study API and watches connectivity:
//! - `ApiClient`: bearer-authenticated REST client with bounded timeouts
//! - `ConnectivityChecker`: cheap online/offline probing
//! - `NetworkMonitor`: background observer that debounces flapping links
//!   and requests a sync on every stable offline-to-online transition

mod client;
mod connectivity;
mod error;
mod monitor;

pub use client::{ApiClient, ApiConfig};
pub use connectivity::ConnectivityChecker;
pub use error::{NetworkError, NetworkResult};
pub use monitor::{DebounceState, MonitorConfig, NetworkEvent, NetworkMonitor, Transition};
