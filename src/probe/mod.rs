//! Transport seam and captured-response types used by the probe loop.

pub mod client;
pub mod types;

pub use client::{PROBE_TIMEOUT, ProbeHttpClient, ProbeTransportError, ReqwestProbeClient};
pub use types::ProbeResponse;
