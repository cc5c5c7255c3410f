//! Core data structures shared by the transport seam and the probe loop.

use http::{HeaderMap, Method};

/// Captured result of a single probe attempt.
///
/// Created per method, handed to the scan step, then discarded. Header names
/// appear exactly as the transport returned them; the body is empty when the
/// probed method was HEAD.
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    pub method: Method,
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl ProbeResponse {
    pub fn new(method: Method, status: u16, headers: HeaderMap, body: String) -> Self {
        Self {
            method,
            status,
            headers,
            body,
        }
    }
}
