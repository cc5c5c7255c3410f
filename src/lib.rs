//! # flagprobe
//!
//! Sequential HTTP method prober that hunts CTF-style flag tokens in
//! response bodies and headers.
//!
//! Given a target URL, the prober issues one request per method from a fixed
//! ordered list (GET, POST, HEAD, PUT, TRACE, OPTIONS, PATCH, DELETE), with
//! redirects disabled and a fixed timeout, and scans each response for a
//! `CTF{...}` token. The first match ends the scan; the body is checked
//! before headers.
//!
//! ## Example
//!
//! ```no_run
//! use flagprobe::{Prober, validate_target};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let target = validate_target("https://example.com/target-path")?;
//!     let prober = Prober::new()?;
//!     let report = prober.probe(&target).await;
//!     if let Some(flag) = report.flag() {
//!         println!("found {} at {}", flag.text, flag.location);
//!     }
//!     Ok(())
//! }
//! ```

mod prober;

pub mod events;
pub mod probe;
pub mod scan;

pub use crate::prober::{
    MethodAttempt,
    PROBE_METHODS,
    ProbeOutcome,
    ProbeReport,
    Prober,
    ProberBuilder,
    ProberError,
    ProberResult,
    validate_target,
};

pub use crate::probe::{
    PROBE_TIMEOUT,
    ProbeHttpClient,
    ProbeResponse,
    ProbeTransportError,
    ReqwestProbeClient,
};

pub use crate::scan::{FlagMatch, MatchLocation, scan_for_flag};

pub use crate::events::{
    ConsoleReporter,
    EventDispatcher,
    EventHandler,
    LoggingHandler,
    ProbeEvent,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
