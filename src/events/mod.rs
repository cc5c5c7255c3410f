//! Event system around the probe loop.
//!
//! All user-visible output flows through handlers registered on the
//! dispatcher, keeping the loop itself free of printing concerns.

use chrono::{DateTime, Utc};
use http::Method;
use std::sync::Arc;
use url::Url;

use crate::scan::FlagMatch;

/// Emitted once before the first method is attempted.
#[derive(Debug, Clone)]
pub struct StartedEvent {
    pub url: Url,
    pub methods: Vec<Method>,
    pub timestamp: DateTime<Utc>,
}

/// Emitted just before a request goes out.
#[derive(Debug, Clone)]
pub struct AttemptingEvent {
    pub url: Url,
    pub method: Method,
    pub timestamp: DateTime<Utc>,
}

/// Emitted when a response was obtained for a method.
#[derive(Debug, Clone)]
pub struct ProbedEvent {
    pub method: Method,
    pub status: u16,
    pub timestamp: DateTime<Utc>,
}

/// Emitted when the transport failed for a method. The scan continues with
/// the next method.
#[derive(Debug, Clone)]
pub struct MethodFailedEvent {
    pub method: Method,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

/// Emitted when a flag was found. Ends the scan.
#[derive(Debug, Clone)]
pub struct FlagFoundEvent {
    pub method: Method,
    pub matched: FlagMatch,
    pub timestamp: DateTime<Utc>,
}

/// Emitted when every method was attempted without a match.
#[derive(Debug, Clone)]
pub struct ExhaustedEvent {
    pub methods: Vec<Method>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum ProbeEvent {
    Started(StartedEvent),
    Attempting(AttemptingEvent),
    Probed(ProbedEvent),
    MethodFailed(MethodFailedEvent),
    FlagFound(FlagFoundEvent),
    Exhausted(ExhaustedEvent),
}

/// Trait implemented by event handlers.
pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &ProbeEvent);
}

/// Dispatcher that broadcasts events to registered handlers.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn register_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    pub fn dispatch(&self, event: ProbeEvent) {
        for handler in &self.handlers {
            handler.handle(&event);
        }
    }
}

fn method_list(methods: &[Method]) -> String {
    methods
        .iter()
        .map(|method| method.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Prints the human-readable scan progress to standard output.
#[derive(Debug)]
pub struct ConsoleReporter;

impl EventHandler for ConsoleReporter {
    fn handle(&self, event: &ProbeEvent) {
        match event {
            ProbeEvent::Started(started) => {
                println!(
                    "[+] Scanning {} with methods: {}",
                    started.url,
                    method_list(&started.methods)
                );
            }
            ProbeEvent::Attempting(_) => {}
            ProbeEvent::Probed(probed) => {
                println!("[.] Trying {} ... HTTP {}", probed.method, probed.status);
            }
            ProbeEvent::MethodFailed(failed) => {
                println!("[.] Trying {} ... failed", failed.method);
                println!("[!] {} -> request failed: {}", failed.method, failed.error);
            }
            ProbeEvent::FlagFound(found) => {
                println!();
                println!(
                    "[***] FLAG FOUND using {} ({}) --> {}",
                    found.method, found.matched.location, found.matched.text
                );
            }
            ProbeEvent::Exhausted(exhausted) => {
                println!();
                println!(
                    "[-] No flag found using methods: {}",
                    method_list(&exhausted.methods)
                );
                println!("[*] Try additional methods or inspect responses manually.");
            }
        }
    }
}

/// Mirrors events onto the `log` crate.
#[derive(Debug)]
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn handle(&self, event: &ProbeEvent) {
        match event {
            ProbeEvent::Started(started) => {
                log::debug!("scan start {} ({} methods)", started.url, started.methods.len());
            }
            ProbeEvent::Attempting(attempting) => {
                log::debug!("-> {} {}", attempting.method, attempting.url);
            }
            ProbeEvent::Probed(probed) => {
                log::debug!("<- {} -> {}", probed.method, probed.status);
            }
            ProbeEvent::MethodFailed(failed) => {
                log::warn!("{} failed: {}", failed.method, failed.error);
            }
            ProbeEvent::FlagFound(found) => {
                log::info!(
                    "flag found via {} at {}",
                    found.method,
                    found.matched.location
                );
            }
            ProbeEvent::Exhausted(_) => {
                log::info!("scan exhausted without a match");
            }
        }
    }
}
