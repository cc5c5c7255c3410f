//! High level probe orchestration.
//!
//! Wires the transport seam, flag scanner, and event layer into a strictly
//! sequential loop: each method from the fixed list is attempted once, in
//! order, and the first response containing a flag ends the scan.

use std::sync::Arc;

use chrono::Utc;
use http::Method;
use thiserror::Error;
use url::Url;

use crate::events::{
    AttemptingEvent, EventDispatcher, EventHandler, ExhaustedEvent, FlagFoundEvent,
    LoggingHandler, MethodFailedEvent, ProbeEvent, ProbedEvent, StartedEvent,
};
use crate::probe::{ProbeHttpClient, ProbeTransportError, ReqwestProbeClient};
use crate::scan::{FlagMatch, scan_for_flag};

/// Ordered list of methods attempted against the target.
///
/// Order is significant: methods are probed one at a time and the first
/// match wins.
pub const PROBE_METHODS: [Method; 8] = [
    Method::GET,
    Method::POST,
    Method::HEAD,
    Method::PUT,
    Method::TRACE,
    Method::OPTIONS,
    Method::PATCH,
    Method::DELETE,
];

/// Result alias used across the orchestration layer.
pub type ProberResult<T> = Result<T, ProberError>;

/// High-level error surfaced by the prober.
///
/// Per-method transport failures are not errors at this level; they are
/// contained inside the loop and recorded on the report.
#[derive(Debug, Error)]
pub enum ProberError {
    #[error("transport setup failed: {0}")]
    Transport(#[from] ProbeTransportError),
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
    #[error("target url has no host: {0}")]
    MissingHost(Url),
}

/// Parse and validate a target URL.
///
/// The target must carry both a scheme and a host; inputs such as
/// `example.com/path` or `not-a-url` are rejected before any network
/// activity.
pub fn validate_target(raw: &str) -> ProberResult<Url> {
    let url = Url::parse(raw)?;
    if url.host_str().is_none() {
        return Err(ProberError::MissingHost(url));
    }
    Ok(url)
}

/// Record of one attempted method, retained in the final report.
#[derive(Debug, Clone)]
pub enum MethodAttempt {
    Completed { method: Method, status: u16 },
    Failed { method: Method, error: String },
}

impl MethodAttempt {
    pub fn method(&self) -> &Method {
        match self {
            MethodAttempt::Completed { method, .. } => method,
            MethodAttempt::Failed { method, .. } => method,
        }
    }
}

/// Outcome of a finished scan.
#[derive(Debug, Clone)]
pub enum ProbeOutcome {
    /// A flag was found; no further methods were attempted.
    FlagFound { method: Method, matched: FlagMatch },
    /// Every method was attempted without a match.
    Exhausted,
}

/// Full account of a scan: per-method attempt records plus the outcome.
///
/// The absence of a flag is not an error; an exhausted report is still a
/// successfully completed scan.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub target: Url,
    pub attempts: Vec<MethodAttempt>,
    pub outcome: ProbeOutcome,
}

impl ProbeReport {
    pub fn flag(&self) -> Option<&FlagMatch> {
        match &self.outcome {
            ProbeOutcome::FlagFound { matched, .. } => Some(matched),
            ProbeOutcome::Exhausted => None,
        }
    }
}

/// Fluent builder for [`Prober`].
pub struct ProberBuilder {
    client: Option<Arc<dyn ProbeHttpClient>>,
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl ProberBuilder {
    pub fn new() -> Self {
        Self {
            client: None,
            handlers: Vec::new(),
        }
    }

    /// Substitute the transport. Mainly useful for tests and embedding.
    pub fn with_client(mut self, client: Arc<dyn ProbeHttpClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Register an additional event handler alongside the stock logging one.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn build(self) -> ProberResult<Prober> {
        let client = match self.client {
            Some(client) => client,
            None => Arc::new(ReqwestProbeClient::new()?),
        };

        let mut events = EventDispatcher::new();
        events.register_handler(Arc::new(LoggingHandler));
        for handler in self.handlers {
            events.register_handler(handler);
        }

        Ok(Prober { client, events })
    }
}

impl Default for ProberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Sequential HTTP method prober.
pub struct Prober {
    client: Arc<dyn ProbeHttpClient>,
    events: EventDispatcher,
}

impl Prober {
    /// Construct a prober with the stock reqwest transport.
    pub fn new() -> ProberResult<Self> {
        ProberBuilder::new().build()
    }

    /// Obtain a builder to customise the prober instance.
    pub fn builder() -> ProberBuilder {
        ProberBuilder::new()
    }

    /// Probe the target with every method in [`PROBE_METHODS`], stopping at
    /// the first response that contains a flag.
    ///
    /// Transport failures are contained per method: the failure is recorded,
    /// reported through the event layer, and the loop moves on.
    pub async fn probe(&self, url: &Url) -> ProbeReport {
        self.events.dispatch(ProbeEvent::Started(StartedEvent {
            url: url.clone(),
            methods: PROBE_METHODS.to_vec(),
            timestamp: Utc::now(),
        }));

        let mut attempts = Vec::with_capacity(PROBE_METHODS.len());

        for method in &PROBE_METHODS {
            self.events.dispatch(ProbeEvent::Attempting(AttemptingEvent {
                url: url.clone(),
                method: method.clone(),
                timestamp: Utc::now(),
            }));

            let mut response = match self.client.issue(method, url).await {
                Ok(response) => response,
                Err(err) => {
                    let error = err.to_string();
                    attempts.push(MethodAttempt::Failed {
                        method: method.clone(),
                        error: error.clone(),
                    });
                    self.events.dispatch(ProbeEvent::MethodFailed(MethodFailedEvent {
                        method: method.clone(),
                        error,
                        timestamp: Utc::now(),
                    }));
                    continue;
                }
            };

            // HEAD responses carry no body by protocol convention; force it
            // empty regardless of what the transport produced.
            if *method == Method::HEAD {
                response.body.clear();
            }

            attempts.push(MethodAttempt::Completed {
                method: method.clone(),
                status: response.status,
            });
            self.events.dispatch(ProbeEvent::Probed(ProbedEvent {
                method: method.clone(),
                status: response.status,
                timestamp: Utc::now(),
            }));

            if let Some(matched) = scan_for_flag(&response) {
                self.events.dispatch(ProbeEvent::FlagFound(FlagFoundEvent {
                    method: method.clone(),
                    matched: matched.clone(),
                    timestamp: Utc::now(),
                }));
                return ProbeReport {
                    target: url.clone(),
                    attempts,
                    outcome: ProbeOutcome::FlagFound {
                        method: method.clone(),
                        matched,
                    },
                };
            }
        }

        self.events.dispatch(ProbeEvent::Exhausted(ExhaustedEvent {
            methods: PROBE_METHODS.to_vec(),
            timestamp: Utc::now(),
        }));

        ProbeReport {
            target: url.clone(),
            attempts,
            outcome: ProbeOutcome::Exhausted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use http::HeaderMap;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::probe::ProbeResponse;
    use crate::scan::MatchLocation;

    /// Scripted transport: responds per method from a table and records the
    /// order of issued requests.
    struct ScriptedClient {
        bodies: HashMap<Method, String>,
        headers: HashMap<Method, HeaderMap>,
        failing: Vec<Method>,
        calls: Mutex<Vec<Method>>,
    }

    impl ScriptedClient {
        fn new() -> Self {
            Self {
                bodies: HashMap::new(),
                headers: HashMap::new(),
                failing: Vec::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn body(mut self, method: Method, body: &str) -> Self {
            self.bodies.insert(method, body.to_string());
            self
        }

        fn header(mut self, method: Method, name: &'static str, value: &str) -> Self {
            self.headers
                .entry(method)
                .or_default()
                .insert(name, value.parse().unwrap());
            self
        }

        fn failing(mut self, method: Method) -> Self {
            self.failing.push(method);
            self
        }

        fn calls(&self) -> Vec<Method> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProbeHttpClient for ScriptedClient {
        async fn issue(
            &self,
            method: &Method,
            _url: &Url,
        ) -> Result<ProbeResponse, ProbeTransportError> {
            self.calls.lock().unwrap().push(method.clone());

            if self.failing.contains(method) {
                return Err(ProbeTransportError::Transport(
                    "simulated connection error".to_string(),
                ));
            }

            Ok(ProbeResponse::new(
                method.clone(),
                200,
                self.headers.get(method).cloned().unwrap_or_default(),
                self.bodies.get(method).cloned().unwrap_or_default(),
            ))
        }
    }

    fn target() -> Url {
        Url::parse("http://example.com/secret").unwrap()
    }

    async fn run(client: ScriptedClient) -> (ProbeReport, Vec<Method>) {
        let client = Arc::new(client);
        let prober = Prober::builder()
            .with_client(client.clone())
            .build()
            .unwrap();
        let report = prober.probe(&target()).await;
        (report, client.calls())
    }

    #[tokio::test]
    async fn first_match_stops_the_scan() {
        let client = ScriptedClient::new().body(Method::GET, "Welcome CTF{abc123} enjoy");
        let (report, calls) = run(client).await;

        match report.outcome {
            ProbeOutcome::FlagFound { method, matched } => {
                assert_eq!(method, Method::GET);
                assert_eq!(matched.location, MatchLocation::Body);
                assert_eq!(matched.text, "CTF{abc123}");
            }
            ProbeOutcome::Exhausted => panic!("expected a flag"),
        }
        assert_eq!(calls, vec![Method::GET]);
    }

    #[tokio::test]
    async fn exhausts_all_methods_in_fixed_order() {
        let (report, calls) = run(ScriptedClient::new()).await;

        assert!(matches!(report.outcome, ProbeOutcome::Exhausted));
        assert_eq!(calls, PROBE_METHODS.to_vec());
        assert_eq!(report.attempts.len(), PROBE_METHODS.len());
        for (attempt, method) in report.attempts.iter().zip(PROBE_METHODS.iter()) {
            assert_eq!(attempt.method(), method);
        }
    }

    #[tokio::test]
    async fn head_body_is_discarded() {
        // Flag only in the HEAD body: must never be found there.
        let client = ScriptedClient::new().body(Method::HEAD, "CTF{via-head-body}");
        let (report, _) = run(client).await;

        assert!(report.flag().is_none());
    }

    #[tokio::test]
    async fn head_flag_still_found_via_header() {
        let client = ScriptedClient::new()
            .body(Method::HEAD, "CTF{via-head-body}")
            .header(Method::HEAD, "x-secret", "CTF{via-head-header}");
        let (report, calls) = run(client).await;

        let matched = report.flag().expect("expected a flag");
        assert_eq!(
            matched.location,
            MatchLocation::Header("x-secret".to_string())
        );
        assert_eq!(matched.text, "CTF{via-head-header}");
        assert_eq!(
            calls,
            vec![Method::GET, Method::POST, Method::HEAD]
        );
    }

    #[tokio::test]
    async fn transport_failure_does_not_abort_the_scan() {
        let client = ScriptedClient::new()
            .failing(Method::GET)
            .body(Method::POST, "CTF{after-failure}");
        let (report, calls) = run(client).await;

        assert_eq!(calls, vec![Method::GET, Method::POST]);
        assert!(matches!(
            report.attempts[0],
            MethodAttempt::Failed { .. }
        ));
        assert_eq!(report.flag().unwrap().text, "CTF{after-failure}");
    }

    #[test]
    fn validates_target_urls() {
        assert!(validate_target("https://example.com/path").is_ok());
        assert!(validate_target("http://127.0.0.1:8080/x").is_ok());

        assert!(matches!(
            validate_target("example.com/path"),
            Err(ProberError::Url(_))
        ));
        assert!(matches!(
            validate_target("not-a-url"),
            Err(ProberError::Url(_))
        ));
        assert!(matches!(
            validate_target("mailto:user@example.com"),
            Err(ProberError::MissingHost(_))
        ));
    }
}
