use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};

use regex::Regex;
use thiserror::Error;
use tokio::sync::Semaphore;

use crate::config::Config;
use crate::models::{EndpointStatus, LookupOutcome, PlayerRecord};
use crate::normalize::{self, DefaultPolicy};
use crate::upstream::{Transport, UpstreamResponse};

static UID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{7,50}$").expect("uid pattern is valid"));

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid UID format. UIDs must be 7-50 digits.")]
pub struct InvalidIdentifier;

/// Checks the identifier syntax locally, before any upstream is contacted.
pub fn validate_identifier(uid: &str) -> Result<(), InvalidIdentifier> {
    if UID_PATTERN.is_match(uid) {
        Ok(())
    } else {
        Err(InvalidIdentifier)
    }
}

/// Outcome of probing a single endpoint.
#[derive(Debug)]
enum ProbeAttempt {
    Matched(PlayerRecord),
    /// Endpoint answered but the body was not a usable record.
    Miss { status: u16 },
    /// Network failure, timeout or 5xx. The next endpoint is tried.
    Unavailable(String),
}

/// Probes the configured endpoints in order and returns the first normalized record.
pub struct Prober {
    endpoints: Vec<String>,
    transport: Arc<dyn Transport>,
    permits: Arc<Semaphore>,
    probe_timeout: Duration,
    connectivity_timeout: Duration,
    connectivity_sample: usize,
    policy: DefaultPolicy,
}

impl Prober {
    pub fn new(config: &Config, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoints: config.endpoints.clone(),
            transport,
            permits: Arc::new(Semaphore::new(config.max_concurrent_probes)),
            probe_timeout: config.probe_timeout,
            connectivity_timeout: config.connectivity_timeout,
            connectivity_sample: config.connectivity_sample,
            policy: config.policy,
        }
    }

    pub async fn lookup(&self, uid: &str) -> LookupOutcome {
        if let Err(err) = validate_identifier(uid) {
            return LookupOutcome::ValidationError(err.to_string());
        }

        tracing::info!(uid, endpoints = self.endpoints.len(), "looking up player");

        for endpoint in &self.endpoints {
            let attempt = match self.probe(endpoint, uid).await {
                Ok(attempt) => attempt,
                Err(reason) => return LookupOutcome::InternalError(reason),
            };

            match attempt {
                ProbeAttempt::Matched(record) => {
                    tracing::info!(uid, endpoint = %endpoint, "player found");
                    return LookupOutcome::Success {
                        record,
                        source: endpoint.clone(),
                    };
                }
                ProbeAttempt::Miss { status } => {
                    tracing::info!(endpoint = %endpoint, status, "no usable player data");
                }
                ProbeAttempt::Unavailable(reason) => {
                    tracing::warn!(endpoint = %endpoint, error = %reason, "endpoint unavailable");
                }
            }
        }

        tracing::warn!(uid, "all endpoints exhausted without a match");
        LookupOutcome::NotFound
    }

    /// One GET against one endpoint. Only a closed permit pool is an error.
    async fn probe(&self, endpoint: &str, uid: &str) -> Result<ProbeAttempt, String> {
        let url = format!("{endpoint}/{uid}");

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| format!("probe pool closed: {e}"))?;

        tracing::debug!(url = %url, "probing");

        let attempt = match self.transport.get(&url, self.probe_timeout).await {
            Err(err) => ProbeAttempt::Unavailable(err.to_string()),
            Ok(UpstreamResponse { status, .. }) if status >= 500 => {
                ProbeAttempt::Unavailable(format!("upstream returned {status}"))
            }
            Ok(resp) => self.interpret(resp, uid),
        };

        Ok(attempt)
    }

    fn interpret(&self, resp: UpstreamResponse, uid: &str) -> ProbeAttempt {
        let status = resp.status;
        if status != 200 || resp.body.trim().is_empty() {
            return ProbeAttempt::Miss { status };
        }

        let body: serde_json::Value = match serde_json::from_str(&resp.body) {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(error = %e, "response body is not JSON");
                return ProbeAttempt::Miss { status };
            }
        };

        match normalize::normalize(&body, uid, self.policy) {
            Some(record) => ProbeAttempt::Matched(record),
            None => ProbeAttempt::Miss { status },
        }
    }

    /// HEAD against the leading endpoints. Individual failures are reported, never raised.
    pub async fn check_connectivity(&self) -> Vec<EndpointStatus> {
        let mut results = Vec::with_capacity(self.connectivity_sample);

        for endpoint in self.endpoints.iter().take(self.connectivity_sample) {
            let status = self.head(endpoint).await;

            tracing::info!(
                endpoint = %endpoint,
                reachable = status.reachable,
                status = ?status.status,
                "connectivity probe"
            );
            results.push(status);
        }

        results
    }

    /// One HEAD under a probe permit. A closed pool reports the endpoint as unreachable.
    async fn head(&self, endpoint: &str) -> EndpointStatus {
        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                return EndpointStatus {
                    endpoint: endpoint.to_string(),
                    reachable: false,
                    status: None,
                    latency_ms: None,
                    error: Some(format!("probe pool closed: {e}")),
                };
            }
        };

        let started = Instant::now();
        let result = self.transport.head(endpoint, self.connectivity_timeout).await;
        let elapsed = started.elapsed().as_millis() as u64;

        match result {
            Ok(resp) => EndpointStatus {
                endpoint: endpoint.to_string(),
                reachable: true,
                status: Some(resp.status),
                latency_ms: Some(elapsed),
                error: None,
            },
            Err(err) => EndpointStatus {
                endpoint: endpoint.to_string(),
                reachable: false,
                status: None,
                latency_ms: None,
                error: Some(err.to_string()),
            },
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::upstream::{Transport, TransportError, UpstreamResponse};

    /// Transport answering from a script keyed by URL and recording each call.
    /// Unscripted URLs fail with a connection error.
    #[derive(Default)]
    pub struct ScriptedTransport {
        responses: HashMap<String, Result<UpstreamResponse, TransportError>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        pub fn respond(mut self, url: &str, status: u16, body: &str) -> Self {
            self.responses.insert(
                url.to_string(),
                Ok(UpstreamResponse {
                    status,
                    body: body.to_string(),
                }),
            );
            self
        }

        pub fn fail(mut self, url: &str, err: TransportError) -> Self {
            self.responses.insert(url.to_string(), Err(err));
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn answer(&self, url: &str) -> Result<UpstreamResponse, TransportError> {
            self.calls.lock().unwrap().push(url.to_string());
            self.responses
                .get(url)
                .cloned()
                .unwrap_or_else(|| Err(TransportError::Connect("connection refused".to_string())))
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn get(
            &self,
            url: &str,
            _timeout: Duration,
        ) -> Result<UpstreamResponse, TransportError> {
            self.answer(url)
        }

        async fn head(
            &self,
            url: &str,
            _timeout: Duration,
        ) -> Result<UpstreamResponse, TransportError> {
            self.answer(url)
        }
    }

    /// Transport that holds every request open briefly and records the peak number in flight.
    #[derive(Default)]
    pub struct SlowTransport {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl SlowTransport {
        pub fn peak(&self) -> usize {
            self.peak.load(Ordering::SeqCst)
        }

        async fn hold(&self) -> Result<UpstreamResponse, TransportError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            Ok(UpstreamResponse {
                status: 404,
                body: String::new(),
            })
        }
    }

    #[async_trait]
    impl Transport for SlowTransport {
        async fn get(
            &self,
            _url: &str,
            _timeout: Duration,
        ) -> Result<UpstreamResponse, TransportError> {
            self.hold().await
        }

        async fn head(
            &self,
            _url: &str,
            _timeout: Duration,
        ) -> Result<UpstreamResponse, TransportError> {
            self.hold().await
        }
    }
}
