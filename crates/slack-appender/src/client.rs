// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Non-blocking delivery of payloads to a Slack incoming webhook.
//!
//! Every call to [`DeliveryClient::deliver`] becomes one attempt that runs on
//! the tokio runtime captured when the client was built, so it can be called
//! from any thread, including ones outside the runtime.
//!
//! # Attempt lifecycle
//!
//! ```text
//!   Created ──> StreamOpening ──> StreamWriting ──> ResponseAwaited ──> Completed
//!      │              │                 │                  │
//!      └──────────────┴────────┬────────┴──────────────────┘
//!                              v
//!                            Failed
//! ```
//!
//! - **StreamOpening**: endpoint parsed, payload serialized and form-encoded
//! - **StreamWriting**: request in flight (connect, write body, read headers)
//! - **ResponseAwaited**: status received, body being drained
//!
//! The attempt is owned by the client's registry from `Created` until it
//! reaches a terminal state. Removal happens when the attempt is dropped, so an
//! attempt whose task is torn down early still leaves the registry.
//!
//! Failures are logged and handed to the optional completion callback. They
//! never reach the caller: a log statement must not fail the application.

use crate::error::DeliveryError;
use crate::payload::{Payload, PayloadDefaults};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tracing::{debug, error};

/// Invoked once per [`DeliveryClient::deliver`] call with the attempt's outcome.
pub type CompletionCallback = Box<dyn FnOnce(Result<(), DeliveryError>) + Send + 'static>;

/// Non-terminal states of a delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryState {
    Created,
    StreamOpening,
    StreamWriting,
    ResponseAwaited,
}

/// Snapshot of one outstanding attempt.
#[derive(Debug, Clone)]
pub struct InFlightRequest {
    pub id: u64,
    pub state: DeliveryState,
    pub started: Instant,
}

#[derive(Debug, Default)]
struct Registry {
    next_id: AtomicU64,
    requests: Mutex<HashMap<u64, InFlightRequest>>,
    idle: Notify,
}

impl Registry {
    fn requests(&self) -> MutexGuard<'_, HashMap<u64, InFlightRequest>> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(self: &Arc<Self>) -> Attempt {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.requests().insert(
            id,
            InFlightRequest {
                id,
                state: DeliveryState::Created,
                started: Instant::now(),
            },
        );
        Attempt {
            id,
            registry: Arc::clone(self),
        }
    }

    fn untrack(&self, id: u64) {
        let mut requests = self.requests();
        if requests.remove(&id).is_some() && requests.is_empty() {
            drop(requests);
            self.idle.notify_waiters();
        }
    }
}

/// Registry membership of one attempt; leaving scope untracks it.
struct Attempt {
    id: u64,
    registry: Arc<Registry>,
}

impl Attempt {
    fn advance(&self, state: DeliveryState) {
        if let Some(request) = self.registry.requests().get_mut(&self.id) {
            debug!(
                "SLACK | Delivery {} {:?} -> {:?}",
                self.id, request.state, state
            );
            request.state = state;
        }
    }
}

impl Drop for Attempt {
    fn drop(&mut self) {
        self.registry.untrack(self.id);
    }
}

/// Attempt started by [`DeliveryClient::deliver`] together with its callback.
///
/// Owned by the spawned task. A runtime that has shut down drops the task
/// without polling it; the callback then still fires with a runtime error.
struct PendingDelivery {
    attempt: Attempt,
    on_complete: Option<CompletionCallback>,
    completed: bool,
}

impl PendingDelivery {
    fn complete(&mut self, result: Result<(), DeliveryError>) {
        self.completed = true;
        self.attempt.registry.untrack(self.attempt.id);
        if let Some(callback) = self.on_complete.take() {
            callback(result);
        }
    }
}

impl Drop for PendingDelivery {
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        let error =
            DeliveryError::Runtime("runtime shut down before the delivery ran".to_string());
        error!(
            "SLACK | Failed to deliver notification {}: {}",
            self.attempt.id, error
        );
        self.complete(Err(error));
    }
}

/// Posts payloads to a webhook without blocking the caller.
#[derive(Clone)]
pub struct DeliveryClient {
    client: reqwest::Client,
    runtime: Handle,
    registry: Arc<Registry>,
    defaults: PayloadDefaults,
}

impl std::fmt::Debug for DeliveryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryClient")
            .field("in_flight", &self.in_flight())
            .field("defaults", &self.defaults)
            .finish()
    }
}

impl DeliveryClient {
    /// Builds a client bound to the runtime of the calling context.
    pub fn new(client: reqwest::Client) -> Result<Self, DeliveryError> {
        let runtime = Handle::try_current().map_err(|e| DeliveryError::Runtime(e.to_string()))?;
        Ok(Self::with_runtime(client, runtime))
    }

    #[must_use]
    pub fn with_runtime(client: reqwest::Client, runtime: Handle) -> Self {
        DeliveryClient {
            client,
            runtime,
            registry: Arc::new(Registry::default()),
            defaults: PayloadDefaults::default(),
        }
    }

    /// Values used for payload fields that are left empty.
    #[must_use]
    pub fn with_defaults(mut self, defaults: PayloadDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Starts delivering `payload` to `endpoint` and returns immediately.
    pub fn deliver(
        &self,
        endpoint: &str,
        payload: Payload,
        on_complete: Option<CompletionCallback>,
    ) {
        let mut pending = PendingDelivery {
            attempt: self.registry.begin(),
            on_complete,
            completed: false,
        };
        let client = self.clone();
        let endpoint = endpoint.to_string();

        self.runtime.spawn(async move {
            let result = client.run(&pending.attempt, &endpoint, payload).await;
            report(&pending.attempt, &endpoint, &result);
            pending.complete(result);
        });
    }

    /// Delivers `payload` and waits for the outcome.
    pub async fn send(&self, endpoint: &str, payload: Payload) -> Result<(), DeliveryError> {
        let attempt = self.registry.begin();
        let result = self.run(&attempt, endpoint, payload).await;
        report(&attempt, endpoint, &result);
        result
    }

    /// Number of attempts that have not reached a terminal state.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.registry.requests().len()
    }

    #[must_use]
    pub fn in_flight_requests(&self) -> Vec<InFlightRequest> {
        let mut requests: Vec<_> = self.registry.requests().values().cloned().collect();
        requests.sort_by_key(|request| request.id);
        requests
    }

    /// Resolves once no attempt is outstanding.
    pub async fn wait_idle(&self) {
        loop {
            let idle = self.registry.idle.notified();
            if self.in_flight() == 0 {
                return;
            }
            idle.await;
        }
    }

    async fn run(
        &self,
        attempt: &Attempt,
        endpoint: &str,
        payload: Payload,
    ) -> Result<(), DeliveryError> {
        attempt.advance(DeliveryState::StreamOpening);
        let url = reqwest::Url::parse(endpoint).map_err(|e| DeliveryError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        let json = payload.with_defaults(&self.defaults).to_json()?;
        let request = self.client.post(url).form(&[("payload", json)]);

        attempt.advance(DeliveryState::StreamWriting);
        // reqwest errors carry the full URL, which holds the webhook secret
        let response = request.send().await.map_err(reqwest::Error::without_url)?;

        attempt.advance(DeliveryState::ResponseAwaited);
        let status = response.status();
        // Slack answers "ok"; only the arrival matters
        let body = response.text().await.map_err(reqwest::Error::without_url)?;
        if !status.is_success() {
            return Err(DeliveryError::Status { status, body });
        }
        Ok(())
    }
}

fn report(attempt: &Attempt, endpoint: &str, result: &Result<(), DeliveryError>) {
    let elapsed = attempt
        .registry
        .requests()
        .get(&attempt.id)
        .map(|request| request.started.elapsed());
    match result {
        Ok(()) => debug!(
            "SLACK | Delivery {} completed in {:?}",
            attempt.id,
            elapsed.unwrap_or_default()
        ),
        Err(e) => error!(
            "SLACK | Failed to deliver notification {} to webhook {}: {}",
            attempt.id,
            redact(endpoint),
            e
        ),
    }
}

/// Webhook URLs embed their secret in the path; log only scheme and host.
fn redact(endpoint: &str) -> String {
    match reqwest::Url::parse(endpoint) {
        Ok(url) => format!("{}://{}/...", url.scheme(), url.host_str().unwrap_or_default()),
        Err(_) => "<invalid url>".to_string(),
    }
}
