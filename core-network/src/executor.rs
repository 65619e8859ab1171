//! # Retrying Request Executor
//!
//! Runs a credentialed request and recovers from exactly one authentication
//! rejection.
//!
//! ## Flow
//!
//! 1. Obtain a credential from the [`AuthGate`] (may show the sign-in surface).
//! 2. Build the request with it and send it.
//! 3. Classify the response into an [`Outcome`].
//! 4. On [`Outcome::AuthRejected`], drop the rejected credential from the gate
//!    and start over from step 1. This happens at most
//!    [`MAX_AUTH_RETRIES`] times; a second rejection is reported as
//!    [`NetworkError::NotAuthenticated`].
//!
//! Every other outcome is handed to the caller unchanged. Turning
//! [`NetworkError::NotFound`] into an empty result is the caller's decision.

use crate::error::{NetworkError, Result};
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use core_auth::{AuthGate, BasicCredential, RequesterKey};
use core_runtime::events::{CoreEvent, EventBus, NetworkEvent};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Authentication rejections recovered from per call.
pub const MAX_AUTH_RETRIES: usize = 1;

/// Classification of one response.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    /// The service refused the credential.
    AuthRejected,
    NotFound,
    Failed(NetworkError),
}

/// Default classification: 2xx decodes the body as JSON, everything else goes
/// through [`classify_status`].
pub fn default_classify<T: DeserializeOwned>(response: HttpResponse) -> Outcome<T> {
    if !response.is_success() {
        return classify_status(response.status);
    }
    match response.json::<T>() {
        Ok(value) => Outcome::Success(value),
        Err(e) => Outcome::Failed(NetworkError::InvalidResponse(e.to_string())),
    }
}

/// Outcome of a non-2xx status: 401 is an auth rejection, 404 is not found,
/// anything else is [`NetworkError::Unknown`].
pub fn classify_status<T>(status: u16) -> Outcome<T> {
    match status {
        401 => Outcome::AuthRejected,
        404 => Outcome::NotFound,
        status => Outcome::Failed(NetworkError::Unknown {
            status: Some(status),
        }),
    }
}

/// Wraps credentialed requests with single-retry authentication recovery.
#[derive(Clone)]
pub struct RetryingRequestExecutor {
    gate: Arc<AuthGate>,
    http_client: Arc<dyn HttpClient>,
    event_bus: EventBus,
}

impl RetryingRequestExecutor {
    pub fn new(gate: Arc<AuthGate>, http_client: Arc<dyn HttpClient>, event_bus: EventBus) -> Self {
        Self {
            gate,
            http_client,
            event_bus,
        }
    }

    pub fn gate(&self) -> &Arc<AuthGate> {
        &self.gate
    }

    /// Run an authenticated request on behalf of `key`.
    ///
    /// `build` is called once per attempt with the credential for that
    /// attempt. `classify` maps each response to an [`Outcome`].
    #[instrument(skip(self, build, classify), fields(requester = %key))]
    pub async fn execute<T, B, C>(&self, key: RequesterKey, build: B, classify: C) -> Result<T>
    where
        B: Fn(&BasicCredential) -> Result<HttpRequest>,
        C: Fn(HttpResponse) -> Outcome<T>,
    {
        let mut auth_retries = 0;

        loop {
            let (credential, _user) = self.gate.acquire_token(key).await.map_err(|err| {
                debug!(error = %err, "No credential for request");
                NetworkError::from(err)
            })?;

            let request = build(&credential)?;
            let operation = describe(&request);

            let response = match self.http_client.execute(request).await {
                Ok(response) => response,
                Err(err) => {
                    let err = NetworkError::from(err);
                    self.report_failure(&operation, &err);
                    return Err(err);
                }
            };

            match classify(response) {
                Outcome::Success(value) => return Ok(value),
                Outcome::AuthRejected if auth_retries < MAX_AUTH_RETRIES => {
                    auth_retries += 1;
                    warn!(%operation, "Not authenticated; invalidating credential and retrying");
                    self.gate.invalidate_credential(&credential);
                    let _ = self.event_bus.emit(CoreEvent::Network(NetworkEvent::AuthRetry {
                        operation,
                    }));
                }
                Outcome::AuthRejected => {
                    let err = NetworkError::NotAuthenticated;
                    self.report_failure(&operation, &err);
                    return Err(err);
                }
                Outcome::NotFound => {
                    debug!(%operation, "Resource not found");
                    return Err(NetworkError::NotFound);
                }
                Outcome::Failed(err) => {
                    self.report_failure(&operation, &err);
                    return Err(err);
                }
            }
        }
    }

    /// Run a request that needs no credential. No retry is attempted.
    #[instrument(skip(self, request, classify), fields(url = %request.url))]
    pub async fn execute_public<T, C>(&self, request: HttpRequest, classify: C) -> Result<T>
    where
        C: FnOnce(HttpResponse) -> Outcome<T>,
    {
        let operation = describe(&request);
        let response = self.http_client.execute(request).await.map_err(|err| {
            let err = NetworkError::from(err);
            self.report_failure(&operation, &err);
            err
        })?;

        match classify(response) {
            Outcome::Success(value) => Ok(value),
            Outcome::AuthRejected => Err(NetworkError::NotAuthenticated),
            Outcome::NotFound => Err(NetworkError::NotFound),
            Outcome::Failed(err) => {
                self.report_failure(&operation, &err);
                Err(err)
            }
        }
    }

    fn report_failure(&self, operation: &str, err: &NetworkError) {
        warn!(%operation, error = %err, "Request failed");
        let _ = self
            .event_bus
            .emit(CoreEvent::Network(NetworkEvent::RequestFailed {
                operation: operation.to_string(),
                message: err.to_string(),
            }));
    }
}

/// `"GET https://host/quotes"` style label used in logs and events.
fn describe(request: &HttpRequest) -> String {
    format!("{} {}", request.method.as_str(), request.url)
}
