//! # Core Configuration Module
//!
//! Provides configuration management for the QuoteDesk core.
//!
//! ## Overview
//!
//! Two layers:
//!
//! - [`ServiceConfig`]: the two base URLs (auth service, resource service), read
//!   once at startup from a JSON file, a JSON string, or the environment.
//! - [`CoreConfig`]: the service URLs plus every injected bridge (transport,
//!   callback queue, sign-in presenter) and tuning knobs. Built with
//!   [`CoreConfig::builder`], which fails fast with actionable messages when a
//!   required capability is missing.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{CoreConfig, ServiceConfig};
//! use std::sync::Arc;
//!
//! let service = ServiceConfig::from_json_file("config/environments.json")?;
//! let config = CoreConfig::builder()
//!     .service(service)
//!     .presenter(Arc::new(MySignInWindow::new()))
//!     .build()?;
//! ```
//!
//! ## Configuration File
//!
//! ```json
//! {
//!   "auth_url": "https://auth.example.com/api",
//!   "service_url": "https://quotes.example.com/api"
//! }
//! ```

use crate::error::{Error, Result};
use bridge_traits::{CallbackQueue, HttpClient, SignInPresenter};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use url::Url;

/// Environment variable holding the auth service base URL.
pub const AUTH_URL_ENV: &str = "QUOTEDESK_AUTH_URL";

/// Environment variable holding the resource service base URL.
pub const SERVICE_URL_ENV: &str = "QUOTEDESK_SERVICE_URL";

/// Base URLs of the two backend services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Auth service (`/login`, `/users`)
    pub auth_url: Url,
    /// Resource service (`/products`, `/quotes`, `/users/homeInfo`)
    pub service_url: Url,
}

#[derive(Debug, Deserialize)]
struct RawServiceConfig {
    auth_url: String,
    service_url: String,
}

impl ServiceConfig {
    /// Parses and validates both base URLs.
    pub fn new(auth_url: &str, service_url: &str) -> Result<Self> {
        Ok(Self {
            auth_url: parse_base_url("auth_url", auth_url)?,
            service_url: parse_base_url("service_url", service_url)?,
        })
    }

    /// Loads the configuration from a JSON document with `auth_url` and
    /// `service_url` keys.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawServiceConfig = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Invalid service configuration: {}", e)))?;
        Self::new(&raw.auth_url, &raw.service_url)
    }

    /// Loads the configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read service configuration {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&contents)
    }

    /// Loads the configuration from `QUOTEDESK_AUTH_URL` and
    /// `QUOTEDESK_SERVICE_URL`.
    pub fn from_env() -> Result<Self> {
        let read = |name: &str| {
            std::env::var(name)
                .map_err(|_| Error::Config(format!("Environment variable {} is not set", name)))
        };
        Self::new(&read(AUTH_URL_ENV)?, &read(SERVICE_URL_ENV)?)
    }

    /// Absolute URL of `path` under the auth service.
    pub fn auth_endpoint(&self, path: &str) -> Result<Url> {
        append_path(&self.auth_url, path)
    }

    /// Absolute URL of `path` under the resource service.
    pub fn service_endpoint(&self, path: &str) -> Result<Url> {
        append_path(&self.service_url, path)
    }
}

fn parse_base_url(field: &str, value: &str) -> Result<Url> {
    let url = Url::parse(value.trim())
        .map_err(|e| Error::Config(format!("{} is not a valid URL: {}", field, e)))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(Error::Config(format!(
                "{} must use http or https, found '{}'",
                field, other
            )))
        }
    }

    if url.cannot_be_a_base() {
        return Err(Error::Config(format!("{} cannot be used as a base URL", field)));
    }

    Ok(url)
}

/// Appends path segments to `base`, keeping any path the base already has.
///
/// `https://host/api` + `quotes/product/4` → `https://host/api/quotes/product/4`.
pub fn append_path(base: &Url, path: &str) -> Result<Url> {
    let mut url = base.clone();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| Error::Config(format!("{} cannot be used as a base URL", base)))?;
        segments.pop_if_empty();
        segments.extend(path.split('/').filter(|s| !s.is_empty()));
    }
    Ok(url)
}

/// What happens to waiting requesters when the user's sign-in attempt fails
/// (rejected credentials, unreachable service).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignInFailurePolicy {
    /// Fail every waiting requester with the sign-in error and dismiss the
    /// sign-in surface.
    #[default]
    FailPending,
    /// Leave the surface up and requesters queued so the user can retry or
    /// cancel.
    KeepWaiting,
}

/// Core configuration for the QuoteDesk core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Backend base URLs
    pub service: ServiceConfig,

    /// Transport for both services
    pub http_client: Arc<dyn HttpClient>,

    /// Queue on which completion callbacks run unless a caller picks another
    pub callback_queue: Arc<dyn CallbackQueue>,

    /// Interactive sign-in surface
    pub presenter: Arc<dyn SignInPresenter>,

    /// Event bus buffer size
    pub event_buffer_size: usize,

    /// Behavior when an interactive sign-in attempt fails
    pub sign_in_failure_policy: SignInFailurePolicy,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("service", &self.service)
            .field("http_client", &"HttpClient { ... }")
            .field("callback_queue", &self.callback_queue.label())
            .field("presenter", &"SignInPresenter { ... }")
            .field("event_buffer_size", &self.event_buffer_size)
            .field("sign_in_failure_policy", &self.sign_in_failure_policy)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if self.event_buffer_size > 65_536 {
            return Err(Error::Config(
                "Event buffer size exceeds maximum of 65,536 events".to_string(),
            ));
        }

        Ok(())
    }
}

fn presenter_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "SignInPresenter".to_string(),
        message: "A SignInPresenter is required to collect credentials interactively. \
                 Inject the host's sign-in UI adapter."
            .to_string(),
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "No HTTP client implementation provided. \
                 Desktop: enable the 'desktop-shims' feature to use ReqwestHttpClient. \
                 Mobile: inject the platform-native transport."
            .to_string(),
    })
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::{ReqwestHttpClient, RetryPolicy};

    let client = ReqwestHttpClient::new()
        .map_err(|e| Error::Internal(format!("Failed to create default HttpClient: {}", e)))?
        .with_retry_policy(RetryPolicy::none());
    Ok(Arc::new(client))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_callback_queue() -> Result<Arc<dyn CallbackQueue>> {
    Err(Error::CapabilityMissing {
        capability: "CallbackQueue".to_string(),
        message: "No callback queue provided. \
                 Desktop: enable the 'desktop-shims' feature to use MainQueue. \
                 Mobile: inject a queue that marshals onto the UI thread."
            .to_string(),
    })
}

#[cfg(feature = "desktop-shims")]
fn provide_default_callback_queue() -> Result<Arc<dyn CallbackQueue>> {
    use bridge_desktop::MainQueue;

    let queue = MainQueue::new()
        .map_err(|e| Error::Internal(format!("Failed to start default main queue: {}", e)))?;
    Ok(Arc::new(queue))
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    service: Option<ServiceConfig>,
    http_client: Option<Arc<dyn HttpClient>>,
    callback_queue: Option<Arc<dyn CallbackQueue>>,
    presenter: Option<Arc<dyn SignInPresenter>>,
    event_buffer_size: Option<usize>,
    sign_in_failure_policy: SignInFailurePolicy,
}

impl CoreConfigBuilder {
    /// Sets the backend base URLs (required).
    pub fn service(mut self, service: ServiceConfig) -> Self {
        self.service = Some(service);
        self
    }

    /// Sets the HTTP client implementation.
    ///
    /// If not provided, `ReqwestHttpClient` is used when the `desktop-shims`
    /// feature is enabled.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the default completion queue.
    ///
    /// If not provided, a dedicated `MainQueue` thread is started when the
    /// `desktop-shims` feature is enabled.
    pub fn callback_queue(mut self, queue: Arc<dyn CallbackQueue>) -> Self {
        self.callback_queue = Some(queue);
        self
    }

    /// Sets the interactive sign-in surface (required).
    pub fn presenter(mut self, presenter: Arc<dyn SignInPresenter>) -> Self {
        self.presenter = Some(presenter);
        self
    }

    /// Sets the event bus buffer size.
    ///
    /// Default: 100 events
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Sets the policy applied when a sign-in attempt fails.
    ///
    /// Default: [`SignInFailurePolicy::FailPending`]
    pub fn sign_in_failure_policy(mut self, policy: SignInFailurePolicy) -> Self {
        self.sign_in_failure_policy = policy;
        self
    }

    /// Builds the configuration, injecting platform defaults where available.
    ///
    /// # Errors
    ///
    /// - `Error::Config` if the service URLs are missing or a value is invalid
    /// - `Error::CapabilityMissing` if a required bridge has no implementation
    pub fn build(self) -> Result<CoreConfig> {
        let service = self.service.ok_or_else(|| {
            Error::Config(
                "Service configuration is required. \
                 Load it with ServiceConfig::from_json_file or ServiceConfig::from_env."
                    .to_string(),
            )
        })?;

        let presenter = self.presenter.ok_or_else(presenter_missing_error)?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client()?,
        };

        let callback_queue = match self.callback_queue {
            Some(queue) => queue,
            None => provide_default_callback_queue()?,
        };

        let config = CoreConfig {
            service,
            http_client,
            callback_queue,
            presenter,
            event_buffer_size: self
                .event_buffer_size
                .unwrap_or(crate::events::DEFAULT_EVENT_BUFFER_SIZE),
            sign_in_failure_policy: self.sign_in_failure_policy,
        };

        config.validate()?;
        Ok(config)
    }
}
