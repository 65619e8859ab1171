//! Core service façade and bootstrap helpers.
//!
//! This crate wires a [`CoreConfig`] (service URLs plus host-provided bridges:
//! HTTP transport, callback queue, sign-in presenter) into one [`AuthGate`] and
//! one [`ResourceClient`] sharing it. The host owns the returned
//! [`CoreService`] for as long as the process needs a session; there is no
//! global instance.
//!
//! Desktop apps typically enable the `desktop-shims` feature, which supplies
//! `ReqwestHttpClient` and a dedicated `MainQueue` so only the service URLs
//! and the sign-in presenter have to be provided.

pub mod error;

pub use error::{CoreError, Result};

pub use core_auth::{
    AuthError, AuthGate, BasicCredential, GateState, RegistrationForm, RequesterKey, User,
};
pub use core_network::{
    HomeInfo, NetworkError, Product, ProductType, QuoteRequest, ResourceClient, RoomSize,
};
pub use core_runtime::config::{CoreConfig, ServiceConfig, SignInFailurePolicy};
pub use core_runtime::events::{CoreEvent, EventBus, EventStream};

use core_network::RetryingRequestExecutor;
use std::sync::Arc;
use tracing::info;

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    config: Arc<CoreConfig>,
    event_bus: EventBus,
    auth: Arc<AuthGate>,
    resources: ResourceClient,
}

impl CoreService {
    /// Wire the gate and the resource client from `config`.
    pub fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;

        let event_bus = EventBus::new(config.event_buffer_size);
        let auth = Arc::new(AuthGate::from_config(&config, event_bus.clone()));
        let executor = RetryingRequestExecutor::new(
            Arc::clone(&auth),
            Arc::clone(&config.http_client),
            event_bus.clone(),
        );
        let resources = ResourceClient::new(config.service.clone(), executor);

        info!(
            auth_url = %config.service.auth_url,
            service_url = %config.service.service_url,
            queue = config.callback_queue.label(),
            "Core service ready"
        );

        Ok(Self {
            config: Arc::new(config),
            event_bus,
            auth,
            resources,
        })
    }

    /// The session gate. Host sign-in UI reports back through it.
    pub fn auth(&self) -> &Arc<AuthGate> {
        &self.auth
    }

    /// Resource operations issued under the service's own requester key.
    pub fn resources(&self) -> &ResourceClient {
        &self.resources
    }

    pub fn events(&self) -> &EventBus {
        &self.event_bus
    }

    /// New subscription to every core event.
    pub fn subscribe_events(&self) -> EventStream {
        EventStream::new(self.event_bus.subscribe())
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }
}

impl std::fmt::Debug for CoreService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreService")
            .field("config", &self.config)
            .field("auth", &self.auth)
            .finish()
    }
}

/// Convenience bootstrapper for desktop hosts.
///
/// ```ignore
/// use core_service::{bootstrap_desktop, ServiceConfig};
///
/// let service = ServiceConfig::from_env()?;
/// let core = bootstrap_desktop(service, Arc::new(MySignInWindow::new()))?;
/// let quotes = core.resources().get_quotes().await?;
/// ```
#[cfg(feature = "desktop-shims")]
pub fn bootstrap_desktop(
    service: ServiceConfig,
    presenter: Arc<dyn bridge_traits::SignInPresenter>,
) -> Result<CoreService> {
    let config = CoreConfig::builder()
        .service(service)
        .presenter(presenter)
        .build()?;
    CoreService::new(config)
}
