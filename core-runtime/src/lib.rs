//! # Core Runtime Module
//!
//! Foundational infrastructure shared by the QuoteDesk core crates:
//! - Logging and tracing setup
//! - Service URLs and the injected-bridge configuration
//! - Event bus for auth and network notifications
//!
//! ## Overview
//!
//! Nothing here knows about sessions or resources. `core-auth` and
//! `core-network` build on these pieces, and `core-service` wires them together
//! from a single [`CoreConfig`](config::CoreConfig).

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{CoreConfig, CoreConfigBuilder, ServiceConfig, SignInFailurePolicy};
pub use error::{Error, Result};
pub use events::{AuthEvent, CoreEvent, EventBus, EventSeverity, EventStream, NetworkEvent};
