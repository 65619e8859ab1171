//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the core library and the
//! collaborators it treats as opaque: the network transport, the thread on which
//! completions must run, the interactive sign-in UI, and the host logger.
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Async request/response transport
//! - [`CallbackQueue`](dispatch::CallbackQueue) - Where completion callbacks run
//! - [`SignInPresenter`](presenter::SignInPresenter) - Credential entry surface
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Fail-Fast Strategy
//!
//! The core fails fast with descriptive errors when a required capability is
//! missing:
//!
//! ```ignore
//! use core_runtime::Error;
//!
//! let presenter = builder.presenter
//!     .ok_or_else(|| Error::CapabilityMissing {
//!         capability: "SignInPresenter".to_string(),
//!         message: "Inject the host sign-in UI adapter.".to_string(),
//!     })?;
//! ```
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds so a single implementation can
//! be shared across async tasks and OS threads.

pub mod dispatch;
pub mod error;
pub mod http;
pub mod logging;
pub mod presenter;

pub use error::BridgeError;

// Re-export commonly used types
pub use dispatch::{CallbackQueue, InlineQueue, Job};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use presenter::{SignInFlowId, SignInPresenter};
