//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest`
//! - `CallbackQueue` as a dedicated main thread ([`MainQueue`]) or a Tokio
//!   runtime handle ([`TokioQueue`])
//!
//! The sign-in presenter is not provided here: the desktop host owns its UI.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{MainQueue, ReqwestHttpClient};
//! use std::sync::Arc;
//!
//! let http_client = Arc::new(ReqwestHttpClient::new()?);
//! let main_queue = Arc::new(MainQueue::new()?);
//! ```

mod dispatch;
mod http;

pub use dispatch::{MainQueue, TokioQueue};
pub use http::{ReqwestHttpClient, RetryPolicy};
