//! # Authentication Module
//!
//! Session gate for the QuoteDesk services.
//!
//! ## Overview
//!
//! The services authenticate every request with HTTP Basic credentials
//! (`email:password`). This crate holds the one cached credential, collects it
//! interactively through the host's sign-in surface when there is none, and
//! fans the result out to everyone who asked for it in the meantime.
//!
//! ## Features
//!
//! - [`AuthGate`]: cached session, coalesced sign-in, registration, invalidation
//! - [`CallbackRegistry`]: thread-safe multimap of pending continuations
//! - Callback and async (`acquire_token`) request styles
//! - Auth state event emission

pub mod error;
pub mod gate;
pub mod registry;
pub mod types;

pub use core_runtime::config::SignInFailurePolicy;
pub use error::{AuthError, Result};
pub use gate::{AuthGate, FailureFn, SuccessFn};
pub use registry::{CallbackRegistry, Scheduled};
pub use types::{BasicCredential, GateState, RegistrationForm, RequesterKey, Session, User};
