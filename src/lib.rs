//! Workspace placeholder crate.
//!
//! This crate exposes the shared feature flags that map to the individual
//! workspace crates. Host applications can depend on `quotedesk-workspace` and
//! enable `desktop-shims` to get the reqwest transport and the main dispatch
//! queue wired in without naming each crate individually.

#[cfg(feature = "desktop-shims")]
pub use core_service::*;
