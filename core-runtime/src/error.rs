use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors raised while assembling or starting the core.
#[derive(Error, Debug)]
pub enum Error {
    /// A configuration value is missing, malformed or out of range.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required host bridge was not injected and has no default.
    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    /// A host bridge failed while being set up.
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
