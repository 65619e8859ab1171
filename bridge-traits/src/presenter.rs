//! Interactive Sign-In Surface
//!
//! The core never renders UI. When credentials are needed it asks the host to
//! present a sign-in surface, and the host reports back through the
//! `AuthGate` completion entry points (`sign_in_requested`,
//! `sign_in_cancelled`, `register_requested`).

use std::fmt;

/// Identifier of one interactive sign-in flow.
///
/// Ids increase monotonically per gate, so a host can ignore a dismissal that
/// refers to a flow it has already replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignInFlowId(pub u64);

impl fmt::Display for SignInFlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "flow-{}", self.0)
    }
}

/// Host-provided credential entry UI.
///
/// # Contract
///
/// - At most one live surface per gate. The gate calls `present_sign_in` only
///   when no other flow is in flight.
/// - Calls arrive on arbitrary threads; implementations marshal to their UI
///   thread themselves and must return promptly.
/// - Implementations must not block waiting for the user inside these calls.
/// - `present_sign_in` is called after the gate releases its lock, so a
///   `dismiss_sign_in` for a flow can arrive before that flow's
///   `present_sign_in`. Hosts must remember dismissed flow ids and ignore a
///   later present for them.
pub trait SignInPresenter: Send + Sync {
    /// Show the sign-in surface for `flow`.
    fn present_sign_in(&self, flow: SignInFlowId);

    /// Tear down the surface for `flow`, if it is still showing.
    fn dismiss_sign_in(&self, flow: SignInFlowId);
}
