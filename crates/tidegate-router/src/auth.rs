//! The authentication manager capability set.
//!
//! The auth manager owns client sessions: it dispatches authenticated
//! messages to registered route handlers, verifies client signatures,
//! countersigns server replies, and ships outbound messages. The router
//! consumes it purely through this trait; production implementations
//! and test doubles are interchangeable.

use thiserror::Error;

use tidegate_types::{AccountId, Message, Signable, TidegateError};

/// A registered route handler. The auth manager invokes it once per
/// authenticated client message; an `Err` becomes the error reply to
/// that message.
pub type RouteHandler =
    Box<dyn Fn(AccountId, &Message) -> Result<(), TidegateError> + Send + Sync>;

/// Signature verification failure reported by the auth manager.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("signature verification failed")]
    BadSignature,

    #[error("unknown account")]
    UnknownAccount,
}

/// Client-facing session management, consumed by the router.
pub trait AuthManager: Send + Sync {
    /// Register `handler` for the named route. One handler per route.
    fn route(&self, route: &'static str, handler: RouteHandler);

    /// Verify `sig` as the user's detached signature over `msg`.
    fn auth(&self, user: AccountId, msg: &[u8], sig: &[u8]) -> Result<(), AuthError>;

    /// Fill the signable's signature field with the server's signature
    /// over its serialization.
    fn sign(&self, signable: &mut dyn Signable);

    /// Fire-and-forget outbound send. Non-blocking by contract.
    fn send(&self, user: AccountId, msg: Message);
}
