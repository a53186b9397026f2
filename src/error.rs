//! Error types reported by the dispatch runtime.
//!
//! The only fallible operation in the public API is handler registration:
//! everything that goes wrong at runtime (handler errors, failed
//! completions, ignored termination signals) is logged and contained,
//! never surfaced to the sender of an event. [`DispatchError`] covers the
//! remaining class of failures — precondition violations in the calling
//! code — which are reported loudly instead of being swallowed.

use thiserror::Error;

use crate::emitters::EmitterId;

/// # Registration preconditions violated by the caller.
///
/// These are programming errors, not runtime conditions: every variant means
/// the calling code handed the dispatcher something it must never hand it.
/// They are returned eagerly from [`register`](crate::Dispatcher::register)
/// and should generally be treated as fatal by the caller.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DispatchError {
    /// A live registration already exists for this emitter.
    ///
    /// At most one handler may be registered per emitter identity; the
    /// previous registration must terminate before a new one is installed.
    #[error("emitter {id} already has a live handler registration")]
    AlreadyRegistered {
        /// Identity of the emitter that is already registered.
        id: EmitterId,
    },

    /// A handler group with no members was supplied.
    #[error("handler group must contain at least one member")]
    EmptyGroup,

    /// The emitter is bound to a different dispatcher.
    #[error("emitter {id} belongs to a different dispatcher")]
    ForeignEmitter {
        /// Identity of the foreign emitter.
        id: EmitterId,
    },

    /// The dispatcher has been closed (or dropped); no further
    /// registrations are accepted.
    #[error("dispatcher is closed")]
    Closed,
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use scopewatch::DispatchError;
    ///
    /// assert_eq!(DispatchError::Closed.as_label(), "dispatcher_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::AlreadyRegistered { .. } => "already_registered",
            DispatchError::EmptyGroup => "empty_group",
            DispatchError::ForeignEmitter { .. } => "foreign_emitter",
            DispatchError::Closed => "dispatcher_closed",
        }
    }
}
