//! # Termination signals.
//!
//! [`Terminated`] is the closed set of scope-lifecycle signals the
//! dispatcher recognizes and enforces. For any handler registration exactly
//! one of the three variants is ever delivered, by one of three mutually
//! exclusive triggers:
//!
//! | signal | trigger |
//! |---|---|
//! | [`Terminated::Joined`] | the scope was closed explicitly (see [`Scope`](crate::Scope)) |
//! | [`Terminated::EmitterDropped`] | the last emitter handle was dropped without a join |
//! | [`Terminated::Closed`] | the dispatcher shut down with the registration still live |
//!
//! After the signal finishes processing, the registration is gone.

use std::fmt;

use crate::events::EventKind;

/// A scope-termination signal.
///
/// Routed like any other event (a handler's waits can match on it), but
/// additionally enforced by the dispatcher: once a handler has seen the
/// signal addressed to its own emitter, it must be done — a handler that
/// is not gets terminated on its behalf.
#[derive(Clone, Debug)]
pub enum Terminated {
    /// Explicit, well-ordered termination. Carries the error that ended the
    /// scope, rendered to a message, when the scope did not exit cleanly.
    Joined {
        /// Rendered error that caused the join, if the scope failed.
        cause: Option<String>,
    },

    /// Safety-net termination: every handle to the emitter was dropped
    /// while its registration was still live.
    EmitterDropped,

    /// The dispatcher was closed while the registration was still live.
    Closed,
}

impl Terminated {
    /// A clean join, with no causing error.
    pub fn joined() -> Self {
        Terminated::Joined { cause: None }
    }

    /// A join caused by an error.
    pub fn joined_with(cause: impl Into<String>) -> Self {
        Terminated::Joined {
            cause: Some(cause.into()),
        }
    }

    /// The causing error message, if any. Only [`Terminated::Joined`] can
    /// carry one.
    pub fn cause(&self) -> Option<&str> {
        match self {
            Terminated::Joined { cause } => cause.as_deref(),
            _ => None,
        }
    }

    /// The [`EventKind`] this signal appears as to matchers.
    pub fn kind(&self) -> EventKind {
        match self {
            Terminated::Joined { .. } => EventKind::Joined,
            Terminated::EmitterDropped => EventKind::EmitterDropped,
            Terminated::Closed => EventKind::Closed,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        self.kind().as_label()
    }
}

impl fmt::Display for Terminated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminated::Joined { cause: Some(cause) } => write!(f, "joined: {cause}"),
            Terminated::Joined { cause: None } => write!(f, "joined"),
            Terminated::EmitterDropped => write!(f, "emitter dropped"),
            Terminated::Closed => write!(f, "dispatcher closed"),
        }
    }
}
