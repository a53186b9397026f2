//! Event data model: the envelope and the control-signal taxonomy.
//!
//! This module groups the types that travel through the dispatcher:
//! application payloads wrapped in an [`Event`] envelope, the [`Forked`]
//! announcement sent when a child scope is born, and the closed set of
//! [`Terminated`] signals that carry scope-lifecycle meaning recognized by
//! the dispatcher itself.
//!
//! ## Contents
//! - [`Event`], [`EventKind`] — envelope over application payloads plus a
//!   coarse shape discriminant for matching;
//! - [`Forked`] — child-emitter announcement with an optional payload;
//! - [`Terminated`] — `Joined` / `EmitterDropped` / `Closed` signal set.
//!
//! See `dispatch` for how these are routed and `emitters` for who sends them.

mod event;
mod signal;

pub use event::{Event, EventKind, Forked};
pub use signal::Terminated;
