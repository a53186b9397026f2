//! # Event envelope delivered to handlers.
//!
//! Every value a handler observes is an [`Event`]: either an
//! application-defined payload ([`Event::App`]), the birth announcement of
//! a child scope ([`Event::Forked`]), or a termination signal
//! ([`Event::Terminated`]). The dispatcher attaches no metadata of its own —
//! ordering within one emitter chain is the call order of `send`, and the
//! sender's position in the scope tree is what routing keys on.
//!
//! [`EventKind`] is the coarse shape discriminant used for matching events
//! without inspecting payloads (see [`Cond::kinds`](crate::Cond::kinds)).

use crate::emitters::Emitter;
use crate::events::Terminated;

/// Envelope for everything delivered to a handler.
///
/// `E` is the application's own event type; the two remaining variants are
/// produced by the runtime ([`fork`](crate::Emitter::fork) announcements and
/// termination signals) and carry lifecycle meaning the dispatcher itself
/// recognizes.
///
/// # Example
/// ```
/// use scopewatch::{Event, EventKind};
///
/// let ev = Event::App("cache warmed");
/// assert_eq!(ev.kind(), EventKind::App);
/// assert_eq!(ev.as_app(), Some(&"cache warmed"));
/// ```
#[derive(Clone, Debug)]
pub enum Event<E: 'static> {
    /// An application-defined payload sent through [`Emitter::send`].
    App(E),
    /// A child scope was forked off the sending emitter.
    Forked(Forked<E>),
    /// A termination signal for the sending emitter's scope.
    Terminated(Terminated),
}

impl<E: 'static> Event<E> {
    /// Returns the coarse shape of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::App(_) => EventKind::App,
            Event::Forked(_) => EventKind::Forked,
            Event::Terminated(signal) => signal.kind(),
        }
    }

    /// Returns the application payload, if this is an [`Event::App`].
    pub fn as_app(&self) -> Option<&E> {
        match self {
            Event::App(payload) => Some(payload),
            _ => None,
        }
    }

    /// Returns the fork announcement, if this is an [`Event::Forked`].
    pub fn as_forked(&self) -> Option<&Forked<E>> {
        match self {
            Event::Forked(forked) => Some(forked),
            _ => None,
        }
    }

    /// Returns the termination signal, if this is an [`Event::Terminated`].
    pub fn as_terminated(&self) -> Option<&Terminated> {
        match self {
            Event::Terminated(signal) => Some(signal),
            _ => None,
        }
    }

    /// True for any termination signal, regardless of its trigger.
    pub fn is_terminated(&self) -> bool {
        matches!(self, Event::Terminated(_))
    }
}

/// Coarse shape of an [`Event`], for matching without payload inspection.
///
/// Termination signals are split by trigger so waits can distinguish a
/// well-ordered join from a safety-net cleanup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Application payload.
    App,
    /// Child-scope birth announcement.
    Forked,
    /// Explicit scope termination.
    Joined,
    /// Safety-net termination: the emitter was dropped without a join.
    EmitterDropped,
    /// The dispatcher was shut down with the registration still live.
    Closed,
}

impl EventKind {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            EventKind::App => "app",
            EventKind::Forked => "forked",
            EventKind::Joined => "joined",
            EventKind::EmitterDropped => "emitter_dropped",
            EventKind::Closed => "dispatcher_closed",
        }
    }
}

/// Birth announcement of a child scope.
///
/// Sent through the **parent** at fork time, so a handler registered on the
/// parent (or any ancestor, or the root handler) learns about the child and
/// may register its own handler against it. Carries a handle to the newborn
/// child and whatever payload the forking call site attached via
/// [`fork_with`](crate::Emitter::fork_with).
#[derive(Clone, Debug)]
pub struct Forked<E: 'static> {
    child: Emitter<E>,
    payload: Option<E>,
}

impl<E: 'static> Forked<E> {
    pub(crate) fn new(child: Emitter<E>, payload: Option<E>) -> Self {
        Self { child, payload }
    }

    /// The newborn child emitter. Clone it to keep it beyond the delivery.
    pub fn child(&self) -> &Emitter<E> {
        &self.child
    }

    /// The payload attached at the forking call site, if any.
    pub fn payload(&self) -> Option<&E> {
        self.payload.as_ref()
    }
}
