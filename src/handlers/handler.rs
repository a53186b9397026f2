//! # Handler specification.
//!
//! [`Handler`] is what callers hand to the dispatcher; normalization into
//! the runtime's internal contract happens at registration time. The three
//! forms (react / flow / group) cover one-shot reactive observers,
//! suspendable multi-step observers, and ordered combinations of either.

use crate::events::Event;
use crate::handlers::Flow;

/// Error type handlers report their own failures with.
///
/// Handler errors never reach the sender of an event: the dispatcher
/// contains them (logging at debug level) and decides only whether the
/// handler stays registered.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// What a reactive handler wants to happen to its registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reaction {
    /// Keep the registration; deliver future events here.
    Continue,
    /// The handler is done; remove the registration.
    Done,
}

/// A reaction to attach to one scope's events.
///
/// Constructed with [`Handler::react`], [`Handler::observe`],
/// [`Handler::flow`] or [`Handler::group`], then passed to
/// [`Dispatcher::register`](crate::Dispatcher::register) or installed as
/// the root handler.
pub struct Handler<E: 'static> {
    pub(crate) kind: HandlerKind<E>,
}

pub(crate) enum HandlerKind<E: 'static> {
    React(ReactFn<E>),
    Flow(Box<dyn Flow<E>>),
    Group(Vec<Handler<E>>),
}

pub(crate) type ReactFn<E> =
    Box<dyn FnMut(&Event<E>) -> Result<Reaction, HandlerError> + Send + 'static>;

impl<E: 'static> Handler<E> {
    /// A reactive handler: called once per event, retried on the next event
    /// no matter what it returned.
    ///
    /// Return [`Reaction::Done`] to end the registration explicitly; an
    /// `Err` is contained and logged, and the handler stays registered.
    ///
    /// # Example
    /// ```
    /// use scopewatch::{Event, Handler, Reaction};
    ///
    /// let handler = Handler::react(|event: &Event<u32>| {
    ///     Ok(match event.as_app() {
    ///         Some(99) => Reaction::Done,
    ///         _ => Reaction::Continue,
    ///     })
    /// });
    /// # let _ = handler;
    /// ```
    pub fn react<F>(f: F) -> Self
    where
        F: FnMut(&Event<E>) -> Result<Reaction, HandlerError> + Send + 'static,
    {
        Self {
            kind: HandlerKind::React(Box::new(f)),
        }
    }

    /// An infallible reactive handler that never ends on its own — the
    /// common shape for loggers and collectors.
    pub fn observe<F>(mut f: F) -> Self
    where
        F: FnMut(&Event<E>) + Send + 'static,
    {
        Self::react(move |event| {
            f(event);
            Ok(Reaction::Continue)
        })
    }

    /// A suspendable multi-step handler. See [`Flow`].
    pub fn flow<F>(flow: F) -> Self
    where
        F: Flow<E> + 'static,
    {
        Self {
            kind: HandlerKind::Flow(Box::new(flow)),
        }
    }

    /// An ordered combination of handlers acting as one.
    ///
    /// Every event is offered to every still-live member in order,
    /// regardless of whether an earlier member completes on it; failures in
    /// one member are isolated from the others. The group is done once all
    /// members are done. A termination signal is offered to every member
    /// (the order among members is unspecified).
    ///
    /// An empty group is a registration error.
    pub fn group<I>(members: I) -> Self
    where
        I: IntoIterator<Item = Handler<E>>,
    {
        Self {
            kind: HandlerKind::Group(members.into_iter().collect()),
        }
    }
}

impl<E: 'static> std::fmt::Debug for Handler<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            HandlerKind::React(_) => write!(f, "Handler::React"),
            HandlerKind::Flow(_) => write!(f, "Handler::Flow"),
            HandlerKind::Group(members) => write!(f, "Handler::Group({})", members.len()),
        }
    }
}
