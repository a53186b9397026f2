//! # Handlers: reactions attached to one scope's events.
//!
//! A handler is supplied to [`register`](crate::Dispatcher::register) (or as
//! the dispatcher's root handler) in one of three forms, unified behind
//! [`Handler`]:
//!
//! ```text
//! Handler::react(f)     stateless-ish closure, retried on every event
//! Handler::observe(f)   infallible convenience form of react
//! Handler::flow(s)      suspendable multi-step state machine (Flow)
//! Handler::group([...]) ordered combination of any of the above
//! ```
//!
//! ## Contract summary
//! - A **react** closure may return [`Reaction::Done`] to end its own
//!   registration; any error it returns is contained and logged, and the
//!   closure keeps receiving events.
//! - A **flow** suspends between events by returning [`Step::Pending`] and
//!   completes with [`Step::Complete`]; an error is a failed completion and
//!   ends the registration. Termination signals arrive through the
//!   dedicated [`Flow::terminate`] entry point.
//! - A **group** offers every event to every still-live member in order,
//!   isolating member failures from each other, and is done only when all
//!   members are done.
//!
//! [`Wait`] is the building block for writing flows declaratively: a
//! restartable suspension point with `until` / `cancel_if` conditions and
//! an optional pre-filter.

mod flow;
mod handler;
mod wait;

pub use flow::{Flow, Step};
pub use handler::{Handler, HandlerError, Reaction};
pub use wait::{Cond, Wait, WaitCancelled};

pub(crate) use handler::{HandlerKind, ReactFn};
