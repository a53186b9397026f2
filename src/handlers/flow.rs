//! # Suspendable multi-step handlers.
//!
//! A [`Flow`] is a state machine driven one event at a time: it is resumed
//! with each delivered event at the point it last suspended, and it decides
//! after each resume whether to keep waiting ([`Step::Pending`]) or finish
//! ([`Step::Complete`]). Termination signals addressed to the flow's own
//! scope arrive through the dedicated [`Flow::terminate`] entry point
//! rather than through [`resume`](Flow::resume).
//!
//! [`Wait`](crate::Wait) provides the declarative suspension points most
//! flows are written with.

use crate::events::{Event, Terminated};
use crate::handlers::HandlerError;

/// Whether a flow (or a wait) keeps suspending or has finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Still waiting; resume again with the next event.
    Pending,
    /// Finished; the registration ends.
    Complete,
}

/// # A suspendable handler driven by the dispatcher.
///
/// Lifecycle, as the dispatcher sees it:
///
/// 1. [`start`](Flow::start) once, at registration. An `Err` here means the
///    flow never got to its first suspension — the registration is not
///    installed at all. `Ok(Step::Complete)` means the flow had nothing to
///    wait for; nothing is installed either.
/// 2. [`resume`](Flow::resume) once per delivered event. `Err` is a failed
///    completion: logged, registration removed.
/// 3. [`terminate`](Flow::terminate) at most once, when the flow's own
///    scope ends (join, drop, or dispatcher shutdown) and the flow did not
///    already complete while observing that signal via `resume`. After this
///    call the registration is gone regardless of the return value;
///    returning `Ok(Step::Pending)` (refusing to die) is logged as a
///    warning.
///
/// # Example
/// ```
/// use scopewatch::{Event, Flow, HandlerError, Step};
///
/// /// Completes after seeing `target` application events.
/// struct CountDown {
///     remaining: u32,
/// }
///
/// impl Flow<u32> for CountDown {
///     fn resume(&mut self, event: &Event<u32>) -> Result<Step, HandlerError> {
///         if event.as_app().is_some() {
///             self.remaining = self.remaining.saturating_sub(1);
///         }
///         Ok(if self.remaining == 0 {
///             Step::Complete
///         } else {
///             Step::Pending
///         })
///     }
/// }
///
/// let mut flow = CountDown { remaining: 2 };
/// assert_eq!(flow.resume(&Event::App(1)).unwrap(), Step::Pending);
/// assert_eq!(flow.resume(&Event::App(2)).unwrap(), Step::Complete);
/// ```
pub trait Flow<E: 'static>: Send {
    /// Runs the flow up to its first suspension.
    ///
    /// Called exactly once, at registration time, before any event is
    /// delivered. The default does nothing and suspends.
    fn start(&mut self) -> Result<Step, HandlerError> {
        Ok(Step::Pending)
    }

    /// Resumes the flow with the next event delivered to its scope.
    fn resume(&mut self, event: &Event<E>) -> Result<Step, HandlerError>;

    /// Delivers a termination signal.
    ///
    /// The default acknowledges by completing, which is correct for flows
    /// with no cleanup of their own.
    fn terminate(&mut self, signal: &Terminated) -> Result<Step, HandlerError> {
        let _ = signal;
        Ok(Step::Complete)
    }
}
