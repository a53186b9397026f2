//! # Declarative suspension points for flows.
//!
//! [`Wait`] packages the recurring shape of a suspendable handler — "ignore
//! everything until X happens, unless Y happens first" — into a reusable,
//! restartable value. It owns no resources and performs no I/O; it is pure
//! sequencing state, advanced one event at a time through
//! [`feed`](Wait::feed).
//!
//! Matching is expressed with [`Cond`]: either an arbitrary predicate over
//! the event, or membership in a set of event shapes
//! ([`EventKind`](crate::EventKind)s).
//!
//! ```text
//! feed(event):
//!   filter rejects event ──► Pending      (skipped entirely, not counted)
//!   cancel_if matches    ──► Err(WaitCancelled { event })
//!   until matches        ──► Complete
//!   otherwise            ──► Pending
//! ```

use std::fmt;

use crate::events::{Event, EventKind};
use crate::handlers::{Flow, HandlerError, Step};

/// A matching condition over events.
///
/// Built from a predicate ([`Cond::pred`]) or a set of event shapes
/// ([`Cond::kinds`]); [`Cond::any`] and [`Cond::never`] are the trivial
/// poles. `EventKind` values and arrays of them convert directly.
pub enum Cond<E: 'static> {
    /// Matches every event.
    Any,
    /// Matches nothing.
    Never,
    /// Matches events the predicate accepts.
    Pred(Box<dyn FnMut(&Event<E>) -> bool + Send + 'static>),
    /// Matches events whose [`kind`](Event::kind) is in the set.
    Kinds(Vec<EventKind>),
}

impl<E: 'static> Cond<E> {
    /// Matches every event.
    pub fn any() -> Self {
        Cond::Any
    }

    /// Matches nothing.
    pub fn never() -> Self {
        Cond::Never
    }

    /// Matches events accepted by `f`.
    pub fn pred<F>(f: F) -> Self
    where
        F: FnMut(&Event<E>) -> bool + Send + 'static,
    {
        Cond::Pred(Box::new(f))
    }

    /// Matches events whose shape is one of `kinds`.
    pub fn kinds<I>(kinds: I) -> Self
    where
        I: IntoIterator<Item = EventKind>,
    {
        Cond::Kinds(kinds.into_iter().collect())
    }

    fn matches(&mut self, event: &Event<E>) -> bool {
        match self {
            Cond::Any => true,
            Cond::Never => false,
            Cond::Pred(pred) => pred(event),
            Cond::Kinds(kinds) => kinds.contains(&event.kind()),
        }
    }
}

impl<E: 'static> From<EventKind> for Cond<E> {
    fn from(kind: EventKind) -> Self {
        Cond::Kinds(vec![kind])
    }
}

impl<E: 'static, const N: usize> From<[EventKind; N]> for Cond<E> {
    fn from(kinds: [EventKind; N]) -> Self {
        Cond::Kinds(kinds.to_vec())
    }
}

impl<E: 'static> From<Vec<EventKind>> for Cond<E> {
    fn from(kinds: Vec<EventKind>) -> Self {
        Cond::Kinds(kinds)
    }
}

impl<E: 'static> fmt::Debug for Cond<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cond::Any => write!(f, "Cond::Any"),
            Cond::Never => write!(f, "Cond::Never"),
            Cond::Pred(_) => write!(f, "Cond::Pred"),
            Cond::Kinds(kinds) => write!(f, "Cond::Kinds({kinds:?})"),
        }
    }
}

/// The wait was cancelled: the `cancel_if` condition matched before the
/// `until` condition did. Carries the cancelling event.
#[derive(Debug)]
pub struct WaitCancelled<E: 'static> {
    /// The event that matched `cancel_if`.
    pub event: Event<E>,
}

impl<E: 'static> fmt::Display for WaitCancelled<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wait cancelled by {} event", self.event.kind().as_label())
    }
}

impl<E: fmt::Debug + 'static> std::error::Error for WaitCancelled<E> {}

/// # A restartable suspension point.
///
/// Feed events in as they arrive; the wait stays [`Step::Pending`] until
/// its `until` condition matches, fails early with [`WaitCancelled`] if the
/// `cancel_if` condition matches first, and skips (without counting)
/// anything its filter rejects. After completing it may be fed again — the
/// same wait restarts from scratch.
///
/// A bare `Wait` is itself a usable [`Flow`], for registrations that only
/// need to block out a region of the event stream.
///
/// # Example
/// ```
/// use scopewatch::{Cond, Event, EventKind, Step, Wait};
///
/// let mut wait = Wait::until(Cond::pred(|e: &Event<u32>| e.as_app() == Some(&7)))
///     .cancel_if([EventKind::Joined]);
///
/// assert_eq!(wait.feed(&Event::App(3)).unwrap(), Step::Pending);
/// assert_eq!(wait.feed(&Event::App(7)).unwrap(), Step::Complete);
/// ```
pub struct Wait<E: 'static> {
    until: Cond<E>,
    cancel_if: Cond<E>,
    filter: Option<Box<dyn FnMut(&Event<E>) -> bool + Send + 'static>>,
}

impl<E: 'static> Wait<E> {
    /// Waits until `cond` matches.
    pub fn until(cond: impl Into<Cond<E>>) -> Self {
        Self {
            until: cond.into(),
            cancel_if: Cond::Never,
            filter: None,
        }
    }

    /// Waits for the very next event that passes the filter.
    pub fn any() -> Self {
        Self::until(Cond::Any)
    }

    /// Fails the wait early if `cond` matches before `until` does.
    pub fn cancel_if(mut self, cond: impl Into<Cond<E>>) -> Self {
        self.cancel_if = cond.into();
        self
    }

    /// Observes every event through `f` first; events it rejects are
    /// skipped entirely — they match neither `until` nor `cancel_if`.
    pub fn filter<F>(mut self, f: F) -> Self
    where
        F: FnMut(&Event<E>) -> bool + Send + 'static,
    {
        self.filter = Some(Box::new(f));
        self
    }

    /// Advances the wait with one event.
    pub fn feed(&mut self, event: &Event<E>) -> Result<Step, WaitCancelled<E>>
    where
        E: Clone,
    {
        if let Some(filter) = &mut self.filter {
            if !filter(event) {
                return Ok(Step::Pending);
            }
        }
        if self.cancel_if.matches(event) {
            return Err(WaitCancelled {
                event: event.clone(),
            });
        }
        if self.until.matches(event) {
            return Ok(Step::Complete);
        }
        Ok(Step::Pending)
    }
}

impl<E: 'static> fmt::Debug for Wait<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wait")
            .field("until", &self.until)
            .field("cancel_if", &self.cancel_if)
            .field("filtered", &self.filter.is_some())
            .finish()
    }
}

impl<E> Flow<E> for Wait<E>
where
    E: Clone + fmt::Debug + Send + Sync + 'static,
{
    fn resume(&mut self, event: &Event<E>) -> Result<Step, HandlerError> {
        Ok(self.feed(event)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Terminated;

    fn app_is(expected: u32) -> Cond<u32> {
        Cond::pred(move |e: &Event<u32>| e.as_app() == Some(&expected))
    }

    #[test]
    fn test_completes_on_until_match() {
        let mut wait = Wait::until(app_is(7));
        assert_eq!(wait.feed(&Event::App(1)).unwrap(), Step::Pending);
        assert_eq!(wait.feed(&Event::App(7)).unwrap(), Step::Complete);
    }

    #[test]
    fn test_cancel_wins_over_non_matching_events() {
        // Fed [Z, Y] with until = X, cancel_if = Y: must cancel on Y,
        // never completing on Z.
        let mut wait = Wait::until(app_is(10)).cancel_if(app_is(20));

        assert_eq!(wait.feed(&Event::App(30)).unwrap(), Step::Pending);
        let cancelled = wait.feed(&Event::App(20)).unwrap_err();
        assert_eq!(cancelled.event.as_app(), Some(&20));
    }

    #[test]
    fn test_cancel_checked_before_until() {
        // When both conditions match the same event, cancellation wins.
        let mut wait = Wait::until(Cond::any()).cancel_if(app_is(5));
        assert!(wait.feed(&Event::App(5)).is_err());
    }

    #[test]
    fn test_filtered_events_are_skipped_entirely() {
        let mut wait = Wait::<u32>::any().filter(|e| e.as_app() != Some(&0));
        assert_eq!(
            wait.feed(&Event::App(0)).unwrap(),
            Step::Pending,
            "rejected event must not count against `until`"
        );
        assert_eq!(wait.feed(&Event::App(1)).unwrap(), Step::Complete);
    }

    #[test]
    fn test_filter_shields_cancel_condition_too() {
        let mut wait = Wait::until(app_is(1))
            .cancel_if(app_is(2))
            .filter(|e| e.as_app() != Some(&2));
        assert_eq!(wait.feed(&Event::App(2)).unwrap(), Step::Pending);
        assert_eq!(wait.feed(&Event::App(1)).unwrap(), Step::Complete);
    }

    #[test]
    fn test_kind_set_matching() {
        let mut wait = Wait::<u32>::until([EventKind::Joined]);
        assert_eq!(wait.feed(&Event::App(1)).unwrap(), Step::Pending);
        assert_eq!(
            wait.feed(&Event::Terminated(Terminated::joined())).unwrap(),
            Step::Complete
        );
    }

    #[test]
    fn test_wait_is_restartable() {
        let mut wait = Wait::until(app_is(1));
        assert_eq!(wait.feed(&Event::App(1)).unwrap(), Step::Complete);
        assert_eq!(wait.feed(&Event::App(2)).unwrap(), Step::Pending);
        assert_eq!(wait.feed(&Event::App(1)).unwrap(), Step::Complete);
    }

    #[test]
    fn test_never_condition_never_matches() {
        let mut wait = Wait::<u32>::until(Cond::never());
        for n in 0..16 {
            assert_eq!(wait.feed(&Event::App(n)).unwrap(), Step::Pending);
        }
    }
}
