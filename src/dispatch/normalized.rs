//! Normalization of user-supplied handlers behind one internal contract.
//!
//! The dispatcher talks to every registration through three operations:
//! `offer` (deliver one event), `terminate` (deliver a termination signal,
//! always leaving the handler done) and `done` (queryable completion).
//! This module maps the three public handler forms onto that contract and
//! implements the combination semantics for groups.

use crate::error::DispatchError;
use crate::events::{Event, Terminated};
use crate::handlers::{Flow, Handler, HandlerKind, ReactFn, Reaction, Step};
use crate::logging::Logger;

/// A handler in the runtime's internal form.
pub(crate) enum Normalized<E: 'static> {
    Func { f: ReactFn<E>, done: bool },
    Flow { flow: Box<dyn Flow<E>>, done: bool },
    Group { members: Vec<Normalized<E>> },
}

/// Converts a handler specification into its runtime form.
///
/// Returns `Ok(None)` when there is nothing to install: a flow that failed
/// its bootstrap (logged as an error), a flow that completed during
/// bootstrap, or a group whose members all fell away. An empty group is a
/// caller error and is returned as such.
pub(crate) fn normalize<E: 'static>(
    handler: Handler<E>,
    logger: &dyn Logger,
) -> Result<Option<Normalized<E>>, DispatchError> {
    match handler.kind {
        HandlerKind::React(f) => Ok(Some(Normalized::Func { f, done: false })),
        HandlerKind::Flow(mut flow) => match flow.start() {
            Ok(Step::Pending) => Ok(Some(Normalized::Flow { flow, done: false })),
            Ok(Step::Complete) => {
                logger.debug("flow handler completed during bootstrap; nothing to install");
                Ok(None)
            }
            Err(error) => {
                logger.error(&format!("flow handler failed during bootstrap: {error}"));
                Ok(None)
            }
        },
        HandlerKind::Group(members) => {
            if members.is_empty() {
                return Err(DispatchError::EmptyGroup);
            }
            let mut normalized = Vec::with_capacity(members.len());
            for member in members {
                if let Some(member) = normalize(member, logger)? {
                    normalized.push(member);
                }
            }
            if normalized.is_empty() {
                logger.error("every member of a handler group fell away during bootstrap; nothing to install");
                return Ok(None);
            }
            Ok(Some(Normalized::Group {
                members: normalized,
            }))
        }
    }
}

impl<E: 'static> Normalized<E> {
    /// True once the handler will never accept another event.
    pub(crate) fn done(&self) -> bool {
        match self {
            Normalized::Func { done, .. } => *done,
            Normalized::Flow { done, .. } => *done,
            Normalized::Group { members } => members.iter().all(Normalized::done),
        }
    }

    /// Delivers one event.
    ///
    /// Reactive errors are contained here (the handler stays live); a flow
    /// error is a failed completion and ends the handler. Groups offer the
    /// event to every still-live member, isolating member outcomes.
    pub(crate) fn offer(&mut self, event: &Event<E>, logger: &dyn Logger) {
        match self {
            Normalized::Func { f, done } => {
                if *done {
                    return;
                }
                match f(event) {
                    Ok(Reaction::Continue) => {}
                    Ok(Reaction::Done) => *done = true,
                    Err(error) => {
                        logger.debug(&format!("reactive handler error contained: {error}"));
                    }
                }
            }
            Normalized::Flow { flow, done } => {
                if *done {
                    return;
                }
                match flow.resume(event) {
                    Ok(Step::Pending) => {}
                    Ok(Step::Complete) => *done = true,
                    Err(error) => {
                        *done = true;
                        logger.debug(&format!("flow handler failed: {error}"));
                    }
                }
            }
            Normalized::Group { members } => {
                for member in members {
                    member.offer(event, logger);
                }
            }
        }
    }

    /// Delivers a termination signal. The handler is done afterwards, no
    /// matter how it responded.
    pub(crate) fn terminate(&mut self, signal: &Terminated, logger: &dyn Logger) {
        match self {
            Normalized::Func { done, .. } => {
                // Reactive handlers observe signals as events via `offer`;
                // the dedicated termination path only retires them.
                *done = true;
            }
            Normalized::Flow { flow, done } => {
                if *done {
                    return;
                }
                match flow.terminate(signal) {
                    Ok(Step::Complete) => {}
                    Ok(Step::Pending) => {
                        logger.warn(&format!(
                            "flow handler ignored a {} signal; terminating it anyway",
                            signal.as_label()
                        ));
                    }
                    Err(error) => {
                        logger.debug(&format!(
                            "flow handler failed while terminating: {error}"
                        ));
                    }
                }
                *done = true;
            }
            Normalized::Group { members } => {
                for member in members {
                    member.terminate(signal, logger);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::handlers::HandlerError;
    use crate::logging::NopLogger;

    type Sink = Arc<Mutex<Vec<u32>>>;

    fn recorder(sink: &Sink) -> Handler<u32> {
        let sink = Arc::clone(sink);
        Handler::observe(move |event: &Event<u32>| {
            if let Some(n) = event.as_app() {
                sink.lock().unwrap().push(*n);
            }
        })
    }

    fn always_failing() -> Handler<u32> {
        Handler::react(|_: &Event<u32>| -> Result<Reaction, HandlerError> {
            Err("intentional".into())
        })
    }

    fn must_normalize(handler: Handler<u32>) -> Normalized<u32> {
        normalize(handler, &NopLogger)
            .expect("precondition ok")
            .expect("handler installed")
    }

    #[test]
    fn test_group_isolates_failing_member() {
        let sink: Sink = Arc::new(Mutex::new(Vec::new()));
        let mut group = must_normalize(Handler::group([always_failing(), recorder(&sink)]));

        for n in 0..5 {
            group.offer(&Event::App(n), &NopLogger);
        }
        assert_eq!(
            sink.lock().unwrap().as_slice(),
            [0, 1, 2, 3, 4],
            "healthy member must observe every event despite its failing peer"
        );
        assert!(!group.done());
    }

    #[test]
    fn test_group_done_only_when_all_members_done() {
        let sink: Sink = Arc::new(Mutex::new(Vec::new()));
        let one_shot = Handler::react(|_: &Event<u32>| Ok(Reaction::Done));
        let mut group = must_normalize(Handler::group([one_shot, recorder(&sink)]));

        group.offer(&Event::App(1), &NopLogger);
        assert!(!group.done(), "live member keeps the group live");

        group.terminate(&Terminated::joined(), &NopLogger);
        assert!(group.done());
    }

    #[test]
    fn test_group_offers_event_to_later_members_even_when_earlier_completes() {
        let sink: Sink = Arc::new(Mutex::new(Vec::new()));
        let one_shot = Handler::react(|_: &Event<u32>| Ok(Reaction::Done));
        let mut group = must_normalize(Handler::group([one_shot, recorder(&sink)]));

        group.offer(&Event::App(9), &NopLogger);
        assert_eq!(
            sink.lock().unwrap().as_slice(),
            [9],
            "the event that completed an earlier member still reaches later members"
        );
    }

    #[test]
    fn test_reactive_error_keeps_handler_live() {
        let mut handler = must_normalize(always_failing());
        handler.offer(&Event::App(1), &NopLogger);
        handler.offer(&Event::App(2), &NopLogger);
        assert!(!handler.done());
    }

    #[test]
    fn test_reactive_done_is_terminal() {
        let mut handler = must_normalize(Handler::react(|_: &Event<u32>| Ok(Reaction::Done)));
        handler.offer(&Event::App(1), &NopLogger);
        assert!(handler.done());
    }

    #[test]
    fn test_terminate_always_finishes() {
        let sink: Sink = Arc::new(Mutex::new(Vec::new()));
        let mut handler = must_normalize(recorder(&sink));
        handler.terminate(&Terminated::Closed, &NopLogger);
        assert!(handler.done());
    }

    #[test]
    fn test_empty_group_is_a_caller_error() {
        let result = normalize(Handler::<u32>::group(Vec::new()), &NopLogger);
        assert!(matches!(result, Err(DispatchError::EmptyGroup)));
    }

    #[test]
    fn test_nested_empty_group_is_a_caller_error() {
        let nested = Handler::<u32>::group([Handler::group(Vec::new())]);
        assert!(matches!(
            normalize(nested, &NopLogger),
            Err(DispatchError::EmptyGroup)
        ));
    }
}
