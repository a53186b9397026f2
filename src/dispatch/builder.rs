//! Builder for constructing a [`Dispatcher`] with optional collaborators.

use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use crate::dispatch::dispatcher::Core;
use crate::dispatch::normalized::normalize;
use crate::dispatch::Dispatcher;
use crate::handlers::Handler;
use crate::logging::{Logger, NopLogger};

/// Builder for a [`Dispatcher`].
///
/// At least one root handler is required; several may be supplied and act
/// as an ordered group. The logger defaults to the no-op collaborator.
///
/// # Example
/// ```
/// use scopewatch::{Dispatcher, Event, Handler, LogBridge};
///
/// let dispatcher = Dispatcher::<u32>::builder()
///     .logger(LogBridge)
///     .root(Handler::observe(|_: &Event<u32>| {}))
///     .build();
/// # let _ = dispatcher;
/// ```
pub struct DispatcherBuilder<E: 'static> {
    roots: Vec<Handler<E>>,
    logger: Arc<dyn Logger>,
}

impl<E: 'static> DispatcherBuilder<E> {
    pub(crate) fn new() -> Self {
        Self {
            roots: Vec::new(),
            logger: Arc::new(NopLogger),
        }
    }

    /// Adds a root handler. May be called repeatedly; multiple root
    /// handlers are combined into one ordered group.
    pub fn root(mut self, handler: Handler<E>) -> Self {
        self.roots.push(handler);
        self
    }

    /// Injects the logging collaborator used for everything the runtime
    /// contains on behalf of handlers.
    pub fn logger(mut self, logger: impl Logger) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    /// Builds the dispatcher.
    ///
    /// # Panics
    /// Panics if no root handler was supplied, or if a root handler group
    /// is empty — both are fatal construction errors.
    pub fn build(self) -> Dispatcher<E> {
        assert!(
            !self.roots.is_empty(),
            "dispatcher requires at least one root handler"
        );
        let mut roots = self.roots;
        let root = if roots.len() == 1 {
            roots.remove(0)
        } else {
            Handler::group(roots)
        };
        let root = match normalize(root, &*self.logger) {
            Ok(slot) => slot, // a failed bootstrap is already logged; the slot stays empty
            Err(error) => panic!("invalid root handler: {error}"),
        };

        Dispatcher::from_core(Arc::new(Core {
            table: Mutex::new(HashMap::new()),
            root: Mutex::new(root),
            closed: AtomicBool::new(false),
            logger: self.logger,
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::events::Event;

    #[test]
    fn test_multiple_root_handlers_act_as_a_group() {
        let first = Arc::new(Mutex::new(0u32));
        let second = Arc::new(Mutex::new(0u32));
        let (a, b) = (Arc::clone(&first), Arc::clone(&second));

        let dispatcher = Dispatcher::<u32>::builder()
            .root(Handler::observe(move |event: &Event<u32>| {
                if event.as_app().is_some() {
                    *a.lock().unwrap() += 1;
                }
            }))
            .root(Handler::observe(move |event: &Event<u32>| {
                if event.as_app().is_some() {
                    *b.lock().unwrap() += 1;
                }
            }))
            .build();

        let root = dispatcher.emitter();
        root.send(1u32);
        root.send(2u32);

        assert_eq!(*first.lock().unwrap(), 2);
        assert_eq!(*second.lock().unwrap(), 2);
    }

    #[test]
    #[should_panic(expected = "at least one root handler")]
    fn test_build_without_root_handler_panics() {
        let _ = Dispatcher::<u32>::builder().build();
    }
}
