//! # Scoped use of a forked emitter.
//!
//! [`Scope`] is the well-ordered way to end a child scope: it guarantees
//! that exactly one `Joined` signal is sent through the child — on normal
//! exit, on early return, on an error path, even when unwound by a panic —
//! and that the signal carries the causing error when there is one.
//!
//! ## Exit paths
//! ```text
//! scope.join()                     Joined, no cause
//! scope.fail(error)                Joined, cause = error
//! scope.run(f)       f → Ok(..)    Joined, no cause          (result passed through)
//!                    f → Err(e)    Joined, cause = e         (error passed through)
//! scope.run_async(f)               same, once the future resolves
//! drop(scope)                      Joined, no cause (panic in flight is noted as the cause)
//! scope.detach()                   no Joined; the child falls back to the drop safety net
//! ```
//!
//! The guard dereferences to the child [`Emitter`], so events are sent
//! through the scope directly. Because the `Joined` is deferred until the
//! guard goes away, a `Scope` can be held across `.await` points to drape
//! observation around an asynchronous operation.

use std::fmt;
use std::future::Future;
use std::ops::Deref;

use crate::emitters::Emitter;
use crate::events::{Event, Terminated};

/// RAII guard over a forked child emitter.
///
/// Created by [`Emitter::scope`] / [`Emitter::scope_with`]. See the module
/// docs for the exit-path guarantees.
///
/// # Example
/// ```
/// use scopewatch::{Dispatcher, Event, Handler};
///
/// let dispatcher = Dispatcher::new(Handler::observe(|_: &Event<String>| {}));
/// let root = dispatcher.emitter();
///
/// let outcome: Result<u32, String> = root.scope().run(|scope| {
///     scope.send("step one");
///     Ok(42)
/// });
/// assert_eq!(outcome, Ok(42));
/// ```
pub struct Scope<E: 'static> {
    child: Emitter<E>,
    armed: bool,
}

impl<E: 'static> Scope<E> {
    pub(crate) fn new(child: Emitter<E>) -> Self {
        Self { child, armed: true }
    }

    /// The child emitter this guard closes over.
    pub fn emitter(&self) -> &Emitter<E> {
        &self.child
    }

    /// Ends the scope cleanly: sends one `Joined` with no cause.
    pub fn join(mut self) {
        self.finish(None);
    }

    /// Ends the scope with a causing error: sends one `Joined` carrying the
    /// rendered error.
    pub fn fail(mut self, error: impl fmt::Display) {
        self.finish(Some(error.to_string()));
    }

    /// Disarms the guard and hands back the bare child emitter.
    ///
    /// No `Joined` will be sent for this scope; the child behaves as if it
    /// had been created with a plain [`fork`](Emitter::fork), falling back
    /// to the drop safety net.
    pub fn detach(mut self) -> Emitter<E> {
        self.armed = false;
        self.child.clone()
    }

    /// Runs `f` against the child and ends the scope according to its
    /// outcome: `Ok` sends a clean `Joined`, `Err` sends a `Joined` whose
    /// cause is the rendered error. The result is handed back unchanged.
    pub fn run<R, Er, F>(mut self, f: F) -> Result<R, Er>
    where
        F: FnOnce(&Emitter<E>) -> Result<R, Er>,
        Er: fmt::Display,
    {
        match f(&self.child) {
            Ok(value) => {
                self.finish(None);
                Ok(value)
            }
            Err(error) => {
                self.finish(Some(error.to_string()));
                Err(error)
            }
        }
    }

    /// Asynchronous form of [`run`](Scope::run): builds the future from a
    /// clone of the child emitter, awaits it, and defers the `Joined` until
    /// the future has resolved.
    pub async fn run_async<R, Er, F, Fut>(mut self, f: F) -> Result<R, Er>
    where
        F: FnOnce(Emitter<E>) -> Fut,
        Fut: Future<Output = Result<R, Er>>,
        Er: fmt::Display,
    {
        match f(self.child.clone()).await {
            Ok(value) => {
                self.finish(None);
                Ok(value)
            }
            Err(error) => {
                self.finish(Some(error.to_string()));
                Err(error)
            }
        }
    }

    fn finish(&mut self, cause: Option<String>) {
        if !self.armed {
            return;
        }
        self.armed = false;
        let signal = match cause {
            Some(cause) => Terminated::joined_with(cause),
            None => Terminated::joined(),
        };
        self.child.dispatch(Event::Terminated(signal));
    }
}

impl<E: 'static> Drop for Scope<E> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if std::thread::panicking() {
            self.finish(Some("scope dropped during panic".to_string()));
        } else {
            self.finish(None);
        }
    }
}

impl<E: 'static> Deref for Scope<E> {
    type Target = Emitter<E>;

    fn deref(&self) -> &Emitter<E> {
        &self.child
    }
}

impl<E: 'static> fmt::Debug for Scope<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("emitter", &self.child)
            .field("armed", &self.armed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::panic::AssertUnwindSafe;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::dispatch::Dispatcher;
    use crate::handlers::Handler;

    type Sink = Arc<Mutex<Vec<String>>>;

    /// Dispatcher whose root handler records every `Joined` it observes as
    /// `"joined"` or `"joined: <cause>"`.
    fn joined_recorder() -> (Dispatcher<String>, Sink) {
        let sink: Sink = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&sink);
        let dispatcher = Dispatcher::new(Handler::observe(move |event: &Event<String>| {
            if let Some(signal) = event.as_terminated() {
                log.lock().unwrap().push(signal.to_string());
            }
        }));
        (dispatcher, sink)
    }

    #[test]
    fn test_normal_exit_sends_one_clean_joined() {
        let (dispatcher, sink) = joined_recorder();
        let root = dispatcher.emitter();

        let out: Result<u32, String> = root.scope().run(|_| Ok(5));
        assert_eq!(out, Ok(5));
        assert_eq!(sink.lock().unwrap().as_slice(), ["joined".to_string()]);
    }

    #[test]
    fn test_error_exit_sends_one_joined_with_cause() {
        let (dispatcher, sink) = joined_recorder();
        let root = dispatcher.emitter();

        let out: Result<u32, String> = root.scope().run(|_| Err("boom".to_string()));
        assert_eq!(out, Err("boom".to_string()));
        assert_eq!(
            sink.lock().unwrap().as_slice(),
            ["joined: boom".to_string()]
        );
    }

    #[test]
    fn test_drop_without_join_sends_one_clean_joined() {
        let (dispatcher, sink) = joined_recorder();
        let root = dispatcher.emitter();

        {
            let scope = root.scope();
            scope.send("work".to_string());
        }
        assert_eq!(sink.lock().unwrap().as_slice(), ["joined".to_string()]);
    }

    #[test]
    fn test_explicit_fail_carries_cause() {
        let (dispatcher, sink) = joined_recorder();
        let root = dispatcher.emitter();

        root.scope().fail("io error");
        assert_eq!(
            sink.lock().unwrap().as_slice(),
            ["joined: io error".to_string()]
        );
    }

    #[test]
    fn test_panic_inside_scope_still_joins_exactly_once() {
        let (dispatcher, sink) = joined_recorder();
        let root = dispatcher.emitter();

        let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
            let _scope = root.scope();
            panic!("unwound");
        }));
        assert!(result.is_err());
        assert_eq!(
            sink.lock().unwrap().as_slice(),
            ["joined: scope dropped during panic".to_string()]
        );
    }

    #[test]
    fn test_detach_suppresses_joined() {
        let (dispatcher, sink) = joined_recorder();
        let root = dispatcher.emitter();

        let child = root.scope().detach();
        drop(child);
        let joined: Vec<String> = sink
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.starts_with("joined"))
            .cloned()
            .collect();
        assert!(joined.is_empty(), "detached scope must not send Joined");
    }

    #[tokio::test]
    async fn test_async_scope_defers_joined_until_completion() {
        let (dispatcher, sink) = joined_recorder();
        let root = dispatcher.emitter();

        let out: Result<u32, String> = root
            .scope()
            .run_async(|scope| async move {
                scope.send("async step".to_string());
                tokio::time::sleep(std::time::Duration::from_millis(1)).await;
                Ok(7)
            })
            .await;
        assert_eq!(out, Ok(7));
        assert_eq!(sink.lock().unwrap().as_slice(), ["joined".to_string()]);
    }

    #[tokio::test]
    async fn test_async_scope_error_carries_cause() {
        let (dispatcher, sink) = joined_recorder();
        let root = dispatcher.emitter();

        let out: Result<(), String> = root
            .scope()
            .run_async(|_| async move { Err("timed out".to_string()) })
            .await;
        assert!(out.is_err());
        assert_eq!(
            sink.lock().unwrap().as_slice(),
            ["joined: timed out".to_string()]
        );
    }
}
