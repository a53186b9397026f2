//! # Dispatcher: routing, registration lifecycle, and shutdown.
//!
//! The [`Dispatcher`] owns the table mapping emitter identities to live
//! handler registrations, plus one distinguished root handler that receives
//! everything no registration claims.
//!
//! ## Routing
//! ```text
//! emitter.send(event)
//!     │  walk the sender's lineage, innermost → outermost
//!     ▼
//!  [sender] registered? ──► deliver, done
//!  [parent] registered? ──► deliver, done
//!  [  ... ] registered? ──► deliver, done
//!  no registration      ──► root handler
//! ```
//! Exactly one handler observes each event; a handler registered closer to
//! the event's origin always gets first refusal.
//!
//! ## Registration lifecycle
//! A registration ends exactly once, through whichever comes first:
//! - its handler reports completion while processing an event;
//! - its own scope terminates (`Joined` routed from its own emitter — the
//!   handler gets one chance to react, then is terminated forcibly if it
//!   did not finish);
//! - the last handle to its emitter drops (`EmitterDropped` safety net);
//! - the dispatcher closes (`Closed` to every survivor, then to the root
//!   handler).
//!
//! ## Locking
//! The table lock is held only to look up, insert or remove entries — never
//! across a handler invocation. Each registration's handler sits behind its
//! own lock for the duration of one delivery, which is what makes the
//! finalization path equivalent to an ordinary send. A delivery that would
//! re-enter a handler already mid-delivery is dropped and logged.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError, Weak};

use crate::dispatch::normalized::{normalize, Normalized};
use crate::emitters::{Emitter, EmitterId};
use crate::error::DispatchError;
use crate::events::{Event, Terminated};
use crate::handlers::Handler;
use crate::logging::Logger;

/// Shared state behind a [`Dispatcher`] and everything it hands out.
///
/// Emitters and [`DispatchHandle`]s hold this weakly: once the owning
/// `Dispatcher` is gone, the tree is inert.
pub(crate) struct Core<E: 'static> {
    pub(crate) table: Mutex<HashMap<EmitterId, Arc<Mutex<Normalized<E>>>>>,
    pub(crate) root: Mutex<Option<Normalized<E>>>,
    pub(crate) closed: AtomicBool,
    pub(crate) logger: Arc<dyn Logger>,
}

fn lock_recovered<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn try_lock_recovered<T>(mutex: &Mutex<T>) -> Option<MutexGuard<'_, T>> {
    match mutex.try_lock() {
        Ok(guard) => Some(guard),
        Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
        Err(TryLockError::WouldBlock) => None,
    }
}

impl<E: 'static> Core<E> {
    /// Delivers `event` to the nearest registration on the sender's
    /// lineage, falling back to the root handler.
    pub(crate) fn route(&self, lineage: &[EmitterId], event: Event<E>) {
        let Some(&sender) = lineage.first() else {
            return;
        };
        let hit = {
            let table = lock_recovered(&self.table);
            lineage
                .iter()
                .find_map(|id| table.get(id).map(|slot| (*id, Arc::clone(slot))))
        };
        match hit {
            Some((key, slot)) => self.deliver(key, &slot, sender, &event),
            None => self.offer_root(&event),
        }
    }

    fn deliver(
        &self,
        key: EmitterId,
        slot: &Mutex<Normalized<E>>,
        sender: EmitterId,
        event: &Event<E>,
    ) {
        let Some(mut handler) = try_lock_recovered(slot) else {
            self.logger.debug(&format!(
                "re-entrant delivery to the handler for emitter {key} dropped"
            ));
            return;
        };

        handler.offer(event, &*self.logger);

        // A termination signal from the registration's own emitter must
        // leave the handler done; a handler that reacted without finishing
        // is terminated on its behalf.
        if let Event::Terminated(signal) = event {
            if sender == key && !handler.done() {
                handler.terminate(signal, &*self.logger);
            }
        }

        let finished = handler.done();
        drop(handler);
        if finished {
            self.remove(key);
        }
    }

    fn offer_root(&self, event: &Event<E>) {
        let Some(mut slot) = try_lock_recovered(&self.root) else {
            self.logger.debug("re-entrant delivery to the root handler dropped");
            return;
        };
        match slot.as_mut() {
            Some(root) if !root.done() => root.offer(event, &*self.logger),
            _ => self.logger.debug(&format!(
                "no live root handler; {} event dropped",
                event.kind().as_label()
            )),
        }
    }

    pub(crate) fn register(
        &self,
        child: &Emitter<E>,
        handler: Handler<E>,
    ) -> Result<(), DispatchError> {
        let Some(node) = child.node() else {
            // Void emitter: observation is disabled by construction.
            return Ok(());
        };
        if self.closed.load(Ordering::Acquire) {
            return Err(DispatchError::Closed);
        }
        if !std::ptr::eq(node.core.as_ptr(), self) {
            return Err(DispatchError::ForeignEmitter { id: node.id });
        }

        let id = node.id;
        if lock_recovered(&self.table).contains_key(&id) {
            return Err(DispatchError::AlreadyRegistered { id });
        }

        // Bootstrap runs without the table lock: it is user code.
        let Some(normalized) = normalize(handler, &*self.logger)? else {
            return Ok(());
        };

        let mut table = lock_recovered(&self.table);
        match table.entry(id) {
            Entry::Occupied(_) => Err(DispatchError::AlreadyRegistered { id }),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(Mutex::new(normalized)));
                Ok(())
            }
        }
    }

    /// Safety net for emitters dropped with a live registration. Runs from
    /// the emitter node's `Drop`.
    pub(crate) fn finalize(&self, id: EmitterId) {
        if self.closed.load(Ordering::Acquire) {
            return;
        }
        let Some(slot) = lock_recovered(&self.table).remove(&id) else {
            return;
        };
        self.logger.debug(&format!(
            "emitter {id} dropped with a live registration; terminating its handler"
        ));
        match try_lock_recovered(&slot) {
            Some(mut handler) => handler.terminate(&Terminated::EmitterDropped, &*self.logger),
            None => self.logger.error(&format!(
                "handler for dropped emitter {id} was mid-delivery; skipped"
            )),
        };
    }

    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::Release);

        let drained: Vec<(EmitterId, Arc<Mutex<Normalized<E>>>)> = {
            let mut table = lock_recovered(&self.table);
            table.drain().collect()
        };
        for (id, slot) in &drained {
            match try_lock_recovered(slot) {
                Some(mut handler) => handler.terminate(&Terminated::Closed, &*self.logger),
                None => self.logger.error(&format!(
                    "handler for emitter {id} was mid-delivery during close; skipped"
                )),
            }
        }
        drop(drained);

        // The root handler observes the shutdown as an event first, then is
        // retired. On a repeated close it is already done and nothing
        // happens beyond this.
        let closed_event = Event::Terminated(Terminated::Closed);
        let Some(mut slot) = try_lock_recovered(&self.root) else {
            self.logger.debug("re-entrant dispatcher close dropped");
            return;
        };
        if let Some(root) = slot.as_mut() {
            if root.done() {
                self.logger.debug("root handler already terminated; close is a no-op");
            } else {
                root.offer(&closed_event, &*self.logger);
                if !root.done() {
                    root.terminate(&Terminated::Closed, &*self.logger);
                }
            }
        }
    }

    fn remove(&self, key: EmitterId) {
        let removed = lock_recovered(&self.table).remove(&key);
        if removed.is_some() {
            self.logger
                .debug(&format!("registration for emitter {key} cleaned up"));
        }
    }
}

/// # Routes events from a tree of emitters to registered handlers.
///
/// The dispatcher is the unique owner of its state: emitters and
/// [`DispatchHandle`]s only hold weak references into it, so dropping the
/// `Dispatcher` closes the whole tree (every live registration receives a
/// `Closed` signal exactly once).
///
/// # Example
/// ```
/// use std::sync::{Arc, Mutex};
/// use scopewatch::{Dispatcher, Event, Handler};
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
///
/// let dispatcher = Dispatcher::new(Handler::observe(move |event: &Event<String>| {
///     if let Some(message) = event.as_app() {
///         sink.lock().unwrap().push(message.clone());
///     }
/// }));
///
/// let root = dispatcher.emitter();
/// root.send("hello");
/// assert_eq!(seen.lock().unwrap().as_slice(), ["hello".to_string()]);
/// ```
pub struct Dispatcher<E: 'static> {
    core: Arc<Core<E>>,
}

impl<E: 'static> Dispatcher<E> {
    /// Creates a dispatcher with the given root handler and the no-op
    /// logger. Use [`builder`](Dispatcher::builder) to inject a logger or
    /// combine several root handlers.
    pub fn new(root: Handler<E>) -> Self {
        Self::builder().root(root).build()
    }

    /// Starts building a dispatcher.
    pub fn builder() -> crate::dispatch::DispatcherBuilder<E> {
        crate::dispatch::DispatcherBuilder::new()
    }

    pub(crate) fn from_core(core: Arc<Core<E>>) -> Self {
        Self { core }
    }

    /// Creates a new root emitter bound to this dispatcher.
    ///
    /// Roots have no parent: events sent through one (and through its
    /// descendants, absent closer registrations) land in the root handler.
    pub fn emitter(&self) -> Emitter<E> {
        Emitter::root(&self.core)
    }

    /// Registers `handler` against `child`, keyed by the child's identity.
    ///
    /// The handler will receive every event routed from the child's subtree
    /// that no closer registration claims, and exactly one termination
    /// signal at the end of its life.
    ///
    /// # Errors
    /// Registration preconditions are caller bugs and are reported eagerly:
    /// see [`DispatchError`]. Registering a void emitter is an accepted
    /// no-op.
    pub fn register(&self, child: &Emitter<E>, handler: Handler<E>) -> Result<(), DispatchError> {
        self.core.register(child, handler)
    }

    /// A weak, cloneable capability for registering handlers from within
    /// other handlers without keeping the dispatcher alive.
    pub fn handle(&self) -> DispatchHandle<E> {
        DispatchHandle {
            core: Arc::downgrade(&self.core),
        }
    }

    /// Shuts the dispatcher down.
    ///
    /// Every still-live registration receives a `Closed` signal exactly
    /// once (order unspecified, failures logged); the root handler observes
    /// the shutdown last. Idempotent: a second close finds an empty table
    /// and is a no-op beyond the root handler. Dropping the dispatcher
    /// closes it as well.
    pub fn close(&self) {
        self.core.close();
    }

    /// True once [`close`](Dispatcher::close) has run (or begun).
    pub fn is_closed(&self) -> bool {
        self.core.closed.load(Ordering::Acquire)
    }
}

impl<E: 'static> Drop for Dispatcher<E> {
    fn drop(&mut self) {
        self.core.close();
    }
}

impl<E: 'static> std::fmt::Debug for Dispatcher<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registrations", &lock_recovered(&self.core.table).len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Weak capability into a [`Dispatcher`], safe to capture inside handlers.
///
/// The typical pattern: a handler observing `Forked` announcements uses a
/// captured `DispatchHandle` to register handlers against the children it
/// cares about.
pub struct DispatchHandle<E: 'static> {
    core: Weak<Core<E>>,
}

impl<E: 'static> DispatchHandle<E> {
    /// Same contract as [`Dispatcher::register`]; additionally reports
    /// [`DispatchError::Closed`] once the dispatcher is gone.
    pub fn register(&self, child: &Emitter<E>, handler: Handler<E>) -> Result<(), DispatchError> {
        match self.core.upgrade() {
            Some(core) => core.register(child, handler),
            None => Err(DispatchError::Closed),
        }
    }

    /// True while the dispatcher behind this handle is still alive.
    pub fn is_open(&self) -> bool {
        self.core
            .upgrade()
            .is_some_and(|core| !core.closed.load(Ordering::Acquire))
    }
}

impl<E: 'static> Clone for DispatchHandle<E> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<E: 'static> std::fmt::Debug for DispatchHandle<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DispatchHandle(open: {})", self.is_open())
    }
}
