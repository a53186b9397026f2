//! # Emitter handles and identity.
//!
//! [`Emitter`] is a cheap, cloneable handle over a shared node. The node
//! carries a process-unique [`EmitterId`], the precomputed chain of ancestor
//! ids used for routing, a weak parent link, and a weak capability into the
//! dispatcher core. When the **last** handle to a node drops, the dispatcher
//! is notified so a still-live registration gets its safety-net termination.
//!
//! Identity is drawn from a global monotonic counter and never reused, so a
//! registration key can never collide with a later emitter's identity.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use crate::dispatch::Core;
use crate::emitters::Scope;
use crate::events::{Event, Forked};

/// Global monotonic source of emitter identities.
static NEXT_EMITTER_ID: AtomicU64 = AtomicU64::new(1);

/// Stable, process-unique identity of an emitter.
///
/// Never reused for the lifetime of the process, even after the emitter is
/// dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EmitterId(u64);

impl EmitterId {
    pub(crate) fn next() -> Self {
        Self(NEXT_EMITTER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for EmitterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shared node behind all clones of one emitter.
pub(crate) struct EmitterInner<E: 'static> {
    pub(crate) id: EmitterId,
    /// Own id first, then ancestors outward. Routing walks this without
    /// needing the ancestor nodes to still be alive.
    pub(crate) lineage: Box<[EmitterId]>,
    pub(crate) parent: Option<Weak<EmitterInner<E>>>,
    pub(crate) core: Weak<Core<E>>,
}

impl<E: 'static> Drop for EmitterInner<E> {
    fn drop(&mut self) {
        if let Some(core) = self.core.upgrade() {
            core.finalize(self.id);
        }
    }
}

/// # A node in the observed scope tree.
///
/// Created either as a root via [`Dispatcher::emitter`](crate::Dispatcher::emitter)
/// or by forking an existing emitter. Cloning is cheap and clones share
/// identity; the node is deallocated when the last clone drops.
///
/// The handle is deliberately fire-and-forget: [`send`](Emitter::send) never
/// fails and never reports what (if anything) observed the event. Call sites
/// that want optional observation pass [`Emitter::void`] and may branch on
/// [`is_void`](Emitter::is_void).
///
/// # Example
/// ```
/// use scopewatch::{Dispatcher, Event, Handler};
///
/// let dispatcher = Dispatcher::new(Handler::observe(|_: &Event<&str>| {}));
/// let root = dispatcher.emitter();
/// let worker = root.fork();
///
/// assert_eq!(worker.parent().and_then(|p| p.id()), root.id());
/// worker.send("resync started");
/// ```
pub struct Emitter<E: 'static> {
    inner: Option<Arc<EmitterInner<E>>>,
}

impl<E: 'static> Emitter<E> {
    /// The inert variant: [`send`](Emitter::send) is a no-op and
    /// [`fork`](Emitter::fork) returns another void emitter.
    ///
    /// Lets call sites take an `Emitter` unconditionally while keeping
    /// observation optional.
    pub fn void() -> Self {
        Self { inner: None }
    }

    /// True if this is the inert variant.
    pub fn is_void(&self) -> bool {
        self.inner.is_none()
    }

    /// This emitter's identity. `None` for the void variant.
    pub fn id(&self) -> Option<EmitterId> {
        self.inner.as_ref().map(|inner| inner.id)
    }

    /// The parent emitter, if this is a fork and the parent is still alive.
    ///
    /// The link is non-owning: a child never keeps its parent alive.
    pub fn parent(&self) -> Option<Emitter<E>> {
        let inner = self.inner.as_ref()?;
        let parent = inner.parent.as_ref()?.upgrade()?;
        Some(Emitter { inner: Some(parent) })
    }

    /// Sends an application event through this emitter.
    ///
    /// The dispatcher synchronously delivers it to the nearest registered
    /// handler walking this emitter's ancestor chain (falling back to the
    /// root handler) before this call returns. Handler failures never
    /// propagate back here; on a void emitter, or once the dispatcher is
    /// gone, this is a no-op.
    pub fn send(&self, event: impl Into<E>) {
        self.dispatch(Event::App(event.into()));
    }

    /// Forks a child scope off this emitter.
    ///
    /// A [`Forked`] announcement carrying the child is sent through **self**
    /// before this returns, so whatever observes this emitter can register a
    /// handler against the child. The child itself starts unobserved.
    ///
    /// A child forked this way is *detached*: if every handle to it drops
    /// without an explicit join, its registered handler (if any) receives
    /// the drop safety-net termination. Prefer [`scope`](Emitter::scope)
    /// when the scope has a well-defined exit.
    pub fn fork(&self) -> Emitter<E> {
        self.fork_inner(None)
    }

    /// Like [`fork`](Emitter::fork), with an application payload attached
    /// to the announcement.
    pub fn fork_with(&self, payload: impl Into<E>) -> Emitter<E> {
        self.fork_inner(Some(payload.into()))
    }

    /// Forks a child and wraps it in a [`Scope`] guard that sends exactly
    /// one `Joined` signal on every exit path.
    pub fn scope(&self) -> Scope<E> {
        Scope::new(self.fork())
    }

    /// Like [`scope`](Emitter::scope), with an application payload attached
    /// to the fork announcement.
    pub fn scope_with(&self, payload: impl Into<E>) -> Scope<E> {
        Scope::new(self.fork_inner(Some(payload.into())))
    }

    fn fork_inner(&self, payload: Option<E>) -> Emitter<E> {
        let Some(inner) = &self.inner else {
            return Emitter::void();
        };

        let id = EmitterId::next();
        let mut lineage = Vec::with_capacity(inner.lineage.len() + 1);
        lineage.push(id);
        lineage.extend_from_slice(&inner.lineage);

        let child = Emitter {
            inner: Some(Arc::new(EmitterInner {
                id,
                lineage: lineage.into_boxed_slice(),
                parent: Some(Arc::downgrade(inner)),
                core: inner.core.clone(),
            })),
        };
        self.dispatch(Event::Forked(Forked::new(child.clone(), payload)));
        child
    }

    /// Creates a root emitter bound to the given dispatcher core.
    pub(crate) fn root(core: &Arc<Core<E>>) -> Self {
        let id = EmitterId::next();
        Self {
            inner: Some(Arc::new(EmitterInner {
                id,
                lineage: Box::new([id]),
                parent: None,
                core: Arc::downgrade(core),
            })),
        }
    }

    /// Delivers a pre-wrapped event. No-op on void emitters and once the
    /// dispatcher core is gone.
    pub(crate) fn dispatch(&self, event: Event<E>) {
        let Some(inner) = &self.inner else { return };
        let Some(core) = inner.core.upgrade() else {
            return;
        };
        core.route(&inner.lineage, event);
    }

    pub(crate) fn node(&self) -> Option<&Arc<EmitterInner<E>>> {
        self.inner.as_ref()
    }
}

impl<E: 'static> Clone for Emitter<E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<E: 'static> fmt::Debug for Emitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id() {
            Some(id) => write!(f, "Emitter({id})"),
            None => write!(f, "Emitter(void)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Dispatcher;
    use crate::handlers::Handler;

    fn quiet_dispatcher() -> Dispatcher<u32> {
        Dispatcher::new(Handler::observe(|_: &Event<u32>| {}))
    }

    #[test]
    fn test_ids_are_unique_and_monotonic() {
        let dispatcher = quiet_dispatcher();
        let root = dispatcher.emitter();
        let a = root.fork();
        let b = root.fork();

        let root_id = root.id().unwrap();
        let a_id = a.id().unwrap();
        let b_id = b.id().unwrap();
        assert!(root_id < a_id, "child id must come after parent id");
        assert!(a_id < b_id, "sibling ids must be distinct and increasing");
    }

    #[test]
    fn test_clones_share_identity() {
        let dispatcher = quiet_dispatcher();
        let root = dispatcher.emitter();
        let child = root.fork();
        let copy = child.clone();
        assert_eq!(child.id(), copy.id());
    }

    #[test]
    fn test_parent_chain() {
        let dispatcher = quiet_dispatcher();
        let root = dispatcher.emitter();
        let a = root.fork();
        let b = a.fork();

        assert_eq!(b.parent().and_then(|p| p.id()), a.id());
        assert_eq!(a.parent().and_then(|p| p.id()), root.id());
        assert!(root.parent().is_none(), "roots have no parent");
    }

    #[test]
    fn test_parent_link_is_non_owning() {
        let dispatcher = quiet_dispatcher();
        let root = dispatcher.emitter();
        let child = {
            let middle = root.fork();
            middle.fork()
        };
        assert!(
            child.parent().is_none(),
            "dropped parent must not be resurrected by the child"
        );
        // Routing still works through the dead link.
        child.send(7u32);
    }

    #[test]
    fn test_void_emitter_is_inert() {
        let void = Emitter::<u32>::void();
        assert!(void.is_void());
        assert!(void.id().is_none());
        void.send(1u32);

        let forked = void.fork();
        assert!(forked.is_void(), "forking a void emitter stays void");

        let scope = void.scope();
        scope.send(2u32);
        scope.join();
    }

    #[test]
    fn test_live_emitter_is_not_void() {
        let dispatcher = quiet_dispatcher();
        assert!(!dispatcher.emitter().is_void());
    }

    #[test]
    fn test_send_after_dispatcher_dropped_is_noop() {
        let root = {
            let dispatcher = quiet_dispatcher();
            dispatcher.emitter()
        };
        root.send(1u32);
        let child = root.fork();
        assert!(!child.is_void());
        child.send(2u32);
    }
}
