//! # Emitters: nodes of the observed scope tree.
//!
//! An [`Emitter`] marks one scope in the application's control flow —
//! a request, a worker, a sub-task. Emitters form a forest: children are
//! [`fork`](Emitter::fork)ed off parents, announce their birth upward, and
//! terminate exactly once, either well-ordered through a [`Scope`] guard or
//! through the drop safety net.
//!
//! ## Lifecycle
//! ```text
//! parent.fork() ──► Forked event through parent ──► child handle returned
//!      │
//!      ├─ scoped use:   parent.scope()  → Scope guard → Joined on every exit path
//!      └─ detached use: plain fork()    → EmitterDropped when the last handle drops
//! ```
//!
//! An emitter holds only weak links outward (to its parent and to the
//! dispatcher core): dropping the dispatcher makes every emitter inert, and
//! no emitter keeps its parent alive.

mod emitter;
mod scope;

pub use emitter::{Emitter, EmitterId};
pub use scope::Scope;

pub(crate) use emitter::EmitterInner;
