//! # scopewatch
//!
//! **Scopewatch** is a lightweight in-process observation substrate for Rust.
//!
//! It lets an application expose its internal control-flow structure —
//! nested scopes, concurrent sub-tasks, lifetimes — as a tree of emission
//! points, and lets independently-written observers attach stateful,
//! long-lived reactions to any node of that tree without the application
//! code depending on the observers. It is a building block for tracing,
//! structured logging, test instrumentation, or runtime supervision over
//! arbitrary code, without intrusive rewrites.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   application code                        observers
//!   ────────────────                        ─────────
//!   root = dispatcher.emitter()             Dispatcher::new(root_handler)
//!        │                                       ▲
//!        │ fork() / scope()                      │ fallback
//!        ▼                                       │
//!   ┌──────────┐  Forked ─────────────►  nearest registered handler
//!   │  child   │                         (walk innermost → outermost)
//!   │ emitter  │  send(event) ────────►       │
//!   └────┬─────┘                              │ register(grandchild, …)
//!        │ fork()                             ▼
//!        ▼                                further handlers, mirroring
//!   ┌──────────┐                          the scope tree
//!   │grandchild│  Joined / dropped ────►  one termination signal,
//!   └──────────┘                          then the registration is gone
//! ```
//!
//! ### Lifecycle
//! ```text
//! emitter.fork() ──► Forked event through the parent ──► child handle
//!
//! child lifetime ends in exactly one of three ways:
//!   ├─ Scope guard joins (explicitly or on drop)  ─► Joined (+ optional cause)
//!   ├─ last handle drops without a join           ─► EmitterDropped safety net
//!   └─ dispatcher closes first                    ─► Closed
//! ```
//!
//! ## Features
//! | Area          | Description                                                     | Key types / traits                  |
//! |---------------|-----------------------------------------------------------------|-------------------------------------|
//! | **Emitters**  | Scope tree nodes: send events, fork children, scoped use.       | [`Emitter`], [`Scope`]              |
//! | **Handlers**  | Reactive, suspendable, or grouped reactions on any node.        | [`Handler`], [`Flow`], [`Reaction`] |
//! | **Waiting**   | Declarative suspension points for multi-step handlers.          | [`Wait`], [`Cond`]                  |
//! | **Dispatch**  | Innermost-first routing, registration lifecycle, shutdown.      | [`Dispatcher`], [`DispatchHandle`]  |
//! | **Events**    | Envelope over app payloads plus the termination-signal taxonomy.| [`Event`], [`Terminated`]           |
//! | **Logging**   | Injected collaborator for everything the runtime contains.      | [`Logger`], [`LogBridge`]           |
//!
//! ## Guarantees
//! - Delivery is synchronous and innermost-first: a handler registered
//!   closer to the event's origin always gets first refusal, and exactly
//!   one handler observes each event.
//! - Senders never observe handler failures; `send` always returns.
//! - Each registration receives exactly one termination signal
//!   (`Joined`, `EmitterDropped` or `Closed`), after which it is gone.
//! - No ordering guarantee exists across independent emitter trees.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use scopewatch::{Dispatcher, Event, Handler};
//!
//! let log = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&log);
//!
//! // The root handler observes everything no closer registration claims.
//! let dispatcher = Dispatcher::new(Handler::observe(move |event: &Event<String>| {
//!     sink.lock().unwrap().push(format!("{:?}", event.kind()));
//! }));
//!
//! let root = dispatcher.emitter();
//! root.send("starting up".to_string());
//!
//! // Scoped use: exactly one Joined on every exit path.
//! let result: Result<(), String> = root.scope().run(|scope| {
//!     scope.send("working".to_string());
//!     Ok(())
//! });
//! assert!(result.is_ok());
//!
//! assert_eq!(
//!     log.lock().unwrap().as_slice(),
//!     ["App", "Forked", "App", "Joined"]
//! );
//! ```

mod dispatch;
mod emitters;
mod error;
mod events;
mod handlers;
mod logging;

// ---- Public re-exports ----

pub use dispatch::{DispatchHandle, Dispatcher, DispatcherBuilder};
pub use emitters::{Emitter, EmitterId, Scope};
pub use error::DispatchError;
pub use events::{Event, EventKind, Forked, Terminated};
pub use handlers::{Cond, Flow, Handler, HandlerError, Reaction, Step, Wait, WaitCancelled};
pub use logging::{LogBridge, Logger, NopLogger};
