//! Dispatch core: routing table, handler normalization, shutdown.
//!
//! This module contains the runtime that connects emitters to handlers.
//! The public API is [`Dispatcher`] (the unique owner), its builder, and
//! the weak [`DispatchHandle`] capability handed into handlers.
//!
//! Internal modules:
//! - [`dispatcher`]: routing walk, registration table, termination
//!   protocol, close-once shutdown;
//! - [`normalized`]: the `offer`/`terminate`/`done` contract behind which
//!   reactive closures, flows and groups are unified;
//! - [`builder`]: construction with an injected logger and combined root
//!   handlers.

mod builder;
mod dispatcher;
mod normalized;

pub use builder::DispatcherBuilder;
pub use dispatcher::{DispatchHandle, Dispatcher};

pub(crate) use dispatcher::Core;
