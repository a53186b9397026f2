//! # Injected logging collaborator.
//!
//! The dispatcher never lets handler failures reach the sender of an event;
//! everything it contains on that path is reported through a [`Logger`]
//! injected at construction time. The logger is strictly an observability
//! seam — it never affects control flow.
//!
//! What gets logged where:
//! - **debug**: swallowed reactive-handler errors, failed flow completions,
//!   registration cleanup, deallocation notices, dropped re-entrant
//!   deliveries;
//! - **warn**: a handler that ignored its own termination signal and had to
//!   be terminated forcibly;
//! - **error**: flow bootstrap failures and registrations that could not be
//!   reached during shutdown.
//!
//! The default is [`NopLogger`], which discards everything. [`LogBridge`]
//! forwards to the [`log`] facade so any `log`-compatible backend
//! (`env_logger`, `systemd`, …) picks the messages up.

/// Leveled logging contract accepted by the dispatcher.
///
/// Implementations must be cheap to call with an already-formatted message;
/// the dispatcher does not check any enabled-level before formatting.
pub trait Logger: Send + Sync + 'static {
    /// Routine diagnostics: contained handler errors, cleanup notices.
    fn debug(&self, message: &str);

    /// Informational messages. Currently unused by the runtime itself;
    /// available to handlers that share the injected logger.
    fn info(&self, message: &str);

    /// A handler misbehaved but the runtime recovered on its behalf.
    fn warn(&self, message: &str);

    /// A handler could not be run or reached at all.
    fn error(&self, message: &str);
}

/// Discards every message. The default collaborator.
#[derive(Clone, Copy, Debug, Default)]
pub struct NopLogger;

impl Logger for NopLogger {
    fn debug(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}

/// Forwards every message to the [`log`] facade.
///
/// # Example
/// ```no_run
/// use scopewatch::{Dispatcher, Event, Handler, LogBridge};
///
/// let dispatcher = Dispatcher::<String>::builder()
///     .logger(LogBridge)
///     .root(Handler::observe(|_: &Event<String>| {}))
///     .build();
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct LogBridge;

impl Logger for LogBridge {
    fn debug(&self, message: &str) {
        log::debug!("{message}");
    }

    fn info(&self, message: &str) {
        log::info!("{message}");
    }

    fn warn(&self, message: &str) {
        log::warn!("{message}");
    }

    fn error(&self, message: &str) {
        log::error!("{message}");
    }
}
