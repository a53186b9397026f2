//! # Nested Flows Example
//!
//! Shows the full observer pattern: the root handler watches for `Forked`
//! announcements and attaches a suspendable [`Flow`] to every worker scope,
//! tracking each worker's progress independently until its scope joins.
//!
//! ## Run
//! ```bash
//! cargo run --example nested_flows
//! ```

use std::sync::{Arc, Mutex};

use scopewatch::{
    Cond, Dispatcher, Event, EventKind, Flow, Handler, HandlerError, Step, Wait,
};

/// Follows one worker: waits for it to report readiness, then counts
/// completed batches until the worker's scope terminates.
struct WorkerFollower {
    name: String,
    ready: Option<Wait<String>>,
    batches: u32,
}

impl WorkerFollower {
    fn new(name: String) -> Self {
        let ready = Wait::until(Cond::pred(|e: &Event<String>| {
            e.as_app().is_some_and(|msg| msg == "ready")
        }))
        .cancel_if([EventKind::Joined, EventKind::EmitterDropped]);
        Self {
            name,
            ready: Some(ready),
            batches: 0,
        }
    }
}

impl Flow<String> for WorkerFollower {
    fn resume(&mut self, event: &Event<String>) -> Result<Step, HandlerError> {
        // Phase one: nothing counts until the worker reports readiness.
        if let Some(wait) = &mut self.ready {
            if wait.feed(event)? == Step::Complete {
                self.ready = None;
            }
            return Ok(Step::Pending);
        }
        if let Some(message) = event.as_app() {
            if message == "batch done" {
                self.batches += 1;
            }
        }
        Ok(Step::Pending)
    }

    fn terminate(
        &mut self,
        signal: &scopewatch::Terminated,
    ) -> Result<Step, HandlerError> {
        println!(
            "[follower] worker '{}' finished after {} batches ({signal})",
            self.name, self.batches
        );
        Ok(Step::Complete)
    }
}

fn main() {
    env_logger::init();

    let handle: Arc<Mutex<Option<scopewatch::DispatchHandle<String>>>> =
        Arc::new(Mutex::new(None));

    let handle_slot = Arc::clone(&handle);
    let dispatcher = Dispatcher::new(Handler::observe(move |event: &Event<String>| {
        let Some(forked) = event.as_forked() else {
            return;
        };
        let Some(name) = forked.payload().cloned() else {
            return;
        };
        let follower = Handler::flow(WorkerFollower::new(name));
        if let Some(handle) = handle_slot.lock().unwrap().as_ref() {
            if let Err(error) = handle.register(forked.child(), follower) {
                eprintln!("could not follow worker: {error}");
            }
        }
    }));
    *handle.lock().unwrap() = Some(dispatcher.handle());

    let root = dispatcher.emitter();

    for (worker, batches) in [("resync", 3u32), ("compact", 1u32)] {
        let scope = root.scope_with(worker.to_string());
        scope.send("ready");
        for _ in 0..batches {
            scope.send("batch done");
        }
        scope.join();
    }

    dispatcher.close();
}
