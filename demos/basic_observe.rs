//! # Basic Observation Example
//!
//! Shows the minimal wiring: a dispatcher with a root handler that prints
//! every event, a root emitter, and a couple of scoped sub-tasks.
//!
//! ## Run
//! ```bash
//! cargo run --example basic_observe
//! ```

use scopewatch::{Dispatcher, Event, Handler, LogBridge};

fn main() {
    env_logger::init();

    let dispatcher = Dispatcher::<String>::builder()
        .logger(LogBridge)
        .root(Handler::observe(|event: &Event<String>| match event {
            Event::App(message) => println!("[event] {message}"),
            Event::Forked(forked) => {
                println!(
                    "[forked] child={:?} payload={:?}",
                    forked.child(),
                    forked.payload()
                );
            }
            Event::Terminated(signal) => println!("[terminated] {signal}"),
        }))
        .build();

    let root = dispatcher.emitter();
    root.send("service starting");

    // A scope that exits cleanly.
    let loaded: Result<usize, String> = root.scope_with("load config".to_string()).run(|scope| {
        scope.send("reading defaults");
        scope.send("merging overrides");
        Ok(3)
    });
    println!("loaded {} config sections", loaded.unwrap_or(0));

    // A scope that fails: the Joined signal carries the cause.
    let _ = root
        .scope_with("warm cache".to_string())
        .run(|scope| -> Result<(), String> {
            scope.send("connecting");
            Err("cache backend unreachable".to_string())
        });

    root.send("service stopping");
    dispatcher.close();
}
