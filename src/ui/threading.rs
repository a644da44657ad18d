/// Threading and Async Integration Helpers
///
/// Wiring between the egui event loop and the background runner: building
/// the runner for the configured executor, and draining its event channel
/// once per frame.

use crate::benchmark::{
    CommandExecutor, EventSink, InProcessExecutor, RecordStore, RunnerEvent, RunnerThread,
    SuiteExecutor, SuiteRegistry,
};
use crate::config::Settings;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::UnboundedReceiver;

/// Upper bound on events applied per frame so a chatty run cannot stall rendering
pub const MAX_EVENTS_PER_FRAME: usize = 256;

/// How long shutdown waits for an in-flight run before abandoning it
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Stop the runtime once the window is gone. A run still executing on the
/// blocking pool after `grace` is abandoned so the process can exit.
pub fn shutdown_runtime(runtime: tokio::runtime::Runtime, grace: Duration) {
    log::info!("[UI] Shutting down runtime (grace {:?})", grace);
    runtime.shutdown_timeout(grace);
}

/// Pick the executor described by `settings`
pub fn create_executor(settings: &Settings) -> Arc<dyn SuiteExecutor> {
    if settings.uses_external_command() {
        Arc::new(CommandExecutor::new(
            settings.runner_command.clone(),
            settings.results_dir.clone(),
        ))
    } else {
        Arc::new(
            InProcessExecutor::new(
                SuiteRegistry::builtin(),
                settings.measure_config(),
                RecordStore::new(settings.results_dir.clone()),
            )
            .with_label(settings.run_label.clone()),
        )
    }
}

/// Build the runner and the receiving end of its event channel. The runner
/// requests a repaint of `ctx` whenever it emits.
pub fn create_runner(
    settings: &Settings,
    ctx: Option<eframe::egui::Context>,
    handle: tokio::runtime::Handle,
) -> (Arc<RunnerThread>, UnboundedReceiver<RunnerEvent>) {
    let (sink, rx) = EventSink::channel(ctx);
    let runner = RunnerThread::new(create_executor(settings), sink, handle);
    (Arc::new(runner), rx)
}

/// Take up to `limit` pending events without blocking
pub fn drain_events(rx: &mut UnboundedReceiver<RunnerEvent>, limit: usize) -> Vec<RunnerEvent> {
    let mut events = Vec::new();
    while events.len() < limit {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => {
                log::debug!("[UI] Runner event channel closed");
                break;
            }
        }
    }
    events
}
