//! Background Benchmark Runner
//!
//! `RunnerThread` executes one benchmark run at a time on tokio's blocking
//! pool and reports progress and completion as [`RunnerEvent`]s. The UI drains
//! those events on its own thread each frame.
//!
//! What a run actually does is decided by a [`SuiteExecutor`]:
//! - [`InProcessExecutor`] times the registered suites and writes a run record
//! - [`CommandExecutor`] delegates to an external program that writes its own
//!   records into the results directory

use super::measure::{measure, MeasureConfig};
use super::record::{CaseResult, HostInfo, RecordStore, RunRecord};
use super::suites::SuiteRegistry;
use crate::error::RunnerError;
use chrono::Utc;
use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Environment variable handed to external benchmark commands
pub const RESULTS_DIR_ENV: &str = "BENCH_STUDIO_RESULTS_DIR";

/// Progress and completion notifications from a run
#[derive(Clone, Debug, PartialEq)]
pub enum RunnerEvent {
    /// A run began; `total` is the number of cases, 0 when unknown
    Started { total: usize },
    /// One case was timed
    CaseFinished { suite: String, case: String, ticks: f64 },
    /// Free-form output line (external command stdout)
    Output(String),
    /// The run ended
    Finished(Result<RunSummary, String>),
}

/// Summary of a completed run
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// Record written by the run, when the runner wrote one itself
    pub record_path: Option<PathBuf>,
    pub cases: usize,
    pub duration: Duration,
}

/// Sending half of the runner event channel, with optional UI wake-up
#[derive(Clone)]
pub struct EventSink {
    tx: UnboundedSender<RunnerEvent>,
    repaint: Option<egui::Context>,
}

impl EventSink {
    pub fn new(tx: UnboundedSender<RunnerEvent>, repaint: Option<egui::Context>) -> Self {
        EventSink { tx, repaint }
    }

    /// Create a connected sink/receiver pair
    pub fn channel(repaint: Option<egui::Context>) -> (Self, UnboundedReceiver<RunnerEvent>) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        (Self::new(tx, repaint), rx)
    }

    /// Send an event; a closed receiver (window gone) is ignored
    pub fn emit(&self, event: RunnerEvent) {
        if self.tx.send(event).is_err() {
            log::debug!("[RUNNER] Event receiver dropped");
        }
        if let Some(ctx) = &self.repaint {
            ctx.request_repaint();
        }
    }
}

/// Something that can perform one complete benchmark run
pub trait SuiteExecutor: Send + Sync {
    /// Short human-readable description for logs
    fn describe(&self) -> String;

    /// Perform the run synchronously, reporting progress through `sink`
    fn execute(&self, sink: &EventSink) -> Result<RunSummary, RunnerError>;
}

/// Times every case of a [`SuiteRegistry`] and persists a [`RunRecord`]
pub struct InProcessExecutor {
    registry: SuiteRegistry,
    config: MeasureConfig,
    store: RecordStore,
    label: Option<String>,
}

impl InProcessExecutor {
    pub fn new(registry: SuiteRegistry, config: MeasureConfig, store: RecordStore) -> Self {
        InProcessExecutor {
            registry,
            config,
            store,
            label: None,
        }
    }

    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label.filter(|l| !l.trim().is_empty());
        self
    }
}

impl SuiteExecutor for InProcessExecutor {
    fn describe(&self) -> String {
        format!(
            "in-process ({} cases, {} iterations) -> {}",
            self.registry.len(),
            self.config.iterations,
            self.store.dir().display()
        )
    }

    fn execute(&self, sink: &EventSink) -> Result<RunSummary, RunnerError> {
        if self.registry.is_empty() {
            return Err(RunnerError::NoCases);
        }

        let started = Instant::now();
        sink.emit(RunnerEvent::Started {
            total: self.registry.len(),
        });

        let mut record = RunRecord::new(Utc::now(), self.label.clone(), HostInfo::detect());
        for case in self.registry.cases() {
            let m = measure(case.body, &self.config)?;
            log::debug!(
                "[RUNNER] {}/{}: mean={:.1}ns p99={:.1}ns",
                case.suite,
                case.name,
                m.mean_ns,
                m.p99_ns
            );
            sink.emit(RunnerEvent::CaseFinished {
                suite: case.suite.to_string(),
                case: case.name.to_string(),
                ticks: m.mean_ns,
            });
            record.results.push(CaseResult {
                suite: case.suite.to_string(),
                case: case.name.to_string(),
                ticks: m.mean_ns,
                iterations: m.iterations,
                p50: Some(m.p50_ns),
                p99: Some(m.p99_ns),
            });
        }

        let path = self.store.save(&record)?;
        Ok(RunSummary {
            record_path: Some(path),
            cases: record.results.len(),
            duration: started.elapsed(),
        })
    }
}

/// Runs an external benchmark program with the results directory exported
/// in [`RESULTS_DIR_ENV`]
pub struct CommandExecutor {
    argv: Vec<String>,
    results_dir: PathBuf,
}

impl CommandExecutor {
    pub fn new(argv: Vec<String>, results_dir: PathBuf) -> Self {
        CommandExecutor { argv, results_dir }
    }

    fn command_line(&self) -> String {
        self.argv.join(" ")
    }
}

impl SuiteExecutor for CommandExecutor {
    fn describe(&self) -> String {
        format!("command `{}`", self.command_line())
    }

    fn execute(&self, sink: &EventSink) -> Result<RunSummary, RunnerError> {
        let (program, args) = self.argv.split_first().ok_or_else(|| RunnerError::CommandFailed {
            cmd: String::new(),
            reason: "empty command".to_string(),
        })?;

        let started = Instant::now();
        sink.emit(RunnerEvent::Started { total: 0 });
        std::fs::create_dir_all(&self.results_dir)?;

        let output = Command::new(program)
            .args(args)
            .env(RESULTS_DIR_ENV, &self.results_dir)
            .output()
            .map_err(|e| RunnerError::CommandFailed {
                cmd: self.command_line(),
                reason: e.to_string(),
            })?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            sink.emit(RunnerEvent::Output(line.to_string()));
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: Vec<&str> = stderr.lines().rev().take(5).collect();
            let reason = if tail.is_empty() {
                output.status.to_string()
            } else {
                format!(
                    "{}: {}",
                    output.status,
                    tail.into_iter().rev().collect::<Vec<_>>().join(" | ")
                )
            };
            return Err(RunnerError::CommandFailed {
                cmd: self.command_line(),
                reason,
            });
        }

        Ok(RunSummary {
            record_path: None,
            cases: 0,
            duration: started.elapsed(),
        })
    }
}

/// Start/status interface the window controller depends on
pub trait BenchmarkRunner: Send + Sync {
    /// Begin a run; fails with [`RunnerError::AlreadyRunning`] if one is active
    fn start(&self) -> Result<(), RunnerError>;

    fn is_running(&self) -> bool;
}

/// Executes runs on tokio's blocking pool, one at a time
pub struct RunnerThread {
    executor: Arc<dyn SuiteExecutor>,
    sink: EventSink,
    running: Arc<AtomicBool>,
    handle: tokio::runtime::Handle,
}

impl RunnerThread {
    pub fn new(
        executor: Arc<dyn SuiteExecutor>,
        sink: EventSink,
        handle: tokio::runtime::Handle,
    ) -> Self {
        RunnerThread {
            executor,
            sink,
            running: Arc::new(AtomicBool::new(false)),
            handle,
        }
    }
}

impl BenchmarkRunner for RunnerThread {
    fn start(&self) -> Result<(), RunnerError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(RunnerError::AlreadyRunning);
        }

        log::info!("[RUNNER] Starting benchmark run: {}", self.executor.describe());

        let executor = Arc::clone(&self.executor);
        let sink = self.sink.clone();
        let running = Arc::clone(&self.running);

        self.handle.spawn(async move {
            let task_sink = sink.clone();
            let joined = tokio::task::spawn_blocking(move || executor.execute(&task_sink)).await;

            let outcome = match joined {
                Ok(Ok(summary)) => {
                    log::info!(
                        "[RUNNER] Run complete: {} cases in {:.2}s",
                        summary.cases,
                        summary.duration.as_secs_f64()
                    );
                    Ok(summary)
                }
                Ok(Err(e)) => {
                    log::error!("[RUNNER] Run failed: {}", e);
                    Err(e.to_string())
                }
                Err(join_err) => {
                    let e = RunnerError::TaskPanicked(join_err.to_string());
                    log::error!("[RUNNER] {}", e);
                    Err(e.to_string())
                }
            };

            running.store(false, Ordering::SeqCst);
            sink.emit(RunnerEvent::Finished(outcome));
        });

        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
