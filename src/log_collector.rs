//! Decoupled logging pipeline.
//!
//! `LogCollector` is installed as the backend of the `log` crate. Every
//! record is formatted on the calling thread and handed to a background
//! writer thread over an unbounded crossbeam channel, so logging never blocks
//! the UI or a benchmark run.
//!
//! ```text
//! log::info!() ... ──► [LogCollector] ──crossbeam──► writer thread
//!                                                      │        │
//!                                       logs/session_<ts>.log   UI channel
//!                                                               (try_send, lossy)
//! ```
//!
//! Disk writes always happen; the UI copy is dropped when its bounded
//! channel is full.

use chrono::Local;
use crossbeam_channel::{unbounded, Sender};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

enum LogMessage {
    Line(LogLine),
    /// Flush marker; the sender is signalled once everything before it is on disk
    Flush(std::sync::mpsc::Sender<()>),
}

/// Get the global logs path: <data dir>/bench-studio/logs, or ./logs
pub fn get_global_logs_path() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(crate::config::loader::APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("logs")
}

/// Ensure the logs directory exists
pub fn ensure_logs_dir_exists(log_dir: &Path) -> Result<(), String> {
    std::fs::create_dir_all(log_dir).map_err(|e| format!("Failed to create logs directory: {}", e))
}

/// A formatted log line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogLine {
    pub level: Level,
    pub message: String,
    /// Local wall-clock time, `HH:MM:SS.mmm`
    pub timestamp: String,
}

impl LogLine {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        LogLine {
            level,
            message: message.into(),
            timestamp: Local::now().format("%H:%M:%S%.3f").to_string(),
        }
    }

    /// Line as written to disk and shown in the UI
    pub fn render(&self) -> String {
        format!("[{}] [{}] {}", self.timestamp, self.level, self.message)
    }
}

/// `log` backend writing to a per-session file and forwarding to the UI
#[derive(Clone)]
pub struct LogCollector {
    tx: Sender<LogMessage>,
    session_path: PathBuf,
    max_level: LevelFilter,
}

impl LogCollector {
    /// Open `logs/session_<timestamp>.log` under `log_dir` and start the
    /// writer thread. Lines are also offered to `ui_tx` when given.
    pub fn new(
        log_dir: &Path,
        ui_tx: Option<tokio::sync::mpsc::Sender<LogLine>>,
        max_level: LevelFilter,
    ) -> Result<Self, String> {
        ensure_logs_dir_exists(log_dir)?;
        let session_path = log_dir.join(format!(
            "session_{}.log",
            Local::now().format("%Y%m%d_%H%M%S")
        ));
        let mut file: File = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&session_path)
            .map_err(|e| format!("Failed to open {}: {}", session_path.display(), e))?;

        let (tx, rx) = unbounded::<LogMessage>();

        // Plain OS thread: must keep draining regardless of which runtime the
        // logging call came from.
        std::thread::Builder::new()
            .name("log-writer".to_string())
            .spawn(move || {
                while let Ok(msg) = rx.recv() {
                    match msg {
                        LogMessage::Line(line) => {
                            let _ = writeln!(file, "{}", line.render());
                            if let Some(ui_tx) = &ui_tx {
                                let _ = ui_tx.try_send(line);
                            }
                        }
                        LogMessage::Flush(done) => {
                            let _ = file.flush();
                            let _ = file.sync_data();
                            let _ = done.send(());
                        }
                    }
                }
            })
            .map_err(|e| format!("Failed to spawn log writer: {}", e))?;

        Ok(LogCollector {
            tx,
            session_path,
            max_level,
        })
    }

    /// Path of the file this session writes to
    pub fn session_log_path(&self) -> &Path {
        &self.session_path
    }

    pub fn max_level(&self) -> LevelFilter {
        self.max_level
    }

    /// Queue a line for the writer thread (never blocks)
    pub fn log_line(&self, line: LogLine) {
        let _ = self.tx.send(LogMessage::Line(line));
    }

    /// Block until every line queued before this call has reached disk
    pub fn wait_for_empty(&self) -> Result<(), String> {
        let (done_tx, done_rx) = std::sync::mpsc::channel::<()>();
        self.tx
            .send(LogMessage::Flush(done_tx))
            .map_err(|e| format!("Failed to send flush marker: {}", e))?;
        done_rx
            .recv()
            .map_err(|e| format!("Flush signal interrupted: {}", e))
    }

    /// Register a clone of this collector as the global `log` backend
    pub fn install(&self) -> Result<(), log::SetLoggerError> {
        log::set_boxed_logger(Box::new(self.clone()))?;
        log::set_max_level(self.max_level);
        Ok(())
    }
}

impl Log for LogCollector {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = LogLine::new(record.level(), record.args().to_string());
        if record.level() <= Level::Warn {
            eprintln!("{}", line.render());
        }
        self.log_line(line);
    }

    fn flush(&self) {
        let _ = self.wait_for_empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_reach_disk_after_flush() {
        let dir = tempfile::tempdir().unwrap();
        let collector = LogCollector::new(dir.path(), None, LevelFilter::Debug).unwrap();

        collector.log_line(LogLine::new(Level::Info, "scan complete"));
        collector.wait_for_empty().unwrap();

        let content = std::fs::read_to_string(collector.session_log_path()).unwrap();
        assert!(content.contains("[INFO] scan complete"));
    }

    #[tokio::test]
    async fn test_lines_forwarded_to_ui() {
        let dir = tempfile::tempdir().unwrap();
        let (ui_tx, mut ui_rx) = tokio::sync::mpsc::channel(8);
        let collector = LogCollector::new(dir.path(), Some(ui_tx), LevelFilter::Info).unwrap();

        collector.log_line(LogLine::new(Level::Warn, "disk almost full"));
        collector.wait_for_empty().unwrap();

        let line = ui_rx.recv().await.unwrap();
        assert_eq!(line.level, Level::Warn);
        assert_eq!(line.message, "disk almost full");
    }

    #[test]
    fn test_enabled_respects_max_level() {
        let dir = tempfile::tempdir().unwrap();
        let collector = LogCollector::new(dir.path(), None, LevelFilter::Warn).unwrap();
        let debug = Metadata::builder().level(Level::Debug).build();
        let error = Metadata::builder().level(Level::Error).build();
        assert!(!collector.enabled(&debug));
        assert!(collector.enabled(&error));
    }

    #[test]
    fn test_full_ui_channel_does_not_block() {
        let dir = tempfile::tempdir().unwrap();
        let (ui_tx, _ui_rx) = tokio::sync::mpsc::channel(1);
        let collector = LogCollector::new(dir.path(), Some(ui_tx), LevelFilter::Info).unwrap();
        for i in 0..50 {
            collector.log_line(LogLine::new(Level::Info, format!("line {}", i)));
        }
        collector.wait_for_empty().unwrap();
        let content = std::fs::read_to_string(collector.session_log_path()).unwrap();
        assert_eq!(content.lines().count(), 50);
    }
}
