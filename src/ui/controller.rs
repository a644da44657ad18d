//! Benchmark window controller.
//!
//! Holds everything the window shows and every state transition it performs,
//! independent of egui so it can be driven from tests:
//! - reload: clear the aggregator, rescan the results directory, rebuild the tree
//! - run: guard against concurrent runs, disable controls, start the runner
//! - completion: reload and re-enable controls
//! - selection: rebuild the chart for the selected case

use crate::benchmark::{BenchmarkAggregator, BenchmarkRunner, RunSummary, RunnerEvent, ScanReport};
use crate::config::{Settings, SettingsManager};
use crate::error::AppError;
use crate::models::{CaseId, Serie};
use crate::ui::chart::{Chart, ChartWidget, LineChart};
use crate::ui::tree::{self, TreeNode, TreeSelection};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Progress of the active run, as reported by runner events
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunProgress {
    pub total: usize,
    pub done: usize,
    pub last_case: Option<String>,
}

impl RunProgress {
    /// Completed fraction in 0..=1, `None` when the total is unknown
    pub fn fraction(&self) -> Option<f32> {
        if self.total == 0 {
            None
        } else {
            Some((self.done as f32 / self.total as f32).min(1.0))
        }
    }
}

/// Status line shown under the controls
#[derive(Clone, Debug, PartialEq)]
pub enum StatusMessage {
    Info(String),
    Error(String),
}

pub struct BenchmarkController {
    settings: Settings,
    /// Where changed settings are persisted; `None` disables persistence
    settings_path: Option<PathBuf>,
    aggregator: BenchmarkAggregator,
    runner: Arc<dyn BenchmarkRunner>,
    tree: Vec<TreeNode>,
    selected: Option<TreeSelection>,
    chart: ChartWidget,
    run_enabled: bool,
    progress: Option<RunProgress>,
    status: Option<StatusMessage>,
    last_scan: ScanReport,
    output: Vec<String>,
}

/// Lines of external-command output kept for display
const MAX_OUTPUT_LINES: usize = 200;

impl BenchmarkController {
    /// Build the controller and perform the initial load
    pub fn new(settings: Settings, runner: Arc<dyn BenchmarkRunner>) -> Self {
        let mut controller = BenchmarkController {
            settings,
            settings_path: None,
            aggregator: BenchmarkAggregator::new(),
            runner,
            tree: Vec::new(),
            selected: None,
            chart: ChartWidget::new(),
            run_enabled: true,
            progress: None,
            status: None,
            last_scan: ScanReport::default(),
            output: Vec::new(),
        };
        controller.chart.set_frame(true);
        let _ = controller.reload_benchmarks();
        controller
    }

    /// Persist settings changes to `path`
    pub fn with_settings_path(mut self, path: PathBuf) -> Self {
        self.settings_path = Some(path);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn results_dir(&self) -> &Path {
        &self.settings.results_dir
    }

    pub fn aggregator(&self) -> &BenchmarkAggregator {
        &self.aggregator
    }

    pub fn tree(&self) -> &[TreeNode] {
        &self.tree
    }

    pub fn chart(&self) -> &ChartWidget {
        &self.chart
    }

    pub fn selection(&self) -> Option<&TreeSelection> {
        self.selected.as_ref()
    }

    pub fn selected_path(&self) -> Option<&[String]> {
        self.selected.as_ref().map(|s| s.path.as_slice())
    }

    /// Serie of the selected case, if a case (not a group) is selected
    pub fn selected_serie(&self) -> Option<&Serie> {
        let id = self.selected.as_ref()?.case_id?;
        self.aggregator.serie(id)
    }

    pub fn is_run_enabled(&self) -> bool {
        self.run_enabled
    }

    pub fn is_running(&self) -> bool {
        self.runner.is_running()
    }

    pub fn progress(&self) -> Option<&RunProgress> {
        self.progress.as_ref()
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn dismiss_status(&mut self) {
        self.status = None;
    }

    pub fn last_scan(&self) -> &ScanReport {
        &self.last_scan
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Clear the aggregator, rescan the results directory and rebuild the
    /// tree. The previous selection is restored when its path still exists.
    pub fn reload_benchmarks(&mut self) -> Result<ScanReport, AppError> {
        self.aggregator.clear();
        let scan = self.aggregator.scan_directory(&self.settings.results_dir);
        self.populate_tree();

        match scan {
            Ok(report) => {
                if report.skipped > 0 {
                    self.status = Some(StatusMessage::Error(skipped_message(report.skipped)));
                } else if matches!(self.status, Some(StatusMessage::Error(_))) {
                    self.status = None;
                }
                self.last_scan = report.clone();
                Ok(report)
            }
            Err(e) => {
                let err = AppError::from(e);
                log::error!("[UI] Reload failed: {}", err);
                self.status = Some(StatusMessage::Error(err.user_message()));
                self.last_scan = ScanReport::default();
                Err(err)
            }
        }
    }

    /// Rebuild tree nodes from the aggregator and re-resolve the selection
    pub fn populate_tree(&mut self) {
        self.tree = tree::build_tree_nodes(self.aggregator.benchmarks());

        let Some(previous) = self.selected.take() else {
            self.chart.clear();
            return;
        };
        // Case ids are reassigned on every scan; resolve by path and kind
        let resolved = tree::find_node_of_kind(&self.tree, &previous.path, previous.is_case())
            .map(|n| TreeSelection {
                path: n.path.clone(),
                case_id: n.case_id,
            });
        match resolved {
            Some(selection) => self.select_case(selection),
            None => {
                log::debug!("[UI] Selection {:?} no longer present after reload", previous.path);
                self.chart.clear();
            }
        }
    }

    /// Start a run unless one is active. Returns whether a run was started.
    pub fn run_benchmarks(&mut self) -> bool {
        if self.runner.is_running() || !self.run_enabled {
            log::debug!("[UI] Run request ignored: a run is already in progress");
            return false;
        }

        self.enable_widgets(false);
        match self.runner.start() {
            Ok(()) => {
                self.progress = Some(RunProgress::default());
                self.output.clear();
                self.status = Some(StatusMessage::Info("Running benchmarks...".to_string()));
                true
            }
            Err(e) => {
                let err = AppError::from(e);
                log::error!("[UI] Could not start run: {}", err);
                self.status = Some(StatusMessage::Error(err.user_message()));
                self.enable_widgets(true);
                false
            }
        }
    }

    /// Apply one runner event
    pub fn handle_event(&mut self, event: RunnerEvent) {
        match event {
            RunnerEvent::Started { total } => {
                self.progress = Some(RunProgress {
                    total,
                    ..RunProgress::default()
                });
            }
            RunnerEvent::CaseFinished { suite, case, ticks } => {
                let progress = self.progress.get_or_insert_with(RunProgress::default);
                progress.done += 1;
                progress.last_case = Some(format!("{}/{}", suite, case));
                log::debug!("[UI] Case finished: {}/{} ({:.1}ns)", suite, case, ticks);
            }
            RunnerEvent::Output(line) => {
                self.output.push(line);
                if self.output.len() > MAX_OUTPUT_LINES {
                    let excess = self.output.len() - MAX_OUTPUT_LINES;
                    self.output.drain(..excess);
                }
            }
            RunnerEvent::Finished(outcome) => self.on_run_complete(outcome),
        }
    }

    /// Reload results and re-enable controls after a run
    pub fn on_run_complete(&mut self, outcome: Result<RunSummary, String>) {
        self.progress = None;
        let reload = self.reload_benchmarks();

        match outcome {
            Ok(summary) => {
                if let Ok(report) = reload {
                    let msg = match summary.record_path {
                        Some(path) => format!(
                            "Run complete: {} cases in {:.1}s ({})",
                            summary.cases,
                            summary.duration.as_secs_f64(),
                            path.display()
                        ),
                        None => format!("Run complete in {:.1}s", summary.duration.as_secs_f64()),
                    };
                    self.status = Some(if report.skipped > 0 {
                        StatusMessage::Error(format!("{}; {}", msg, skipped_message(report.skipped)))
                    } else {
                        StatusMessage::Info(msg)
                    });
                }
            }
            Err(reason) => {
                self.status = Some(StatusMessage::Error(AppError::Run(reason).user_message()));
            }
        }

        self.enable_widgets(true);
    }

    /// Handle a click in the tree: clear the chart, then chart the serie of
    /// the selected case. Groups leave the chart empty.
    pub fn select_case(&mut self, selection: TreeSelection) {
        self.chart.clear();

        if let Some(id) = selection.case_id {
            if let Some(chart) = self.create_chart(id) {
                self.chart.add_chart(chart);
            }
        }

        self.selected = Some(selection);
    }

    /// Select by path (used after reloads and from tests)
    pub fn select_path(&mut self, path: &[String]) -> bool {
        match tree::find_node(&self.tree, path) {
            Some(node) => {
                let selection = TreeSelection {
                    path: node.path.clone(),
                    case_id: node.case_id,
                };
                self.select_case(selection);
                true
            }
            None => false,
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.chart.clear();
    }

    /// Line chart of a case's serie: x is the point index, y its ticks
    pub fn create_chart(&self, id: CaseId) -> Option<Box<dyn Chart>> {
        let serie = self.aggregator.serie(id)?;
        let mut chart = LineChart::new();
        for (i, point) in serie.points().iter().enumerate() {
            chart.add_point(i as f64, point.ticks);
        }
        Some(Box::new(chart))
    }

    /// Switch to another results directory, persist it and reload
    pub fn set_results_dir(&mut self, dir: PathBuf) -> Result<ScanReport, AppError> {
        log::info!("[UI] Results directory changed to {}", dir.display());
        self.settings.results_dir = dir;
        self.clear_selection();
        if let Some(path) = &self.settings_path {
            if let Err(e) = SettingsManager::save_to(&self.settings, path) {
                log::warn!("[UI] Failed to persist settings: {}", e);
            }
        }
        self.reload_benchmarks()
    }

    fn enable_widgets(&mut self, enabled: bool) {
        self.run_enabled = enabled;
    }
}

fn skipped_message(skipped: usize) -> String {
    format!("{} result file(s) could not be read", skipped)
}
