use tokio::sync::mpsc;

use anyhow::Context as _;
use bench_studio::config::loader::get_global_settings_path;
use bench_studio::log_collector::{ensure_logs_dir_exists, get_global_logs_path};
use bench_studio::ui::threading::{create_runner, shutdown_runtime, SHUTDOWN_GRACE};
use bench_studio::{BenchmarkController, BenchmarkWindow, LogCollector, LogLine, SettingsManager};

fn main() -> anyhow::Result<()> {
    // =========================================================================
    // SETTINGS
    // =========================================================================
    let settings_path = get_global_settings_path().context("locating settings file")?;
    let settings = SettingsManager::load_from(&settings_path);

    // =========================================================================
    // LOGGING - before anything that logs
    // =========================================================================
    let log_dir = get_global_logs_path();
    ensure_logs_dir_exists(&log_dir).map_err(anyhow::Error::msg)?;
    let (log_ui_tx, log_ui_rx) = mpsc::channel::<LogLine>(1024);
    let log_collector = LogCollector::new(&log_dir, Some(log_ui_tx), settings.log_level_filter())
        .map_err(anyhow::Error::msg)
        .context("initializing log collector")?;
    if let Err(e) = log_collector.install() {
        eprintln!("[Main] WARNING: Failed to register global logger: {}", e);
    }

    log::info!(
        "Bench Studio {} starting (settings: {}, results: {}, log: {})",
        bench_studio::VERSION,
        settings_path.display(),
        settings.results_dir.display(),
        log_collector.session_log_path().display()
    );

    // =========================================================================
    // RUNTIME - owned here so shutdown can bound an in-flight run
    // =========================================================================
    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    let handle = runtime.handle().clone();

    // =========================================================================
    // LAUNCH EGUI
    // =========================================================================
    let result = {
        let _guard = runtime.enter();
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_title("Benchmarks")
                .with_inner_size(settings.window_size),
            ..Default::default()
        };

        eframe::run_native(
            "Bench Studio",
            options,
            Box::new(move |cc| {
                let (runner, events) = create_runner(&settings, Some(cc.egui_ctx.clone()), handle);
                let controller =
                    BenchmarkController::new(settings, runner).with_settings_path(settings_path);
                Box::new(BenchmarkWindow::new(controller, events, Some(log_ui_rx)))
            }),
        )
    };

    // =========================================================================
    // SHUTDOWN
    // =========================================================================
    log::info!("Bench Studio shutting down");
    shutdown_runtime(runtime, SHUTDOWN_GRACE);
    if let Err(e) = log_collector.wait_for_empty() {
        eprintln!("[Main] WARNING: Failed to flush logs: {}", e);
    }

    result.map_err(|e| anyhow::anyhow!("eframe error: {}", e))
}
