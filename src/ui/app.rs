/// Benchmark Window
///
/// The eframe::App for the benchmark browser. Layout:
/// - left: resizable "Benchmark" tree (acts as the splitter)
/// - center: line chart of the selected case and a table of its data points
/// - bottom: Run / Reload / Open Folder / Close, run progress and status
///
/// All state transitions go through `BenchmarkController`; this module only
/// renders and forwards input.

use crate::benchmark::RunnerEvent;
use crate::log_collector::LogLine;
use crate::models::Serie;
use crate::ui::chart::format_ticks;
use crate::ui::controller::{BenchmarkController, StatusMessage};
use crate::ui::threading::{drain_events, MAX_EVENTS_PER_FRAME};
use crate::ui::tree;
use chrono::Local;
use eframe::egui;
use egui_extras::{Column, TableBuilder};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::mpsc::{Receiver, UnboundedReceiver};

/// Log lines kept for the log pane
const MAX_LOG_LINES: usize = 500;

pub struct BenchmarkWindow {
    controller: BenchmarkController,
    events: UnboundedReceiver<RunnerEvent>,
    log_rx: Option<Receiver<LogLine>>,
    log_tail: VecDeque<String>,
}

impl BenchmarkWindow {
    pub fn new(
        controller: BenchmarkController,
        events: UnboundedReceiver<RunnerEvent>,
        log_rx: Option<Receiver<LogLine>>,
    ) -> Self {
        BenchmarkWindow {
            controller,
            events,
            log_rx,
            log_tail: VecDeque::with_capacity(MAX_LOG_LINES),
        }
    }

    pub fn controller(&self) -> &BenchmarkController {
        &self.controller
    }

    fn process_runner_events(&mut self) {
        for event in drain_events(&mut self.events, MAX_EVENTS_PER_FRAME) {
            self.controller.handle_event(event);
        }
    }

    fn process_log_lines(&mut self) {
        let Some(rx) = self.log_rx.as_mut() else {
            return;
        };
        while let Ok(line) = rx.try_recv() {
            self.log_tail.push_back(line.render());
            while self.log_tail.len() > MAX_LOG_LINES {
                self.log_tail.pop_front();
            }
        }
    }

    fn close(ctx: &egui::Context) {
        log::info!("[UI] Closing benchmark window");
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }

    fn render_controls(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("controls_panel").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                let enabled = self.controller.is_run_enabled();

                if ui
                    .add_enabled(enabled, egui::Button::new("▶ Run Benchmarks"))
                    .clicked()
                {
                    self.controller.run_benchmarks();
                }

                if ui.add_enabled(enabled, egui::Button::new("⟳ Reload")).clicked() {
                    let _ = self.controller.reload_benchmarks();
                }

                if ui
                    .add_enabled(enabled, egui::Button::new("📂 Open Folder..."))
                    .clicked()
                {
                    if let Some(dir) = rfd::FileDialog::new()
                        .set_directory(self.controller.results_dir())
                        .pick_folder()
                    {
                        let _ = self.controller.set_results_dir(dir);
                    }
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Close").clicked() {
                        Self::close(ui.ctx());
                    }
                });
            });

            if let Some(progress) = self.controller.progress() {
                ui.horizontal(|ui| match progress.fraction() {
                    Some(fraction) => {
                        let text = format!(
                            "{}/{} {}",
                            progress.done,
                            progress.total,
                            progress.last_case.as_deref().unwrap_or("")
                        );
                        ui.add(egui::ProgressBar::new(fraction).text(text));
                    }
                    None => {
                        ui.spinner();
                        ui.label("Running benchmark command...");
                    }
                });
            }

            let mut dismiss = false;
            if let Some(status) = self.controller.status() {
                ui.horizontal(|ui| {
                    match status {
                        StatusMessage::Info(msg) => {
                            ui.colored_label(egui::Color32::from_rgb(100, 200, 120), msg);
                        }
                        StatusMessage::Error(msg) => {
                            ui.colored_label(egui::Color32::from_rgb(255, 100, 100), msg);
                        }
                    }
                    if ui.small_button("Dismiss").clicked() {
                        dismiss = true;
                    }
                });
            }
            if dismiss {
                self.controller.dismiss_status();
            }

            egui::CollapsingHeader::new("Log")
                .default_open(false)
                .show(ui, |ui| {
                    egui::ScrollArea::vertical()
                        .max_height(140.0)
                        .auto_shrink([false; 2])
                        .stick_to_bottom(true)
                        .show(ui, |ui| {
                            for line in self.controller.output() {
                                ui.monospace(line);
                            }
                            for line in &self.log_tail {
                                ui.monospace(line);
                            }
                        });
                });
            ui.add_space(4.0);
        });
    }

    fn render_tree_panel(&mut self, ctx: &egui::Context) {
        let settings = self.controller.settings();
        let max_width = (ctx.screen_rect().width() - settings.chart_panel_min_width).max(150.0);
        let default_width = settings.tree_panel_width.min(max_width);

        egui::SidePanel::left("benchmarks_panel")
            .resizable(true)
            .default_width(default_width)
            .width_range(150.0..=max_width)
            .show(ctx, |ui| {
                ui.heading("Benchmark");
                ui.label(
                    egui::RichText::new(self.controller.results_dir().display().to_string())
                        .small()
                        .color(egui::Color32::GRAY),
                );
                ui.separator();

                if self.controller.tree().is_empty() {
                    ui.label("No benchmark results found. Press Run to record a first run.");
                    return;
                }

                let mut clicked = None;
                egui::ScrollArea::vertical()
                    .auto_shrink([false; 2])
                    .show(ui, |ui| {
                        clicked = tree::show_tree(
                            ui,
                            self.controller.tree(),
                            self.controller.selection(),
                        );
                    });

                if let Some(selection) = clicked {
                    if self.controller.selection() != Some(&selection) {
                        self.controller.select_case(selection);
                    }
                }
            });
    }

    fn render_chart_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            match self.controller.selected_path() {
                Some(path) => ui.heading(path.join(" / ")),
                None => ui.heading("No case selected"),
            };

            let serie = self.controller.selected_serie();
            if let Some(serie) = serie {
                render_serie_summary(ui, serie);
            }
            ui.add_space(4.0);

            let chart_height = (ui.available_height() * 0.6).max(150.0);
            self.controller
                .chart()
                .show(ui, egui::vec2(ui.available_width(), chart_height));

            if let Some(serie) = serie {
                ui.separator();
                render_points_table(ui, serie);
            }
        });
    }
}

fn render_serie_summary(ui: &mut egui::Ui, serie: &Serie) {
    let ticks = serie.points().iter().map(|p| p.ticks);
    let min = ticks.clone().fold(f64::INFINITY, f64::min);
    let max = ticks.fold(f64::NEG_INFINITY, f64::max);
    ui.horizontal(|ui| {
        ui.label(format!("{} runs", serie.len()));
        if let Some(latest) = serie.latest() {
            ui.separator();
            ui.label(format!("latest {}", format_ticks(latest.ticks)));
            ui.separator();
            ui.label(format!("best {}", format_ticks(min)));
            ui.separator();
            ui.label(format!("worst {}", format_ticks(max)));
        }
    });
}

fn render_points_table(ui: &mut egui::Ui, serie: &Serie) {
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::exact(50.0))
        .column(Column::auto().at_least(160.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("#");
            });
            header.col(|ui| {
                ui.strong("Date");
            });
            header.col(|ui| {
                ui.strong("Time / iteration");
            });
        })
        .body(|mut body| {
            for (i, point) in serie.points().iter().enumerate().rev() {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.monospace(i.to_string());
                    });
                    row.col(|ui| {
                        ui.label(
                            point
                                .date
                                .with_timezone(&Local)
                                .format("%Y-%m-%d %H:%M:%S")
                                .to_string(),
                        );
                    });
                    row.col(|ui| {
                        ui.monospace(format_ticks(point.ticks));
                    });
                });
            }
        });
}

impl eframe::App for BenchmarkWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_runner_events();
        self.process_log_lines();

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            Self::close(ctx);
        }

        self.render_controls(ctx);
        self.render_tree_panel(ctx);
        self.render_chart_panel(ctx);

        // Runner events wake us up; this only keeps the spinner moving
        if self.controller.is_running() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
