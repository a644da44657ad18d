//! UI Module - egui integration and BenchmarkController
//!
//! Handles the interface between the benchmark backend and the egui frontend.
//! `controller` owns all window state and transitions; `app` renders it.

pub mod app;
pub mod chart;
pub mod controller;
pub mod threading;
pub mod tree;

pub use app::BenchmarkWindow;
pub use chart::{Chart, ChartBounds, ChartWidget, LineChart};
pub use controller::{BenchmarkController, RunProgress, StatusMessage};
pub use tree::{TreeNode, TreeSelection};
