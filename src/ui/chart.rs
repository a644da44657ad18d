/// Chart Widgets
///
/// Painter-based charts for benchmark series:
/// - `Chart`: trait implemented by every chart kind
/// - `LineChart`: polyline with point markers, grid and min/max labels
/// - `ChartWidget`: framed area hosting any number of charts on shared axes

use eframe::egui;
use egui::{Color32, Pos2, Rect, Stroke, Vec2};

const BACKGROUND: Color32 = Color32::from_rgb(46, 52, 64);
const LINE_COLOR: Color32 = Color32::from_rgb(136, 192, 208);
const GRID_COLOR: Color32 = Color32::from_gray(70);
const FRAME_COLOR: Color32 = Color32::from_gray(90);
const LABEL_COLOR: Color32 = Color32::LIGHT_GRAY;

/// Inner margin reserved for axis labels
const MARGIN_LEFT: f32 = 70.0;
const MARGIN_OTHER: f32 = 12.0;
const MARGIN_BOTTOM: f32 = 22.0;

/// Data-space extent of a set of points
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl ChartBounds {
    /// Bounds of `points`, or `None` when empty. Degenerate ranges (a single
    /// point, a flat series) are widened so they map to a visible area.
    pub fn from_points(points: &[(f64, f64)]) -> Option<Self> {
        let first = points.first()?;
        let mut b = ChartBounds {
            min_x: first.0,
            max_x: first.0,
            min_y: first.1,
            max_y: first.1,
        };
        for &(x, y) in &points[1..] {
            b.min_x = b.min_x.min(x);
            b.max_x = b.max_x.max(x);
            b.min_y = b.min_y.min(y);
            b.max_y = b.max_y.max(y);
        }

        if b.max_x - b.min_x <= f64::EPSILON {
            b.min_x -= 0.5;
            b.max_x += 0.5;
        }
        if b.max_y - b.min_y <= f64::EPSILON {
            let pad = (b.max_y.abs() * 0.1).max(1.0);
            b.min_y -= pad;
            b.max_y += pad;
        }
        Some(b)
    }

    /// Smallest bounds containing both
    pub fn union(self, other: ChartBounds) -> ChartBounds {
        ChartBounds {
            min_x: self.min_x.min(other.min_x),
            max_x: self.max_x.max(other.max_x),
            min_y: self.min_y.min(other.min_y),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Map a data point into `rect` (y grows upward in data space)
    pub fn to_screen(&self, rect: Rect, x: f64, y: f64) -> Pos2 {
        let tx = ((x - self.min_x) / (self.max_x - self.min_x)) as f32;
        let ty = ((y - self.min_y) / (self.max_y - self.min_y)) as f32;
        Pos2::new(
            rect.left() + tx * rect.width(),
            rect.bottom() - ty * rect.height(),
        )
    }
}

/// Human-readable duration for a nanosecond value
pub fn format_ticks(ns: f64) -> String {
    let abs = ns.abs();
    if abs >= 1e9 {
        format!("{:.2} s", ns / 1e9)
    } else if abs >= 1e6 {
        format!("{:.2} ms", ns / 1e6)
    } else if abs >= 1e3 {
        format!("{:.2} µs", ns / 1e3)
    } else {
        format!("{:.1} ns", ns)
    }
}

/// A chart drawable inside a [`ChartWidget`]
pub trait Chart: Send {
    fn add_point(&mut self, x: f64, y: f64);

    fn points(&self) -> &[(f64, f64)];

    fn clear(&mut self);

    /// Draw into `plot_rect` using shared `bounds`; `hover` is the pointer
    /// position when it is over the plot
    fn render(&self, painter: &egui::Painter, plot_rect: Rect, bounds: &ChartBounds, hover: Option<Pos2>);

    fn bounds(&self) -> Option<ChartBounds> {
        ChartBounds::from_points(self.points())
    }
}

/// Line chart of (x, y) points in insertion order
#[derive(Clone, Debug)]
pub struct LineChart {
    points: Vec<(f64, f64)>,
    color: Color32,
}

impl Default for LineChart {
    fn default() -> Self {
        Self::new()
    }
}

impl LineChart {
    pub fn new() -> Self {
        LineChart {
            points: Vec::new(),
            color: LINE_COLOR,
        }
    }

    pub fn with_color(mut self, color: Color32) -> Self {
        self.color = color;
        self
    }

    /// Index of the point whose screen x is closest to `pos.x`
    fn nearest(&self, plot_rect: Rect, bounds: &ChartBounds, pos: Pos2) -> Option<usize> {
        self.points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| (i, (bounds.to_screen(plot_rect, x, y).x - pos.x).abs()))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }
}

impl Chart for LineChart {
    fn add_point(&mut self, x: f64, y: f64) {
        self.points.push((x, y));
    }

    fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    fn clear(&mut self) {
        self.points.clear();
    }

    fn render(&self, painter: &egui::Painter, plot_rect: Rect, bounds: &ChartBounds, hover: Option<Pos2>) {
        if self.points.is_empty() {
            return;
        }

        let screen: Vec<Pos2> = self
            .points
            .iter()
            .map(|&(x, y)| bounds.to_screen(plot_rect, x, y))
            .collect();

        if screen.len() >= 2 {
            painter.add(egui::Shape::line(screen.clone(), Stroke::new(2.0, self.color)));
        }
        // Markers get noisy past a few hundred points
        if screen.len() <= 200 {
            for p in &screen {
                painter.circle_filled(*p, 3.0, self.color);
            }
        }

        if let Some(pos) = hover {
            if let Some(i) = self.nearest(plot_rect, bounds, pos) {
                let p = screen[i];
                painter.line_segment(
                    [Pos2::new(p.x, plot_rect.top()), Pos2::new(p.x, plot_rect.bottom())],
                    Stroke::new(1.0, Color32::from_gray(120)),
                );
                painter.circle_stroke(p, 5.0, Stroke::new(2.0, Color32::WHITE));
                let (x, y) = self.points[i];
                painter.text(
                    p + Vec2::new(8.0, -8.0),
                    egui::Align2::LEFT_BOTTOM,
                    format!("#{} {}", x as i64, format_ticks(y)),
                    egui::FontId::new(12.0, egui::FontFamily::Monospace),
                    Color32::WHITE,
                );
            }
        }
    }
}

/// Framed drawing area for charts
pub struct ChartWidget {
    charts: Vec<Box<dyn Chart>>,
    has_frame: bool,
}

impl Default for ChartWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartWidget {
    pub fn new() -> Self {
        ChartWidget {
            charts: Vec::new(),
            has_frame: true,
        }
    }

    pub fn set_frame(&mut self, has_frame: bool) {
        self.has_frame = has_frame;
    }

    pub fn add_chart(&mut self, chart: Box<dyn Chart>) {
        self.charts.push(chart);
    }

    pub fn clear(&mut self) {
        self.charts.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    pub fn charts(&self) -> &[Box<dyn Chart>] {
        &self.charts
    }

    /// Shared bounds across all charts
    pub fn bounds(&self) -> Option<ChartBounds> {
        self.charts
            .iter()
            .filter_map(|c| c.bounds())
            .reduce(ChartBounds::union)
    }

    /// Paint into a `size` area of `ui`
    pub fn show(&self, ui: &mut egui::Ui, size: Vec2) -> egui::Response {
        let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
        let rect = response.rect;

        painter.rect_filled(rect, 0.0, BACKGROUND);
        if self.has_frame {
            painter.rect_stroke(rect, 0.0, Stroke::new(1.0, FRAME_COLOR));
        }

        let Some(bounds) = self.bounds() else {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "Select a benchmark case to chart its history",
                egui::FontId::new(13.0, egui::FontFamily::Proportional),
                LABEL_COLOR,
            );
            return response;
        };

        let plot_rect = Rect::from_min_max(
            Pos2::new(rect.left() + MARGIN_LEFT, rect.top() + MARGIN_OTHER),
            Pos2::new(rect.right() - MARGIN_OTHER, rect.bottom() - MARGIN_BOTTOM),
        );
        if plot_rect.width() <= 0.0 || plot_rect.height() <= 0.0 {
            return response;
        }

        draw_grid(&painter, plot_rect, &bounds);

        let hover = response.hover_pos().filter(|p| plot_rect.contains(*p));
        for chart in &self.charts {
            chart.render(&painter, plot_rect, &bounds, hover);
        }

        response
    }
}

fn draw_grid(painter: &egui::Painter, plot_rect: Rect, bounds: &ChartBounds) {
    let font = egui::FontId::new(10.0, egui::FontFamily::Monospace);
    for tick in 0..=4 {
        let t = tick as f32 / 4.0;
        let y = plot_rect.bottom() - t * plot_rect.height();
        painter.line_segment(
            [Pos2::new(plot_rect.left(), y), Pos2::new(plot_rect.right(), y)],
            Stroke::new(0.5, GRID_COLOR),
        );
        let value = bounds.min_y + (bounds.max_y - bounds.min_y) * t as f64;
        painter.text(
            Pos2::new(plot_rect.left() - 6.0, y),
            egui::Align2::RIGHT_CENTER,
            format_ticks(value),
            font.clone(),
            LABEL_COLOR,
        );
    }

    painter.text(
        Pos2::new(plot_rect.left(), plot_rect.bottom() + 4.0),
        egui::Align2::LEFT_TOP,
        format!("{}", bounds.min_x.ceil() as i64),
        font.clone(),
        LABEL_COLOR,
    );
    painter.text(
        Pos2::new(plot_rect.right(), plot_rect.bottom() + 4.0),
        egui::Align2::RIGHT_TOP,
        format!("{}", bounds.max_x.floor() as i64),
        font,
        LABEL_COLOR,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_empty() {
        assert!(ChartBounds::from_points(&[]).is_none());
    }

    #[test]
    fn test_bounds_single_point_widened() {
        let b = ChartBounds::from_points(&[(0.0, 50.0)]).unwrap();
        assert!(b.max_x > b.min_x);
        assert!(b.max_y > b.min_y);
        assert!(b.min_y < 50.0 && b.max_y > 50.0);
    }

    #[test]
    fn test_bounds_flat_series_widened() {
        let points = [(0.0, 5.0), (1.0, 5.0), (2.0, 5.0)];
        let b = ChartBounds::from_points(&points).unwrap();
        assert_eq!((b.min_x, b.max_x), (0.0, 2.0));
        assert!(b.min_y < 5.0 && b.max_y > 5.0);

        let rect = Rect::from_min_size(Pos2::new(0.0, 0.0), Vec2::new(100.0, 50.0));
        for &(x, y) in &points {
            let p = b.to_screen(rect, x, y);
            assert!(p.y.is_finite());
            assert!((p.y - 25.0).abs() < 0.01);
        }
    }

    #[test]
    fn test_to_screen_corners() {
        let b = ChartBounds::from_points(&[(0.0, 0.0), (10.0, 100.0)]).unwrap();
        let rect = Rect::from_min_size(Pos2::new(0.0, 0.0), Vec2::new(100.0, 50.0));
        assert_eq!(b.to_screen(rect, 0.0, 0.0), Pos2::new(0.0, 50.0));
        assert_eq!(b.to_screen(rect, 10.0, 100.0), Pos2::new(100.0, 0.0));
    }

    #[test]
    fn test_format_ticks_units() {
        assert_eq!(format_ticks(12.34), "12.3 ns");
        assert_eq!(format_ticks(4_560.0), "4.56 µs");
        assert_eq!(format_ticks(1_200_000.0), "1.20 ms");
        assert_eq!(format_ticks(3_400_000_000.0), "3.40 s");
    }

    #[test]
    fn test_widget_bounds_union() {
        let mut widget = ChartWidget::new();
        let mut a = LineChart::new();
        a.add_point(0.0, 1.0);
        a.add_point(1.0, 2.0);
        let mut b = LineChart::new();
        b.add_point(0.0, 5.0);
        b.add_point(3.0, 0.5);
        widget.add_chart(Box::new(a));
        widget.add_chart(Box::new(b));

        let bounds = widget.bounds().unwrap();
        assert_eq!(bounds.min_x, 0.0);
        assert_eq!(bounds.max_x, 3.0);
        assert_eq!(bounds.min_y, 0.5);
        assert_eq!(bounds.max_y, 5.0);

        widget.clear();
        assert!(widget.is_empty());
        assert!(widget.bounds().is_none());
    }

    proptest::proptest! {
        #[test]
        fn prop_points_map_inside_plot(
            points in proptest::collection::vec((-1e6f64..1e6, 0f64..1e9), 1..50)
        ) {
            let b = ChartBounds::from_points(&points).unwrap();
            proptest::prop_assert!(b.max_x > b.min_x && b.max_y > b.min_y);

            let rect = Rect::from_min_size(Pos2::new(10.0, 10.0), Vec2::new(300.0, 200.0));
            let slack = rect.expand(0.5);
            for &(x, y) in &points {
                proptest::prop_assert!(slack.contains(b.to_screen(rect, x, y)));
            }
        }
    }

    #[test]
    fn test_line_chart_clear() {
        let mut chart = LineChart::new();
        chart.add_point(0.0, 1.0);
        chart.clear();
        assert!(chart.points().is_empty());
        assert!(chart.bounds().is_none());
    }
}
