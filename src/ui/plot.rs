use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{self, Color32, Pos2, RichText, Sense, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoints, PlotUi, Points,
};

use crate::color::{ramp, ColorMap};
use crate::data::aggregate::{BoxStats, Frequency, GroupedSum, LinearTrend};

const CHART_HEIGHT: f32 = 240.0;
const BAR_COLOR: Color32 = Color32::from_rgb(0x1f, 0x77, 0xb4);

// ---------------------------------------------------------------------------
// Shared plot frame
// ---------------------------------------------------------------------------

/// Fixed-frame plot (no pan or zoom) with the given axis labels.
fn show_plot(
    ui: &mut Ui,
    id: &str,
    axes: (&str, &str),
    legend: bool,
    add: impl FnOnce(&mut PlotUi),
) {
    let mut plot = Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label(axes.0)
        .y_axis_label(axes.1)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false);
    if legend {
        plot = plot.legend(Legend::default());
    }
    plot.show(ui, add);
}

fn no_data(ui: &mut Ui) {
    ui.add_sized([ui.available_width(), CHART_HEIGHT], egui::Label::new("No data"));
}

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

/// Plain bar chart of value counts.
///
/// Numeric categories (hours, days, years) sit on their own value; text
/// categories get one legend entry each.
pub fn frequency_bars(ui: &mut Ui, id: &str, freq: &Frequency) {
    frequency_bars_colored(ui, id, freq, |_, _| BAR_COLOR);
}

/// Value counts coloured by count, darkest for the smallest.
pub fn frequency_bars_by_count(ui: &mut Ui, id: &str, freq: &Frequency) {
    let max = freq.counts.iter().map(|c| c.count).max().unwrap_or(0) as f64;
    frequency_bars_colored(ui, id, freq, |_, count| ramp(count / max));
}

fn frequency_bars_colored(
    ui: &mut Ui,
    id: &str,
    freq: &Frequency,
    color: impl Fn(usize, f64) -> Color32,
) {
    if freq.is_empty() {
        no_data(ui);
        return;
    }

    let numeric = freq.counts.iter().all(|c| c.value.as_f64().is_some());
    let colors = ColorMap::new(freq.counts.iter().map(|c| &c.value));

    show_plot(ui, id, (&freq.column, "count"), !numeric, |plot_ui| {
        if numeric {
            let bars: Vec<Bar> = freq
                .counts
                .iter()
                .enumerate()
                .map(|(i, c)| {
                    let x = c.value.as_f64().unwrap_or(i as f64);
                    Bar::new(x, c.count as f64)
                        .name(c.value.to_string())
                        .fill(color(i, c.count as f64))
                        .width(0.8)
                })
                .collect();
            plot_ui.bar_chart(BarChart::new(bars));
        } else {
            for (i, c) in freq.counts.iter().enumerate() {
                let bar = Bar::new(i as f64, c.count as f64).width(0.8);
                plot_ui.bar_chart(
                    BarChart::new(vec![bar])
                        .name(c.value.to_string())
                        .color(colors.color_for(&c.value)),
                );
            }
        }
    });
}

/// Sum per group, coloured by the size of the sum.
pub fn grouped_sum_bars(ui: &mut Ui, id: &str, grouped: &GroupedSum) {
    if grouped.groups.is_empty() {
        no_data(ui);
        return;
    }

    let max = grouped
        .groups
        .iter()
        .map(|g| g.sum)
        .fold(f64::NEG_INFINITY, f64::max);
    let bars: Vec<Bar> = grouped
        .groups
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let x = g.key.as_f64().unwrap_or(i as f64);
            let t = if max > 0.0 { g.sum / max } else { 0.0 };
            Bar::new(x, g.sum)
                .name(g.key.to_string())
                .fill(ramp(t))
                .width(0.8)
        })
        .collect();

    show_plot(ui, id, (&grouped.group_by, &grouped.column), false, |plot_ui| {
        plot_ui.bar_chart(BarChart::new(bars));
    });
}

// ---------------------------------------------------------------------------
// Line, scatter and box plots
// ---------------------------------------------------------------------------

/// Counts as a line with markers; expects numerically sorted categories.
pub fn frequency_line(ui: &mut Ui, id: &str, freq: &Frequency) {
    if freq.is_empty() {
        no_data(ui);
        return;
    }

    let points: Vec<[f64; 2]> = freq
        .counts
        .iter()
        .enumerate()
        .map(|(i, c)| [c.value.as_f64().unwrap_or(i as f64), c.count as f64])
        .collect();

    show_plot(ui, id, (&freq.column, "count"), false, |plot_ui| {
        plot_ui.line(
            Line::new(PlotPoints::from(points.clone()))
                .color(BAR_COLOR)
                .width(2.0),
        );
        plot_ui.points(
            Points::new(PlotPoints::from(points))
                .radius(4.0)
                .color(BAR_COLOR),
        );
    });
}

/// Scatter of `(x, y)` points with an optional fitted trend line.
pub fn scatter_with_trend(
    ui: &mut Ui,
    id: &str,
    axes: (&str, &str),
    points: &[[f64; 2]],
    trend: Option<&LinearTrend>,
) {
    if points.is_empty() {
        no_data(ui);
        return;
    }

    let (min_x, max_x) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p[0]), hi.max(p[0]))
        });

    show_plot(ui, id, axes, true, |plot_ui| {
        plot_ui.points(
            Points::new(PlotPoints::from(points.to_vec()))
                .radius(3.0)
                .color(BAR_COLOR)
                .name("orders"),
        );
        if let Some(trend) = trend {
            let line = vec![
                [min_x, trend.predict(min_x)],
                [max_x, trend.predict(max_x)],
            ];
            plot_ui.line(
                Line::new(PlotPoints::from(line))
                    .color(Color32::from_rgb(0xd6, 0x27, 0x28))
                    .width(2.0)
                    .name(format!("OLS trend (R² = {:.3})", trend.r_squared)),
            );
        }
    });
}

/// Single vertical box with its outliers.
pub fn box_plot(ui: &mut Ui, id: &str, label: &str, stats: Option<&BoxStats>) {
    let Some(stats) = stats else {
        no_data(ui);
        return;
    };

    let spread = BoxSpread::new(
        stats.lower_whisker,
        stats.q1,
        stats.median,
        stats.q3,
        stats.upper_whisker,
    );
    let outliers: Vec<[f64; 2]> = stats.outliers.iter().map(|&y| [0.0, y]).collect();

    show_plot(ui, id, ("", label), false, |plot_ui| {
        let elem = BoxElem::new(0.0, spread)
            .name(label)
            .box_width(0.5)
            .fill(BAR_COLOR.gamma_multiply(0.4))
            .stroke(Stroke::new(1.5, BAR_COLOR));
        plot_ui.box_plot(BoxPlot::new(vec![elem]));
        if !outliers.is_empty() {
            plot_ui.points(
                Points::new(PlotPoints::from(outliers))
                    .radius(3.0)
                    .color(BAR_COLOR),
            );
        }
    });
}

// ---------------------------------------------------------------------------
// Pie chart (painted directly)
// ---------------------------------------------------------------------------

/// Pie of value counts with a legend giving each share.
pub fn pie_chart(ui: &mut Ui, freq: &Frequency) {
    let total = freq.total();
    if total == 0 {
        no_data(ui);
        return;
    }

    let colors = ColorMap::new(freq.counts.iter().map(|c| &c.value));
    let size = (ui.available_width() * 0.5).clamp(120.0, CHART_HEIGHT);

    ui.horizontal(|ui: &mut Ui| {
        let (rect, _) = ui.allocate_exact_size(egui::vec2(size, size), Sense::hover());
        let painter = ui.painter_at(rect);
        let center = rect.center();
        let radius = size * 0.45;

        let mut start = -FRAC_PI_2;
        for c in &freq.counts {
            let sweep = c.count as f32 / total as f32 * TAU;
            paint_wedge(&painter, center, radius, start, sweep, colors.color_for(&c.value));
            start += sweep;
        }

        ui.vertical(|ui: &mut Ui| {
            for c in &freq.counts {
                let share = c.count as f64 / total as f64 * 100.0;
                ui.horizontal(|ui: &mut Ui| {
                    ui.label(RichText::new("■").color(colors.color_for(&c.value)));
                    ui.label(format!("{}  {share:.1}%", c.value));
                });
            }
        });
    });
}

/// Fill a circular sector. Split into pieces of at most a quarter turn so
/// each polygon stays convex.
fn paint_wedge(
    painter: &egui::Painter,
    center: Pos2,
    radius: f32,
    start: f32,
    sweep: f32,
    color: Color32,
) {
    const SEGMENTS: usize = 16;
    let pieces = (sweep / FRAC_PI_2).ceil().max(1.0) as usize;
    let step = sweep / pieces as f32;

    for piece in 0..pieces {
        let from = start + step * piece as f32;
        let mut points = Vec::with_capacity(SEGMENTS + 2);
        points.push(center);
        for s in 0..=SEGMENTS {
            let angle = from + step * s as f32 / SEGMENTS as f32;
            points.push(center + radius * egui::vec2(angle.cos(), angle.sin()));
        }
        painter.add(egui::Shape::convex_polygon(points, color, Stroke::NONE));
    }
}

// ---------------------------------------------------------------------------
// Metric
// ---------------------------------------------------------------------------

/// Big-number readout with a caption.
pub fn metric(ui: &mut Ui, label: &str, value: &str) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).weak());
        ui.label(RichText::new(value).size(28.0).strong());
    });
}
