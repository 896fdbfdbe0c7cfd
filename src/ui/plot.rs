use eframe::egui::{Align2, Color32, RichText, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Plot, PlotPoint, PlotPoints, Points,
    Polygon, Text,
};

use crate::color;
use crate::data::stats::{BoxSummary, Histogram};

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

/// Vertical bars over a categorical axis. Values are printed above each bar
/// and the category names below it; the numeric x axis stays hidden.
pub fn category_bar_chart(ui: &mut Ui, id: &str, entries: &[(String, f64)], height: f32) {
    if entries.is_empty() {
        return;
    }
    let max = entries.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let label_row = -max * 0.05;
    let ink = ui.visuals().text_color();

    let bars: Vec<Bar> = entries
        .iter()
        .enumerate()
        .map(|(i, (_, value))| Bar::new(i as f64, *value).width(0.72).fill(color::ACCENT))
        .collect();

    Plot::new(id.to_owned())
        .show_axes([false, true])
        .include_y(max * 1.18)
        .include_y(label_row * 2.5)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .height(height)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
            for (i, (name, value)) in entries.iter().enumerate() {
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(i as f64, *value),
                        RichText::new(format!("{value:.0}")).size(11.0),
                    )
                    .anchor(Align2::CENTER_BOTTOM)
                    .color(ink),
                );
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(i as f64, label_row),
                        RichText::new(truncate_label(name, 14)).size(11.0),
                    )
                    .anchor(Align2::CENTER_TOP)
                    .color(ink),
                );
            }
        });
}

/// Equal-width histogram bars with a counted y axis.
pub fn histogram_chart(ui: &mut Ui, id: &str, hist: &Histogram, x_label: &str, height: f32) {
    let bars: Vec<Bar> = hist
        .counts
        .iter()
        .enumerate()
        .map(|(i, &count)| {
            Bar::new(hist.center(i), count as f64)
                .width(hist.bin_width * 0.97)
                .fill(color::ACCENT)
        })
        .collect();

    Plot::new(id.to_owned())
        .x_axis_label(x_label)
        .y_axis_label("Count")
        .height(height)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

// ---------------------------------------------------------------------------
// Box plots
// ---------------------------------------------------------------------------

/// One box-and-whisker element per category, coloured from the palette.
pub fn grouped_box_plot(
    ui: &mut Ui,
    id: &str,
    groups: &[(String, BoxSummary)],
    y_label: &str,
    height: f32,
) {
    if groups.is_empty() {
        return;
    }
    let palette = color::generate_palette(groups.len());

    Plot::new(id.to_owned())
        .legend(Legend::default())
        .show_axes([false, true])
        .y_axis_label(y_label)
        .allow_drag(false)
        .allow_scroll(false)
        .height(height)
        .show(ui, |plot_ui| {
            for (i, (name, summary)) in groups.iter().enumerate() {
                let tint = palette[i];
                let elem = BoxElem::new(
                    i as f64,
                    BoxSpread::new(
                        summary.whisker_low,
                        summary.q1,
                        summary.median,
                        summary.q3,
                        summary.whisker_high,
                    ),
                )
                .box_width(0.5)
                .fill(tint.gamma_multiply(0.4))
                .stroke(Stroke::new(1.5, tint));

                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(name));
            }
        });
}

// ---------------------------------------------------------------------------
// Scatter plots
// ---------------------------------------------------------------------------

/// A plain two-variable scatter in the translucent accent colour.
pub fn scatter_chart(
    ui: &mut Ui,
    id: &str,
    points: &[[f64; 2]],
    x_label: &str,
    y_label: &str,
    height: f32,
) {
    Plot::new(id.to_owned())
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .height(height)
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(PlotPoints::from(points.to_vec()))
                    .color(color::accent_translucent())
                    .radius(1.5),
            );
        });
}

/// Latitude/longitude scatter, one legend entry per price band. Aspect is
/// locked so the street grid keeps its shape.
pub fn geo_scatter(
    ui: &mut Ui,
    id: &str,
    bands: &[(String, Color32, Vec<[f64; 2]>)],
    height: f32,
) {
    Plot::new(id.to_owned())
        .legend(Legend::default())
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .data_aspect(1.0)
        .height(height)
        .show(ui, |plot_ui| {
            for (name, tint, points) in bands {
                plot_ui.points(
                    Points::new(PlotPoints::from(points.clone()))
                        .color(*tint)
                        .radius(1.5)
                        .name(name),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

/// An n-by-n matrix of shaded cells. Rows are labelled by name on the left,
/// columns by their row number underneath; each cell prints its coefficient.
/// Cells without a defined coefficient stay gray.
pub fn correlation_heatmap(
    ui: &mut Ui,
    id: &str,
    labels: &[&str],
    matrix: &[Vec<f64>],
    height: f32,
) {
    let n = matrix.len();
    if n == 0 {
        return;
    }
    let ink = ui.visuals().text_color();

    Plot::new(id.to_owned())
        .data_aspect(1.0)
        .show_axes([false, false])
        .show_grid(false)
        .include_x(-(n as f64) * 0.55)
        .include_y(-1.5)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .height(height)
        .show(ui, |plot_ui| {
            for (i, row) in matrix.iter().enumerate() {
                // Row 0 is drawn at the top.
                let y = (n - 1 - i) as f64;
                for (j, &r) in row.iter().enumerate() {
                    let x = j as f64;
                    let t = (r + 1.0) / 2.0;
                    let fill = if r.is_nan() {
                        Color32::from_gray(150)
                    } else {
                        color::sequential_blues(t)
                    };
                    plot_ui.polygon(
                        Polygon::new(cell_corners(x, y))
                            .fill_color(fill)
                            .stroke(Stroke::NONE),
                    );
                    if !r.is_nan() {
                        let ink = if t > 0.55 {
                            Color32::WHITE
                        } else {
                            Color32::from_gray(40)
                        };
                        plot_ui.text(
                            Text::new(
                                PlotPoint::new(x, y),
                                RichText::new(format!("{r:.2}")).size(10.0),
                            )
                            .anchor(Align2::CENTER_CENTER)
                            .color(ink),
                        );
                    }
                }
            }

            for (i, label) in labels.iter().enumerate() {
                let y = (n - 1 - i) as f64;
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(-0.65, y),
                        RichText::new(format!("{}. {label}", i + 1)).size(11.0),
                    )
                    .anchor(Align2::RIGHT_CENTER)
                    .color(ink),
                );
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(i as f64, -0.65),
                        RichText::new(format!("{}", i + 1)).size(11.0),
                    )
                    .anchor(Align2::CENTER_TOP)
                    .color(ink),
                );
            }
        });
}

/// Corners of the unit cell centred on `(x, y)`, slightly inset so the grid
/// reads as separate tiles.
fn cell_corners(x: f64, y: f64) -> Vec<[f64; 2]> {
    let h = 0.48;
    vec![
        [x - h, y - h],
        [x + h, y - h],
        [x + h, y + h],
        [x - h, y + h],
    ]
}

// ---------------------------------------------------------------------------
// Small helpers
// ---------------------------------------------------------------------------

fn truncate_label(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        return name.to_string();
    }
    let mut out: String = name.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}
