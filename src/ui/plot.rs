use std::f64::consts::{FRAC_PI_2, TAU};

use eframe::egui::{self, Color32, RichText, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, MarkerShape, Plot, PlotPoint,
    PlotPoints, Points, Polygon, Text,
};

use crate::analysis::charts;
use crate::analysis::network::Layout;
use crate::color::{generate_palette, LevelColors};
use crate::data::model::{Column, HumanDevelopment, Table};
use crate::state::{
    AppState, CorrelationPlot, DistributionPlot, NetworkView, PlotCategory, ProportionPlot,
};

// ---------------------------------------------------------------------------
// Plot screen: option row + chart
// ---------------------------------------------------------------------------

pub fn plots_screen(ui: &mut Ui, state: &mut AppState) {
    let Some(table) = state.table.clone() else {
        return;
    };

    ui.horizontal_wrapped(|ui: &mut Ui| {
        combo(ui, "plot_category", "Plot", &mut state.plot.category, &PlotCategory::ALL);
        match state.plot.category {
            PlotCategory::Distribution => {
                combo(ui, "dist_kind", "Kind", &mut state.plot.distribution, &DistributionPlot::ALL);
                column_combo(ui, "dist_column", "Column", &mut state.plot.column);
            }
            PlotCategory::Proportion => {
                combo(
                    ui,
                    "prop_kind",
                    "Kind",
                    &mut state.plot.proportion,
                    &[ProportionPlot::Pie, ProportionPlot::StackedBar],
                );
                column_combo(ui, "prop_column", "Column", &mut state.plot.column);
            }
            PlotCategory::Correlation => {
                combo(
                    ui,
                    "corr_kind",
                    "Kind",
                    &mut state.plot.correlation,
                    &[CorrelationPlot::Scatter, CorrelationPlot::Line],
                );
                column_combo(ui, "corr_x", "X", &mut state.plot.x);
                column_combo(ui, "corr_y", "Y", &mut state.plot.y);
            }
            PlotCategory::Network => {
                let layout_before = state.plot.layout;
                combo(ui, "net_layout", "Layout", &mut state.plot.layout, &Layout::ALL);
                column_combo(ui, "net_column", "Column", &mut state.plot.column);
                if ui.button("Resample").clicked() {
                    state.regenerate_network();
                } else if !state.sync_network() && layout_before != state.plot.layout {
                    state.relayout_network();
                }
            }
        }
    });
    ui.separator();

    let colors = state.colors;
    let settings = &state.plot;
    match settings.category {
        PlotCategory::Distribution => match settings.distribution {
            DistributionPlot::Histogram => histogram_plot(ui, &table, settings.column, &colors),
            DistributionPlot::Kde => curve_plot(
                ui,
                "kde_plot",
                settings.column,
                "Density",
                charts::kde(&table, settings.column),
                &colors,
            ),
            DistributionPlot::Ecdf => curve_plot(
                ui,
                "ecdf_plot",
                settings.column,
                "Proportion",
                charts::ecdf(&table, settings.column),
                &colors,
            ),
            DistributionPlot::Rug => rug_plot(ui, &table, settings.column, &colors),
            DistributionPlot::Box => box_plot(ui, &table, settings.column, &colors),
        },
        PlotCategory::Proportion => match settings.proportion {
            ProportionPlot::Pie => pie_plot(ui, &table, settings.column, &colors),
            ProportionPlot::StackedBar => stacked_bar_plot(ui, &table, settings.column),
        },
        PlotCategory::Correlation => {
            correlation_plot(ui, &table, settings.x, settings.y, settings.correlation, &colors)
        }
        PlotCategory::Network => {
            if let Some(view) = &state.network {
                network_plot(ui, view, &colors);
            }
        }
    }
}

fn combo<T: Copy + PartialEq + std::fmt::Display>(
    ui: &mut Ui,
    id: &str,
    label: &str,
    value: &mut T,
    choices: &[T],
) {
    ui.label(label);
    egui::ComboBox::from_id_salt(id)
        .selected_text(value.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            for choice in choices {
                ui.selectable_value(value, *choice, choice.to_string());
            }
        });
}

fn column_combo(ui: &mut Ui, id: &str, label: &str, value: &mut Column) {
    combo(ui, id, label, value, &Column::NUMERIC);
}

fn title(ui: &mut Ui, text: String) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(RichText::new(text).strong());
    });
}

/// Axis formatter printing development level names at integer positions.
fn level_axis(levels: Vec<HumanDevelopment>) -> impl Fn(egui_plot::GridMark, &std::ops::RangeInclusive<f64>) -> String {
    move |mark, _range| {
        let i = mark.value.round();
        if (mark.value - i).abs() > 1e-6 || i < 0.0 {
            return String::new();
        }
        levels
            .get(i as usize)
            .map(|l| l.to_string())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Distribution
// ---------------------------------------------------------------------------

fn histogram_plot(ui: &mut Ui, table: &Table, column: Column, colors: &LevelColors) {
    let Some(hist) = charts::histogram(table, column) else {
        return;
    };
    title(ui, format!("A graph showing the frequency of {}", column.title()));

    let mut charts_so_far: Vec<BarChart> = Vec::new();
    for (level, counts) in &hist.counts {
        let bars = counts
            .iter()
            .enumerate()
            .map(|(i, &count)| Bar::new(hist.bin_center(i), count as f64).width(hist.bin_width))
            .collect();
        let below: Vec<&BarChart> = charts_so_far.iter().collect();
        let chart = BarChart::new(bars)
            .name(level.label())
            .color(colors.color_for(*level))
            .stack_on(&below);
        charts_so_far.push(chart);
    }

    Plot::new("histogram_plot")
        .legend(Legend::default())
        .x_axis_label(column.name())
        .y_axis_label("Frequency")
        .show(ui, |plot_ui| {
            for chart in charts_so_far {
                plot_ui.bar_chart(chart);
            }
        });
}

fn curve_plot(
    ui: &mut Ui,
    id: &str,
    column: Column,
    y_label: &str,
    curves: std::collections::BTreeMap<HumanDevelopment, Vec<[f64; 2]>>,
    colors: &LevelColors,
) {
    title(ui, format!("A graph showing the distribution of {}", column.title()));
    Plot::new(id)
        .legend(Legend::default())
        .x_axis_label(column.name())
        .y_axis_label(y_label)
        .show(ui, |plot_ui| {
            for (level, points) in curves {
                let line = Line::new(PlotPoints::new(points))
                    .name(level.label())
                    .color(colors.color_for(level))
                    .width(2.0);
                plot_ui.line(line);
            }
        });
}

fn rug_plot(ui: &mut Ui, table: &Table, column: Column, colors: &LevelColors) {
    title(ui, format!("Rug of {}", column.title()));
    let groups = charts::values_by_level(table, column);
    Plot::new("rug_plot")
        .legend(Legend::default())
        .x_axis_label(column.name())
        .include_y(-1.0)
        .include_y(1.0)
        .show(ui, |plot_ui| {
            for (level, values) in groups {
                let points: PlotPoints = values.into_iter().map(|v| [v, 0.0]).collect();
                plot_ui.points(
                    Points::new(points)
                        .shape(MarkerShape::Vertical)
                        .radius(8.0)
                        .name(level.label())
                        .color(colors.color_for(level)),
                );
            }
        });
}

fn box_plot(ui: &mut Ui, table: &Table, column: Column, colors: &LevelColors) {
    title(ui, format!("Spread of {} by human development", column.title()));
    let spreads = charts::box_spreads(table, column);
    let levels: Vec<HumanDevelopment> = spreads.iter().map(|(l, _)| *l).collect();
    Plot::new("box_plot")
        .legend(Legend::default())
        .y_axis_label(column.name())
        .x_axis_formatter(level_axis(levels))
        .show(ui, |plot_ui| {
            for (i, (level, s)) in spreads.into_iter().enumerate() {
                let elem = BoxElem::new(i as f64, BoxSpread::new(s.min, s.q1, s.median, s.q3, s.max))
                    .name(level.label())
                    .box_width(0.6);
                plot_ui.box_plot(
                    BoxPlot::new(vec![elem])
                        .name(level.label())
                        .color(colors.color_for(level)),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Proportion
// ---------------------------------------------------------------------------

fn pie_plot(ui: &mut Ui, table: &Table, column: Column, colors: &LevelColors) {
    title(
        ui,
        format!("A graph showing the proportion of {} by human development", column.name()),
    );
    let slices = charts::sums_by_level(table, column);
    let total: f64 = slices.iter().map(|(_, v)| v).sum();
    if !(total > 0.0) {
        ui.label("Nothing to show: the column sums to zero.");
        return;
    }

    Plot::new("pie_plot")
        .legend(Legend::default())
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            // Counter-clockwise from twelve o'clock.
            let mut start = FRAC_PI_2;
            for (level, value) in slices {
                let sweep = TAU * value / total;
                let steps = ((sweep / TAU) * 120.0).ceil().max(2.0) as usize;
                let mut outline = vec![[0.0, 0.0]];
                outline.extend((0..=steps).map(|s| {
                    let a = start + sweep * s as f64 / steps as f64;
                    [a.cos(), a.sin()]
                }));
                let mid = start + sweep / 2.0;
                plot_ui.polygon(
                    Polygon::new(PlotPoints::new(outline))
                        .name(level.label())
                        .fill_color(colors.color_for(level))
                        .stroke(Stroke::new(1.0, Color32::WHITE)),
                );
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(0.65 * mid.cos(), 0.65 * mid.sin()),
                        format!("{:.1}%", 100.0 * value / total),
                    )
                    .color(Color32::BLACK),
                );
                start += sweep;
            }
        });
}

fn stacked_bar_plot(ui: &mut Ui, table: &Table, column: Column) {
    title(
        ui,
        format!("Proportion of {} of the top 10 ISO codes by human development", column.name()),
    );
    let pivot = charts::top_iso_pivot(table, column, 10);
    let palette = generate_palette(pivot.series.len());

    let mut stacked: Vec<BarChart> = Vec::new();
    for ((iso, sums), color) in pivot.series.iter().zip(palette) {
        let bars = sums
            .iter()
            .enumerate()
            .map(|(i, &v)| Bar::new(i as f64, v).width(0.6))
            .collect();
        let below: Vec<&BarChart> = stacked.iter().collect();
        let chart = BarChart::new(bars).name(iso).color(color).stack_on(&below);
        stacked.push(chart);
    }

    Plot::new("stacked_bar_plot")
        .legend(Legend::default())
        .x_axis_label("Human Development")
        .y_axis_label("Proportion")
        .x_axis_formatter(level_axis(pivot.levels.clone()))
        .show(ui, |plot_ui| {
            for chart in stacked {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

fn correlation_plot(
    ui: &mut Ui,
    table: &Table,
    x: Column,
    y: Column,
    kind: CorrelationPlot,
    colors: &LevelColors,
) {
    title(
        ui,
        format!("A graph showing the correlation of {} and {}", x.title(), y.title()),
    );
    let pairs = charts::correlation_pairs(table, x, y, kind == CorrelationPlot::Line);
    Plot::new("correlation_plot")
        .legend(Legend::default())
        .x_axis_label(x.name())
        .y_axis_label(y.name())
        .show(ui, |plot_ui| {
            for (level, points) in pairs {
                let color = colors.color_for(level);
                match kind {
                    CorrelationPlot::Scatter => plot_ui.points(
                        Points::new(PlotPoints::new(points))
                            .radius(3.0)
                            .name(level.label())
                            .color(color),
                    ),
                    CorrelationPlot::Line => plot_ui.line(
                        Line::new(PlotPoints::new(points))
                            .name(level.label())
                            .color(color)
                            .width(1.5),
                    ),
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

fn network_plot(ui: &mut Ui, view: &NetworkView, colors: &LevelColors) {
    let column = view.graph.column.map_or("", Column::name);
    title(
        ui,
        format!(
            "Random {column} and human development relation of {} countries",
            view.graph.edges.len()
        ),
    );
    Plot::new("network_plot")
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .show(ui, |plot_ui| {
            for edge in &view.graph.edges {
                let (a, b) = (view.positions[edge.a], view.positions[edge.b]);
                plot_ui.line(
                    Line::new(PlotPoints::new(vec![a, b]))
                        .color(Color32::DARK_GRAY)
                        .width((edge.weight / 50.0).clamp(0.5, 8.0) as f32),
                );
                plot_ui.text(Text::new(
                    PlotPoint::new((a[0] + b[0]) / 2.0, (a[1] + b[1]) / 2.0),
                    format!("{}", edge.weight),
                ));
            }
            for (node, p) in view.graph.nodes.iter().zip(&view.positions) {
                plot_ui.points(
                    Points::new(PlotPoints::new(vec![*p]))
                        .radius(12.0)
                        .filled(true)
                        .color(colors.node_color(node)),
                );
                plot_ui.text(
                    Text::new(PlotPoint::new(p[0], p[1]), node.to_string()).color(Color32::BLACK),
                );
            }
        });
}
