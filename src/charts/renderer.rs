//! Static Chart Renderer
//! Draws the dashboard charts as SVG documents with plotters.
//!
//! Layout of every chart: centered title on top, plot area below. Pie and
//! donut charts carry a legend on the right-hand side.

use super::plotter::{
    format_axis_value, format_currency, palette_color, pie_slices, polar_point, slice_polygon,
    PRIMARY_COLOR,
};
use super::treemap::{squarify, LayoutRect};
use super::ChartError;
use crate::aggregate::{AggregateTable, ScatterPoint, TreemapNode};
use log::debug;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::collections::BTreeSet;

const FONT: &str = "sans-serif";
const TITLE_SIZE: i32 = 22;
const LABEL_SIZE: i32 = 12;
const HEADER_HEIGHT: f64 = 16.0;

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Vertical bars with the value above each bar as currency.
    pub fn bar_chart(table: &AggregateTable, title: &str, size: (u32, u32)) -> Result<String, ChartError> {
        if table.is_empty() {
            return Err(ChartError::NoData(title.to_string()));
        }
        let labels = table.keys();
        let values = table.values();
        let n = labels.len();
        let (y_min, y_max) = Self::get_y_range(&values, true);

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
            root.fill(&WHITE)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(title, (FONT, TITLE_SIZE))
                .margin(15)
                .x_label_area_size(45)
                .y_label_area_size(80)
                .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), y_min..y_max)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(n)
                .x_label_formatter(&|x| Self::category_label(&labels, *x))
                .y_label_formatter(&|y| format_axis_value(*y))
                .x_desc(table.key_column.as_str())
                .y_desc(table.value_column.as_str())
                .label_style((FONT, LABEL_SIZE))
                .draw()?;

            chart.draw_series(values.iter().enumerate().map(|(i, v)| {
                let x = i as f64;
                Rectangle::new([(x - 0.35, 0.0), (x + 0.35, *v)], PRIMARY_COLOR.filled())
            }))?;

            let value_style = (FONT, LABEL_SIZE)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Bottom));
            chart.draw_series(
                values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| Text::new(format_currency(*v), (i as f64, *v), value_style.clone())),
            )?;

            root.present()?;
        }
        debug!("Rendered bar chart '{}' ({} bars)", title, n);
        Ok(svg)
    }

    /// Pie chart; `hole` is the inner radius as a fraction of the outer one
    /// (0 for a full pie, 0.5 for the region donut).
    pub fn pie_chart(
        table: &AggregateTable,
        title: &str,
        hole: f64,
        size: (u32, u32),
    ) -> Result<String, ChartError> {
        if table.is_empty() {
            return Err(ChartError::NoData(title.to_string()));
        }
        let values = table.values();
        let (w, h) = (size.0 as f64, size.1 as f64);
        let center = ((w * 0.38) as i32, (h * 0.55) as i32);
        let outer = (w * 0.3).min(h * 0.36);
        let inner = outer * hole.clamp(0.0, 0.95);

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
            root.fill(&WHITE)?;
            Self::draw_title(&root, title, size)?;

            let pct_style = (FONT, LABEL_SIZE)
                .into_font()
                .color(&WHITE)
                .pos(Pos::new(HPos::Center, VPos::Center));
            let label_radius = if inner > 0.0 {
                (outer + inner) / 2.0
            } else {
                outer * 0.65
            };

            for (i, slice) in pie_slices(&values).iter().enumerate() {
                if slice.fraction <= 0.0 {
                    continue;
                }
                let polygon = slice_polygon(center, outer, inner, slice);
                root.draw(&Polygon::new(polygon, palette_color(i).filled()))?;

                // Slivers get no label
                if slice.fraction >= 0.03 {
                    root.draw(&Text::new(
                        format!("{:.1}%", slice.fraction * 100.0),
                        polar_point(center, label_radius, slice.mid_angle()),
                        pct_style.clone(),
                    ))?;
                }
            }

            Self::draw_legend(&root, &table.keys(), ((w * 0.75) as i32, (h * 0.25) as i32))?;
            root.present()?;
        }
        debug!("Rendered pie chart '{}' ({} slices)", title, values.len());
        Ok(svg)
    }

    /// Line with markers over the time-series table, one point per period.
    pub fn line_chart(table: &AggregateTable, title: &str, size: (u32, u32)) -> Result<String, ChartError> {
        if table.is_empty() {
            return Err(ChartError::NoData(title.to_string()));
        }
        let labels = table.keys();
        let values = table.values();
        let n = labels.len();
        let (y_min, y_max) = Self::get_y_range(&values, false);
        let x_max = (n as f64 - 1.0).max(1.0);

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
            root.fill(&WHITE)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(title, (FONT, TITLE_SIZE))
                .margin(15)
                .x_label_area_size(45)
                .y_label_area_size(80)
                .build_cartesian_2d(-0.5f64..(x_max + 0.5), y_min..y_max)?;

            chart
                .configure_mesh()
                .x_labels(n.min(12))
                .x_label_formatter(&|x| Self::category_label(&labels, *x))
                .y_label_formatter(&|y| format_axis_value(*y))
                .x_desc(table.key_column.as_str())
                .y_desc(table.value_column.as_str())
                .label_style((FONT, LABEL_SIZE))
                .draw()?;

            let points: Vec<(f64, f64)> = values.iter().enumerate().map(|(i, v)| (i as f64, *v)).collect();
            chart.draw_series(LineSeries::new(points.iter().copied(), PRIMARY_COLOR.stroke_width(2)))?;
            chart.draw_series(
                points
                    .iter()
                    .map(|p| Circle::new(*p, 3, PRIMARY_COLOR.filled())),
            )?;

            root.present()?;
        }
        debug!("Rendered line chart '{}' ({} points)", title, n);
        Ok(svg)
    }

    /// Three-level treemap: Region boxes, Category boxes inside them and
    /// Sub-Category leaves coloured by Sub-Category.
    pub fn treemap(nodes: &[TreemapNode], title: &str, size: (u32, u32)) -> Result<String, ChartError> {
        if nodes.iter().all(|n| n.sales <= 0.0) {
            return Err(ChartError::NoData(title.to_string()));
        }
        let leaf_names = Self::leaf_labels(nodes);
        let bounds = LayoutRect::new(10.0, 40.0, size.0 as f64 - 20.0, size.1 as f64 - 50.0);

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
            root.fill(&WHITE)?;
            Self::draw_title(&root, title, size)?;
            Self::draw_treemap_level(&root, nodes, bounds, &leaf_names, 0)?;
            root.present()?;
        }
        debug!("Rendered treemap '{}' ({} top-level nodes)", title, nodes.len());
        Ok(svg)
    }

    /// Sales on x, Profit on y, marker radius grows with Quantity.
    pub fn scatter(points: &[ScatterPoint], title: &str, size: (u32, u32)) -> Result<String, ChartError> {
        if points.is_empty() {
            return Err(ChartError::NoData(title.to_string()));
        }
        let sales: Vec<f64> = points.iter().map(|p| p.sales).collect();
        let profit: Vec<f64> = points.iter().map(|p| p.profit).collect();
        let (x_min, x_max) = Self::get_y_range(&sales, true);
        let (y_min, y_max) = Self::get_y_range(&profit, true);

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
            root.fill(&WHITE)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(title, (FONT, TITLE_SIZE))
                .margin(15)
                .x_label_area_size(45)
                .y_label_area_size(80)
                .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

            chart
                .configure_mesh()
                .x_label_formatter(&|x| format_axis_value(*x))
                .y_label_formatter(&|y| format_axis_value(*y))
                .x_desc("Sales")
                .y_desc("Profit")
                .label_style((FONT, LABEL_SIZE))
                .draw()?;

            chart.draw_series(points.iter().map(|p| {
                Circle::new(
                    (p.sales, p.profit),
                    Self::marker_radius(p.quantity),
                    PRIMARY_COLOR.mix(0.5).filled(),
                )
            }))?;

            root.present()?;
        }
        debug!("Rendered scatter '{}' ({} points)", title, points.len());
        Ok(svg)
    }

    fn draw_treemap_level<DB: DrawingBackend>(
        root: &DrawingArea<DB, plotters::coord::Shift>,
        nodes: &[TreemapNode],
        bounds: LayoutRect,
        leaf_names: &[String],
        depth: usize,
    ) -> Result<(), ChartError>
    where
        DB::ErrorType: 'static,
    {
        let values: Vec<f64> = nodes.iter().map(|n| n.sales).collect();
        let rects = squarify(&values, bounds);
        let label_style = (FONT, LABEL_SIZE - depth as i32)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Left, VPos::Top));

        for (node, rect) in nodes.iter().zip(rects) {
            if rect.area() <= 0.0 {
                continue;
            }

            let fill = if node.is_leaf() {
                let idx = leaf_names.iter().position(|l| *l == node.label).unwrap_or(0);
                palette_color(idx).mix(0.85).filled()
            } else {
                RGBColor(236, 240, 241).mix(1.0 - 0.2 * depth as f64).filled()
            };
            root.draw(&Rectangle::new(Self::pixels(&rect), fill))?;
            root.draw(&Rectangle::new(Self::pixels(&rect), WHITE.stroke_width(1)))?;

            if rect.w > 50.0 && rect.h > HEADER_HEIGHT {
                let text = if node.is_leaf() {
                    format!("{} {}", node.label, format_currency(node.sales))
                } else {
                    node.label.clone()
                };
                root.draw(&Text::new(
                    text,
                    ((rect.x + 3.0) as i32, (rect.y + 2.0) as i32),
                    label_style.clone(),
                ))?;
            }

            if !node.is_leaf() {
                let inner = rect.below_header(HEADER_HEIGHT).inset(2.0);
                Self::draw_treemap_level(root, &node.children, inner, leaf_names, depth + 1)?;
            }
        }
        Ok(())
    }

    fn draw_title<DB: DrawingBackend>(
        root: &DrawingArea<DB, plotters::coord::Shift>,
        title: &str,
        size: (u32, u32),
    ) -> Result<(), ChartError>
    where
        DB::ErrorType: 'static,
    {
        let style = (FONT, TITLE_SIZE)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Top));
        root.draw(&Text::new(title.to_string(), ((size.0 / 2) as i32, 10), style))?;
        Ok(())
    }

    fn draw_legend<DB: DrawingBackend>(
        root: &DrawingArea<DB, plotters::coord::Shift>,
        labels: &[&str],
        origin: (i32, i32),
    ) -> Result<(), ChartError>
    where
        DB::ErrorType: 'static,
    {
        let style = (FONT, LABEL_SIZE)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Left, VPos::Center));
        for (i, label) in labels.iter().enumerate() {
            let y = origin.1 + i as i32 * 22;
            root.draw(&Rectangle::new(
                [(origin.0, y - 7), (origin.0 + 14, y + 7)],
                palette_color(i).filled(),
            ))?;
            root.draw(&Text::new(label.to_string(), (origin.0 + 20, y), style.clone()))?;
        }
        Ok(())
    }

    /// Distinct leaf labels in sorted order; a leaf's colour is its index here.
    fn leaf_labels(nodes: &[TreemapNode]) -> Vec<String> {
        fn walk(nodes: &[TreemapNode], out: &mut BTreeSet<String>) {
            for node in nodes {
                if node.is_leaf() {
                    out.insert(node.label.clone());
                } else {
                    walk(&node.children, out);
                }
            }
        }
        let mut set = BTreeSet::new();
        walk(nodes, &mut set);
        set.into_iter().collect()
    }

    fn category_label(labels: &[&str], x: f64) -> String {
        let idx = x.round();
        if (x - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        labels.get(idx as usize).map(|s| s.to_string()).unwrap_or_default()
    }

    fn marker_radius(quantity: i64) -> i32 {
        let q = quantity.max(0) as f64;
        (3.0 + 2.0 * q.sqrt()).min(20.0).round() as i32
    }

    fn pixels(rect: &LayoutRect) -> [(i32, i32); 2] {
        [
            (rect.x.round() as i32, rect.y.round() as i32),
            ((rect.x + rect.w).round() as i32, (rect.y + rect.h).round() as i32),
        ]
    }

    /// Value axis range padded by 10%; optionally forced to include zero.
    fn get_y_range(values: &[f64], include_zero: bool) -> (f64, f64) {
        let finite = values.iter().copied().filter(|v| v.is_finite());
        let (mut min, mut max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if min.is_infinite() {
            return (0.0, 1.0);
        }
        if include_zero {
            min = min.min(0.0);
            max = max.max(0.0);
        }
        let span = max - min;
        let pad = if span > 0.0 { span * 0.1 } else { max.abs().max(1.0) * 0.1 };
        let lo = if include_zero && min >= 0.0 { 0.0 } else { min - pad };
        (lo, max + pad)
    }
}
