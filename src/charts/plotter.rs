//! Chart Plotter Module
//! Palette, number formatting and pie geometry shared by the SVG charts.

use plotters::style::RGBColor;
use std::f64::consts::{FRAC_PI_2, TAU};

/// Bar and line colour.
pub const PRIMARY_COLOR: RGBColor = RGBColor(52, 152, 219); // Blue

pub const PALETTE: [RGBColor; 10] = [
    RGBColor(52, 152, 219),  // Blue
    RGBColor(231, 76, 60),   // Red
    RGBColor(46, 204, 113),  // Green
    RGBColor(155, 89, 182),  // Purple
    RGBColor(243, 156, 18),  // Orange
    RGBColor(26, 188, 156),  // Teal
    RGBColor(233, 30, 99),   // Pink
    RGBColor(0, 188, 212),   // Cyan
    RGBColor(121, 85, 72),   // Brown
    RGBColor(96, 125, 139),  // Blue Grey
];

/// Colour for the `index`-th series or slice.
pub fn palette_color(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

/// `1234.5` -> `$1,234.50`; negatives as `-$1,234.50`.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${}.{:02}", group_thousands(cents / 100), cents % 100)
}

/// Axis tick text: whole dollars with separators.
pub fn format_axis_value(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let whole = value.abs().round() as u64;
    let sign = if value < 0.0 && whole > 0 { "-" } else { "" };
    format!("{sign}{}", group_thousands(whole))
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// One wedge of a pie or donut, angles in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieSlice {
    pub start: f64,
    pub end: f64,
    pub fraction: f64,
}

impl PieSlice {
    pub fn mid_angle(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// Split a full turn among `values`, starting at twelve o'clock and running
/// clockwise in screen coordinates. Negative values count as zero.
pub fn pie_slices(values: &[f64]) -> Vec<PieSlice> {
    let total: f64 = values.iter().map(|v| v.max(0.0)).sum();
    let mut angle = -FRAC_PI_2;

    values
        .iter()
        .map(|v| {
            let fraction = if total > 0.0 { v.max(0.0) / total } else { 0.0 };
            let start = angle;
            angle += fraction * TAU;
            PieSlice {
                start,
                end: angle,
                fraction,
            }
        })
        .collect()
}

/// Point on a circle around `center` at `angle`.
pub fn polar_point(center: (i32, i32), radius: f64, angle: f64) -> (i32, i32) {
    (
        center.0 + (radius * angle.cos()).round() as i32,
        center.1 + (radius * angle.sin()).round() as i32,
    )
}

/// Outline of a wedge. With `inner > 0` the wedge is a ring segment.
pub fn slice_polygon(center: (i32, i32), outer: f64, inner: f64, slice: &PieSlice) -> Vec<(i32, i32)> {
    let sweep = slice.end - slice.start;
    let steps = ((sweep.abs() / TAU) * 120.0).ceil().max(2.0) as usize;

    let mut points = Vec::with_capacity(2 * steps + 2);
    for i in 0..=steps {
        let a = slice.start + sweep * i as f64 / steps as f64;
        points.push(polar_point(center, outer, a));
    }
    if inner > 0.0 {
        for i in (0..=steps).rev() {
            let a = slice.start + sweep * i as f64 / steps as f64;
            points.push(polar_point(center, inner, a));
        }
    } else {
        points.push(center);
    }
    points
}
