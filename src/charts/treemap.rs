//! Squarified treemap layout.
//!
//! Bruls, Huizing and van Wijk: rows of rectangles are laid along the shorter
//! side of the remaining area, and a row is closed as soon as adding the next
//! value would worsen its worst aspect ratio.

use std::cmp::Ordering;

/// Axis-aligned rectangle in drawing units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl LayoutRect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    /// Shrink by `pad` on every side, never below zero size.
    pub fn inset(&self, pad: f64) -> Self {
        let w = (self.w - 2.0 * pad).max(0.0);
        let h = (self.h - 2.0 * pad).max(0.0);
        Self::new(self.x + pad, self.y + pad, w, h)
    }

    /// Remove a band of `height` from the top, used for group headers.
    pub fn below_header(&self, height: f64) -> Self {
        let h = (self.h - height).max(0.0);
        Self::new(self.x, self.y + (self.h - h), self.w, h)
    }
}

/// Lay out `values` inside `bounds` with areas proportional to the values.
///
/// The result is index-aligned with `values`. Non-positive values get an empty
/// rectangle at the origin of `bounds`.
pub fn squarify(values: &[f64], bounds: LayoutRect) -> Vec<LayoutRect> {
    let empty = LayoutRect::new(bounds.x, bounds.y, 0.0, 0.0);
    let mut out = vec![empty; values.len()];

    let total: f64 = values.iter().filter(|v| **v > 0.0).sum();
    if total <= 0.0 || bounds.area() <= 0.0 {
        return out;
    }
    let scale = bounds.area() / total;

    let mut order: Vec<usize> = (0..values.len()).filter(|&i| values[i] > 0.0).collect();
    order.sort_by(|&a, &b| {
        values[b]
            .partial_cmp(&values[a])
            .unwrap_or(Ordering::Equal)
    });
    let areas: Vec<(usize, f64)> = order.into_iter().map(|i| (i, values[i] * scale)).collect();

    let mut remaining = bounds;
    let mut row: Vec<(usize, f64)> = Vec::new();

    for &item in &areas {
        let side = remaining.w.min(remaining.h);
        if row.is_empty() {
            row.push(item);
            continue;
        }

        let current = worst_ratio(&row, side);
        row.push(item);
        if worst_ratio(&row, side) > current {
            row.pop();
            remaining = lay_row(&row, remaining, &mut out);
            row.clear();
            row.push(item);
        }
    }

    if !row.is_empty() {
        lay_row(&row, remaining, &mut out);
    }

    out
}

/// Worst aspect ratio of a row laid along a side of length `side`.
fn worst_ratio(row: &[(usize, f64)], side: f64) -> f64 {
    let sum: f64 = row.iter().map(|(_, a)| a).sum();
    if sum <= 0.0 || side <= 0.0 {
        return f64::INFINITY;
    }
    let max = row.iter().map(|(_, a)| *a).fold(f64::MIN, f64::max);
    let min = row.iter().map(|(_, a)| *a).fold(f64::MAX, f64::min);
    let (side2, sum2) = (side * side, sum * sum);
    (side2 * max / sum2).max(sum2 / (side2 * min))
}

/// Place a row along the shorter side and return the area left over.
fn lay_row(row: &[(usize, f64)], rect: LayoutRect, out: &mut [LayoutRect]) -> LayoutRect {
    let sum: f64 = row.iter().map(|(_, a)| a).sum();

    if rect.w >= rect.h {
        let col_w = if rect.h > 0.0 { sum / rect.h } else { 0.0 };
        let mut y = rect.y;
        for &(idx, area) in row {
            let h = if col_w > 0.0 { area / col_w } else { 0.0 };
            out[idx] = LayoutRect::new(rect.x, y, col_w, h);
            y += h;
        }
        LayoutRect::new(rect.x + col_w, rect.y, (rect.w - col_w).max(0.0), rect.h)
    } else {
        let row_h = if rect.w > 0.0 { sum / rect.w } else { 0.0 };
        let mut x = rect.x;
        for &(idx, area) in row {
            let w = if row_h > 0.0 { area / row_h } else { 0.0 };
            out[idx] = LayoutRect::new(x, rect.y, w, row_h);
            x += w;
        }
        LayoutRect::new(rect.x, rect.y + row_h, rect.w, (rect.h - row_h).max(0.0))
    }
}
