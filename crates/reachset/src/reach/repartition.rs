//! Position-domain projection and grid repartition.
//!
//! Propagated base sets project to arbitrarily overlapping position
//! rectangles. The repartition rewrites their union as a disjoint cover with
//! all edges on a grid of step `size_grid`: translate to the common minimum,
//! round outward onto the integer grid (so the cover contains the continuous
//! union), sweep-line repartition, and map back.
//!
//! The sweep is single-threaded: bands depend on their predecessors and the
//! per-step cost is small.

use crate::error::{Error, Result};
use crate::geometry::{GridRect, Rect};
use crate::reach::node::ReachNode;

/// Position rectangles of the given base sets, in input order.
pub fn project_to_position_domain(base_sets: &[ReachNode]) -> Vec<Rect> {
    base_sets.iter().map(ReachNode::position_rectangle).collect()
}

/// Disjoint grid-aligned cover of the union of `rectangles`.
///
/// Outward rounding makes the result an overapproximation bounded by one grid
/// cell per edge. Empty input yields empty output; a non-positive grid size
/// is rejected.
pub fn create_repartitioned_rectangles(rectangles: &[Rect], size_grid: f64) -> Result<Vec<Rect>> {
    if !(size_grid > 0.0) {
        return Err(Error::config("size_grid must be positive"));
    }
    if rectangles.is_empty() {
        return Ok(Vec::new());
    }
    let p_min = minimum_positions(rectangles);
    let discretized = discretize_rectangles(rectangles, p_min, size_grid);
    let repartitioned = repartition_rectangles(&discretized);
    Ok(undiscretize_rectangles(&repartitioned, p_min, size_grid))
}

/// Componentwise minimum corner over all rectangles.
pub fn minimum_positions(rectangles: &[Rect]) -> (f64, f64) {
    let x = rectangles.iter().map(|r| r.x_min).fold(f64::INFINITY, f64::min);
    let y = rectangles.iter().map(|r| r.y_min).fold(f64::INFINITY, f64::min);
    (x, y)
}

/// Translates by `-p_min`, scales by `1/size_grid` and rounds outward (floor
/// the minima, ceil the maxima) onto the integer grid.
pub fn discretize_rectangles(
    rectangles: &[Rect],
    p_min: (f64, f64),
    size_grid: f64,
) -> Vec<GridRect> {
    rectangles
        .iter()
        .map(|r| {
            GridRect::new(
                ((r.x_min - p_min.0) / size_grid).floor() as i64,
                ((r.y_min - p_min.1) / size_grid).floor() as i64,
                ((r.x_max - p_min.0) / size_grid).ceil() as i64,
                ((r.y_max - p_min.1) / size_grid).ceil() as i64,
            )
        })
        .collect()
}

/// Inverse of `discretize_rectangles`.
pub fn undiscretize_rectangles(
    rectangles: &[GridRect],
    p_min: (f64, f64),
    size_grid: f64,
) -> Vec<Rect> {
    rectangles
        .iter()
        .map(|r| {
            Rect::new(
                r.x_min as f64 * size_grid + p_min.0,
                r.y_min as f64 * size_grid + p_min.1,
                r.x_max as f64 * size_grid + p_min.0,
                r.y_max as f64 * size_grid + p_min.1,
            )
        })
        .collect()
}

/// Sweep-line repartition on the integer grid.
///
/// Walks the unique x coordinates left to right; each band between two
/// neighbors carries the merged vertical spans of the rectangles covering it.
/// Maximal runs of bands with equal span sets become output rectangles, one
/// per span, emitted in lexicographic `(x_min, y_min)` order. Interiors of
/// the output are pairwise disjoint and the union equals the input union.
pub fn repartition_rectangles(rectangles: &[GridRect]) -> Vec<GridRect> {
    let mut xs: Vec<i64> = rectangles
        .iter()
        .flat_map(|r| [r.x_min, r.x_max])
        .collect();
    xs.sort_unstable();
    xs.dedup();
    if xs.len() < 2 {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut run_spans: Vec<(i64, i64)> = Vec::new();
    let mut run_start = xs[0];
    for window in xs.windows(2) {
        let (band_start, band_end) = (window[0], window[1]);
        let spans = vertical_spans(rectangles, band_start, band_end);
        if spans != run_spans {
            flush_run(&mut out, &run_spans, run_start, band_start);
            run_spans = spans;
            run_start = band_start;
        }
    }
    if let Some(&last) = xs.last() {
        flush_run(&mut out, &run_spans, run_start, last);
    }
    out
}

/// Merged y-intervals of the rectangles covering the band `[start, end)`.
fn vertical_spans(rectangles: &[GridRect], start: i64, end: i64) -> Vec<(i64, i64)> {
    let mut spans: Vec<(i64, i64)> = rectangles
        .iter()
        .filter(|r| r.x_min <= start && r.x_max >= end && r.y_min < r.y_max)
        .map(|r| (r.y_min, r.y_max))
        .collect();
    spans.sort_unstable();
    let mut merged: Vec<(i64, i64)> = Vec::with_capacity(spans.len());
    for (lo, hi) in spans {
        match merged.last_mut() {
            Some(last) if lo <= last.1 => last.1 = last.1.max(hi),
            _ => merged.push((lo, hi)),
        }
    }
    merged
}

fn flush_run(out: &mut Vec<GridRect>, spans: &[(i64, i64)], start: i64, end: i64) {
    if start >= end {
        return;
    }
    for &(lo, hi) in spans {
        out.push(GridRect::new(start, lo, end, hi));
    }
}
