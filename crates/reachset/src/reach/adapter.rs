//! Adaptation of propagated base sets to the drivable area.
//!
//! The collision splitter works on position rectangles only; this stage puts
//! the velocity information back. Each drivable rectangle collects the
//! propagated base sets whose position projection strictly overlaps it,
//! hull-unions their lon and lat polygons, and clips the unions to the
//! rectangle's lon/lat strips. Base sets that shrink to nothing are dropped.

use std::collections::HashMap;

use nalgebra::Vector2;
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::geometry::{ReachPolygon, Rect};
use crate::reach::node::ReachNode;
use crate::reach::repartition::project_to_position_domain;

/// Maps each index of `rectangles_a` to the ordered indices of
/// `rectangles_b` it strictly overlaps. Indices without any overlap are
/// absent from the map.
pub fn create_adjacency_map(
    rectangles_a: &[Rect],
    rectangles_b: &[Rect],
) -> HashMap<usize, Vec<usize>> {
    let mut map = HashMap::new();
    for (i, a) in rectangles_a.iter().enumerate() {
        let overlapping: Vec<usize> = rectangles_b
            .iter()
            .enumerate()
            .filter(|(_, b)| a.overlaps_strictly(b))
            .map(|(j, _)| j)
            .collect();
        if !overlapping.is_empty() {
            map.insert(i, overlapping);
        }
    }
    map
}

/// Reach nodes of `step` adapted to the drivable area, in drivable-rectangle
/// order. Rectangles without a pre-image among the propagated base sets, and
/// adaptations whose lon or lat polygon turns out empty, are skipped.
pub fn adapt_base_sets_to_drivable_area(
    drivable_area: &[Rect],
    base_sets_propagated: &[ReachNode],
    step: usize,
) -> Result<Vec<ReachNode>> {
    let projected = project_to_position_domain(base_sets_propagated);
    let adjacency = create_adjacency_map(drivable_area, &projected);

    let adapted: Vec<Option<ReachNode>> = drivable_area
        .par_iter()
        .enumerate()
        .map(|(i, rectangle)| match adjacency.get(&i) {
            Some(adjacent) => {
                adapt_base_set_to_drivable_area(rectangle, base_sets_propagated, adjacent, step)
            }
            None => Ok(None),
        })
        .collect::<Result<_>>()?;

    Ok(adapted.into_iter().flatten().collect())
}

/// Adapts the union of the adjacent base sets to one drivable rectangle.
/// Returns `None` when either clipped polygon is empty.
pub fn adapt_base_set_to_drivable_area(
    rectangle_drivable_area: &Rect,
    base_sets_propagated: &[ReachNode],
    indices_adjacent: &[usize],
    step: usize,
) -> Result<Option<ReachNode>> {
    let polygon_lon = match hull_of_polygons(base_sets_propagated, indices_adjacent, |n| {
        n.polygon_lon()
    })
    .and_then(|p| clip_to_strip(p, rectangle_drivable_area.x_min, rectangle_drivable_area.x_max))
    {
        Ok(p) => p,
        Err(Error::InfeasibleIntersection) => return Ok(None),
        Err(e) => return Err(e),
    };
    let polygon_lat = match hull_of_polygons(base_sets_propagated, indices_adjacent, |n| {
        n.polygon_lat()
    })
    .and_then(|p| clip_to_strip(p, rectangle_drivable_area.y_min, rectangle_drivable_area.y_max))
    {
        Ok(p) => p,
        Err(Error::InfeasibleIntersection) => return Ok(None),
        Err(e) => return Err(e),
    };

    Ok(Some(ReachNode::new(step, polygon_lon, polygon_lat)))
}

/// Convex hull over the vertices of the selected polygons.
fn hull_of_polygons<'a, F>(
    base_sets: &'a [ReachNode],
    indices: &[usize],
    select: F,
) -> Result<ReachPolygon>
where
    F: Fn(&'a ReachNode) -> &'a ReachPolygon,
{
    let mut points: Vec<Vector2<f64>> = Vec::new();
    for &j in indices {
        let node = base_sets
            .get(j)
            .ok_or_else(|| Error::invariant(format!("adjacency index {j} out of range")))?;
        points.extend_from_slice(select(node).vertices());
    }
    ReachPolygon::from_vertices(&points)
}

/// Clips the position coordinate to `[lo, hi]`.
fn clip_to_strip(mut polygon: ReachPolygon, lo: f64, hi: f64) -> Result<ReachPolygon> {
    polygon.intersect_halfspace(1.0, 0.0, hi)?;
    polygon.intersect_halfspace(-1.0, 0.0, -lo)?;
    Ok(polygon)
}
