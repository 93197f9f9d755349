//! Collision-driven recursive splitting of position rectangles.
//!
//! Every rectangle is processed independently: collision-free rectangles pass
//! through, colliding ones are halved along their longer axis until the
//! pieces are collision-free or their diagonal falls below the terminal
//! radius (such pieces are treated as fully blocked and discarded).
//!
//! Rectangles are embarrassingly parallel; the indexed map keeps the output
//! in input order, so results are identical across thread counts.

use rayon::prelude::*;

use crate::checker::{CollisionChecker, CollisionSnapshot};
use crate::error::Result;
use crate::geometry::Rect;

/// Collision-free part of `rectangles` at `step`, as a list of sub-rectangles
/// in input-index order. A checker failure aborts the whole step.
pub fn check_collision_and_split_rectangles<C: CollisionChecker>(
    step: usize,
    checker: &C,
    rectangles: &[Rect],
    radius_terminal_split: f64,
) -> Result<Vec<Rect>> {
    let snapshot = checker.at(step)?;
    let radius_terminal_squared = radius_terminal_split * radius_terminal_split;

    let split: Vec<Vec<Rect>> = rectangles
        .par_iter()
        .map(|rectangle| {
            if !snapshot.collides(rectangle) {
                vec![*rectangle]
            } else {
                create_collision_free_rectangles(&snapshot, *rectangle, radius_terminal_squared)
            }
        })
        .collect();

    Ok(split.into_iter().flatten().collect())
}

/// Recursive quadtree-like subdivision of a colliding rectangle.
pub fn create_collision_free_rectangles<S: CollisionSnapshot>(
    snapshot: &S,
    rectangle: Rect,
    radius_terminal_squared: f64,
) -> Vec<Rect> {
    if rectangle.diagonal_squared() <= radius_terminal_squared {
        return Vec::new();
    }
    if !snapshot.collides(&rectangle) {
        return vec![rectangle];
    }
    let (first, second) = rectangle.split();
    let mut out = create_collision_free_rectangles(snapshot, first, radius_terminal_squared);
    out.extend(create_collision_free_rectangles(
        snapshot,
        second,
        radius_terminal_squared,
    ));
    out
}
