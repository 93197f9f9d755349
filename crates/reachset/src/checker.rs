//! Collision checker boundary.
//!
//! The engine never builds obstacle geometry itself; it consumes a
//! time-indexed query with two operations: `at(step)` yields the obstacle
//! view of one step, and the view answers `collides(rect)` in the curvilinear
//! frame. The view must be shareable across the worker threads of a step.
//!
//! `ObstacleSetChecker` is the concrete implementation backed by axis-aligned
//! boxes: one static group plus a per-step list of dynamic groups, both
//! inflated by the vehicle disc radius at construction.

use crate::error::{Error, Result};
use crate::geometry::Rect;

/// Obstacle view at a fixed step.
pub trait CollisionSnapshot {
    /// True when `rect` intersects an obstacle at this step.
    fn collides(&self, rect: &Rect) -> bool;
}

/// Time-indexed collision query.
pub trait CollisionChecker: Sync {
    type Snapshot<'a>: CollisionSnapshot + Sync
    where
        Self: 'a;

    /// Obstacle view at `step`; fails when the step is outside the horizon
    /// covered by the obstacle data.
    fn at(&self, step: usize) -> Result<Self::Snapshot<'_>>;
}

/// Collision checker over static and per-step dynamic AABB obstacles.
#[derive(Clone, Debug, Default)]
pub struct ObstacleSetChecker {
    static_obstacles: Vec<Rect>,
    /// Index = step. Empty when the scenario has no dynamic obstacles, in
    /// which case every step is valid.
    dynamic_obstacles: Vec<Vec<Rect>>,
}

impl ObstacleSetChecker {
    /// Builds the checker, inflating every obstacle by `radius_disc` so that
    /// point-mass queries account for the vehicle's disc footprint.
    pub fn new(
        static_obstacles: Vec<Rect>,
        dynamic_obstacles: Vec<Vec<Rect>>,
        radius_disc: f64,
    ) -> Self {
        let inflate = |rects: Vec<Rect>| -> Vec<Rect> {
            rects.into_iter().map(|r| r.inflate(radius_disc)).collect()
        };
        Self {
            static_obstacles: inflate(static_obstacles),
            dynamic_obstacles: dynamic_obstacles.into_iter().map(inflate).collect(),
        }
    }

    /// Checker without any obstacles; every query is collision-free.
    pub fn empty() -> Self {
        Self::default()
    }
}

impl CollisionChecker for ObstacleSetChecker {
    type Snapshot<'a>
        = ObstacleSnapshot<'a>
    where
        Self: 'a;

    fn at(&self, step: usize) -> Result<ObstacleSnapshot<'_>> {
        let dynamic: &[Rect] = if self.dynamic_obstacles.is_empty() {
            &[]
        } else {
            self.dynamic_obstacles
                .get(step)
                .map(Vec::as_slice)
                .ok_or_else(|| {
                    Error::checker(
                        step,
                        format!(
                            "step beyond dynamic obstacle horizon of {} steps",
                            self.dynamic_obstacles.len()
                        ),
                    )
                })?
        };
        Ok(ObstacleSnapshot {
            static_obstacles: &self.static_obstacles,
            dynamic_obstacles: dynamic,
        })
    }
}

/// Borrowed obstacle view of one step.
#[derive(Clone, Copy, Debug)]
pub struct ObstacleSnapshot<'a> {
    static_obstacles: &'a [Rect],
    dynamic_obstacles: &'a [Rect],
}

impl CollisionSnapshot for ObstacleSnapshot<'_> {
    fn collides(&self, rect: &Rect) -> bool {
        self.static_obstacles
            .iter()
            .chain(self.dynamic_obstacles)
            .any(|obstacle| obstacle.overlaps_strictly(rect))
    }
}
