//! Zero-state polygon construction and one-step propagation.
//!
//! The step update of a double integrator with bounded acceleration splits
//! into the zero-input response (free flight, a shear of the base set) and
//! the zero-state response (everything reachable from rest in one step). The
//! zero-state set is a fixed hexagon per axis, so the Minkowski sum is
//! realized by summing the vertex lists pairwise and taking the convex hull.

use nalgebra::Vector2;

use crate::error::Result;
use crate::geometry::ReachPolygon;

/// Coefficient triples `(a, b, c)` of the upper and lower half-spaces
/// `a*p + b*v <= c` tangent to the reachable boundary at switching time
/// `gamma * dt`. The upper half-space bounds trajectories that accelerate
/// with `a_max` until the switch and `a_min` afterwards; the lower one is the
/// symmetric counterpart.
pub fn halfspace_coefficients(
    dt: f64,
    a_min: f64,
    a_max: f64,
    gamma: f64,
) -> ((f64, f64, f64), (f64, f64, f64)) {
    let b = dt * (1.0 - gamma);
    let dt2_half = dt * dt / 2.0;
    let upper = (
        1.0,
        -b,
        dt2_half * (gamma * gamma * (a_max - a_min) + a_min * (2.0 * gamma - 1.0)),
    );
    let lower = (
        -1.0,
        b,
        dt2_half * (gamma * gamma * (a_max - a_min) - a_max * (2.0 * gamma - 1.0)),
    );
    (upper, lower)
}

/// Box of the absolute position and velocity extremes reachable in one step
/// from the origin: `p` in `[a_min*dt^2/2, a_max*dt^2/2]`, `v` in
/// `[a_min*dt, a_max*dt]`.
pub fn zero_state_bounding_box(dt: f64, a_min: f64, a_max: f64) -> Result<ReachPolygon> {
    ReachPolygon::from_rectangle(
        a_min * dt * dt / 2.0,
        a_min * dt,
        a_max * dt * dt / 2.0,
        a_max * dt,
    )
}

/// Reachable `(delta p, delta v)` set of one step from the origin.
///
/// The bounding box is cut with the tangent half-space pairs at the switching
/// fractions 0, 1/2 and 1, which yields the characteristic hexagon enclosing
/// the curved envelope.
pub fn zero_state_polygon(dt: f64, a_min: f64, a_max: f64) -> Result<ReachPolygon> {
    let mut polygon = zero_state_bounding_box(dt, a_min, a_max)?;
    for gamma in [0.0, 0.5, 1.0] {
        let (upper, lower) = halfspace_coefficients(dt, a_min, a_max, gamma);
        polygon.intersect_halfspace(upper.0, upper.1, upper.2)?;
        polygon.intersect_halfspace(lower.0, lower.1, lower.2)?;
    }
    Ok(polygon)
}

/// Propagates a base polygon in `(p, v)` coordinates through one step.
///
/// Shear by dt (free flight), Minkowski-sum with the zero-state polygon via
/// pairwise vertex sums and convex hull, then clip to `[v_min, v_max]`. An
/// `InfeasibleIntersection` from the clip means the base set leaves the
/// admissible velocity band entirely; the caller drops it.
pub fn propagate_polygon(
    polygon: &ReachPolygon,
    polygon_zero_state: &ReachPolygon,
    dt: f64,
    v_min: f64,
    v_max: f64,
) -> Result<ReachPolygon> {
    let mut sheared = polygon.clone();
    sheared.shear(dt);

    let base = sheared.vertices();
    let zero = polygon_zero_state.vertices();
    let mut sums: Vec<Vector2<f64>> = Vec::with_capacity(base.len() * zero.len());
    for u in base {
        for w in zero {
            sums.push(u + w);
        }
    }

    let mut propagated = ReachPolygon::from_vertices(&sums)?;
    propagated.intersect_halfspace(0.0, 1.0, v_max)?;
    propagated.intersect_halfspace(0.0, -1.0, -v_min)?;
    Ok(propagated)
}
