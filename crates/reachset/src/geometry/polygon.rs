//! Convex polygon in half-space representation.
//!
//! A `ReachPolygon` is the intersection of finitely many closed half-spaces
//! `a·x + b·y <= c`. The vertex list (CCW) is kept consistent with the
//! half-space list across all operations, so reads never recompute:
//! substitution-style operations (translate, shear) map both representations
//! directly, and `intersect_halfspace` re-enumerates vertices and fails before
//! committing when the intersection would be empty.
//!
//! Assumptions and conventions
//! - Normals are not normalized; any finite `(a, b, c)` is accepted.
//! - Feasibility uses `<= c + EPS` with the module tolerance `EPS = 1e-9`.
//! - Constructors only build bounded (possibly degenerate) sets; vertex
//!   enumeration by pairwise boundary intersection relies on boundedness.

use nalgebra::Vector2;

use super::rect::Rect;
use super::EPS;
use crate::error::{Error, Result};

/// Closed half-space `n · x <= c`.
#[derive(Clone, Copy, Debug)]
pub struct Halfspace {
    pub n: Vector2<f64>,
    pub c: f64,
}

impl Halfspace {
    #[inline]
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Self {
            n: Vector2::new(a, b),
            c,
        }
    }

    #[inline]
    pub fn satisfies(&self, p: Vector2<f64>) -> bool {
        self.n.dot(&p) <= self.c + EPS
    }
}

/// Convex 2D polygon with consistent H-list and CCW vertex list.
#[derive(Clone, Debug)]
pub struct ReachPolygon {
    halfspaces: Vec<Halfspace>,
    vertices: Vec<Vector2<f64>>,
}

impl ReachPolygon {
    /// Axis-aligned rectangle `[x_min, x_max] x [y_min, y_max]`.
    ///
    /// Degenerate extents (min == max) are allowed; callers use them for
    /// point-like initial sets.
    pub fn from_rectangle(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Result<Self> {
        if x_min > x_max || y_min > y_max {
            return Err(Error::invariant(format!(
                "rectangle bounds inverted: ({x_min}, {y_min}, {x_max}, {y_max})"
            )));
        }
        let halfspaces = vec![
            Halfspace::new(1.0, 0.0, x_max),
            Halfspace::new(0.0, 1.0, y_max),
            Halfspace::new(-1.0, 0.0, -x_min),
            Halfspace::new(0.0, -1.0, -y_min),
        ];
        let mut vertices = vec![
            Vector2::new(x_min, y_min),
            Vector2::new(x_max, y_min),
            Vector2::new(x_max, y_max),
            Vector2::new(x_min, y_max),
        ];
        dedup_points(&mut vertices);
        sort_ccw(&mut vertices);
        Ok(Self {
            halfspaces,
            vertices,
        })
    }

    /// Convex hull of a point set.
    ///
    /// A hull with fewer than three corners (collinear or coincident input)
    /// falls back to the bounding rectangle of the points, which is exact for
    /// the axis-aligned degenerate sets produced by this crate.
    pub fn from_vertices(points: &[Vector2<f64>]) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::invariant("convex hull of an empty point set"));
        }
        if let Some(hull) = convex_hull(points) {
            let mut halfspaces = Vec::with_capacity(hull.len());
            for k in 0..hull.len() {
                let p = hull[k];
                let q = hull[(k + 1) % hull.len()];
                let edge = q - p;
                // CCW hull order, outward normal is the 90-degree CW rotation.
                let n = Vector2::new(edge.y, -edge.x);
                halfspaces.push(Halfspace { n, c: n.dot(&p) });
            }
            let mut vertices = hull;
            sort_ccw(&mut vertices);
            Ok(Self {
                halfspaces,
                vertices,
            })
        } else {
            let x_min = points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
            let x_max = points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
            let y_min = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
            let y_max = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
            Self::from_rectangle(x_min, y_min, x_max, y_max)
        }
    }

    /// Polygon from raw half-spaces; fails if the intersection is empty.
    pub fn from_halfspaces(halfspaces: Vec<Halfspace>) -> Result<Self> {
        let vertices = enumerate_vertices(&halfspaces)?;
        Ok(Self {
            halfspaces,
            vertices,
        })
    }

    #[inline]
    pub fn halfspaces(&self) -> &[Halfspace] {
        &self.halfspaces
    }

    /// CCW vertex list.
    #[inline]
    pub fn vertices(&self) -> &[Vector2<f64>] {
        &self.vertices
    }

    /// Axis-aligned bounding box of the vertex list.
    pub fn bounding_box(&self) -> Rect {
        let mut x_min = f64::INFINITY;
        let mut y_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_max = f64::NEG_INFINITY;
        for v in &self.vertices {
            x_min = x_min.min(v.x);
            y_min = y_min.min(v.y);
            x_max = x_max.max(v.x);
            y_max = y_max.max(v.y);
        }
        Rect::new(x_min, y_min, x_max, y_max)
    }

    /// Intersects with the half-space `a·x + b·y <= c`.
    ///
    /// Fails with `InfeasibleIntersection` when no vertex of the result
    /// satisfies all constraints up to `EPS`; the polygon is left unchanged in
    /// that case.
    pub fn intersect_halfspace(&mut self, a: f64, b: f64, c: f64) -> Result<()> {
        self.halfspaces.push(Halfspace::new(a, b, c));
        match enumerate_vertices(&self.halfspaces) {
            Ok(vertices) => {
                self.vertices = vertices;
                Ok(())
            }
            Err(e) => {
                self.halfspaces.pop();
                Err(e)
            }
        }
    }

    /// Moves the polygon by `(dx, dy)`: substitutes `(x, y) -> (x - dx, y - dy)`
    /// in every half-space.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        let d = Vector2::new(dx, dy);
        for h in &mut self.halfspaces {
            h.c += h.n.dot(&d);
        }
        for v in &mut self.vertices {
            *v += d;
        }
    }

    /// Horizontal shear `x -> x + shear_xy * y` of the region, realized as the
    /// substitution `x -> x - shear_xy * y` in every half-space. Models the
    /// free-flight update `p <- p + dt * v` of a double integrator.
    pub fn shear(&mut self, shear_xy: f64) {
        for h in &mut self.halfspaces {
            h.n.y -= h.n.x * shear_xy;
        }
        for v in &mut self.vertices {
            v.x += shear_xy * v.y;
        }
        sort_ccw(&mut self.vertices);
    }
}

/// Vertex enumeration by pairwise boundary intersection filtered by
/// feasibility. Returns `InfeasibleIntersection` when nothing survives.
fn enumerate_vertices(halfspaces: &[Halfspace]) -> Result<Vec<Vector2<f64>>> {
    let mut vertices = Vec::new();
    for (i, hi) in halfspaces.iter().enumerate() {
        for hj in &halfspaces[i + 1..] {
            if let Some(p) = line_intersection(hi, hj) {
                if halfspaces.iter().all(|h| h.satisfies(p)) {
                    vertices.push(p);
                }
            }
        }
    }
    if vertices.is_empty() {
        return Err(Error::InfeasibleIntersection);
    }
    dedup_points(&mut vertices);
    sort_ccw(&mut vertices);
    Ok(vertices)
}

fn line_intersection(h1: &Halfspace, h2: &Halfspace) -> Option<Vector2<f64>> {
    let det = h1.n.x * h2.n.y - h1.n.y * h2.n.x;
    if det.abs() < 1e-12 {
        return None;
    }
    let x = (h1.c * h2.n.y - h2.c * h1.n.y) / det;
    let y = (h1.n.x * h2.c - h2.n.x * h1.c) / det;
    Some(Vector2::new(x, y))
}

fn dedup_points(points: &mut Vec<Vector2<f64>>) {
    points.sort_by(|a, b| {
        a.x.partial_cmp(&b.x)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal))
    });
    points.dedup_by(|a, b| (*a - *b).norm() < EPS);
}

/// Orders points CCW around their centroid; stable for degenerate sets.
fn sort_ccw(points: &mut [Vector2<f64>]) {
    if points.len() < 3 {
        return;
    }
    let centroid =
        points.iter().fold(Vector2::zeros(), |acc, p| acc + p) / points.len() as f64;
    points.sort_by(|a, b| {
        let aa = (a.y - centroid.y).atan2(a.x - centroid.x);
        let bb = (b.y - centroid.y).atan2(b.x - centroid.x);
        aa.partial_cmp(&bb).unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Andrew's monotone chain; returns the strictly convex hull in CCW order, or
/// `None` when the input spans fewer than three non-collinear points.
fn convex_hull(points: &[Vector2<f64>]) -> Option<Vec<Vector2<f64>>> {
    let mut pts: Vec<_> = points.to_vec();
    dedup_points(&mut pts);
    if pts.len() < 3 {
        return None;
    }
    let mut lower: Vec<Vector2<f64>> = Vec::with_capacity(pts.len());
    for p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], *p) <= 0.0 {
            lower.pop();
        }
        lower.push(*p);
    }
    let mut upper: Vec<Vector2<f64>> = Vec::with_capacity(pts.len());
    for p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], *p) <= 0.0 {
            upper.pop();
        }
        upper.push(*p);
    }
    lower.pop();
    upper.pop();
    let mut hull = lower;
    hull.extend(upper);
    if hull.len() < 3 {
        return None;
    }
    Some(hull)
}

#[inline]
fn cross(a: Vector2<f64>, b: Vector2<f64>, c: Vector2<f64>) -> f64 {
    let ab = b - a;
    let ac = c - a;
    ab.x * ac.y - ab.y * ac.x
}
