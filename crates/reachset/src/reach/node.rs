//! Reach node: one base set of the reachable set at a step.

use crate::geometry::{ReachPolygon, Rect};

/// Cartesian product of a longitudinal polygon in (p_lon, v_lon) and a
/// lateral polygon in (p_lat, v_lat), tagged with the step it belongs to.
/// Bounds are cached at construction; the polygons are owned by value and
/// never mutated afterwards.
#[derive(Clone, Debug)]
pub struct ReachNode {
    pub step: usize,
    polygon_lon: ReachPolygon,
    polygon_lat: ReachPolygon,
    bounds_lon: Rect,
    bounds_lat: Rect,
}

impl ReachNode {
    pub fn new(step: usize, polygon_lon: ReachPolygon, polygon_lat: ReachPolygon) -> Self {
        let bounds_lon = polygon_lon.bounding_box();
        let bounds_lat = polygon_lat.bounding_box();
        Self {
            step,
            polygon_lon,
            polygon_lat,
            bounds_lon,
            bounds_lat,
        }
    }

    #[inline]
    pub fn polygon_lon(&self) -> &ReachPolygon {
        &self.polygon_lon
    }

    #[inline]
    pub fn polygon_lat(&self) -> &ReachPolygon {
        &self.polygon_lat
    }

    pub fn p_lon_min(&self) -> f64 {
        self.bounds_lon.x_min
    }

    pub fn p_lon_max(&self) -> f64 {
        self.bounds_lon.x_max
    }

    pub fn v_lon_min(&self) -> f64 {
        self.bounds_lon.y_min
    }

    pub fn v_lon_max(&self) -> f64 {
        self.bounds_lon.y_max
    }

    pub fn p_lat_min(&self) -> f64 {
        self.bounds_lat.x_min
    }

    pub fn p_lat_max(&self) -> f64 {
        self.bounds_lat.x_max
    }

    pub fn v_lat_min(&self) -> f64 {
        self.bounds_lat.y_min
    }

    pub fn v_lat_max(&self) -> f64 {
        self.bounds_lat.y_max
    }

    /// Projection onto the position domain: lon extent times lat extent.
    pub fn position_rectangle(&self) -> Rect {
        Rect::new(
            self.p_lon_min(),
            self.p_lat_min(),
            self.p_lon_max(),
            self.p_lat_max(),
        )
    }
}
