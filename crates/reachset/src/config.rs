//! Analysis configuration.
//!
//! Grouped the way the parameters are consumed: `planning` drives the step
//! loop and the repartition grid, `vehicle.ego` bounds the dynamics,
//! `reachable_set` tunes the collision splitter and the thread pool, and
//! `initial` fixes the state box at step zero.
//!
//! All structs deserialize from JSON; `validate` must pass before the
//! configuration is handed to the analysis.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

fn default_eps() -> f64 {
    0.01
}

/// Top-level configuration of a reachability analysis run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Configuration {
    pub planning: PlanningConfiguration,
    pub vehicle: VehicleConfiguration,
    pub reachable_set: ReachableSetConfiguration,
    pub initial: InitialConfiguration,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanningConfiguration {
    /// Step duration in seconds.
    pub dt: f64,
    /// Number of propagation steps; the horizon is `steps * dt`.
    pub steps: usize,
    /// Grid size of the repartition pass.
    pub size_grid: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VehicleConfiguration {
    pub ego: EgoConfiguration,
}

/// Velocity and acceleration bounds of the decoupled double integrators, plus
/// the disc radius used to inflate obstacles at checker construction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EgoConfiguration {
    pub v_lon_min: f64,
    pub v_lon_max: f64,
    pub a_lon_min: f64,
    pub a_lon_max: f64,
    pub v_lat_min: f64,
    pub v_lat_max: f64,
    pub a_lat_min: f64,
    pub a_lat_max: f64,
    #[serde(default)]
    pub radius_disc: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReachableSetConfiguration {
    /// Terminal diagonal below which colliding rectangles are discarded.
    pub radius_terminal_split: f64,
    /// Worker threads for the parallel regions; 0 means all available cores.
    #[serde(default)]
    pub num_threads: usize,
    /// Obstacle rasterization toggle; AABB scenarios are already rasterized,
    /// so this only gates a log line.
    #[serde(default)]
    pub rasterize_obstacles: bool,
    /// Grid size of the second repartition pass after collision splitting.
    /// Defaults to `planning.size_grid`.
    #[serde(default)]
    pub size_grid_2nd: Option<f64>,
}

/// Initial state box: position and velocity midpoints with half-widths.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InitialConfiguration {
    pub p_lon: f64,
    pub p_lat: f64,
    #[serde(default = "default_eps")]
    pub p_lon_eps: f64,
    #[serde(default = "default_eps")]
    pub p_lat_eps: f64,
    pub v_lon: f64,
    pub v_lat: f64,
    #[serde(default = "default_eps")]
    pub v_lon_eps: f64,
    #[serde(default = "default_eps")]
    pub v_lat_eps: f64,
}

impl Configuration {
    /// Grid size of the second repartition pass.
    pub fn size_grid_2nd(&self) -> f64 {
        self.reachable_set
            .size_grid_2nd
            .unwrap_or(self.planning.size_grid)
    }

    /// Rejects out-of-range parameters before any computation starts.
    pub fn validate(&self) -> Result<()> {
        if !(self.planning.dt > 0.0) {
            return Err(Error::config("planning.dt must be positive"));
        }
        if !(self.planning.size_grid > 0.0) {
            return Err(Error::config("planning.size_grid must be positive"));
        }
        if let Some(size_grid_2nd) = self.reachable_set.size_grid_2nd {
            if !(size_grid_2nd > 0.0) {
                return Err(Error::config(
                    "reachable_set.size_grid_2nd must be positive",
                ));
            }
        }
        if !(self.reachable_set.radius_terminal_split > 0.0) {
            return Err(Error::config(
                "reachable_set.radius_terminal_split must be positive",
            ));
        }

        let ego = &self.vehicle.ego;
        if ego.v_lon_min > ego.v_lon_max {
            return Err(Error::config("vehicle.ego: v_lon_min > v_lon_max"));
        }
        if ego.v_lat_min > ego.v_lat_max {
            return Err(Error::config("vehicle.ego: v_lat_min > v_lat_max"));
        }
        if ego.a_lon_min > ego.a_lon_max {
            return Err(Error::config("vehicle.ego: a_lon_min > a_lon_max"));
        }
        if ego.a_lat_min > ego.a_lat_max {
            return Err(Error::config("vehicle.ego: a_lat_min > a_lat_max"));
        }
        if ego.radius_disc < 0.0 {
            return Err(Error::config("vehicle.ego.radius_disc must not be negative"));
        }

        let initial = &self.initial;
        for (name, eps) in [
            ("p_lon_eps", initial.p_lon_eps),
            ("p_lat_eps", initial.p_lat_eps),
            ("v_lon_eps", initial.v_lon_eps),
            ("v_lat_eps", initial.v_lat_eps),
        ] {
            if eps < 0.0 {
                return Err(Error::config(format!(
                    "initial.{name} must not be negative"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_configuration() -> Configuration {
        serde_json::from_str(
            r#"{
                "planning": { "dt": 0.5, "steps": 10, "size_grid": 0.25 },
                "vehicle": { "ego": {
                    "v_lon_min": 0.0, "v_lon_max": 20.0,
                    "a_lon_min": -6.0, "a_lon_max": 6.0,
                    "v_lat_min": -4.0, "v_lat_max": 4.0,
                    "a_lat_min": -2.0, "a_lat_max": 2.0
                } },
                "reachable_set": { "radius_terminal_split": 0.3 },
                "initial": { "p_lon": 12.0, "p_lat": 0.0, "v_lon": 10.0, "v_lat": 0.0 }
            }"#,
        )
        .expect("valid configuration JSON")
    }

    #[test]
    fn defaults_are_applied() {
        let config = base_configuration();
        assert_eq!(config.initial.p_lon_eps, 0.01);
        assert_eq!(config.initial.v_lat_eps, 0.01);
        assert_eq!(config.reachable_set.num_threads, 0);
        assert!(!config.reachable_set.rasterize_obstacles);
        assert_eq!(config.size_grid_2nd(), 0.25);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_inverted_bounds() {
        let mut config = base_configuration();
        config.vehicle.ego.a_lon_min = 7.0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = base_configuration();
        config.planning.dt = 0.0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = base_configuration();
        config.reachable_set.size_grid_2nd = Some(-1.0);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
