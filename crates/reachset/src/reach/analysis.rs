//! Analysis driver: orchestrates the per-step pipeline over the horizon.

use rayon::ThreadPool;

use crate::checker::CollisionChecker;
use crate::config::Configuration;
use crate::error::{Error, Result};
use crate::geometry::{ReachPolygon, Rect};
use crate::reach::adapter::adapt_base_sets_to_drivable_area;
use crate::reach::collision::check_collision_and_split_rectangles;
use crate::reach::node::ReachNode;
use crate::reach::propagation::{propagate_polygon, zero_state_polygon};
use crate::reach::repartition::{create_repartitioned_rectangles, project_to_position_domain};

/// Corner tuple `(p_lon_min, p_lat_min, p_lon_max, p_lat_max)` of the initial
/// position rectangle.
pub fn initial_position_rectangle(config: &Configuration) -> Rect {
    let initial = &config.initial;
    Rect::new(
        initial.p_lon - initial.p_lon_eps,
        initial.p_lat - initial.p_lat_eps,
        initial.p_lon + initial.p_lon_eps,
        initial.p_lat + initial.p_lat_eps,
    )
}

/// Initial longitudinal and lateral base polygons in (position, velocity).
pub fn initial_base_polygons(config: &Configuration) -> Result<(ReachPolygon, ReachPolygon)> {
    let initial = &config.initial;
    let polygon_lon = ReachPolygon::from_rectangle(
        initial.p_lon - initial.p_lon_eps,
        initial.v_lon - initial.v_lon_eps,
        initial.p_lon + initial.p_lon_eps,
        initial.v_lon + initial.v_lon_eps,
    )?;
    let polygon_lat = ReachPolygon::from_rectangle(
        initial.p_lat - initial.p_lat_eps,
        initial.v_lat - initial.v_lat_eps,
        initial.p_lat + initial.p_lat_eps,
        initial.v_lat + initial.v_lat_eps,
    )?;
    Ok((polygon_lon, polygon_lat))
}

/// Per-step drivable areas and reach nodes of a completed analysis.
///
/// Index 0 holds the initial sets. When the vehicle is trapped before the
/// horizon, the vectors end at the trapping step.
#[derive(Clone, Debug, Default)]
pub struct ReachableSet {
    drivable_area: Vec<Vec<Rect>>,
    reachable_set: Vec<Vec<ReachNode>>,
}

impl ReachableSet {
    /// Last step for which results exist.
    pub fn max_step(&self) -> usize {
        self.reachable_set.len().saturating_sub(1)
    }

    /// Drivable area at `step`; warns and returns the empty slice when the
    /// step was never computed.
    pub fn drivable_area_at(&self, step: usize) -> &[Rect] {
        match self.drivable_area.get(step) {
            Some(area) => area,
            None => {
                tracing::warn!(step, "drivable area requested for an uncomputed step");
                &[]
            }
        }
    }

    /// Reach nodes at `step`; warns and returns the empty slice when the step
    /// was never computed.
    pub fn reachable_set_at(&self, step: usize) -> &[ReachNode] {
        match self.reachable_set.get(step) {
            Some(nodes) => nodes,
            None => {
                tracing::warn!(step, "reachable set requested for an uncomputed step");
                &[]
            }
        }
    }

    fn push(&mut self, drivable_area: Vec<Rect>, nodes: Vec<ReachNode>) {
        self.drivable_area.push(drivable_area);
        self.reachable_set.push(nodes);
    }
}

/// Continuous reachability analysis over decoupled lon/lat double
/// integrators.
pub struct ReachabilityAnalysis<C> {
    config: Configuration,
    checker: C,
    pool: ThreadPool,
    polygon_zero_state_lon: ReachPolygon,
    polygon_zero_state_lat: ReachPolygon,
}

impl<C: CollisionChecker> ReachabilityAnalysis<C> {
    /// Validates the configuration, precomputes the zero-state polygons and
    /// sizes the worker pool.
    pub fn new(config: Configuration, checker: C) -> Result<Self> {
        config.validate()?;
        let ego = &config.vehicle.ego;
        let dt = config.planning.dt;
        let polygon_zero_state_lon = zero_state_polygon(dt, ego.a_lon_min, ego.a_lon_max)?;
        let polygon_zero_state_lat = zero_state_polygon(dt, ego.a_lat_min, ego.a_lat_max)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.reachable_set.num_threads)
            .build()
            .map_err(|e| Error::invariant(format!("worker pool construction failed: {e}")))?;
        Ok(Self {
            config,
            checker,
            pool,
            polygon_zero_state_lon,
            polygon_zero_state_lat,
        })
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Drivable area at step zero, straight from the configuration.
    pub fn initial_drivable_area(&self) -> Vec<Rect> {
        vec![initial_position_rectangle(&self.config)]
    }

    /// Reachable set at step zero, straight from the configuration.
    pub fn initial_reachable_set(&self) -> Result<Vec<ReachNode>> {
        let (polygon_lon, polygon_lat) = initial_base_polygons(&self.config)?;
        Ok(vec![ReachNode::new(0, polygon_lon, polygon_lat)])
    }

    /// Runs the analysis over the whole horizon.
    ///
    /// Terminates early with success when some step admits no reachable node
    /// (the vehicle is trapped).
    pub fn compute(&self) -> Result<ReachableSet> {
        let mut result = ReachableSet::default();
        let nodes_initial = self.initial_reachable_set()?;
        result.push(self.initial_drivable_area(), nodes_initial);

        for step in 1..=self.config.planning.steps {
            let previous = result
                .reachable_set
                .last()
                .cloned()
                .unwrap_or_default();
            let (drivable_area, nodes) = self
                .pool
                .install(|| self.compute_step(step, &previous))?;
            tracing::debug!(
                step,
                rectangles = drivable_area.len(),
                nodes = nodes.len(),
                "step computed"
            );
            let trapped = nodes.is_empty();
            result.push(drivable_area, nodes);
            if trapped {
                tracing::warn!(step, "no reachable node left, terminating early");
                break;
            }
        }
        tracing::info!(
            steps = result.max_step(),
            nodes_final = result
                .reachable_set
                .last()
                .map_or(0, Vec::len),
            "reachability analysis finished"
        );
        Ok(result)
    }

    fn compute_step(
        &self,
        step: usize,
        reachable_set_previous: &[ReachNode],
    ) -> Result<(Vec<Rect>, Vec<ReachNode>)> {
        if reachable_set_previous.is_empty() {
            return Ok((Vec::new(), Vec::new()));
        }

        let base_sets_propagated = self.propagate_reachable_set(reachable_set_previous)?;

        let rectangles_projected = project_to_position_domain(&base_sets_propagated);
        let rectangles_repartitioned =
            create_repartitioned_rectangles(&rectangles_projected, self.config.planning.size_grid)?;

        let rectangles_collision_free = check_collision_and_split_rectangles(
            step,
            &self.checker,
            &rectangles_repartitioned,
            self.config.reachable_set.radius_terminal_split,
        )?;

        let drivable_area =
            create_repartitioned_rectangles(&rectangles_collision_free, self.config.size_grid_2nd())?;

        let nodes = adapt_base_sets_to_drivable_area(&drivable_area, &base_sets_propagated, step)?;

        Ok((drivable_area, nodes))
    }

    /// Propagates every node one step; nodes whose polygons become infeasible
    /// under the velocity clamps are dropped.
    fn propagate_reachable_set(&self, nodes: &[ReachNode]) -> Result<Vec<ReachNode>> {
        let ego = &self.config.vehicle.ego;
        let dt = self.config.planning.dt;
        let mut propagated = Vec::with_capacity(nodes.len());
        for node in nodes {
            let polygon_lon = propagate_polygon(
                node.polygon_lon(),
                &self.polygon_zero_state_lon,
                dt,
                ego.v_lon_min,
                ego.v_lon_max,
            );
            let polygon_lat = propagate_polygon(
                node.polygon_lat(),
                &self.polygon_zero_state_lat,
                dt,
                ego.v_lat_min,
                ego.v_lat_max,
            );
            match (polygon_lon, polygon_lat) {
                (Ok(lon), Ok(lat)) => propagated.push(ReachNode::new(node.step, lon, lat)),
                (Err(Error::InfeasibleIntersection), _)
                | (_, Err(Error::InfeasibleIntersection)) => {}
                (Err(e), _) | (_, Err(e)) => return Err(e),
            }
        }
        Ok(propagated)
    }
}
