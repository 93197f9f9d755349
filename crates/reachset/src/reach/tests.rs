use nalgebra::{vector, Vector2};

use crate::checker::ObstacleSetChecker;
use crate::config::Configuration;
use crate::error::Error;
use crate::geometry::{GridRect, ReachPolygon, Rect};

use super::adapter::{adapt_base_sets_to_drivable_area, create_adjacency_map};
use super::analysis::{initial_position_rectangle, ReachabilityAnalysis};
use super::collision::check_collision_and_split_rectangles;
use super::node::ReachNode;
use super::propagation::{propagate_polygon, zero_state_bounding_box, zero_state_polygon};
use super::repartition::{
    create_repartitioned_rectangles, discretize_rectangles, minimum_positions,
    repartition_rectangles, undiscretize_rectangles,
};

fn assert_vertex_set(actual: &[Vector2<f64>], expected: &[(f64, f64)]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "vertex count mismatch: {actual:?} vs {expected:?}"
    );
    for &(x, y) in expected {
        assert!(
            actual.iter().any(|v| (v.x - x).abs() < 1e-6 && (v.y - y).abs() < 1e-6),
            "missing vertex ({x}, {y}) in {actual:?}"
        );
    }
}

fn test_configuration() -> Configuration {
    serde_json::from_str(
        r#"{
            "planning": { "dt": 0.5, "steps": 6, "size_grid": 0.5 },
            "vehicle": { "ego": {
                "v_lon_min": 0.0, "v_lon_max": 20.0,
                "a_lon_min": -6.0, "a_lon_max": 6.0,
                "v_lat_min": -4.0, "v_lat_max": 4.0,
                "a_lat_min": -2.0, "a_lat_max": 2.0
            } },
            "reachable_set": { "radius_terminal_split": 0.2 },
            "initial": { "p_lon": 0.0, "p_lat": 0.0, "v_lon": 5.0, "v_lat": 0.0 }
        }"#,
    )
    .expect("valid test configuration")
}

#[test]
fn zero_state_bounding_box_vertices() {
    let polygon = zero_state_bounding_box(2.0, -5.0, 10.0).unwrap();
    assert_vertex_set(
        polygon.vertices(),
        &[(-10.0, -10.0), (20.0, -10.0), (-10.0, 20.0), (20.0, 20.0)],
    );
}

#[test]
fn zero_state_polygon_is_the_characteristic_hexagon() {
    let polygon = zero_state_polygon(2.0, -2.0, 2.0).unwrap();
    assert_vertex_set(
        polygon.vertices(),
        &[
            (4.0, 4.0),
            (-4.0, -4.0),
            (0.0, 2.0),
            (0.0, -2.0),
            (-4.0, -2.0),
            (4.0, 2.0),
        ],
    );
}

#[test]
fn propagation_of_a_position_velocity_rectangle() {
    let polygon_lon = ReachPolygon::from_vertices(&[
        vector![10.0, 0.0],
        vector![30.0, 0.0],
        vector![30.0, 20.0],
        vector![10.0, 20.0],
    ])
    .unwrap();
    let zero_state = zero_state_polygon(2.0, -2.0, 2.0).unwrap();

    let propagated = propagate_polygon(&polygon_lon, &zero_state, 2.0, 0.0, 20.0).unwrap();
    assert_vertex_set(
        propagated.vertices(),
        &[
            (72.0, 20.0),
            (70.0, 18.0),
            (34.0, 0.0),
            (8.0, 0.0),
            (10.0, 2.0),
            (46.0, 20.0),
        ],
    );
}

#[test]
fn propagation_outside_the_velocity_band_is_infeasible() {
    let polygon = ReachPolygon::from_rectangle(0.0, 30.0, 1.0, 31.0).unwrap();
    let zero_state = zero_state_polygon(1.0, -1.0, 1.0).unwrap();
    // After one step the velocities stay far above v_max = 20.
    let result = propagate_polygon(&polygon, &zero_state, 1.0, 0.0, 20.0);
    assert!(matches!(result, Err(Error::InfeasibleIntersection)));
}

#[test]
fn minimum_positions_over_rectangles() {
    let rectangles = [
        Rect::new(1.0, 1.0, 5.0, 5.0),
        Rect::new(-5.0, 5.0, 10.0, 10.0),
    ];
    assert_eq!(minimum_positions(&rectangles), (-5.0, 1.0));
}

#[test]
fn discretization_rounds_outward() {
    let polygon = ReachPolygon::from_vertices(&[
        vector![2.0, 2.0],
        vector![6.3, 3.2],
        vector![12.7, 7.5],
        vector![8.3, 8.3],
        vector![3.7, 4.5],
    ])
    .unwrap();
    let rectangle = polygon.bounding_box();
    let p_min = minimum_positions(&[rectangle]);

    let discretized = discretize_rectangles(&[rectangle], p_min, 0.5);
    assert_eq!(discretized[0], GridRect::new(0, 0, 22, 13));

    let discretized = discretize_rectangles(&[rectangle], p_min, 0.2);
    assert_eq!(discretized[0], GridRect::new(0, 0, 54, 32));
}

#[test]
fn undiscretization_restores_grid_coordinates() {
    let rectangles = [GridRect::new(0, 0, 22, 13)];
    let restored = undiscretize_rectangles(&rectangles, (3.0, 3.0), 0.5);
    assert_eq!(restored[0], Rect::new(3.0, 3.0, 14.0, 9.5));
}

#[test]
fn adjacency_map_lists_strictly_overlapping_rectangles() {
    let rectangles_a = [Rect::new(1.0, 0.0, 2.0, 1.0), Rect::new(2.0, 0.0, 3.0, 1.0)];
    let rectangles_b = [
        Rect::new(0.5, 0.5, 1.5, 1.5),
        Rect::new(1.5, 0.5, 2.5, 1.5),
        Rect::new(2.5, 0.5, 3.5, 1.5),
    ];
    let map = create_adjacency_map(&rectangles_a, &rectangles_b);
    assert_eq!(map.len(), 2);
    assert_eq!(map[&0], vec![0, 1]);
    assert_eq!(map[&1], vec![1, 2]);
}

#[test]
fn adjacency_map_drops_sources_without_overlap() {
    let rectangles_a = [Rect::new(0.0, 0.0, 1.0, 1.0), Rect::new(10.0, 10.0, 11.0, 11.0)];
    let rectangles_b = [Rect::new(0.5, 0.5, 1.5, 1.5)];
    let map = create_adjacency_map(&rectangles_a, &rectangles_b);
    assert_eq!(map.len(), 1);
    assert_eq!(map[&0], vec![0]);
}

#[test]
fn repartition_produces_a_disjoint_grid_cover() {
    // Two overlapping unit-grid rectangles forming an L-shaped union.
    let rectangles = [GridRect::new(0, 0, 4, 2), GridRect::new(2, 0, 6, 4)];
    let repartitioned = repartition_rectangles(&rectangles);

    // Pairwise disjoint interiors.
    for (i, a) in repartitioned.iter().enumerate() {
        for b in &repartitioned[i + 1..] {
            let overlap_x = a.x_min < b.x_max && b.x_min < a.x_max;
            let overlap_y = a.y_min < b.y_max && b.y_min < a.y_max;
            assert!(!(overlap_x && overlap_y), "{a:?} overlaps {b:?}");
        }
    }

    // Same union: compare cell-by-cell on the integer grid.
    let covered = |rects: &[GridRect], x: i64, y: i64| {
        rects
            .iter()
            .any(|r| r.x_min <= x && x < r.x_max && r.y_min <= y && y < r.y_max)
    };
    for x in -1..7 {
        for y in -1..5 {
            assert_eq!(
                covered(&rectangles, x, y),
                covered(&repartitioned, x, y),
                "cell ({x}, {y}) differs"
            );
        }
    }

    // Lexicographic (x_min, y_min) output order.
    let mut sorted = repartitioned.clone();
    sorted.sort_by_key(|r| (r.x_min, r.y_min));
    assert_eq!(repartitioned, sorted);
}

#[test]
fn repartition_merges_equal_span_runs() {
    // Two rectangles with identical y-spans and touching x-ranges collapse
    // into a single rectangle.
    let rectangles = [GridRect::new(0, 0, 2, 3), GridRect::new(2, 0, 5, 3)];
    let repartitioned = repartition_rectangles(&rectangles);
    assert_eq!(repartitioned, vec![GridRect::new(0, 0, 5, 3)]);
}

#[test]
fn repartitioned_rectangles_contain_the_continuous_union() {
    let rectangles = [
        Rect::new(0.1, 0.1, 1.9, 1.2),
        Rect::new(1.3, 0.7, 3.4, 2.6),
    ];
    let cover = create_repartitioned_rectangles(&rectangles, 0.5).unwrap();
    assert!(!cover.is_empty());
    // Every input rectangle lies inside the cover's bounding box, and each
    // cover rectangle stays within one grid cell of the input hull.
    let hull = Rect::new(0.1, 0.1, 3.4, 2.6);
    let slack = hull.inflate(0.5);
    for rect in &cover {
        assert!(slack.contains_rect(rect), "{rect:?} exceeds the grid slack");
    }

    assert!(create_repartitioned_rectangles(&[], 0.5).unwrap().is_empty());
    assert!(matches!(
        create_repartitioned_rectangles(&rectangles, 0.0),
        Err(Error::Config(_))
    ));
}

#[test]
fn collision_split_passes_free_rectangles_through() {
    let checker = ObstacleSetChecker::empty();
    let rectangles = [Rect::new(0.0, 0.0, 2.0, 2.0), Rect::new(3.0, 0.0, 4.0, 1.0)];
    let out = check_collision_and_split_rectangles(0, &checker, &rectangles, 0.5).unwrap();
    assert_eq!(out, rectangles.to_vec());
}

#[test]
fn collision_split_discards_fully_blocked_rectangles() {
    let checker = ObstacleSetChecker::new(vec![Rect::new(-10.0, -10.0, 10.0, 10.0)], Vec::new(), 0.0);
    let rectangles = [Rect::new(0.0, 0.0, 2.0, 2.0)];
    let out = check_collision_and_split_rectangles(0, &checker, &rectangles, 0.5).unwrap();
    assert!(out.is_empty());
}

#[test]
fn collision_split_keeps_the_free_half() {
    // Obstacle covers x > 2; the left half of the rectangle stays intact.
    let checker = ObstacleSetChecker::new(vec![Rect::new(2.0, -10.0, 10.0, 10.0)], Vec::new(), 0.0);
    let rectangles = [Rect::new(0.0, 0.0, 4.0, 2.0)];
    let out = check_collision_and_split_rectangles(0, &checker, &rectangles, 0.1).unwrap();
    assert!(!out.is_empty());
    let free = Rect::new(0.0, 0.0, 2.0, 2.0);
    for rect in &out {
        assert!(free.contains_rect(rect), "{rect:?} leaks into the obstacle");
    }
    assert!(out.contains(&free), "the free half should survive unsplit");
}

#[test]
fn collision_split_is_monotone_in_the_terminal_radius() {
    let checker = ObstacleSetChecker::new(vec![Rect::new(1.1, 0.3, 2.3, 1.7)], Vec::new(), 0.0);
    let rectangles = [Rect::new(0.0, 0.0, 4.0, 2.0)];
    let coarse = check_collision_and_split_rectangles(0, &checker, &rectangles, 1.0).unwrap();
    let fine = check_collision_and_split_rectangles(0, &checker, &rectangles, 0.25).unwrap();
    // Every rectangle kept at the coarse radius is kept verbatim at the finer
    // one: the recursion tree only deepens.
    for rect in &coarse {
        assert!(fine.contains(rect), "{rect:?} lost when refining");
    }
    assert!(fine.len() >= coarse.len());
}

#[test]
fn collision_split_propagates_checker_failure() {
    let checker = ObstacleSetChecker::new(
        Vec::new(),
        vec![vec![Rect::new(0.0, 0.0, 1.0, 1.0)]],
        0.0,
    );
    let rectangles = [Rect::new(0.0, 0.0, 2.0, 2.0)];
    let result = check_collision_and_split_rectangles(5, &checker, &rectangles, 0.5);
    assert!(matches!(result, Err(Error::Checker { step: 5, .. })));
}

#[test]
fn adaptation_clips_base_sets_to_the_drivable_rectangle() {
    // One propagated base set covering p_lon in [0, 10], v_lon in [0, 5].
    let node = ReachNode::new(
        1,
        ReachPolygon::from_rectangle(0.0, 0.0, 10.0, 5.0).unwrap(),
        ReachPolygon::from_rectangle(-2.0, -1.0, 2.0, 1.0).unwrap(),
    );
    let drivable_area = [Rect::new(4.0, -1.0, 6.0, 1.0)];

    let nodes = adapt_base_sets_to_drivable_area(&drivable_area, &[node], 1).unwrap();
    assert_eq!(nodes.len(), 1);
    let adapted = &nodes[0];
    assert_eq!(adapted.step, 1);
    assert_eq!((adapted.p_lon_min(), adapted.p_lon_max()), (4.0, 6.0));
    assert_eq!((adapted.v_lon_min(), adapted.v_lon_max()), (0.0, 5.0));
    assert_eq!((adapted.p_lat_min(), adapted.p_lat_max()), (-1.0, 1.0));
}

#[test]
fn adaptation_drops_rectangles_without_pre_image() {
    let node = ReachNode::new(
        1,
        ReachPolygon::from_rectangle(0.0, 0.0, 1.0, 1.0).unwrap(),
        ReachPolygon::from_rectangle(0.0, 0.0, 1.0, 1.0).unwrap(),
    );
    let drivable_area = [Rect::new(5.0, 5.0, 6.0, 6.0)];
    let nodes = adapt_base_sets_to_drivable_area(&drivable_area, &[node], 1).unwrap();
    assert!(nodes.is_empty());
}

#[test]
fn initial_drivable_area_uses_the_default_epsilons() {
    let config = test_configuration();
    let rectangle = initial_position_rectangle(&config);
    assert_eq!(rectangle, Rect::new(-0.01, -0.01, 0.01, 0.01));
}

#[test]
fn analysis_runs_over_the_horizon_in_free_space() {
    let config = test_configuration();
    let analysis = ReachabilityAnalysis::new(config, ObstacleSetChecker::empty()).unwrap();
    let result = analysis.compute().unwrap();

    assert_eq!(result.max_step(), 6);
    assert_eq!(result.reachable_set_at(0).len(), 1);
    for step in 1..=6 {
        assert!(
            !result.reachable_set_at(step).is_empty(),
            "free space must stay reachable at step {step}"
        );
        assert!(!result.drivable_area_at(step).is_empty());
    }
    // The drivable area moves forward with the positive initial velocity.
    let first = result.drivable_area_at(1);
    let last = result.drivable_area_at(6);
    let max_lon =
        |rects: &[Rect]| rects.iter().map(|r| r.x_max).fold(f64::NEG_INFINITY, f64::max);
    assert!(max_lon(last) > max_lon(first));
}

#[test]
fn analysis_terminates_early_when_trapped() {
    let config = test_configuration();
    // A wall right in front of the vehicle blocks everything.
    let checker = ObstacleSetChecker::new(
        vec![Rect::new(-100.0, -100.0, 100.0, 100.0)],
        Vec::new(),
        0.0,
    );
    let analysis = ReachabilityAnalysis::new(config, checker).unwrap();
    let result = analysis.compute().unwrap();

    assert_eq!(result.max_step(), 1);
    assert!(result.reachable_set_at(1).is_empty());
    assert!(result.drivable_area_at(1).is_empty());
    // Out-of-range queries degrade to empty slices.
    assert!(result.reachable_set_at(3).is_empty());
}

#[test]
fn analysis_is_deterministic_across_thread_counts() {
    let obstacles = vec![
        Rect::new(4.0, -0.6, 6.0, 0.9),
        Rect::new(9.0, -2.0, 10.5, 0.2),
    ];
    let run = |num_threads: usize| {
        let mut config = test_configuration();
        config.reachable_set.num_threads = num_threads;
        let checker = ObstacleSetChecker::new(obstacles.clone(), Vec::new(), 0.0);
        let analysis = ReachabilityAnalysis::new(config, checker).unwrap();
        analysis.compute().unwrap()
    };

    let single = run(1);
    let parallel = run(4);

    assert_eq!(single.max_step(), parallel.max_step());
    for step in 0..=single.max_step() {
        assert_eq!(
            single.drivable_area_at(step),
            parallel.drivable_area_at(step),
            "drivable area differs at step {step}"
        );
        let nodes_single = single.reachable_set_at(step);
        let nodes_parallel = parallel.reachable_set_at(step);
        assert_eq!(nodes_single.len(), nodes_parallel.len());
        for (a, b) in nodes_single.iter().zip(nodes_parallel) {
            assert_eq!(a.polygon_lon().vertices(), b.polygon_lon().vertices());
            assert_eq!(a.polygon_lat().vertices(), b.polygon_lat().vertices());
        }
    }
}

#[test]
fn rejected_configuration_surfaces_before_computation() {
    let mut config = test_configuration();
    config.vehicle.ego.v_lon_min = 30.0;
    let result = ReachabilityAnalysis::new(config, ObstacleSetChecker::empty());
    assert!(matches!(result, Err(Error::Config(_))));
}
