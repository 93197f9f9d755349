//! Reachable-set computation for automated road vehicles.
//!
//! Given decoupled longitudinal/lateral double-integrator dynamics with
//! acceleration and velocity bounds, an initial state box and a time-indexed
//! collision environment in a road-aligned (curvilinear) frame, the engine
//! computes per step the collision-free position cover (drivable area) and
//! the reach nodes carrying the velocity information for the next step.
//!
//! Layout
//! - `geometry`: H-representation polygon kernel and rectangle value types.
//! - `reach`: the per-step pipeline (propagation, repartition, collision
//!   splitting, adaptation) and the analysis driver.
//! - `checker`: collision-checker boundary plus the AABB obstacle-set
//!   implementation.
//! - `config` / `error`: configuration schema and the error taxonomy.

pub mod checker;
pub mod config;
pub mod error;
pub mod geometry;
pub mod reach;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use checker::{CollisionChecker, CollisionSnapshot, ObstacleSetChecker};
pub use config::Configuration;
pub use error::{Error, Result};
pub use geometry::{ReachPolygon, Rect};
pub use reach::{ReachNode, ReachabilityAnalysis, ReachableSet};
