//! Incremental route resolution between map features, per faction.
//!
//! A resolution pass searches every unordered pair of `Routable` entities
//! for every faction, a slice of wall-clock time per frame, then sorts each
//! entity's routes shortest-first and announces `RoutesResolved`.

mod types;
mod error;
mod config;
mod paint;
mod graph;
mod heuristic;
mod search;
mod path;
mod components;
mod jobs;
mod scheduler;
mod host;
mod orchestrator;
mod overlay;
mod systems;


// ============================================================================
// PUBLIC API
// ============================================================================

pub use types::{Cell, Faction, Terrain, DiagonalMovement, step_cost, STRAIGHT_COST, DIAGONAL_COST};
pub use error::{RouteError, PaintError};
pub use config::{RouteConfig, RouteConfigPlugin, ROUTE_CONFIG_PATH, parse_route_config, read_route_config};
pub use paint::{MapPaint, MapEdited};
pub use graph::{NavGraph, NavGraphs};
pub use heuristic::Heuristic;
pub use search::{SearchState, SearchStatus, SearchStats};
pub use path::RoutePath;
pub use components::{MapPos, Bounds, Routable};
pub use jobs::{RouteJob, ResolveJob, JobState, JobOutcome};
pub use scheduler::{RouteHost, RouteScheduler, SchedulerStats, TickSettings, TickReport};
pub use host::{QueryHost, RoutableItem};
pub use orchestrator::{RouteOrchestrator, RestartRoutes, RoutesResolved, PassAborted};
pub use overlay::RouteOverlay;
pub use systems::RouteFrame;

use bevy::prelude::*;

/// System set containing every route system, for ordering against
/// editor or render systems.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteResolutionSet;

pub struct RoutingPlugin;

impl Plugin for RoutingPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<MapEdited>();
        app.add_message::<RestartRoutes>();
        app.add_message::<RoutesResolved>();
        app.add_message::<PassAborted>();

        app.init_resource::<RouteConfig>();
        app.init_resource::<MapPaint>();
        app.init_resource::<NavGraphs>();
        app.init_resource::<RouteScheduler>();
        app.init_resource::<RouteOrchestrator>();
        app.init_resource::<RouteOverlay>();
        app.init_resource::<RouteFrame>();

        app.add_systems(
            Update,
            (
                systems::rebuild_nav_graphs,
                systems::detect_route_invalidation,
                systems::start_resolution_pass,
                systems::advance_route_jobs,
                systems::publish_route_overlay,
            )
                .chain()
                .in_set(RouteResolutionSet),
        );
    }
}
