use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use super::components::Bounds;
use super::heuristic::Heuristic;
use super::types::{Cell, DiagonalMovement};

/// Default location of the route settings file, relative to the working directory.
pub const ROUTE_CONFIG_PATH: &str = "assets/route_config.ron";

/// Settings for route resolution.
///
/// Read once at startup. Changing the resource later (e.g. from an editor
/// panel) is picked up on the next frame: the graphs are rebuilt and a new
/// resolution pass starts, so in-flight searches never see mixed settings.
#[derive(Resource, Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct RouteConfig {
    /// Pixels per navigation cell.
    pub cell_size: f32,
    /// Centre offset used for entities without a `Bounds` footprint. A tuple
    /// in RON: `default_center: (4.0, 4.0)`.
    pub default_center: [f32; 2],
    /// Wall-clock budget for one scheduler tick.
    pub time_budget_ms: u64,
    /// Node expansions between elapsed-time checks.
    pub expansion_batch: usize,
    /// Tolerated overshoot before a tick counts as a budget overrun.
    pub overrun_slack_ms: u64,
    pub diagonal: DiagonalMovement,
    pub heuristic: Heuristic,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            cell_size: 8.0,
            default_center: [4.0, 4.0],
            // ~40 ticks per second worth of search, independent of frame rate.
            time_budget_ms: 25,
            expansion_batch: 64,
            overrun_slack_ms: 5,
            diagonal: DiagonalMovement::OnlyWhenNoObstacles,
            heuristic: Heuristic::Octile,
        }
    }
}

impl RouteConfig {
    pub fn time_budget(&self) -> Duration {
        Duration::from_millis(self.time_budget_ms)
    }

    pub fn overrun_slack(&self) -> Duration {
        Duration::from_millis(self.overrun_slack_ms)
    }

    /// Convert an entity's pixel position to the grid cell under its centre.
    pub fn pixel_to_cell(&self, pos: Vec2, bounds: Option<&Bounds>) -> Cell {
        let center = bounds
            .map(Bounds::center)
            .unwrap_or_else(|| Vec2::from(self.default_center));
        let cell_size = self.cell_size.max(f32::EPSILON);
        let p = (pos + center) / cell_size;
        Cell::new(p.x.floor() as i32, p.y.floor() as i32)
    }

    /// Top-left pixel position of a cell. Inverse of `pixel_to_cell` for
    /// entities spawned with the default centre offset.
    pub fn cell_to_pixel(&self, cell: Cell) -> Vec2 {
        Vec2::new(cell.x as f32, cell.y as f32) * self.cell_size
    }
}

/// Parse route settings from RON text.
pub fn parse_route_config(contents: &str) -> Result<RouteConfig, ron::error::SpannedError> {
    ron::from_str::<RouteConfig>(contents)
}

/// Read route settings from disk, falling back to defaults on any failure.
pub fn read_route_config(path: &str) -> RouteConfig {
    match std::fs::read_to_string(path) {
        Ok(contents) => match parse_route_config(&contents) {
            Ok(config) => {
                info!("Loaded route config from {}", path);
                config
            }
            Err(e) => {
                error!("Failed to parse route config: {}", e);
                error!("Using default RouteConfig");
                RouteConfig::default()
            }
        },
        Err(e) => {
            error!("Failed to read {}: {}", path, e);
            error!("Using default RouteConfig");
            RouteConfig::default()
        }
    }
}

pub struct RouteConfigPlugin;

impl Plugin for RouteConfigPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, load_route_config);
    }
}

fn load_route_config(mut commands: Commands) {
    commands.insert_resource(read_route_config(ROUTE_CONFIG_PATH));
}
