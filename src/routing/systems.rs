use bevy::prelude::*;
use crate::profile_log;
use crate::profiling::profile;
use super::components::{Bounds, MapPos, Routable};
use super::config::RouteConfig;
use super::graph::NavGraphs;
use super::host::{QueryHost, RoutableItem};
use super::orchestrator::{PassAborted, RestartRoutes, RouteOrchestrator, RoutesResolved};
use super::overlay::RouteOverlay;
use super::paint::{MapEdited, MapPaint};
use super::scheduler::{RouteScheduler, TickSettings};

/// Number of frames in which route jobs were advanced.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteFrame(pub u64);

/// Rebuild every faction graph when the paint layer or the settings change.
/// A rebuild always invalidates the running pass.
pub(super) fn rebuild_nav_graphs(
    paint: Res<MapPaint>,
    config: Res<RouteConfig>,
    mut edits: MessageReader<MapEdited>,
    mut graphs: ResMut<NavGraphs>,
    mut orchestrator: ResMut<RouteOrchestrator>,
) {
    let edited = edits.read().count() > 0;
    if !edited && !paint.is_changed() && !config.is_changed() && graphs.is_ready() {
        return;
    }

    graphs.rebuild(&paint, config.diagonal);
    orchestrator.set_dirty();
}

/// Entity lifecycle, drags, footprint edits and explicit refresh requests
/// all restart the pass. Losing `MapPos` drops an entity out of the route
/// query, so it counts as a removal.
pub(super) fn detect_route_invalidation(
    added: Query<(), Added<Routable>>,
    moved: Query<(), (With<Routable>, Or<(Changed<MapPos>, Changed<Bounds>)>)>,
    mut removed: RemovedComponents<Routable>,
    mut lost_pos: RemovedComponents<MapPos>,
    mut lost_bounds: RemovedComponents<Bounds>,
    mut restarts: MessageReader<RestartRoutes>,
    mut orchestrator: ResMut<RouteOrchestrator>,
) {
    let removed_any = removed.read().count() + lost_pos.read().count() + lost_bounds.read().count() > 0;
    let restart_requested = restarts.read().count() > 0;
    if removed_any || restart_requested || !added.is_empty() || !moved.is_empty() {
        orchestrator.set_dirty();
    }
}

pub(super) fn start_resolution_pass(
    mut orchestrator: ResMut<RouteOrchestrator>,
    mut scheduler: ResMut<RouteScheduler>,
    mut overlay: ResMut<RouteOverlay>,
    graphs: Res<NavGraphs>,
    config: Res<RouteConfig>,
    mut query: Query<RoutableItem>,
) {
    if !orchestrator.is_dirty() || !graphs.is_ready() {
        return;
    }

    // Sorted so job order depends only on the entity set, not archetype layout.
    let mut entities: Vec<Entity> = query.iter().map(|(entity, ..)| entity).collect();
    entities.sort();

    let mut host = QueryHost::new(&mut query, &config);
    orchestrator.restart(&mut host, &mut scheduler, &entities);
    overlay.clear();
}

#[profile(30)]
pub(super) fn advance_route_jobs(
    mut frame: ResMut<RouteFrame>,
    mut orchestrator: ResMut<RouteOrchestrator>,
    mut scheduler: ResMut<RouteScheduler>,
    graphs: Res<NavGraphs>,
    config: Res<RouteConfig>,
    mut query: Query<RoutableItem>,
    mut resolved: MessageWriter<RoutesResolved>,
    mut aborted: MessageWriter<PassAborted>,
) {
    if orchestrator.is_resolved() || scheduler.is_idle() {
        return;
    }
    frame.0 += 1;

    let settings = TickSettings::from(&*config);
    let mut host = QueryHost::new(&mut query, &config);
    match orchestrator.advance(&mut host, &mut scheduler, &graphs, &settings) {
        Ok(Some(summary)) => {
            resolved.write(summary);
        }
        Ok(None) => {
            profile_log!(frame, "[ROUTES] pass {}: {} jobs pending", orchestrator.pass(), scheduler.pending());
        }
        Err(error) => {
            error!("[ROUTES] pass {} aborted: {}", orchestrator.pass(), error);
            aborted.write(PassAborted { pass: orchestrator.pass(), error });
        }
    }
}

/// Hand finished routes to the renderer.
pub(super) fn publish_route_overlay(
    mut resolved: MessageReader<RoutesResolved>,
    graphs: Res<NavGraphs>,
    routables: Query<&Routable>,
    mut overlay: ResMut<RouteOverlay>,
) {
    let Some(last) = resolved.read().last() else {
        return;
    };
    let (width, height) = graphs.dimensions();
    overlay.rebuild(width, height, last.pass, routables.iter());
}
