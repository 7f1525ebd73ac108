use bevy::prelude::*;
use routeforge::routing::*;

const MAX_FRAMES: usize = 200_000;

#[derive(Resource, Default)]
struct Announcements {
    resolved: Vec<u32>,
    aborted: usize,
}

fn record_announcements(
    mut resolved: MessageReader<RoutesResolved>,
    mut aborted: MessageReader<PassAborted>,
    mut seen: ResMut<Announcements>,
) {
    seen.resolved.extend(resolved.read().map(|m| m.pass));
    seen.aborted += aborted.read().count();
}

fn setup_app(paint: MapPaint, config: RouteConfig) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, RoutingPlugin));
    app.insert_resource(config);
    app.insert_resource(paint);
    app.init_resource::<Announcements>();
    app.add_systems(Update, record_announcements.after(RouteResolutionSet));
    app
}

fn spawn_marker(app: &mut App, cell: Cell) -> Entity {
    let config = app.world().resource::<RouteConfig>().clone();
    app.world_mut()
        .spawn((MapPos(config.cell_to_pixel(cell)), Bounds::square(config.cell_size), Routable::default()))
        .id()
}

fn run_until_resolved(app: &mut App) -> usize {
    for frame in 1..=MAX_FRAMES {
        app.update();
        let orchestrator = app.world().resource::<RouteOrchestrator>();
        assert!(orchestrator.aborted().is_none(), "pass aborted: {:?}", orchestrator.aborted());
        if orchestrator.is_resolved() {
            return frame;
        }
    }
    panic!("routes never resolved");
}

fn paths(app: &App, entity: Entity, faction: Faction) -> Vec<RoutePath> {
    app.world().get::<Routable>(entity).unwrap().paths_for(faction).to_vec()
}

/// One search per frame, so a pass spans many frames.
fn slow_config() -> RouteConfig {
    RouteConfig { time_budget_ms: 0, expansion_batch: 1, ..default() }
}

#[test]
fn test_every_pair_resolves_for_every_faction() {
    let mut app = setup_app(MapPaint::new(20, 20), RouteConfig::default());
    let a = spawn_marker(&mut app, Cell::new(1, 1));
    let b = spawn_marker(&mut app, Cell::new(18, 2));
    let c = spawn_marker(&mut app, Cell::new(5, 17));

    run_until_resolved(&mut app);

    for faction in Faction::ALL {
        for (entity, cell) in [(a, Cell::new(1, 1)), (b, Cell::new(18, 2)), (c, Cell::new(5, 17))] {
            let routes = paths(&app, entity, faction);
            assert_eq!(routes.len(), 2, "{:?} should reach both others", entity);
            assert!(routes.windows(2).all(|w| w[0].length() <= w[1].length()));
            for route in &routes {
                assert_eq!(route.first_cell(), cell);
                assert_eq!(route.faction(), faction);
            }
        }
    }
    assert_eq!(app.world().resource::<Announcements>().resolved, vec![1]);
}

#[test]
fn test_routes_are_mirrored_between_endpoints() {
    let mut app = setup_app(MapPaint::new(16, 16), RouteConfig::default());
    let a = spawn_marker(&mut app, Cell::new(0, 0));
    let b = spawn_marker(&mut app, Cell::new(15, 9));

    run_until_resolved(&mut app);

    let there = &paths(&app, a, Faction::Marine)[0];
    let back = &paths(&app, b, Faction::Marine)[0];
    assert_eq!(there.destination(), b);
    assert_eq!(back.destination(), a);
    assert_eq!(there.length(), back.length());
    assert_eq!(there.first_cell(), back.last_cell());
    assert_eq!(there.last_cell(), back.first_cell());
    assert_ne!(there.is_reversed(), back.is_reversed());
}

#[test]
fn test_vent_gives_aliens_a_route_marines_lack() {
    let paint = MapPaint::from_ascii(
        "....#....\n\
         ....#....\n\
         ....~....\n\
         ....#....\n",
    )
    .unwrap();
    let mut app = setup_app(paint, RouteConfig::default());
    let a = spawn_marker(&mut app, Cell::new(0, 2));
    let b = spawn_marker(&mut app, Cell::new(8, 2));

    run_until_resolved(&mut app);

    assert!(paths(&app, a, Faction::Marine).is_empty());
    assert_eq!(paths(&app, a, Faction::Alien).len(), 1);

    let overlay = app.world().resource::<RouteOverlay>();
    assert!(overlay.is_marked(Faction::Alien, Cell::new(4, 2)));
    assert_eq!(overlay.marked_count(Faction::Marine), 0);
    assert!(app.world().get::<Routable>(b).is_some());
}

#[test]
fn test_pass_spreads_over_frames_with_tiny_budget() {
    let mut app = setup_app(MapPaint::new(30, 30), slow_config());
    let a = spawn_marker(&mut app, Cell::new(0, 0));
    spawn_marker(&mut app, Cell::new(29, 29));

    let frames = run_until_resolved(&mut app);

    assert!(frames > 10, "resolved in {} frames", frames);
    assert_eq!(paths(&app, a, Faction::Marine).len(), 1);
    assert!(app.world().resource::<RouteFrame>().0 >= frames as u64 - 1);
}

#[test]
fn test_despawn_mid_pass_drops_routes_to_it() {
    let mut app = setup_app(MapPaint::new(30, 30), slow_config());
    let a = spawn_marker(&mut app, Cell::new(0, 0));
    let b = spawn_marker(&mut app, Cell::new(29, 29));
    let c = spawn_marker(&mut app, Cell::new(0, 29));

    app.update();
    app.update();
    assert!(!app.world().resource::<RouteOrchestrator>().is_resolved());

    app.world_mut().despawn(b);
    run_until_resolved(&mut app);

    for faction in Faction::ALL {
        let from_a = paths(&app, a, faction);
        assert_eq!(from_a.len(), 1);
        assert_eq!(from_a[0].destination(), c);
        assert!(paths(&app, c, faction).iter().all(|p| p.destination() != b));
    }
    assert_eq!(app.world().resource::<Announcements>().aborted, 0);
}

#[test]
fn test_walling_off_a_marker_removes_its_routes() {
    let mut app = setup_app(MapPaint::new(12, 12), RouteConfig::default());
    let a = spawn_marker(&mut app, Cell::new(1, 6));
    let b = spawn_marker(&mut app, Cell::new(10, 6));
    run_until_resolved(&mut app);
    assert_eq!(paths(&app, a, Faction::Marine).len(), 1);

    app.world_mut()
        .resource_mut::<MapPaint>()
        .fill_rect(Cell::new(6, 0), Cell::new(6, 11), Terrain::Wall);
    run_until_resolved(&mut app);

    for faction in Faction::ALL {
        assert!(paths(&app, a, faction).is_empty());
        assert!(paths(&app, b, faction).is_empty());
    }
    let orchestrator = app.world().resource::<RouteOrchestrator>();
    assert_eq!(orchestrator.pass(), 2);
    assert_eq!(app.world().resource::<NavGraphs>().generation(), 2);
}

#[test]
fn test_moving_a_marker_restarts_the_pass() {
    let mut app = setup_app(MapPaint::new(12, 12), RouteConfig::default());
    let a = spawn_marker(&mut app, Cell::new(0, 0));
    spawn_marker(&mut app, Cell::new(3, 0));
    run_until_resolved(&mut app);

    let cell_size = app.world().resource::<RouteConfig>().cell_size;
    app.world_mut().get_mut::<MapPos>(a).unwrap().0 = Vec2::new(0.0, 11.0 * cell_size);
    run_until_resolved(&mut app);

    let route = &paths(&app, a, Faction::Marine)[0];
    assert_eq!(route.first_cell(), Cell::new(0, 11));
    assert_eq!(app.world().resource::<Announcements>().resolved, vec![1, 2]);
}

#[test]
fn test_footprint_change_restarts_the_pass() {
    let mut app = setup_app(MapPaint::new(12, 12), RouteConfig::default());
    let a = spawn_marker(&mut app, Cell::new(0, 0));
    spawn_marker(&mut app, Cell::new(6, 0));
    run_until_resolved(&mut app);
    assert_eq!(paths(&app, a, Faction::Marine)[0].first_cell(), Cell::new(0, 0));

    let cell_size = app.world().resource::<RouteConfig>().cell_size;
    *app.world_mut().get_mut::<Bounds>(a).unwrap() =
        Bounds::new(Vec2::new(0.0, 3.0 * cell_size), Vec2::new(cell_size, 4.0 * cell_size));
    run_until_resolved(&mut app);

    assert_eq!(paths(&app, a, Faction::Marine)[0].first_cell(), Cell::new(0, 3));
    assert_eq!(app.world().resource::<RouteOrchestrator>().pass(), 2);
}

#[test]
fn test_removing_footprint_falls_back_to_default_center() {
    let mut app = setup_app(MapPaint::new(12, 12), RouteConfig::default());
    let a = spawn_marker(&mut app, Cell::new(0, 0));
    spawn_marker(&mut app, Cell::new(6, 6));
    let cell_size = app.world().resource::<RouteConfig>().cell_size;
    // Three cells wide, so its centre sits one cell in from the position.
    app.world_mut().entity_mut(a).insert(Bounds::square(3.0 * cell_size));
    run_until_resolved(&mut app);
    assert_eq!(paths(&app, a, Faction::Marine)[0].first_cell(), Cell::new(1, 1));

    app.world_mut().entity_mut(a).remove::<Bounds>();
    run_until_resolved(&mut app);

    assert_eq!(paths(&app, a, Faction::Marine)[0].first_cell(), Cell::new(0, 0));
    assert_eq!(app.world().resource::<RouteOrchestrator>().pass(), 2);
}

#[test]
fn test_losing_position_drops_routes_to_the_marker() {
    let mut app = setup_app(MapPaint::new(12, 12), RouteConfig::default());
    let a = spawn_marker(&mut app, Cell::new(0, 0));
    let b = spawn_marker(&mut app, Cell::new(11, 0));
    let c = spawn_marker(&mut app, Cell::new(0, 11));
    run_until_resolved(&mut app);
    assert_eq!(paths(&app, a, Faction::Marine).len(), 2);

    app.world_mut().entity_mut(b).remove::<MapPos>();
    run_until_resolved(&mut app);

    for faction in Faction::ALL {
        let from_a = paths(&app, a, faction);
        assert_eq!(from_a.len(), 1);
        assert_eq!(from_a[0].destination(), c);
    }
    assert_eq!(app.world().resource::<RouteOrchestrator>().pass(), 2);
}

#[test]
fn test_restart_request_reproduces_identical_routes() {
    let mut app = setup_app(MapPaint::new(24, 24), RouteConfig::default());
    {
        let mut paint = app.world_mut().resource_mut::<MapPaint>();
        paint.fill_rect(Cell::new(8, 4), Cell::new(15, 19), Terrain::Wall);
    }
    let a = spawn_marker(&mut app, Cell::new(2, 12));
    let b = spawn_marker(&mut app, Cell::new(21, 12));
    spawn_marker(&mut app, Cell::new(12, 1));
    run_until_resolved(&mut app);
    let before = (paths(&app, a, Faction::Marine), paths(&app, b, Faction::Alien));

    app.world_mut().write_message(RestartRoutes);
    run_until_resolved(&mut app);
    let after = (paths(&app, a, Faction::Marine), paths(&app, b, Faction::Alien));

    assert_eq!(app.world().resource::<RouteOrchestrator>().pass(), 2);
    assert_eq!(before, after);
}

#[test]
fn test_single_marker_resolves_with_no_routes() {
    let mut app = setup_app(MapPaint::new(5, 5), RouteConfig::default());
    let a = spawn_marker(&mut app, Cell::new(2, 2));

    run_until_resolved(&mut app);

    assert_eq!(app.world().get::<Routable>(a).unwrap().path_count(), 0);
    assert_eq!(app.world().resource::<Announcements>().resolved, vec![1]);
}

#[test]
fn test_config_plugin_reads_asset_file() {
    let expected = parse_route_config(&std::fs::read_to_string(ROUTE_CONFIG_PATH).unwrap()).unwrap();
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, RouteConfigPlugin, RoutingPlugin));

    app.update();

    assert_eq!(*app.world().resource::<RouteConfig>(), expected);
}
