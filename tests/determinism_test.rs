// Two independent apps fed the same map and markers must produce the same
// routes, cell for cell.

use bevy::prelude::*;
use routeforge::routing::*;

fn random_paint(seed: u64, size: usize) -> MapPaint {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut paint = MapPaint::new(size, size);
    for _ in 0..size * size / 4 {
        let cell = Cell::new(rng.i32(0..size as i32), rng.i32(0..size as i32));
        let terrain = if rng.u8(0..10) == 0 { Terrain::Vent } else { Terrain::Wall };
        paint.set(cell, terrain);
    }
    paint
}

fn marker_cells(seed: u64, paint: &MapPaint, count: usize) -> Vec<Cell> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut cells = Vec::new();
    while cells.len() < count {
        let cell = Cell::new(rng.i32(0..paint.width() as i32), rng.i32(0..paint.height() as i32));
        if paint.get(cell) == Some(Terrain::Open) && !cells.contains(&cell) {
            cells.push(cell);
        }
    }
    cells
}

fn resolve(paint: &MapPaint, markers: &[Cell], config: RouteConfig) -> Vec<Vec<Vec<Cell>>> {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, RoutingPlugin));
    app.insert_resource(paint.clone());
    let cell_size = config.cell_size;
    app.insert_resource(config.clone());

    let entities: Vec<Entity> = markers
        .iter()
        .map(|&cell| {
            app.world_mut()
                .spawn((MapPos(config.cell_to_pixel(cell)), Bounds::square(cell_size), Routable::default()))
                .id()
        })
        .collect();

    for _ in 0..500_000 {
        app.update();
        if app.world().resource::<RouteOrchestrator>().is_resolved() {
            break;
        }
    }
    assert!(app.world().resource::<RouteOrchestrator>().is_resolved());

    entities
        .iter()
        .map(|&entity| {
            let routable = app.world().get::<Routable>(entity).unwrap();
            Faction::ALL
                .iter()
                .flat_map(move |&faction| routable.paths_for(faction).iter().map(|p| p.cells().to_vec()))
                .collect()
        })
        .collect()
}

#[test]
fn test_same_input_yields_same_routes() {
    for seed in [3, 17, 42] {
        let paint = random_paint(seed, 32);
        let markers = marker_cells(seed + 1, &paint, 5);

        let first = resolve(&paint, &markers, RouteConfig::default());
        let second = resolve(&paint, &markers, RouteConfig::default());

        assert_eq!(first, second, "seed {} diverged", seed);
    }
}

#[test]
fn test_time_slicing_does_not_change_routes() {
    let paint = random_paint(7, 24);
    let markers = marker_cells(8, &paint, 4);

    let whole = resolve(&paint, &markers, RouteConfig::default());
    let sliced = resolve(
        &paint,
        &markers,
        RouteConfig { time_budget_ms: 0, expansion_batch: 1, ..default() },
    );

    assert_eq!(whole, sliced);
}

#[test]
fn test_routes_only_cross_faction_walkable_cells() {
    let paint = random_paint(99, 28);
    let markers = marker_cells(100, &paint, 4);
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, RoutingPlugin));
    app.insert_resource(paint.clone());
    let config = RouteConfig::default();
    for &cell in &markers {
        app.world_mut()
            .spawn((MapPos(config.cell_to_pixel(cell)), Bounds::square(config.cell_size), Routable::default()));
    }

    for _ in 0..100_000 {
        app.update();
        if app.world().resource::<RouteOrchestrator>().is_resolved() {
            break;
        }
    }

    let mut query = app.world_mut().query::<&Routable>();
    for routable in query.iter(app.world()) {
        for faction in Faction::ALL {
            for path in routable.paths_for(faction) {
                for pair in path.cells().windows(2) {
                    assert!(pair[0].is_diagonal_to(pair[1]) || (pair[0].x - pair[1].x).abs() + (pair[0].y - pair[1].y).abs() == 1);
                }
                for &cell in path.cells() {
                    let terrain = paint.get(cell).unwrap();
                    assert!(terrain.passable_by(faction), "{:?} walks through {:?}", faction, terrain);
                }
            }
        }
    }
}
