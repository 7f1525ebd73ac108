use bevy::prelude::*;

use routeforge::routing::{
    Bounds, Cell, Faction, MapPaint, MapPos, Routable, RouteConfig, RouteConfigPlugin, RouteOrchestrator,
    RouteOverlay, RoutingPlugin, Terrain,
};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const MAX_FRAMES: usize = 100_000;
const RANDOM_MAP_SIZE: usize = 96;
const RANDOM_MARKERS: usize = 7;

const LOG_DIR: &str = "logs";
const LOG_PREFIX: &str = "routeforge_";
const LOGS_KEPT: usize = 25;

/// Log to stdout and to a fresh timestamped file under `logs/`. Returns the
/// file's path.
fn setup_file_logging() -> io::Result<PathBuf> {
    let log_dir = Path::new(LOG_DIR);
    fs::create_dir_all(log_dir)?;
    if let Err(e) = prune_logs(log_dir, LOGS_KEPT) {
        eprintln!("could not prune old logs in {}: {}", log_dir.display(), e);
    }

    let log_name = format!("{}{}.log", LOG_PREFIX, chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let file_layer = fmt::layer()
        .with_writer(RollingFileAppender::new(Rotation::NEVER, log_dir, &log_name))
        .with_ansi(false);
    let stdout_layer = fmt::layer().with_writer(io::stdout).with_target(false);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bevy_ecs=info,routeforge=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(log_dir.join(log_name))
}

/// Delete all but the newest `keep` run logs. Names carry a sortable
/// timestamp, so name order is age order. Returns how many were removed.
fn prune_logs(log_dir: &Path, keep: usize) -> io::Result<usize> {
    let mut logs: Vec<PathBuf> = fs::read_dir(log_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(LOG_PREFIX) && name.ends_with(".log"))
        })
        .collect();
    logs.sort();

    let stale = logs.len().saturating_sub(keep);
    for path in &logs[..stale] {
        fs::remove_file(path)?;
    }
    Ok(stale)
}

/// Walled rooms with a vent shortcut, plus scattered pillars.
fn random_paint(rng: &mut StdRng, size: usize) -> MapPaint {
    let mut paint = MapPaint::new(size, size);
    let last = size as i32 - 1;
    let mid = size as i32 / 2;

    paint.fill_rect(Cell::new(0, mid), Cell::new(last, mid), Terrain::Wall);
    paint.fill_rect(Cell::new(mid, 0), Cell::new(mid, last), Terrain::Wall);
    for _ in 0..4 {
        let door = rng.random_range(2..mid - 2);
        paint.set(Cell::new(door, mid), Terrain::Open);
        paint.set(Cell::new(mid + door, mid), Terrain::Open);
    }
    paint.set(Cell::new(mid, rng.random_range(2..mid - 2)), Terrain::Vent);
    paint.set(Cell::new(mid, mid + rng.random_range(2..mid - 2)), Terrain::Open);

    for _ in 0..size * 2 {
        let x = rng.random_range(0..size as i32);
        let y = rng.random_range(0..size as i32);
        if x != mid && y != mid && rng.random_bool(0.7) {
            paint.set(Cell::new(x, y), Terrain::Wall);
        }
    }
    paint
}

fn pick_marker_cells(rng: &mut StdRng, paint: &MapPaint, count: usize) -> Vec<Cell> {
    let mut cells = Vec::with_capacity(count);
    let mut attempts = 0;
    while cells.len() < count && attempts < count * 1000 {
        attempts += 1;
        let cell = Cell::new(
            rng.random_range(0..paint.width() as i32),
            rng.random_range(0..paint.height() as i32),
        );
        if paint.get(cell) == Some(Terrain::Open) && !cells.contains(&cell) {
            cells.push(cell);
        }
    }
    cells
}

fn render_overlay(paint: &MapPaint, overlay: &RouteOverlay, markers: &[Cell], faction: Faction) -> String {
    let mut out = String::new();
    for y in 0..paint.height() as i32 {
        for x in 0..paint.width() as i32 {
            let cell = Cell::new(x, y);
            let glyph = if markers.contains(&cell) {
                'O'
            } else if overlay.is_marked(faction, cell) {
                '*'
            } else {
                paint.get(cell).map_or(' ', |t| t.glyph())
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let log_file = setup_file_logging()?;
    println!("routeforge - logging to {}", log_file.display());

    let mut rng = StdRng::seed_from_u64(0x5eed);
    let args: Vec<String> = std::env::args().collect();
    let paint = match args.get(1) {
        Some(path) => MapPaint::from_ascii(&fs::read_to_string(path)?)?,
        None => random_paint(&mut rng, RANDOM_MAP_SIZE),
    };
    let markers = pick_marker_cells(&mut rng, &paint, RANDOM_MARKERS.min(paint.width() * paint.height() / 4));

    let mut app = App::new();
    app.add_plugins((MinimalPlugins, RouteConfigPlugin, RoutingPlugin));
    // Startup loads the config; markers need its cell size.
    app.update();

    let config = app.world().resource::<RouteConfig>().clone();
    app.insert_resource(paint.clone());
    let bounds = Bounds::square(config.cell_size);
    for &cell in &markers {
        app.world_mut().spawn((MapPos(config.cell_to_pixel(cell)), bounds, Routable::default()));
    }

    let mut frames = 0;
    while frames < MAX_FRAMES {
        app.update();
        frames += 1;
        let orchestrator = app.world().resource::<RouteOrchestrator>();
        if orchestrator.is_resolved() {
            break;
        }
        if let Some(error) = orchestrator.aborted() {
            return Err(error.clone().into());
        }
    }
    info!("Resolved after {} frames", frames);

    let mut query = app.world_mut().query::<(Entity, &Routable)>();
    for (entity, routable) in query.iter(app.world()) {
        let cell = routable.last_resolved_cell().unwrap_or_default();
        print!("{:?} at ({}, {})", entity, cell.x, cell.y);
        for faction in Faction::ALL {
            let paths = routable.paths_for(faction);
            match paths.first() {
                Some(shortest) => print!("  {}: {} routes, shortest {:.1}", faction.name(), paths.len(), shortest.length()),
                None => print!("  {}: no routes", faction.name()),
            }
        }
        println!();
    }

    let overlay = app.world().resource::<RouteOverlay>();
    for faction in Faction::ALL {
        println!("\n{} routes:", faction.name());
        print!("{}", render_overlay(&paint, overlay, &markers, faction));
    }

    Ok(())
}
