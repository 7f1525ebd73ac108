use bevy::prelude::*;
use rustc_hash::FxHashMap;
use super::path::RoutePath;
use super::types::{Cell, Faction};

/// Pixel-space position of a map feature (top-left of its footprint).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct MapPos(pub Vec2);

/// Pixel-space footprint relative to `MapPos`.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Square footprint of `size` pixels anchored at the position.
    pub fn square(size: f32) -> Self {
        Self::new(Vec2::ZERO, Vec2::splat(size))
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }
}

/// Marks an entity as a route endpoint and stores its routes.
///
/// Per faction the list is in insertion order while a pass is running and
/// sorted shortest-first once the pass's sort job has run.
#[derive(Component, Debug, Clone, Default)]
pub struct Routable {
    paths: FxHashMap<Faction, Vec<RoutePath>>,
    last_cell: Option<Cell>,
}

impl Routable {
    pub fn clear(&mut self, faction: Faction) {
        if let Some(paths) = self.paths.get_mut(&faction) {
            paths.clear();
        }
    }

    pub fn clear_all(&mut self) {
        for faction in Faction::ALL {
            self.clear(faction);
        }
    }

    pub fn add(&mut self, faction: Faction, path: RoutePath) {
        debug_assert_eq!(path.faction(), faction);
        self.paths.entry(faction).or_default().push(path);
    }

    pub fn paths_for(&self, faction: Faction) -> &[RoutePath] {
        self.paths.get(&faction).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Shortest-first, stable: equal lengths keep their insertion order.
    pub fn sort(&mut self, faction: Faction) {
        if let Some(paths) = self.paths.get_mut(&faction) {
            paths.sort_by(|a, b| a.length().total_cmp(&b.length()));
        }
    }

    pub fn sort_all(&mut self) {
        for faction in Faction::ALL {
            self.sort(faction);
        }
    }

    /// The `n` first routes, i.e. the `n` shortest once sorted.
    pub fn shortest(&self, faction: Faction, n: usize) -> &[RoutePath] {
        let paths = self.paths_for(faction);
        &paths[..n.min(paths.len())]
    }

    pub fn path_count(&self) -> usize {
        self.paths.values().map(Vec::len).sum()
    }

    /// Grid cell this entity resolved to in the most recent search that used it.
    pub fn last_resolved_cell(&self) -> Option<Cell> {
        self.last_cell
    }

    pub fn set_last_resolved_cell(&mut self, cell: Cell) {
        self.last_cell = Some(cell);
    }
}
