use bevy::prelude::*;
use fixedbitset::FixedBitSet;
use super::components::Routable;
use super::types::{Cell, Faction};

/// Rendering sink: per-faction marks of every cell on a resolved route.
///
/// Rebuilt from scratch each time a pass resolves and cleared when a new
/// pass starts, so a renderer never draws half a pass.
#[derive(Resource, Debug, Default)]
pub struct RouteOverlay {
    width: usize,
    height: usize,
    layers: Vec<FixedBitSet>,
    version: u64,
    pass: u32,
}

impl RouteOverlay {
    pub fn clear(&mut self) {
        for layer in &mut self.layers {
            layer.clear();
        }
        self.version += 1;
    }

    pub fn rebuild<'a>(&mut self, width: usize, height: usize, pass: u32, routables: impl Iterator<Item = &'a Routable>) {
        self.width = width;
        self.height = height;
        self.pass = pass;
        self.layers = vec![FixedBitSet::with_capacity(width * height); Faction::COUNT];

        for routable in routables {
            for faction in Faction::ALL {
                let layer = &mut self.layers[faction.as_index()];
                for path in routable.paths_for(faction) {
                    for &cell in path.cells() {
                        if let Some(idx) = index(width, height, cell) {
                            layer.insert(idx);
                        }
                    }
                }
            }
        }
        self.version += 1;
    }

    pub fn is_marked(&self, faction: Faction, cell: Cell) -> bool {
        let Some(idx) = index(self.width, self.height, cell) else {
            return false;
        };
        self.layers
            .get(faction.as_index())
            .is_some_and(|layer| layer.contains(idx))
    }

    pub fn marked_count(&self, faction: Faction) -> usize {
        self.layers
            .get(faction.as_index())
            .map_or(0, |layer| layer.count_ones(..))
    }

    /// Bumped on every clear or rebuild; renderers redraw when it moves.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Pass the overlay was last built from.
    pub fn pass(&self) -> u32 {
        self.pass
    }
}

fn index(width: usize, height: usize, cell: Cell) -> Option<usize> {
    if cell.x < 0 || cell.y < 0 || cell.x as usize >= width || cell.y as usize >= height {
        return None;
    }
    Some(cell.y as usize * width + cell.x as usize)
}
