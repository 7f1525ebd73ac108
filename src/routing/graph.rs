use bevy::prelude::*;
use fixedbitset::FixedBitSet;
use smallvec::SmallVec;
use super::paint::MapPaint;
use super::types::{Cell, DiagonalMovement, Faction};

/// Neighbour offsets in expansion order: N, E, S, W, then NE, SE, SW, NW.
/// The order is part of the determinism contract; do not reorder.
const ORTHOGONAL: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];
const DIAGONAL: [(i32, i32); 4] = [(1, -1), (1, 1), (-1, 1), (-1, -1)];

/// Walkability grid for one faction.
///
/// Built wholesale from the paint layer and never mutated afterwards. The
/// `generation` stamp lets searches detect that they outlived their graph.
#[derive(Clone, Debug)]
pub struct NavGraph {
    faction: Faction,
    width: usize,
    height: usize,
    walkable: FixedBitSet,
    diagonal: DiagonalMovement,
    generation: u64,
}

impl NavGraph {
    pub fn build(paint: &MapPaint, faction: Faction, diagonal: DiagonalMovement, generation: u64) -> Self {
        let width = paint.width();
        let height = paint.height();
        let mut walkable = FixedBitSet::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let cell = Cell::new(x as i32, y as i32);
                if paint.get(cell).is_some_and(|t| t.passable_by(faction)) {
                    walkable.insert(y * width + x);
                }
            }
        }

        Self { faction, width, height, walkable, diagonal, generation }
    }

    pub fn faction(&self) -> Faction {
        self.faction
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of addressable cells (walkable or not).
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn index(&self, cell: Cell) -> Option<usize> {
        if cell.x < 0 || cell.y < 0 {
            return None;
        }
        let (x, y) = (cell.x as usize, cell.y as usize);
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    #[inline]
    pub fn cell_at(&self, index: usize) -> Cell {
        Cell::new((index % self.width) as i32, (index / self.width) as i32)
    }

    /// Off-grid cells are never walkable.
    #[inline]
    pub fn is_walkable(&self, cell: Cell) -> bool {
        self.index(cell).is_some_and(|idx| self.walkable.contains(idx))
    }

    pub fn walkable_count(&self) -> usize {
        self.walkable.count_ones(..)
    }

    /// Walkable neighbours of `cell` under this graph's diagonal policy.
    pub fn neighbors(&self, cell: Cell) -> SmallVec<[Cell; 8]> {
        let mut out = SmallVec::new();
        let mut side_open = [false; 4];

        for (i, &(dx, dy)) in ORTHOGONAL.iter().enumerate() {
            let next = cell.offset(dx, dy);
            side_open[i] = self.is_walkable(next);
            if side_open[i] {
                out.push(next);
            }
        }

        if self.diagonal == DiagonalMovement::Never {
            return out;
        }

        // Each diagonal sits between orthogonal i and (i + 1) % 4.
        for (i, &(dx, dy)) in DIAGONAL.iter().enumerate() {
            let next = cell.offset(dx, dy);
            if !self.is_walkable(next) {
                continue;
            }
            let (a, b) = (side_open[i], side_open[(i + 1) % 4]);
            let allowed = match self.diagonal {
                DiagonalMovement::Always => true,
                DiagonalMovement::IfAtMostOneObstacle => a || b,
                DiagonalMovement::OnlyWhenNoObstacles => a && b,
                DiagonalMovement::Never => false,
            };
            if allowed {
                out.push(next);
            }
        }

        out
    }
}

/// One navigation graph per faction, rebuilt together.
#[derive(Resource, Default, Debug)]
pub struct NavGraphs {
    graphs: Vec<NavGraph>,
    generation: u64,
}

impl NavGraphs {
    /// Replace every faction graph. Total: no caller ever sees a mix of old
    /// and new graphs, and every previous search becomes stale.
    pub fn rebuild(&mut self, paint: &MapPaint, diagonal: DiagonalMovement) {
        self.generation += 1;
        let generation = self.generation;
        self.graphs = Faction::ALL
            .iter()
            .map(|&faction| NavGraph::build(paint, faction, diagonal, generation))
            .collect();

        for graph in &self.graphs {
            info!(
                "[NAVGRAPH] {} graph gen {}: {}x{} cells, {} walkable",
                graph.faction.name(),
                generation,
                graph.width,
                graph.height,
                graph.walkable_count()
            );
        }
    }

    /// True once the first build has happened.
    pub fn is_ready(&self) -> bool {
        !self.graphs.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, faction: Faction) -> Option<&NavGraph> {
        self.graphs.get(faction.as_index())
    }

    pub fn is_walkable(&self, cell: Cell, faction: Faction) -> bool {
        self.get(faction).is_some_and(|g| g.is_walkable(cell))
    }

    /// Grid dimensions of the current build, `(0, 0)` before the first one.
    pub fn dimensions(&self) -> (usize, usize) {
        self.graphs.first().map_or((0, 0), |g| (g.width, g.height))
    }
}
