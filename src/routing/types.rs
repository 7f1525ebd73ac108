use serde::{Serialize, Deserialize};

/// Cost of an axis-aligned step between neighbouring cells.
pub const STRAIGHT_COST: f32 = 1.0;

/// Cost of a diagonal step (1.4, not sqrt(2)).
pub const DIAGONAL_COST: f32 = 1.4;

/// Integer grid coordinate on the navigation grid.
///
/// A cell is pure identity: search scores live on the per-job search state,
/// never on the cell, so any number of searches can share one graph.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }

    #[inline]
    pub fn is_diagonal_to(self, other: Cell) -> bool {
        self.x != other.x && self.y != other.y
    }
}

/// Movement cost between two adjacent cells.
#[inline]
pub fn step_cost(from: Cell, to: Cell) -> f32 {
    if from.is_diagonal_to(to) {
        DIAGONAL_COST
    } else {
        STRAIGHT_COST
    }
}

/// Independent actor group. Each faction gets its own navigation graph and
/// its own route lists on every routable entity.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Faction {
    Marine = 0,
    Alien = 1,
}

impl Faction {
    /// Iteration order used everywhere jobs are generated (faction-major).
    pub const ALL: [Faction; 2] = [Faction::Marine, Faction::Alien];

    pub const COUNT: usize = Self::ALL.len();

    #[inline]
    pub fn as_index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Faction::Marine => "marine",
            Faction::Alien => "alien",
        }
    }
}

/// Painted terrain for one map cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    #[default]
    Open,
    Wall,
    /// Crawlable ducts: passable by aliens only.
    Vent,
}

impl Terrain {
    pub fn passable_by(self, faction: Faction) -> bool {
        match self {
            Terrain::Open => true,
            Terrain::Wall => false,
            Terrain::Vent => faction == Faction::Alien,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            Terrain::Open => '.',
            Terrain::Wall => '#',
            Terrain::Vent => '~',
        }
    }

    pub fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '.' | ' ' => Some(Terrain::Open),
            '#' => Some(Terrain::Wall),
            '~' => Some(Terrain::Vent),
            _ => None,
        }
    }
}

/// Diagonal expansion policy for grid neighbours.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagonalMovement {
    /// 4-connected grid.
    Never,
    /// Diagonals allowed regardless of the two orthogonal side cells.
    Always,
    /// Diagonals allowed when at least one side cell is walkable.
    IfAtMostOneObstacle,
    /// Diagonals allowed only when both side cells are walkable (no corner cutting).
    #[default]
    OnlyWhenNoObstacles,
}
