use bevy::prelude::*;
use super::types::{step_cost, Cell, Faction};

/// One resolved route from the owning entity to `destination`.
///
/// The destination is held as a bare `Entity` (index + generation). It is a
/// handle, not a reference: a despawned destination is never revived, and
/// readers must check liveness before using it.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePath {
    cells: Vec<Cell>,
    faction: Faction,
    reversed: bool,
    destination: Entity,
    length: f32,
}

impl RoutePath {
    pub fn new(destination: Entity, cells: Vec<Cell>, faction: Faction, reversed: bool) -> Self {
        debug_assert!(!cells.is_empty(), "route paths always hold at least one cell");
        let length = cells.windows(2).map(|w| step_cost(w[0], w[1])).sum();
        Self { cells, faction, reversed, destination, length }
    }

    /// The same route walked the other way, delivered to `destination`.
    pub fn reversed_towards(&self, destination: Entity) -> Self {
        let mut cells = self.cells.clone();
        cells.reverse();
        Self {
            cells,
            faction: self.faction,
            reversed: !self.reversed,
            destination,
            length: self.length,
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn faction(&self) -> Faction {
        self.faction
    }

    /// True for the "back" half derived by reversing a search result.
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    pub fn destination(&self) -> Entity {
        self.destination
    }

    /// Travel cost: 1.0 per straight step, 1.4 per diagonal.
    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn first_cell(&self) -> Cell {
        self.cells[0]
    }

    pub fn last_cell(&self) -> Cell {
        self.cells[self.cells.len() - 1]
    }

    /// The destination, if `is_live` still vouches for it.
    pub fn live_destination(&self, is_live: impl Fn(Entity) -> bool) -> Option<Entity> {
        is_live(self.destination).then_some(self.destination)
    }
}
