use serde::{Serialize, Deserialize};
use super::types::{Cell, DIAGONAL_COST, STRAIGHT_COST};

const EUCLIDEAN_SCALE: f32 = DIAGONAL_COST / std::f32::consts::SQRT_2;

/// Distance estimate used to order the A* open set.
///
/// Octile is exact on an open grid with the 1.0 / 1.4 step costs. Euclidean
/// is scaled by `1.4 / sqrt(2)` so a diagonal step is never overestimated;
/// both are admissible under every `DiagonalMovement`. Manhattan is only
/// admissible with `DiagonalMovement::Never`: once diagonals are allowed it
/// overestimates and found routes may not be the shortest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Heuristic {
    Euclidean,
    #[default]
    Octile,
    Manhattan,
}

impl Heuristic {
    pub fn estimate(self, from: Cell, to: Cell) -> f32 {
        let dx = (from.x - to.x).abs() as f32;
        let dy = (from.y - to.y).abs() as f32;
        match self {
            Heuristic::Euclidean => EUCLIDEAN_SCALE * (dx * dx + dy * dy).sqrt(),
            Heuristic::Octile => {
                let (low, high) = if dx < dy { (dx, dy) } else { (dy, dx) };
                STRAIGHT_COST * (high - low) + DIAGONAL_COST * low
            }
            Heuristic::Manhattan => STRAIGHT_COST * (dx + dy),
        }
    }
}
