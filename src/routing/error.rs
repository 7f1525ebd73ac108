use std::fmt;
use super::types::Faction;

/// Programming-invariant violations raised while advancing a resolution pass.
///
/// Expected outcomes (no path between two endpoints, an endpoint despawned
/// mid-search) are job outcomes and never show up here. Anything that does
/// show up aborts the pass; the orchestrator needs a fresh restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// A search was resumed against a graph rebuilt after the search began.
    StaleGraph { expected: u64, found: u64 },
    /// No navigation graph exists for a faction that has queued jobs.
    MissingGraph(Faction),
    /// A job or search was driven from a state it cannot be in.
    CorruptJob(&'static str),
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::StaleGraph { expected, found } => write!(
                f,
                "search resumed on navigation graph generation {} but was started on generation {}",
                found, expected
            ),
            RouteError::MissingGraph(faction) => {
                write!(f, "no navigation graph built for faction {}", faction.name())
            }
            RouteError::CorruptJob(reason) => write!(f, "corrupt route job state: {}", reason),
        }
    }
}

impl std::error::Error for RouteError {}

/// Failure to parse an ASCII paint layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaintError {
    Empty,
    RaggedRow { line: usize, expected: usize, found: usize },
    UnknownGlyph { line: usize, column: usize, glyph: char },
}

impl fmt::Display for PaintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaintError::Empty => write!(f, "paint layer has no rows"),
            PaintError::RaggedRow { line, expected, found } => write!(
                f,
                "line {}: expected {} columns, found {}",
                line, expected, found
            ),
            PaintError::UnknownGlyph { line, column, glyph } => {
                write!(f, "line {}, column {}: unknown terrain glyph {:?}", line, column, glyph)
            }
        }
    }
}

impl std::error::Error for PaintError {}
