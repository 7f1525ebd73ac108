use bevy::prelude::*;
use super::error::PaintError;
use super::types::{Cell, Terrain};

/// Painted map layer the navigation graphs are derived from.
///
/// Painting itself belongs to the editor; the route core only reads it.
/// Any mutable access through `ResMut<MapPaint>` counts as an edit and
/// rebuilds every faction graph before the next resolution pass.
#[derive(Resource, Clone, Debug, Default, PartialEq)]
pub struct MapPaint {
    width: usize,
    height: usize,
    cells: Vec<Terrain>,
}

/// Explicit rebuild trigger for edits made outside `ResMut<MapPaint>`.
#[derive(Event, Message, Debug, Clone, Default)]
pub struct MapEdited;

impl MapPaint {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Terrain::Open; width * height],
        }
    }

    /// Parse a text layer: `.` open, `#` wall, `~` vent. One row per line.
    pub fn from_ascii(text: &str) -> Result<Self, PaintError> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();
        let Some(first) = rows.first() else {
            return Err(PaintError::Empty);
        };

        let width = first.chars().count();
        let mut cells = Vec::with_capacity(width * rows.len());
        for (line, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(PaintError::RaggedRow { line: line + 1, expected: width, found });
            }
            for (column, glyph) in row.chars().enumerate() {
                let terrain = Terrain::from_glyph(glyph).ok_or(PaintError::UnknownGlyph {
                    line: line + 1,
                    column: column + 1,
                    glyph,
                })?;
                cells.push(terrain);
            }
        }

        Ok(Self { width, height: rows.len(), cells })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as usize) < self.width && (cell.y as usize) < self.height
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        self.contains(cell)
            .then(|| cell.y as usize * self.width + cell.x as usize)
    }

    pub fn get(&self, cell: Cell) -> Option<Terrain> {
        self.index(cell).map(|idx| self.cells[idx])
    }

    /// Paint one cell. Returns false when the cell is off the map.
    pub fn set(&mut self, cell: Cell, terrain: Terrain) -> bool {
        match self.index(cell) {
            Some(idx) => {
                self.cells[idx] = terrain;
                true
            }
            None => false,
        }
    }

    /// Paint an axis-aligned rectangle, clipped to the map.
    pub fn fill_rect(&mut self, min: Cell, max: Cell, terrain: Terrain) {
        for y in min.y..=max.y {
            for x in min.x..=max.x {
                self.set(Cell::new(x, y), terrain);
            }
        }
    }

    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for row in self.cells.chunks(self.width.max(1)) {
            out.extend(row.iter().map(|t| t.glyph()));
            out.push('\n');
        }
        out
    }
}
