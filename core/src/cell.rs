use serde::{Deserialize, Serialize};

/// What a cell holds. Fixed once the grid has been generated.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellKind {
    /// Safe cell with no adjacent mines.
    #[default]
    Empty,
    Mine,
    /// Safe cell bordering `1..=8` mines.
    Number(u8),
}

impl CellKind {
    /// Kind of a safe cell with `adjacent_mines` mines around it, never `Number(0)`.
    pub const fn safe(adjacent_mines: u8) -> Self {
        match adjacent_mines {
            0 => Self::Empty,
            count => Self::Number(count),
        }
    }

    pub const fn is_mine(self) -> bool {
        matches!(self, Self::Mine)
    }

    pub const fn adjacent_mines(self) -> u8 {
        match self {
            Self::Number(count) => count,
            Self::Empty | Self::Mine => 0,
        }
    }
}

/// Per-coordinate record stored by the grid.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    kind: CellKind,
    revealed: bool,
    flagged: bool,
    exploded: bool,
}

impl Cell {
    pub const fn new(kind: CellKind) -> Self {
        Self {
            kind,
            revealed: false,
            flagged: false,
            exploded: false,
        }
    }

    pub const fn kind(&self) -> CellKind {
        self.kind
    }

    pub const fn is_mine(&self) -> bool {
        self.kind.is_mine()
    }

    pub const fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub const fn is_flagged(&self) -> bool {
        self.flagged
    }

    /// Only the mine that ended the game is exploded.
    pub const fn is_exploded(&self) -> bool {
        self.exploded
    }

    /// Flagged and revealed cells both ignore reveal requests.
    pub const fn can_reveal(&self) -> bool {
        !self.revealed && !self.flagged
    }

    pub(crate) fn reveal(&mut self) {
        self.revealed = true;
    }

    pub(crate) fn explode(&mut self) {
        self.exploded = true;
    }

    pub(crate) fn set_flagged(&mut self, flagged: bool) {
        self.flagged = flagged;
    }
}

/// Read-only snapshot of a cell, everything a renderer needs to pick a tile.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellView {
    pub kind: CellKind,
    pub revealed: bool,
    pub flagged: bool,
    pub exploded: bool,
    pub adjacent_mines: u8,
}

impl CellView {
    /// Single character tile for text front-ends.
    pub const fn glyph(&self) -> char {
        if !self.revealed {
            return if self.flagged { 'F' } else { '#' };
        }

        match self.kind {
            CellKind::Empty => '.',
            CellKind::Mine if self.exploded => 'X',
            CellKind::Mine => '*',
            CellKind::Number(count) => match char::from_digit(count as u32, 10) {
                Some(digit) => digit,
                None => '?',
            },
        }
    }
}
