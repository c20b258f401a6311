use ndarray::Array2;

use crate::{GameError, Result};

/// Single coordinate axis used for board width, height, and positions.
pub type Coord = u16;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u32;

/// Two-dimensional coordinates `(x, y)`.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Board size of an array, saturating dimensions that do not fit a [`Coord`].
/// Grids only hold arrays that passed [`checked_size`].
pub(crate) fn array_size<T>(array: &Array2<T>) -> Coord2 {
    let (x, y) = array.dim();
    (
        x.try_into().unwrap_or(Coord::MAX),
        y.try_into().unwrap_or(Coord::MAX),
    )
}

/// Board size of an array, rejecting empty or oversized dimensions.
pub(crate) fn checked_size<T>(array: &Array2<T>) -> Result<Coord2> {
    let (x, y) = array.dim();
    if x == 0 || y == 0 {
        return Err(GameError::EmptyBoard);
    }
    let x = x.try_into().map_err(|_| GameError::InvalidBoardShape)?;
    let y = y.try_into().map_err(|_| GameError::InvalidBoardShape)?;
    Ok((x, y))
}

/// Next coordinate in row-major order: `x` advances first, then `y`, and the
/// scan wraps from the last cell back to `(0, 0)`.
pub(crate) const fn next_row_major(coords: Coord2, size: Coord2) -> Coord2 {
    let (x, y) = coords;
    let (width, height) = size;
    if x + 1 < width {
        (x + 1, y)
    } else if y + 1 < height {
        (0, y + 1)
    } else {
        (0, 0)
    }
}

pub trait NeighborIterExt {
    fn iter_neighbors(&self, index: Coord2) -> NeighborIter;
}

impl<T> NeighborIterExt for Array2<T> {
    fn iter_neighbors(&self, index: Coord2) -> NeighborIter {
        NeighborIter::new(index, array_size(self))
    }
}

const OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Iterator over the up to eight in-bounds neighbours of a cell.
#[derive(Clone, Debug)]
pub struct NeighborIter {
    center: Coord2,
    bounds: Coord2,
    next: usize,
}

impl NeighborIter {
    pub fn new(center: Coord2, bounds: Coord2) -> Self {
        Self {
            center,
            bounds,
            next: 0,
        }
    }

    fn offset(&self, (dx, dy): (i32, i32)) -> Option<Coord2> {
        let x = i32::from(self.center.0) + dx;
        let y = i32::from(self.center.1) + dy;
        let in_bounds =
            (0..i32::from(self.bounds.0)).contains(&x) && (0..i32::from(self.bounds.1)).contains(&y);
        in_bounds.then_some((x as Coord, y as Coord))
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(&delta) = OFFSETS.get(self.next) {
            self.next += 1;
            if let Some(coords) = self.offset(delta) {
                return Some(coords);
            }
        }
        None
    }
}
