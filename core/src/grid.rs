use alloc::vec::Vec;
use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;
use crate::types::{array_size, checked_size};

/// Owned board of [`Cell`]s indexed `[x, y]`, plus the counters needed to
/// answer win and mine-left queries without a full scan.
///
/// Only the cells are serialized. Deserializing rebuilds the counters and
/// rejects cells whose numbers disagree with their neighbouring mines.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct Grid {
    cells: Array2<Cell>,
    #[serde(skip_serializing)]
    mine_count: CellCount,
    #[serde(skip_serializing)]
    safe_revealed: CellCount,
    #[serde(skip_serializing)]
    flagged_count: CellCount,
    #[serde(skip_serializing)]
    exploded_mine: Option<Coord2>,
}

#[derive(Deserialize)]
struct RawGrid {
    cells: Array2<Cell>,
}

impl TryFrom<RawGrid> for Grid {
    type Error = GameError;

    fn try_from(raw: RawGrid) -> Result<Self> {
        checked_size(&raw.cells)?;
        let grid = Self::with_counters(raw.cells);
        grid.check_consistency()?;
        Ok(grid)
    }
}

impl Grid {
    pub fn generate<G: MinefieldGenerator + ?Sized>(
        config: &GameConfig,
        generator: &mut G,
    ) -> Result<Self> {
        let mine_mask = generator.place_mines(config);
        if checked_size(&mine_mask)? != config.size() {
            return Err(GameError::InvalidBoardShape);
        }
        let grid = Self::from_mine_mask(mine_mask)?;

        if grid.mine_count != config.mines() {
            log::warn!(
                "Generated mine count mismatch, actual: {}, requested: {}",
                grid.mine_count,
                config.mines()
            );
        }
        log::debug!(
            "Generated {}x{} grid with {} mines",
            grid.width(),
            grid.height(),
            grid.mine_count
        );
        Ok(grid)
    }

    /// Builds cells from a mine mask, numbering every safe cell by its
    /// adjacent mines.
    pub fn from_mine_mask(mine_mask: Array2<bool>) -> Result<Self> {
        checked_size(&mine_mask)?;

        let mut cells = mine_mask.map(|&is_mine| {
            Cell::new(if is_mine {
                CellKind::Mine
            } else {
                CellKind::Empty
            })
        });

        for ((x, y), &is_mine) in mine_mask.indexed_iter() {
            if is_mine {
                continue;
            }
            let coords = (x as Coord, y as Coord);
            let adjacent = mine_mask
                .iter_neighbors(coords)
                .filter(|&pos| mine_mask[pos.to_nd_index()])
                .count();
            cells[coords.to_nd_index()] = Cell::new(CellKind::safe(adjacent as u8));
        }

        Ok(Self::with_counters(cells))
    }

    fn with_counters(cells: Array2<Cell>) -> Self {
        let mut mine_count = 0;
        let mut safe_revealed = 0;
        let mut flagged_count = 0;
        let mut exploded_mine = None;

        for ((x, y), cell) in cells.indexed_iter() {
            if cell.is_mine() {
                mine_count += 1;
            } else if cell.is_revealed() {
                safe_revealed += 1;
            }
            if cell.is_flagged() {
                flagged_count += 1;
            }
            if cell.is_exploded() && exploded_mine.is_none() {
                exploded_mine = Some((x as Coord, y as Coord));
            }
        }

        Self {
            cells,
            mine_count,
            safe_revealed,
            flagged_count,
            exploded_mine,
        }
    }

    /// Numbers must match the adjacent mines, and at most one mine may be
    /// exploded.
    fn check_consistency(&self) -> Result<()> {
        let mut exploded = 0;

        for ((x, y), cell) in self.cells.indexed_iter() {
            let coords = (x as Coord, y as Coord);
            if cell.is_exploded() {
                exploded += 1;
                if !cell.is_mine() || exploded > 1 {
                    return Err(GameError::InconsistentCells);
                }
            }
            if !cell.is_mine() && cell.kind() != CellKind::safe(self.count_adjacent_mines(coords)?) {
                return Err(GameError::InconsistentCells);
            }
        }
        Ok(())
    }

    pub fn size(&self) -> Coord2 {
        array_size(&self.cells)
    }

    pub fn width(&self) -> Coord {
        self.size().0
    }

    pub fn height(&self) -> Coord {
        self.size().1
    }

    pub fn total_cells(&self) -> CellCount {
        let (width, height) = self.size();
        mult(width, height)
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    /// Revealed cells of any kind, mines exposed after a loss included.
    pub fn revealed_count(&self) -> CellCount {
        self.cells.iter().filter(|cell| cell.is_revealed()).count() as CellCount
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count
    }

    /// Mines minus flags. Goes negative when the player over-flags.
    pub fn mines_left(&self) -> i64 {
        i64::from(self.mine_count) - i64::from(self.flagged_count)
    }

    pub fn exploded_mine(&self) -> Option<Coord2> {
        self.exploded_mine
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn cell_at(&self, coords: Coord2) -> Option<Cell> {
        let coords = self.validate_coords(coords).ok()?;
        Some(self[coords])
    }

    pub fn count_adjacent_mines(&self, coords: Coord2) -> Result<u8> {
        let coords = self.validate_coords(coords)?;
        Ok(self
            .cells
            .iter_neighbors(coords)
            .filter(|&pos| self[pos].is_mine())
            .count() as u8)
    }

    pub fn view(&self, coords: Coord2) -> Option<CellView> {
        let cell = self.cell_at(coords)?;
        let adjacent_mines = match cell.kind() {
            CellKind::Mine => self.count_adjacent_mines(coords).ok()?,
            kind => kind.adjacent_mines(),
        };

        Some(CellView {
            kind: cell.kind(),
            revealed: cell.is_revealed(),
            flagged: cell.is_flagged(),
            exploded: cell.is_exploded(),
            adjacent_mines,
        })
    }

    /// All cells in row-major order: `x` varies fastest.
    pub fn iter_views(&self) -> impl Iterator<Item = (Coord2, CellView)> + '_ {
        let (width, height) = self.size();
        (0..height)
            .flat_map(move |y| (0..width).map(move |x| (x, y)))
            .filter_map(|coords| Some((coords, self.view(coords)?)))
    }

    /// Reveals one cell and, when it is empty, floods outward until the
    /// region is bordered by numbers. Hitting a mine explodes it and stops.
    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.validate_coords(coords)?;
        let cell = self[coords];

        if !cell.can_reveal() {
            return Ok(RevealOutcome::NoChange);
        }

        self.reveal_cell(coords);
        match cell.kind() {
            CellKind::Mine => {
                self.cells[coords.to_nd_index()].explode();
                self.exploded_mine = Some(coords);
                Ok(RevealOutcome::HitMine)
            }
            CellKind::Number(_) => Ok(RevealOutcome::Revealed),
            CellKind::Empty => {
                self.flood_from(coords);
                Ok(RevealOutcome::Revealed)
            }
        }
    }

    fn flood_from(&mut self, origin: Coord2) {
        let mut to_visit = Vec::from([origin]);

        while let Some(coords) = to_visit.pop() {
            for pos in self.cells.iter_neighbors(coords) {
                let neighbor = self[pos];
                // mines never border an empty cell
                if !neighbor.can_reveal() || neighbor.is_mine() {
                    continue;
                }
                self.reveal_cell(pos);
                if neighbor.kind() == CellKind::Empty {
                    to_visit.push(pos);
                }
            }
        }
    }

    fn reveal_cell(&mut self, coords: Coord2) {
        let cell = &mut self.cells[coords.to_nd_index()];
        cell.reveal();
        if !cell.is_mine() {
            self.safe_revealed += 1;
        }
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<FlagOutcome> {
        let coords = self.validate_coords(coords)?;
        let cell = &mut self.cells[coords.to_nd_index()];

        if cell.is_revealed() {
            return Ok(FlagOutcome::NoChange);
        }

        if cell.is_flagged() {
            cell.set_flagged(false);
            self.flagged_count -= 1;
        } else {
            cell.set_flagged(true);
            self.flagged_count += 1;
        }
        Ok(FlagOutcome::Changed)
    }

    /// Whether every safe cell has been revealed.
    pub fn is_cleared(&self) -> bool {
        self.safe_revealed == self.safe_cell_count()
    }

    /// Like [`Grid::is_cleared`], but on success also flags every mine.
    pub fn check_win(&mut self) -> bool {
        if !self.is_cleared() {
            return false;
        }

        for cell in self.cells.iter_mut() {
            if cell.is_mine() && !cell.is_flagged() {
                cell.set_flagged(true);
                self.flagged_count += 1;
            }
        }
        true
    }

    /// Exposes every mine, used to show the board after a loss.
    pub fn reveal_all_mines(&mut self) {
        self.cells
            .iter_mut()
            .filter(|cell| cell.is_mine())
            .for_each(Cell::reveal);
    }
}

impl Index<Coord2> for Grid {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;
    use serde_json::Value;

    fn grid(size: Coord2, mines: &[Coord2]) -> Grid {
        let mut fixed = FixedMines::new(size, mines).unwrap();
        let config = fixed.config();
        Grid::generate(&config, &mut fixed).unwrap()
    }

    fn revealed(grid: &Grid) -> Vec<Coord2> {
        grid.iter_views()
            .filter(|(_, view)| view.revealed)
            .map(|(coords, _)| coords)
            .collect()
    }

    #[test]
    fn numbers_match_adjacent_mines() {
        let grid = grid((3, 3), &[(0, 0), (2, 0)]);

        assert_eq!(grid[(1, 0)].kind(), CellKind::Number(2));
        assert_eq!(grid[(1, 1)].kind(), CellKind::Number(2));
        assert_eq!(grid[(0, 1)].kind(), CellKind::Number(1));
        assert_eq!(grid[(0, 2)].kind(), CellKind::Empty);
        assert_eq!(grid[(0, 0)].kind(), CellKind::Mine);
    }

    #[test]
    fn generated_grids_hold_invariants() {
        let config = GameConfig::new((12, 9), 30).unwrap();

        for seed in 0..32 {
            let grid = Grid::generate(&config, &mut ScanForwardGenerator::from_seed(seed)).unwrap();

            assert_eq!(grid.mine_count(), 30);
            let mines = grid.iter_views().filter(|(_, view)| view.kind.is_mine()).count();
            assert_eq!(mines, 30);

            for (coords, view) in grid.iter_views() {
                let actual = grid.count_adjacent_mines(coords).unwrap();
                match view.kind {
                    CellKind::Mine => {}
                    CellKind::Empty => assert_eq!(actual, 0),
                    CellKind::Number(count) => {
                        assert!((1..=8).contains(&count));
                        assert_eq!(count, actual);
                    }
                }
            }
        }
    }

    #[test]
    fn revealing_number_reveals_only_itself() {
        let mut grid = grid((3, 3), &[(0, 0)]);

        assert_eq!(grid.reveal((1, 1)), Ok(RevealOutcome::Revealed));
        assert_eq!(revealed(&grid), vec![(1, 1)]);
    }

    #[test]
    fn revealing_mine_explodes_only_that_cell() {
        let mut grid = grid((3, 3), &[(0, 0), (2, 2)]);

        assert_eq!(grid.reveal((0, 0)), Ok(RevealOutcome::HitMine));
        assert_eq!(revealed(&grid), vec![(0, 0)]);
        assert!(grid[(0, 0)].is_exploded());
        assert!(!grid[(2, 2)].is_exploded());
        assert_eq!(grid.exploded_mine(), Some((0, 0)));
    }

    #[test]
    fn flood_stops_at_number_border() {
        // column x = 2 holds mines, x = 1 are numbers, x = 0 is empty
        let mut grid = grid((5, 3), &[(2, 0), (2, 1), (2, 2)]);

        assert_eq!(grid.reveal((0, 1)), Ok(RevealOutcome::Revealed));

        let expected = vec![(0, 0), (1, 0), (0, 1), (1, 1), (0, 2), (1, 2)];
        assert_eq!(revealed(&grid), expected);
        assert!(!grid.is_cleared());
    }

    #[test]
    fn flood_skips_flagged_cells() {
        let mut grid = grid((4, 1), &[]);
        grid.toggle_flag((2, 0)).unwrap();

        grid.reveal((0, 0)).unwrap();

        assert_eq!(revealed(&grid), vec![(0, 0), (1, 0)]);
        assert!(grid[(2, 0)].is_flagged());
    }

    #[test]
    fn flood_handles_large_empty_board() {
        let mut grid = grid((512, 512), &[]);

        grid.reveal((0, 0)).unwrap();

        assert_eq!(grid.revealed_count(), 512 * 512);
        assert!(grid.is_cleared());
    }

    #[test]
    fn reveal_is_noop_on_flagged_or_revealed() {
        let mut grid = grid((2, 2), &[(0, 0)]);
        grid.toggle_flag((0, 0)).unwrap();

        assert_eq!(grid.reveal((0, 0)), Ok(RevealOutcome::NoChange));
        assert_eq!(grid.reveal((1, 1)), Ok(RevealOutcome::Revealed));
        assert_eq!(grid.reveal((1, 1)), Ok(RevealOutcome::NoChange));
        assert_eq!(grid.revealed_count(), 1);
    }

    #[test]
    fn out_of_bounds_is_rejected() {
        let mut grid = grid((2, 2), &[]);

        assert_eq!(grid.reveal((2, 0)), Err(GameError::InvalidCoords));
        assert_eq!(grid.toggle_flag((0, 2)), Err(GameError::InvalidCoords));
        assert_eq!(grid.count_adjacent_mines((5, 5)), Err(GameError::InvalidCoords));
        assert_eq!(grid.view((2, 2)), None);
    }

    #[test]
    fn toggle_flag_flips_only_unrevealed_cells() {
        let mut grid = grid((2, 2), &[(0, 0)]);
        grid.reveal((1, 1)).unwrap();

        assert_eq!(grid.toggle_flag((1, 1)), Ok(FlagOutcome::NoChange));
        assert!(!grid[(1, 1)].is_flagged());

        assert_eq!(grid.toggle_flag((0, 1)), Ok(FlagOutcome::Changed));
        assert!(grid[(0, 1)].is_flagged());
        assert!(!grid[(0, 0)].is_flagged());
        assert_eq!(grid.mines_left(), 0);

        assert_eq!(grid.toggle_flag((0, 1)), Ok(FlagOutcome::Changed));
        assert!(!grid[(0, 1)].is_flagged());
        assert_eq!(grid.flagged_count(), 0);
    }

    #[test]
    fn check_win_flags_all_mines_once_cleared() {
        let mut grid = grid((3, 1), &[(0, 0)]);

        grid.reveal((1, 0)).unwrap();
        assert!(!grid.check_win());
        assert!(!grid[(0, 0)].is_flagged());

        grid.reveal((2, 0)).unwrap();
        assert!(grid.check_win());
        assert!(grid[(0, 0)].is_flagged());
        assert_eq!(grid.revealed_count(), grid.total_cells() - grid.mine_count());
        assert_eq!(grid.flagged_count(), 1);
    }

    #[test]
    fn reveal_all_mines_leaves_safe_cells_alone() {
        let mut grid = grid((3, 3), &[(0, 0), (2, 2)]);

        grid.reveal_all_mines();

        assert_eq!(revealed(&grid), vec![(0, 0), (2, 2)]);
        assert!(!grid.is_cleared());
    }

    #[test]
    fn view_reports_adjacent_mines_for_mines_too() {
        let grid = grid((2, 1), &[(0, 0), (1, 0)]);

        let view = grid.view((0, 0)).unwrap();

        assert_eq!(view.kind, CellKind::Mine);
        assert_eq!(view.adjacent_mines, 1);
        assert!(!view.revealed);
    }

    #[test]
    fn from_mine_mask_rejects_unplayable_shapes() {
        assert_eq!(
            Grid::from_mine_mask(Array2::default((0, 0))),
            Err(GameError::EmptyBoard)
        );
        assert_eq!(
            Grid::from_mine_mask(Array2::default((3, 0))),
            Err(GameError::EmptyBoard)
        );
        assert_eq!(
            Grid::from_mine_mask(Array2::default((65536, 1))),
            Err(GameError::InvalidBoardShape)
        );
    }

    #[test]
    fn from_mine_mask_counts_mines() {
        let mut mask: Array2<bool> = Array2::default((2, 3));
        mask[[1, 2]] = true;

        let grid = Grid::from_mine_mask(mask).unwrap();

        assert_eq!(grid.size(), (2, 3));
        assert_eq!(grid.mine_count(), 1);
        assert_eq!(grid[(0, 1)].kind(), CellKind::Number(1));
        assert!(!grid.is_cleared());
    }

    #[test]
    fn generate_rejects_mask_of_wrong_shape() {
        let mut fixed = FixedMines::new((3, 3), &[(1, 1)]).unwrap();
        let config = GameConfig::new((4, 4), 1).unwrap();

        assert_eq!(
            Grid::generate(&config, &mut fixed),
            Err(GameError::InvalidBoardShape)
        );
    }

    #[test]
    fn deserialize_rebuilds_counters_from_cells() {
        let mut grid = grid((2, 2), &[(0, 0)]);
        grid.toggle_flag((0, 0)).unwrap();
        grid.reveal((1, 1)).unwrap();

        let mut value = serde_json::to_value(&grid).unwrap();
        assert!(value.get("flagged_count").is_none());
        value["flagged_count"] = Value::from(0);
        value["safe_revealed"] = Value::from(3);

        let mut restored: Grid = serde_json::from_value(value).unwrap();

        assert_eq!(restored, grid);
        assert_eq!(restored.flagged_count(), 1);
        assert!(!restored.is_cleared());
        assert_eq!(restored.toggle_flag((0, 0)), Ok(FlagOutcome::Changed));
        assert_eq!(restored.flagged_count(), 0);
    }

    #[test]
    fn deserialize_keeps_exploded_mine() {
        let mut grid = grid((3, 3), &[(0, 0), (2, 2)]);
        grid.reveal((2, 2)).unwrap();

        let json = serde_json::to_string(&grid).unwrap();
        let restored: Grid = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.exploded_mine(), Some((2, 2)));
        assert_eq!(restored, grid);
    }

    #[test]
    fn deserialize_rejects_wrong_numbers() {
        let grid = grid((2, 2), &[(0, 0)]);
        let mut value = serde_json::to_value(&grid).unwrap();
        // (1, 1) borders the mine, so it cannot be empty
        value["cells"]["data"][3]["kind"] = Value::from("Empty");

        let err = serde_json::from_value::<Grid>(value).unwrap_err();

        assert!(err.to_string().contains("do not match their neighbours"));
    }

    #[test]
    fn deserialize_rejects_exploded_safe_cell() {
        let grid = grid((2, 2), &[(0, 0)]);
        let mut value = serde_json::to_value(&grid).unwrap();
        value["cells"]["data"][3]["exploded"] = Value::from(true);

        assert!(serde_json::from_value::<Grid>(value).is_err());
    }
}
