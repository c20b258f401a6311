use ndarray::Array2;

use crate::*;
use crate::types::array_size;
pub use scan::*;

mod scan;

/// Source of mine layouts, asked once per new game or restart.
pub trait MinefieldGenerator {
    /// Mine mask indexed `[x, y]`, with the dimensions of `config`.
    fn place_mines(&mut self, config: &GameConfig) -> Array2<bool>;
}

impl<G: MinefieldGenerator + ?Sized> MinefieldGenerator for &mut G {
    fn place_mines(&mut self, config: &GameConfig) -> Array2<bool> {
        (**self).place_mines(config)
    }
}

/// Generator that hands out the same explicit layout every time.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedMines {
    mine_mask: Array2<bool>,
    mine_count: CellCount,
}

impl FixedMines {
    pub fn new(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let config = GameConfig::new(size, 0)?;
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());
        let mut mine_count = 0;

        for &coords in mine_coords {
            if !config.contains(coords) {
                return Err(GameError::InvalidCoords);
            }
            let slot = &mut mine_mask[coords.to_nd_index()];
            if !*slot {
                *slot = true;
                mine_count += 1;
            }
        }

        Ok(Self {
            mine_mask,
            mine_count,
        })
    }

    /// Config describing this layout, duplicates counted once.
    pub fn config(&self) -> GameConfig {
        GameConfig {
            size: array_size(&self.mine_mask),
            mines: self.mine_count,
        }
    }
}

impl MinefieldGenerator for FixedMines {
    fn place_mines(&mut self, config: &GameConfig) -> Array2<bool> {
        if *config != self.config() {
            log::warn!(
                "Fixed layout is {:?} with {} mines, but {:?} with {} mines was requested",
                array_size(&self.mine_mask),
                self.mine_count,
                config.size(),
                config.mines()
            );
        }
        self.mine_mask.clone()
    }
}
