use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::*;
use crate::types::next_row_major;

/// Places each mine at a random coordinate, scanning forward in row-major
/// order past cells that already hold a mine. One draw per mine, no resampling.
#[derive(Clone, Debug)]
pub struct ScanForwardGenerator<R> {
    rng: R,
}

impl ScanForwardGenerator<SmallRng> {
    pub fn from_seed(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> ScanForwardGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> MinefieldGenerator for ScanForwardGenerator<R> {
    fn place_mines(&mut self, config: &GameConfig) -> Array2<bool> {
        place_mines_scan_forward(config, &mut self.rng)
    }
}

pub fn place_mines_scan_forward<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Array2<bool> {
    let size = config.size();
    let mut mines: Array2<bool> = Array2::default(size.to_nd_index());

    // full boards need no scanning
    if config.mines() >= config.total_cells() {
        mines.fill(true);
        return mines;
    }

    for _ in 0..config.mines() {
        let mut coords = (rng.random_range(0..size.0), rng.random_range(0..size.1));
        // terminates: fewer mines than cells leaves a free slot
        while mines[coords.to_nd_index()] {
            coords = next_row_major(coords, size);
        }
        mines[coords.to_nd_index()] = true;
    }

    mines
}
