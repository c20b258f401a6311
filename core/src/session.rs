use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - InProgress -> Won
/// - InProgress -> Lost
///
/// Only [`GameSession::restart`] leaves a finished state, with a fresh grid.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    #[default]
    InProgress,
    Won,
    Lost,
}

impl GameStatus {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }

    pub const fn message(self) -> Option<&'static str> {
        match self {
            Self::InProgress => None,
            Self::Won => Some("You won!"),
            Self::Lost => Some("You lost!"),
        }
    }
}

/// A single game: the grid, its status and the generator used to build the
/// next grid on restart.
#[derive(Clone, Debug)]
pub struct GameSession<G = ScanForwardGenerator<SmallRng>> {
    config: GameConfig,
    generator: G,
    grid: Grid,
    status: GameStatus,
}

impl GameSession {
    pub fn seeded(config: GameConfig, seed: u64) -> Result<Self> {
        Self::new(config, ScanForwardGenerator::from_seed(seed))
    }
}

impl<G: MinefieldGenerator> GameSession<G> {
    /// Fails only when the generator hands back a mask that does not fit
    /// `config`.
    pub fn new(config: GameConfig, mut generator: G) -> Result<Self> {
        let grid = Grid::generate(&config, &mut generator)?;
        Ok(Self {
            config,
            generator,
            grid,
            status: GameStatus::InProgress,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    pub fn view(&self, coords: Coord2) -> Option<CellView> {
        self.grid.view(coords)
    }

    /// Reveals a cell. Out-of-bounds coordinates and moves after the game
    /// ended are ignored and report [`RevealOutcome::NoChange`].
    pub fn on_reveal(&mut self, coords: Coord2) -> RevealOutcome {
        self.try_reveal(coords).unwrap_or_else(|err| {
            log::debug!("Ignored reveal at {coords:?}: {err}");
            RevealOutcome::NoChange
        })
    }

    /// Toggles a flag, ignoring the same invalid moves as [`Self::on_reveal`].
    pub fn on_flag(&mut self, coords: Coord2) -> FlagOutcome {
        self.try_flag(coords).unwrap_or_else(|err| {
            log::debug!("Ignored flag at {coords:?}: {err}");
            FlagOutcome::NoChange
        })
    }

    /// Throws away the current grid and starts over with the same config.
    /// On error the current game is left untouched.
    pub fn restart(&mut self) -> Result<()> {
        self.grid = Grid::generate(&self.config, &mut self.generator)?;
        self.status = GameStatus::InProgress;
        log::info!(
            "Restarted {}x{} game with {} mines",
            self.config.width(),
            self.config.height(),
            self.config.mines()
        );
        Ok(())
    }

    fn try_reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        self.check_in_progress()?;

        Ok(match self.grid.reveal(coords)? {
            RevealOutcome::HitMine => {
                self.grid.reveal_all_mines();
                self.end_game(GameStatus::Lost);
                RevealOutcome::HitMine
            }
            RevealOutcome::Revealed if self.grid.check_win() => {
                self.end_game(GameStatus::Won);
                RevealOutcome::Won
            }
            outcome => outcome,
        })
    }

    fn try_flag(&mut self, coords: Coord2) -> Result<FlagOutcome> {
        self.check_in_progress()?;
        self.grid.toggle_flag(coords)
    }

    fn check_in_progress(&self) -> Result<()> {
        if self.status.is_finished() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }

    fn end_game(&mut self, status: GameStatus) {
        self.status = status;
        match self.grid.exploded_mine() {
            Some(coords) if status == GameStatus::Lost => {
                log::info!("Game lost, mine hit at {coords:?}")
            }
            _ => log::info!("Game {status:?}"),
        }
    }
}
