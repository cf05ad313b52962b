//! Game state: grid + spawner behind the controller protocol (query, drop, tick).

use crate::GameConfig;
use crate::catalog::Catalog;
use crate::error::EngineError;
use crate::grid::Grid;
use crate::spawner::{Block, Spawner};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Result of a successful drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropOutcome {
    /// The block that left the pool.
    pub block: Block,
    /// Rows + columns cleared by this drop.
    pub lines: u32,
}

#[derive(Debug)]
pub struct GameState {
    grid: Grid,
    spawner: Spawner,
    lines_cleared: u32,
    blocks_placed: u32,
    game_over: bool,
}

impl GameState {
    pub fn new(config: &GameConfig) -> Result<Self, EngineError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: &GameConfig, rng: StdRng) -> Result<Self, EngineError> {
        let grid = Grid::new(config.width, config.height)?;
        let catalog = Catalog::standard().fitting(config.width, config.height)?;
        let spawner = Spawner::new(catalog, config.pool_size, rng)?;
        log::info!(
            "new game: {}x{} grid, pool of {}",
            config.width,
            config.height,
            config.pool_size
        );
        let mut state = Self {
            grid,
            spawner,
            lines_cleared: 0,
            blocks_placed: 0,
            game_over: false,
        };
        state.game_over = state.is_stuck();
        Ok(state)
    }

    /// Fresh grid and pool with the same dimensions; keeps the RNG stream.
    pub fn reset(&mut self) {
        self.grid.clear();
        self.spawner.respawn();
        self.lines_cleared = 0;
        self.blocks_placed = 0;
        self.game_over = self.is_stuck();
        log::info!("game reset");
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn pool(&self) -> &[Block] {
        self.spawner.blocks()
    }

    pub fn block(&self, index: usize) -> Result<&Block, EngineError> {
        self.spawner.get(index)
    }

    #[inline]
    pub fn pool_capacity(&self) -> usize {
        self.spawner.capacity()
    }

    #[inline]
    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    #[inline]
    pub fn blocks_placed(&self) -> u32 {
        self.blocks_placed
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Placement preview for pool block `index` anchored at (ax, ay).
    /// A stale index is simply not placeable.
    pub fn can_drop(&self, index: usize, ax: i32, ay: i32) -> bool {
        self.spawner
            .get(index)
            .is_ok_and(|b| self.grid.can_place(b.shape, ax, ay))
    }

    /// Place pool block `index` at (ax, ay), clear completed lines and take the
    /// block out of the pool. Nothing changes on error.
    pub fn drop_block(&mut self, index: usize, ax: i32, ay: i32) -> Result<DropOutcome, EngineError> {
        if self.game_over {
            return Err(EngineError::GameOver);
        }
        let block = *self.spawner.get(index)?;
        self.grid.place(block.shape, ax, ay, block.color)?;
        let lines = self.grid.clear_completed_lines();
        self.spawner.remove_block(index)?;
        self.lines_cleared += lines;
        self.blocks_placed += 1;
        Ok(DropOutcome { block, lines })
    }

    /// Once per frame: refill an empty pool, then check whether any pooled
    /// block still fits.
    pub fn tick(&mut self) {
        if self.spawner.refill_if_empty() {
            log::debug!("pool empty, refilled to {}", self.spawner.len());
        }
        if !self.game_over && self.is_stuck() {
            self.game_over = true;
            log::info!(
                "game over: {} blocks placed, {} lines cleared",
                self.blocks_placed,
                self.lines_cleared
            );
        }
    }

    /// No block in a non-empty pool fits anywhere on the grid.
    fn is_stuck(&self) -> bool {
        !self.spawner.is_empty()
            && self
                .spawner
                .blocks()
                .iter()
                .all(|b| !self.grid.fits_anywhere(b.shape))
    }
}
