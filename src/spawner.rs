//! Spawner: the bounded pool of blocks currently on offer.

use crate::catalog::{BlockColor, Catalog, Shape};
use crate::error::EngineError;
use rand::Rng;
use rand::rngs::StdRng;

/// One offered block: a catalog shape and a colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub shape: &'static Shape,
    pub color: BlockColor,
}

/// Pool of up to `capacity` blocks, refilled all at once when it runs dry.
#[derive(Debug, Clone)]
pub struct Spawner {
    catalog: Catalog,
    capacity: usize,
    pool: Vec<Block>,
    rng: StdRng,
}

impl Spawner {
    /// New spawner with a full pool.
    pub fn new(catalog: Catalog, capacity: usize, rng: StdRng) -> Result<Self, EngineError> {
        if capacity == 0 {
            return Err(EngineError::ZeroCapacity);
        }
        let mut spawner = Self {
            catalog,
            capacity,
            pool: Vec::with_capacity(capacity),
            rng,
        };
        spawner.respawn();
        Ok(spawner)
    }

    /// Replace the whole pool with `capacity` freshly sampled blocks (shape and
    /// colour drawn independently, with replacement).
    pub fn respawn(&mut self) {
        let shapes = self.catalog.shapes();
        let colors = self.catalog.colors();
        let pool = (0..self.capacity)
            .map(|_| Block {
                shape: shapes[self.rng.gen_range(0..shapes.len())],
                color: colors[self.rng.gen_range(0..colors.len())],
            })
            .collect();
        self.pool = pool;
        log::debug!(
            "respawned pool: {:?}",
            self.pool.iter().map(|b| b.shape.name).collect::<Vec<_>>()
        );
    }

    /// Remove and return the block at `index`; later blocks shift down by one.
    pub fn remove_block(&mut self, index: usize) -> Result<Block, EngineError> {
        if index >= self.pool.len() {
            return Err(EngineError::IndexOutOfRange {
                index,
                len: self.pool.len(),
            });
        }
        Ok(self.pool.remove(index))
    }

    /// Per-tick replenishment check. Returns true if the pool was refilled.
    pub fn refill_if_empty(&mut self) -> bool {
        if self.pool.is_empty() {
            self.respawn();
            true
        } else {
            false
        }
    }

    pub fn get(&self, index: usize) -> Result<&Block, EngineError> {
        self.pool.get(index).ok_or(EngineError::IndexOutOfRange {
            index,
            len: self.pool.len(),
        })
    }

    #[inline]
    pub fn blocks(&self) -> &[Block] {
        &self.pool
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
