mod block;
mod strategy;

pub use block::{Block, BlockInfo};
pub use strategy::Strategy;

use std::cmp::Reverse;

use thiserror::Error;
use log::{debug, trace, warn};

/// Recoverable failures reported by the allocator. None of them
/// leaves the allocation table modified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocError {
    #[error("Memory allocation failed: no free block of size {size} ({strategy}).")]
    AllocationFailure { size: u64, strategy: Strategy },
    #[error("Memory deallocation failed: no block starts at offset {start}.")]
    DeallocationFailure { start: u64 },
    #[error("Unknown placement strategy '{0}'.")]
    UnknownStrategy(String),
}

/// Allocator over a simulated linear address space
/// `[0, memory_size)`. The space is described by a table of
/// blocks, ordered by offset, that partitions it exactly; no
/// actual memory is ever touched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Allocator {
    /// Size of the address space, fixed at construction.
    memory_size: u64,
    /// Blocks covering the address space, sorted by `start`.
    /// Two consecutive blocks are never both free once an
    /// operation returns.
    table: Vec<Block>,
    /// Total size of the blocks currently allocated.
    allocated: u64,
}

impl Allocator {
    /// Creates an allocator whose whole address space is a
    /// single free block.
    ///
    /// # Panics
    ///
    /// Panics if `memory_size` is zero.
    pub fn new(memory_size: u64) -> Self {
        assert!(memory_size > 0, "Memory size must be greater than zero.");

        Self {
            memory_size,
            table: vec![Block::new(0, memory_size, true)],
            allocated: 0,
        }
    }

    /// Allocates `size` units with the given placement strategy
    /// and returns the offset of the allocation.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn allocate(&mut self, size: u64, strategy: Strategy) -> Result<u64, AllocError> {
        assert!(size > 0, "Allocation size must be greater than zero.");

        // Pick a free block that fits the allocation. If there
        // is none, return early: the table is left as is.
        let index = match self.find_free_block(size, strategy) {
            Some(index) => index,
            None => {
                warn!("No free block of size {size} available ({strategy}).");
                return Err(AllocError::AllocationFailure { size, strategy });
            }
        };

        let block = &mut self.table[index];
        let start = block.start;
        block.free = false;

        // If the block is larger than the request, split it in
        // two parts: the allocated prefix keeps the position of
        // the block in the table, and the remaining space is
        // inserted right after it as a new free block. On an
        // exact fit the block is simply reclaimed.
        if block.size > size {
            let remainder = Block::new(start + size, block.size - size, true);
            block.size = size;
            self.table.insert(index + 1, remainder);
            debug!("Split block at {start}: kept {size}, freed remainder {remainder}.");
        }

        self.allocated += size;
        debug!("Allocated {size} at {start} ({strategy}).");
        Ok(start)
    }

    /// Releases the block starting at `start` and merges it with
    /// its free neighbours.
    ///
    /// Releasing a block that is already free is accepted and
    /// leaves the table unchanged.
    pub fn deallocate(&mut self, start: u64) -> Result<(), AllocError> {
        // The table is sorted by offset, so the block can be
        // looked up by binary search. Only an exact match on the
        // start of a block is accepted.
        let mut index = match self.find_block(start) {
            Some(index) => index,
            None => {
                warn!("No block starts at offset {start}.");
                return Err(AllocError::DeallocationFailure { start });
            }
        };

        let block = &mut self.table[index];
        if block.free {
            debug!("Block {block} is already free.");
        } else {
            block.free = true;
            self.allocated -= block.size;
            debug!("Deallocated {} at {start}.", block.size);
        }

        // Since no two consecutive blocks are free before the
        // call, at most one merge on each side is needed. A free
        // predecessor absorbs the block and becomes the current
        // one...
        if index > 0 && self.table[index - 1].free {
            index -= 1;
            self.merge_with_next(index);
        }

        // ...then a free successor is absorbed into the current
        // block.
        if index + 1 < self.table.len() && self.table[index + 1].free {
            self.merge_with_next(index);
        }

        Ok(())
    }

    /// Total size of the free blocks.
    pub fn fragmentation(&self) -> u64 {
        self.free_space()
    }

    /// Total size of the free blocks.
    ///
    /// This is the same quantity as `fragmentation`: despite the
    /// name, it does not isolate space lost to splits.
    pub fn wasted(&self) -> u64 {
        self.free_space()
    }

    /// Total size of the allocated blocks. Together with the
    /// free space it always adds up to `memory_size`.
    pub fn allocated(&self) -> u64 {
        self.allocated
    }

    pub fn memory_size(&self) -> u64 {
        self.memory_size
    }

    /// Number of blocks in the table. There is always at least
    /// one.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.table
    }

    pub fn block_at(&self, start: u64) -> Option<&Block> {
        self.find_block(start).map(|index| &self.table[index])
    }

    /// Describes every block in ascending offset order. The
    /// iterator borrows the table, so it reflects the state at
    /// the time it is created and can be cloned to walk the
    /// table again.
    pub fn snapshot(&self) -> impl Iterator<Item = BlockInfo> + Clone + '_ {
        self.table.iter().map(Block::info)
    }

    fn free_space(&self) -> u64 {
        self.table
            .iter()
            .filter(|block| block.free)
            .map(|block| block.size)
            .sum()
    }

    fn find_block(&self, start: u64) -> Option<usize> {
        self.table
            .binary_search_by_key(&start, |block| block.start)
            .ok()
    }

    fn find_free_block(&self, size: u64, strategy: Strategy) -> Option<usize> {
        // Candidates are the free blocks large enough for the
        // allocation, in ascending offset order, paired with the
        // space they would have left after it.
        let mut candidates = self.table
            .iter()
            .enumerate()
            .filter(|(_, block)| block.free && block.size >= size)
            .map(|(index, block)| (index, block.size - size));

        // On ties, the lowest offset wins for every strategy:
        // `min_by_key` keeps the first minimum, while for the
        // maximum the index is reversed so that the earliest
        // block compares as the greatest.
        let chosen = match strategy {
            Strategy::FirstFit => candidates.next(),
            Strategy::BestFit => candidates.min_by_key(|&(_, leftover)| leftover),
            Strategy::WorstFit => {
                candidates.max_by_key(|&(index, leftover)| (leftover, Reverse(index)))
            }
        };

        if let Some((index, leftover)) = chosen {
            trace!(
                "{strategy} picked block {} for {size} (leftover {leftover}).",
                self.table[index],
            );
        }

        chosen.map(|(index, _)| index)
    }

    fn merge_with_next(&mut self, index: usize) {
        // Remove the right block from the table, since it will
        // be merged, and grow the left block by its size.
        let right = self.table.remove(index + 1);
        let left = &mut self.table[index];
        left.size += right.size;
        debug!("Merged {right} into block at {}.", left.start);
    }
}
