use std::fmt;

/// Contiguous, non-empty portion of the simulated address
/// space, either free or held by an allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Block {
    /// Offset of the block within the address space.
    pub start: u64,
    /// Size of the block; never zero.
    pub size: u64,
    /// Whether the block can be handed out by `allocate`.
    pub free: bool,
}

impl Block {
    pub fn new(start: u64, size: u64, free: bool) -> Self {
        Self { start, size, free }
    }

    /// Last offset covered by the block (inclusive).
    pub fn end(&self) -> u64 {
        self.start + self.size - 1
    }

    /// Offset right after the block, which is where the next
    /// block of the table starts.
    pub fn next_start(&self) -> u64 {
        self.start + self.size
    }

    pub fn info(&self) -> BlockInfo {
        BlockInfo {
            start: self.start,
            end: self.end(),
            size: self.size,
            free: self.free,
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.info(), f)
    }
}

/// Read-only description of a block, as handed out by
/// `Allocator::snapshot`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockInfo {
    pub start: u64,
    pub end: u64,
    pub size: u64,
    pub free: bool,
}

impl fmt::Display for BlockInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.start, self.end, self.size, self.free)
    }
}
