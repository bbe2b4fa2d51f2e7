use std::fmt::Write;

use crate::memory::allocator::Allocator;

/// Renders the allocation table, one line per block in offset
/// order:
///
/// ```text
/// Allocation Table:
/// Block 0: (0, 199, 200, false)
/// Block 1: (200, 999, 800, true)
/// ```
pub fn allocation_table(allocator: &Allocator) -> String {
    let mut out = String::from("Allocation Table:\n");
    for (index, block) in allocator.snapshot().enumerate() {
        // Writing into a String cannot fail.
        let _ = writeln!(out, "Block {index}: {block}");
    }
    out
}

/// Renders the free space counters of the allocator.
pub fn summary(allocator: &Allocator) -> String {
    format!(
        "Fragmentation: {}\nWasted Memory: {}\n",
        allocator.fragmentation(),
        allocator.wasted(),
    )
}
