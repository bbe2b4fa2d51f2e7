pub mod memory;
pub mod report;

pub use memory::allocator::{AllocError, Allocator, Block, BlockInfo, Strategy};
