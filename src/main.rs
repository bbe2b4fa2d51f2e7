use memsim::{report, Allocator, Strategy};

use anyhow::Result;
use log::*;

/// Size of the simulated address space.
const MEMORY_SIZE: u64 = 1000;

/// Requests replayed by the demo: each one is allocated,
/// inspected and released again before the next one.
const REQUESTS: &[(u64, &str)] = &[
    (200, "First-Fit"),
    (400, "Best-Fit"),
    (600, "Worst-Fit"),
];

fn main() -> Result<()> {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();

    let mut allocator = Allocator::new(MEMORY_SIZE);
    info!("Created allocator over {MEMORY_SIZE} units.");

    for &(size, name) in REQUESTS {
        // Strategy names are parsed up front: an unknown name
        // is a mistake in the request list, not an allocation
        // failure.
        let strategy: Strategy = name.parse()?;

        let start = match allocator.allocate(size, strategy) {
            Ok(start) => start,
            Err(error) => {
                warn!("{error}");
                println!("Memory allocation failed!");
                continue;
            }
        };

        println!("Allocation result: start = {start}");
        print!("{}", report::allocation_table(&allocator));
        print!("{}", report::summary(&allocator));

        if let Err(error) = allocator.deallocate(start) {
            warn!("{error}");
            println!("Memory deallocation failed!");
        }
        print!("{}", report::allocation_table(&allocator));
    }

    info!("Demo finished.");
    Ok(())
}
