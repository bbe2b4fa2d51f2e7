use memsim::{Allocator, Strategy};
use proptest::{prelude::*, strategy::Strategy as PropStrategy};

#[derive(Clone, Debug)]
enum Op {
    Allocate(u64, Strategy),
    /// Releases the n-th live allocation, modulo their count.
    Release(usize),
    /// Releases an arbitrary offset, which may or may not start
    /// a block.
    ReleaseAt(u64),
}

fn fit_strategy() -> impl PropStrategy<Value = Strategy> {
    prop_oneof![
        Just(Strategy::FirstFit),
        Just(Strategy::BestFit),
        Just(Strategy::WorstFit),
    ]
}

fn op(memory_size: u64) -> impl PropStrategy<Value = Op> {
    prop_oneof![
        3 => (1..=memory_size, fit_strategy()).prop_map(|(size, s)| Op::Allocate(size, s)),
        2 => any::<usize>().prop_map(Op::Release),
        1 => (0..memory_size).prop_map(Op::ReleaseAt),
    ]
}

fn check_table(allocator: &Allocator) -> Result<(), TestCaseError> {
    let blocks = allocator.blocks();
    prop_assert!(!blocks.is_empty());
    prop_assert_eq!(blocks[0].start, 0);

    let mut next = 0;
    for block in blocks {
        prop_assert!(block.size > 0);
        prop_assert_eq!(block.start, next);
        next = block.start + block.size;
    }
    prop_assert_eq!(next, allocator.memory_size());

    for pair in blocks.windows(2) {
        prop_assert!(!(pair[0].free && pair[1].free), "adjacent free blocks: {:?}", pair);
    }

    let allocated: u64 = blocks.iter().filter(|b| !b.free).map(|b| b.size).sum();
    prop_assert_eq!(allocator.allocated(), allocated);
    prop_assert_eq!(allocator.fragmentation(), allocator.memory_size() - allocated);
    prop_assert_eq!(allocator.wasted(), allocator.fragmentation());
    Ok(())
}

proptest! {
    #[test]
    fn table_stays_consistent(
        (memory_size, ops) in (1u64..2000).prop_flat_map(|size| {
            (Just(size), prop::collection::vec(op(size), 0..64))
        })
    ) {
        let mut allocator = Allocator::new(memory_size);
        let mut live: Vec<u64> = Vec::new();

        for op in ops {
            let before = allocator.clone();
            match op {
                Op::Allocate(size, strategy) => match allocator.allocate(size, strategy) {
                    Ok(start) => {
                        let block = allocator.block_at(start).copied();
                        prop_assert_eq!(block.map(|b| (b.size, b.free)), Some((size, false)));
                        live.push(start);
                    }
                    Err(_) => {
                        prop_assert!(before.blocks().iter().all(|b| !b.free || b.size < size));
                        prop_assert_eq!(&allocator, &before);
                    }
                },
                Op::Release(n) => {
                    if !live.is_empty() {
                        let start = live.swap_remove(n % live.len());
                        prop_assert!(allocator.deallocate(start).is_ok());
                    }
                }
                Op::ReleaseAt(start) => {
                    if allocator.block_at(start).is_some() {
                        prop_assert!(allocator.deallocate(start).is_ok());
                        live.retain(|&s| s != start);
                    } else {
                        prop_assert!(allocator.deallocate(start).is_err());
                        prop_assert_eq!(&allocator, &before);
                    }
                }
            }
            check_table(&allocator)?;
        }
    }

    #[test]
    fn allocation_splits_exactly_once(size in 1u64..1000, fit in fit_strategy()) {
        let mut allocator = Allocator::new(1000);
        prop_assert_eq!(allocator.allocate(size, fit), Ok(0));

        let expected_len = if size == 1000 { 1 } else { 2 };
        prop_assert_eq!(allocator.len(), expected_len);
        if size < 1000 {
            let remainder = allocator.blocks()[1];
            prop_assert_eq!((remainder.start, remainder.size, remainder.free), (size, 1000 - size, true));
        }
    }

    #[test]
    fn single_round_trip_restores_table(
        sizes in prop::collection::vec(1u64..100, 1..8),
        size in 1u64..100,
        fit in fit_strategy(),
    ) {
        // Punch holes by releasing every other allocation.
        let mut allocator = Allocator::new(1000);
        let starts: Vec<u64> = sizes
            .iter()
            .map(|&size| allocator.allocate(size, Strategy::FirstFit).unwrap())
            .collect();
        for start in starts.into_iter().step_by(2) {
            allocator.deallocate(start).unwrap();
        }
        let before = allocator.clone();

        if let Ok(start) = allocator.allocate(size, fit) {
            allocator.deallocate(start).unwrap();
        }
        prop_assert_eq!(allocator, before);
    }
}
