#![no_main]

use libfuzzer_sys::fuzz_target;
use linkset::builder::LinkedSetBuilder;
use linkset::set::ConcurrentLinkedSet;
use linkset::store::QueuePolicy;

// Fuzz arbitrary operation sequences on ConcurrentLinkedSet
//
// The first byte picks the queue policy; the rest drive add, addx, remove,
// poll_first, poll_last, contains, iteration and clear against a Vec model.
fuzz_target!(|data: &[u8]| {
    let Some((&mode, ops)) = data.split_first() else {
        return;
    };

    let policy = match mode % 3 {
        0 => QueuePolicy::Single,
        1 => QueuePolicy::Multi(2),
        _ => QueuePolicy::Multi(5),
    };
    let single = policy == QueuePolicy::Single;
    let set: ConcurrentLinkedSet<u8> = LinkedSetBuilder::new()
        .initial_capacity(1)
        .concurrency_level(2)
        .policy(policy)
        .try_build()
        .unwrap();
    let mut model: Vec<u8> = Vec::new();

    for pair in ops.chunks_exact(2) {
        let op = pair[0] % 8;
        let value = pair[1] % 32;

        match op {
            0 => {
                // add
                let absent = !model.contains(&value);
                assert_eq!(set.add(value), absent);
                if absent {
                    model.push(value);
                }
            }
            1 => {
                // addx
                match set.addx(value) {
                    Some(prev) => assert_eq!(*prev, value),
                    None => model.push(value),
                }
            }
            2 => {
                // remove
                let pos = model.iter().position(|&m| m == value);
                assert_eq!(set.remove(&value), pos.is_some());
                if let Some(pos) = pos {
                    model.remove(pos);
                }
            }
            3 => {
                // poll_first
                let polled = set.poll_first().map(|e| *e);
                let expected = if model.is_empty() { None } else { Some(model.remove(0)) };
                assert_eq!(polled, expected);
            }
            4 => {
                // poll_last
                assert_eq!(set.poll_last().map(|e| *e), model.pop());
            }
            5 => {
                // contains
                assert_eq!(set.contains(&value), model.contains(&value));
            }
            6 => {
                // iterate
                let forward: Vec<u8> = set.iter().map(|e| *e).collect();
                assert_eq!(forward, model);
                let mut backward: Vec<u8> = set.descending_iter().map(|e| *e).collect();
                backward.reverse();
                assert_eq!(backward, model);
                if single {
                    let rendered = format!("{:?}", set);
                    assert!(rendered.contains("elements"));
                }
            }
            _ => {
                // clear
                set.clear();
                model.clear();
            }
        }

        assert_eq!(set.len(), model.len());
    }

    assert!(set.check_invariants().is_ok());
});
