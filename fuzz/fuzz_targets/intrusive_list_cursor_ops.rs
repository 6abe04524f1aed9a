#![no_main]

use libfuzzer_sys::fuzz_target;
use linkset::ds::{IntrusiveList, Position};

// Fuzz cursor resumption on IntrusiveList
//
// Interleaves push_back, remove and cursor steps. A cursor must never yield
// a node out of sequence order, even after the node it stood on is removed.
fuzz_target!(|data: &[u8]| {
    let mut list: IntrusiveList<u8> = IntrusiveList::new();
    let mut ids = Vec::new();
    let mut next_seq = 0u64;
    let mut forward: Option<Position> = None;
    let mut backward: Option<Position> = None;

    for pair in data.chunks_exact(2) {
        let op = pair[0] % 5;
        let value = pair[1];

        match op {
            0 => {
                // push_back
                let id = list.push_back_with_seq(value, next_seq);
                next_seq += 1;
                ids.push(id);
                assert_eq!(list.prev_before(None).map(|(_, v)| *v), Some(value));
            }
            1 => {
                // remove
                if !ids.is_empty() {
                    let id = ids.swap_remove(value as usize % ids.len());
                    let before = list.len();
                    assert!(list.remove(id).is_some());
                    assert_eq!(list.len(), before - 1);
                    assert!(list.remove(id).is_none());
                }
            }
            2 => {
                // ascending step
                if let Some((pos, _)) = list.next_after(forward) {
                    if let Some(last) = forward {
                        assert!(pos.seq > last.seq);
                    }
                    forward = Some(pos);
                }
            }
            3 => {
                // descending step
                if let Some((pos, _)) = list.prev_before(backward) {
                    if let Some(last) = backward {
                        assert!(pos.seq < last.seq);
                    }
                    backward = Some(pos);
                }
            }
            _ => {
                // restart cursors
                forward = None;
                backward = None;
            }
        }
    }

    assert_eq!(list.len(), ids.len());
    for id in &ids {
        assert!(list.get(*id).is_some());
    }
    assert!(list.validate().is_ok());
});
