//! Property-based tests for the overwrite-oldest ring buffer.
//! Checks FIFO order, size bookkeeping and overwrite behaviour against a
//! `VecDeque` model for arbitrary operation sequences.

use std::collections::VecDeque;

use playback::ring_buffer::{Empty, RingBuffer};

const CAP: usize = 4;

#[derive(Debug, Clone)]
enum Op {
    Put(u8),
    Get,
}

fn op_strategy() -> impl proptest::strategy::Strategy<Value = Op> {
    use proptest::prelude::*;
    prop_oneof![any::<u8>().prop_map(Op::Put), Just(Op::Get)]
}

proptest::proptest! {
    /// Puts within capacity come back out in FIFO order.
    #[test]
    fn puts_within_capacity_are_fifo(data in proptest::collection::vec(proptest::num::u8::ANY, 0..=CAP)) {
        let mut rb: RingBuffer<CAP> = RingBuffer::new();
        for &b in &data {
            rb.put(b);
        }
        assert_eq!(rb.size(), data.len());
        for &b in &data {
            assert_eq!(rb.get(), Ok(b));
        }
        assert_eq!(rb.get(), Err(Empty));
    }

    /// Overfilling keeps only the most recent `CAP` bytes.
    #[test]
    fn overfill_keeps_latest(data in proptest::collection::vec(proptest::num::u8::ANY, CAP..64)) {
        let mut rb: RingBuffer<CAP> = RingBuffer::new();
        for &b in &data {
            rb.put(b);
        }
        assert!(rb.is_full());
        let tail = &data[data.len() - CAP..];
        for &b in tail {
            assert_eq!(rb.get(), Ok(b));
        }
        assert!(rb.is_empty());
    }

    /// Any interleaving of puts and gets matches a bounded-deque model.
    #[test]
    fn matches_deque_model(ops in proptest::collection::vec(op_strategy(), 0..128)) {
        let mut rb: RingBuffer<CAP> = RingBuffer::new();
        let mut model: VecDeque<u8> = VecDeque::new();
        for op in ops {
            match op {
                Op::Put(b) => {
                    if model.len() == CAP {
                        model.pop_front();
                    }
                    model.push_back(b);
                    rb.put(b);
                }
                Op::Get => {
                    assert_eq!(rb.get(), model.pop_front().ok_or(Empty));
                }
            }
            assert_eq!(rb.size(), model.len());
            assert_eq!(rb.is_full(), model.len() == CAP);
            assert_eq!(rb.is_empty(), model.is_empty());
        }
    }
}
