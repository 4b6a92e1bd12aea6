//! Capture/playback core: the key-code ring buffer and the tick engine that
//! drains it onto the display under timer control. Pure data, no I/O.
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(clippy::unwrap_used)]

pub mod engine;
pub mod ring_buffer;

pub use engine::{PlaybackEngine, Tick};
pub use ring_buffer::{Empty, RingBuffer};

#[cfg(test)]
mod tests {
    /// Playback engine tests
    mod engine_tests {
        use crate::engine::{PlaybackEngine, Tick};

        #[test]
        fn test_engine_starts_disarmed() {
            let mut engine = PlaybackEngine::new();
            assert!(!engine.is_armed());
            assert_eq!(engine.tick(4), Tick::Idle);
        }

        #[test]
        fn test_emits_watermark_offsets_then_done() {
            let mut engine = PlaybackEngine::new();
            engine.arm();
            for expected in 0..4 {
                assert_eq!(engine.tick(4), Tick::Emit(expected));
            }
            assert_eq!(engine.tick(4), Tick::Done);
            assert!(!engine.is_armed());
            assert_eq!(engine.played(), 0);
        }

        #[test]
        fn test_zero_watermark_finishes_on_first_tick() {
            let mut engine = PlaybackEngine::new();
            engine.arm();
            assert_eq!(engine.tick(0), Tick::Done);
        }

        #[test]
        fn test_ticks_after_done_are_idle() {
            let mut engine = PlaybackEngine::new();
            engine.arm();
            assert_eq!(engine.tick(1), Tick::Emit(0));
            assert_eq!(engine.tick(1), Tick::Done);
            assert_eq!(engine.tick(1), Tick::Idle);
        }

        #[test]
        fn test_rearm_restarts_count() {
            let mut engine = PlaybackEngine::new();
            engine.arm();
            let _ = engine.tick(4);
            let _ = engine.tick(4);
            engine.arm();
            assert_eq!(engine.played(), 0);
            assert_eq!(engine.tick(2), Tick::Emit(0));
        }

        #[test]
        fn test_lowered_watermark_ends_run_early() {
            let mut engine = PlaybackEngine::new();
            engine.arm();
            assert_eq!(engine.tick(4), Tick::Emit(0));
            assert_eq!(engine.tick(4), Tick::Emit(1));
            // Limit dropped to the count already played.
            assert_eq!(engine.tick(2), Tick::Done);
        }
    }

    /// Ring buffer tests
    mod ring_buffer_tests {
        use crate::ring_buffer::{Empty, RingBuffer};

        #[test]
        fn test_ring_buffer_fifo_order() {
            let mut rb: RingBuffer<4> = RingBuffer::new();
            for b in [1, 2, 3] {
                rb.put(b);
            }
            assert_eq!(rb.size(), 3);
            assert_eq!(rb.get(), Ok(1));
            assert_eq!(rb.get(), Ok(2));
            assert_eq!(rb.get(), Ok(3));
            assert!(rb.is_empty());
        }

        #[test]
        fn test_get_on_empty_does_not_mutate() {
            let mut rb: RingBuffer<4> = RingBuffer::new();
            rb.put(9);
            let _ = rb.get();
            let before = rb.clone();
            assert_eq!(rb.get(), Err(Empty));
            assert_eq!(rb.size(), before.size());
            assert_eq!(rb.is_full(), before.is_full());
            rb.put(5);
            assert_eq!(rb.get(), Ok(5));
        }

        #[test]
        fn test_full_after_capacity_puts() {
            let mut rb: RingBuffer<4> = RingBuffer::new();
            for b in 0..3 {
                rb.put(b);
                assert!(!rb.is_full());
            }
            rb.put(3);
            assert!(rb.is_full());
            assert_eq!(rb.size(), 4);
            let _ = rb.get();
            assert!(!rb.is_full());
            assert_eq!(rb.size(), 3);
        }

        #[test]
        fn test_overwrite_keeps_most_recent() {
            let mut rb: RingBuffer<4> = RingBuffer::new();
            for b in 1..=6 {
                rb.put(b);
            }
            assert!(rb.is_full());
            assert_eq!(rb.size(), 4);
            let mut out = [0u8; 4];
            for slot in &mut out {
                *slot = rb.get().unwrap_or(0);
            }
            assert_eq!(out, [3, 4, 5, 6]);
        }

        #[test]
        fn test_size_after_wraparound() {
            let mut rb: RingBuffer<4> = RingBuffer::new();
            for b in 0..3 {
                rb.put(b);
            }
            let _ = rb.get();
            let _ = rb.get();
            rb.put(7);
            rb.put(8);
            // start has wrapped behind end
            assert_eq!(rb.size(), 3);
            assert_eq!(rb.get(), Ok(2));
        }

        #[test]
        fn test_reset_empties() {
            let mut rb: RingBuffer<4> = RingBuffer::new();
            for b in 0..5 {
                rb.put(b);
            }
            rb.reset();
            assert!(rb.is_empty());
            assert_eq!(rb.size(), 0);
            assert_eq!(rb.capacity(), 4);
        }
    }
}
