/// PROPERTY-BASED TESTS: PositionBuffer invariants
///
/// Key invariants:
/// 1. Buffered samples are strictly ordered by timestamp
/// 2. The buffer never holds more than its capacity
/// 3. Eviction always drops the oldest samples, never the newest
use proptest::prelude::*;
use tether_shared::{BodyState, PositionBuffer, PositionSample, SampleError, Vec2};

fn sample(timestamp: f64) -> PositionSample {
    PositionSample::new(timestamp, BodyState::at(Vec2::new(timestamp as f32, 0.0)))
}

proptest! {
    #[test]
    fn prop_buffer_stays_sorted_and_bounded(
        capacity in 1usize..10,
        timestamps in prop::collection::vec(0u16..500, 0..40),
    ) {
        let mut buffer = PositionBuffer::new(capacity);
        for (index, timestamp) in timestamps.iter().enumerate() {
            let _ = buffer.insert(sample(f64::from(*timestamp)), index as f64);
            prop_assert!(buffer.len() <= capacity);
        }

        let buffered: Vec<f64> = buffer.iter().map(|sample| sample.timestamp).collect();
        for pair in buffered.windows(2) {
            prop_assert!(pair[0] < pair[1], "out of order: {:?}", buffered);
        }
    }

    #[test]
    fn prop_buffer_keeps_the_newest_samples(
        capacity in 1usize..10,
        timestamps in prop::collection::vec(0u16..500, 1..40),
    ) {
        let mut buffer = PositionBuffer::new(capacity);
        for timestamp in &timestamps {
            let _ = buffer.insert(sample(f64::from(*timestamp)), 0.0);
        }

        let mut expected: Vec<u16> = timestamps.clone();
        expected.sort_unstable();
        expected.dedup();
        let keep = expected.len().min(capacity);
        let expected: Vec<f64> = expected[expected.len() - keep..]
            .iter()
            .map(|timestamp| f64::from(*timestamp))
            .collect();

        let buffered: Vec<f64> = buffer.iter().map(|sample| sample.timestamp).collect();
        prop_assert_eq!(buffered, expected);
    }

    #[test]
    fn prop_reconciled_samples_are_never_accepted_again(
        timestamps in prop::collection::vec(1u16..500, 1..20),
        cutoff in 1u16..500,
    ) {
        let mut buffer = PositionBuffer::new(64);
        buffer.mark_reconciled(f64::from(cutoff));

        for timestamp in &timestamps {
            let result = buffer.insert(sample(f64::from(*timestamp)), 0.0);
            if *timestamp <= cutoff {
                let is_stale = matches!(result, Err(SampleError::Stale { .. }));
                prop_assert!(is_stale);
            }
        }
        prop_assert!(buffer.iter().all(|sample| sample.timestamp > f64::from(cutoff)));
    }
}
