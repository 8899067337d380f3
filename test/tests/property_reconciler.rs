/// PROPERTY-BASED TESTS: Reconciler invariants
///
/// Key invariants:
/// 1. A blend never moves a body past its target
/// 2. A snap lands exactly on the target
/// 3. A body inside the dead zone is left untouched
/// 4. After a reconcile step no buffered sample lies at or before now
use proptest::prelude::*;
use tether_shared::{
    wrap_angle, BodyState, Correction, PositionBuffer, PositionSample, Reconciler, Vec2,
};

fn coordinate() -> impl Strategy<Value = f32> {
    -100.0f32..100.0
}

fn body_state() -> impl Strategy<Value = BodyState> {
    (coordinate(), coordinate(), -5.0f32..5.0, -5.0f32..5.0, -10.0f32..10.0).prop_map(
        |(x, y, vx, vy, rotation)| BodyState {
            position: Vec2::new(x, y),
            velocity: Vec2::new(vx, vy),
            rotation,
            angular_velocity: 0.0,
        },
    )
}

proptest! {
    #[test]
    fn prop_correction_never_overshoots(current in body_state(), target in body_state()) {
        let reconciler = Reconciler::default();
        let result = reconciler.correct(current, target);

        let before = current.position.distance(target.position);
        let after = result.state.position.distance(target.position);

        match result.correction {
            Correction::Snap => prop_assert_eq!(result.state, target),
            Correction::None => prop_assert_eq!(result.state, current),
            Correction::Blend => {
                prop_assert!(after <= before + 1e-3, "moved away: {} -> {}", before, after);
                let rotation_before = wrap_angle(target.rotation - current.rotation).abs();
                let rotation_after = wrap_angle(target.rotation - result.state.rotation).abs();
                prop_assert!(rotation_after <= rotation_before + 1e-3);
            }
            other => prop_assert!(false, "correct() returned {:?}", other),
        }
    }

    #[test]
    fn prop_passed_samples_are_consumed_together(
        ticks in proptest::collection::btree_set(1u32..200, 1..8),
        now_tick in 0u32..220,
        current in body_state(),
    ) {
        let reconciler = Reconciler::default();
        let now = f64::from(now_tick) * 0.01;
        let mut buffer = PositionBuffer::new(8);
        for tick in &ticks {
            let timestamp = f64::from(*tick) * 0.01;
            buffer
                .insert(PositionSample::new(timestamp, BodyState::default()), now)
                .unwrap();
        }
        let passed = ticks.iter().filter(|tick| **tick <= now_tick).count();

        let result = reconciler.reconcile(&mut buffer, current, now);

        prop_assert_ne!(result.correction, Correction::Detached);
        if passed > 0 {
            prop_assert_eq!(buffer.len(), ticks.len() - passed);
            let newest_passed = ticks.iter().filter(|tick| **tick <= now_tick).max().unwrap();
            prop_assert_eq!(buffer.last_reconciled(), Some(f64::from(*newest_passed) * 0.01));
        } else {
            prop_assert_eq!(buffer.len(), ticks.len() - 1);
        }
        prop_assert!(buffer.iter().all(|sample| sample.timestamp > now));
    }

    #[test]
    fn prop_wrapped_angle_stays_in_range(angle in -1000.0f32..1000.0) {
        let wrapped = wrap_angle(angle);
        prop_assert!(wrapped >= -std::f32::consts::PI - 1e-4);
        prop_assert!(wrapped <= std::f32::consts::PI + 1e-4);
    }
}
