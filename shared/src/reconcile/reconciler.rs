use std::f32::consts::{PI, TAU};

use crate::{
    config::ReconcileConfig,
    reconcile::position_buffer::PositionBuffer,
    world::body::BodyState,
};

/// How a reconcile step treated the body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Correction {
    /// The error was inside the dead zone, the state is unchanged
    None,
    /// The state moved part of the way toward the authoritative trajectory
    Blend,
    /// The state was replaced by the authoritative one
    Snap,
    /// No sample arrived within the staleness window, the body runs on local physics
    Detached,
    /// Nothing buffered
    Idle,
}

/// Result of one reconcile step. `state` is what the body should hold next;
/// callers apply it through [`PhysicsBody`](crate::PhysicsBody).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reconciliation {
    pub state: BodyState,
    pub correction: Correction,
    /// Positional distance to the authoritative target before correction
    pub position_error: f32,
}

impl Reconciliation {
    fn unchanged(state: BodyState, correction: Correction) -> Self {
        Self {
            state,
            correction,
            position_error: 0.0,
        }
    }
}

/// Pulls a locally simulated body onto the trajectory described by the
/// authoritative samples in its [`PositionBuffer`].
#[derive(Clone, Debug, Default)]
pub struct Reconciler {
    config: ReconcileConfig,
}

impl Reconciler {
    pub fn new(config: ReconcileConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Returns the state `current` should be corrected to at simulation time
    /// `now` (seconds).
    ///
    /// Every sample at or before `now` is consumed and the newest of them is
    /// the waypoint. When all buffered samples lie ahead of `now`, only the
    /// oldest one is consumed.
    pub fn reconcile(
        &self,
        buffer: &mut PositionBuffer,
        current: BodyState,
        now: f64,
    ) -> Reconciliation {
        if let Some(received_at) = buffer.last_received_at() {
            if now - received_at > self.config.staleness_window.as_secs_f64() {
                buffer.clear_samples();
                return Reconciliation::unchanged(current, Correction::Detached);
            }
        }

        buffer.discard_stale();
        let Some(waypoint) = buffer.pop_passed(now).or_else(|| buffer.pop_front()) else {
            return Reconciliation::unchanged(current, Correction::Idle);
        };
        buffer.mark_reconciled(waypoint.timestamp);

        let ahead = (now - waypoint.timestamp)
            .clamp(0.0, self.config.max_extrapolation.as_secs_f64());
        let target = waypoint.state.extrapolate(ahead as f32);

        self.correct(current, target)
    }

    /// Decides between leaving `current` alone, blending it toward `target`
    /// or snapping it there.
    pub fn correct(&self, current: BodyState, target: BodyState) -> Reconciliation {
        if !current.is_finite() {
            return Reconciliation {
                state: target,
                correction: Correction::Snap,
                position_error: f32::INFINITY,
            };
        }

        let speed = current.velocity.length().max(target.velocity.length());
        let offset = target.position - current.position;
        let position_error = offset.length();
        let rotation_error = wrap_angle(target.rotation - current.rotation);

        let snap_tolerance = self.config.snap_distance + speed * self.config.snap_velocity_factor;
        if position_error > snap_tolerance || rotation_error.abs() > self.config.snap_rotation {
            return Reconciliation {
                state: target,
                correction: Correction::Snap,
                position_error,
            };
        }

        let dead_zone =
            self.config.min_correction + speed * self.config.min_correction_velocity_factor;
        if position_error <= dead_zone
            && rotation_error.abs() <= self.config.min_rotation_correction
        {
            return Reconciliation {
                state: current,
                correction: Correction::None,
                position_error,
            };
        }

        let t = self.config.blend_factor.clamp(0.0, 1.0);
        let state = BodyState {
            position: current.position + offset * t,
            velocity: current.velocity.lerp(target.velocity, t),
            rotation: current.rotation + rotation_error * t,
            angular_velocity: current.angular_velocity
                + (target.angular_velocity - current.angular_velocity) * t,
        };

        Reconciliation {
            state,
            correction: Correction::Blend,
            position_error,
        }
    }
}

/// Wraps an angle difference into `[-PI, PI]`.
pub fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}
