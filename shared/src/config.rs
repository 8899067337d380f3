use std::{default::Default, time::Duration};

/// Tuning for how a predicted body is pulled onto the authoritative trajectory.
///
/// Distance thresholds are in world units; each one is widened by the body's
/// speed times the matching `*_velocity_factor`, so fast bodies tolerate more
/// positional error than idle ones.
#[derive(Clone, Debug)]
pub struct ReconcileConfig {
    /// Errors below this (plus the velocity-scaled margin) are not corrected at all
    pub min_correction: f32,
    /// Seconds of travel added to `min_correction`
    pub min_correction_velocity_factor: f32,
    /// Errors above this (plus the velocity-scaled margin) snap instead of blending
    pub snap_distance: f32,
    /// Seconds of travel added to `snap_distance`
    pub snap_velocity_factor: f32,
    /// Rotation error (radians) below which rotation is left alone
    pub min_rotation_correction: f32,
    /// Rotation error (radians) above which rotation snaps
    pub snap_rotation: f32,
    /// Fraction of the remaining error removed per reconcile call when blending, in (0, 1]
    pub blend_factor: f32,
    /// A waypoint is extrapolated forward by its own velocity for at most this long
    pub max_extrapolation: Duration,
    /// If no sample arrived for this long, the body is treated as detached from authority
    pub staleness_window: Duration,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            min_correction: 0.01,
            min_correction_velocity_factor: 0.005,
            snap_distance: 2.0,
            snap_velocity_factor: 0.25,
            min_rotation_correction: 0.005,
            snap_rotation: std::f32::consts::FRAC_PI_2,
            blend_factor: 0.2,
            max_extrapolation: Duration::from_millis(250),
            staleness_window: Duration::from_secs(2),
        }
    }
}

/// Contains Config properties shared by both sides of a session
#[derive(Clone, Debug)]
pub struct SyncConfig {
    /// Duration of one fixed simulation step
    pub tick_interval: Duration,
    /// The authoritative host sends position samples every this many ticks
    pub sample_interval_ticks: u16,
    /// Maximum number of position samples buffered per entity
    pub sample_buffer_capacity: usize,
    /// Used to configure position reconciliation on predicted entities
    pub reconcile: ReconcileConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(16),
            sample_interval_ticks: 1,
            sample_buffer_capacity: 8,
            reconcile: ReconcileConfig::default(),
        }
    }
}
