//! Planetary orientation: a fixed axial tilt composed with a steady spin.
//!
//! The body's rotation relative to world space is held as a unit quaternion
//! ([`Orientation`]). It starts out as the [`Tilt`] (one rotation per world
//! axis, composed X then Y then Z) and is advanced once per rendered frame by
//! a constant angle about the body's own up axis.
//!
//! # Example
//!
//! ```
//! use jovian::{OrientationModel, Tilt};
//!
//! let mut model = OrientationModel::new(Tilt::new(-0.3, 0.9, 0.3), 0.002);
//! let axis_before = model.spin_axis();
//!
//! for _ in 0..100 {
//!     model.advance();
//! }
//!
//! // Spinning about the tilted axis never moves that axis.
//! assert!(model.spin_axis().unwrap().abs_diff_eq(axis_before.unwrap(), 1e-9));
//! assert!(model.orientation().is_normalized(1e-9));
//! ```
//!
//! All math is done in `f64`; the renderer receives an `f32` copy through
//! [`Orientation::as_quat`].

use glam::{DQuat, DVec3, Quat};

/// The body's local "up" axis, the axis it spins about.
pub const LOCAL_UP: DVec3 = DVec3::Y;

/// Vectors and quaternions shorter than this are treated as degenerate.
pub const DEGENERATE_EPSILON: f64 = 1e-12;

/// Axial tilt as one angle (radians) per world axis.
///
/// Applied in the fixed order X, Y, Z. Quaternion multiplication does not
/// commute, so swapping the order produces a different tilt.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Tilt {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Tilt {
    pub const ZERO: Tilt = Tilt::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn from_array(angles: [f64; 3]) -> Self {
        Self::new(angles[0], angles[1], angles[2])
    }

    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// The composed tilt rotation.
    ///
    /// Starting from identity, a rotation about each world axis is
    /// right-multiplied into the accumulator, X first and Z last.
    pub fn quat(&self) -> DQuat {
        [
            (DVec3::X, self.x),
            (DVec3::Y, self.y),
            (DVec3::Z, self.z),
        ]
        .into_iter()
        .fold(DQuat::IDENTITY, |acc, (axis, angle)| {
            acc * DQuat::from_axis_angle(axis, angle)
        })
    }
}

/// The rotation of the body's local frame relative to world space.
///
/// Always a unit quaternion. Every constructor and [`advance`] renormalise,
/// so drift from long runs of small rotations never accumulates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orientation(DQuat);

impl Default for Orientation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Orientation {
    pub const IDENTITY: Orientation = Orientation(DQuat::IDENTITY);

    /// Wraps a quaternion, normalising it. Degenerate input is kept as-is.
    pub fn from_quat(quat: DQuat) -> Self {
        Self(quat).renormalized()
    }

    /// The orientation produced by applying `tilt` to an unrotated body.
    pub fn from_tilt(tilt: Tilt) -> Self {
        Self::from_quat(tilt.quat())
    }

    /// Builds a rotation of `angle` radians about `axis`.
    ///
    /// Returns `None` when the axis has no usable direction.
    pub fn from_axis_angle(axis: DVec3, angle: f64) -> Option<Self> {
        let axis = axis.try_normalize()?;
        Some(Self::from_quat(DQuat::from_axis_angle(axis, angle)))
    }

    pub fn quat(&self) -> DQuat {
        self.0
    }

    /// Single precision copy for the renderer.
    pub fn as_quat(&self) -> Quat {
        self.0.as_quat()
    }

    /// The world-space direction of the body's local up axis.
    ///
    /// Returns `None` if the orientation is degenerate and the axis has no
    /// meaningful direction.
    pub fn spin_axis(&self) -> Option<DVec3> {
        if !self.0.is_finite() {
            return None;
        }
        (self.0 * LOCAL_UP).try_normalize()
    }

    /// One spin step of `omega` radians about the current spin axis.
    pub fn advance(self, omega: f64) -> Self {
        advance(self, omega)
    }

    /// Returns the orientation scaled back to unit length.
    pub fn renormalized(self) -> Self {
        let length = self.0.length();
        if !length.is_finite() || length <= DEGENERATE_EPSILON {
            return self;
        }
        Self(self.0 / length)
    }

    pub fn is_normalized(&self, tolerance: f64) -> bool {
        (self.0.length() - 1.0).abs() < tolerance
    }

    /// Axis and angle of this rotation. The angle is in `[0, 2π]`.
    pub fn to_axis_angle(&self) -> (DVec3, f64) {
        self.0.to_axis_angle()
    }

    /// How far this orientation is rotated from identity, in `[0, π]`.
    pub fn angle_from_identity(&self) -> f64 {
        self.angle_to(Self::IDENTITY)
    }

    /// Smallest rotation angle between two orientations, in `[0, π]`.
    pub fn angle_to(&self, other: Orientation) -> f64 {
        self.0.angle_between(other.0)
    }
}

/// Advances `orientation` by one spin step of `omega` radians.
///
/// The spin axis is recomputed from the current orientation, so the body
/// always turns about its own tilted up axis. The rotation is built about
/// that world-space axis and applied on the world side, which is the same
/// as right-multiplying a rotation about the local up axis.
///
/// A degenerate orientation, or a non-finite `omega`, leaves the value
/// unchanged.
pub fn advance(orientation: Orientation, omega: f64) -> Orientation {
    let Some(axis) = orientation.spin_axis() else {
        tracing::debug!(?orientation, "degenerate spin axis, skipping rotation");
        return orientation;
    };
    if !omega.is_finite() {
        tracing::debug!(omega, "non-finite spin step, skipping rotation");
        return orientation;
    }
    let step = DQuat::from_axis_angle(axis, omega);
    let next = Orientation(step * orientation.0).renormalized();
    if !next.0.is_finite() {
        return orientation;
    }
    next
}

/// A rotating body's orientation state over the lifetime of the demo.
///
/// Holds the tilt, the per-frame angular step and the current orientation.
/// [`OrientationModel::advance`] replaces the orientation with the result of
/// the pure [`advance`] function, once per rendered frame.
#[derive(Clone, Debug)]
pub struct OrientationModel {
    tilt: Tilt,
    omega: f64,
    orientation: Orientation,
    frames: u64,
}

impl OrientationModel {
    /// Creates a model tilted by `tilt` that spins `omega` radians per frame.
    pub fn new(tilt: Tilt, omega: f64) -> Self {
        Self {
            tilt,
            omega,
            orientation: Orientation::from_tilt(tilt),
            frames: 0,
        }
    }

    /// Like [`new`](Self::new), then rotates once by `initial_phase` so the
    /// first frame starts at a chosen point of the spin.
    ///
    /// The offset goes through the same step as per-frame spin and does not
    /// count as a frame.
    pub fn with_initial_phase(tilt: Tilt, omega: f64, initial_phase: f64) -> Self {
        let mut model = Self::new(tilt, omega);
        model.advance_by(initial_phase);
        model
    }

    /// Applies one frame of spin and returns the new orientation.
    pub fn advance(&mut self) -> Orientation {
        self.advance_by(self.omega);
        self.frames += 1;
        tracing::trace!(frame = self.frames, "orientation advanced");
        self.orientation
    }

    /// Rotates about the current spin axis by an arbitrary angle.
    pub fn advance_by(&mut self, radians: f64) -> Orientation {
        self.orientation = advance(self.orientation, radians);
        self.orientation
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn tilt(&self) -> Tilt {
        self.tilt
    }

    pub fn omega(&self) -> f64 {
        self.omega
    }

    /// Number of per-frame advances applied so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn spin_axis(&self) -> Option<DVec3> {
        self.orientation.spin_axis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const TOLERANCE: f64 = 1e-6;

    fn jupiter_tilt() -> Tilt {
        Tilt::new(-0.3, 0.9, 0.3)
    }

    /// Same rotation, allowing for the q / -q double cover.
    fn assert_same_rotation(a: DQuat, b: DQuat) {
        let dot = a.dot(b).abs();
        assert!(
            (dot - 1.0).abs() < TOLERANCE,
            "rotations differ: {a:?} vs {b:?} (|dot| = {dot})"
        );
    }

    fn assert_components_eq(a: DQuat, b: DQuat) {
        for (x, y) in a.to_array().into_iter().zip(b.to_array()) {
            assert!((x - y).abs() < TOLERANCE, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn fresh_model_is_unit_length() {
        let tilts = [
            Tilt::ZERO,
            jupiter_tilt(),
            Tilt::new(PI, -PI / 2.0, 3.0),
            Tilt::new(10.0, -7.5, 0.001),
            Tilt::new(-1e-9, 1e-9, 2.0 * PI),
        ];
        for tilt in tilts {
            let model = OrientationModel::new(tilt, 0.002);
            assert!(model.orientation().is_normalized(TOLERANCE), "{tilt:?}");
        }
    }

    #[test]
    fn zero_tilt_is_identity() {
        let model = OrientationModel::new(Tilt::ZERO, 0.002);
        assert_components_eq(model.orientation().quat(), DQuat::IDENTITY);
        assert_eq!(model.spin_axis(), Some(DVec3::Y));
    }

    #[test]
    fn tilt_composes_x_then_y_then_z() {
        let tilt = jupiter_tilt();
        let expected = DQuat::from_rotation_x(tilt.x)
            * DQuat::from_rotation_y(tilt.y)
            * DQuat::from_rotation_z(tilt.z);
        assert_components_eq(tilt.quat(), expected);

        let reversed = DQuat::from_rotation_z(tilt.z)
            * DQuat::from_rotation_y(tilt.y)
            * DQuat::from_rotation_x(tilt.x);
        assert!(tilt.quat().dot(reversed).abs() < 1.0 - TOLERANCE);
    }

    #[test]
    fn spin_axis_is_tilted_up() {
        let model = OrientationModel::new(jupiter_tilt(), 0.002);
        let axis = model.spin_axis().unwrap();
        assert!(axis.abs_diff_eq(jupiter_tilt().quat() * DVec3::Y, TOLERANCE));
        assert!((axis.length() - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn advancing_keeps_spin_axis_fixed() {
        let mut model = OrientationModel::new(jupiter_tilt(), 0.05);
        let axis = model.spin_axis().unwrap();
        for _ in 0..500 {
            model.advance();
            assert!(model.spin_axis().unwrap().abs_diff_eq(axis, TOLERANCE));
        }
    }

    #[test]
    fn world_side_step_equals_local_right_multiply() {
        let start = Orientation::from_tilt(jupiter_tilt());
        let omega = 0.37;
        let stepped = advance(start, omega);
        let local = start.quat() * DQuat::from_rotation_y(omega);
        assert_components_eq(stepped.quat(), local);
    }

    #[test]
    fn n_advances_accumulate_n_omega() {
        let omega = 0.013;
        let mut model = OrientationModel::new(jupiter_tilt(), omega);
        for _ in 0..250 {
            model.advance();
        }
        let expected = jupiter_tilt().quat() * DQuat::from_rotation_y(250.0 * omega);
        assert_same_rotation(model.orientation().quat(), expected);
        assert_eq!(model.frames(), 250);
    }

    #[test]
    fn two_half_steps_match_one_full_step() {
        let start = Orientation::from_tilt(jupiter_tilt());
        let omega = 0.8;
        let halves = start.advance(omega / 2.0).advance(omega / 2.0);
        let whole = start.advance(omega);
        assert_same_rotation(halves.quat(), whole.quat());

        let mut micro = start;
        for _ in 0..64 {
            micro = micro.advance(omega / 64.0);
        }
        assert_same_rotation(micro.quat(), whole.quat());
    }

    #[test]
    fn initial_phase_reuses_the_frame_step() {
        let omega0 = 9.0 * PI / 8.0;
        let seeded = OrientationModel::with_initial_phase(jupiter_tilt(), 0.002, omega0);

        let mut stepped = OrientationModel::new(jupiter_tilt(), omega0);
        stepped.advance();

        assert_eq!(seeded.orientation(), stepped.orientation());
        assert_eq!(seeded.frames(), 0);
        assert_eq!(seeded.spin_axis(), stepped.spin_axis());
    }

    #[test]
    fn axis_angle_round_trip() {
        let samples = [
            Orientation::from_tilt(jupiter_tilt()),
            Orientation::from_tilt(jupiter_tilt()).advance(2.5),
            Orientation::from_tilt(Tilt::new(0.0, PI - 0.01, 0.0)),
            Orientation::from_tilt(Tilt::new(1.0, 2.0, 3.0)),
        ];
        for orientation in samples {
            let (axis, angle) = orientation.to_axis_angle();
            let back = Orientation::from_axis_angle(axis, angle).unwrap();
            assert_same_rotation(orientation.quat(), back.quat());
        }
    }

    #[test]
    fn from_axis_angle_rejects_zero_axis() {
        assert!(Orientation::from_axis_angle(DVec3::ZERO, 1.0).is_none());
    }

    #[test]
    fn degenerate_orientation_is_left_unchanged() {
        let degenerate = Orientation::from_quat(DQuat::from_xyzw(0.0, 0.0, 0.0, 0.0));
        assert_eq!(degenerate.spin_axis(), None);
        assert_eq!(advance(degenerate, 0.5), degenerate);
    }

    #[test]
    fn non_finite_step_is_skipped() {
        let start = Orientation::from_tilt(jupiter_tilt());
        for omega in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let next = advance(start, omega);
            assert_eq!(next, start, "omega = {omega}");
            assert!(next.quat().is_finite());
        }

        let mut model = OrientationModel::new(jupiter_tilt(), f64::NAN);
        model.advance();
        assert_eq!(model.orientation(), start);
        assert_eq!(model.frames(), 1);
    }

    #[test]
    fn non_finite_orientation_has_no_spin_axis() {
        let broken = Orientation::from_quat(DQuat::NAN);
        assert_eq!(broken.spin_axis(), None);
        assert!(advance(broken, 0.002).quat().is_nan());

        let model = OrientationModel::new(Tilt::new(f64::INFINITY, 0.0, 0.0), 0.002);
        assert_eq!(model.spin_axis(), None);
        assert!(!Tilt::new(f64::INFINITY, 0.0, 0.0).is_finite());
        assert!(jupiter_tilt().is_finite());
    }

    #[test]
    fn from_quat_normalizes() {
        let scaled = Orientation::from_quat(DQuat::from_xyzw(0.0, 2.0, 0.0, 2.0));
        assert!(scaled.is_normalized(TOLERANCE));
        assert_same_rotation(scaled.quat(), DQuat::from_rotation_y(PI / 2.0));
    }

    #[test]
    fn long_runs_stay_unit_length() {
        let mut model = OrientationModel::new(jupiter_tilt(), 0.002);
        for _ in 0..100_000 {
            model.advance();
        }
        assert!(model.orientation().is_normalized(1e-12));
    }

    #[test]
    fn jupiter_after_a_thousand_frames() {
        let tilt = jupiter_tilt();
        let omega = 0.002;
        let omega0 = 9.0 * PI / 8.0;

        let mut model = OrientationModel::with_initial_phase(tilt, omega, omega0);
        for _ in 0..1000 {
            model.advance();
        }

        let expected = tilt.quat() * DQuat::from_rotation_y(omega0 + 1000.0 * omega);
        assert_components_eq(model.orientation().quat(), expected);

        let expected_angle = Orientation::from_quat(expected).angle_from_identity();
        assert!((model.orientation().angle_from_identity() - expected_angle).abs() < TOLERANCE);
    }

    #[test]
    fn angle_to_measures_spin() {
        let start = Orientation::from_tilt(jupiter_tilt());
        let turned = start.advance(0.25);
        assert!((start.angle_to(turned) - 0.25).abs() < TOLERANCE);
    }

    #[test]
    fn tilt_array_round_trip() {
        let tilt = Tilt::from_array([-0.3, 0.9, 0.3]);
        assert_eq!(tilt, jupiter_tilt());
        assert_eq!(tilt.to_array(), [-0.3, 0.9, 0.3]);
    }
}
