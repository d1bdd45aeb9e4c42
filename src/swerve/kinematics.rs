// Swerve inverse kinematics
// Converts a body-frame chassis velocity into a (speed, angle) target per module.

use serde::{Deserialize, Serialize};

use super::geometry::{ModuleGeometry, NUM_MODULES, Translation2d};

/// Module velocities below this magnitude (m/s) are treated as stationary
pub const STATIONARY_EPSILON: f64 = 1e-9;

/// Desired chassis velocity in the body frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChassisSpeeds {
    /// Forward velocity in m/s
    pub vx: f64,
    /// Strafe velocity in m/s (positive = left)
    pub vy: f64,
    /// Rotational velocity in rad/s (positive = counter-clockwise)
    pub omega: f64,
}

impl ChassisSpeeds {
    pub const fn new(vx: f64, vy: f64, omega: f64) -> Self {
        Self { vx, vy, omega }
    }

    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Convert a field-frame command into the body frame.
    ///
    /// `heading_rad` is the robot's CCW-positive heading relative to the field.
    pub fn from_field_relative(vx: f64, vy: f64, omega: f64, heading_rad: f64) -> Self {
        let (sin, cos) = heading_rad.sin_cos();
        Self {
            vx: vx * cos + vy * sin,
            vy: -vx * sin + vy * cos,
            omega,
        }
    }
}

/// Target state of a single module
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ModuleState {
    /// Wheel speed in m/s (signed)
    pub speed: f64,
    /// Absolute wheel heading in radians, in [-pi, pi]. Straight back can come
    /// out as either end depending on the sign of a zero lateral component.
    pub angle: f64,
}

impl ModuleState {
    pub const fn new(speed: f64, angle: f64) -> Self {
        Self { speed, angle }
    }
}

/// Inverse kinematics for a four-module swerve chassis.
///
/// Remembers the last angle commanded to each module so that a module with
/// nothing to do keeps pointing where it was instead of snapping to 0.
#[derive(Debug, Clone)]
pub struct SwerveKinematics {
    geometry: ModuleGeometry,
    module_headings: [f64; NUM_MODULES],
}

impl SwerveKinematics {
    pub fn new(geometry: ModuleGeometry) -> Self {
        Self {
            geometry,
            module_headings: [0.0; NUM_MODULES],
        }
    }

    pub fn geometry(&self) -> &ModuleGeometry {
        &self.geometry
    }

    /// True if every module velocity for `speeds` is a finite vector.
    ///
    /// Non-finite inputs, or finite ones large enough to overflow at the
    /// module mounting points, fail this check.
    pub fn can_resolve(&self, speeds: &ChassisSpeeds) -> bool {
        self.geometry.offsets().iter().all(|offset| {
            let (vx, vy) = module_velocity(speeds, offset);
            vx.hypot(vy).is_finite()
        })
    }

    /// Compute the target state of every module, in `ModuleId` order.
    ///
    /// Each module moves at the chassis translation plus the tangential
    /// velocity `omega x offset` at its mounting point.
    pub fn to_module_states(&mut self, speeds: &ChassisSpeeds) -> [ModuleState; NUM_MODULES] {
        let mut states = [ModuleState::default(); NUM_MODULES];

        for (i, offset) in self.geometry.offsets().iter().enumerate() {
            let (vx, vy) = module_velocity(speeds, offset);
            let speed = vx.hypot(vy);

            if speed < STATIONARY_EPSILON {
                // Nothing to do, hold the last heading
                states[i] = ModuleState::new(0.0, self.module_headings[i]);
            } else {
                let angle = vy.atan2(vx);
                self.module_headings[i] = angle;
                states[i] = ModuleState::new(speed, angle);
            }
        }

        states
    }
}

// Chassis translation plus omega x offset
fn module_velocity(speeds: &ChassisSpeeds, offset: &Translation2d) -> (f64, f64) {
    (
        speeds.vx - speeds.omega * offset.y,
        speeds.vy + speeds.omega * offset.x,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swerve::geometry::ModuleId;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    const TRACK_WIDTH: f64 = 0.5;
    const WHEELBASE: f64 = 0.5;

    fn kinematics() -> SwerveKinematics {
        SwerveKinematics::new(ModuleGeometry::new(TRACK_WIDTH, WHEELBASE))
    }

    #[test]
    fn test_zero_velocity() {
        let states = kinematics().to_module_states(&ChassisSpeeds::zero());
        for state in states {
            assert_eq!(state.speed, 0.0);
            assert!(!state.angle.is_nan());
        }
    }

    #[test]
    fn test_forward_motion() {
        let states = kinematics().to_module_states(&ChassisSpeeds::new(1.0, 0.0, 0.0));
        for state in states {
            assert_relative_eq!(state.speed, 1.0);
            assert_abs_diff_eq!(state.angle, 0.0);
        }
    }

    #[test]
    fn test_strafe_left() {
        let states = kinematics().to_module_states(&ChassisSpeeds::new(0.0, 2.0, 0.0));
        for state in states {
            assert_relative_eq!(state.speed, 2.0);
            assert_relative_eq!(state.angle, FRAC_PI_2);
        }
    }

    #[test]
    fn test_rotation_only() {
        let omega = 2.0;
        let states = kinematics().to_module_states(&ChassisSpeeds::new(0.0, 0.0, omega));
        let expected_speed = omega * (TRACK_WIDTH / 2.0).hypot(WHEELBASE / 2.0);

        for state in states {
            assert_relative_eq!(state.speed, expected_speed, epsilon = 1e-12);
        }

        // CCW rotation: each wheel points 90 degrees ahead of its radius
        assert_relative_eq!(states[ModuleId::FrontLeft.index()].angle, 3.0 * FRAC_PI_4, epsilon = 1e-12);
        assert_relative_eq!(states[ModuleId::FrontRight.index()].angle, FRAC_PI_4, epsilon = 1e-12);
        assert_relative_eq!(states[ModuleId::BackLeft.index()].angle, -3.0 * FRAC_PI_4, epsilon = 1e-12);
        assert_relative_eq!(states[ModuleId::BackRight.index()].angle, -FRAC_PI_4, epsilon = 1e-12);
    }

    #[test]
    fn test_translation_plus_rotation() {
        // vx = 1, omega = 1 with offsets (+-0.25, +-0.25)
        let states = kinematics().to_module_states(&ChassisSpeeds::new(1.0, 0.0, 1.0));

        // FL (0.25, 0.25) -> (0.75, 0.25), BL (-0.25, 0.25) -> (0.75, -0.25)
        let slow_speed = 0.625f64.sqrt();
        let slow_angle = (1.0f64 / 3.0).atan();
        // FR (0.25, -0.25) -> (1.25, 0.25), BR (-0.25, -0.25) -> (1.25, -0.25)
        let fast_speed = 1.625f64.sqrt();
        let fast_angle = 0.2f64.atan();

        let fl = states[ModuleId::FrontLeft.index()];
        let fr = states[ModuleId::FrontRight.index()];
        let bl = states[ModuleId::BackLeft.index()];
        let br = states[ModuleId::BackRight.index()];

        assert_relative_eq!(fl.speed, slow_speed, epsilon = 1e-12);
        assert_relative_eq!(fl.angle, slow_angle, epsilon = 1e-12);
        assert_relative_eq!(fr.speed, fast_speed, epsilon = 1e-12);
        assert_relative_eq!(fr.angle, fast_angle, epsilon = 1e-12);
        assert_relative_eq!(bl.speed, slow_speed, epsilon = 1e-12);
        assert_relative_eq!(bl.angle, -slow_angle, epsilon = 1e-12);
        assert_relative_eq!(br.speed, fast_speed, epsilon = 1e-12);
        assert_relative_eq!(br.angle, -fast_angle, epsilon = 1e-12);
    }

    #[test]
    fn test_reverse_angle_stays_in_range() {
        // -0.0 lateral gives -pi on the back modules
        let states = kinematics().to_module_states(&ChassisSpeeds::new(-1.0, -0.0, 0.0));
        for state in states {
            assert_relative_eq!(state.speed, 1.0);
            assert_eq!(state.angle.abs(), PI);
            assert!((-PI..=PI).contains(&state.angle));
        }
    }

    #[test]
    fn test_can_resolve() {
        let kin = kinematics();
        assert!(kin.can_resolve(&ChassisSpeeds::new(3.0, -2.0, 5.0)));
        assert!(!kin.can_resolve(&ChassisSpeeds::new(f64::NAN, 0.0, 0.0)));
        assert!(!kin.can_resolve(&ChassisSpeeds::new(0.0, 0.0, f64::INFINITY)));
        // Finite, but overflows once rotation is added at the mounting point
        assert!(!kin.can_resolve(&ChassisSpeeds::new(1.7e308, 0.0, -1.7e308)));
    }

    #[test]
    fn test_rotation_angles_are_tangent() {
        let mut kin = kinematics();
        let states = kin.to_module_states(&ChassisSpeeds::new(0.0, 0.0, -1.5));
        for (state, offset) in states.iter().zip(kin.geometry().offsets()) {
            let (dir_y, dir_x) = state.angle.sin_cos();
            // Wheel direction perpendicular to the radius
            assert_abs_diff_eq!(dir_x * offset.x + dir_y * offset.y, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_stationary_module_holds_heading() {
        let mut kin = kinematics();
        kin.to_module_states(&ChassisSpeeds::new(0.0, 1.0, 0.0));

        let states = kin.to_module_states(&ChassisSpeeds::zero());
        for state in states {
            assert_eq!(state.speed, 0.0);
            assert_relative_eq!(state.angle, FRAC_PI_2);
        }
        assert_eq!(kin.module_headings, [FRAC_PI_2; NUM_MODULES]);
    }

    #[test]
    fn test_single_stationary_module_holds_heading() {
        let mut kin = kinematics();
        kin.to_module_states(&ChassisSpeeds::new(-1.0, 0.0, 0.0));

        // Rotation about the front-left module: that module has zero velocity
        let omega = 4.0;
        let offset = kin.geometry().offset(ModuleId::FrontLeft);
        let speeds = ChassisSpeeds::new(omega * offset.y, -omega * offset.x, omega);
        let states = kin.to_module_states(&speeds);

        let fl = states[ModuleId::FrontLeft.index()];
        assert_abs_diff_eq!(fl.speed, 0.0, epsilon = 1e-9);
        assert_relative_eq!(fl.angle, PI);
        assert!(states[ModuleId::BackRight.index()].speed > 0.0);
    }

    #[test]
    fn test_field_relative_rotates_by_heading() {
        // Robot facing +90 deg: field-forward is robot-right
        let speeds = ChassisSpeeds::from_field_relative(1.0, 0.0, 0.5, FRAC_PI_2);
        assert_abs_diff_eq!(speeds.vx, 0.0, epsilon = 1e-12);
        assert_relative_eq!(speeds.vy, -1.0);
        assert_eq!(speeds.omega, 0.5);
    }

    #[test]
    fn test_field_relative_zero_heading_is_identity() {
        let speeds = ChassisSpeeds::from_field_relative(0.3, -0.2, 1.0, 0.0);
        assert_eq!(speeds, ChassisSpeeds::new(0.3, -0.2, 1.0));
    }
}
