// Swerve drive math for the four-module base
//
// Provides:
// - Module layout on the chassis
// - Inverse kinematics (chassis velocity -> module speed/angle)
// - Wheel speed desaturation
// - Platform limits derived from the drive hardware

pub mod geometry;
pub mod kinematics;
pub mod limits;
pub mod saturation;

pub use geometry::{ModuleGeometry, ModuleId, NUM_MODULES, Translation2d};
pub use kinematics::{ChassisSpeeds, ModuleState, SwerveKinematics};
pub use limits::PlatformLimits;
pub use saturation::desaturate_wheel_speeds;
