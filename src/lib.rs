// Swerve drive runtime: chassis velocity commands in, module setpoints out

pub mod config;
pub mod drivetrain;
pub mod heading;
pub mod imu;
pub mod messages;
pub mod module;
pub mod runtime;
pub mod swerve;
