// Swerve module actuator interface
//
// Provides:
// - The per-module actuator trait the drivetrain commands every tick
// - A zenoh-published module for the hardware node
// - A dry-run module that only logs

mod dry_run;
mod published;

pub use dry_run::DryRunModule;
pub use published::{ZenohModule, ZenohModuleError};

use serde::{Deserialize, Serialize};

/// One cycle's command for a single module
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ModuleCommand {
    /// Drive motor voltage (signed)
    pub voltage: f64,
    /// Target wheel angle in radians
    pub angle: f64,
}

/// A drive + steer module the drivetrain can command
pub trait SwerveModule {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Drive at `voltage` with the wheel pointed at `steer_angle` radians
    fn set(&mut self, voltage: f64, steer_angle: f64) -> Result<(), Self::Error>;
}
