// Module stand-in for running without hardware

use std::convert::Infallible;

use tracing::debug;

use super::{ModuleCommand, SwerveModule};
use crate::swerve::ModuleId;

/// Logs setpoints and keeps the last one
#[derive(Debug, Clone)]
pub struct DryRunModule {
    id: ModuleId,
    last: Option<ModuleCommand>,
}

impl DryRunModule {
    pub fn new(id: ModuleId) -> Self {
        Self { id, last: None }
    }

    /// Last setpoint received, if any
    pub fn last_command(&self) -> Option<ModuleCommand> {
        self.last
    }
}

impl SwerveModule for DryRunModule {
    type Error = Infallible;

    fn set(&mut self, voltage: f64, steer_angle: f64) -> Result<(), Infallible> {
        debug!(
            "[dry-run] module {}: voltage={:.3} angle={:.3}",
            self.id, voltage, steer_angle
        );
        self.last = Some(ModuleCommand {
            voltage,
            angle: steer_angle,
        });
        Ok(())
    }
}
