// Periodic swerve drive loop
//
// `drive()` only stores the latest chassis target. `tick()` runs once per
// control period: kinematics -> desaturation -> voltage scaling -> all four
// modules commanded with values from the same cycle.
//
// Callers must serialize `drive()` and `tick()` (the runtime does both from
// its single loop task).

use tracing::{debug, info, warn};

use crate::config::{ConfigError, RobotConfig};
use crate::module::{ModuleCommand, SwerveModule};
use crate::swerve::{
    ChassisSpeeds, ModuleGeometry, ModuleId, NUM_MODULES, PlatformLimits, SwerveKinematics,
    desaturate_wheel_speeds,
};

/// Error types for a drive cycle
#[derive(Debug, thiserror::Error)]
pub enum DriveError<E> {
    #[error("Module {module} rejected its setpoint: {source}")]
    Module { module: ModuleId, source: E },
}

/// Four-module swerve drivetrain
pub struct Drivetrain<M> {
    kinematics: SwerveKinematics,
    limits: PlatformLimits,
    modules: [M; NUM_MODULES],
    target: ChassisSpeeds,
}

impl<M: SwerveModule> Drivetrain<M> {
    /// `modules` must be in [`ModuleId`] order
    pub fn new(geometry: ModuleGeometry, limits: PlatformLimits, modules: [M; NUM_MODULES]) -> Self {
        Self {
            kinematics: SwerveKinematics::new(geometry),
            limits,
            modules,
            target: ChassisSpeeds::zero(),
        }
    }

    /// Validate the config, derive the platform limits and build the drivetrain
    pub fn from_config(config: &RobotConfig, modules: [M; NUM_MODULES]) -> Result<Self, ConfigError> {
        config.validate()?;

        let geometry = ModuleGeometry::new(config.geometry.track_width_m, config.geometry.wheelbase_m);
        let limits = PlatformLimits::derive(&config.drive, &geometry);
        info!(
            "Drivetrain limits: {:.3} m/s, {:.3} rad/s, {:.1} V",
            limits.max_linear_speed, limits.max_angular_speed, limits.max_voltage
        );

        Ok(Self::new(geometry, limits, modules))
    }

    /// Set the chassis target, replacing any previous one
    pub fn drive(&mut self, speeds: ChassisSpeeds) {
        self.target = speeds;
    }

    /// True if `speeds` gives every module a finite velocity
    pub fn can_drive(&self, speeds: &ChassisSpeeds) -> bool {
        self.kinematics.can_resolve(speeds)
    }

    pub fn target(&self) -> ChassisSpeeds {
        self.target
    }

    pub fn limits(&self) -> &PlatformLimits {
        &self.limits
    }

    pub fn modules(&self) -> &[M; NUM_MODULES] {
        &self.modules
    }

    /// Module setpoints for the current target, without commanding anything
    pub fn compute(&mut self) -> [ModuleCommand; NUM_MODULES] {
        let mut states = self.kinematics.to_module_states(&self.target);
        let scale = desaturate_wheel_speeds(&mut states, self.limits.max_linear_speed);
        if scale < 1.0 {
            debug!("Desaturated module speeds by {:.3}", scale);
        }

        states.map(|state| ModuleCommand {
            voltage: self.limits.speed_to_voltage(state.speed),
            angle: state.angle,
        })
    }

    /// Run one control cycle.
    ///
    /// Every module is commanded even if an earlier one fails; the first
    /// failure (in module order) is returned after all four were tried.
    pub fn tick(&mut self) -> Result<[ModuleCommand; NUM_MODULES], DriveError<M::Error>> {
        let commands = self.compute();
        let mut first_error = None;

        for (id, (module, cmd)) in ModuleId::ALL.into_iter().zip(self.modules.iter_mut().zip(&commands)) {
            debug!("Module {}: {:.3} V @ {:.3} rad", id, cmd.voltage, cmd.angle);

            if let Err(source) = module.set(cmd.voltage, cmd.angle) {
                warn!("Module {} failed to accept setpoint: {}", id, source);
                if first_error.is_none() {
                    first_error = Some(DriveError::Module { module: id, source });
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(commands),
        }
    }
}
