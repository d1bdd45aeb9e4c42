// Platform speed and voltage limits, derived once at startup

use std::f64::consts::PI;

use super::geometry::ModuleGeometry;
use crate::config::DriveConfig;

/// What the drivetrain is physically able to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlatformLimits {
    /// Top wheel speed in m/s
    pub max_linear_speed: f64,
    /// Top spin rate in rad/s when rotating in place
    pub max_angular_speed: f64,
    /// Voltage corresponding to `max_linear_speed`
    pub max_voltage: f64,
}

impl PlatformLimits {
    /// `max_linear_speed = rpm / 60 * reduction * wheel_diameter * pi`
    /// and `max_angular_speed = max_linear_speed / hypot(W/2, L/2)`.
    pub fn derive(drive: &DriveConfig, geometry: &ModuleGeometry) -> Self {
        let max_linear_speed =
            drive.motor_free_speed_rpm / 60.0 * drive.drive_reduction * drive.wheel_diameter_m * PI;

        Self {
            max_linear_speed,
            max_angular_speed: max_linear_speed / geometry.drive_base_radius(),
            max_voltage: drive.max_voltage,
        }
    }

    /// Convert a module speed into a drive voltage
    pub fn speed_to_voltage(&self, speed: f64) -> f64 {
        speed / self.max_linear_speed * self.max_voltage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_drive_limits() {
        let drive = DriveConfig::default();
        let geometry = ModuleGeometry::new(0.4699, 0.4699);
        let limits = PlatformLimits::derive(&drive, &geometry);

        // NEO on an MK4i L2 is roughly 4.6 m/s free speed
        assert_relative_eq!(limits.max_linear_speed, 4.6, epsilon = 0.05);
        assert_relative_eq!(
            limits.max_angular_speed,
            limits.max_linear_speed / (0.4699f64 / 2.0).hypot(0.4699 / 2.0)
        );
        assert_eq!(limits.max_voltage, 12.0);
    }

    #[test]
    fn test_speed_to_voltage() {
        let limits = PlatformLimits {
            max_linear_speed: 4.0,
            max_angular_speed: 10.0,
            max_voltage: 12.0,
        };
        assert_relative_eq!(limits.speed_to_voltage(4.0), 12.0);
        assert_relative_eq!(limits.speed_to_voltage(-1.0), -3.0);
        assert_eq!(limits.speed_to_voltage(0.0), 0.0);
    }
}
