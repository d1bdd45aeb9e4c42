// Define message types for the runtime

use serde::{Deserialize, Serialize};

use crate::config::ModuleConfig;
use crate::heading::{HeadingMode, HeadingReading};
use crate::swerve::{ChassisSpeeds, ModuleId};

// Command from teleop/scripts -> runtime
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BaseCommand {
    pub x_vel: f64,     // m/s forward
    pub y_vel: f64,     // m/s left
    pub theta_vel: f64, // rad/s counter-clockwise
    // x/y given in the field frame instead of the robot frame
    #[serde(default)]
    pub field_relative: bool,
}

impl BaseCommand {
    /// Body-frame speeds, using `heading_rad` to resolve field-relative commands
    pub fn to_chassis_speeds(&self, heading_rad: f64) -> ChassisSpeeds {
        if self.field_relative {
            ChassisSpeeds::from_field_relative(self.x_vel, self.y_vel, self.theta_vel, heading_rad)
        } else {
            ChassisSpeeds::new(self.x_vel, self.y_vel, self.theta_vel)
        }
    }
}

// Raw IMU registers published by the IMU node -> runtime
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct ImuSample {
    pub yaw_deg: f64, // clockwise-positive
    pub fused_heading_deg: f64,
    pub magnetometer_calibrated: bool,
}

// Per-module setpoint from runtime -> hardware node
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModuleActuation {
    pub module: ModuleId,
    pub drive_motor_id: u8,
    pub steer_motor_id: u8,
    pub steer_encoder_id: u8,
    pub steer_offset_rad: f64,
    pub voltage: f64,
    pub angle_rad: f64,
}

impl ModuleActuation {
    pub fn new(module: ModuleId, hw: &ModuleConfig, voltage: f64, angle_rad: f64) -> Self {
        Self {
            module,
            drive_motor_id: hw.drive_motor_id,
            steer_motor_id: hw.steer_motor_id,
            steer_encoder_id: hw.steer_encoder_id,
            steer_offset_rad: hw.steer_offset_rad,
            voltage,
            angle_rad,
        }
    }
}

/// Heading published by runtime
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HeadingReport {
    pub degrees: f64,
    pub mode: HeadingMode,
}

impl From<HeadingReading> for HeadingReport {
    fn from(reading: HeadingReading) -> Self {
        Self {
            degrees: reading.degrees,
            mode: reading.mode,
        }
    }
}

/// Health status published by runtime
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeHealth {
    Ok,
    CmdStale,
    ActuatorFault,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_field_relative_defaults_false() {
        let cmd: BaseCommand =
            serde_json::from_str(r#"{"x_vel": 0.5, "y_vel": 0.0, "theta_vel": 1.0}"#).unwrap();
        assert!(!cmd.field_relative);
        assert_eq!(cmd.to_chassis_speeds(1.0), ChassisSpeeds::new(0.5, 0.0, 1.0));
    }

    #[test]
    fn test_field_relative_command_uses_heading() {
        let cmd = BaseCommand {
            x_vel: 1.0,
            y_vel: 0.0,
            theta_vel: 0.0,
            field_relative: true,
        };
        let speeds = cmd.to_chassis_speeds(std::f64::consts::PI);
        approx::assert_relative_eq!(speeds.vx, -1.0);
        approx::assert_abs_diff_eq!(speeds.vy, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_health_serialization() {
        assert_eq!(serde_json::to_string(&RuntimeHealth::CmdStale).unwrap(), "\"cmd_stale\"");
        assert_eq!(
            serde_json::to_string(&RuntimeHealth::ActuatorFault).unwrap(),
            "\"actuator_fault\""
        );
    }

    #[test]
    fn test_actuation_carries_module_identity() {
        let hw = crate::config::DEFAULT_MODULES[1];
        let msg = ModuleActuation::new(ModuleId::FrontRight, &hw, 6.0, 0.25);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["module"], "front_right");
        assert_eq!(json["drive_motor_id"], 2);
        assert_eq!(json["steer_motor_id"], 11);
        assert_eq!(json["voltage"], 6.0);
    }
}
