// Robot configuration: geometry, drive hardware, module identities, loop timing, topics
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::swerve::NUM_MODULES;

// Runtime loop frequency
pub const LOOP_HZ: u64 = 50;

// Command timeout for watchdog
pub const CMD_TIMEOUT_MS: u64 = 250;

// IMU samples older than this are not trusted for heading
pub const IMU_TIMEOUT_MS: u64 = 500;

// Zenoh topics
pub const TOPIC_CMD_BASE: &str = "swerve/cmd/base"; // commands
pub const TOPIC_CMD_ZERO_HEADING: &str = "swerve/cmd/zero_heading"; // operator heading reset
pub const TOPIC_IMU_SAMPLE: &str = "swerve/state/imu"; // IMU node -> runtime
pub const TOPIC_IMU_ZERO: &str = "swerve/cmd/imu/zero"; // runtime -> IMU node
pub const TOPIC_RT_MODULE_PREFIX: &str = "swerve/rt/module"; // actuation, one key per module
pub const TOPIC_HEALTH: &str = "swerve/state/health"; // health status
pub const TOPIC_HEADING: &str = "swerve/state/heading"; // current heading

// Chassis geometry (SDS MK4i, square frame)
pub const TRACK_WIDTH_M: f64 = 0.4699;
pub const WHEELBASE_M: f64 = 0.4699;

// NEO free speed
pub const NEO_FREE_SPEED_RPM: f64 = 5880.0;

// MK4i L2 drive reduction and wheel
pub const MK4I_L2_DRIVE_REDUCTION: f64 = (14.0 / 50.0) * (27.0 / 17.0) * (15.0 / 45.0);
pub const MK4I_WHEEL_DIAMETER_M: f64 = 0.10033;

// Cap on drive motor voltage (lower it to cap top speed)
pub const MAX_VOLTAGE: f64 = 12.0;

/// Error types for loading and validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{field} must be positive and finite, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("loop_hz must be non-zero")]
    ZeroLoopRate,
}

/// Distance between module centers (meters)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeometryConfig {
    /// Left-to-right distance between modules
    pub track_width_m: f64,
    /// Front-to-back distance between modules
    pub wheelbase_m: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            track_width_m: TRACK_WIDTH_M,
            wheelbase_m: WHEELBASE_M,
        }
    }
}

/// Drive motor and gearing constants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriveConfig {
    pub motor_free_speed_rpm: f64,
    /// Wheel revolutions per motor revolution
    pub drive_reduction: f64,
    pub wheel_diameter_m: f64,
    pub max_voltage: f64,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            motor_free_speed_rpm: NEO_FREE_SPEED_RPM,
            drive_reduction: MK4I_L2_DRIVE_REDUCTION,
            wheel_diameter_m: MK4I_WHEEL_DIAMETER_M,
            max_voltage: MAX_VOLTAGE,
        }
    }
}

/// Hardware identity of one module, passed through to the actuator driver
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ModuleConfig {
    pub drive_motor_id: u8,
    pub steer_motor_id: u8,
    pub steer_encoder_id: u8,
    /// Aligns the steer encoder zero with wheel-forward (radians)
    pub steer_offset_rad: f64,
}

impl ModuleConfig {
    const fn new(drive_motor_id: u8, steer_motor_id: u8, steer_encoder_id: u8, offset_deg: f64) -> Self {
        Self {
            drive_motor_id,
            steer_motor_id,
            steer_encoder_id,
            steer_offset_rad: -offset_deg.to_radians(),
        }
    }
}

/// CAN IDs and steer offsets in FL, FR, BL, BR order
pub const DEFAULT_MODULES: [ModuleConfig; NUM_MODULES] = [
    ModuleConfig::new(5, 6, 32, 307.8),
    ModuleConfig::new(2, 11, 34, 301.3),
    ModuleConfig::new(7, 8, 31, 13.1),
    ModuleConfig::new(4, 3, 33, 49.2),
];

/// Loop timing and zenoh key expressions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RuntimeConfig {
    pub loop_hz: u64,
    pub cmd_timeout_ms: u64,
    pub imu_timeout_ms: u64,
    pub topic_cmd_base: String,
    pub topic_cmd_zero_heading: String,
    pub topic_imu_sample: String,
    pub topic_imu_zero: String,
    pub topic_rt_module_prefix: String,
    pub topic_health: String,
    pub topic_heading: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            loop_hz: LOOP_HZ,
            cmd_timeout_ms: CMD_TIMEOUT_MS,
            imu_timeout_ms: IMU_TIMEOUT_MS,
            topic_cmd_base: TOPIC_CMD_BASE.to_string(),
            topic_cmd_zero_heading: TOPIC_CMD_ZERO_HEADING.to_string(),
            topic_imu_sample: TOPIC_IMU_SAMPLE.to_string(),
            topic_imu_zero: TOPIC_IMU_ZERO.to_string(),
            topic_rt_module_prefix: TOPIC_RT_MODULE_PREFIX.to_string(),
            topic_health: TOPIC_HEALTH.to_string(),
            topic_heading: TOPIC_HEADING.to_string(),
        }
    }
}

impl RuntimeConfig {
    pub fn loop_period(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.loop_hz.max(1))
    }

    pub fn cmd_timeout(&self) -> Duration {
        Duration::from_millis(self.cmd_timeout_ms)
    }

    pub fn imu_timeout(&self) -> Duration {
        Duration::from_millis(self.imu_timeout_ms)
    }
}

/// Everything the drive core needs, loaded once at startup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RobotConfig {
    pub geometry: GeometryConfig,
    pub drive: DriveConfig,
    pub modules: [ModuleConfig; NUM_MODULES],
    pub runtime: RuntimeConfig,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            geometry: GeometryConfig::default(),
            drive: DriveConfig::default(),
            modules: DEFAULT_MODULES,
            runtime: RuntimeConfig::default(),
        }
    }
}

impl RobotConfig {
    /// Load a JSON config file and validate it
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: RobotConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the drive core cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("geometry.track_width_m", self.geometry.track_width_m),
            ("geometry.wheelbase_m", self.geometry.wheelbase_m),
            ("drive.motor_free_speed_rpm", self.drive.motor_free_speed_rpm),
            ("drive.drive_reduction", self.drive.drive_reduction),
            ("drive.wheel_diameter_m", self.drive.wheel_diameter_m),
            ("drive.max_voltage", self.drive.max_voltage),
        ];

        for (field, value) in checks {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        if self.runtime.loop_hz == 0 {
            return Err(ConfigError::ZeroLoopRate);
        }

        Ok(())
    }
}
