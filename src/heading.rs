// Robot heading from a gyro/magnetometer IMU
//
// Two ways to compute the heading, picked on every read from the sensor's
// live calibration state:
// - Fused: magnetometer calibrated, use the sensor's fused heading as-is
// - RawYawFallback: gyro only, flip the clockwise-positive yaw to CCW-positive

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Sensor interface the heading source reads from.
///
/// Reads are expected to return cached register values without blocking.
pub trait HeadingSensor {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Reset the sensor's yaw reference so the current direction reads 0
    fn zero_yaw(&mut self) -> Result<(), Self::Error>;

    fn is_magnetometer_calibrated(&self) -> Result<bool, Self::Error>;

    /// Gyro + magnetometer heading in degrees, CCW-positive
    fn fused_heading(&self) -> Result<f64, Self::Error>;

    /// Native yaw in degrees, clockwise-positive
    fn yaw(&self) -> Result<f64, Self::Error>;
}

/// Which computation produced a heading reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingMode {
    Fused,
    RawYawFallback,
}

/// A single heading read, CCW-positive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadingReading {
    pub degrees: f64,
    pub mode: HeadingMode,
}

impl HeadingReading {
    pub fn radians(&self) -> f64 {
        self.degrees.to_radians()
    }
}

/// CCW-positive heading on top of a [`HeadingSensor`]
pub struct HeadingSource<S> {
    sensor: S,
}

impl<S: HeadingSensor> HeadingSource<S> {
    pub fn new(sensor: S) -> Self {
        Self { sensor }
    }

    /// Read the current heading straight from the sensor
    pub fn current_heading(&self) -> Result<HeadingReading, S::Error> {
        let reading = if self.sensor.is_magnetometer_calibrated()? {
            HeadingReading {
                degrees: self.sensor.fused_heading()?,
                mode: HeadingMode::Fused,
            }
        } else {
            HeadingReading {
                degrees: 360.0 - self.sensor.yaw()?,
                mode: HeadingMode::RawYawFallback,
            }
        };

        debug!("Heading {:.2} deg ({:?})", reading.degrees, reading.mode);
        Ok(reading)
    }

    /// Make the current direction the new "forward"
    pub fn zero(&mut self) -> Result<(), S::Error> {
        info!("Zeroing heading");
        self.sensor.zero_yaw()
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }
}
