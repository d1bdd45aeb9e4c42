// IMU fed by samples from the IMU node over zenoh
//
// The runtime pushes every received `ImuSample` in; heading reads return the
// latest one. Zero requests are queued on a channel and published by the
// runtime loop so reads and resets never block the control tick.

use std::time::{Duration, Instant};

use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use crate::heading::HeadingSensor;
use crate::messages::ImuSample;

/// Error types for the remote IMU
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ImuError {
    #[error("No IMU sample received yet")]
    NoSample,

    #[error("IMU sample is stale ({age_ms}ms old)")]
    Stale { age_ms: u128 },

    #[error("Zero request dropped: runtime channel closed")]
    ZeroRequestDropped,
}

/// Last known IMU registers, as published by the IMU node
pub struct RemoteImu {
    latest: Option<(ImuSample, Instant)>,
    max_age: Duration,
    zero_tx: UnboundedSender<()>,
}

impl RemoteImu {
    /// Samples older than `max_age` are reported as stale
    pub fn new(max_age: Duration, zero_tx: UnboundedSender<()>) -> Self {
        Self {
            latest: None,
            max_age,
            zero_tx,
        }
    }

    /// Record a sample received from the IMU node
    pub fn on_sample(&mut self, sample: ImuSample) {
        self.on_sample_at(sample, Instant::now());
    }

    fn on_sample_at(&mut self, sample: ImuSample, received_at: Instant) {
        self.latest = Some((sample, received_at));
    }

    fn sample(&self) -> Result<&ImuSample, ImuError> {
        let (sample, received_at) = self.latest.as_ref().ok_or(ImuError::NoSample)?;
        let age = received_at.elapsed();
        if age > self.max_age {
            return Err(ImuError::Stale {
                age_ms: age.as_millis(),
            });
        }
        Ok(sample)
    }
}

impl HeadingSensor for RemoteImu {
    type Error = ImuError;

    fn zero_yaw(&mut self) -> Result<(), ImuError> {
        self.zero_tx.send(()).map_err(|_| {
            warn!("Runtime is gone, cannot zero IMU");
            ImuError::ZeroRequestDropped
        })
    }

    fn is_magnetometer_calibrated(&self) -> Result<bool, ImuError> {
        Ok(self.sample()?.magnetometer_calibrated)
    }

    fn fused_heading(&self) -> Result<f64, ImuError> {
        Ok(self.sample()?.fused_heading_deg)
    }

    fn yaw(&self) -> Result<f64, ImuError> {
        Ok(self.sample()?.yaw_deg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heading::{HeadingMode, HeadingSource};
    use tokio::sync::mpsc::unbounded_channel;

    fn sample(yaw: f64, fused: f64, calibrated: bool) -> ImuSample {
        ImuSample {
            yaw_deg: yaw,
            fused_heading_deg: fused,
            magnetometer_calibrated: calibrated,
        }
    }

    #[test]
    fn test_no_sample_is_an_error() {
        let (tx, _rx) = unbounded_channel();
        let imu = RemoteImu::new(Duration::from_millis(500), tx);
        assert_eq!(imu.yaw(), Err(ImuError::NoSample));
    }

    #[test]
    fn test_latest_sample_wins() {
        let (tx, _rx) = unbounded_channel();
        let mut imu = RemoteImu::new(Duration::from_millis(500), tx);
        imu.on_sample(sample(10.0, 20.0, false));
        imu.on_sample(sample(30.0, 40.0, true));

        assert_eq!(imu.yaw(), Ok(30.0));
        assert_eq!(imu.fused_heading(), Ok(40.0));
        assert_eq!(imu.is_magnetometer_calibrated(), Ok(true));
    }

    #[test]
    fn test_stale_sample_is_an_error() {
        let (tx, _rx) = unbounded_channel();
        let mut imu = RemoteImu::new(Duration::from_millis(100), tx);
        let Some(old) = Instant::now().checked_sub(Duration::from_secs(1)) else {
            return;
        };
        imu.on_sample_at(sample(10.0, 20.0, false), old);

        assert!(matches!(imu.yaw(), Err(ImuError::Stale { .. })));
    }

    #[test]
    fn test_zero_queues_one_request() {
        let (tx, mut rx) = unbounded_channel();
        let mut imu = RemoteImu::new(Duration::from_millis(500), tx);

        imu.zero_yaw().unwrap();

        assert_eq!(rx.try_recv(), Ok(()));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_zero_after_runtime_shutdown() {
        let (tx, rx) = unbounded_channel();
        drop(rx);
        let mut imu = RemoteImu::new(Duration::from_millis(500), tx);
        assert_eq!(imu.zero_yaw(), Err(ImuError::ZeroRequestDropped));
    }

    #[test]
    fn test_heading_source_over_remote_imu() {
        let (tx, _rx) = unbounded_channel();
        let mut imu = RemoteImu::new(Duration::from_millis(500), tx);
        imu.on_sample(sample(90.0, 42.0, false));

        let mut source = HeadingSource::new(imu);
        let reading = source.current_heading().unwrap();
        assert_eq!(reading.degrees, 270.0);
        assert_eq!(reading.mode, HeadingMode::RawYawFallback);

        source.sensor_mut().on_sample(sample(90.0, 42.0, true));
        assert_eq!(source.current_heading().unwrap().degrees, 42.0);
    }
}
