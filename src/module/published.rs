// Module actuator that publishes setpoints for the hardware node over zenoh

use tracing::debug;
use zenoh::Wait;
use zenoh::pubsub::Publisher;

use super::SwerveModule;
use crate::config::ModuleConfig;
use crate::messages::ModuleActuation;
use crate::swerve::ModuleId;

/// Error types for publishing module setpoints
#[derive(Debug, thiserror::Error)]
pub enum ZenohModuleError {
    #[error("Failed to publish setpoint for module {module}: {reason}")]
    Publish { module: ModuleId, reason: String },

    #[error("Failed to encode setpoint: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One module's actuation topic: `<prefix>/<fl|fr|bl|br>`
pub struct ZenohModule {
    id: ModuleId,
    hw: ModuleConfig,
    publisher: Publisher<'static>,
}

impl ZenohModule {
    /// Declare the publisher for `id` on `session`
    pub async fn declare(
        session: &zenoh::Session,
        prefix: &str,
        id: ModuleId,
        hw: ModuleConfig,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let key = Self::topic(prefix, id);
        debug!("Declaring module publisher on {}", key);
        let publisher = session.declare_publisher(key).await?;
        Ok(Self { id, hw, publisher })
    }

    pub fn topic(prefix: &str, id: ModuleId) -> String {
        format!("{}/{}", prefix, id.short_name())
    }
}

impl SwerveModule for ZenohModule {
    type Error = ZenohModuleError;

    fn set(&mut self, voltage: f64, steer_angle: f64) -> Result<(), ZenohModuleError> {
        let msg = ModuleActuation::new(self.id, &self.hw, voltage, steer_angle);
        let payload = serde_json::to_string(&msg)?;

        self.publisher
            .put(payload)
            .wait()
            .map_err(|e| ZenohModuleError::Publish {
                module: self.id,
                reason: e.to_string(),
            })
    }
}
