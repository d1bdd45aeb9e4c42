// Fixed-rate swerve loop with command watchdog
// Note: the watchdog stops the robot if the command source goes quiet
// Eg. if teleop crashes, the drivetrain would otherwise keep driving the last command forever

use std::time::{Duration, Instant};
use tokio::sync::mpsc::unbounded_channel;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use crate::config::RobotConfig;
use crate::drivetrain::{DriveError, Drivetrain};
use crate::heading::{HeadingReading, HeadingSensor, HeadingSource};
use crate::imu::RemoteImu;
use crate::messages::{BaseCommand, HeadingReport, ImuSample, RuntimeHealth};
use crate::module::{DryRunModule, ModuleCommand, SwerveModule, ZenohModule};
use crate::swerve::{ChassisSpeeds, ModuleId, NUM_MODULES};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub struct Runtime<M, S> {
    drivetrain: Drivetrain<M>,
    heading: HeadingSource<S>,
    cmd_timeout: Duration,
    cmd_received_at: Option<Instant>,
    health: RuntimeHealth,
}

impl<M: SwerveModule, S: HeadingSensor> Runtime<M, S> {
    pub fn new(drivetrain: Drivetrain<M>, heading: HeadingSource<S>, cmd_timeout: Duration) -> Self {
        Self {
            drivetrain,
            heading,
            cmd_timeout,
            cmd_received_at: None,
            health: RuntimeHealth::CmdStale, // Start stale until first cmd
        }
    }

    /// Process incoming command
    pub fn on_command(&mut self, cmd: BaseCommand) {
        self.on_command_at(cmd, Instant::now());
    }

    fn on_command_at(&mut self, cmd: BaseCommand, now: Instant) {
        debug!("Received command: {:?}", &cmd);

        let heading_rad = if cmd.field_relative {
            match self.heading.current_heading() {
                Ok(reading) => reading.radians(),
                Err(e) => {
                    warn!("Dropping field-relative command, heading unavailable: {}", e);
                    return;
                }
            }
        } else {
            0.0
        };

        let speeds = cmd.to_chassis_speeds(heading_rad);
        if !self.drivetrain.can_drive(&speeds) {
            warn!("Dropping command with non-finite module velocities: {:?}", &cmd);
            return;
        }

        self.drivetrain.drive(speeds);
        self.cmd_received_at = Some(now);
    }

    /// Make the robot's current direction the new forward
    pub fn zero_heading(&mut self) -> Result<(), S::Error> {
        self.heading.zero()
    }

    pub fn current_heading(&self) -> Result<HeadingReading, S::Error> {
        self.heading.current_heading()
    }

    pub fn health(&self) -> RuntimeHealth {
        self.health
    }

    pub fn drivetrain(&self) -> &Drivetrain<M> {
        &self.drivetrain
    }

    pub fn heading_sensor_mut(&mut self) -> &mut S {
        self.heading.sensor_mut()
    }

    /// Run one control cycle (includes watchdog logic)
    pub fn step(&mut self) -> Result<[ModuleCommand; NUM_MODULES], DriveError<M::Error>> {
        self.step_at(Instant::now())
    }

    fn step_at(&mut self, now: Instant) -> Result<[ModuleCommand; NUM_MODULES], DriveError<M::Error>> {
        self.service_watchdog(now);

        self.drivetrain.tick().inspect_err(|_| {
            self.health = RuntimeHealth::ActuatorFault;
        })
    }

    fn service_watchdog(&mut self, now: Instant) {
        match self.cmd_received_at {
            Some(at) if now.saturating_duration_since(at) <= self.cmd_timeout => {
                self.health = RuntimeHealth::Ok;
            }
            Some(at) => {
                // Watchdog triggered - stop the robot
                if self.health != RuntimeHealth::CmdStale {
                    warn!(
                        "Command stale ({:?} old), stopping robot",
                        now.saturating_duration_since(at)
                    );
                }
                self.health = RuntimeHealth::CmdStale;
                self.drivetrain.drive(ChassisSpeeds::zero());
            }
            None => {
                // No command ever received, target is still zero
                self.health = RuntimeHealth::CmdStale;
            }
        }
    }
}

/// Open the zenoh session and run the loop until an error occurs
pub async fn run(config: RobotConfig, dry_run: bool) -> Result<(), BoxError> {
    config.validate()?;

    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;

    if dry_run {
        info!("Dry run: module setpoints are logged, not published");
        let modules = ModuleId::ALL.map(DryRunModule::new);
        drive_loop(&session, &config, modules).await
    } else {
        let modules = declare_modules(&session, &config).await?;
        drive_loop(&session, &config, modules).await
    }
}

async fn declare_modules(
    session: &zenoh::Session,
    config: &RobotConfig,
) -> Result<[ZenohModule; NUM_MODULES], BoxError> {
    let prefix = config.runtime.topic_rt_module_prefix.as_str();
    let hw = &config.modules;

    Ok([
        ZenohModule::declare(session, prefix, ModuleId::FrontLeft, hw[0]).await?,
        ZenohModule::declare(session, prefix, ModuleId::FrontRight, hw[1]).await?,
        ZenohModule::declare(session, prefix, ModuleId::BackLeft, hw[2]).await?,
        ZenohModule::declare(session, prefix, ModuleId::BackRight, hw[3]).await?,
    ])
}

async fn drive_loop<M: SwerveModule>(
    session: &zenoh::Session,
    config: &RobotConfig,
    modules: [M; NUM_MODULES],
) -> Result<(), BoxError> {
    let rt = &config.runtime;

    info!("Setting up publishers and subscribers...");
    let sub_cmd = session.declare_subscriber(rt.topic_cmd_base.clone()).await?;
    let sub_zero = session.declare_subscriber(rt.topic_cmd_zero_heading.clone()).await?;
    let sub_imu = session.declare_subscriber(rt.topic_imu_sample.clone()).await?;
    let pub_imu_zero = session.declare_publisher(rt.topic_imu_zero.clone()).await?;
    let pub_health = session.declare_publisher(rt.topic_health.clone()).await?;
    let pub_heading = session.declare_publisher(rt.topic_heading.clone()).await?;

    let (zero_tx, mut zero_rx) = unbounded_channel();
    let heading = HeadingSource::new(RemoteImu::new(rt.imu_timeout(), zero_tx));
    let drivetrain = Drivetrain::from_config(config, modules)?;

    let mut runtime = Runtime::new(drivetrain, heading, rt.cmd_timeout());
    let mut tick = interval(rt.loop_period());

    info!(
        "Runtime started: {}Hz loop, {}ms watchdog timeout",
        rt.loop_hz, rt.cmd_timeout_ms
    );
    info!(
        "Subscribed to: {}, {}, {}",
        rt.topic_cmd_base, rt.topic_cmd_zero_heading, rt.topic_imu_sample
    );
    info!(
        "Publishing to: {}/*, {}, {}",
        rt.topic_rt_module_prefix, rt.topic_health, rt.topic_heading
    );

    loop {
        tick.tick().await;

        // 1. Latest IMU registers
        while let Ok(Some(sample)) = sub_imu.try_recv() {
            let payload = sample.payload().to_bytes();
            match serde_json::from_slice::<ImuSample>(&payload) {
                Ok(imu) => runtime.heading_sensor_mut().on_sample(imu),
                Err(e) => warn!("Failed to parse IMU sample: {}", e),
            }
        }

        // 2. Heading resets, forwarded to the IMU node
        while let Ok(Some(_)) = sub_zero.try_recv() {
            if let Err(e) = runtime.zero_heading() {
                warn!("Failed to zero heading: {}", e);
            }
        }
        while zero_rx.try_recv().is_ok() {
            pub_imu_zero.put("zero").await?;
        }

        // 3. Drain all pending commands (non-blocking), keep latest
        while let Ok(Some(sample)) = sub_cmd.try_recv() {
            let payload = sample.payload().to_bytes();
            match serde_json::from_slice::<BaseCommand>(&payload) {
                Ok(cmd) => runtime.on_command(cmd),
                Err(e) => warn!("Failed to parse command: {}", e),
            }
        }

        // 4. Command the modules
        if let Err(e) = runtime.step() {
            error!("Drive cycle failed: {}", e);
        }

        // 5. Publish health and heading
        let health_json = serde_json::to_string(&runtime.health())?;
        pub_health.put(health_json).await?;

        match runtime.current_heading() {
            Ok(reading) => {
                let heading_json = serde_json::to_string(&HeadingReport::from(reading))?;
                pub_heading.put(heading_json).await?;
            }
            Err(e) => debug!("Heading unavailable: {}", e),
        }
    }
}
