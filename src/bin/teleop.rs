// Keyboard teleop: WASD move, Z/X rotate, R/F speed, G field/robot frame, H zero heading, Q quit
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::time::{Duration, Instant};
use tracing::info;

use swerve_zenoh_runtime::config::{TOPIC_CMD_BASE, TOPIC_CMD_ZERO_HEADING};
use swerve_zenoh_runtime::messages::BaseCommand;

const SPEEDS: [f64; 3] = [0.5, 1.5, 3.0]; // m/s
const THETA_SPEEDS: [f64; 3] = [0.5, 1.5, 3.0]; // rad/s
const INPUT_TIMEOUT_MS: u64 = 100; // Reset velocities after this much time with no input

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;
    let pub_cmd = session.declare_publisher(TOPIC_CMD_BASE).await?;
    let pub_zero = session.declare_publisher(TOPIC_CMD_ZERO_HEADING).await?;

    info!("Controls: WASD=move, Z/X=rotate, R/F=speed, G=frame, H=zero heading, Q=quit");
    info!("Speed: LOW, frame: robot");

    enable_raw_mode()?;
    let result = run_teleop(&pub_cmd, &pub_zero).await;
    disable_raw_mode()?;

    result
}

async fn run_teleop(
    pub_cmd: &zenoh::pubsub::Publisher<'_>,
    pub_zero: &zenoh::pubsub::Publisher<'_>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut speed_idx: usize = 0;
    let mut field_relative = false;

    // Persistent velocity state
    let mut cmd = BaseCommand {
        x_vel: 0.0,
        y_vel: 0.0,
        theta_vel: 0.0,
        field_relative,
    };
    let mut last_movement_input = Instant::now();

    loop {
        // Poll for key with 20ms timeout (50Hz effective rate)
        if event::poll(Duration::from_millis(20))? {
            if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
                let pressed = kind == KeyEventKind::Press || kind == KeyEventKind::Repeat;

                match code {
                    // Movement - update velocity and refresh timestamp
                    KeyCode::Char('w') if pressed => {
                        cmd.x_vel = SPEEDS[speed_idx];
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('s') if pressed => {
                        cmd.x_vel = -SPEEDS[speed_idx];
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('a') if pressed => {
                        cmd.y_vel = SPEEDS[speed_idx];
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('d') if pressed => {
                        cmd.y_vel = -SPEEDS[speed_idx];
                        last_movement_input = Instant::now();
                    }

                    // Rotation
                    KeyCode::Char('z') if pressed => {
                        cmd.theta_vel = THETA_SPEEDS[speed_idx];
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('x') if pressed => {
                        cmd.theta_vel = -THETA_SPEEDS[speed_idx];
                        last_movement_input = Instant::now();
                    }

                    // Speed control
                    KeyCode::Char('r') if pressed => {
                        speed_idx = (speed_idx + 1).min(2);
                        print_speed(speed_idx);
                    }
                    KeyCode::Char('f') if pressed => {
                        speed_idx = speed_idx.saturating_sub(1);
                        print_speed(speed_idx);
                    }

                    // Heading
                    KeyCode::Char('g') if pressed => {
                        field_relative = !field_relative;
                        info!("Frame: {}", if field_relative { "field" } else { "robot" });
                    }
                    KeyCode::Char('h') if pressed => {
                        info!("Zeroing heading");
                        pub_zero.put("zero").await?;
                    }

                    // Quit
                    KeyCode::Char('q') | KeyCode::Esc if pressed => break,

                    _ => {}
                }
            }
        }

        // Reset velocities if no movement input for INPUT_TIMEOUT_MS
        if last_movement_input.elapsed() > Duration::from_millis(INPUT_TIMEOUT_MS) {
            cmd.x_vel = 0.0;
            cmd.y_vel = 0.0;
            cmd.theta_vel = 0.0;
        }
        cmd.field_relative = field_relative;

        // Always publish at ~50Hz
        pub_cmd.put(serde_json::to_string(&cmd)?).await?;
    }

    Ok(())
}

fn print_speed(idx: usize) {
    let label = ["LOW", "MED", "HIGH"][idx];
    info!("Speed: {}", label);
}
