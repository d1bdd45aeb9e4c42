// Module placement on the chassis
// Frame: +x forward, +y left, origin at the rotation center.

use serde::{Deserialize, Serialize};

/// Number of swerve modules on the chassis
pub const NUM_MODULES: usize = 4;

/// Identity of a swerve module.
///
/// The declaration order is the array order used for every per-module
/// value in the crate: front-left, front-right, back-left, back-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleId {
    FrontLeft,
    FrontRight,
    BackLeft,
    BackRight,
}

impl ModuleId {
    /// All modules in array order
    pub const ALL: [ModuleId; NUM_MODULES] = [
        ModuleId::FrontLeft,
        ModuleId::FrontRight,
        ModuleId::BackLeft,
        ModuleId::BackRight,
    ];

    /// Position of this module in per-module arrays
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short name used in topic keys and logs
    pub const fn short_name(self) -> &'static str {
        match self {
            ModuleId::FrontLeft => "fl",
            ModuleId::FrontRight => "fr",
            ModuleId::BackLeft => "bl",
            ModuleId::BackRight => "br",
        }
    }
}

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.short_name())
    }
}

/// A 2D vector in the chassis frame (meters)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Translation2d {
    pub x: f64,
    pub y: f64,
}

impl Translation2d {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance from the origin
    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

/// Fixed offsets of the four modules from the chassis center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModuleGeometry {
    offsets: [Translation2d; NUM_MODULES],
}

impl ModuleGeometry {
    /// Build the module layout from track width and wheelbase (meters).
    ///
    /// Offsets are `(±W/2, ±L/2)` in [`ModuleId`] order:
    /// FL `(W/2, L/2)`, FR `(W/2, -L/2)`, BL `(-W/2, L/2)`, BR `(-W/2, -L/2)`.
    /// Both inputs are expected to be positive; see `RobotConfig::validate`.
    pub fn new(track_width: f64, wheelbase: f64) -> Self {
        let half_w = track_width / 2.0;
        let half_l = wheelbase / 2.0;

        Self {
            offsets: [
                Translation2d::new(half_w, half_l),
                Translation2d::new(half_w, -half_l),
                Translation2d::new(-half_w, half_l),
                Translation2d::new(-half_w, -half_l),
            ],
        }
    }

    pub fn offset(&self, module: ModuleId) -> Translation2d {
        self.offsets[module.index()]
    }

    /// Offsets in [`ModuleId`] order
    pub fn offsets(&self) -> &[Translation2d; NUM_MODULES] {
        &self.offsets
    }

    /// Largest distance from the chassis center to any module
    pub fn drive_base_radius(&self) -> f64 {
        self.offsets
            .iter()
            .map(Translation2d::norm)
            .fold(0.0, f64::max)
    }
}
