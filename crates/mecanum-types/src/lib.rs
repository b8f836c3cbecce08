use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Angular velocities of the four wheels (rad/s), in mounting order.
///
/// Which physical wheel is `w0`..`w3` is fixed by the chassis wiring; the
/// [`SignConvention`] decides how each one couples into the body velocity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WheelVelocities {
    pub w0: f64,
    pub w1: f64,
    pub w2: f64,
    pub w3: f64,
}

impl WheelVelocities {
    pub fn new(w0: f64, w1: f64, w2: f64, w3: f64) -> Self {
        Self { w0, w1, w2, w3 }
    }

    /// Multiply every wheel velocity by `k`.
    pub fn scaled(self, k: f64) -> Self {
        Self::new(self.w0 * k, self.w1 * k, self.w2 * k, self.w3 * k)
    }
}

/// Planar velocity expressed in the vehicle-fixed body frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyVelocity {
    /// Forward velocity (m/s).
    pub linear_x: f64,
    /// Leftward velocity (m/s).
    pub linear_y: f64,
    /// Counter-clockwise yaw rate (rad/s).
    pub angular: f64,
}

impl BodyVelocity {
    pub fn new(linear_x: f64, linear_y: f64, angular: f64) -> Self {
        Self {
            linear_x,
            linear_y,
            angular,
        }
    }

    /// The zero velocity.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Multiply every channel by `k`.  With `k = dt` this yields the
    /// per-cycle displacement fed to the pose integrator.
    pub fn scaled(self, k: f64) -> Self {
        Self::new(self.linear_x * k, self.linear_y * k, self.angular * k)
    }
}

/// Planar pose in the world frame.
///
/// `heading` is never wrapped: a vehicle that spins twice counter-clockwise
/// reports `4π`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose2D {
    /// X position (m).
    pub x: f64,
    /// Y position (m).
    pub y: f64,
    /// Heading measured counter-clockwise from +X (rad).
    pub heading: f64,
}

impl Pose2D {
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Self { x, y, heading }
    }

    /// The world origin with zero heading.
    pub fn origin() -> Self {
        Self::default()
    }
}

/// Mecanum chassis geometry.
///
/// `wheels_a` and `wheels_b` are the two half-extents of the wheel contact
/// rectangle, `wheel_radius` the roller-to-hub radius.  All lengths in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub wheels_a: f64,
    pub wheels_b: f64,
    pub wheel_radius: f64,
}

impl Geometry {
    pub fn new(wheels_a: f64, wheels_b: f64, wheel_radius: f64) -> Self {
        Self {
            wheels_a,
            wheels_b,
            wheel_radius,
        }
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new(0.3, 0.25, 0.0759)
    }
}

/// Roller layout of the chassis.  Selects which forward-kinematics
/// coefficient matrix applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignConvention {
    #[default]
    Normal,
    Flipped,
}

impl SignConvention {
    /// `Flipped` when `flipped` is true, `Normal` otherwise.
    pub fn from_flipped(flipped: bool) -> Self {
        if flipped { Self::Flipped } else { Self::Normal }
    }

    pub fn is_flipped(self) -> bool {
        self == Self::Flipped
    }
}

impl std::fmt::Display for SignConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignConvention::Normal => write!(f, "normal"),
            SignConvention::Flipped => write!(f, "flipped"),
        }
    }
}

impl std::str::FromStr for SignConvention {
    type Err = OdomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "flipped" => Ok(Self::Flipped),
            other => Err(OdomError::Config(format!(
                "unknown sign convention '{other}' (expected 'normal' or 'flipped')"
            ))),
        }
    }
}

/// Odometry readings after one driver cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OdometrySnapshot {
    /// Time of the cycle (seconds since the driver's epoch).
    pub t: f64,
    /// Whether the cycle was accepted.
    pub updated: bool,
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    /// Smoothed forward velocity (m/s).
    pub linear_x: f64,
    /// Smoothed leftward velocity (m/s).
    pub linear_y: f64,
    /// Smoothed yaw rate (rad/s).
    pub angular: f64,
}

/// Convert seconds since an arbitrary epoch into the `Duration` timestamps
/// used by the odometry core.
///
/// # Errors
///
/// Returns [`OdomError::InvalidTimestamp`] for negative or non-finite input.
pub fn timestamp_from_secs(secs: f64) -> Result<Duration, OdomError> {
    Duration::try_from_secs_f64(secs).map_err(|_| OdomError::InvalidTimestamp(secs))
}

/// Errors from fallible construction, configuration, and log parsing.
///
/// The per-cycle update path never returns these; it reports a rejected
/// cycle with `false` instead.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OdomError {
    #[error("Invalid geometry: {reason}")]
    InvalidGeometry { reason: String },

    #[error("Invalid rolling window size: must be at least 1")]
    InvalidWindow,

    #[error("Invalid timestamp: {0} s (must be finite and non-negative)")]
    InvalidTimestamp(f64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Log error on line {line}: {reason}")]
    Log { line: usize, reason: String },
}
