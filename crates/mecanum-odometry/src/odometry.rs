//! Per-vehicle odometry state.
//!
//! [`Odometry`] owns the pose, the last accepted timestamp, the raw and
//! smoothed body velocity, the chassis geometry, and one [`RollingWindow`]
//! per velocity channel.  A control loop calls [`Odometry::update`] (wheel
//! feedback) or [`Odometry::update_open_loop`] (commanded velocity) once per
//! cycle and then reads the getters.
//!
//! Pose integration always uses the instantaneous velocity.  The rolling
//! windows only shape what the velocity getters report.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use mecanum_odometry::Odometry;
//! use mecanum_types::{SignConvention, WheelVelocities};
//!
//! let mut odom = Odometry::new(10);
//! odom.set_geometry(1.0, 0.5, 0.1);
//! odom.set_sign_convention(SignConvention::Normal);
//! odom.init(Duration::ZERO);
//!
//! // All wheels at 10 rad/s for one second: 1 m straight ahead.
//! let accepted = odom.update(
//!     WheelVelocities::new(10.0, 10.0, 10.0, 10.0),
//!     Duration::from_secs(1),
//! );
//! assert!(accepted);
//! assert!((odom.x() - 1.0).abs() < 1e-9);
//! assert!((odom.linear_x() - 1.0).abs() < 1e-9);
//! ```

use std::time::Duration;

use mecanum_types::{
    BodyVelocity, Geometry, OdomError, Pose2D, SignConvention, WheelVelocities,
};
use tracing::{debug, trace};

use crate::integrator::{self, Displacement};
use crate::kinematics;
use crate::rolling_window::RollingWindow;

/// Samples averaged by the velocity getters unless configured otherwise.
pub const DEFAULT_VELOCITY_ROLLING_WINDOW_SIZE: usize = 10;

/// Odometry estimator for one mecanum vehicle.
///
/// Single-owner and not internally synchronised: call it from the control
/// loop that owns it.
#[derive(Debug, Clone)]
pub struct Odometry {
    timestamp: Duration,
    pose: Pose2D,
    raw_velocity: BodyVelocity,
    velocity: BodyVelocity,
    geometry: Geometry,
    sign_convention: SignConvention,
    linear_x_window: RollingWindow,
    linear_y_window: RollingWindow,
    angular_window: RollingWindow,
}

impl Default for Odometry {
    fn default() -> Self {
        Self::new(DEFAULT_VELOCITY_ROLLING_WINDOW_SIZE)
    }
}

impl Odometry {
    /// Create an estimator at the origin with default geometry and the
    /// normal sign convention.
    ///
    /// `velocity_rolling_window_size` is the number of samples averaged by the
    /// velocity getters; zero is raised to one.
    pub fn new(velocity_rolling_window_size: usize) -> Self {
        Self {
            timestamp: Duration::ZERO,
            pose: Pose2D::origin(),
            raw_velocity: BodyVelocity::zero(),
            velocity: BodyVelocity::zero(),
            geometry: Geometry::default(),
            sign_convention: SignConvention::Normal,
            linear_x_window: RollingWindow::new(velocity_rolling_window_size),
            linear_y_window: RollingWindow::new(velocity_rolling_window_size),
            angular_window: RollingWindow::new(velocity_rolling_window_size),
        }
    }

    /// Create an estimator after validating its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`OdomError::InvalidWindow`] for a zero window size and
    /// [`OdomError::InvalidGeometry`] when `geometry` is degenerate for
    /// `sign_convention`.
    pub fn try_new(
        geometry: Geometry,
        sign_convention: SignConvention,
        velocity_rolling_window_size: usize,
    ) -> Result<Self, OdomError> {
        if velocity_rolling_window_size == 0 {
            return Err(OdomError::InvalidWindow);
        }
        kinematics::validate(&geometry, sign_convention)?;

        let mut odom = Self::new(velocity_rolling_window_size);
        odom.geometry = geometry;
        odom.sign_convention = sign_convention;
        Ok(odom)
    }

    /// Reset to the origin at `time`, zeroing every velocity and emptying the
    /// rolling windows.  Geometry, sign convention, and window size are kept.
    pub fn init(&mut self, time: Duration) {
        self.timestamp = time;
        self.pose = Pose2D::origin();
        self.raw_velocity = BodyVelocity::zero();
        self.velocity = BodyVelocity::zero();
        self.linear_x_window.clear();
        self.linear_y_window.clear();
        self.angular_window.clear();
        debug!(t = time.as_secs_f64(), "odometry initialised");
    }

    /// Replace the chassis geometry used by subsequent updates.
    ///
    /// Not validated; see [`kinematics::validate`] for a checked variant.
    pub fn set_geometry(&mut self, wheels_a: f64, wheels_b: f64, wheel_radius: f64) {
        debug_assert!(wheel_radius > 0.0, "wheel radius must be positive");
        debug_assert!(wheels_a.is_finite() && wheels_b.is_finite());
        self.geometry = Geometry::new(wheels_a, wheels_b, wheel_radius);
        debug!(wheels_a, wheels_b, wheel_radius, "odometry geometry set");
    }

    /// Select the roller layout used by subsequent [`update`][Self::update]s.
    pub fn set_sign_convention(&mut self, sign_convention: SignConvention) {
        self.sign_convention = sign_convention;
        debug!(%sign_convention, "odometry sign convention set");
    }

    /// Integrate one cycle of wheel feedback.
    ///
    /// Returns `false` and changes nothing when `time` is not strictly later
    /// than the last accepted timestamp.
    pub fn update(&mut self, wheels: WheelVelocities, time: Duration) -> bool {
        let Some(dt) = self.elapsed_secs(time) else {
            return false;
        };

        let velocity = kinematics::forward(wheels, &self.geometry, self.sign_convention);
        self.record_velocity(velocity);
        self.advance(velocity, dt, time);
        true
    }

    /// Integrate one cycle of a commanded body velocity, bypassing the
    /// wheel kinematics.
    ///
    /// The command is always recorded as the current velocity.  The pose and
    /// timestamp only advance, and `true` is only returned, when `time` is
    /// strictly later than the last accepted timestamp.
    pub fn update_open_loop(&mut self, command: BodyVelocity, time: Duration) -> bool {
        self.record_velocity(command);

        let Some(dt) = self.elapsed_secs(time) else {
            return false;
        };
        self.advance(command, dt, time);
        true
    }

    // ── Getters ──────────────────────────────────────────────────────────

    /// Heading (rad), unwrapped.
    pub fn heading(&self) -> f64 {
        self.pose.heading
    }

    /// X position (m).
    pub fn x(&self) -> f64 {
        self.pose.x
    }

    /// Y position (m).
    pub fn y(&self) -> f64 {
        self.pose.y
    }

    /// Smoothed forward velocity (m/s).
    pub fn linear_x(&self) -> f64 {
        self.velocity.linear_x
    }

    /// Smoothed leftward velocity (m/s).
    pub fn linear_y(&self) -> f64 {
        self.velocity.linear_y
    }

    /// Smoothed yaw rate (rad/s).
    pub fn angular(&self) -> f64 {
        self.velocity.angular
    }

    pub fn pose(&self) -> Pose2D {
        self.pose
    }

    /// Smoothed body velocity.
    pub fn velocity(&self) -> BodyVelocity {
        self.velocity
    }

    /// Instantaneous body velocity from the most recent update.
    pub fn raw_velocity(&self) -> BodyVelocity {
        self.raw_velocity
    }

    /// Timestamp of the last accepted update (or of `init`).
    pub fn timestamp(&self) -> Duration {
        self.timestamp
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn sign_convention(&self) -> SignConvention {
        self.sign_convention
    }

    pub fn velocity_rolling_window_size(&self) -> usize {
        self.linear_x_window.capacity()
    }

    // ── Internals ────────────────────────────────────────────────────────

    /// Seconds since the last accepted timestamp, or `None` if `time` is not
    /// strictly later.
    fn elapsed_secs(&self, time: Duration) -> Option<f64> {
        match time.checked_sub(self.timestamp) {
            Some(dt) if !dt.is_zero() => Some(dt.as_secs_f64()),
            _ => {
                debug!(
                    dt = time.as_secs_f64() - self.timestamp.as_secs_f64(),
                    "non-positive elapsed time; skipping pose integration"
                );
                None
            }
        }
    }

    fn record_velocity(&mut self, velocity: BodyVelocity) {
        self.raw_velocity = velocity;

        self.linear_x_window.push(velocity.linear_x);
        self.linear_y_window.push(velocity.linear_y);
        self.angular_window.push(velocity.angular);

        self.velocity = BodyVelocity::new(
            self.linear_x_window.mean(),
            self.linear_y_window.mean(),
            self.angular_window.mean(),
        );
    }

    fn advance(&mut self, velocity: BodyVelocity, dt: f64, time: Duration) {
        self.pose = integrator::integrate(self.pose, Displacement::from_velocity(velocity, dt));
        self.timestamp = time;
        trace!(
            x = self.pose.x,
            y = self.pose.y,
            heading = self.pose.heading,
            dt,
            "odometry advanced"
        );
    }
}
