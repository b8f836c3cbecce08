//! `mecanum-odometry` – wheel odometry for four-wheel mecanum vehicles.
//!
//! Turns per-wheel angular velocities into a body-frame velocity, integrates
//! that velocity into a running planar pose, and keeps a smoothed copy of the
//! velocity for downstream consumers.
//!
//! # Modules
//!
//! - [`kinematics`] – forward (wheels → body) and inverse (body → wheels)
//!   mecanum kinematics for both [`SignConvention`][mecanum_types::SignConvention]s.
//! - [`rolling_window`] – [`RollingWindow`][rolling_window::RollingWindow]:
//!   bounded moving average used to smooth each velocity channel.
//! - [`integrator`] – curvature-aware pose integration of a per-cycle
//!   [`Displacement`][integrator::Displacement].
//! - [`odometry`] – [`Odometry`][odometry::Odometry]: the per-vehicle state
//!   that ties the three together once per control cycle.

pub mod integrator;
pub mod kinematics;
pub mod odometry;
pub mod rolling_window;

pub use integrator::{Displacement, integrate};
pub use odometry::{DEFAULT_VELOCITY_ROLLING_WINDOW_SIZE, Odometry};
pub use rolling_window::RollingWindow;
