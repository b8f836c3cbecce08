//! Planar pose integration.
//!
//! Advances a [`Pose2D`] by one cycle's body-frame [`Displacement`].  When the
//! heading change is non-negligible the step follows the exact circular arc
//! implied by constant body velocity over the cycle:
//!
//! ```text
//! θ₁ = θ₀ + dθ
//! x₁ = x₀ + dx/dθ · (sin θ₁ − sin θ₀) + dy/dθ · (cos θ₁ − cos θ₀)
//! y₁ = y₀ − dx/dθ · (cos θ₁ − cos θ₀) + dy/dθ · (sin θ₁ − sin θ₀)
//! ```
//!
//! Below [`ANGULAR_TOLERANCE`] the arc degenerates to a straight segment and
//! the displacement is rotated into the world frame at the current heading.

use mecanum_types::{BodyVelocity, Pose2D};

/// `|dθ|` below which a step is treated as pure translation (rad).
pub const ANGULAR_TOLERANCE: f64 = 1e-6;

/// Body-frame motion over one cycle: velocity multiplied by elapsed time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Displacement {
    /// Forward displacement (m).
    pub dx: f64,
    /// Leftward displacement (m).
    pub dy: f64,
    /// Heading change (rad).
    pub dtheta: f64,
}

impl Displacement {
    pub fn new(dx: f64, dy: f64, dtheta: f64) -> Self {
        Self { dx, dy, dtheta }
    }

    /// Displacement covered by holding `velocity` for `dt` seconds.
    pub fn from_velocity(velocity: BodyVelocity, dt: f64) -> Self {
        let d = velocity.scaled(dt);
        Self::new(d.linear_x, d.linear_y, d.angular)
    }
}

/// Return `pose` advanced by `step`.
pub fn integrate(pose: Pose2D, step: Displacement) -> Pose2D {
    if step.dtheta.abs() < ANGULAR_TOLERANCE {
        integrate_straight(pose, step)
    } else {
        integrate_arc(pose, step)
    }
}

fn integrate_straight(pose: Pose2D, step: Displacement) -> Pose2D {
    let (sin, cos) = pose.heading.sin_cos();
    Pose2D::new(
        pose.x + step.dx * cos - step.dy * sin,
        pose.y + step.dx * sin + step.dy * cos,
        pose.heading,
    )
}

fn integrate_arc(pose: Pose2D, step: Displacement) -> Pose2D {
    let heading_old = pose.heading;
    let heading = heading_old + step.dtheta;

    let (sin_old, cos_old) = heading_old.sin_cos();
    let (sin_new, cos_new) = heading.sin_cos();
    let d_sin = sin_new - sin_old;
    let d_cos = cos_new - cos_old;

    let rx = step.dx / step.dtheta;
    let ry = step.dy / step.dtheta;

    Pose2D::new(
        pose.x + rx * d_sin + ry * d_cos,
        pose.y - rx * d_cos + ry * d_sin,
        heading,
    )
}
