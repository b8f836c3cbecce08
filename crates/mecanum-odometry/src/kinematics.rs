//! Mecanum wheel kinematics.
//!
//! Both roller layouts share the same functional form:
//!
//! ```text
//! linear_x = r/4     · (s_x · w)
//! linear_y = r/4     · (s_y · w)
//! angular  = r/(4k)  · (s_θ · w)
//! ```
//!
//! where `w = [w0, w1, w2, w3]` and the sign vectors `s_*` and rotation
//! constant `k` depend on the [`SignConvention`]:
//!
//! | Convention | `s_x`       | `s_y`       | `s_θ`       | `k`     |
//! |------------|-------------|-------------|-------------|---------|
//! | Normal     | `[+ + + +]` | `[- + - +]` | `[- - + +]` | `a + b` |
//! | Flipped    | `[+ + - -]` | `[- + + -]` | `[- - - -]` | `b - a` |
//!
//! The three sign vectors are mutually orthogonal, so [`inverse`] is an exact
//! right inverse of [`forward`].
//!
//! # Example
//!
//! ```rust
//! use mecanum_odometry::kinematics;
//! use mecanum_types::{Geometry, SignConvention, WheelVelocities};
//!
//! let geometry = Geometry::new(1.0, 0.5, 0.1);
//! let body = kinematics::forward(
//!     WheelVelocities::new(10.0, 10.0, 10.0, 10.0),
//!     &geometry,
//!     SignConvention::Normal,
//! );
//! assert!((body.linear_x - 1.0).abs() < 1e-12);
//! ```

use mecanum_types::{BodyVelocity, Geometry, OdomError, SignConvention, WheelVelocities};

/// Rotational lever arm `k` for the given roller layout.
///
/// Zero means the layout cannot observe (or produce) yaw with this geometry.
pub fn rotation_constant(geometry: &Geometry, convention: SignConvention) -> f64 {
    match convention {
        SignConvention::Normal => geometry.wheels_a + geometry.wheels_b,
        SignConvention::Flipped => geometry.wheels_b - geometry.wheels_a,
    }
}

/// Wheel velocities → body velocity.
///
/// Degenerate geometry (zero radius or zero [`rotation_constant`]) is a caller
/// contract violation; the output is then meaningless (possibly non-finite)
/// rather than an error.
pub fn forward(
    wheels: WheelVelocities,
    geometry: &Geometry,
    convention: SignConvention,
) -> BodyVelocity {
    match convention {
        SignConvention::Normal => forward_normal(wheels, geometry),
        SignConvention::Flipped => forward_flipped(wheels, geometry),
    }
}

/// Forward kinematics for the normal roller layout.
pub fn forward_normal(wheels: WheelVelocities, geometry: &Geometry) -> BodyVelocity {
    let WheelVelocities { w0, w1, w2, w3 } = wheels;
    let r = geometry.wheel_radius;
    let k = rotation_constant(geometry, SignConvention::Normal);

    BodyVelocity::new(
        r / 4.0 * (w0 + w1 + w2 + w3),
        r / 4.0 * (-w0 + w1 - w2 + w3),
        r / (4.0 * k) * (-w0 - w1 + w2 + w3),
    )
}

/// Forward kinematics for the flipped roller layout.
pub fn forward_flipped(wheels: WheelVelocities, geometry: &Geometry) -> BodyVelocity {
    let WheelVelocities { w0, w1, w2, w3 } = wheels;
    let r = geometry.wheel_radius;
    let k = rotation_constant(geometry, SignConvention::Flipped);

    BodyVelocity::new(
        r / 4.0 * (w0 + w1 - w2 - w3),
        r / 4.0 * (-w0 + w1 + w2 - w3),
        -r / (4.0 * k) * (w0 + w1 + w2 + w3),
    )
}

/// Body velocity → wheel velocities.
///
/// This is the actuation-side transform; the odometry core only uses it to
/// check that [`forward`] undoes it, and simulation tooling uses it to
/// synthesise wheel readings from a commanded motion.
pub fn inverse(
    velocity: BodyVelocity,
    geometry: &Geometry,
    convention: SignConvention,
) -> WheelVelocities {
    let BodyVelocity {
        linear_x: vx,
        linear_y: vy,
        angular: wz,
    } = velocity;
    let k = rotation_constant(geometry, convention);
    let kw = k * wz;

    let wheels = match convention {
        SignConvention::Normal => {
            WheelVelocities::new(vx - vy - kw, vx + vy - kw, vx - vy + kw, vx + vy + kw)
        }
        SignConvention::Flipped => {
            WheelVelocities::new(vx - vy - kw, vx + vy - kw, -vx + vy - kw, -vx - vy - kw)
        }
    };
    wheels.scaled(1.0 / geometry.wheel_radius)
}

/// Check that `geometry` describes a chassis the given layout can observe.
///
/// # Errors
///
/// Returns [`OdomError::InvalidGeometry`] when the radius is not strictly
/// positive, a half-extent is not finite, or the [`rotation_constant`] is
/// zero.
pub fn validate(geometry: &Geometry, convention: SignConvention) -> Result<(), OdomError> {
    let invalid = |reason: String| -> Result<(), OdomError> {
        Err(OdomError::InvalidGeometry { reason })
    };

    if !(geometry.wheel_radius.is_finite() && geometry.wheel_radius > 0.0) {
        return invalid(format!(
            "wheel radius must be positive, got {}",
            geometry.wheel_radius
        ));
    }
    if !geometry.wheels_a.is_finite() || !geometry.wheels_b.is_finite() {
        return invalid(format!(
            "half-extents must be finite, got a={} b={}",
            geometry.wheels_a, geometry.wheels_b
        ));
    }
    let k = rotation_constant(geometry, convention);
    if k.abs() < f64::EPSILON {
        return invalid(format!(
            "rotation constant is zero for the {convention} layout (a={} b={})",
            geometry.wheels_a, geometry.wheels_b
        ));
    }
    Ok(())
}
