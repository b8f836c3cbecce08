//! End-to-end trajectories through the public `Odometry` API.

use std::f64::consts::{PI, TAU};
use std::time::Duration;

use mecanum_odometry::{Odometry, kinematics};
use mecanum_types::{BodyVelocity, Geometry, SignConvention, WheelVelocities};

const CYCLE: Duration = Duration::from_millis(20);

fn odometry(geometry: Geometry, convention: SignConvention) -> Odometry {
    let mut odom = Odometry::try_new(geometry, convention, 10).expect("valid configuration");
    odom.init(Duration::ZERO);
    odom
}

/// Drive `odom` with wheel readings synthesised from `body` for `cycles`
/// control cycles starting right after `start`.
fn drive(odom: &mut Odometry, body: BodyVelocity, start: Duration, cycles: u32) -> Duration {
    let wheels = kinematics::inverse(body, &odom.geometry(), odom.sign_convention());
    let mut t = start;
    for _ in 0..cycles {
        t += CYCLE;
        assert!(odom.update(wheels, t));
    }
    t
}

#[test]
fn straight_line_sums_displacements() {
    let mut odom = odometry(Geometry::new(1.0, 0.5, 0.1), SignConvention::Normal);
    drive(&mut odom, BodyVelocity::new(0.5, 0.0, 0.0), Duration::ZERO, 500);

    // 500 cycles × 20 ms × 0.5 m/s
    assert!((odom.x() - 5.0).abs() < 1e-9);
    assert!(odom.y().abs() < 1e-12);
    assert!(odom.heading().abs() < 1e-12);
}

#[test]
fn full_revolution_in_place_returns_to_start() {
    let mut odom = odometry(Geometry::new(1.0, 0.5, 0.1), SignConvention::Normal);
    // π rad/s for 2 s = one full turn.
    drive(&mut odom, BodyVelocity::new(0.0, 0.0, PI), Duration::ZERO, 100);

    assert!((odom.heading() - TAU).abs() < 1e-9, "heading is not wrapped");
    assert!(odom.x().abs() < 1e-9);
    assert!(odom.y().abs() < 1e-9);
}

#[test]
fn heading_accumulates_past_two_pi() {
    let mut odom = odometry(Geometry::new(0.5, 1.0, 0.1), SignConvention::Flipped);
    drive(&mut odom, BodyVelocity::new(0.0, 0.0, PI), Duration::ZERO, 250);
    assert!((odom.heading() - 5.0 * PI).abs() < 1e-9);
}

#[test]
fn driving_a_circle_closes_the_loop() {
    let mut odom = odometry(Geometry::default(), SignConvention::Normal);
    // 1 m/s forward at 0.5 rad/s: radius 2 m, period 4π s ≈ 628.3 cycles.
    // The fractional remainder goes in one final short cycle.
    let body = BodyVelocity::new(1.0, 0.0, 0.5);
    let t = drive(&mut odom, body, Duration::ZERO, 628);
    let remaining = Duration::from_secs_f64(4.0 * PI) - t;
    let wheels = kinematics::inverse(body, &odom.geometry(), odom.sign_convention());
    assert!(odom.update(wheels, t + remaining));

    assert!(odom.x().abs() < 1e-6, "x = {}", odom.x());
    assert!(odom.y().abs() < 1e-6, "y = {}", odom.y());
    assert!((odom.heading() - TAU).abs() < 1e-6);
}

#[test]
fn strafing_while_rotating_stays_on_circle() {
    let mut odom = odometry(Geometry::default(), SignConvention::Normal);
    // Lateral 1 m/s with yaw rate 1 rad/s circles around (-1, 0).
    drive(&mut odom, BodyVelocity::new(0.0, 1.0, 1.0), Duration::ZERO, 77);
    let dx = odom.x() + 1.0;
    let dy = odom.y();
    assert!(((dx * dx + dy * dy).sqrt() - 1.0).abs() < 1e-9);
}

#[test]
fn round_trip_through_inverse_kinematics() {
    let geometry = Geometry::new(0.5, 1.0, 0.1);
    for convention in [SignConvention::Normal, SignConvention::Flipped] {
        for body in [
            BodyVelocity::new(1.0, 0.0, 0.0),
            BodyVelocity::new(-1.0, 1.0, 0.1),
            BodyVelocity::new(0.3, -0.2, -2.0),
        ] {
            let wheels = kinematics::inverse(body, &geometry, convention);
            let back = kinematics::forward(wheels, &geometry, convention);
            assert!((back.linear_x - body.linear_x).abs() < 1e-9);
            assert!((back.linear_y - body.linear_y).abs() < 1e-9);
            assert!((back.angular - body.angular).abs() < 1e-9);
        }
    }
}

#[test]
fn duplicate_timestamps_are_skipped_by_the_driver() {
    let mut odom = odometry(Geometry::new(1.0, 0.5, 0.1), SignConvention::Normal);
    let wheels = WheelVelocities::new(10.0, 10.0, 10.0, 10.0);
    let t = Duration::from_millis(100);

    assert!(odom.update(wheels, t));
    let x = odom.x();
    assert!(!odom.update(wheels, t));
    assert_eq!(odom.x(), x);
}

#[test]
fn constant_wheel_speeds_settle_the_smoothed_velocity() {
    let mut odom = odometry(Geometry::new(1.0, 0.5, 0.1), SignConvention::Normal);
    drive(&mut odom, BodyVelocity::new(0.0, 0.0, 3.0), Duration::ZERO, 4);
    drive(&mut odom, BodyVelocity::new(0.7, -0.4, 0.0), Duration::from_millis(80), 10);

    assert!((odom.linear_x() - 0.7).abs() < 1e-9);
    assert!((odom.linear_y() + 0.4).abs() < 1e-9);
    assert!(odom.angular().abs() < 1e-9);
}

#[test]
fn open_loop_matches_closed_loop_for_the_same_motion() {
    let geometry = Geometry::new(0.3, 0.25, 0.0759);
    let mut closed = odometry(geometry, SignConvention::Normal);
    let mut open = odometry(geometry, SignConvention::Normal);

    let body = BodyVelocity::new(0.4, 0.1, -0.8);
    let wheels = kinematics::inverse(body, &geometry, SignConvention::Normal);
    let mut t = Duration::ZERO;
    for _ in 0..50 {
        t += CYCLE;
        assert!(closed.update(wheels, t));
        assert!(open.update_open_loop(body, t));
    }

    assert!((closed.x() - open.x()).abs() < 1e-9);
    assert!((closed.y() - open.y()).abs() < 1e-9);
    assert!((closed.heading() - open.heading()).abs() < 1e-9);
}
