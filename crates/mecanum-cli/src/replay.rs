//! Log replay – drives an [`Odometry`] from a recorded JSON-lines log.
//!
//! Each non-blank line that does not start with `#` is one [`Record`]:
//!
//! ```text
//! {"kind":"init","t":0.0}
//! {"kind":"wheels","t":0.02,"w0":10.0,"w1":10.0,"w2":10.0,"w3":10.0}
//! {"kind":"command","t":0.04,"linear_x":0.5,"linear_y":0.0,"angular":0.1}
//! ```
//!
//! `t` is seconds since the recording's epoch.  A log that does not start
//! with an `init` record is initialised at the time of its first record.

use std::io::BufRead;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use mecanum_odometry::Odometry;
use mecanum_types::{
    BodyVelocity, OdomError, OdometrySnapshot, Pose2D, WheelVelocities, timestamp_from_secs,
};

/// One line of a replay log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Record {
    /// Reset the estimator to the origin.
    Init { t: f64 },
    /// Measured wheel angular velocities (rad/s).
    Wheels {
        t: f64,
        w0: f64,
        w1: f64,
        w2: f64,
        w3: f64,
    },
    /// Commanded body velocity for open-loop integration.
    Command {
        t: f64,
        linear_x: f64,
        linear_y: f64,
        angular: f64,
    },
}

impl Record {
    pub fn time(&self) -> f64 {
        match self {
            Record::Init { t } | Record::Wheels { t, .. } | Record::Command { t, .. } => *t,
        }
    }
}

/// Parse one log line.  Returns `Ok(None)` for blank and comment lines.
pub fn parse_line(line: &str, line_no: usize) -> Result<Option<Record>, OdomError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|e| OdomError::Log {
            line: line_no,
            reason: e.to_string(),
        })
}

/// Outcome of a full replay.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Wheel and command records processed.
    pub records: usize,
    /// Records that advanced the pose.
    pub accepted: usize,
    /// Records rejected for non-positive elapsed time.
    pub skipped: usize,
    pub pose: Pose2D,
    /// Smoothed body velocity after the last record.
    pub velocity: BodyVelocity,
}

/// Feeds [`Record`]s into one [`Odometry`] in log order.
#[derive(Debug)]
pub struct Replayer {
    odom: Odometry,
    initialised: bool,
    records: usize,
    accepted: usize,
    skipped: usize,
}

impl Replayer {
    pub fn new(odom: Odometry) -> Self {
        Self {
            odom,
            initialised: false,
            records: 0,
            accepted: 0,
            skipped: 0,
        }
    }

    /// Apply one record and return the resulting odometry readings.
    ///
    /// # Errors
    ///
    /// Returns [`OdomError::InvalidTimestamp`] if the record's time is
    /// negative or not finite.  The estimator is left untouched in that case.
    pub fn apply(&mut self, record: &Record) -> Result<OdometrySnapshot, OdomError> {
        let time = timestamp_from_secs(record.time())?;

        if !self.initialised {
            self.odom.init(time);
            self.initialised = true;
        }

        let updated = match *record {
            Record::Init { .. } => {
                self.odom.init(time);
                return Ok(self.snapshot(record.time(), true));
            }
            Record::Wheels { w0, w1, w2, w3, .. } => {
                self.odom.update(WheelVelocities::new(w0, w1, w2, w3), time)
            }
            Record::Command {
                linear_x,
                linear_y,
                angular,
                ..
            } => self
                .odom
                .update_open_loop(BodyVelocity::new(linear_x, linear_y, angular), time),
        };

        self.records += 1;
        if updated {
            self.accepted += 1;
        } else {
            self.skipped += 1;
            debug!(t = record.time(), "record skipped");
        }
        Ok(self.snapshot(record.time(), updated))
    }

    /// Replay every record from `reader`, calling `on_snapshot` after each.
    ///
    /// # Errors
    ///
    /// Stops at the first unreadable or malformed line and reports its
    /// 1-based line number.
    pub fn run<R: BufRead>(
        &mut self,
        reader: R,
        mut on_snapshot: impl FnMut(&OdometrySnapshot),
    ) -> Result<Summary, OdomError> {
        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.map_err(|e| OdomError::Log {
                line: line_no,
                reason: e.to_string(),
            })?;
            let Some(record) = parse_line(&line, line_no)? else {
                continue;
            };
            let snapshot = self.apply(&record).map_err(|e| OdomError::Log {
                line: line_no,
                reason: e.to_string(),
            })?;
            on_snapshot(&snapshot);
        }

        let summary = self.summary();
        info!(
            records = summary.records,
            accepted = summary.accepted,
            skipped = summary.skipped,
            "replay finished"
        );
        Ok(summary)
    }

    pub fn summary(&self) -> Summary {
        Summary {
            records: self.records,
            accepted: self.accepted,
            skipped: self.skipped,
            pose: self.odom.pose(),
            velocity: self.odom.velocity(),
        }
    }

    fn snapshot(&self, t: f64, updated: bool) -> OdometrySnapshot {
        let pose = self.odom.pose();
        let velocity = self.odom.velocity();
        OdometrySnapshot {
            t,
            updated,
            x: pose.x,
            y: pose.y,
            heading: pose.heading,
            linear_x: velocity.linear_x,
            linear_y: velocity.linear_y,
            angular: velocity.angular,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mecanum_types::{Geometry, SignConvention};
    use std::io::Cursor;

    const EPS: f64 = 1e-9;

    fn replayer() -> Replayer {
        let odom = Odometry::try_new(Geometry::new(1.0, 0.5, 0.1), SignConvention::Normal, 2)
            .expect("valid configuration");
        Replayer::new(odom)
    }

    #[test]
    fn parse_line_skips_blanks_and_comments() {
        assert_eq!(parse_line("", 1).unwrap(), None);
        assert_eq!(parse_line("   # recorded on the test rig", 2).unwrap(), None);
        assert_eq!(
            parse_line(r#"{"kind":"init","t":1.5}"#, 3).unwrap(),
            Some(Record::Init { t: 1.5 })
        );
    }

    #[test]
    fn parse_line_reports_line_number() {
        let err = parse_line(r#"{"kind":"wheels","t":0.1}"#, 42).unwrap_err();
        match err {
            OdomError::Log { line, reason } => {
                assert_eq!(line, 42);
                assert!(reason.contains("w0"), "unexpected reason: {reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn replays_mixed_log() {
        let log = "\
# straight, then strafe open loop
{\"kind\":\"init\",\"t\":0.0}
{\"kind\":\"wheels\",\"t\":0.5,\"w0\":10,\"w1\":10,\"w2\":10,\"w3\":10}
{\"kind\":\"wheels\",\"t\":0.5,\"w0\":99,\"w1\":99,\"w2\":99,\"w3\":99}

{\"kind\":\"command\",\"t\":1.0,\"linear_x\":0.0,\"linear_y\":2.0,\"angular\":0.0}
";
        let mut snapshots = Vec::new();
        let summary = replayer()
            .run(Cursor::new(log), |s| snapshots.push(*s))
            .expect("replay ok");

        assert_eq!(summary.records, 3);
        assert_eq!(summary.accepted, 2);
        assert_eq!(summary.skipped, 1);
        assert!((summary.pose.x - 0.5).abs() < EPS);
        assert!((summary.pose.y - 1.0).abs() < EPS);

        assert_eq!(snapshots.len(), 4);
        assert!(!snapshots[2].updated);
        assert!((snapshots[3].linear_y - 1.0).abs() < EPS, "window of two: (0 + 2) / 2");
    }

    #[test]
    fn log_without_init_starts_at_first_record() {
        let mut replayer = replayer();
        let first = replayer
            .apply(&Record::Wheels {
                t: 10.0,
                w0: 10.0,
                w1: 10.0,
                w2: 10.0,
                w3: 10.0,
            })
            .unwrap();
        assert!(!first.updated);

        let second = replayer
            .apply(&Record::Wheels {
                t: 11.0,
                w0: 10.0,
                w1: 10.0,
                w2: 10.0,
                w3: 10.0,
            })
            .unwrap();
        assert!(second.updated);
        assert!((second.x - 1.0).abs() < EPS);
    }

    #[test]
    fn demo_log_ends_at_expected_pose() {
        let log = include_str!("../../../demos/square.jsonl");
        let summary = replayer().run(Cursor::new(log), |_| {}).expect("replay ok");

        assert_eq!(summary.records, 150);
        assert_eq!(summary.skipped, 0);
        assert!((summary.pose.x - 1.0).abs() < 1e-6);
        assert!((summary.pose.y - 1.0).abs() < 1e-6);
        assert!((summary.pose.heading - std::f64::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn negative_time_is_rejected_with_line_number() {
        let log = "{\"kind\":\"init\",\"t\":0.0}\n{\"kind\":\"init\",\"t\":-1.0}\n";
        let err = replayer().run(Cursor::new(log), |_| {}).unwrap_err();
        assert!(matches!(err, OdomError::Log { line: 2, .. }));
    }
}
