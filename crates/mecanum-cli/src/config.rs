//! Vehicle configuration – reads/writes `~/.mecanum/odometry.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use mecanum_odometry::{DEFAULT_VELOCITY_ROLLING_WINDOW_SIZE, Odometry};
use mecanum_types::{Geometry, OdomError, SignConvention};

/// Chassis description loaded from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Half-extent `a` of the wheel contact rectangle (m).
    #[serde(default = "default_wheels_a")]
    pub wheels_a: f64,

    /// Half-extent `b` of the wheel contact rectangle (m).
    #[serde(default = "default_wheels_b")]
    pub wheels_b: f64,

    /// Wheel radius (m).
    #[serde(default = "default_wheel_radius")]
    pub wheel_radius: f64,

    /// Roller layout: `"normal"` or `"flipped"`.
    #[serde(default)]
    pub sign_convention: SignConvention,

    /// Samples averaged by the reported velocity.
    #[serde(default = "default_window_size")]
    pub velocity_rolling_window_size: usize,
}

fn default_wheels_a() -> f64 {
    Geometry::default().wheels_a
}
fn default_wheels_b() -> f64 {
    Geometry::default().wheels_b
}
fn default_wheel_radius() -> f64 {
    Geometry::default().wheel_radius
}
fn default_window_size() -> usize {
    DEFAULT_VELOCITY_ROLLING_WINDOW_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wheels_a: default_wheels_a(),
            wheels_b: default_wheels_b(),
            wheel_radius: default_wheel_radius(),
            sign_convention: SignConvention::default(),
            velocity_rolling_window_size: default_window_size(),
        }
    }
}

impl Config {
    pub fn geometry(&self) -> Geometry {
        Geometry::new(self.wheels_a, self.wheels_b, self.wheel_radius)
    }

    /// Build an [`Odometry`] for this vehicle, validating the geometry and
    /// window size first.
    pub fn build_odometry(&self) -> Result<Odometry, OdomError> {
        Odometry::try_new(
            self.geometry(),
            self.sign_convention,
            self.velocity_rolling_window_size,
        )
    }
}

/// Return the path to `~/.mecanum/odometry.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".mecanum").join("odometry.toml")
}

/// Load the config from `path` (or the default path), falling back to
/// defaults when the file does not exist.  Environment overrides are applied
/// in both cases.
pub fn load(path: Option<&Path>) -> Result<Config, OdomError> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config_path);
    let mut cfg = load_from(&path)?.unwrap_or_default();
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Load the config from a specific path.  Returns `None` if the file does not
/// exist.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, OdomError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        OdomError::Config(format!("failed to read {}: {}", path.display(), e))
    })?;
    let cfg: Config = toml::from_str(&raw)
        .map_err(|e| OdomError::Config(format!("failed to parse {}: {}", path.display(), e)))?;
    Ok(Some(cfg))
}

/// Apply `MECANUM_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `MECANUM_WHEELS_A` | `wheels_a` |
/// | `MECANUM_WHEELS_B` | `wheels_b` |
/// | `MECANUM_WHEEL_RADIUS` | `wheel_radius` |
/// | `MECANUM_SIGN_CONVENTION` | `sign_convention` |
/// | `MECANUM_WINDOW_SIZE` | `velocity_rolling_window_size` |
///
/// Values that fail to parse are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    apply_overrides(cfg, |key: &str| std::env::var(key).ok());
}

/// Apply overrides from an arbitrary key lookup.
pub(crate) fn apply_overrides(cfg: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("MECANUM_WHEELS_A")
        && let Ok(a) = v.trim().parse() {
            cfg.wheels_a = a;
        }
    if let Some(v) = lookup("MECANUM_WHEELS_B")
        && let Ok(b) = v.trim().parse() {
            cfg.wheels_b = b;
        }
    if let Some(v) = lookup("MECANUM_WHEEL_RADIUS")
        && let Ok(r) = v.trim().parse() {
            cfg.wheel_radius = r;
        }
    if let Some(v) = lookup("MECANUM_SIGN_CONVENTION")
        && let Ok(convention) = v.parse() {
            cfg.sign_convention = convention;
        }
    if let Some(v) = lookup("MECANUM_WINDOW_SIZE")
        && let Ok(n) = v.trim().parse() {
            cfg.velocity_rolling_window_size = n;
        }
}

/// Save the config to `path`, creating the parent directory if necessary.
pub fn save_to(cfg: &Config, path: &Path) -> Result<(), OdomError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            OdomError::Config(format!("failed to create {}: {}", parent.display(), e))
        })?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| OdomError::Config(format!("failed to serialize config: {}", e)))?;
    fs::write(path, raw).map_err(|e| {
        OdomError::Config(format!("failed to write {}: {}", path.display(), e))
    })?;
    Ok(())
}
