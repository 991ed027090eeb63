//! Configuration vault – reads/writes `~/.rectrace/config.toml`.

use rectrace_controller::TraceParams;
use rectrace_types::TraceError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Persisted configuration for the rectrace stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Control-loop tick frequency.  The reference node runs very fast to
    /// maximise pose-tracking precision; correctness does not depend on the
    /// exact value.
    #[serde(default = "default_tick_rate_hz")]
    pub tick_rate_hz: u32,

    /// Warn when the pose feed is silent longer than this.
    #[serde(default = "default_pose_deadline_ms")]
    pub pose_deadline_ms: u64,

    /// Run the built-in kinematic simulator as the pose source.  Disable
    /// when an external transport bridges the bus to a real agent.
    #[serde(default = "default_sim_enabled")]
    pub sim_enabled: bool,

    /// Simulator integration rate.
    #[serde(default = "default_sim_rate_hz")]
    pub sim_rate_hz: u32,

    /// Per-topic event bus buffer depth.
    #[serde(default = "default_bus_capacity")]
    pub bus_capacity: usize,

    /// Controller velocities, thresholds, and tolerance bands.
    #[serde(default)]
    pub params: TraceParams,
}

fn default_tick_rate_hz() -> u32 {
    1_000
}
fn default_pose_deadline_ms() -> u64 {
    500
}
fn default_sim_enabled() -> bool {
    true
}
fn default_sim_rate_hz() -> u32 {
    200
}
fn default_bus_capacity() -> usize {
    256
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_rate_hz: default_tick_rate_hz(),
            pose_deadline_ms: default_pose_deadline_ms(),
            sim_enabled: default_sim_enabled(),
            sim_rate_hz: default_sim_rate_hz(),
            bus_capacity: default_bus_capacity(),
            params: TraceParams::default(),
        }
    }
}

/// Return the path to `~/.rectrace/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
/// Extracted for testability without mutating environment variables.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".rectrace").join("config.toml")
}

/// Load the config from disk, then apply `RECTRACE_*` environment overrides.
/// Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, TraceError> {
    let mut cfg = load_from(&config_path())?;
    if let Some(cfg) = cfg.as_mut() {
        apply_env_overrides(cfg);
    }
    Ok(cfg)
}

/// Load the config from a specific path.  File contents only; environment
/// overrides are the caller's concern.
pub(crate) fn load_from(path: &PathBuf) -> Result<Option<Config>, TraceError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        TraceError::Config(format!("failed to read config at {}: {e}", path.display()))
    })?;
    let cfg: Config = toml::from_str(&raw)
        .map_err(|e| TraceError::Config(format!("failed to parse config: {e}")))?;
    Ok(Some(cfg))
}

/// Apply `RECTRACE_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `RECTRACE_TICK_RATE_HZ` | `tick_rate_hz` |
/// | `RECTRACE_POSE_DEADLINE_MS` | `pose_deadline_ms` |
/// | `RECTRACE_SIM` (`on`/`off`) | `sim_enabled` |
/// | `RECTRACE_SIM_RATE_HZ` | `sim_rate_hz` |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("RECTRACE_TICK_RATE_HZ")
        && let Ok(rate) = v.parse::<u32>()
    {
        cfg.tick_rate_hz = rate;
    }
    if let Ok(v) = std::env::var("RECTRACE_POSE_DEADLINE_MS")
        && let Ok(ms) = v.parse::<u64>()
    {
        cfg.pose_deadline_ms = ms;
    }
    if let Ok(v) = std::env::var("RECTRACE_SIM") {
        match v.as_str() {
            "on" => cfg.sim_enabled = true,
            "off" => cfg.sim_enabled = false,
            _ => {}
        }
    }
    if let Ok(v) = std::env::var("RECTRACE_SIM_RATE_HZ")
        && let Ok(rate) = v.parse::<u32>()
    {
        cfg.sim_rate_hz = rate;
    }
}

/// Save the config to disk, creating `~/.rectrace/` if necessary.
pub fn save(cfg: &Config) -> Result<(), TraceError> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &PathBuf) -> Result<(), TraceError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| TraceError::Config(format!("failed to create config directory: {e}")))?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| TraceError::Config(format!("failed to serialize config: {e}")))?;
    fs::write(path, raw).map_err(|e| {
        TraceError::Config(format!("failed to write config at {}: {e}", path.display()))
    })
}
