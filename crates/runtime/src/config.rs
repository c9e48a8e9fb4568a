//! Runtime configuration structures and loaders.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use skill_core::EngineConfig;

/// Configuration shared across the orchestrator and its worker.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub engine: EngineConfig,
    /// Fixed simulation step. Zero disables the clock; time then only moves
    /// through [`RuntimeHandle::advance`](crate::RuntimeHandle::advance).
    pub tick: Duration,
    pub command_buffer_size: usize,
    /// Outbound relay frames buffered before new ones are dropped.
    pub sync_buffer_size: usize,
    /// Attach a sync adapter to the engine. Without it every cast stays local.
    pub sync_enabled: bool,
    /// Also write logs to a file in this directory.
    pub log_dir: Option<PathBuf>,
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            tick: Duration::from_millis(50),
            command_buffer_size: 32,
            sync_buffer_size: 256,
            sync_enabled: true,
            log_dir: None,
            log_filter: "info".to_owned(),
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `SKILL_TICK_MS` - Simulation step in milliseconds, 0 for manual (default: 50)
    /// - `SKILL_COMMAND_BUFFER` - Worker command queue size (default: 32)
    /// - `SKILL_SYNC_BUFFER` - Outbound relay frame queue size (default: 256)
    /// - `SKILL_SYNC_ENABLED` - Replicate casts to peers (default: true)
    /// - `SKILL_LOG_DIR` - Directory for the log file; `default` picks the
    ///   platform cache directory (default: stderr only)
    /// - `SKILL_LOG` - Default log filter directive (default: info)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ms) = read_env::<u64>("SKILL_TICK_MS") {
            config.tick = Duration::from_millis(ms);
        }
        if let Some(capacity) = read_env::<usize>("SKILL_COMMAND_BUFFER") {
            config.command_buffer_size = capacity.max(1);
        }
        if let Some(capacity) = read_env::<usize>("SKILL_SYNC_BUFFER") {
            config.sync_buffer_size = capacity.max(1);
        }
        if let Some(enabled) = read_env_bool("SKILL_SYNC_ENABLED") {
            config.sync_enabled = enabled;
        }
        config.log_dir = match env::var("SKILL_LOG_DIR").ok().as_deref() {
            None | Some("") => None,
            Some("default") => Self::default_log_dir(),
            Some(dir) => Some(PathBuf::from(dir)),
        };
        if let Ok(filter) = env::var("SKILL_LOG") {
            config.log_filter = filter;
        }

        config
    }

    /// Platform cache directory for log files.
    pub fn default_log_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "skill-sim").map(|dirs| dirs.cache_dir().join("logs"))
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn read_env_bool(key: &str) -> Option<bool> {
    match env::var(key).ok()?.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_run_a_clocked_synced_session() {
        let config = RuntimeConfig::default();
        assert_eq!(config.tick, Duration::from_millis(50));
        assert!(config.sync_enabled);
        assert!(config.log_dir.is_none());
        assert_eq!(config.engine, EngineConfig::default());
    }
}
