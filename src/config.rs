//! Configuration management
//!
//! This module handles loading configuration from TOML files.
//! Every section is optional; missing keys fall back to the defaults a
//! Keenetic router with kvas installed under /opt expects.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Listener and static file settings
    #[serde(default)]
    pub server: ServerConfig,

    /// External command settings
    #[serde(default)]
    pub command: CommandConfig,

    /// Host metrics settings
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Address of the JSON API listener
    #[serde(default = "default_api_addr")]
    pub api_addr: SocketAddr,

    /// Address of the SPA static file listener
    #[serde(default = "default_static_addr")]
    pub static_addr: SocketAddr,

    /// Directory holding the built web UI
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// File served for any path that does not exist in `static_dir`
    #[serde(default = "default_index_file")]
    pub index_file: String,

    #[serde(default = "default_true")]
    pub serve_static: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_addr: default_api_addr(),
            static_addr: default_static_addr(),
            static_dir: default_static_dir(),
            index_file: default_index_file(),
            serve_static: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CommandConfig {
    /// Shell used to run commands (`<shell> -c <command>`)
    #[serde(default = "default_shell")]
    pub shell: String,

    /// Name or path of the kvas executable
    #[serde(default = "default_binary")]
    pub binary: String,

    /// Upper bound on a single command run, in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            shell: default_shell(),
            binary: default_binary(),
            timeout_secs: default_timeout(),
        }
    }
}

impl CommandConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build a kvas invocation such as `kvas tunnel` or `kvas add example.com`
    pub fn kvas(&self, args: &str) -> String {
        format!("{} {}", self.binary, args)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetricsConfig {
    /// Root of the procfs mount
    #[serde(default = "default_proc_root")]
    pub proc_root: PathBuf,

    /// Gap between the two /proc/stat reads, in milliseconds
    #[serde(default = "default_cpu_sample_ms")]
    pub cpu_sample_ms: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            proc_root: default_proc_root(),
            cpu_sample_ms: default_cpu_sample_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Optional log file path
    #[serde(default)]
    pub log_file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_file: String::new(),
        }
    }
}

// Default value functions
fn default_api_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 5000))
}

fn default_static_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("/opt/etc/kvas-wui/build")
}

fn default_index_file() -> String {
    "index.html".to_string()
}

fn default_true() -> bool {
    true
}

fn default_shell() -> String {
    "sh".to_string()
}

fn default_binary() -> String {
    "kvas".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_proc_root() -> PathBuf {
    PathBuf::from("/proc")
}

fn default_cpu_sample_ms() -> u64 {
    200
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from an explicit path, or search the usual
    /// locations and use defaults if nothing is found
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let config_paths = vec![
            PathBuf::from("kvas-wui.toml"),
            PathBuf::from("/opt/etc/kvas-wui/config.toml"),
            dirs::home_dir()
                .map(|h| h.join(".config/kvas-wui/config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.is_file() {
                return Self::from_file(path);
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn from_file(path: &Path) -> Result<Self> {
        tracing::debug!("Loading config from: {}", path.display());
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.server.api_addr.port(), 5000);
        assert_eq!(cfg.server.static_addr.port(), 3000);
        assert_eq!(cfg.command.binary, "kvas");
        assert_eq!(cfg.command.timeout(), Duration::from_secs(30));
        assert_eq!(cfg.metrics.proc_root, PathBuf::from("/proc"));
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.server.serve_static);
    }

    #[test]
    fn test_partial_sections() {
        let cfg: Config = toml::from_str(
            r#"
            [server]
            api_addr = "127.0.0.1:8080"
            serve_static = false

            [command]
            binary = "/opt/bin/kvas"
            timeout_secs = 5

            [logging]
            level = "debug"
            log_file = "/tmp/kvas-wui.log"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.server.api_addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert!(!cfg.server.serve_static);
        assert_eq!(cfg.server.index_file, "index.html");
        assert_eq!(cfg.command.kvas("tunnel"), "/opt/bin/kvas tunnel");
        assert_eq!(cfg.command.shell, "sh");
        assert_eq!(cfg.command.timeout_secs, 5);
        assert_eq!(cfg.logging.log_file, "/tmp/kvas-wui.log");
        assert_eq!(cfg.metrics.cpu_sample_ms, 200);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/kvas-wui.toml"))).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read config file"));
    }
}
