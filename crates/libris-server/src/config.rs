use libris_core::ReportDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::{net::SocketAddr, time::Duration};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Query result cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Log report generation configuration
    #[serde(default)]
    pub reports: ReportsConfig,
}

// Default derived via field defaults

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        // Server validations
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        if self.server.request_timeout_ms == 0 {
            return Err("server.request_timeout_ms must be > 0".into());
        }
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        // Cache validation
        if self.cache.capacity == 0 {
            return Err("cache.capacity must be > 0".into());
        }
        // Reports validation
        if self.reports.max_concurrent_jobs == 0 {
            return Err("reports.max_concurrent_jobs must be > 0".into());
        }
        if self.reports.source_dir.as_os_str().is_empty() {
            return Err("reports.source_dir must not be empty".into());
        }
        if self.reports.output_dir.as_os_str().is_empty() {
            return Err("reports.output_dir must not be empty".into());
        }
        if self.reports.source_prefix.trim().is_empty() {
            return Err("reports.source_prefix must not be empty".into());
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.server.request_timeout_ms as u64)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u32,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout_ms() -> u32 {
    15_000
}
fn default_body_limit() -> usize {
    1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_ms: default_request_timeout_ms(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum resident entries per entity cache
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

fn default_cache_capacity() -> usize {
    100
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsConfig {
    /// Directory holding the daily application logs
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,
    /// Daily log file name prefix: `<prefix>-<YYYY-MM-DD>.log`
    #[serde(default = "default_source_prefix")]
    pub source_prefix: String,
    /// Directory receiving generated reports
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("logs")
}
fn default_source_prefix() -> String {
    "library".into()
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("logs/generated_reports")
}
fn default_max_concurrent_jobs() -> usize {
    4
}

impl ReportsConfig {
    /// Path of the daily source log for `date`.
    pub fn source_path(&self, date: ReportDate) -> PathBuf {
        self.source_dir.join(self.source_file_name(date))
    }

    pub fn source_file_name(&self, date: ReportDate) -> String {
        format!("{}-{date}.log", self.source_prefix)
    }

    /// Path of the artifact produced by `task_id` for `date`.
    pub fn output_path(&self, task_id: &str, date: ReportDate) -> PathBuf {
        self.output_dir.join(format!("{task_id}_{date}.log"))
    }
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            source_prefix: default_source_prefix(),
            output_dir: default_output_dir(),
            max_concurrent_jobs: default_max_concurrent_jobs(),
        }
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::{Path, PathBuf};

    pub const DEFAULT_CONFIG_FILE: &str = "libris.toml";

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                let pathbuf = PathBuf::from(p);
                if pathbuf.exists() {
                    builder = builder.add_source(File::from(pathbuf));
                }
            }
            None => {
                // Try default root-level file
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        // Environment variable overrides, e.g., LIBRIS__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("LIBRIS")
                .prefix_separator("__")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        // Validate
        merged.validate()?;
        Ok(merged)
    }

    pub fn load_config_with_default_path<P: AsRef<Path>>(
        path: Option<P>,
    ) -> Result<AppConfig, String> {
        let p = path
            .as_ref()
            .map(|p| p.as_ref().to_string_lossy().to_string());
        load_config(p.as_deref())
    }
}
