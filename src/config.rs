//! Configuration for govrun.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (GOVRUN_HOME, GOVRUN_BACKEND_URL, GOVRUN_API_KEY)
//! 2. Config file (.govrun/config.yaml)
//! 3. Defaults (~/.govrun)
//!
//! Config file discovery:
//! - Searches current directory and parents for .govrun/config.yaml
//! - Paths in config file are relative to the config file's parent directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::activity::DEFAULT_ACTIVITY_CAPACITY;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub backend: Option<BackendConfig>,
    #[serde(default)]
    pub demo: Option<DemoConfig>,
    #[serde(default)]
    pub activity: Option<ActivityConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// State directory (relative to .govrun/)
    pub home: Option<String>,
    /// Scorecard export directory (relative to project root)
    pub exports: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DemoConfig {
    pub stage_delay_ms: Option<u64>,
    pub navigation_settle_ms: Option<u64>,
    pub traffic_batch_size: Option<u32>,
    pub pass_threshold: Option<f64>,
    pub attack_types: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivityConfig {
    pub capacity: Option<usize>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to govrun home
    pub home: PathBuf,
    /// Where scorecards are exported
    pub exports: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    pub backend: BackendSettings,
    pub demo: DemoSettings,
    /// Activity feed ring buffer size
    pub activity_capacity: usize,
}

#[derive(Debug, Clone)]
pub struct BackendSettings {
    /// Project base URL; `None` means only `--simulate` runs are possible
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            timeout_seconds: 60,
        }
    }
}

impl BackendSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Pacing and thresholds of a demo run
#[derive(Debug, Clone, PartialEq)]
pub struct DemoSettings {
    /// Pause between stages
    pub stage_delay: Duration,
    /// Pause after a tour-mode navigation before the stage's remote call
    pub navigation_settle: Duration,
    /// Synthetic requests sent by the traffic stage
    pub traffic_batch_size: u32,
    /// Evaluation scores at or above this are a pass
    pub pass_threshold: f64,
    /// Attack families requested from the red-team campaign
    pub attack_types: Vec<String>,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            stage_delay: Duration::from_millis(800),
            navigation_settle: Duration::from_millis(1500),
            traffic_batch_size: 20,
            pass_threshold: 70.0,
            attack_types: vec![
                "prompt_injection".to_string(),
                "jailbreak".to_string(),
                "data_exfiltration".to_string(),
            ],
        }
    }
}

impl DemoSettings {
    /// No artificial pacing
    pub fn without_delays(mut self) -> Self {
        self.stage_delay = Duration::ZERO;
        self.navigation_settle = Duration::ZERO;
        self
    }

    fn apply(&mut self, config: &DemoConfig) {
        if let Some(ms) = config.stage_delay_ms {
            self.stage_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = config.navigation_settle_ms {
            self.navigation_settle = Duration::from_millis(ms);
        }
        if let Some(size) = config.traffic_batch_size {
            self.traffic_batch_size = size;
        }
        if let Some(threshold) = config.pass_threshold {
            self.pass_threshold = threshold;
        }
        if let Some(ref attack_types) = config.attack_types {
            self.attack_types = attack_types.clone();
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".govrun").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Combine an optional config file with environment overrides
fn resolve(
    config_file: Option<PathBuf>,
    config: Option<ConfigFile>,
    default_home: PathBuf,
) -> ResolvedConfig {
    let mut backend = BackendSettings::default();
    let mut demo = DemoSettings::default();
    let mut activity_capacity = DEFAULT_ACTIVITY_CAPACITY;
    let mut home = default_home;
    let mut exports = None;

    if let (Some(config_path), Some(config)) = (config_file.as_deref(), config.as_ref()) {
        // .govrun/ directory and the project root above it
        let govrun_dir = config_path.parent().unwrap_or(Path::new("."));
        let base_dir = govrun_dir.parent().unwrap_or(Path::new("."));

        if let Some(ref home_path) = config.paths.home {
            home = resolve_path(govrun_dir, home_path);
        }
        if let Some(ref exports_path) = config.paths.exports {
            exports = Some(resolve_path(base_dir, exports_path));
        }
        if let Some(ref section) = config.backend {
            backend.url = section.url.clone();
            backend.api_key = section.api_key.clone();
            if let Some(timeout) = section.timeout_seconds {
                backend.timeout_seconds = timeout;
            }
        }
        if let Some(ref section) = config.demo {
            demo.apply(section);
        }
        if let Some(capacity) = config.activity.as_ref().and_then(|a| a.capacity) {
            activity_capacity = capacity;
        }
    }

    if let Ok(env_home) = std::env::var("GOVRUN_HOME") {
        home = PathBuf::from(env_home);
    }
    if let Ok(url) = std::env::var("GOVRUN_BACKEND_URL") {
        backend.url = Some(url);
    }
    if let Ok(key) = std::env::var("GOVRUN_API_KEY") {
        backend.api_key = Some(key);
    }

    let exports = exports.unwrap_or_else(|| home.join("exports"));

    ResolvedConfig {
        home,
        exports,
        config_file,
        backend,
        demo,
        activity_capacity,
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".govrun");

    let config_file = find_config_file();
    let config = match config_file {
        Some(ref path) => Some(load_config_file(path)?),
        None => None,
    };

    Ok(resolve(config_file, config, default_home))
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}
