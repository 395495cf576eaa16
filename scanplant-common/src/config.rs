//! Configuration loading and data directory resolution

use crate::{Error, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "SCANPLANT_DATA_DIR";

/// Environment variable overriding the Plant.id API key
pub const PLANT_ID_API_KEY_ENV: &str = "SCANPLANT_PLANT_ID_API_KEY";

static USER_AGENT: Lazy<String> = Lazy::new(|| {
    format!(
        "ScanPlant/{} ( https://github.com/scanplant/scanplant )",
        env!("CARGO_PKG_VERSION")
    )
});

/// Standard user-agent string for outbound HTTP clients
///
/// Nominatim and Wikipedia both require an identifying user-agent; every
/// client in the workspace uses this one.
pub fn get_user_agent() -> String {
    USER_AGENT.clone()
}

/// TOML configuration file contents
///
/// All fields optional; compiled-in defaults apply when absent. The
/// moderation denylist and knowledge base are injectable here so deployments
/// can localize them without a rebuild.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Data directory holding the SQLite database
    pub data_dir: Option<String>,

    /// HTTP listen port
    pub port: Option<u16>,

    /// Plant.id API key (fallback when the env var is unset)
    pub plant_id_api_key: Option<String>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Moderation denylist override (replaces the compiled-in list)
    pub moderation: Option<ModerationConfig>,

    /// Knowledge base entries (replace the compiled-in entries; order matters
    /// for keyword fallback)
    #[serde(default, rename = "knowledge_base")]
    pub knowledge_base: Vec<KnowledgeBaseEntryConfig>,
}

/// Logging section of the TOML config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Moderation section of the TOML config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationConfig {
    /// Denylisted substrings (matched case-insensitively)
    pub denylist: Vec<String>,
}

/// One curated knowledge-base entry from the TOML config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBaseEntryConfig {
    /// Species or genus token this entry is keyed by (e.g. "Aloe vera")
    pub key: String,
    pub common_name: String,
    pub enhanced_description: String,
    pub care_instructions: String,
}

impl TomlConfig {
    /// Load the TOML config from the standard location, or defaults when no
    /// file exists
    pub fn load() -> Result<Self> {
        match find_config_file() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load the TOML config from an explicit path
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Resolve the Plant.id API key: env var wins over the config file
    pub fn resolve_plant_id_api_key(&self) -> Option<String> {
        std::env::var(PLANT_ID_API_KEY_ENV)
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.plant_id_api_key.clone())
    }
}

/// Data directory resolution, priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable (SCANPLANT_DATA_DIR)
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_data_dir(cli_arg: Option<&str>, toml_config: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(DATA_DIR_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &toml_config.data_dir {
        return PathBuf::from(path);
    }

    // Priority 4: OS-dependent compiled default
    get_default_data_dir()
}

/// Get default configuration file path for the platform
///
/// Linux checks the user config directory first, then the system-wide path.
fn find_config_file() -> Option<PathBuf> {
    if cfg!(target_os = "linux") {
        if let Some(path) = dirs::config_dir().map(|d| d.join("scanplant").join("config.toml")) {
            if path.exists() {
                return Some(path);
            }
        }
        let system_config = PathBuf::from("/etc/scanplant/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
        None
    } else {
        dirs::config_dir()
            .map(|d| d.join("scanplant").join("config.toml"))
            .filter(|p| p.exists())
    }
}

/// Get OS-dependent default data directory path
fn get_default_data_dir() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("scanplant"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/scanplant"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("scanplant"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/scanplant"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("scanplant"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\scanplant"))
    } else {
        PathBuf::from("./scanplant_data")
    }
}

/// Ensure the data directory exists, creating it if missing
pub fn ensure_data_dir(data_dir: &std::path::Path) -> Result<()> {
    std::fs::create_dir_all(data_dir)
        .map_err(|e| Error::Config(format!("Failed to create {}: {}", data_dir.display(), e)))
}

/// Database path inside the data directory
pub fn database_path(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join("scanplant.db")
}
