//! Project and host-level configuration.
//!
//! Registration parameters arrive as a [`ProjectParams`] struct with a
//! documented default per field and are finalized into an immutable
//! [`Project`] record when stored in the registry.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::mail::is_valid_email;

const CONFIG_DIR: &str = ".errmail";
const CONFIG_FILE: &str = "config.toml";

/// Raised when a category name is not part of the fixed set.
#[derive(Error, Debug)]
#[error("Unknown category: {0}")]
pub struct UnknownCategory(pub String);

/// Display grouping for registered projects.
///
/// The set is fixed at compile time; raw names outside the set normalize
/// to [`Category::Main`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Main,
    Plugin,
    Theme,
}

impl Category {
    /// The full category set, in display order.
    pub const ALL: [Category; 3] = [Category::Main, Category::Plugin, Category::Theme];

    /// Human-readable label for admin surfaces.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Main => "Main",
            Category::Plugin => "Plugins",
            Category::Theme => "Themes",
        }
    }

    /// Map a raw category name onto the fixed set.
    ///
    /// Unknown names fall back to `Main` rather than failing registration.
    pub fn normalize(raw: &str) -> Category {
        raw.parse().unwrap_or(Category::Main)
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Main
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main" => Ok(Category::Main),
            "plugin" => Ok(Category::Plugin),
            "theme" => Ok(Category::Theme),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Main => write!(f, "main"),
            Category::Plugin => write!(f, "plugin"),
            Category::Theme => write!(f, "theme"),
        }
    }
}

/// Parameters accepted by [`crate::Reporting::register`].
///
/// Every field has a default, so callers only fill in what they need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectParams {
    /// Recipient address. May be base64-encoded to keep the plain address
    /// out of source; anything without an `@` is decoded before validation.
    #[serde(default)]
    pub to: Option<String>,

    /// Display label (defaults to the project name)
    #[serde(default)]
    pub label: Option<String>,

    /// Free-form description shown in admin surfaces
    #[serde(default)]
    pub description: Option<String>,

    /// Subject-line prefix (defaults to the project name)
    #[serde(default)]
    pub prefix: Option<String>,

    /// Only report errors whose file path contains this fragment
    #[serde(default)]
    pub only_in_dir: Option<String>,

    /// Enabled state suggested to the settings store for fresh installs
    #[serde(default)]
    pub default_enabled: bool,

    /// Raw category name; unknown values normalize to "main"
    #[serde(default = "default_category")]
    pub category: String,

    /// Append the stack payload to diagnostic log lines
    #[serde(default)]
    pub trace_in_logs: bool,
}

impl Default for ProjectParams {
    fn default() -> Self {
        Self {
            to: None,
            label: None,
            description: None,
            prefix: None,
            only_in_dir: None,
            default_enabled: false,
            category: default_category(),
            trace_in_logs: false,
        }
    }
}

fn default_category() -> String {
    "main".to_string()
}

/// A registered error-reporting channel.
///
/// Built by the registry from [`ProjectParams`]; immutable once stored.
/// Re-registering the same name replaces the whole record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Unique registry key
    pub name: String,
    /// Display label
    pub label: String,
    /// Free-form description
    pub description: Option<String>,
    /// Resolved recipient: a syntactically valid address or the admin fallback
    pub to: String,
    /// Subject-line prefix
    pub prefix: String,
    /// Normalized category
    pub category: Category,
    /// Path fragment filter for incoming reports
    pub only_in_dir: Option<String>,
    /// Enabled state suggested for fresh installs
    pub default_enabled: bool,
    /// Append the stack payload to diagnostic log lines
    pub trace_in_logs: bool,
    /// Resolved from the settings store at registration time
    pub enabled: bool,
}

/// Resolve a raw recipient into a deliverable address.
///
/// A value without an `@` is treated as base64-encoded and decoded first.
/// Whatever comes out must pass syntactic validation, otherwise the site
/// administrator address is substituted. This never fails.
pub fn resolve_recipient(raw: Option<&str>, admin_email: &str) -> String {
    let candidate = match raw {
        Some(value) if !value.contains('@') => BASE64
            .decode(value.trim())
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok()),
        Some(value) => Some(value.to_string()),
        None => None,
    };

    match candidate {
        Some(address) if is_valid_email(&address) => address,
        _ => admin_email.to_string(),
    }
}

/// Host-level reporting configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportingConfig {
    /// Write a one-line diagnostic entry for every dispatched report.
    /// Fires even for disabled projects.
    #[serde(default)]
    pub debug_log: bool,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ReportingConfig {
    /// Load configuration from the `.errmail` directory under `root`,
    /// falling back to defaults when no file exists.
    pub fn load(root: &Path) -> Result<Self> {
        let config_path = root.join(CONFIG_DIR).join(CONFIG_FILE);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {:?}", config_path))?;

            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config from {:?}", config_path))
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the `.errmail` directory under `root`.
    pub fn save(&self, root: &Path) -> Result<()> {
        let config_dir = root.join(CONFIG_DIR);
        let config_path = config_dir.join(CONFIG_FILE);

        std::fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config directory {:?}", config_dir))?;

        let content =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config to {:?}", config_path))?;

        Ok(())
    }
}

/// Diagnostic logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write log events to rolling files
    #[serde(default)]
    pub enabled: bool,

    /// Mirror log events to stderr
    #[serde(default = "default_stderr")]
    pub stderr: bool,

    /// Minimum level for the file log: trace, debug, info, warn or error
    #[serde(default = "default_level")]
    pub level: String,

    /// Log directory; relative paths resolve against the host root
    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,

    /// Log file name prefix
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Rotation strategy: hourly, daily, minutely or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            stderr: default_stderr(),
            level: default_level(),
            directory: default_log_directory(),
            file_prefix: default_file_prefix(),
            rotation: default_rotation(),
        }
    }
}

fn default_stderr() -> bool {
    true
}

fn default_level() -> String {
    "debug".to_string()
}

fn default_log_directory() -> PathBuf {
    PathBuf::from(".errmail/logs")
}

fn default_file_prefix() -> String {
    "errmail.log".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}
