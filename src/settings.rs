//! Host collaborator seams: per-project settings and site-wide options.
//!
//! Backing storage is the host's concern. The in-memory implementations here
//! cover embedders that have no persistent settings screen, and tests.

use std::collections::HashMap;

/// Well-known option name for the site administrator address.
pub const OPT_ADMIN_EMAIL: &str = "admin_email";

/// Well-known option name for the site display name.
pub const OPT_SITE_NAME: &str = "blogname";

/// Per-project enabled flags, usually backed by the host's settings screen.
pub trait SettingsStore {
    /// Whether reporting is enabled for the given project.
    fn get(&self, project_name: &str) -> bool;
}

/// Site-wide options exposed by the host.
pub trait HostOptions {
    fn get(&self, option_name: &str) -> Option<String>;

    /// Administrator address used when a project recipient is missing or invalid.
    fn admin_email(&self) -> String {
        self.get(OPT_ADMIN_EMAIL).unwrap_or_default()
    }

    /// Site display name used in report headings.
    fn site_name(&self) -> String {
        self.get(OPT_SITE_NAME).unwrap_or_default()
    }
}

/// In-memory settings store.
#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    flags: HashMap<String, bool>,
    fallback: bool,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with a fallback answer for projects that have no explicit flag.
    pub fn with_fallback(fallback: bool) -> Self {
        Self {
            flags: HashMap::new(),
            fallback,
        }
    }

    pub fn enable(&mut self, project_name: &str) -> &mut Self {
        self.flags.insert(project_name.to_string(), true);
        self
    }

    pub fn disable(&mut self, project_name: &str) -> &mut Self {
        self.flags.insert(project_name.to_string(), false);
        self
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, project_name: &str) -> bool {
        self.flags.get(project_name).copied().unwrap_or(self.fallback)
    }
}

/// Fixed option map for embedders without a host option store.
#[derive(Debug, Clone, Default)]
pub struct StaticOptions {
    options: HashMap<String, String>,
}

impl StaticOptions {
    pub fn new(admin_email: impl Into<String>, site_name: impl Into<String>) -> Self {
        let mut options = HashMap::new();
        options.insert(OPT_ADMIN_EMAIL.to_string(), admin_email.into());
        options.insert(OPT_SITE_NAME.to_string(), site_name.into());
        Self { options }
    }

    pub fn set(&mut self, option_name: &str, value: impl Into<String>) -> &mut Self {
        self.options.insert(option_name.to_string(), value.into());
        self
    }
}

impl HostOptions for StaticOptions {
    fn get(&self, option_name: &str) -> Option<String> {
        self.options.get(option_name).cloned()
    }
}
