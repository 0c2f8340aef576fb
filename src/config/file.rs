//! Configuration file management
//!
//! Handles finding, loading, and validating configuration files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::profile::ScenarioProfile;
use super::RunConfig;

/// Configuration file locations (in order of precedence)
const CONFIG_LOCATIONS: &[&str] = &[
    "./saleor-e2e.yaml",
    "./saleor-e2e.yml",
    "./.saleor-e2e.yaml",
    "~/.config/saleor-e2e/config.yaml",
];

/// Full configuration file structure
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Version of config file format
    #[serde(default = "default_version")]
    pub version: String,

    /// Run settings
    #[serde(default)]
    pub run: RunConfig,

    /// Scenario profiles
    #[serde(default)]
    pub profiles: Vec<ScenarioProfile>,

    /// Named target environments
    #[serde(default)]
    pub environments: Vec<EnvironmentConfig>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            version: default_version(),
            run: RunConfig::default(),
            profiles: Vec::new(),
            environments: Vec::new(),
        }
    }
}

impl ConfigFile {
    /// Find configuration file in standard locations
    pub fn find() -> Option<PathBuf> {
        CONFIG_LOCATIONS
            .iter()
            .map(|location| expand_path(location))
            .find(|path| path.exists())
    }

    /// Load configuration from default location
    pub fn load_default() -> Result<Self> {
        if let Some(path) = Self::find() {
            tracing::debug!("Using config file {}", path.display());
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !["1.0"].contains(&self.version.as_str()) {
            anyhow::bail!("Unsupported config version: {}", self.version);
        }

        self.run.validate()?;

        for profile in &self.profiles {
            profile.validate()?;
        }

        for env in &self.environments {
            reqwest::Url::parse(&env.base_url).with_context(|| {
                format!("Invalid base_url in environment '{}'", env.name)
            })?;
        }

        Ok(())
    }

    /// Generate example configuration
    pub fn example() -> Self {
        Self {
            version: default_version(),
            run: RunConfig::default(),
            profiles: ScenarioProfile::builtin(),
            environments: vec![
                EnvironmentConfig::new("local", "http://localhost:9000")
                    .with_api_url("http://localhost:8000/graphql/"),
                EnvironmentConfig::new("staging", "https://dashboard.staging.example.com")
                    .with_api_url("https://api.staging.example.com/graphql/")
                    .with_webdriver_url("http://selenium.staging.example.com:4444"),
            ],
        }
    }

    /// Get environment by name
    pub fn environment(&self, name: &str) -> Option<&EnvironmentConfig> {
        self.environments.iter().find(|e| e.name == name)
    }

    /// Get scenario profile by name, falling back to the built-in ones
    pub fn profile(&self, name: &str) -> Option<ScenarioProfile> {
        self.profiles
            .iter()
            .find(|p| p.name == name)
            .cloned()
            .or_else(|| ScenarioProfile::builtin().into_iter().find(|p| p.name == name))
    }
}

/// A named deployment to run against
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Environment name (e.g., "local", "staging")
    pub name: String,
    /// Dashboard origin
    pub base_url: String,
    /// GraphQL endpoint
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub webdriver_url: Option<String>,
}

impl EnvironmentConfig {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            api_url: None,
            webdriver_url: None,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    pub fn with_webdriver_url(mut self, webdriver_url: impl Into<String>) -> Self {
        self.webdriver_url = Some(webdriver_url.into());
        self
    }
}

/// Expand ~ to home directory
fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Check if file is YAML based on extension
fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_file_default() {
        let config = ConfigFile::default();
        assert_eq!(config.version, "1.0");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_file_save_load_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("saleor-e2e.yaml");

        let config = ConfigFile::example();
        config.save(&path).unwrap();

        let loaded = ConfigFile::load(&path).unwrap();
        assert_eq!(loaded.version, config.version);
        assert_eq!(loaded.run.base_url, config.run.base_url);
        assert_eq!(loaded.environments, config.environments);
        assert_eq!(loaded.profiles.len(), 3);
    }

    #[test]
    fn test_config_file_save_load_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = ConfigFile::default();
        config.run.retries.run_mode = 4;
        config.save(&path).unwrap();

        let loaded = ConfigFile::load(&path).unwrap();
        assert_eq!(loaded.run.retries.run_mode, 4);
    }

    #[test]
    fn test_saved_file_has_no_record_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let mut config = ConfigFile::default();
        config.run.record_key = Some("do-not-write".to_string());
        config.save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("do-not-write"));
    }

    #[test]
    fn test_validate_config() {
        let mut config = ConfigFile::default();
        config.profiles.push(ScenarioProfile::new("invalid").scenario(99));
        assert!(config.validate().is_err());

        let mut config = ConfigFile::default();
        config.version = "9.9".to_string();
        assert!(config.validate().is_err());

        let mut config = ConfigFile::default();
        config
            .environments
            .push(EnvironmentConfig::new("broken", "not a url"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_profile_lookup_falls_back_to_builtin() {
        let mut config = ConfigFile::default();
        assert_eq!(config.profile("smoke").map(|p| p.scenarios.len()), Some(3));

        config
            .profiles
            .push(ScenarioProfile::new("smoke").scenario(14));
        assert_eq!(config.profile("smoke").map(|p| p.scenarios), Some(vec![14]));
        assert!(config.profile("missing").is_none());
    }

    #[test]
    fn test_expand_path() {
        assert_eq!(expand_path("./saleor-e2e.yaml"), PathBuf::from("./saleor-e2e.yaml"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                expand_path("~/.config/saleor-e2e/config.yaml"),
                home.join(".config/saleor-e2e/config.yaml")
            );
        }
    }
}
