//! Configuration module
//!
//! Run configuration with defaults, file loading and environment overrides.
//! Resolution order: built-in defaults, config file, named environment,
//! `SALEOR_E2E_*` variables, then command-line flags.

mod env;
mod file;
mod profile;

pub use env::{load_record_key, print_env_help, EnvConfig};
pub use file::{ConfigFile, EnvironmentConfig};
pub use profile::ScenarioProfile;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::browser::BrowserSettings;
use crate::exceptions::ExceptionsConfig;
use crate::session::Credentials;

/// Browser viewport
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Timeouts in seconds
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Element lookups and URL waits
    pub command_secs: u64,
    /// Outgoing HTTP requests
    pub request_secs: u64,
    pub response_secs: u64,
    pub page_load_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            command_secs: 15,
            request_secs: 15,
            response_secs: 15,
            page_load_secs: 30,
        }
    }
}

/// Re-run budget per scenario
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Retries {
    /// Headless runs
    pub run_mode: u32,
    /// Headed, interactive runs
    pub open_mode: u32,
}

impl Default for Retries {
    fn default() -> Self {
        Self {
            run_mode: 2,
            open_mode: 0,
        }
    }
}

/// Artifact capture settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// Carried for compatibility; WebDriver sessions are not recorded
    pub video: bool,
    pub screenshot_on_failure: bool,
    pub screenshots_folder: String,
    pub videos_folder: String,
    pub results_folder: String,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            video: true,
            screenshot_on_failure: true,
            screenshots_folder: "artifacts/screenshots".to_string(),
            videos_folder: "artifacts/videos".to_string(),
            results_folder: "artifacts/results".to_string(),
        }
    }
}

/// Run configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Dashboard origin
    pub base_url: String,
    /// GraphQL endpoint
    pub api_url: String,
    pub webdriver_url: String,
    pub headless: bool,
    pub viewport: Viewport,
    pub timeouts: Timeouts,
    pub retries: Retries,
    pub artifacts: ArtifactsConfig,
    pub spec_pattern: String,
    pub project_id: Option<String>,
    /// Only ever read from the environment or the local env file
    #[serde(skip_serializing)]
    pub record_key: Option<String>,
    /// Used by `login`
    pub credentials: Credentials,
    /// Used by `login_as_admin`
    pub admin_credentials: Credentials,
    pub exceptions: ExceptionsConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9000".to_string(),
            api_url: "http://localhost:8000/graphql/".to_string(),
            webdriver_url: "http://localhost:4444".to_string(),
            headless: true,
            viewport: Viewport::default(),
            timeouts: Timeouts::default(),
            retries: Retries::default(),
            artifacts: ArtifactsConfig::default(),
            spec_pattern: "scenarios/**".to_string(),
            project_id: Some("rpaahx".to_string()),
            record_key: None,
            credentials: Credentials::default(),
            admin_credentials: Credentials::admin(),
            exceptions: ExceptionsConfig::default(),
        }
    }
}

impl RunConfig {
    /// Load a bare run configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read config file")?;

        let config: Self = if path
            .as_ref()
            .extension()
            .map(|e| e == "yaml" || e == "yml")
            .unwrap_or(false)
        {
            serde_yaml::from_str(&content).context("Failed to parse YAML config")?
        } else {
            serde_json::from_str(&content).context("Failed to parse JSON config")?
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("base_url", &self.base_url),
            ("api_url", &self.api_url),
            ("webdriver_url", &self.webdriver_url),
        ] {
            reqwest::Url::parse(url).with_context(|| format!("Invalid {name}: {url}"))?;
        }
        if self.viewport.width == 0 || self.viewport.height == 0 {
            bail!(
                "Invalid viewport {}x{}",
                self.viewport.width,
                self.viewport.height
            );
        }
        if self.timeouts.command_secs == 0 || self.timeouts.page_load_secs == 0 {
            bail!("Timeouts must be at least one second");
        }
        self.credentials
            .validate()
            .context("Invalid credentials")?;
        self.admin_credentials
            .validate()
            .context("Invalid admin credentials")?;
        Ok(())
    }

    /// Retries allowed per scenario for the current mode
    pub fn retry_budget(&self) -> u32 {
        if self.headless {
            self.retries.run_mode
        } else {
            self.retries.open_mode
        }
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.command_secs)
    }

    pub fn browser_settings(&self) -> BrowserSettings {
        BrowserSettings {
            webdriver_url: self.webdriver_url.clone(),
            headless: self.headless,
            viewport_width: self.viewport.width,
            viewport_height: self.viewport.height,
            page_load_timeout: Duration::from_secs(self.timeouts.page_load_secs),
        }
    }

    /// Apply a named environment from the config file
    pub fn apply_environment(&mut self, environment: &EnvironmentConfig) {
        self.base_url = environment.base_url.clone();
        if let Some(api_url) = &environment.api_url {
            self.api_url = api_url.clone();
        }
        if let Some(webdriver_url) = &environment.webdriver_url {
            self.webdriver_url = webdriver_url.clone();
        }
    }

    /// Apply `SALEOR_E2E_*` overrides
    pub fn apply_env(&mut self, env: &EnvConfig) {
        if let Some(v) = &env.base_url {
            self.base_url = v.clone();
        }
        if let Some(v) = &env.api_url {
            self.api_url = v.clone();
        }
        if let Some(v) = &env.webdriver_url {
            self.webdriver_url = v.clone();
        }
        if let Some(v) = env.headless {
            self.headless = v;
        }
        if let Some(v) = &env.email {
            self.credentials.email = v.clone();
            self.admin_credentials.email = v.clone();
        }
        if let Some(v) = &env.password {
            self.credentials.password = v.clone();
        }
        if let Some(v) = &env.admin_password {
            self.admin_credentials.password = v.clone();
        }
        if let Some(v) = &env.project_id {
            self.project_id = Some(v.clone());
        }
        if let Some(v) = &env.record_key {
            self.record_key = Some(v.clone());
        }
    }
}
