//! Environment variable configuration
//!
//! Provides `SALEOR_E2E_*` overrides and the record key lookup.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::Path;

/// Environment variable prefix
const ENV_PREFIX: &str = "SALEOR_E2E";

/// Uncommitted local file that may carry the record key
pub const LOCAL_ENV_FILE: &str = ".saleor-e2e.env.json";

/// Overrides read from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Dashboard origin from SALEOR_E2E_BASE_URL
    pub base_url: Option<String>,
    /// GraphQL endpoint from SALEOR_E2E_API_URL
    pub api_url: Option<String>,
    /// WebDriver server from SALEOR_E2E_WEBDRIVER_URL
    pub webdriver_url: Option<String>,
    /// Headless mode from SALEOR_E2E_HEADLESS
    pub headless: Option<bool>,
    /// Login email from SALEOR_E2E_EMAIL
    pub email: Option<String>,
    /// Login password from SALEOR_E2E_PASSWORD
    pub password: Option<String>,
    /// Admin password from SALEOR_E2E_ADMIN_PASSWORD
    pub admin_password: Option<String>,
    /// Config file from SALEOR_E2E_CONFIG
    pub config_file: Option<String>,
    /// Environment name from SALEOR_E2E_ENV
    pub environment: Option<String>,
    /// Output format from SALEOR_E2E_FORMAT
    pub format: Option<String>,
    /// Project identifier from SALEOR_E2E_PROJECT_ID
    pub project_id: Option<String>,
    /// Record key from SALEOR_E2E_RECORD_KEY
    pub record_key: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            base_url: get_env("BASE_URL"),
            api_url: get_env("API_URL"),
            webdriver_url: get_env("WEBDRIVER_URL"),
            headless: get_env_bool("HEADLESS"),
            email: get_env("EMAIL"),
            password: get_env("PASSWORD"),
            admin_password: get_env("ADMIN_PASSWORD"),
            config_file: get_env("CONFIG"),
            environment: get_env("ENV"),
            format: get_env("FORMAT"),
            project_id: get_env("PROJECT_ID"),
            record_key: get_env("RECORD_KEY"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.base_url.is_some()
            || self.api_url.is_some()
            || self.webdriver_url.is_some()
            || self.headless.is_some()
            || self.email.is_some()
            || self.password.is_some()
            || self.admin_password.is_some()
            || self.config_file.is_some()
            || self.environment.is_some()
            || self.format.is_some()
            || self.project_id.is_some()
            || self.record_key.is_some()
    }

    /// Print current environment configuration, secrets masked
    pub fn print_summary(&self) {
        let mask = |v: &Option<String>| v.as_ref().map(|_| "********");
        println!("Environment Configuration:");
        println!("  {}_BASE_URL:       {:?}", ENV_PREFIX, self.base_url);
        println!("  {}_API_URL:        {:?}", ENV_PREFIX, self.api_url);
        println!("  {}_WEBDRIVER_URL:  {:?}", ENV_PREFIX, self.webdriver_url);
        println!("  {}_HEADLESS:       {:?}", ENV_PREFIX, self.headless);
        println!("  {}_EMAIL:          {:?}", ENV_PREFIX, self.email);
        println!("  {}_PASSWORD:       {:?}", ENV_PREFIX, mask(&self.password));
        println!("  {}_ADMIN_PASSWORD: {:?}", ENV_PREFIX, mask(&self.admin_password));
        println!("  {}_CONFIG:         {:?}", ENV_PREFIX, self.config_file);
        println!("  {}_ENV:            {:?}", ENV_PREFIX, self.environment);
        println!("  {}_FORMAT:         {:?}", ENV_PREFIX, self.format);
        println!("  {}_PROJECT_ID:     {:?}", ENV_PREFIX, self.project_id);
        println!("  {}_RECORD_KEY:     {:?}", ENV_PREFIX, mask(&self.record_key));
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}"))
        .ok()
        .filter(|v| !v.is_empty())
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| {
        matches!(
            v.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on" | "enabled"
        )
    })
}

#[derive(Deserialize)]
struct LocalEnvFile {
    record_key: Option<String>,
}

/// Record key from the environment, else from the local env file in `dir`
pub fn load_record_key(env: &EnvConfig, dir: &Path) -> Result<Option<String>> {
    if let Some(key) = &env.record_key {
        return Ok(Some(key.clone()));
    }

    let path = dir.join(LOCAL_ENV_FILE);
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let local: LocalEnvFile = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(local.record_key.filter(|k| !k.is_empty()))
}

/// Print all SALEOR_E2E environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_BASE_URL        Dashboard origin (default http://localhost:9000)");
    println!("  {ENV_PREFIX}_API_URL         GraphQL endpoint (default http://localhost:8000/graphql/)");
    println!("  {ENV_PREFIX}_WEBDRIVER_URL   WebDriver server (default http://localhost:4444)");
    println!("  {ENV_PREFIX}_HEADLESS        Run the browser headless (true/false)");
    println!("  {ENV_PREFIX}_EMAIL           Login email");
    println!("  {ENV_PREFIX}_PASSWORD        Login password");
    println!("  {ENV_PREFIX}_ADMIN_PASSWORD  Admin login password");
    println!("  {ENV_PREFIX}_CONFIG          Path to configuration file");
    println!("  {ENV_PREFIX}_ENV             Environment name from the config file");
    println!("  {ENV_PREFIX}_FORMAT          Output format (table, json, csv)");
    println!("  {ENV_PREFIX}_PROJECT_ID      Project identifier");
    println!("  {ENV_PREFIX}_RECORD_KEY      Record key (or {LOCAL_ENV_FILE}, never committed)");
    println!("  {ENV_PREFIX}_LOG             Log filter (e.g. debug, saleor_e2e=trace)");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_BASE_URL=http://localhost:9000");
    println!("  saleor-e2e run --suite login");
}
