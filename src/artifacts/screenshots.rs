//! Failure screenshots
//!
//! PNG files named after the scenario and attempt that failed.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::models::Scenario;

/// Writes screenshots under one directory
#[derive(Clone, Debug)]
pub struct ScreenshotStore {
    dir: PathBuf,
}

impl ScreenshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<run_id>/<NN>-<slug>-attempt<k>.png`
    pub fn path_for(&self, run_id: &str, scenario: Scenario, attempt: u32) -> PathBuf {
        self.dir.join(run_id).join(format!(
            "{:02}-{}-attempt{}.png",
            scenario.number(),
            slug(scenario.name()),
            attempt
        ))
    }

    pub fn save(
        &self,
        run_id: &str,
        scenario: Scenario,
        attempt: u32,
        png: &[u8],
    ) -> Result<PathBuf> {
        let path = self.path_for(run_id, scenario, attempt);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::write(&path, png)
            .with_context(|| format!("Failed to write screenshot: {}", path.display()))?;
        info!("Saved screenshot to {}", path.display());
        Ok(path)
    }
}

fn slug(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_slug() {
        assert_eq!(slug("Navigate to products"), "navigate-to-products");
        assert_eq!(slug("GraphQL playground"), "graphql-playground");
    }

    #[test]
    fn test_save_screenshot() {
        let dir = tempdir().unwrap();
        let store = ScreenshotStore::new(dir.path());

        let path = store
            .save("run1", Scenario::NavigateToOrders, 3, b"png")
            .unwrap();
        assert!(path.ends_with("run1/11-navigate-to-orders-attempt3.png"));
        assert_eq!(fs::read(&path).unwrap(), b"png");
    }
}
