//! Scenario profiles
//!
//! Named selections of scenarios, e.g. a quick smoke pass.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::models::{Scenario, Suite};

/// A named selection of scenarios
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScenarioProfile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Scenario numbers
    #[serde(default)]
    pub scenarios: Vec<u8>,
    /// Whole suites
    #[serde(default)]
    pub suites: Vec<Suite>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ScenarioProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            scenarios: Vec::new(),
            suites: Vec::new(),
            tags: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn suite(mut self, suite: Suite) -> Self {
        self.suites.push(suite);
        self
    }

    pub fn scenario(mut self, number: u8) -> Self {
        self.scenarios.push(number);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Login and landing page only
    pub fn smoke() -> Self {
        Self::new("smoke")
            .description("Login form, valid login and dashboard landing page")
            .scenario(1)
            .scenario(3)
            .scenario(6)
            .tag("quick")
    }

    /// GraphQL API scenarios only; no browser session needed beyond the playground
    pub fn api() -> Self {
        Self::new("api")
            .description("GraphQL API scenarios")
            .suite(Suite::Graphql)
            .tag("backend")
    }

    pub fn all() -> Self {
        let mut profile = Self::new("all").description("Every scenario");
        profile.suites = Suite::all();
        profile
    }

    pub fn builtin() -> Vec<ScenarioProfile> {
        vec![Self::smoke(), Self::api(), Self::all()]
    }

    pub fn validate(&self) -> Result<()> {
        for number in &self.scenarios {
            if Scenario::from_number(*number).is_none() {
                bail!(
                    "Invalid scenario number {} in profile '{}'. Valid range: 1-{}",
                    number,
                    self.name,
                    Scenario::all().len()
                );
            }
        }
        Ok(())
    }

    /// Selected scenarios in catalogue order, without duplicates
    pub fn resolve(&self) -> Vec<Scenario> {
        Scenario::all()
            .into_iter()
            .filter(|s| self.scenarios.contains(&s.number()) || self.suites.contains(&s.suite()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoke_profile() {
        let scenarios = ScenarioProfile::smoke().resolve();
        assert_eq!(
            scenarios,
            vec![
                Scenario::LoginFormDisplayed,
                Scenario::ValidCredentialsLogin,
                Scenario::DashboardAfterLogin
            ]
        );
    }

    #[test]
    fn test_overlapping_selection_is_deduplicated() {
        let profile = ScenarioProfile::new("mixed")
            .suite(Suite::Graphql)
            .scenario(14)
            .scenario(1);
        let scenarios = profile.resolve();
        assert_eq!(scenarios.len(), 5);
        assert_eq!(scenarios[0], Scenario::LoginFormDisplayed);
    }

    #[test]
    fn test_all_profile() {
        assert_eq!(ScenarioProfile::all().resolve().len(), Scenario::all().len());
    }

    #[test]
    fn test_validate() {
        assert!(ScenarioProfile::smoke().validate().is_ok());
        assert!(ScenarioProfile::new("bad").scenario(99).validate().is_err());
    }
}
