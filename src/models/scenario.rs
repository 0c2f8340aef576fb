//! Scenario catalogue identifiers
//!
//! Every scenario the harness knows, grouped into suites.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scenario suites
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suite {
    Login,
    Dashboard,
    Navigation,
    Graphql,
    Session,
}

impl Suite {
    pub fn name(&self) -> &'static str {
        match self {
            Suite::Login => "Login",
            Suite::Dashboard => "Dashboard",
            Suite::Navigation => "Navigation",
            Suite::Graphql => "GraphQL API",
            Suite::Session => "Session",
        }
    }

    pub fn all() -> Vec<Suite> {
        vec![
            Suite::Login,
            Suite::Dashboard,
            Suite::Navigation,
            Suite::Graphql,
            Suite::Session,
        ]
    }

    pub fn from_str(s: &str) -> Option<Suite> {
        match s.to_lowercase().as_str() {
            "login" => Some(Suite::Login),
            "dashboard" => Some(Suite::Dashboard),
            "navigation" | "nav" => Some(Suite::Navigation),
            "graphql" | "graphql-api" | "api" => Some(Suite::Graphql),
            "session" => Some(Suite::Session),
            _ => None,
        }
    }
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// All scenarios, in run order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    // Login (1-5)
    LoginFormDisplayed,
    InvalidCredentialsRejected,
    ValidCredentialsLogin,
    EmailRequired,
    PasswordRequired,

    // Dashboard (6-7)
    DashboardAfterLogin,
    DashboardContent,

    // Navigation (8-12)
    NavigationHome,
    NavigationMenuVisible,
    NavigateToProducts,
    NavigateToOrders,
    NavigateToCustomers,

    // GraphQL API (13-16)
    GraphqlPlayground,
    ShopQuery,
    ProductsQuery,
    InvalidQueryHandled,

    // Session (17)
    LogoutReturnsToLogin,
}

impl Scenario {
    pub fn number(&self) -> u8 {
        match self {
            Scenario::LoginFormDisplayed => 1,
            Scenario::InvalidCredentialsRejected => 2,
            Scenario::ValidCredentialsLogin => 3,
            Scenario::EmailRequired => 4,
            Scenario::PasswordRequired => 5,
            Scenario::DashboardAfterLogin => 6,
            Scenario::DashboardContent => 7,
            Scenario::NavigationHome => 8,
            Scenario::NavigationMenuVisible => 9,
            Scenario::NavigateToProducts => 10,
            Scenario::NavigateToOrders => 11,
            Scenario::NavigateToCustomers => 12,
            Scenario::GraphqlPlayground => 13,
            Scenario::ShopQuery => 14,
            Scenario::ProductsQuery => 15,
            Scenario::InvalidQueryHandled => 16,
            Scenario::LogoutReturnsToLogin => 17,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::LoginFormDisplayed => "Login form displayed",
            Scenario::InvalidCredentialsRejected => "Invalid credentials rejected",
            Scenario::ValidCredentialsLogin => "Valid credentials log in",
            Scenario::EmailRequired => "Email required",
            Scenario::PasswordRequired => "Password required",
            Scenario::DashboardAfterLogin => "Dashboard after login",
            Scenario::DashboardContent => "Dashboard content",
            Scenario::NavigationHome => "Home after login",
            Scenario::NavigationMenuVisible => "Navigation menu visible",
            Scenario::NavigateToProducts => "Navigate to products",
            Scenario::NavigateToOrders => "Navigate to orders",
            Scenario::NavigateToCustomers => "Navigate to customers",
            Scenario::GraphqlPlayground => "GraphQL playground",
            Scenario::ShopQuery => "Shop query",
            Scenario::ProductsQuery => "Products query",
            Scenario::InvalidQueryHandled => "Invalid query handled",
            Scenario::LogoutReturnsToLogin => "Logout returns to login",
        }
    }

    pub fn suite(&self) -> Suite {
        match self.number() {
            1..=5 => Suite::Login,
            6..=7 => Suite::Dashboard,
            8..=12 => Suite::Navigation,
            13..=16 => Suite::Graphql,
            _ => Suite::Session,
        }
    }

    /// Runs with a logged-in session
    pub fn needs_session(&self) -> bool {
        matches!(
            self.suite(),
            Suite::Dashboard | Suite::Navigation | Suite::Session
        )
    }

    /// Talks to the GraphQL backend; skipped when the probe finds it down
    pub fn needs_backend(&self) -> bool {
        self.suite() == Suite::Graphql
    }

    pub fn all() -> Vec<Scenario> {
        vec![
            Scenario::LoginFormDisplayed,
            Scenario::InvalidCredentialsRejected,
            Scenario::ValidCredentialsLogin,
            Scenario::EmailRequired,
            Scenario::PasswordRequired,
            Scenario::DashboardAfterLogin,
            Scenario::DashboardContent,
            Scenario::NavigationHome,
            Scenario::NavigationMenuVisible,
            Scenario::NavigateToProducts,
            Scenario::NavigateToOrders,
            Scenario::NavigateToCustomers,
            Scenario::GraphqlPlayground,
            Scenario::ShopQuery,
            Scenario::ProductsQuery,
            Scenario::InvalidQueryHandled,
            Scenario::LogoutReturnsToLogin,
        ]
    }

    pub fn in_suite(suite: Suite) -> Vec<Scenario> {
        Self::all()
            .into_iter()
            .filter(|s| s.suite() == suite)
            .collect()
    }

    pub fn from_number(n: u8) -> Option<Scenario> {
        Self::all().into_iter().find(|s| s.number() == n)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scenario {}: {}", self.number(), self.name())
    }
}
