//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};

/// End-to-end harness for the Saleor dashboard
#[derive(Parser, Debug)]
#[command(name = "saleor-e2e")]
#[command(version = "0.1.0")]
#[command(about = "Drive the Saleor dashboard through WebDriver and check its GraphQL API")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Named environment from the configuration file
    #[arg(short, long, global = true)]
    pub env: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run scenarios against the dashboard
    Run(RunArgs),

    /// Log in once and report the session
    Login(LoginArgs),

    /// Probe the GraphQL backend (and optionally the dashboard)
    Probe(ProbeArgs),

    /// Classify uncaught exception messages as benign or not
    Classify(ClassifyArgs),

    /// List scenarios and profiles
    List(ListArgs),

    /// View stored run results
    Results(ResultsArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Target overrides shared by browser commands
#[derive(Parser, Debug, Default)]
pub struct TargetArgs {
    /// Dashboard origin
    #[arg(long)]
    pub base_url: Option<String>,

    /// GraphQL endpoint
    #[arg(long)]
    pub api_url: Option<String>,

    /// WebDriver server
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Show the browser window (uses the open-mode retry budget)
    #[arg(long)]
    pub headed: bool,
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Suites to run (login, dashboard, navigation, graphql, session)
    #[arg(long)]
    pub suite: Vec<String>,

    /// Scenario numbers to run (1-17)
    #[arg(short, long)]
    pub scenario: Vec<u8>,

    /// Scenario numbers to skip
    #[arg(long)]
    pub skip: Vec<u8>,

    /// Scenario profile (smoke, api, all, or one from the config file)
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Override the retry budget
    #[arg(short, long)]
    pub retries: Option<u32>,

    /// Output format (table, json, json-pretty, csv, summary)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Also write the formatted run to this file
    #[arg(short, long)]
    pub output: Option<String>,

    /// Do not store the run under the results folder
    #[arg(long)]
    pub no_save: bool,

    /// Do not capture screenshots on failure
    #[arg(long)]
    pub no_screenshots: bool,
}

/// Arguments for login command
#[derive(Parser, Debug)]
pub struct LoginArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Use the admin account and require dashboard content
    #[arg(long)]
    pub admin: bool,

    /// Login email
    #[arg(long)]
    pub email: Option<String>,

    /// Login password
    #[arg(long)]
    pub password: Option<String>,

    /// Log in a second time to check the session is reused
    #[arg(long)]
    pub twice: bool,
}

/// Arguments for probe command
#[derive(Parser, Debug)]
pub struct ProbeArgs {
    /// GraphQL endpoint
    #[arg(long)]
    pub api_url: Option<String>,

    /// Dashboard origin
    #[arg(long)]
    pub base_url: Option<String>,

    /// Also require the dashboard to answer 200
    #[arg(short, long)]
    pub dashboard: bool,

    /// Output format (table, json, json-pretty)
    #[arg(short, long, default_value = "table")]
    pub format: String,
}

/// Arguments for classify command
#[derive(Parser, Debug)]
pub struct ClassifyArgs {
    /// Exception messages
    #[arg(required = true)]
    pub messages: Vec<String>,

    /// Ignore the built-in benign patterns
    #[arg(long)]
    pub no_defaults: bool,
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Show suite and requirements per scenario
    #[arg(short, long)]
    pub detailed: bool,

    /// List scenario profiles
    #[arg(short, long)]
    pub profiles: bool,

    /// List benign exception patterns
    #[arg(long)]
    pub exceptions: bool,
}

/// Arguments for results command
#[derive(Parser, Debug)]
pub struct ResultsArgs {
    /// Run ID to show (defaults to listing runs)
    pub run_id: Option<String>,

    /// Show the most recent run
    #[arg(short, long)]
    pub latest: bool,

    /// Export the selected run (.json or .csv)
    #[arg(long)]
    pub export: Option<String>,

    /// Delete the selected run
    #[arg(long, requires = "run_id")]
    pub delete: bool,

    /// Output format (table, json, json-pretty, csv, summary)
    #[arg(short, long, default_value = "table")]
    pub format: String,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved configuration
    Show {
        /// Output format (yaml, json)
        #[arg(short, long, default_value = "yaml")]
        format: String,
    },

    /// Write an example configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "./saleor-e2e.yaml")]
        output: String,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// File to validate (defaults to the standard locations)
        file: Option<String>,
    },

    /// Describe and show SALEOR_E2E_* environment variables
    Env,
}
