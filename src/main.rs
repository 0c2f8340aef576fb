//! Saleor E2E - end-to-end harness for the Saleor dashboard
//!
//! Drives a real browser through WebDriver against a running dashboard and
//! checks the GraphQL backend directly.
//!
//! ## Features
//!
//! - 17 scenarios covering login, dashboard, navigation, GraphQL API and session
//! - Reusable login helper with fallback locators
//! - Backend readiness probe that never blocks a run
//! - Allow-list for benign uncaught page exceptions
//! - Retries, failure screenshots and stored run history
//!
//! ## Usage
//!
//! ```bash
//! # Run every scenario
//! saleor-e2e run
//!
//! # Run one suite against a named environment
//! saleor-e2e --env staging run --suite login
//!
//! # Check the backend without a browser
//! saleor-e2e probe --dashboard
//!
//! # List scenarios and profiles
//! saleor-e2e list --detailed --profiles
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

mod artifacts;
mod browser;
mod cli;
mod config;
mod exceptions;
mod executor;
mod graphql;
mod http;
mod models;
mod output;
mod readiness;
mod scenarios;
mod session;
mod utils;

use artifacts::{EnvironmentInfo, ExportFormat, ResultsStore, ScreenshotStore, StoredRun};
use browser::WebDriverBrowser;
use cli::{Args, TargetArgs};
use config::{ConfigFile, EnvConfig, RunConfig};
use exceptions::ExceptionFilter;
use executor::{ScenarioFilter, ScenarioRunner};
use http::HttpClient;
use models::{Scenario, Suite};
use output::{OutputFormat, ResultFormatter};
use scenarios::ScenarioContext;
use utils::logger::{init_logger, LogLevel};
use utils::timer::Timer;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logger(LogLevel::from_verbose(args.verbose));

    let env = EnvConfig::load();
    let (file, config) = resolve_config(&args, &env)?;

    match args.command {
        cli::Command::Run(run_args) => {
            run_scenarios(run_args, &file, config, &env).await?;
        }
        cli::Command::Login(login_args) => {
            login_once(login_args, config).await?;
        }
        cli::Command::Probe(probe_args) => {
            probe_backend(probe_args, config).await?;
        }
        cli::Command::Classify(classify_args) => {
            classify_messages(classify_args, &config);
        }
        cli::Command::List(list_args) => {
            list_scenarios(list_args, &file, &config);
        }
        cli::Command::Results(results_args) => {
            show_results(results_args, &config)?;
        }
        cli::Command::Config(config_args) => {
            manage_config(config_args, &args.config, &file, &config, &env)?;
        }
    }

    Ok(())
}

/// File, then named environment, then `SALEOR_E2E_*`, then the record key
fn resolve_config(args: &Args, env: &EnvConfig) -> Result<(ConfigFile, RunConfig)> {
    let file = match args.config.as_ref().or(env.config_file.as_ref()) {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::load_default()?,
    };

    let mut config = file.run.clone();

    if let Some(name) = args.env.as_ref().or(env.environment.as_ref()) {
        let environment = file
            .environment(name)
            .with_context(|| format!("Unknown environment: {name}"))?;
        debug!("Using environment {} ({})", name, environment.base_url);
        config.apply_environment(environment);
    }

    config.apply_env(env);
    config.record_key = config::load_record_key(env, Path::new("."))?;

    Ok((file, config))
}

fn apply_target(config: &mut RunConfig, target: &TargetArgs) {
    if let Some(url) = &target.base_url {
        config.base_url = url.clone();
    }
    if let Some(url) = &target.api_url {
        config.api_url = url.clone();
    }
    if let Some(url) = &target.webdriver_url {
        config.webdriver_url = url.clone();
    }
    if target.headed {
        config.headless = false;
    }
}

fn build_filter(args: &cli::RunArgs, file: &ConfigFile) -> Result<ScenarioFilter> {
    let mut filter = match &args.profile {
        Some(name) => {
            let profile = file
                .profile(name)
                .with_context(|| format!("Unknown profile: {name}"))?;
            profile.validate()?;
            ScenarioFilter::from_profile(&profile)
        }
        None => ScenarioFilter::default(),
    };

    for name in &args.suite {
        let suite =
            Suite::from_str(name).ok_or_else(|| anyhow::anyhow!("Unknown suite: {name}"))?;
        filter = filter.suite(suite);
    }
    for &number in args.scenario.iter() {
        if Scenario::from_number(number).is_none() {
            anyhow::bail!("Unknown scenario number: {number} (valid: 1-17)");
        }
        filter = filter.number(number);
    }
    for &number in args.skip.iter() {
        filter = filter.skip(number);
    }

    Ok(filter)
}

async fn run_scenarios(
    args: cli::RunArgs,
    file: &ConfigFile,
    mut config: RunConfig,
    env: &EnvConfig,
) -> Result<()> {
    apply_target(&mut config, &args.target);
    config.validate()?;

    let filter = build_filter(&args, file)?;
    let format_name = args
        .format
        .clone()
        .or_else(|| env.format.clone())
        .unwrap_or_else(|| "table".to_string());
    let format = OutputFormat::from_str(&format_name).unwrap_or(OutputFormat::Table);
    let retries = args.retries.unwrap_or_else(|| config.retry_budget());

    if config.artifacts.video {
        warn!("Video recording is not supported; artifacts.video is ignored");
    }

    let ctx = ScenarioContext::from_config(&config)?;
    let dashboard_status = readiness::wait_for_dashboard(&ctx.http, &config.base_url).await;
    debug!("Dashboard answered {}", dashboard_status);

    info!(
        "Running scenarios against {} ({}, {} retries)",
        config.base_url,
        if config.headless { "headless" } else { "headed" },
        retries
    );

    let browser = WebDriverBrowser::connect(&config.browser_settings())
        .await
        .with_context(|| format!("Failed to start a browser at {}", config.webdriver_url))?;

    let mut runner = ScenarioRunner::new(&browser, ctx)
        .exceptions(ExceptionFilter::from_config(&config.exceptions))
        .retries(retries);
    if config.artifacts.screenshot_on_failure && !args.no_screenshots {
        runner = runner.screenshots(ScreenshotStore::new(&config.artifacts.screenshots_folder));
    }

    let summary = runner.run(&filter).await;
    drop(runner);

    if let Err(e) = browser.quit().await {
        warn!("Failed to close the browser session: {}", e);
    }

    println!("{}", ResultFormatter::new(format).format_summary(&summary));

    if let Some(path) = &args.output {
        output::write_summary_to_file(path, &summary, format)?;
        info!("Wrote results to {}", path);
    }

    if !args.no_save {
        let environment = EnvironmentInfo {
            project_id: config.project_id.clone(),
            record_key_present: config.record_key.is_some(),
            headless: config.headless,
            ..Default::default()
        };
        let store = ResultsStore::new(&config.artifacts.results_folder);
        store.save(&StoredRun::new(summary.clone()).with_environment(environment))?;
    }

    if !summary.is_green() {
        anyhow::bail!(
            "{} of {} scenarios did not pass",
            summary.failed + summary.errors,
            summary.total
        );
    }

    Ok(())
}

async fn login_once(args: cli::LoginArgs, mut config: RunConfig) -> Result<()> {
    apply_target(&mut config, &args.target);

    let mut credentials = if args.admin {
        config.admin_credentials.clone()
    } else {
        config.credentials.clone()
    };
    if let Some(email) = &args.email {
        credentials.email = email.clone();
    }
    if let Some(password) = &args.password {
        credentials.password = password.clone();
    }
    config.validate()?;

    let browser = WebDriverBrowser::connect(&config.browser_settings())
        .await
        .with_context(|| format!("Failed to start a browser at {}", config.webdriver_url))?;

    let timer = Timer::start("login");
    let attempts = if args.twice { 2 } else { 1 };
    let mut sessions = Vec::new();
    let mut failure = None;
    for _ in 0..attempts {
        let result = if args.admin {
            session::login_as_admin(&browser, &config.base_url, &credentials).await
        } else {
            session::login(&browser, &config.base_url, &credentials).await
        };
        match result {
            Ok(session) => sessions.push(session),
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }
    let elapsed = timer.stop();

    if let Err(e) = browser.quit().await {
        warn!("Failed to close the browser session: {}", e);
    }

    if let Some(e) = failure {
        return Err(e).context("Login failed");
    }
    for (i, session) in sessions.iter().enumerate() {
        println!(
            "✓ Login {} as {}: {} (reused: {}, dashboard content: {}, {}ms)",
            i + 1,
            credentials.email,
            session.final_url,
            session.already_authenticated,
            session.authenticated_indicator,
            session.elapsed_ms
        );
    }
    println!("  Total: {elapsed}ms");

    Ok(())
}

async fn probe_backend(args: cli::ProbeArgs, mut config: RunConfig) -> Result<()> {
    if let Some(url) = &args.api_url {
        config.api_url = url.clone();
    }
    if let Some(url) = &args.base_url {
        config.base_url = url.clone();
    }

    let client = HttpClient::with_timeout(config.timeouts.request_secs)?;
    let formatter = ResultFormatter::new(
        OutputFormat::from_str(&args.format).unwrap_or(OutputFormat::Table),
    );

    let backend = readiness::probe_backend_readiness(&client, &config.api_url);
    let dashboard = async {
        if args.dashboard {
            Some(readiness::check_dashboard_running(&client, &config.base_url).await)
        } else {
            None
        }
    };
    let (report, dashboard) = futures::future::join(backend, dashboard).await;

    println!("{}", formatter.format_readiness(&report));
    if !report.is_ready() {
        println!("  Scenarios needing the backend will be skipped while it is unreachable.");
    }

    if let Some(dashboard) = dashboard {
        dashboard?;
        println!("✓ Dashboard is reachable at {}", config.base_url);
    }

    Ok(())
}

fn classify_messages(args: cli::ClassifyArgs, config: &RunConfig) {
    let mut exceptions = config.exceptions.clone();
    if args.no_defaults {
        exceptions.include_defaults = false;
    }
    let filter = ExceptionFilter::from_config(&exceptions);

    for message in &args.messages {
        let verdict = filter.classify(message);
        let symbol = if verdict.is_suppressed() { "○" } else { "✗" };
        println!("{symbol} {:24} {message}", verdict.to_string());
    }
}

fn list_scenarios(args: cli::ListArgs, file: &ConfigFile, config: &RunConfig) {
    println!("\nSaleor Dashboard Scenarios ({} total)\n", Scenario::all().len());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    for suite in Suite::all() {
        println!("\n{suite} Scenarios:");
        println!("──────────────────────────────────────────────────────────────────────");

        for scenario in Scenario::in_suite(suite) {
            if args.detailed {
                let mut needs = Vec::new();
                if scenario.needs_session() {
                    needs.push("session");
                }
                if scenario.needs_backend() {
                    needs.push("backend");
                }
                println!(
                    "  {:2}. {:32} [{}]",
                    scenario.number(),
                    scenario.name(),
                    needs.join(", ")
                );
            } else {
                println!("  {:2}. {}", scenario.number(), scenario.name());
            }
        }
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    if args.profiles {
        println!("Scenario Profiles:");
        println!("{:-<60}", "");
        let mut profiles = config::ScenarioProfile::builtin();
        for profile in &file.profiles {
            profiles.retain(|p| p.name != profile.name);
            profiles.push(profile.clone());
        }
        for profile in profiles {
            let count = profile.resolve().len();
            if args.detailed {
                println!("  {}", profile.name);
                println!("    Description: {}", profile.description);
                println!("    Scenarios: {:?}", profile.scenarios);
                println!("    Suites: {:?}", profile.suites);
                println!("    Tags: {:?}", profile.tags);
                println!();
            } else {
                println!(
                    "  {:20} - {} ({} scenarios)",
                    profile.name, profile.description, count
                );
            }
        }
        println!();
    }

    if args.exceptions {
        println!("Benign Exception Patterns:");
        println!("{:-<60}", "");
        let filter = ExceptionFilter::from_config(&config.exceptions);
        for pattern in filter.patterns() {
            println!("  {:20} {:?}", pattern.name, pattern.substrings);
        }
        println!();
    }
}

fn show_results(args: cli::ResultsArgs, config: &RunConfig) -> Result<()> {
    let store = ResultsStore::new(&config.artifacts.results_folder);
    let format = OutputFormat::from_str(&args.format).unwrap_or(OutputFormat::Table);
    let formatter = ResultFormatter::new(format);

    let run = match (&args.run_id, args.latest) {
        (Some(run_id), _) if args.delete => {
            store.delete(run_id)?;
            println!("✓ Deleted run {run_id}");
            return Ok(());
        }
        (Some(run_id), _) => store.load(run_id)?,
        (None, true) => match store.latest()? {
            Some(run) => run,
            None => {
                println!("\n📭 No stored runs in {}.", store.base_dir().display());
                return Ok(());
            }
        },
        (None, false) => {
            let runs = store.list_runs()?;
            println!("{}", formatter.format_runs(&runs));
            if runs.is_empty() {
                println!("   Run scenarios with: saleor-e2e run");
            } else {
                println!("Use a run ID or --latest to view details.\n");
            }
            return Ok(());
        }
    };

    println!("{}", formatter.format_summary(&run.summary));
    if format == OutputFormat::Table {
        let environment = &run.environment;
        println!(
            "  {} {} | saleor-e2e {} | headless: {} | recorded: {}",
            environment.os,
            environment.arch,
            environment.tool_version,
            environment.headless,
            environment.record_key_present
        );
    }

    if let Some(export_path) = &args.export {
        let path = PathBuf::from(export_path);
        let export_format = ExportFormat::from_extension(&path).unwrap_or(ExportFormat::Json);
        store.export(&run, &path, export_format)?;
        println!("\n✓ Run exported to: {}", path.display());
    }

    Ok(())
}

fn manage_config(
    args: cli::ConfigArgs,
    config_path: &Option<String>,
    file: &ConfigFile,
    config: &RunConfig,
    env: &EnvConfig,
) -> Result<()> {
    match args.action {
        cli::ConfigAction::Init { output, force } => {
            let path = Path::new(&output);
            if path.exists() && !force {
                anyhow::bail!(
                    "Configuration file already exists: {output}. Use --force to overwrite."
                );
            }

            ConfigFile::example().save(path)?;
            println!("✓ Configuration file created: {output}");
            println!("\nEdit the file to customize your settings.");
        }

        cli::ConfigAction::Show { format } => {
            let mut resolved = file.clone();
            resolved.run = config.clone();
            let output = if format == "json" {
                serde_json::to_string_pretty(&resolved)?
            } else {
                serde_yaml::to_string(&resolved)?
            };
            println!("{output}");
            println!(
                "# record key: {}",
                if config.record_key.is_some() {
                    "configured"
                } else {
                    "not configured"
                }
            );
        }

        cli::ConfigAction::Validate { file: target } => {
            let path = target
                .or_else(|| config_path.clone())
                .or_else(|| ConfigFile::find().map(|p| p.to_string_lossy().to_string()))
                .unwrap_or_else(|| "./saleor-e2e.yaml".to_string());

            match ConfigFile::load(&path) {
                Ok(_) => {
                    println!("✓ Configuration file is valid: {path}");
                }
                Err(e) => {
                    println!("✗ Configuration file is invalid: {path}");
                    println!("  Error: {e:#}");
                    return Err(e);
                }
            }
        }

        cli::ConfigAction::Env => {
            config::print_env_help();
            if env.has_any() {
                println!();
                env.print_summary();
            }
        }
    }

    Ok(())
}
