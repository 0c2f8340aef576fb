//! Output formatters for scenario results
//!
//! Provides table, JSON, CSV and one-line summary output.

use std::io::Write;

use crate::artifacts::RunInfo;
use crate::models::{RunSummary, ScenarioResult, ScenarioStatus};
use crate::readiness::{Readiness, ReadinessReport};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Csv,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "csv" => Some(OutputFormat::Csv),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }
}

/// Result formatter
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.colorize {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn to_json<T: serde::Serialize>(&self, value: &T) -> String {
        if self.format == OutputFormat::JsonPretty {
            serde_json::to_string_pretty(value).unwrap_or_default()
        } else {
            serde_json::to_string(value).unwrap_or_default()
        }
    }

    fn format_result_table(&self, result: &ScenarioResult) -> String {
        let status = match result.status {
            ScenarioStatus::Pass => self.paint("32", "✓ PASS "),
            ScenarioStatus::Fail => self.paint("31", "✗ FAIL "),
            ScenarioStatus::Skip => self.paint("33", "○ SKIP "),
            ScenarioStatus::Error => self.paint("31", "! ERROR"),
        };

        let mut line = format!(
            "{:2}. {:30} {} [{:>6}ms]",
            result.scenario.number(),
            result.scenario.name(),
            status,
            result.duration_ms
        );
        if result.attempts > 1 {
            line.push_str(&format!(" x{}", result.attempts));
        }
        line
    }

    /// Format a whole run
    pub fn format_summary(&self, summary: &RunSummary) -> String {
        match self.format {
            OutputFormat::Table => self.format_summary_table(summary),
            OutputFormat::Json | OutputFormat::JsonPretty => self.to_json(summary),
            OutputFormat::Csv => format_summary_csv(summary),
            OutputFormat::Summary => format!(
                "Run {}: {}/{} passed ({:.1}%), {} skipped in {}ms",
                summary.run_id,
                summary.passed,
                summary.total,
                summary.pass_rate(),
                summary.skipped,
                summary.total_duration_ms
            ),
        }
    }

    fn format_summary_table(&self, summary: &RunSummary) -> String {
        let mut output = String::new();

        output.push_str("\n╔══════════════════════════════════════════════════════════════╗\n");
        output.push_str(&format!(
            "║  Run {:20} {:35} ║\n",
            summary.run_id, summary.base_url
        ));
        output.push_str("╠══════════════════════════════════════════════════════════════╣\n");

        for result in &summary.results {
            output.push_str(&format!("║  {}\n", self.format_result_table(result)));
            if let (ScenarioStatus::Fail | ScenarioStatus::Error, Some(message)) =
                (result.status, &result.message)
            {
                output.push_str(&format!("║        {message}\n"));
            }
            if let Some(path) = &result.screenshot {
                output.push_str(&format!("║        screenshot: {path}\n"));
            }
        }

        output.push_str("╠══════════════════════════════════════════════════════════════╣\n");

        let pass_str = self.paint("32", &summary.passed.to_string());
        let fail_str = if summary.failed > 0 {
            self.paint("31", &summary.failed.to_string())
        } else {
            summary.failed.to_string()
        };

        output.push_str(&format!(
            "║  Total: {:2} | Pass: {} | Fail: {} | Skip: {:2} | Error: {:2}\n",
            summary.total, pass_str, fail_str, summary.skipped, summary.errors
        ));
        output.push_str(&format!(
            "║  Pass Rate: {:5.1}% | Duration: {:6}ms\n",
            summary.pass_rate(),
            summary.total_duration_ms
        ));
        let suppressed: usize = summary
            .results
            .iter()
            .map(|r| r.suppressed_exceptions.len())
            .sum();
        if suppressed > 0 {
            output.push_str(&format!(
                "║  Ignored uncaught exceptions: {suppressed}\n"
            ));
        }
        output.push_str("╚══════════════════════════════════════════════════════════════╝\n");

        output
    }

    /// Format stored run history
    pub fn format_runs(&self, runs: &[RunInfo]) -> String {
        if runs.is_empty() {
            return "No stored runs.\n".to_string();
        }

        let mut output = String::new();
        output.push_str(&format!(
            "{:22} {:20} {:>5} {:>7}  {}\n",
            "RUN", "STARTED", "TOTAL", "RATE", "TARGET"
        ));
        for run in runs {
            let rate = format!("{:5.1}%", run.pass_rate);
            let rate = if run.green {
                self.paint("32", &rate)
            } else {
                self.paint("31", &rate)
            };
            output.push_str(&format!(
                "{:22} {:20} {:>5} {:>7}  {}\n",
                run.id,
                run.started_at.format("%Y-%m-%d %H:%M:%S"),
                run.total,
                rate,
                run.base_url
            ));
        }
        output
    }

    /// Format a backend probe report
    pub fn format_readiness(&self, report: &ReadinessReport) -> String {
        match self.format {
            OutputFormat::Json | OutputFormat::JsonPretty => self.to_json(report),
            _ => {
                let verdict = match report.readiness {
                    Readiness::Ready => self.paint("32", "ready"),
                    Readiness::Degraded => self.paint("33", "degraded"),
                    Readiness::Unreachable => self.paint("31", "unreachable"),
                };
                let mut line = format!(
                    "{} - {} (status {}, data: {}, errors: {})",
                    report.endpoint, verdict, report.status_code, report.has_data, report.has_errors
                );
                if let Some(detail) = &report.detail {
                    line.push_str(&format!(" - {detail}"));
                }
                line
            }
        }
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Table)
    }
}

fn format_result_csv(result: &ScenarioResult) -> String {
    format!(
        "{},{},{},{},{},\"{}\"",
        result.scenario.number(),
        result.scenario.name(),
        result.status,
        result.attempts,
        result.duration_ms,
        result.message.as_deref().unwrap_or("").replace('"', "\"\"")
    )
}

fn format_summary_csv(summary: &RunSummary) -> String {
    let mut output = String::new();
    output.push_str("scenario_num,scenario_name,status,attempts,duration_ms,message\n");
    for result in &summary.results {
        output.push_str(&format_result_csv(result));
        output.push('\n');
    }
    output
}

/// Write a formatted run to a file
pub fn write_summary_to_file(
    path: &str,
    summary: &RunSummary,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let formatter = ResultFormatter::new(format).no_color();
    let content = formatter.format_summary(summary);

    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}
