//! `logcheck scan` command handler

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use logcheck_core::config::LogCheckConfig;
use logcheck_core::types::{Readiness, ScanResult};
use logcheck_scanner::{
    EnvProperties, LogFileRule, PropertySource, RuleConfig, RuleConfigBuilder,
};

use crate::cli::ScanArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `scan` command.
pub async fn execute(
    args: ScanArgs,
    config: LogCheckConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let rule_config = build_rule_config(&args, &config)?;
    let properties = build_properties(&args, &rule_config);

    info!(
        files = ?rule_config.file_names,
        from_resources = rule_config.read_log_file_from_test_resources,
        max_wait_ms = rule_config.max_wait_ms,
        "starting log scan"
    );

    // The end-marker wait blocks the calling thread.
    let report = tokio::task::spawn_blocking(move || {
        let mut rule = LogFileRule::new(Some(rule_config)).with_properties(properties);
        rule.run(|rule| ScanReport::from_rule(rule))
    })
    .await
    .map_err(|e| CliError::Command(format!("scan task failed: {e}")))??;

    writer.render(&report)?;

    if report.total_errors > 0 {
        return Err(CliError::ErrorsFound(report.total_errors));
    }

    Ok(())
}

/// Merge command-line flags over the loaded configuration.
fn build_rule_config(args: &ScanArgs, config: &LogCheckConfig) -> Result<RuleConfig, CliError> {
    let mut builder = RuleConfigBuilder::from_config(RuleConfig::from_core(config));

    if !args.files.is_empty() {
        builder = builder.file_names(args.files.iter().cloned());
    }
    if !args.markers.is_empty() {
        builder = builder.error_markers(args.markers.iter().cloned());
    }
    if !args.end_markers.is_empty() {
        builder = builder.end_markers(args.end_markers.iter().cloned());
    }
    if !args.known_issues.is_empty() {
        builder = builder.known_issues(args.known_issues.iter().cloned());
    }
    if args.all {
        builder = builder.stop_at_error(false);
    }
    if let Some(ref dir) = args.resources {
        builder = builder.test_resources_dir(dir.clone());
    }
    if args.quickstart.is_some() {
        builder = builder.read_log_file_from_test_resources(false);
    }
    if let Some(ms) = args.max_wait_ms {
        builder = builder.max_wait_ms(ms);
    }

    Ok(builder.build()?)
}

/// `--quickstart` supplies the property value directly; otherwise read the environment.
fn build_properties(args: &ScanArgs, config: &RuleConfig) -> Arc<dyn PropertySource> {
    match args.quickstart {
        Some(ref dir) => Arc::new(HashMap::from([(
            config.quickstart_folder_property.clone(),
            dir.display().to_string(),
        )])),
        None => Arc::new(EnvProperties),
    }
}

/// Scan report payload.
#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub run_id: String,
    pub stop_at_error: bool,
    pub total_errors: usize,
    pub files: Vec<ScanResult>,
}

impl ScanReport {
    fn from_rule(rule: &LogFileRule) -> Self {
        Self {
            run_id: rule.run_id().to_string(),
            stop_at_error: rule.rule_config().is_some_and(|c| c.stop_at_error),
            total_errors: rule.errors().len(),
            files: rule.results().to_vec(),
        }
    }
}

impl Render for ScanReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        for file in &self.files {
            writeln!(w, "Log: {} ({})", file.file.bold(), file.path.display())?;

            let readiness = file.readiness.to_string();
            let readiness = match file.readiness {
                Readiness::Ready { .. } => readiness.green(),
                Readiness::TimedOut { .. } => readiness.yellow().bold(),
                Readiness::NotConfigured => readiness.dimmed(),
            };
            writeln!(w, "  End marker: {readiness}")?;
            writeln!(
                w,
                "  Lines scanned: {}, known issues suppressed: {}",
                file.lines_scanned, file.suppressed
            )?;

            for line in &file.errors {
                let marker = line.marker.as_deref().unwrap_or("?");
                writeln!(w, "  {:>6} {} {}", line.index, marker.red().bold(), line.text)?;
            }
            writeln!(w)?;
        }

        if self.total_errors > 0 {
            let summary = format!("{} error line(s) found", self.total_errors);
            writeln!(w, "{}", summary.red().bold())?;
            if self.stop_at_error {
                writeln!(w, "{}", "(stopped at first error per file; use --all to list every error)".dimmed())?;
            }
        } else {
            writeln!(w, "{}", "No errors found.".green())?;
        }

        Ok(())
    }
}
