//! Dump command handler
//!
//! Resolves settings from flags, the prompt and the config file, then runs
//! the orchestrator against the live system.

use crate::config::Config;
use crate::prompt;
use crate::report::ConsoleReporter;
use anyhow::{Context, Result};
use memdump::{
    CaptureBudget, DumpOrchestrator, DumpRequest, FsArtifactSink, LiveOpener, RegionTypePolicy,
    Reporter, SystemDirectory,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Settings given on the command line
#[derive(Debug, Default)]
pub struct DumpArgs {
    pub target: Option<String>,
    pub grep: Option<String>,
    pub region: Option<RegionTypePolicy>,
    pub max_size_mb: Option<String>,
    pub output_dir: Option<PathBuf>,
}

/// Handle the dump command
pub fn handle(args: DumpArgs, config: &Config) -> Result<()> {
    let request = {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stderr();
        build_request(args, config, &mut input, &mut output)?
    };

    tracing::info!(
        target_name = %request.target,
        region = %request.policy,
        budget = %request.budget,
        output = %request.output_dir.display(),
        "starting capture"
    );

    let reporter = ConsoleReporter;
    let report = DumpOrchestrator::new(&SystemDirectory, &LiveOpener, &FsArtifactSink, &reporter)
        .run(&request)
        .context("Failed to enumerate processes")?;

    if report.failed() > 0 {
        tracing::warn!(
            "{} of {} process(es) could not be dumped",
            report.failed(),
            report.outcomes.len()
        );
    }
    reporter.success("All done.");
    reporter.info(&format!(
        "Elapsed time: {:.3} seconds",
        report.elapsed.as_secs_f64()
    ));

    Ok(())
}

/// Merge command-line flags, interactive answers and configured defaults.
///
/// Prompts on `input`/`output` only when no target was given.
pub fn build_request<R: BufRead, W: Write>(
    args: DumpArgs,
    config: &Config,
    input: &mut R,
    output: &mut W,
) -> Result<DumpRequest> {
    let (target, grep, region, max_size) = match args.target {
        Some(target) => (target, args.grep, args.region, args.max_size_mb),
        None => {
            let answers = prompt::collect(input, output)?;
            let max_size = Some(answers.max_size_mb).filter(|s| !s.is_empty());
            (answers.target, Some(answers.grep), answers.region, max_size)
        }
    };

    Ok(DumpRequest {
        target,
        filter: grep.unwrap_or_default(),
        policy: region.unwrap_or_else(|| config.region()),
        budget: resolve_budget(max_size.as_deref(), config),
        output_dir: args.output_dir.unwrap_or_else(|| config.output_dir()),
    })
}

/// Unparsable sizes fall back to unlimited rather than failing the run
fn resolve_budget(text: Option<&str>, config: &Config) -> CaptureBudget {
    match text {
        None => config.budget(),
        Some(text) => CaptureBudget::parse_megabytes(text).unwrap_or_else(|| {
            tracing::warn!("Invalid max size '{}', capturing without a limit", text);
            CaptureBudget::UNLIMITED
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn build(args: DumpArgs, config: &Config, script: &str) -> Result<DumpRequest> {
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut output = Vec::new();
        build_request(args, config, &mut input, &mut output)
    }

    #[test]
    fn test_flags_take_precedence_over_config() {
        let config = Config {
            output_dir: Some(PathBuf::from("/var/dumps")),
            region: Some(RegionTypePolicy::StackLike),
            max_size_mb: Some(8),
        };
        let args = DumpArgs {
            target: Some("app.exe".to_string()),
            grep: Some("key".to_string()),
            region: Some(RegionTypePolicy::HeapLike),
            max_size_mb: Some("2".to_string()),
            output_dir: Some(PathBuf::from("out")),
        };

        let request = build(args, &config, "").unwrap();
        assert_eq!(request.target, "app.exe");
        assert_eq!(request.filter, "key");
        assert_eq!(request.policy, RegionTypePolicy::HeapLike);
        assert_eq!(request.budget, CaptureBudget::from_megabytes(2));
        assert_eq!(request.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_config_fills_missing_flags() {
        let config = Config {
            output_dir: Some(PathBuf::from("/var/dumps")),
            region: Some(RegionTypePolicy::StackLike),
            max_size_mb: Some(8),
        };
        let args = DumpArgs {
            target: Some("app.exe".to_string()),
            ..Default::default()
        };

        let request = build(args, &config, "").unwrap();
        assert_eq!(request.filter, "");
        assert_eq!(request.policy, RegionTypePolicy::StackLike);
        assert_eq!(request.budget, CaptureBudget::from_megabytes(8));
        assert_eq!(request.output_dir, PathBuf::from("/var/dumps"));
    }

    #[test]
    fn test_unparsable_budget_means_unlimited() {
        let config = Config {
            max_size_mb: Some(8),
            ..Default::default()
        };
        let args = DumpArgs {
            target: Some("app.exe".to_string()),
            max_size_mb: Some("lots".to_string()),
            ..Default::default()
        };

        let request = build(args, &config, "").unwrap();
        assert!(request.budget.is_unlimited());
    }

    #[test]
    fn test_prompt_when_target_missing() {
        let request = build(
            DumpArgs::default(),
            &Config::default(),
            "Game.exe\npassword\nstack\n16\n",
        )
        .unwrap();

        assert_eq!(request.target, "Game.exe");
        assert_eq!(request.filter, "password");
        assert_eq!(request.policy, RegionTypePolicy::StackLike);
        assert_eq!(request.budget, CaptureBudget::from_megabytes(16));
        assert_eq!(request.output_dir, PathBuf::from("dumps"));
    }

    #[test]
    fn test_prompt_defaults_and_bad_budget() {
        let config = Config {
            max_size_mb: Some(4),
            ..Default::default()
        };

        let defaults = build(DumpArgs::default(), &config, "app\n\n\n\n").unwrap();
        assert_eq!(defaults.policy, RegionTypePolicy::All);
        assert_eq!(defaults.budget, CaptureBudget::from_megabytes(4));

        let bad = build(DumpArgs::default(), &config, "app\n\n\nabc\n").unwrap();
        assert!(bad.budget.is_unlimited());
    }

    #[test]
    fn test_zero_budget_is_unlimited() {
        assert!(resolve_budget(Some("0"), &Config::default()).is_unlimited());
    }
}
