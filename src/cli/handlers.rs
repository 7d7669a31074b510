//! Subcommand bodies
//!
//! Handlers return process exit codes: 0 on success, 1 when a submission
//! fails (bad answers, assembly or model error), 2 when the artifact set or
//! configuration is unusable before any submission ran.

use std::io::{self, Write};
use std::path::PathBuf;

use tracing::error;

use crate::artifacts::context::{run_startup_checks, ModelContext};
use crate::assemble::record::RawInputRecord;
use crate::catalog::default_catalog;
use crate::cli::commands::{CheckArgs, PredictArgs};
use crate::cli::output::OutputFormatter;
use crate::config::GallriskConfig;
use crate::form::answers::{AnswerSheet, FormError};
use crate::form::definition::FormDefinition;
use crate::form::interactive::{is_interactive, run_questionnaire};
use crate::report::schema::{run_submission, ReportOptions};

pub const EXIT_OK: i32 = 0;
pub const EXIT_SUBMISSION_FAILED: i32 = 1;
pub const EXIT_STARTUP_FAILED: i32 = 2;

pub fn handle_predict(args: &PredictArgs, quiet: bool) -> i32 {
    let config = GallriskConfig::default();
    let threshold = args.threshold.unwrap_or(config.threshold);
    let effective = GallriskConfig {
        threshold,
        ..config.clone()
    };
    if let Err(e) = effective.validate() {
        error!("invalid configuration: {}", e);
        eprintln!("Error: {}", e);
        return EXIT_STARTUP_FAILED;
    }

    let dir = artifact_dir(&args.artifacts, &config);
    let ctx = match ModelContext::load(&dir, default_catalog()) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("failed to load artifacts from {}: {}", dir.display(), e);
            eprintln!("Error: {}", e);
            return EXIT_STARTUP_FAILED;
        }
    };

    let form = FormDefinition::from_context(&ctx);
    let record = match collect_record(args, &form, quiet) {
        Ok(record) => record,
        Err(e) => {
            error!("failed to collect answers: {}", e);
            eprintln!("Error: {}", e);
            return EXIT_SUBMISSION_FAILED;
        }
    };

    let opts = ReportOptions {
        threshold,
        top_k: args.top,
    };
    let report = match run_submission(&ctx, &record, &opts) {
        Ok(report) => report,
        Err(e) => {
            error!("submission failed: {}", e);
            eprintln!("Error: {}", e);
            return EXIT_SUBMISSION_FAILED;
        }
    };

    let formatter = OutputFormatter::new(args.format.into());
    match formatter.format_report(&report) {
        Ok(text) => {
            println!("{}", text);
            EXIT_OK
        }
        Err(e) => {
            error!("failed to format report: {}", e);
            eprintln!("Error: {}", e);
            EXIT_SUBMISSION_FAILED
        }
    }
}

pub fn handle_check(args: &CheckArgs) -> i32 {
    let config = GallriskConfig::default();
    let dir = artifact_dir(&args.artifacts, &config);

    let report = run_startup_checks(&dir, &default_catalog());

    let formatter = OutputFormatter::new(args.format.into());
    match formatter.format_check(&report) {
        Ok(text) => {
            println!("{}", text);
            if report.passed() {
                EXIT_OK
            } else {
                EXIT_STARTUP_FAILED
            }
        }
        Err(e) => {
            error!("failed to format check report: {}", e);
            eprintln!("Error: {}", e);
            EXIT_STARTUP_FAILED
        }
    }
}

fn artifact_dir(flag: &Option<PathBuf>, config: &GallriskConfig) -> PathBuf {
    flag.clone().unwrap_or_else(|| config.artifact_dir.clone())
}

fn collect_record(
    args: &PredictArgs,
    form: &FormDefinition,
    quiet: bool,
) -> Result<RawInputRecord, FormError> {
    match &args.answers {
        Some(path) => AnswerSheet::from_path(path)?.to_record(form),
        None => {
            if !is_interactive() {
                return Err(FormError::NotInteractive);
            }
            if !quiet {
                println!("Cholecystitis risk questionnaire ({} questions)\n", form.len());
            }
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let stdout = io::stdout();
            let mut output = stdout.lock();
            let record = run_questionnaire(form, &mut input, &mut output)?;
            writeln!(output).map_err(|source| FormError::Terminal { source })?;
            Ok(record)
        }
    }
}
