use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::output::OutputFormat;

/// Questionnaire-driven cholecystitis risk prediction
#[derive(Parser, Debug)]
#[command(
    name = "gallrisk",
    about = "Questionnaire-driven cholecystitis risk prediction with feature attribution",
    version,
    long_about = "gallrisk collects the 17-feature clinical questionnaire, assembles the \
                  answers into the row the pre-trained classifier expects, and reports the \
                  predicted probability together with the features that drove it. Artifacts \
                  (category map, default table, model) are loaded from a local directory."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(
        short = 'v',
        long,
        global = true,
        help = "Increase verbosity (debug-level logging)"
    )]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Predict the condition probability for one submission",
        long_about = "Runs one questionnaire submission through assembly, classification and \
                      attribution ranking.\n\n\
                      Examples:\n  \
                      gallrisk predict\n  \
                      gallrisk predict --answers patient.json\n  \
                      gallrisk predict --answers patient.json --format json --top 7"
    )]
    Predict(PredictArgs),

    #[command(
        about = "Verify the artifact set against the feature catalog",
        long_about = "Loads every artifact, verifies manifest digests when present, and \
                      cross-checks the set against the built-in feature catalog.\n\n\
                      Examples:\n  \
                      gallrisk check\n  \
                      gallrisk check --artifacts /srv/models/demo --format json"
    )]
    Check(CheckArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct PredictArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Answers file (JSON object of feature id to label or number); \
                without it an interactive questionnaire runs on the terminal"
    )]
    pub answers: Option<PathBuf>,

    #[arg(
        long,
        value_name = "DIR",
        help = "Artifact directory (defaults to GALLRISK_ARTIFACTS or ./artifacts)"
    )]
    pub artifacts: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        long,
        value_name = "N",
        default_value_t = 5,
        help = "How many top contributing features to report"
    )]
    pub top: usize,

    #[arg(
        long,
        value_name = "P",
        help = "Decision threshold in (0,1) (defaults to GALLRISK_THRESHOLD or 0.5)"
    )]
    pub threshold: Option<f64>,
}

#[derive(Parser, Debug, Clone)]
pub struct CheckArgs {
    #[arg(
        long,
        value_name = "DIR",
        help = "Artifact directory (defaults to GALLRISK_ARTIFACTS or ./artifacts)"
    )]
    pub artifacts: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    Human,
    Json,
    Yaml,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Yaml => OutputFormat::Yaml,
        }
    }
}
