pub mod schema;

pub use schema::{
    run_submission, PredictionReport, ReportOptions, SubmissionError, Verdict,
};
