pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CheckArgs, CliArgs, Commands, PredictArgs};
pub use handlers::{handle_check, handle_predict};
pub use output::{OutputFormat, OutputFormatter};
