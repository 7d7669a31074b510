//! Terminal questionnaire
//!
//! Walks the form field by field on stdin/stdout. Out-of-range and
//! unparseable input re-prompts; bounds are enforced here and only here.
//! Every answered control is explicit — pressing Enter keeps the displayed
//! initial value, it does not mean "no opinion".

use crate::assemble::record::{FeatureInput, RawInputRecord, RawValue};
use crate::form::answers::FormError;
use crate::form::definition::{ControlSpec, FormDefinition, FormField};
use std::io::{BufRead, Write};

pub fn is_interactive() -> bool {
    atty::is(atty::Stream::Stdin) && atty::is(atty::Stream::Stdout)
}

/// Runs the questionnaire over arbitrary reader/writer pairs so tests can
/// drive it with buffers.
pub fn run_questionnaire<R: BufRead, W: Write>(
    form: &FormDefinition,
    input: &mut R,
    output: &mut W,
) -> Result<RawInputRecord, FormError> {
    let mut record = RawInputRecord::new();

    for field in form.fields() {
        let answer = match &field.control {
            ControlSpec::Select { labels } => ask_select(field, labels, input, output)?,
            ControlSpec::Number { min, max, initial } => {
                ask_number(field, *min, *max, *initial, input, output)?
            }
        };
        record.set(field.feature.clone(), FeatureInput::explicit(answer));
    }

    Ok(record)
}

fn ask_select<R: BufRead, W: Write>(
    field: &FormField,
    labels: &[String],
    input: &mut R,
    output: &mut W,
) -> Result<RawValue, FormError> {
    loop {
        writeln!(output, "{}", field.prompt).map_err(terminal)?;
        for (i, label) in labels.iter().enumerate() {
            writeln!(output, "  {}) {}", i + 1, label).map_err(terminal)?;
        }
        write!(output, "Select [1]: ").map_err(terminal)?;
        output.flush().map_err(terminal)?;

        let line = read_line(input)?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(RawValue::label(labels[0].clone()));
        }
        match trimmed.parse::<usize>() {
            Ok(n) if n >= 1 && n <= labels.len() => {
                return Ok(RawValue::label(labels[n - 1].clone()))
            }
            _ => {
                writeln!(output, "Enter a number between 1 and {}.", labels.len())
                    .map_err(terminal)?;
            }
        }
    }
}

fn ask_number<R: BufRead, W: Write>(
    field: &FormField,
    min: f64,
    max: f64,
    initial: f64,
    input: &mut R,
    output: &mut W,
) -> Result<RawValue, FormError> {
    loop {
        write!(
            output,
            "{} ({}..{}) [{}]: ",
            field.prompt, min, max, initial
        )
        .map_err(terminal)?;
        output.flush().map_err(terminal)?;

        let line = read_line(input)?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(RawValue::number(initial));
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v >= min && v <= max => return Ok(RawValue::number(v)),
            Ok(v) => {
                writeln!(output, "{} is outside {}..{}.", v, min, max).map_err(terminal)?;
            }
            Err(_) => {
                writeln!(output, "Enter a number.").map_err(terminal)?;
            }
        }
    }
}

fn read_line<R: BufRead>(input: &mut R) -> Result<String, FormError> {
    let mut line = String::new();
    let n = input.read_line(&mut line).map_err(terminal)?;
    if n == 0 {
        return Err(FormError::Aborted {
            message: "unexpected end of input".to_string(),
        });
    }
    Ok(line)
}

fn terminal(source: std::io::Error) -> FormError {
    FormError::Terminal { source }
}
