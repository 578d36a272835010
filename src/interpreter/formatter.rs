use super::error::InterpreterError;
use crate::value::error::{RuntimeError, RuntimeErrorKind};
use crate::value::Value;
use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::path::Path;

const ARIADNE_MSG: &str = "Ariadne produces valid utf-8 strings";
const ARIADNE_WRITE_MSG: &str = "Write into buffer should not fail.";

pub trait ValueFormatter {
    fn format(&self, value: &Value) -> String;
    fn format_error(&self, error: &InterpreterError) -> String;
}

/// Single line diagnostics, e.g. `RUNTIME ERROR: Line 3: Divide by zero`.
pub struct BasicFormatter;

impl ValueFormatter for BasicFormatter {
    fn format(&self, value: &Value) -> String {
        format!("{value}")
    }

    fn format_error(&self, error: &InterpreterError) -> String {
        match error {
            InterpreterError::Runtime { line, error, .. } => {
                format!("RUNTIME ERROR: Line {line}: {}", error.kind)
            }
            InterpreterError::Io(e) => format!("IO ERROR: {e}"),
        }
    }
}

pub struct PrettyFormatter<'src> {
    path: &'src Path,
}

impl<'src> PrettyFormatter<'src> {
    pub fn new(path: &'src Path) -> Self {
        Self { path }
    }

    fn message(kind: &RuntimeErrorKind) -> &'static str {
        match kind {
            RuntimeErrorKind::UndefinedVariable(_) => {
                "Attempted to read a variable that has not been assigned yet"
            }
            RuntimeErrorKind::TypeMismatch { .. } => {
                "Attempted to combine an Integer and a Text value"
            }
            RuntimeErrorKind::DivisionByZero => "Attempted to divide by zero",
            RuntimeErrorKind::MalformedStatement(_) => "Could not make sense of this statement",
            RuntimeErrorKind::ArithmeticOverflow => "Integer arithmetic overflowed",
        }
    }

    fn label(kind: &RuntimeErrorKind) -> String {
        match kind {
            RuntimeErrorKind::UndefinedVariable(name) => {
                format!("{} has not been defined.", name.fg(Color::BrightRed))
            }
            RuntimeErrorKind::TypeMismatch {
                operator,
                target,
                operand,
            } => format!(
                "'{}' is not defined for {} and {}",
                operator.fg(Color::BrightYellow),
                target.fg(Color::BrightCyan),
                operand.fg(Color::BrightRed),
            ),
            RuntimeErrorKind::DivisionByZero => "The divisor is zero".into(),
            RuntimeErrorKind::MalformedStatement(reason) => reason.to_string(),
            RuntimeErrorKind::ArithmeticOverflow => {
                "The result does not fit in a 64-bit integer".into()
            }
        }
    }

    fn format_runtime_error(&self, line: u32, text: &str, error: &RuntimeError) -> String {
        let path_name = self.path.to_string_lossy();
        let path: &str = &path_name;
        // Pad with empty lines so the report shows the real line number.
        let padding = line.saturating_sub(1) as usize;
        let source = format!("{}{text}", "\n".repeat(padding));
        let span = error.span.shift(padding);

        let mut output = std::io::Cursor::new(Vec::new());
        Report::build(ReportKind::Error, (path, span.range()))
            .with_code(error.code())
            .with_message(Self::message(&error.kind))
            .with_label(
                Label::new((path, span.range()))
                    .with_message(Self::label(&error.kind))
                    .with_color(Color::BrightRed),
            )
            .finish()
            .write((path, Source::from(source)), &mut output)
            .expect(ARIADNE_WRITE_MSG);
        String::from_utf8(output.into_inner()).expect(ARIADNE_MSG)
    }
}

impl<'src> ValueFormatter for PrettyFormatter<'src> {
    fn format(&self, value: &Value) -> String {
        format!("{value}")
    }

    fn format_error(&self, error: &InterpreterError) -> String {
        match error {
            InterpreterError::Runtime { line, text, error } => {
                self.format_runtime_error(*line, text, error)
            }
            InterpreterError::Io(e) => {
                format!("{}: {e}", self.path.display().fg(Color::BrightRed))
            }
        }
    }
}
