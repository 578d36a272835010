use crate::value::error::{RuntimeError, RuntimeErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InterpreterError {
    #[error("Line {line}: {error}")]
    Runtime {
        line: u32,
        /// The physical line the error happened on.
        text: String,
        #[source]
        error: RuntimeError,
    },
    #[error("Failed to read source: {0}")]
    Io(#[from] std::io::Error),
}

impl InterpreterError {
    pub fn runtime_kind(&self) -> Option<&RuntimeErrorKind> {
        match self {
            InterpreterError::Runtime { error, .. } => Some(&error.kind),
            InterpreterError::Io(_) => None,
        }
    }

    pub fn line(&self) -> Option<u32> {
        match self {
            InterpreterError::Runtime { line, .. } => Some(*line),
            InterpreterError::Io(_) => None,
        }
    }
}
