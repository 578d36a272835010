pub mod context;
pub mod environment;
pub mod error;
mod evaluator;
pub mod formatter;
mod statement;

pub use evaluator::Interpreter;

/// Where `PRINT` output goes.
pub trait SystemContext {
    fn writeln(&mut self, text: &str);
}
