use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use compact_str::{format_compact, CompactString};

use super::environment::Environment;
use super::error::InterpreterError;
use super::statement::{split_statements, statement_span, Fragment};
use super::SystemContext;
use crate::lexer::{tokenize_line, Span, Token, TokenKind};
use crate::value::error::{RuntimeError, RuntimeErrorKind};
use crate::value::{Operator, Value, ValueTag};

const LOOP_KEYWORD: &str = "FOR";
const LOOP_END_KEYWORD: &str = "ENDFOR";

/// One interpreter session: a variable store, the current line number and an output sink.
///
/// Every method takes `&mut self`, so a session cannot be driven from two threads at once.
pub struct Interpreter<C: SystemContext> {
    environment: Environment,
    context: C,
    line: u32,
}

impl<C> Interpreter<C>
where
    C: SystemContext,
{
    pub fn new(context: C) -> Self {
        Self {
            environment: Environment::new(),
            context,
            line: 0,
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn into_context(self) -> C {
        self.context
    }

    /// The number of physical lines consumed by the current run.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Runs the file at `path` one line at a time. The file is closed when this returns,
    /// whether or not the run failed.
    pub fn run_file(&mut self, path: &Path) -> Result<(), InterpreterError> {
        let file = File::open(path)?;
        tracing::debug!("Running {path:?}");
        self.run_reader(BufReader::new(file))
    }

    pub fn run_reader<R: BufRead>(&mut self, reader: R) -> Result<(), InterpreterError> {
        self.line = 0;
        for line in reader.lines() {
            self.execute_line(&line?)?;
        }
        Ok(())
    }

    pub fn run_source(&mut self, source: &str) -> Result<(), InterpreterError> {
        self.run_reader(source.as_bytes())
    }

    /// Lexes and executes one physical line, advancing the line counter by one.
    pub fn execute_line(&mut self, text: &str) -> Result<(), InterpreterError> {
        self.line += 1;
        tracing::trace!(line = self.line, "{text}");
        let fragment = Fragment::line(text);
        lex(fragment)
            .and_then(|tokens| self.execute_tokens(fragment, &tokens))
            .map_err(|error| InterpreterError::Runtime {
                line: self.line,
                text: text.to_string(),
                error,
            })
    }
}

// Statement interpreter
impl<C> Interpreter<C>
where
    C: SystemContext,
{
    fn execute_tokens(
        &mut self,
        fragment: Fragment,
        tokens: &[Token],
    ) -> Result<(), RuntimeError> {
        for statement in split_statements(tokens) {
            self.execute_statement(fragment, statement)?;
        }
        Ok(())
    }

    fn execute_statement(
        &mut self,
        fragment: Fragment,
        statement: &[Token],
    ) -> Result<(), RuntimeError> {
        let Some(first) = statement.first() else {
            return Ok(());
        };
        match first.kind {
            TokenKind::Loop => self.execute_loop(fragment, first),
            TokenKind::UnclosedLoop => Err(malformed(
                fragment,
                first.span,
                format_compact!("{LOOP_KEYWORD} without a matching {LOOP_END_KEYWORD}"),
            )),
            TokenKind::KeywordPrint => self.execute_print(fragment, statement),
            TokenKind::Ident => self.execute_assignment(fragment, statement),
            // Empty statement
            TokenKind::Semicolon => Ok(()),
            kind => Err(malformed(
                fragment,
                first.span,
                format_compact!("a statement cannot start with {kind}"),
            )),
        }
    }

    fn execute_print(
        &mut self,
        fragment: Fragment,
        statement: &[Token],
    ) -> Result<(), RuntimeError> {
        let keyword = &statement[0];
        let Some(target) = statement.get(1).filter(|token| token.kind == TokenKind::Ident) else {
            return Err(malformed(
                fragment,
                statement_span(statement),
                "PRINT expects a variable name".into(),
            ));
        };
        let name = fragment.lexeme(target);
        let Some(value) = self.environment.access(name) else {
            return Err(RuntimeError {
                kind: RuntimeErrorKind::UndefinedVariable(name.into()),
                span: fragment.locate(keyword.span.merge(&target.span)),
            });
        };
        self.context.writeln(&format!("{name} = {value}"));
        Ok(())
    }

    fn execute_assignment(
        &mut self,
        fragment: Fragment,
        statement: &[Token],
    ) -> Result<(), RuntimeError> {
        let target = &statement[0];
        let name = fragment.lexeme(target);
        let span = statement_span(statement);
        let mut rest = statement[1..].iter();

        let Some(operator) = rest.next().filter(|token| token.kind.is_assignment_operator())
        else {
            return Err(malformed(
                fragment,
                span,
                format_compact!("expected an assignment operator after '{name}'"),
            ));
        };
        let Some(source) = rest.next().filter(|token| {
            matches!(
                token.kind,
                TokenKind::IntegerLiteral | TokenKind::StringLiteral | TokenKind::Ident
            )
        }) else {
            return Err(malformed(
                fragment,
                span,
                format_compact!("expected a value after '{}'", fragment.lexeme(operator)),
            ));
        };
        if rest.next().map(|token| token.kind) != Some(TokenKind::Semicolon) {
            return Err(malformed(
                fragment,
                span,
                "expected ';' to end the statement".into(),
            ));
        }

        let value = self.resolve_value(fragment, source)?;
        let operator = match operator.kind {
            TokenKind::PlusEqual => Operator::Add,
            TokenKind::MinusEqual => Operator::Subtract,
            TokenKind::StarEqual => Operator::Multiply,
            TokenKind::DivideEqual => Operator::Divide,
            _ => {
                tracing::trace!("{name} = {value}");
                self.environment.assign(name, value);
                return Ok(());
            }
        };

        // An unseen target starts from zero. This happens before the operation, so a failed
        // compound assignment can still leave the zero behind.
        let current = match self.environment.access(name) {
            Some(current) => current.clone(),
            None => {
                let zero = match operator {
                    Operator::Add => Value::zero(value.tag()),
                    _ => Value::zero(ValueTag::Integer),
                };
                self.environment.assign(name, zero.clone());
                zero
            }
        };
        let result = current
            .apply(operator, &value)
            .map_err(|kind| RuntimeError {
                kind,
                span: fragment.locate(span),
            })?;
        tracing::trace!("{name} {operator} {value} -> {result}");
        self.environment.assign(name, result);
        Ok(())
    }

    fn resolve_value(&self, fragment: Fragment, token: &Token) -> Result<Value, RuntimeError> {
        let lexeme = fragment.lexeme(token);
        match token.kind {
            TokenKind::IntegerLiteral => parse_integer(fragment, token),
            TokenKind::StringLiteral => Ok(Value::Text(lexeme[1..lexeme.len() - 1].into())),
            _ => self
                .environment
                .access(lexeme)
                .cloned()
                .ok_or_else(|| RuntimeError {
                    kind: RuntimeErrorKind::UndefinedVariable(lexeme.into()),
                    span: fragment.locate(token.span),
                }),
        }
    }
}

// Loop expansion
impl<C> Interpreter<C>
where
    C: SystemContext,
{
    /// Runs `FOR <count> <body> ENDFOR`.
    ///
    /// The count is read once. The body is split into statements once, then every statement
    /// is lexed and executed again on each pass.
    fn execute_loop(&mut self, fragment: Fragment, token: &Token) -> Result<(), RuntimeError> {
        let range = token.span.range();
        let inner =
            fragment.slice(range.start + LOOP_KEYWORD.len()..range.end - LOOP_END_KEYWORD.len());
        let tokens = lex(inner)?;

        let Some((count, body)) = tokens.split_first() else {
            return Err(malformed(
                fragment,
                token.span,
                "FOR expects an iteration count".into(),
            ));
        };
        let iterations = match self.resolve_count(inner, count)? {
            Some(iterations) => iterations,
            None => {
                return Err(malformed(
                    inner,
                    count.span,
                    format_compact!(
                        "loop count must be an Integer, found '{}'",
                        inner.lexeme(count)
                    ),
                ));
            }
        };

        let statements: Vec<Fragment> = split_statements(body)
            .into_iter()
            .map(|statement| inner.slice(statement_span(statement).range()))
            .collect();

        tracing::debug!(
            line = self.line,
            iterations,
            statements = statements.len(),
            "Entering loop"
        );
        for iteration in 0..iterations.max(0) {
            tracing::trace!(iteration, "Loop pass");
            for statement in &statements {
                let tokens = lex(*statement)?;
                self.execute_tokens(*statement, &tokens)?;
            }
        }
        Ok(())
    }

    fn resolve_count(
        &self,
        fragment: Fragment,
        token: &Token,
    ) -> Result<Option<i64>, RuntimeError> {
        let count = match token.kind {
            TokenKind::IntegerLiteral => parse_integer(fragment, token)?,
            TokenKind::Ident => self.resolve_value(fragment, token)?,
            _ => return Ok(None),
        };
        match count {
            Value::Integer(count) => Ok(Some(count)),
            Value::Text(_) => Ok(None),
        }
    }
}

/// Lexes a line or a piece of one, turning unreadable text next to real tokens into a
/// malformed statement.
fn lex(fragment: Fragment) -> Result<Vec<Token>, RuntimeError> {
    tokenize_line(fragment.text).map_err(|error| {
        malformed(
            fragment,
            error.span,
            format_compact!(
                "cannot read '{}': {}",
                &fragment.text[error.span.range()],
                error.kind
            ),
        )
    })
}

fn parse_integer(fragment: Fragment, token: &Token) -> Result<Value, RuntimeError> {
    fragment
        .lexeme(token)
        .parse::<i64>()
        .map(Value::Integer)
        .map_err(|_| RuntimeError {
            kind: RuntimeErrorKind::ArithmeticOverflow,
            span: fragment.locate(token.span),
        })
}

fn malformed(fragment: Fragment, span: Span, reason: CompactString) -> RuntimeError {
    RuntimeError {
        kind: RuntimeErrorKind::MalformedStatement(reason),
        span: fragment.locate(span),
    }
}
