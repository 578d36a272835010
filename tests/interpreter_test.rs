use std::{
    fs::{read_dir, read_to_string},
    path::Path,
};

use color_eyre::{eyre::Context, Result};
use proptest::prelude::*;
use zpm::{
    interpreter::{
        context::BufferedContext,
        error::InterpreterError,
        formatter::{BasicFormatter, ValueFormatter},
        Interpreter,
    },
    lexer::Span,
    value::{error::RuntimeErrorKind, Operator, Value, ValueTag},
};

fn run(source: &str) -> (Interpreter<BufferedContext>, Result<(), InterpreterError>) {
    let mut interpreter = Interpreter::new(BufferedContext::new());
    let result = interpreter.run_source(source);
    (interpreter, result)
}

fn variable(interpreter: &Interpreter<BufferedContext>, name: &str) -> Option<Value> {
    interpreter.environment().access(name).cloned()
}

#[test]
fn test_all() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/in");
    let output_dir = Path::new("./test_data/interpreter/out");

    let mut succeeded = true;
    for entry in read_dir(input_dir).context("Failed to open input test data folder")? {
        let entry = entry?;
        let path = entry.path();

        let Some(extension) = path.extension() else {
            continue;
        };

        if extension != "zpm" {
            continue;
        }

        let test_name = path
            .file_name()
            .expect("File name can't be none as the path is to a real file.")
            .to_string_lossy()
            .into_owned();
        let expected = {
            let output_path = output_dir.join(Path::new(&test_name).with_extension("txt"));
            read_to_string(output_path).context("Failed to open output test data file")?
        };

        println!("Checking {test_name}");
        let res = std::panic::catch_unwind(|| {
            let mut interpreter = Interpreter::new(BufferedContext::new());
            let result = interpreter.run_file(&path);
            let mut actual = interpreter.into_context().into_data();
            if let Err(error) = result {
                actual.push_str(&BasicFormatter.format_error(&error));
                actual.push('\n');
            }
            assert_eq!(expected, actual, "Failed test {test_name}");
        });
        if res.is_err() {
            println!("\tFails test case {test_name}");
            succeeded = false;
        }
    }

    assert!(succeeded);
    Ok(())
}

#[test]
fn compound_add_is_type_homogeneous() {
    let (interpreter, result) = run("a = 1; a += 2;\ns = \"x\"; s += \"y\";");
    assert!(result.is_ok());
    assert_eq!(variable(&interpreter, "a"), Some(Value::Integer(3)));
    assert_eq!(variable(&interpreter, "s"), Some(Value::from("xy")));

    let (interpreter, result) = run("a = 1; a += \"y\";");
    let error = result.unwrap_err();
    assert_eq!(
        error.runtime_kind(),
        Some(&RuntimeErrorKind::TypeMismatch {
            operator: Operator::Add,
            target: ValueTag::Integer,
            operand: ValueTag::Text,
        })
    );
    assert_eq!(error.line(), Some(1));
    assert_eq!(variable(&interpreter, "a"), Some(Value::Integer(1)));
}

#[test]
fn unseen_names_start_from_zero() {
    let (interpreter, result) = run("b -= 5;\nm *= 3;\nq \\= 4;");
    assert!(result.is_ok());
    assert_eq!(variable(&interpreter, "b"), Some(Value::Integer(-5)));
    assert_eq!(variable(&interpreter, "m"), Some(Value::Integer(0)));
    assert_eq!(variable(&interpreter, "q"), Some(Value::Integer(0)));
}

#[test]
fn division_by_zero_halts_before_mutation() {
    let (interpreter, result) = run("c = 10;\nc \\= 0;\nc = 99;");
    let error = result.unwrap_err();
    assert_eq!(error.runtime_kind(), Some(&RuntimeErrorKind::DivisionByZero));
    assert_eq!(error.line(), Some(2));
    assert_eq!(variable(&interpreter, "c"), Some(Value::Integer(10)));
}

#[test]
fn failed_compound_assignment_leaves_zero_behind() {
    let (interpreter, result) = run("d \\= 0;");
    assert_eq!(
        result.unwrap_err().runtime_kind(),
        Some(&RuntimeErrorKind::DivisionByZero)
    );
    assert_eq!(variable(&interpreter, "d"), Some(Value::Integer(0)));
}

#[test]
fn undefined_operand_does_not_create_target() {
    let (interpreter, result) = run("e += missing;");
    assert_eq!(
        result.unwrap_err().runtime_kind(),
        Some(&RuntimeErrorKind::UndefinedVariable("missing".into()))
    );
    assert!(interpreter.environment().is_empty());
}

#[test]
fn loop_iterations_do_not_accumulate() {
    let (interpreter, result) = run("FOR 3 x = 0; x += 1; ENDFOR");
    assert!(result.is_ok());
    assert_eq!(variable(&interpreter, "x"), Some(Value::Integer(1)));
}

#[test]
fn loop_count_is_fixed_at_entry() {
    let (interpreter, result) = run("n = 2;\nFOR n n += 10; ENDFOR");
    assert!(result.is_ok());
    assert_eq!(variable(&interpreter, "n"), Some(Value::Integer(22)));
}

#[test]
fn negative_loop_count_runs_zero_times() {
    let (interpreter, result) = run("FOR -3 x = 1; ENDFOR");
    assert!(result.is_ok());
    assert!(interpreter.environment().is_empty());
}

#[test]
fn text_loop_count_is_malformed() {
    let (_, result) = run("n = \"three\";\nFOR n x = 1; ENDFOR");
    let error = result.unwrap_err();
    assert!(matches!(
        error.runtime_kind(),
        Some(RuntimeErrorKind::MalformedStatement(_))
    ));
    assert_eq!(error.line(), Some(2));
}

#[test]
fn loops_do_not_advance_the_line_counter() {
    let (interpreter, result) = run("FOR 3 x += 1; ENDFOR\nPRINT y;");
    let error = result.unwrap_err();
    assert_eq!(error.line(), Some(2));
    assert_eq!(interpreter.line(), 2);
}

#[test]
fn loop_body_errors_point_into_the_line() {
    let (_, result) = run("FOR 2 y = z; ENDFOR");
    match result.unwrap_err() {
        InterpreterError::Runtime { line, error, .. } => {
            assert_eq!(line, 1);
            assert_eq!(error.kind, RuntimeErrorKind::UndefinedVariable("z".into()));
            assert_eq!(error.span, Span::new(10, 11));
        }
        other => panic!("Expected a runtime error but got {other:?}"),
    }
}

#[test]
fn print_of_undefined_variable_prints_nothing() {
    let (interpreter, result) = run("PRINT y;");
    assert_eq!(
        result.unwrap_err().runtime_kind(),
        Some(&RuntimeErrorKind::UndefinedVariable("y".into()))
    );
    assert_eq!(interpreter.context().data(), "");
}

#[test]
fn print_quotes_text_only() {
    let (interpreter, result) = run("n = -4;\nt = \"a b\";\nPRINT n;\nPRINT t;");
    assert!(result.is_ok());
    assert_eq!(interpreter.into_context().into_data(), "n = -4\nt = \"a b\"\n");
}

#[test]
fn missing_terminator_is_malformed() {
    let (interpreter, result) = run("x = 1");
    assert!(matches!(
        result.unwrap_err().runtime_kind(),
        Some(RuntimeErrorKind::MalformedStatement(_))
    ));
    assert!(interpreter.environment().is_empty());
}

#[test]
fn oversized_literal_overflows() {
    let (_, result) = run("x = 99999999999999999999;");
    assert_eq!(
        result.unwrap_err().runtime_kind(),
        Some(&RuntimeErrorKind::ArithmeticOverflow)
    );
}

#[test]
fn unlexable_lines_are_ignored() {
    let (interpreter, result) = run("\n   \n@@@ !!!\nx = 1;");
    assert!(result.is_ok());
    assert_eq!(interpreter.line(), 4);
    assert_eq!(variable(&interpreter, "x"), Some(Value::Integer(1)));
}

fn assert_malformed_at(source: &str, line: u32, text: &str) {
    let (interpreter, result) = run(source);
    match result.unwrap_err() {
        InterpreterError::Runtime {
            line: error_line,
            text: line_text,
            error,
        } => {
            assert!(
                matches!(error.kind, RuntimeErrorKind::MalformedStatement(_)),
                "{source}: {error}"
            );
            assert_eq!(error_line, line, "{source}");
            assert_eq!(&line_text[error.span.range()], text, "{source}");
        }
        other => panic!("Expected a runtime error but got {other:?}"),
    }
    assert_eq!(interpreter.context().data(), "", "{source}");
}

#[test]
fn unreadable_text_beside_a_statement_is_malformed() {
    assert_malformed_at("café = 1;\nPRINT caf;", 1, "café");
    assert_malformed_at("w = 1.;", 1, ".");
    assert_malformed_at("y = 7 @ ;", 1, "@");
    assert_malformed_at("z = +4;", 1, "+");
    assert_malformed_at("x = 5abc;", 1, "5abc");
}

#[test]
fn unreadable_text_stops_before_the_statement_runs() {
    let (interpreter, result) = run("a = 1;\na = 10x;");
    assert_eq!(result.unwrap_err().line(), Some(2));
    assert_eq!(variable(&interpreter, "a"), Some(Value::Integer(1)));

    let (interpreter, result) = run("caf = 3;\ncafé += 1;");
    assert!(result.is_err());
    assert_eq!(variable(&interpreter, "caf"), Some(Value::Integer(3)));
}

#[test]
fn unreadable_text_in_a_loop_body_points_into_the_line() {
    assert_malformed_at("FOR 2 x += 1.; ENDFOR", 1, ".");
    assert_malformed_at("FOR 2 x += 3y; ENDFOR", 1, "3y");
}

#[test]
fn missing_file_is_an_io_error() {
    let mut interpreter = Interpreter::new(BufferedContext::new());
    let result = interpreter.run_file(Path::new("./test_data/does_not_exist.zpm"));
    assert!(matches!(result, Err(InterpreterError::Io(_))));
}

#[test]
fn runs_are_deterministic() {
    let source = "a = 3;\nFOR 2 PRINT a; a *= a; ENDFOR\ns += \"z\";\nPRINT s;";
    let (first, first_result) = run(source);
    let (second, second_result) = run(source);
    assert!(first_result.is_ok() && second_result.is_ok());

    let first_store: Vec<(String, Value)> = first
        .environment()
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect();
    let second_store: Vec<(String, Value)> = second
        .environment()
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect();
    assert_eq!(first_store, second_store);
    assert_eq!(
        first.into_context().into_data(),
        second.into_context().into_data()
    );
}

fn identifier_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z_][a-zA-Z0-9_]{0,12}".prop_filter("Keywords are not identifiers", |s: &String| {
        !matches!(s.as_str(), "FOR" | "ENDFOR" | "PRINT")
    })
}

proptest! {
    #[test]
    fn integer_assignment_stores_integer(name in identifier_strategy(), value in any::<i64>()) {
        let (interpreter, result) = run(&format!("{name} = {value};"));
        prop_assert!(result.is_ok());
        prop_assert_eq!(variable(&interpreter, &name), Some(Value::Integer(value)));
    }

    #[test]
    fn text_assignment_strips_quotes(name in identifier_strategy(), text in "[^\"\n\r]*") {
        let (interpreter, result) = run(&format!("{name} = \"{text}\";"));
        prop_assert!(result.is_ok());
        prop_assert_eq!(variable(&interpreter, &name), Some(Value::from(text.as_str())));
    }

    #[test]
    fn interpreter_never_panics(line in "[ -~]{0,60}") {
        let mut interpreter = Interpreter::new(BufferedContext::new());
        let _ = interpreter.execute_line(&line);
        prop_assert_eq!(interpreter.line(), 1);
    }
}
