use clap::{Parser, ValueEnum};
use color_eyre::eyre::Result;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use zpm::interpreter::context::StdioContext;
use zpm::interpreter::error::InterpreterError;
use zpm::interpreter::formatter::{BasicFormatter, PrettyFormatter, ValueFormatter};
use zpm::interpreter::Interpreter;

#[derive(Debug, Parser)]
#[clap(name = "zpm", version, about = "Runs a ZPM script")]
pub struct CLArgs {
    /// The .zpm file to run
    pub path: PathBuf,
    /// Print every variable once the script finishes
    #[clap(long)]
    pub dump: bool,
    #[clap(long = "errors", value_enum, default_value = "basic")]
    pub errors: ErrorFormat,
    /// Print the tokens of every line instead of running the script
    #[clap(long, value_enum)]
    pub tokenize: Option<TokenFormat>,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum TokenFormat {
    Debug,
    Basic,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ErrorFormat {
    Basic,
    Pretty,
}

fn main() -> ExitCode {
    zpm_main().expect("Encountered an error!")
}

fn zpm_main() -> Result<ExitCode> {
    color_eyre::install().expect("Can't fail at first call!");
    init_logging()?;
    let args = CLArgs::parse();
    match args.tokenize {
        Some(ref format) => tokenize(&args, format),
        None => Ok(run(&args)),
    }
}

fn init_logging() -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

fn run(args: &CLArgs) -> ExitCode {
    let formatter: Box<dyn ValueFormatter + '_> = match args.errors {
        ErrorFormat::Basic => Box::new(BasicFormatter),
        ErrorFormat::Pretty => Box::new(PrettyFormatter::new(&args.path)),
    };

    let mut interpreter = Interpreter::new(StdioContext);
    match interpreter.run_file(&args.path) {
        Ok(()) => {
            if args.dump {
                for (name, value) in interpreter.environment().iter() {
                    println!("{name} = {}", formatter.format(value));
                }
            }
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("{}", formatter.format_error(&error));
            match error {
                InterpreterError::Runtime { .. } => ExitCode::from(65),
                InterpreterError::Io(_) => ExitCode::from(66),
            }
        }
    }
}

fn tokenize(args: &CLArgs, format: &TokenFormat) -> Result<ExitCode> {
    use zpm::lexer::formatter::{BasicFormatter, DebugFormatter, ToFormatter, TokenFormatter};
    use zpm::lexer::{Lexer, TokenKind};

    eprintln!("Tokenizing {:?}...", args.path);
    let reader = BufReader::new(File::open(&args.path)?);
    let mut succeeded = true;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = index as u32 + 1;
        let mut scanner = Lexer::new(&line);
        let formatter: Box<dyn TokenFormatter + '_> = match format {
            TokenFormat::Debug => Box::new(ToFormatter::<DebugFormatter>::create_formatter(
                &scanner,
                line_number,
            )),
            TokenFormat::Basic => Box::new(ToFormatter::<BasicFormatter>::create_formatter(
                &scanner,
                line_number,
            )),
        };
        loop {
            match scanner.next_token() {
                Ok(token) => {
                    if matches!(token.kind, TokenKind::Eof) {
                        break;
                    }
                    println!("{}", formatter.format(&token));
                }
                Err(error) => {
                    eprintln!("{}", formatter.format_lexical_error(&error));
                    succeeded = false;
                }
            }
        }
    }
    println!("EOF");

    match succeeded {
        true => Ok(ExitCode::SUCCESS),
        false => Ok(ExitCode::from(65)),
    }
}
