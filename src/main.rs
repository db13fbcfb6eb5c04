extern crate clap;

use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    process::ExitCode,
    time::Instant,
};

use bfc::{
    backend::{Backend, Clang},
    interpreter::ir_interpreter::run_module,
    lexer::lexer::Lexer,
    read_source,
    translator::translate,
    Result,
};
use clap::{Parser, ValueEnum};
use colored::Colorize;

/// Brainf**k compiler, lowers through LLVM IR into a native executable
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The file to compile
    #[arg()]
    file: PathBuf,

    /// Where to write the output, the executable defaults to `main`
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// What to produce
    #[arg(long, value_enum, default_value_t = Emit::Binary)]
    emit: Emit,

    /// Optimization level handed to the backend
    #[arg(short = 'O', long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(0..=3))]
    opt_level: u8,

    /// The compiler used to build & link the IR
    #[arg(long, default_value = "clang")]
    cc: String,

    /// Run the program in the IR interpreter instead of compiling it
    #[arg(long, conflicts_with = "emit")]
    run: bool,

    /// Print timings for each stage
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Emit {
    /// Output the recognised instructions
    Tokens,
    /// Output the LLVM IR module
    LlvmIr,
    /// Compile & link an executable
    Binary,
}

const DEFAULT_OUTPUT: &str = "main";

fn timed<T>(verbose: bool, stage: &str, f: impl FnOnce() -> T) -> T {
    if verbose {
        eprintln!("{} {}", "Starting".blue(), stage);
    }
    let now = Instant::now();
    let result = f();
    if verbose {
        eprintln!("{} {} in {:.2?}", "Finished".green(), stage, now.elapsed());
    }
    result
}

fn write_output(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, text)?,
        None => io::stdout().write_all(text.as_bytes())?,
    }
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let source = timed(args.verbose, "reading", || read_source(&args.file))?;

    if args.emit == Emit::Tokens {
        let tokens: String = Lexer::new(&source).map(|t| t.kind.as_char()).collect();
        return write_output(args.output.as_deref(), &format!("{}\n", tokens));
    }

    let module = timed(args.verbose, "translation", || translate(&source))?;

    if args.run {
        let execution = timed(args.verbose, "ir-interpreter", || {
            run_module(&module, Box::new(io::stdin()), Box::new(io::stdout()), None)
        })?;
        if args.verbose {
            eprintln!(
                "{} {} steps, exit code {}",
                "Executed".green(),
                execution.steps,
                execution.exit_code
            );
        }
        return Ok(());
    }

    match args.emit {
        Emit::LlvmIr => write_output(args.output.as_deref(), &module.to_string()),
        _ => {
            let output = args
                .output
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
            let backend = Clang::new(args.cc.clone(), args.opt_level);
            timed(args.verbose, &args.cc, || backend.compile(&module, &output))?;
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    // clap exits with status 2 itself on usage errors
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "bfc".red(), e);
            ExitCode::FAILURE
        }
    }
}
