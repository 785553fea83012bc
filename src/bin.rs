use std::{
    fs::File,
    io::{self, Write},
    path::{Path, PathBuf},
    process,
    time::Instant,
};

use bfasm::{
    backend::compiler::compile,
    frontend::parser::Program,
    Error,
};
use clap::{Parser, ValueEnum};
use colored::Colorize;

/// Brainf**k to toy-VM assembly compiler
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The source file to compile
    file: PathBuf,

    /// Write the result here instead of standard output
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// What to produce
    #[arg(long, value_enum, default_value_t = Emit::Asm)]
    emit: Emit,

    /// Report each stage and its timing on standard error
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Emit {
    /// Assembly listing
    Asm,
    /// The parsed tree
    Ast,
}

fn stage<T>(verbose: bool, name: &str, f: impl FnOnce() -> T) -> T {
    if !verbose {
        return f();
    }

    eprintln!("{}", format!("Starting {name}").blue());
    let now = Instant::now();
    let result = f();
    eprintln!("{} {:.2?}", format!("Finished {name} in").green(), now.elapsed());
    result
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> Error + '_ {
    move |source| Error::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn run(args: &Args) -> Result<(), Error> {
    let source = std::fs::read(&args.file).map_err(io_error(&args.file))?;

    let program = stage(args.verbose, "parsing", || Program::parse(&source))?;

    let text = match args.emit {
        Emit::Ast => program.render(),
        Emit::Asm => stage(args.verbose, "codegen", || compile(&program))?,
    };

    // nothing is written unless every stage succeeded
    match &args.output {
        Some(path) => {
            let mut file = File::create(path).map_err(io_error(path))?;
            file.write_all(text.as_bytes()).map_err(io_error(path))?;
        }
        None => {
            let stdout = Path::new("<stdout>");
            let mut out = io::stdout().lock();
            out.write_all(text.as_bytes()).map_err(io_error(stdout))?;
            out.flush().map_err(io_error(stdout))?;
        }
    }

    Ok(())
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };

    if let Err(e) = run(&args) {
        eprintln!("{}: {e}", "error".red());
        process::exit(1);
    }
}
