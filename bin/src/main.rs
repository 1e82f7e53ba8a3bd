use std::{
    io::{stdin, stdout, BufRead, Write},
    path::PathBuf,
};

use anyhow::{anyhow, Context};
use clap::Parser;

use interpreter::Interpreter;

#[derive(clap::Parser)]
#[command(version, about = "Evaluate expressions against a set of global variables")]
struct Args {
    /// Evaluate every line of FILE instead of starting the prompt.
    file: Option<PathBuf>,

    /// Print the syntax tree of each line as JSON before its result.
    #[arg(long)]
    dump_ast: bool,

    /// Don't seed the default globals (f_name, l_name, x, PI).
    #[arg(long)]
    no_globals: bool,

    /// Bind NAME to the value of EXPR. May be repeated.
    #[arg(
        short = 'D',
        long = "define",
        value_name = "NAME=EXPR",
        value_parser = parse_definition
    )]
    definitions: Vec<(String, String)>,
}

fn parse_definition(s: &str) -> Result<(String, String), String> {
    let (name, expr) =
        s.split_once('=').ok_or_else(|| format!("expected NAME=EXPR, got `{s}`"))?;
    let name = name.trim();

    // Only names the scanner reads back as a single identifier can be referenced.
    let mut chars = name.chars();
    let is_identifier = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !is_identifier || matches!(name, "true" | "false" | "nil") {
        return Err(format!("`{name}` is not a valid variable name"));
    }
    Ok((name.to_string(), expr.to_string()))
}

struct Session {
    interpreter: Interpreter,
    dump_ast: bool,
}

impl Session {
    fn new(args: &Args) -> anyhow::Result<Self> {
        let mut interpreter = Interpreter::new();

        if !args.no_globals {
            interpreter.define("f_name", "John");
            interpreter.define("l_name", "Doe");
            interpreter.define("x", 23.45);
            interpreter.define("PI", 3.14);
        }

        for (name, expr) in &args.definitions {
            let value = interpreter
                .eval(expr)
                .with_context(|| format!("Failed to evaluate definition of `{name}`"))?;
            interpreter.define(name, value);
        }

        log::debug!("starting with {} globals", interpreter.globals().len());
        Ok(Self { interpreter, dump_ast: args.dump_ast })
    }

    fn run(&self, source: &str, output: &mut impl Write) -> std::io::Result<()> {
        let program = match parser::parse(source) {
            Ok(program) => program,
            Err(e) => return writeln!(output, "error: {e}"),
        };

        if self.dump_ast {
            writeln!(output, "{:#}", program.dump())?;
        }

        match interpreter::evaluate(&program, self.interpreter.globals()) {
            Ok(value) => writeln!(output, "ans: {value}"),
            Err(e) => writeln!(output, "error: {e}"),
        }
    }
}

fn run_file(path: PathBuf, session: &Session) -> anyhow::Result<()> {
    let bytes =
        std::fs::read(&path).map_err(|e| anyhow!("Could not read {}: {e}", path.display()))?;
    let source = String::from_utf8_lossy(&bytes);

    let mut output = stdout().lock();
    for line in source.lines().filter(|l| !l.trim().is_empty()) {
        session.run(line, &mut output)?;
    }
    Ok(())
}

fn run_prompt(
    session: &Session,
    mut input: impl BufRead,
    mut output: impl Write,
) -> anyhow::Result<()> {
    let mut buf = Vec::new();
    loop {
        write!(output, ">>> ")?;
        output.flush()?;

        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }

        // Invalid UTF-8 is replaced with U+FFFD, which the scanner then reports.
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);
        if line == "exit" {
            return Ok(());
        }

        session.run(line, &mut output)?;
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let session = Session::new(&args)?;

    match args.file {
        Some(file) => run_file(file, &session),
        None => run_prompt(&session, stdin().lock(), stdout().lock()),
    }
}
