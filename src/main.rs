use clap::{Parser, Subcommand};
use libra::Interpreter;
use rustyline::{error::ReadlineError, DefaultEditor};
use std::{fs, path::PathBuf};

#[derive(Parser)]
#[command(name = "libra")]
#[command(about = "An exact-arithmetic expression interpreter")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive session (the default)
    Repl,
    /// Evaluate a single line and exit
    Eval { line: Vec<String> },
    /// Execute a script file, one statement per line
    Run { file: PathBuf },
}

fn main() -> libra::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None | Some(Commands::Repl) => run_repl(),
        Some(Commands::Eval { line }) => run_line(&line.join(" ")),
        Some(Commands::Run { file }) => run_file(&file),
    }
}

/// Interactive loop: read a line, execute it, print the result or a
/// single `Error:` line, repeat. History persists across sessions.
fn run_repl() -> libra::Result<()> {
    println!("libra {}", env!("CARGO_PKG_VERSION"));
    println!("Type expressions to evaluate, 'help' for assistance, or 'exit' to quit.");
    println!();

    let mut rl = DefaultEditor::new()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    let history_path =
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".libra_history"));
    if let Some(path) = &history_path {
        let _ = rl.load_history(path);
    }

    let mut interpreter = Interpreter::new();

    loop {
        match rl.readline("> ") {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }
                if line == "exit" || line == "quit" {
                    break;
                }
                if line == "help" {
                    show_help();
                    continue;
                }

                let _ = rl.add_history_entry(line);

                match interpreter.execute(line) {
                    Ok(Some(output)) => println!("{}", output),
                    Ok(None) => {}
                    Err(e) => println!("Error: {}", e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                eprintln!("Error reading line: {}", err);
                break;
            }
        }
    }

    if let Some(path) = &history_path {
        let _ = rl.save_history(path);
    }
    Ok(())
}

/// One-shot mode: execute a single statement from the command line.
fn run_line(line: &str) -> libra::Result<()> {
    let mut interpreter = Interpreter::new();
    match interpreter.execute(line) {
        Ok(Some(output)) => {
            println!("{}", output);
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Script mode: statements share one session; a failing line reports its
/// error and the script continues, as in the interactive loop.
fn run_file(file_path: &PathBuf) -> libra::Result<()> {
    let source = fs::read_to_string(file_path)?;
    let mut interpreter = Interpreter::new();

    for line in source.lines() {
        match interpreter.execute(line) {
            Ok(Some(output)) => println!("{}", output),
            Ok(None) => {}
            Err(e) => println!("Error: {}", e),
        }
    }
    Ok(())
}

fn show_help() {
    println!("Statements:");
    println!("  expression            evaluate and print, e.g. (2 + i) * 3");
    println!("  name = expression     bind a variable, e.g. a = [[1, 2], [3, 4]]");
    println!("  name(x) = expression  define a function, e.g. f(x) = x^2 - 4");
    println!("  lhs = rhs ?           solve a polynomial equation of degree <= 2");
    println!("  expression = ?        evaluate the left side");
    println!();
    println!("Commands:");
    println!("  vars                  list the current bindings");
    println!("  angles [rad|deg]      show or set the trigonometric angle mode");
    println!("  help, exit");
    println!();
    println!("Built-in functions:");
    println!("  sin cos tan exp log sqrt abs floor ceil norm inv");
}
