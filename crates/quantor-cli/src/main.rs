//! quantor - Command-line calculator for physical quantities
//!
//! Usage:
//!   quantor "400 J to kJ"           # Single expression
//!   echo "4 m * 1 s-1" | quantor    # Pipe mode
//!   quantor -f physics.qtr          # File mode
//!   quantor -i                      # Interactive REPL
//!   quantor --server                # JSON-RPC over stdin/stdout

mod server;

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use quantor_core::{config, Config, Engine};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "quantor")]
#[command(about = "A calculator for physical quantities with units and uncertainties", long_about = None)]
struct Args {
    /// Expression to evaluate
    expression: Option<String>,

    /// Read expressions from file
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Interactive REPL mode
    #[arg(short, long)]
    interactive: bool,

    /// Show only the results (no input echo)
    #[arg(short, long)]
    quiet: bool,

    /// Use this config file instead of the one in the user config directory
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Run as a JSON-RPC 2.0 server on stdin/stdout
    #[arg(long)]
    server: bool,

    /// Log to stderr (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let loaded = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::find().context("failed to load config")?,
    };
    config::install(loaded);

    let mut engine = Engine::new();

    if args.server {
        server::run_server(&mut engine)?;
    } else if let Some(expr) = &args.expression {
        eval_and_print(&mut engine, expr, args.quiet);
    } else if let Some(path) = &args.file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        for line in content.lines() {
            eval_and_print(&mut engine, line, args.quiet);
        }
    } else if args.interactive {
        run_repl(&mut engine, args.quiet)?;
    } else if !io::stdin().is_terminal() {
        // Pipe mode
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = line?;
            eval_and_print(&mut engine, &line, args.quiet);
        }
    } else {
        eprintln!("Usage: quantor <expression>");
        eprintln!("       quantor -f <file>");
        eprintln!("       quantor -i");
        eprintln!("       echo \"4 m * 1 s-1\" | quantor");
        std::process::exit(1);
    }

    Ok(())
}

/// Logging goes to stderr so results on stdout stay machine-readable
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn eval_and_print(engine: &mut Engine, input: &str, quiet: bool) {
    let result = engine.eval(input);

    if quiet {
        if !result.is_empty() {
            println!("{}", result);
        }
    } else {
        let result_str = result.to_string();
        if result_str.is_empty() {
            println!("{}", input);
        } else {
            // Pad input to align results
            let padding = 40usize.saturating_sub(input.chars().count());
            println!("{}{:>width$} = {}", input, "", result_str, width = padding);
        }
    }
}

fn run_repl(engine: &mut Engine, quiet: bool) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("quantor - physical quantities calculator");
    println!("Type expressions to calculate. Press Ctrl+D to exit.\n");

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF
            println!();
            break;
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.to_lowercase().as_str() {
            "quit" | "exit" => break,
            "clear" => {
                engine.clear();
                println!("Cleared.");
                continue;
            }
            "vars" | "variables" => {
                for (name, value) in engine.variables() {
                    println!("{name} = {value}");
                }
                continue;
            }
            "help" => {
                print_help();
                continue;
            }
            _ => {}
        }

        eval_and_print(engine, line, quiet);
    }

    Ok(())
}

fn print_help() {
    println!(
        r#"
Commands:
  help     Show this help
  clear    Clear all variables and history
  vars     List variables
  quit     Exit the REPL

Examples:
  4 m * 1 s-1             Units follow numbers
  400 J to kJ             Unit conversion
  (20 ± 2 m) ^ 2          Uncertainty propagation
  1.234(56) m             Concise uncertainty
  50 @ °C + 50 K          Temperature scales
  300 K on °F             Place a value on a scale
  1 W on dBm              Logarithmic units
  dist = 100 m            Variable assignment
  sqrt(16), ln(2)         Functions of dimensionless values
  base(1 kJ)              Reduce to SI base units
"#
    );
}
