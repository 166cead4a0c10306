//! Templatify CLI
//!
//! Usage:
//!   templatify [OPTIONS] <FILE> [FUNCTION] [ARGS]...
//!
//! Options:
//!   -c, --config <FILE>  Options file (TOML format)
//!   --no-builtins        Do not seed templates with builtin functions
//!   -l, --list           List declared functions
//!   -s, --signature      Print the function's signature instead of calling it
//!   -v, --verbose        Log build details to stderr
//!   -h, --help           Print help

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use templatify::{load_functions_with_options, Arguments, TemplateOptions, Value};

#[derive(Parser)]
#[command(name = "templatify")]
#[command(about = "Render functions whose docstring is their body")]
struct Cli {
    /// Declaration file ("-" reads from stdin)
    input: PathBuf,

    /// Function to call
    function: Option<String>,

    /// Arguments: `value` binds positionally, `name=value` by name.
    /// Values are read as TOML values, falling back to plain strings.
    args: Vec<String>,

    /// Options file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Do not seed templates with builtin functions
    #[arg(long)]
    no_builtins: bool,

    /// List declared functions
    #[arg(short, long)]
    list: bool,

    /// Print the function's signature instead of calling it
    #[arg(short, long)]
    signature: bool,

    /// Log build details to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "templatify=debug"
    } else {
        "templatify=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    // Load options
    let options = match &cli.config {
        Some(path) => match TemplateOptions::from_file(path) {
            Ok(options) => options,
            Err(e) => {
                eprintln!("Error loading options '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => TemplateOptions::default(),
    };
    let options = if cli.no_builtins {
        options.with_builtins(false)
    } else {
        options
    };

    // Read input
    let filename = cli.input.display().to_string();
    let source = if filename == "-" {
        let mut buffer = String::new();
        match io::stdin().read_to_string(&mut buffer) {
            Ok(_) => buffer,
            Err(e) => {
                eprintln!("Error reading from stdin: {}", e);
                process::exit(1);
            }
        }
    } else {
        match fs::read_to_string(&cli.input) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", filename, e);
                process::exit(1);
            }
        }
    };

    let functions = match load_functions_with_options(&source, &options) {
        Ok(functions) => functions,
        Err(e) => {
            eprintln!("{}", e.format(&source, &filename));
            process::exit(1);
        }
    };

    if cli.list {
        for function in functions.iter() {
            println!("{}", function.signature());
        }
        return;
    }

    let Some(name) = cli.function else {
        eprintln!("Error: no function given (use --list to see declared functions)");
        process::exit(1);
    };
    let Some(function) = functions.get(&name) else {
        eprintln!("Error: no function named '{}' in '{}'", name, filename);
        process::exit(1);
    };

    if cli.signature {
        println!("{}", function.signature());
        return;
    }

    match function.call(&parse_arguments(&cli.args)) {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// Split `name=value` pairs from positional values
fn parse_arguments(raw: &[String]) -> Arguments {
    raw.iter().fold(Arguments::new(), |args, arg| match arg.split_once('=') {
        Some((name, value)) if is_identifier(name) => args.kwarg(name, parse_value(value)),
        _ => args.arg(parse_value(arg)),
    })
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Read a command line value as TOML, or as a plain string if that fails
fn parse_value(raw: &str) -> Value {
    #[derive(serde::Deserialize)]
    struct Wrapper {
        v: toml::Value,
    }

    match toml::from_str::<Wrapper>(&format!("v = {}", raw)) {
        Ok(wrapper) => Value::from_serialize(&wrapper.v),
        Err(_) => Value::from(raw),
    }
}
