mod builtins;
mod config;
mod env;
mod error;
mod eval;
mod parser;
mod sandbox;
mod tokenizer;
mod value;

use std::path::PathBuf;

use clap::Parser as ClapParser;
use config::{FsConfig, CONTINUATION_PROMPT, HISTORY_FILE, PROMPT, WELCOME_MESSAGE, WELCOME_SUBTITLE};
use env::Environment;
use error::SchemeError;
use parser::Parser as SchemeParser;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use sandbox::Sandbox;

/// A tree-walking interpreter for a subset of Scheme.
#[derive(ClapParser, Debug)]
#[command(name = "tiny-scm")]
#[command(version = config::VERSION)]
#[command(about = "A tree-walking Scheme interpreter")]
struct CliArgs {
    /// Load and evaluate these files on startup, in order, before entering the REPL.
    #[arg(long = "load", value_name = "FILE", action = clap::ArgAction::Append)]
    load: Vec<PathBuf>,

    /// Print the parsed syntax of each input instead of evaluating it.
    #[arg(long = "ast")]
    ast: bool,

    /// Add an allow-listed directory `load`/`load-all` may read from (repeatable).
    #[arg(long = "fs-sandbox", value_name = "PATH", action = clap::ArgAction::Append)]
    fs_sandbox: Vec<PathBuf>,

    /// Largest file in bytes that `load`/`load-all` will read.
    #[arg(long = "max-file-size", value_name = "BYTES", default_value_t = FsConfig::default().max_file_size)]
    max_file_size: usize,

    /// Skip loading the bundled prelude.
    #[arg(long = "no-stdlib")]
    no_stdlib: bool,

    /// Accepted but not auto-loaded unless named via --load.
    #[arg(value_name = "FILE")]
    filename: Vec<PathBuf>,
}

fn build_fs_config(args: &CliArgs) -> FsConfig {
    let allowed_paths = if args.fs_sandbox.is_empty() {
        FsConfig::default().allowed_paths
    } else {
        args.fs_sandbox.clone()
    };
    FsConfig {
        allowed_paths,
        max_file_size: args.max_file_size,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let sandbox = Sandbox::new(build_fs_config(&args))?;
    builtins::set_sandbox(sandbox);

    let env = Environment::new();
    builtins::register_all(&env);

    if !args.no_stdlib {
        if let Err(e) = builtins::load::eval_source(config::PRELUDE, &env) {
            eprintln!("Warning: failed to load prelude: {}", e);
        }
    }

    for path in &args.load {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
        if let Err(e) = builtins::load::eval_source(&contents, &env) {
            eprintln!("Error: failed loading {}: {}", path.display(), e);
        }
    }

    run_repl(&env, args.ast)?;
    Ok(())
}

fn run_repl(env: &Environment, ast_mode: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::builder().auto_add_history(true).build();
    let mut rl: Editor<(), DefaultHistory> =
        Editor::with_config(config).map_err(|e| format!("failed to initialize REPL: {}", e))?;
    let _ = rl.load_history(HISTORY_FILE);

    println!("{}", WELCOME_MESSAGE);
    println!("{}", WELCOME_SUBTITLE);

    let mut scheme_parser = SchemeParser::new();
    loop {
        let prompt = if scheme_parser.is_buffer_empty() { PROMPT } else { CONTINUATION_PROMPT };
        match rl.readline(prompt) {
            Ok(line) => {
                if line.trim().is_empty() && scheme_parser.is_buffer_empty() {
                    continue;
                }
                let mut lines = std::iter::once(line);
                let mut next_line = move || lines.next();
                match scheme_parser.parse(&mut next_line) {
                    Ok(expr) => {
                        for warning in scheme_parser.warnings.drain(..) {
                            eprintln!("Warning: {}", warning);
                        }
                        if ast_mode {
                            println!("{}", expr.print_string());
                            continue;
                        }
                        match eval::eval(expr, env.clone()) {
                            Ok(result) => println!("{}", result.print_string()),
                            Err(e) => eprintln!("Error: {}", e),
                        }
                    }
                    Err(e) if is_end_of_input(&e) => {
                        // Incomplete form: buffered tokens carry over to the next line.
                    }
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        scheme_parser = SchemeParser::new();
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C aborts whatever form was being entered, not the session.
                scheme_parser = SchemeParser::new();
                println!("^C");
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {}", err);
                break;
            }
        }
    }

    let _ = rl.save_history(HISTORY_FILE);
    Ok(())
}

fn is_end_of_input(e: &SchemeError) -> bool {
    e.is_end_of_input()
}
