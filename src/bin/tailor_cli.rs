//! Tailor CLI - Staging compiler configuration
//!
//! Commands: script, validate, show, buildpack-path, usage
//! Outputs JSON to stdout, logs to stderr
//! Returns 2 on validation failure, 1 on bad flags

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use tailor_core::TailorConfig;

#[derive(Parser)]
#[command(name = "tailor-cli")]
#[command(about = "Tailor CLI - build the buildpack compiler invocation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConfigArgs {
    /// Buildpack identifier to try, in order (repeatable or comma-separated)
    #[arg(short, long = "buildpack", value_delimiter = ',')]
    buildpacks: Vec<String>,

    /// Compiler flags after `--`, e.g. -appDir=/src
    #[arg(last = true, allow_hyphen_values = true)]
    flags: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and print the compiler command line
    Script {
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Report missing flags
    Validate {
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Print every option with its value, default and usage
    Show {
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Print the directory each buildpack is unpacked under
    BuildpackPath {
        /// Buildpack identifiers (defaults to the buildpack order)
        ids: Vec<String>,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Print the compiler flag usage
    Usage,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Script { config } => {
            let config = match load_config(&config) {
                Ok(c) => c,
                Err(code) => return code,
            };

            match config.validate() {
                Ok(()) => {
                    let output = serde_json::json!({
                        "valid": true,
                        "script": config.script(),
                    });
                    print_json(&output, ExitCode::SUCCESS)
                }
                Err(e) => {
                    tracing::warn!("refusing to render script: {}", e);
                    let output = serde_json::json!({
                        "valid": false,
                        "error": e.to_string(),
                    });
                    print_json(&output, ExitCode::from(2))
                }
            }
        }

        Commands::Validate { config } => {
            let config = match load_config(&config) {
                Ok(c) => c,
                Err(code) => return code,
            };

            match config.validate() {
                Ok(()) => {
                    let output = serde_json::json!({"valid": true, "missing": []});
                    print_json(&output, ExitCode::SUCCESS)
                }
                Err(e) => {
                    let output = serde_json::json!({
                        "valid": false,
                        "missing": e.missing(),
                    });
                    print_json(&output, ExitCode::from(2))
                }
            }
        }

        Commands::Show { config } => {
            let config = match load_config(&config) {
                Ok(c) => c,
                Err(code) => return code,
            };
            print_json(config.schema().options(), ExitCode::SUCCESS)
        }

        Commands::BuildpackPath { ids, config } => {
            let config = match load_config(&config) {
                Ok(c) => c,
                Err(code) => return code,
            };

            let ids = if ids.is_empty() {
                config.buildpack_order()
            } else {
                ids
            };

            let paths: Vec<_> = ids
                .iter()
                .map(|id| {
                    let path = config.buildpack_path(id);
                    serde_json::json!({"buildpack": id, "path": path})
                })
                .collect();
            print_json(&paths, ExitCode::SUCCESS)
        }

        Commands::Usage => {
            let config = TailorConfig::new::<&str>(&[]);
            print!("{}", config.schema().usage());
            ExitCode::SUCCESS
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(args: &ConfigArgs) -> Result<TailorConfig, ExitCode> {
    let mut config = TailorConfig::new(args.buildpacks.as_slice());

    let rest = config.parse(&args.flags).map_err(|e| {
        tracing::error!("bad compiler flags: {}", e);
        error_exit(&e.to_string())
    })?;

    if !rest.is_empty() {
        let message = format!("unexpected arguments: {}", rest.join(" "));
        tracing::error!("{}", message);
        return Err(error_exit(&message));
    }

    Ok(config)
}

fn error_exit(message: &str) -> ExitCode {
    let output = serde_json::json!({ "error": message });
    print_json(&output, ExitCode::FAILURE)
}

fn print_json<T: Serialize + ?Sized>(value: &T, code: ExitCode) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(s) => {
            println!("{}", s);
            code
        }
        Err(e) => {
            eprintln!(r#"{{"error": "Failed to serialize output: {}"}}"#, e);
            ExitCode::FAILURE
        }
    }
}
