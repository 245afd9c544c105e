mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::{EXIT_APPLY_ERROR, EXIT_FAILURE, EXIT_SPEC_ERROR, EXIT_STATE_ERROR};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "hitch",
    version,
    about = "Declarative reconciliation of external HTTP endpoints"
)]
struct Cli {
    /// Path to the hitch state directory.
    #[arg(long, default_value = "~/.local/share/hitch")]
    state: String,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate a resource file and print the normalized specification.
    Validate {
        /// Path to resource TOML file.
        file: PathBuf,
    },
    /// Show what apply would do, without issuing the request.
    Plan {
        /// Path to resource TOML file.
        file: PathBuf,
        /// Record name (overrides the file's `name` and the file stem).
        #[arg(long)]
        name: Option<String>,
    },
    /// Reconcile a resource: issue the HTTP exchange if needed, persist the record.
    Apply {
        /// Path to resource TOML file.
        file: PathBuf,
        /// Record name (overrides the file's `name` and the file stem).
        #[arg(long)]
        name: Option<String>,
        /// Timeout in seconds for the HTTP exchange.
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Print the stored record for a resource.
    Show {
        /// Record name.
        name: String,
    },
    /// List stored records.
    List,
    /// Remove the stored record for a resource. Never contacts the endpoint.
    Destroy {
        /// Record name.
        name: String,
    },
    /// Generate shell completions.
    Completions { shell: Shell },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("HITCH_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .init();

    let state_path = expand_tilde(&cli.state);
    let json_output = cli.json;

    let result = match cli.command {
        Commands::Validate { file } => commands::validate::run(&file, json_output),
        Commands::Plan { file, name } => {
            commands::plan::run(&state_path, &file, name.as_deref(), json_output)
        }
        Commands::Apply {
            file,
            name,
            timeout,
        } => commands::apply::run(&state_path, &file, name.as_deref(), timeout, json_output),
        Commands::Show { name } => commands::show::run(&state_path, &name, json_output),
        Commands::List => commands::list::run(&state_path, json_output),
        Commands::Destroy { name } => commands::destroy::run(&state_path, &name, json_output),
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            let code = if msg.starts_with("failed to parse resource")
                || msg.starts_with("failed to read resource")
                || msg.starts_with("invalid specification:")
                || msg.starts_with("resource error:")
            {
                EXIT_SPEC_ERROR
            } else if msg.starts_with("apply failed:") {
                EXIT_APPLY_ERROR
            } else if msg.starts_with("state error:") || msg.starts_with("state lock:") {
                EXIT_STATE_ERROR
            } else {
                EXIT_FAILURE
            };
            ExitCode::from(code)
        }
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(stripped);
        }
    }
    PathBuf::from(path)
}
