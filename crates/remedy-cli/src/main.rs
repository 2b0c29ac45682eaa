mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "remedy",
    about = "Policy-gated remediation executor: run allowlisted actions and inspect the audit log",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .remedy/)
    #[arg(long, global = true, env = "REMEDY_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .remedy/ and a default config
    Init,

    /// List the permitted actions and their required parameters
    Actions,

    /// Execute an action through the policy gate
    Exec {
        /// Action name (e.g. scale_pods)
        action: String,

        /// Parameter as key=value; repeatable. Values that parse as JSON
        /// (numbers, booleans) keep their type, everything else is a string.
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,

        /// Parameters as a JSON object; merged before --param values
        #[arg(long, value_name = "JSON")]
        params_json: Option<String>,

        /// Why the action is being taken (stored in the audit log)
        #[arg(long)]
        reason: Option<String>,
    },

    /// Show audit history, newest first
    History {
        /// Filter by status: success, rejected, error
        #[arg(long)]
        status: Option<String>,

        /// Maximum number of records
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Audit record counts by status and action
    Stats,

    /// Inspect and validate the config
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Serve the HTTP API
    Serve {
        /// Port to listen on (default: server.port from config; 0 = OS-assigned)
        #[arg(long)]
        port: Option<u16>,

        /// Keep the audit log in memory instead of the configured database
        #[arg(long)]
        in_memory: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Actions => cmd::actions::run(&root, cli.json),
        Commands::Exec {
            action,
            params,
            params_json,
            reason,
        } => cmd::exec::run(
            &root,
            cmd::exec::ExecArgs {
                action,
                params,
                params_json,
                reason,
            },
            cli.json,
        ),
        Commands::History { status, limit } => {
            cmd::history::run(&root, status.as_deref(), limit, cli.json)
        }
        Commands::Stats => cmd::history::stats(&root, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
        Commands::Serve { port, in_memory } => cmd::serve::run(&root, port, in_memory),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
