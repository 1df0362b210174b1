mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;
use triage_core::{StudentId, SubmissionId, TaskId};

#[derive(Parser)]
#[command(
    name = "triage",
    about = "Work through overdue student submissions: search, remind, and upload on a student's behalf",
    version,
    propagate_version = true
)]
struct Cli {
    /// Console root (default: auto-detect from .triage/)
    #[arg(long, global = true, env = "TRIAGE_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default .triage/config.yaml
    Init {
        /// Base URL of the LMS API, e.g. https://lms.example.edu/api
        #[arg(long)]
        base_url: String,
    },

    /// Show or validate the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Load the overdue list and print it
    List {
        /// Only rows whose student name, email, or task title contain TERM
        #[arg(long, short)]
        search: Option<String>,
    },

    /// Send an overdue reminder to a student
    Notify {
        student_id: StudentId,
        task_id: TaskId,
    },

    /// Upload FILE as the submission for overdue row ID
    Submit { id: SubmissionId, file: PathBuf },

    /// Serve the HTTP API and notice stream
    Serve {
        /// Port to listen on (0 = OS-assigned)
        #[arg(long, default_value = "3141")]
        port: u16,
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
        Commands::Init { base_url } => cmd::init::run(&root, &base_url),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
        Commands::List { search } => cmd::list::run(&root, search.as_deref(), cli.json),
        Commands::Notify {
            student_id,
            task_id,
        } => cmd::notify::run(&root, student_id, task_id, cli.json),
        Commands::Submit { id, file } => cmd::submit::run(&root, id, &file, cli.json),
        Commands::Serve { port } => cmd::serve::run(&root, port),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
