mod cmd;
mod config;
mod output;
mod state;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::{cmd_apply, cmd_destroy, cmd_query, cmd_refresh, cmd_show};
use crate::output::print_error;

/// shellstate - resources managed by shell scripts
#[derive(Parser)]
#[command(name = "shellstate")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Path to the configuration file
  #[arg(short, long, global = true, default_value = "shellstate.toml")]
  config: PathBuf,

  /// Path to the state file
  #[arg(short, long, global = true, default_value = "shellstate.state.json")]
  state: PathBuf,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Create, update and delete resources to match the configuration
  Apply,

  /// Re-read every stored resource and report drift
  Refresh,

  /// Delete every stored resource
  Destroy,

  /// Show stored resources
  Show {
    /// Output as JSON
    #[arg(long)]
    json: bool,
  },

  /// Run a data source and print its output as JSON
  Query {
    /// Name of the data source in the configuration
    name: String,

    /// Print values of a sensitive data source instead of masking them
    #[arg(long)]
    show_sensitive: bool,
  },
}

fn main() {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  if let Err(err) = run(cli) {
    print_error(&format!("{:#}", err));
    std::process::exit(1);
  }
}

fn run(cli: Cli) -> Result<()> {
  match cli.command {
    Commands::Apply => cmd_apply(&cli.config, &cli.state),
    Commands::Refresh => cmd_refresh(&cli.config, &cli.state),
    Commands::Destroy => cmd_destroy(&cli.config, &cli.state),
    Commands::Show { json } => cmd_show(&cli.state, cli.verbose, json),
    Commands::Query { name, show_sensitive } => cmd_query(&cli.config, &name, show_sensitive),
  }
}
