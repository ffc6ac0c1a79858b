use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mra_editor::manager::Manager;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    #[arg(long)]
    store_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Submit {
        #[arg(long)]
        scenario: PathBuf,
    },

    List,

    Show {
        #[arg(long)]
        id: String,
    },

    Path {
        #[arg(long)]
        id: String,
    },

    Complete {
        #[arg(long)]
        id: String,

        #[arg(long)]
        result: PathBuf,
    },

    Fail {
        #[arg(long)]
        id: String,
    },

    Clean,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let mgr = Manager::new(args.store_dir).context("failed to construct mgr")?;

    match args.command {
        Command::Submit { scenario } => {
            mgr.submit_scenario(scenario)?;
        }
        Command::List => mgr.list_experiments()?,
        Command::Show { id } => mgr.show_experiment(&id)?,
        Command::Path { id } => mgr.show_path(&id)?,
        Command::Complete { id, result } => mgr.complete_experiment(&id, result)?,
        Command::Fail { id } => mgr.fail_experiment(&id)?,
        Command::Clean => mgr.clean_store()?,
    }

    Ok(())
}
