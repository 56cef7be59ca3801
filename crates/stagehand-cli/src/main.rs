mod commands;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use commands::{PackageVagrantOptions, VersionBump};
use stagehand_ansible::AnsibleRunner;
use stagehand_core::Configuration;
use std::path::PathBuf;
use tracing_appender::{non_blocking::WorkerGuard, rolling};

#[derive(Parser)]
#[command(name = "stagehand")]
#[command(about = "Package staged Vagrant machines through Ansible playbooks")]
#[command(version)]
struct Cli {
    /// Root directory for machine records, boxes, and playbooks
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    /// Increase ansible-playbook output verbosity (repeatable)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Package a machine image for a pipeline stage
    #[command(subcommand)]
    Package(PackageCommands),
    /// List registered Vagrant machines and their stages
    Machines,
}

#[derive(Subcommand)]
enum PackageCommands {
    /// Package running Vagrant machines as stage updates or upgrades
    ///
    /// Each registered machine is packaged either as an update of its
    /// current stage or as an instance of the next stage in the pipeline,
    /// and its record is re-labeled to the stage it was packaged as. With
    /// --serve-local the box metadata points at the local image file, so
    /// the result can be added with `vagrant box add`.
    Vagrant {
        /// Re-package each machine at its current stage
        #[arg(short = 'd', long, conflicts_with = "upgrade")]
        update: bool,

        /// Package each machine as the next stage in the pipeline [default]
        #[arg(short = 'g', long)]
        upgrade: bool,

        /// Point box metadata at the local image file
        #[arg(short = 'l', long, conflicts_with = "serve_remote")]
        serve_local: bool,

        /// Point box metadata at the remote image URL [default]
        #[arg(short = 'r', long)]
        serve_remote: bool,

        /// Version segment to bump in the box metadata
        #[arg(short, long, value_enum)]
        bump_version: VersionBump,
    },
}

fn main() -> anyhow::Result<()> {
    let _log_guard = init_logging();

    let cli = Cli::parse();

    let configuration = match cli.home {
        Some(home) => Configuration::with_home(home),
        None => Configuration::new()?,
    };
    configuration
        .ensure_dirs()
        .context("Failed to create the stagehand home directory")?;

    match cli.command {
        Commands::Package(PackageCommands::Vagrant {
            update,
            upgrade: _,
            serve_local,
            serve_remote: _,
            bump_version,
        }) => {
            let runner = AnsibleRunner::new(configuration.playbook_directory())
                .with_verbosity(cli.verbose);
            let options = PackageVagrantOptions {
                update_current_stage: update,
                serve_local_file: serve_local,
                bump_version,
            };
            commands::package_vagrant(&configuration, &runner, &options)?;
        }
        Commands::Machines => {
            commands::machines(&configuration)?;
        }
    }

    Ok(())
}

fn stagehand_log_dir() -> anyhow::Result<PathBuf> {
    let state_dir = dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .ok_or_else(|| anyhow::anyhow!("state directory not found"))?;
    Ok(state_dir.join("stagehand").join("logs"))
}

fn init_logging() -> Option<WorkerGuard> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    if let Ok(log_dir) = stagehand_log_dir()
        && std::fs::create_dir_all(&log_dir).is_ok()
    {
        let log_path = log_dir.join("stagehand.log");
        if std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .is_ok()
        {
            let file_appender = rolling::never(&log_dir, "stagehand.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_ansi(false)
                .with_writer(non_blocking)
                .init();
            return Some(guard);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();
    None
}
