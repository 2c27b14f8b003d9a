use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::{Parser, Subcommand};
use printer_console::{printhost::Client, Config, Controller, StatusPoller, UploadFile, View};
use tracing_subscriber::prelude::*;

mod cmd_console;
mod terminal;

use terminal::TerminalView;

/// Drive a print host from the terminal: browse and upload files, start
/// prints, and follow the printer.
#[derive(Parser, Debug, Clone)]
#[clap(version = clap::crate_version!(), author = clap::crate_authors!("\n"))]
pub struct Opts {
    /// Print debug info
    #[clap(short, long)]
    pub debug: bool,

    /// Print logs as json
    #[clap(short, long)]
    pub json: bool,

    /// Path to config file.
    #[clap(short, long, default_value = "printer-console.toml")]
    pub config: PathBuf,

    /// URL of the print host, overriding the config file.
    #[clap(short, long, env = "PRINTER_CONSOLE_BACKEND")]
    pub backend: Option<String>,

    /// The subcommand to run.
    #[clap(subcommand)]
    pub subcmd: SubCommand,
}

/// A subcommand for our cli.
#[derive(Subcommand, Debug, Clone)]
pub enum SubCommand {
    /// List the files stored on the print host.
    Files,

    /// Upload a file to the print host.
    Upload {
        /// File to upload.
        file: PathBuf,
    },

    /// Print a stored file, and follow the job until it completes.
    Print {
        /// Name of the stored file.
        name: String,
    },

    /// Delete a stored file.
    Delete {
        /// Name of the stored file.
        name: String,
    },

    /// Get the printer status once.
    Status,

    /// Show or change the printer address.
    #[clap(subcommand)]
    Address(AddressCommand),

    /// Follow the printer status until interrupted.
    Watch,

    /// Interactive console.
    Console,
}

/// What to do with the printer address.
#[derive(Subcommand, Debug, Clone)]
pub enum AddressCommand {
    /// Show the stored printer address.
    Get,

    /// Store a new printer address.
    Set {
        /// Address of the printer, usually an IPv4 address.
        ip: String,
    },
}

async fn handle_signals() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt()).map_err(|e| {
            tracing::error!(error = format!("{:?}", e), "Failed to set up SIGINT handler");
            e
        })?;
        let mut sigterm = signal(SignalKind::terminate()).map_err(|e| {
            tracing::error!(error = format!("{:?}", e), "Failed to set up SIGTERM handler");
            e
        })?;

        tokio::select! {
            _ = sigint.recv() => {
                tracing::info!("received SIGINT");
            }
            _ = sigterm.recv() => {
                tracing::info!("received SIGTERM");
            }
        }
    }

    #[cfg(windows)]
    {
        tokio::signal::ctrl_c().await.map_err(|e| {
            tracing::error!(error = format!("{:?}", e), "Failed to set up Ctrl+C handler");
            anyhow::Error::new(e)
        })?;

        tracing::info!("received Ctrl+C (SIGINT)");
    }

    Ok(())
}

fn load_config(opts: &Opts) -> Result<Config> {
    let mut config = if opts.config.exists() {
        Config::from_file(&opts.config)
            .map_err(|e| anyhow::anyhow!("Failed to read config file {}: {}", opts.config.display(), e))?
    } else {
        tracing::debug!(path = format!("{}", opts.config.display()), "no config file, using defaults");
        Config::default()
    };
    if let Some(backend) = &opts.backend {
        config.backend.url = backend.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let opts: Opts = Opts::parse();

    let level = if opts.debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let (json, plain) = if opts.json {
        (Some(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
    };

    // Initialize tracing.
    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(plain)
        .init();

    let config = load_config(&opts)?;
    tracing::debug!(backend = config.backend.url, "connecting to print host");

    let backend = Arc::new(Client::new(&config.backend, &config.upload)?);
    let view: Arc<dyn View> = Arc::new(TerminalView::default());
    let controller = Controller::new(backend.clone(), view.clone(), &config);

    match opts.subcmd {
        SubCommand::Files => {
            controller.refresh_catalog().await?;
        }
        SubCommand::Upload { ref file } => {
            controller.upload(UploadFile::from_path(file).await?).await?;
        }
        SubCommand::Print { ref name } => {
            controller.select_file(name).await;
            controller.print_selected().await?;
            let state = controller.wait_for_job().await;
            tracing::info!(state = %state, "print job finished");
        }
        SubCommand::Delete { ref name } => {
            controller.select_file(name).await;
            controller.delete_selected().await?;
        }
        SubCommand::Status => {
            StatusPoller::new(backend, view, config.status).tick().await?;
        }
        SubCommand::Address(AddressCommand::Get) => {
            controller.load_address().await?;
        }
        SubCommand::Address(AddressCommand::Set { ref ip }) => {
            controller.edit_address().await;
            controller.save_address(ip).await?;
        }
        SubCommand::Watch => {
            let poller = StatusPoller::new(backend, view, config.status).spawn();
            handle_signals().await?;
            poller.stop();
        }
        SubCommand::Console => {
            let poller = StatusPoller::new(backend, view, config.status).spawn();
            tokio::select! {
                result = cmd_console::main(&controller) => result?,
                result = handle_signals() => result?,
            }
            poller.stop();
        }
    }

    Ok(())
}
