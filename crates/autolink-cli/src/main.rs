mod config;
mod remote;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use autolink_client::{Autolink, BatchReport, Client};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{config::load_config, remote::HttpPluginApi};

#[derive(Parser, Debug)]
#[command(name = "autolink", author, version, about = "Manage autolink plugin rules")]
struct Cli {
    /// Sets the log level (error, warn, info, debug, trace).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Configuration file with the server address and credentials.
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "autolink.toml",
        global = true
    )]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Install the links found in a JSON file (a single link or an array).
    Add {
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,
        /// Keep installing after a failure and report every failed link.
        #[arg(long)]
        keep_going: bool,
    },
    /// Delete links by name.
    Delete {
        #[arg(value_name = "NAME", required = true)]
        names: Vec<String>,
        /// Keep deleting after a failure and report every failed name.
        #[arg(long)]
        keep_going: bool,
    },
    /// Print the links matching NAME as JSON. The name is sent to the plugin unchanged.
    Get {
        #[arg(value_name = "NAME", default_value = "")]
        name: String,
    },
    /// Interact with configuration files.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Validates the provided configuration file.
    Validate {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Prints the bundled example configuration.
    Example,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    match cli.command {
        Commands::Add { file, keep_going } => handle_add(&cli.config, &file, keep_going),
        Commands::Delete { names, keep_going } => handle_delete(&cli.config, &names, keep_going),
        Commands::Get { name } => handle_get(&cli.config, &name),
        Commands::Config { command } => handle_config(command),
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}

fn connect(config_path: &Path) -> Result<Client<HttpPluginApi>> {
    let cfg = load_config(config_path)?;
    let api = HttpPluginApi::new(&cfg.server)?;
    tracing::debug!(server = cfg.server.url, route = cfg.client.route(), "client configured");
    Client::with_config(api, &cfg.client)
}

fn handle_add(config_path: &Path, file: &Path, keep_going: bool) -> Result<()> {
    let links = read_links(file)?;
    let client = connect(config_path)?;
    if keep_going {
        return finish_batch("installed", client.add_each(&links));
    }
    client.add(&links)?;
    tracing::info!(count = links.len(), "autolinks installed");
    Ok(())
}

fn handle_delete(config_path: &Path, names: &[String], keep_going: bool) -> Result<()> {
    let client = connect(config_path)?;
    if keep_going {
        return finish_batch("deleted", client.delete_each(names));
    }
    client.delete(names)?;
    tracing::info!(count = names.len(), "autolinks deleted");
    Ok(())
}

fn handle_get(config_path: &Path, name: &str) -> Result<()> {
    let client = connect(config_path)?;
    let links = client.get(name)?;
    println!("{}", serde_json::to_string_pretty(&links)?);
    Ok(())
}

fn handle_config(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Validate { file } => {
            load_config(&file)?;
            println!("configuration OK: {}", file.display());
        }
        ConfigCommands::Example => {
            println!("{}", include_str!("../autolink.example.toml"));
        }
    }
    Ok(())
}

fn finish_batch(verb: &str, report: BatchReport) -> Result<()> {
    for failure in &report.failures {
        tracing::error!(
            index = failure.index,
            name = failure.name,
            error = %failure.error,
            "autolink was not {verb}"
        );
    }
    tracing::info!(count = report.applied, "autolinks {verb}");
    if !report.is_complete() {
        bail!(
            "{} of {} autolinks failed",
            report.failures.len(),
            report.failures.len() + report.applied
        );
    }
    Ok(())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LinkFile {
    Many(Vec<Autolink>),
    One(Autolink),
}

fn read_links(path: &Path) -> Result<Vec<Autolink>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read links file {}", path.display()))?;
    parse_links(&data).with_context(|| format!("failed to parse links file {}", path.display()))
}

fn parse_links(data: &str) -> Result<Vec<Autolink>> {
    let links = match serde_json::from_str::<LinkFile>(data)? {
        LinkFile::Many(links) => links,
        LinkFile::One(link) => vec![link],
    };
    Ok(links)
}
