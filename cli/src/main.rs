//! Command-line shell around quickmail-core.
//!
//! Reads the destination from `quickmail.json`, takes the message from a file
//! or stdin, optionally puts an encoded subject line in front of it, and sends
//! it through the local Tor proxy.

mod config;

use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use quickmail_core::{encode_subject, insert_subject, Submitter};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Send a message to an onion upload endpoint through Tor
#[derive(Parser, Debug)]
#[command(name = "quickmail")]
#[command(about = "Send a message through Tor", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the configuration file (defaults to quickmail.json next to the executable)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send a message read from a file or stdin
    Send {
        /// Read the message from this file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Subject to encode and place on the first line
        #[arg(short, long)]
        subject: Option<String>,
    },
    /// Print the folded, encoded form of a subject
    EncodeSubject {
        subject: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::EncodeSubject { subject } => {
            println!("{}", encode_subject(&subject));
            Ok(())
        }
        Commands::Send { file, subject } => {
            let config_path = match cli.config {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = Config::load(&config_path)?;
            let message = read_message(file)?;
            send(&config, &message, subject.as_deref())
        }
    }
}

fn read_message(file: Option<PathBuf>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("could not read message from {}", path.display())),
        None => {
            let mut message = String::new();
            std::io::stdin()
                .read_to_string(&mut message)
                .context("could not read message from stdin")?;
            Ok(message)
        }
    }
}

fn compose(message: &str, subject: Option<&str>) -> anyhow::Result<String> {
    if message.trim().is_empty() {
        bail!("Message is empty");
    }
    Ok(match subject {
        Some(subject) => insert_subject(message, subject),
        None => message.to_string(),
    })
}

fn send(config: &Config, message: &str, subject: Option<&str>) -> anyhow::Result<()> {
    let payload = compose(message, subject)?;
    let proxy = config.proxy_config();
    info!(
        host = %config.onion_address,
        port = %config.port,
        proxy = %proxy.address(),
        bytes = payload.len(),
        "sending message"
    );
    let submitter = Submitter::with_proxy(proxy)?;
    let submitted = submitter
        .submit(&config.onion_address, &config.port, payload.as_bytes())
        .context("Send error")?;
    println!("Message sent successfully! Elapsed Time: {}", submitted.elapsed_hms());
    Ok(())
}
