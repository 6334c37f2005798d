//! Command-line argument parsing for ollamaprime
//!
//! clap-based CLI. With no subcommand the full bootstrap sequence runs;
//! subcommands expose the individual steps.

use clap::{Parser, Subcommand};
use std::time::Duration;

use crate::bootstrap::{BackoffPolicy, BootstrapConfig};
use crate::config::Config;

/// ollamaprime - Make a freshly started Ollama daemon ready for use
#[derive(Parser, Debug)]
#[command(name = "ollamaprime")]
#[command(version)]
#[command(about = "Wait for Ollama, pull the models you depend on, verify", long_about = None)]
pub struct Args {
    /// Ollama host
    #[arg(long)]
    pub host: Option<String>,

    /// Ollama port
    #[arg(long)]
    pub port: Option<u16>,

    /// LLM model to provision (pulled first)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Embedding model to provision (pulled second)
    #[arg(short, long)]
    pub embed_model: Option<String>,

    /// Delay between health probes, in milliseconds
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Give up after this many failed probes (0 = wait forever)
    #[arg(long)]
    pub max_attempts: Option<u64>,

    /// Double the probe delay after each failure instead of keeping it fixed
    #[arg(long)]
    pub exponential_backoff: bool,

    /// Exit nonzero when a model pull fails
    #[arg(long)]
    pub strict: bool,

    /// Quiet mode (suppress status output and progress bars)
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Wait for the daemon to become reachable, without pulling anything
    Wait,

    /// List installed Ollama models
    Models,

    /// Display the effective configuration
    Config,
}

impl Args {
    /// Merge CLI flags over the loaded file configuration
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(ref host) = self.host {
            config.daemon.host = host.clone();
        }
        if let Some(port) = self.port {
            config.daemon.port = port;
        }
        if let Some(ref model) = self.model {
            config.models.llm = model.clone();
        }
        if let Some(ref embed) = self.embed_model {
            config.models.embedding = embed.clone();
        }
        if let Some(interval) = self.poll_interval_ms {
            config.wait.poll_interval_ms = interval;
        }
        if let Some(cap) = self.max_attempts {
            // 0 on the command line means "wait forever"
            config.wait.max_attempts = if cap == 0 { None } else { Some(cap) };
        }
        if self.strict {
            config.wait.strict = true;
        }
    }

    /// Build the bootstrapper configuration from the merged settings
    pub fn bootstrap_config(&self, config: &Config) -> BootstrapConfig {
        BootstrapConfig {
            poll_interval: Duration::from_millis(config.wait.poll_interval_ms),
            max_attempts: config.wait.max_attempts,
            backoff: if self.exponential_backoff {
                BackoffPolicy::Exponential
            } else {
                BackoffPolicy::Fixed
            },
            llm_model: config.models.llm.clone(),
            embed_model: config.models.embedding.clone(),
        }
    }
}
