//! Bootstrap sequence for a freshly started Ollama daemon
//!
//! Blocks until the daemon answers health probes, issues a pull for the
//! LLM model and then the embedding model, and finally lists installed
//! models for confirmation. The retry cap and backoff policy are explicit
//! configuration instead of a hard-coded infinite loop, and every pull
//! result is surfaced in the returned report so callers can decide whether
//! a failed pull is fatal.

use crate::errors::{PrimerError, Result};
use crate::models::{ModelDaemon, ModelInfo, ProgressCallback, PullProgress};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::time::Duration;

/// Default LLM model to provision
pub const DEFAULT_LLM_MODEL: &str = "llama3.2:3b";

/// Default embedding model to provision
pub const DEFAULT_EMBED_MODEL: &str = "nomic-embed-text";

/// Exit code when --strict is set and a pull failed
pub const EXIT_CODE_PROVISION_FAILED: i32 = 2;

/// Ceiling for exponential backoff delays
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// How probe retry delays grow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffPolicy {
    /// Same delay between every probe (matches the original script)
    Fixed,
    /// Delay doubles after each failed probe, capped at 60s
    Exponential,
}

impl BackoffPolicy {
    /// Delay to sleep after the given failed attempt (1-based)
    pub fn delay(&self, base: Duration, attempt: u64) -> Duration {
        match self {
            BackoffPolicy::Fixed => base,
            BackoffPolicy::Exponential => {
                let shift = (attempt.saturating_sub(1)).min(16) as u32;
                base.saturating_mul(1u32 << shift).min(MAX_BACKOFF)
            }
        }
    }
}

/// Bootstrapper configuration
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    /// Base delay between health probes
    pub poll_interval: Duration,

    /// Probe cap; `None` waits forever (the original script's behavior)
    pub max_attempts: Option<u64>,

    /// Retry delay growth
    pub backoff: BackoffPolicy,

    /// LLM model, pulled first
    pub llm_model: String,

    /// Embedding model, pulled second
    pub embed_model: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            max_attempts: None,
            backoff: BackoffPolicy::Fixed,
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            embed_model: DEFAULT_EMBED_MODEL.to_string(),
        }
    }
}

/// Where the bootstrap sequence currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Waiting,
    Ready,
    Provisioning,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Waiting => "waiting",
            Phase::Ready => "ready",
            Phase::Provisioning => "provisioning",
            Phase::Done => "done",
        };
        write!(f, "{}", name)
    }
}

/// Result of one pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    Completed,
    Failed(String),
}

/// Outcome of a single model's provisioning step
#[derive(Debug, Clone)]
pub struct ProvisionRecord {
    pub model: String,
    pub outcome: ProvisionOutcome,
}

/// What the bootstrap run did, step by step
#[derive(Debug)]
pub struct BootstrapReport {
    /// Health probes issued before the daemon answered
    pub probes: u64,

    /// Pull results, in the order the pulls were issued
    pub provisioned: Vec<ProvisionRecord>,

    /// Models installed when the run finished (empty if listing failed)
    pub installed: Vec<ModelInfo>,

    /// Why the final listing failed, if it did
    pub list_error: Option<String>,
}

impl BootstrapReport {
    /// True if every pull completed
    pub fn all_provisioned(&self) -> bool {
        self.provisioned
            .iter()
            .all(|r| r.outcome == ProvisionOutcome::Completed)
    }
}

/// Drives the wait → pull → list sequence against a [`ModelDaemon`]
pub struct Bootstrapper<D: ModelDaemon> {
    daemon: D,
    config: BootstrapConfig,
    phase: Phase,
    quiet: bool,
}

impl<D: ModelDaemon> Bootstrapper<D> {
    /// Create a new bootstrapper
    pub fn new(daemon: D, config: BootstrapConfig) -> Self {
        Self {
            daemon,
            config,
            phase: Phase::Waiting,
            quiet: false,
        }
    }

    /// Suppress status output and progress bars
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Current phase of the sequence
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Poll the daemon until it answers a health probe
    ///
    /// Returns the number of probes issued (1 for immediate success). With
    /// `max_attempts: None` this never gives up; the future is cancel-safe,
    /// so callers can race it against a shutdown signal.
    pub async fn wait_until_ready(&self) -> Result<u64> {
        let mut attempts: u64 = 0;

        loop {
            attempts += 1;
            if self.daemon.probe().await {
                return Ok(attempts);
            }

            if let Some(cap) = self.config.max_attempts {
                if attempts >= cap {
                    return Err(PrimerError::DaemonUnreachable { attempts });
                }
            }

            if !self.quiet {
                eprintln!(
                    "{} Ollama not reachable yet (probe {}), retrying...",
                    "⏳".yellow(),
                    attempts
                );
            }

            let delay = self.config.backoff.delay(self.config.poll_interval, attempts);
            tokio::time::sleep(delay).await;
        }
    }

    /// Issue one pull request for the named model
    ///
    /// Exactly one call per invocation, no pre-check and no retry; the
    /// daemon treats a pull of an installed model as a fast no-op. The
    /// result is returned rather than enforced.
    pub async fn ensure_model_present(&self, name: &str) -> ProvisionOutcome {
        let callback = if self.quiet {
            None
        } else {
            Some(pull_progress_bar(name))
        };

        match self.daemon.pull_model(name, callback).await {
            Ok(()) => ProvisionOutcome::Completed,
            Err(e) => ProvisionOutcome::Failed(e.to_string()),
        }
    }

    /// Query the daemon's installed models
    pub async fn list_installed(&self) -> Result<Vec<ModelInfo>> {
        self.daemon.list_models().await
    }

    /// Run the full sequence: wait, pull LLM, pull embedding, list
    ///
    /// Only an unreachable daemon (probe cap exhausted) is an error. Pull
    /// failures and a failed final listing are recorded in the report, and
    /// the listing is always attempted once after both pulls.
    pub async fn run(&mut self) -> Result<BootstrapReport> {
        self.phase = Phase::Waiting;
        let probes = self.wait_until_ready().await?;
        self.phase = Phase::Ready;

        if !self.quiet {
            println!("{} Ollama is ready ({} probe(s))", "✓".green(), probes);
        }

        self.phase = Phase::Provisioning;
        let models = [self.config.llm_model.clone(), self.config.embed_model.clone()];
        let mut provisioned = Vec::with_capacity(models.len());

        for model in &models {
            if !self.quiet {
                println!("{} Pulling {}...", "↓".cyan(), model.bold());
            }

            let outcome = self.ensure_model_present(model).await;

            if !self.quiet {
                match &outcome {
                    ProvisionOutcome::Completed => {
                        println!("{} Pulled {}", "✓".green(), model);
                    }
                    ProvisionOutcome::Failed(reason) => {
                        eprintln!("{} Pull of {} failed: {}", "✗".red(), model, reason);
                    }
                }
            }

            provisioned.push(ProvisionRecord {
                model: model.clone(),
                outcome,
            });
        }

        let (installed, list_error) = match self.list_installed().await {
            Ok(models) => (models, None),
            Err(e) => (Vec::new(), Some(e.to_string())),
        };

        self.phase = Phase::Done;

        Ok(BootstrapReport {
            probes,
            provisioned,
            installed,
            list_error,
        })
    }
}

/// Progress bar fed by the pull's NDJSON status records
fn pull_progress_bar(model: &str) -> ProgressCallback {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("Pulling {}", model));

    Box::new(move |progress: &PullProgress| {
        if progress.status == "success" {
            pb.finish_and_clear();
            return;
        }

        match (progress.completed, progress.total) {
            (Some(completed), Some(total)) if total > 0 => {
                let pct = (completed as f64 / total as f64) * 100.0;
                pb.set_message(format!("{} ({:.1}%)", progress.status, pct));
            }
            _ => pb.set_message(progress.status.clone()),
        }
        pb.tick();
    })
}
