//! ollamaprime - Main CLI Entry Point

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use ollamaprime::{
    bootstrap::{Bootstrapper, EXIT_CODE_PROVISION_FAILED},
    cli::{Args, Commands},
    config::Config,
    models::OllamaClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // A missing file gets created with defaults; a malformed one is a hard
    // error rather than silently falling back to the default model pair
    let mut config = Config::load()?;
    args.apply_to(&mut config);

    match &args.command {
        Some(Commands::Wait) => {
            wait_only(&args, &config).await?;
        }
        Some(Commands::Models) => {
            list_models(&config).await?;
        }
        Some(Commands::Config) => {
            show_config(&config)?;
        }
        None => {
            run_bootstrap(&args, &config).await?;
        }
    }

    Ok(())
}

/// Full sequence: wait for the daemon, pull both models, list installed
async fn run_bootstrap(args: &Args, config: &Config) -> Result<()> {
    let client = OllamaClient::new(config.daemon_url());
    let mut bootstrapper =
        Bootstrapper::new(client, args.bootstrap_config(config)).quiet(args.quiet);

    // The run future is cancel-safe, so racing it against Ctrl-C is enough
    // to support aborting a wait on a daemon that never comes up
    let report = tokio::select! {
        result = bootstrapper.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\n{} Aborted", "✗".red());
            std::process::exit(130);
        }
    };

    if !args.quiet {
        println!();
        if let Some(ref reason) = report.list_error {
            eprintln!("{} Could not list models: {}", "⚠".yellow(), reason);
        } else {
            println!("{} Installed models:", "✓".green());
            for model in &report.installed {
                println!("  {}", model);
            }
        }
    }

    if !report.all_provisioned() {
        if config.wait.strict {
            eprintln!("{} Provisioning incomplete", "✗".red());
            std::process::exit(EXIT_CODE_PROVISION_FAILED);
        }
        if !args.quiet {
            eprintln!(
                "{} Some pulls failed; continuing anyway (use --strict to enforce)",
                "⚠".yellow()
            );
        }
    }

    Ok(())
}

/// Wait for the daemon to answer a health probe, nothing else
async fn wait_only(args: &Args, config: &Config) -> Result<()> {
    let client = OllamaClient::new(config.daemon_url());
    let bootstrapper =
        Bootstrapper::new(client, args.bootstrap_config(config)).quiet(args.quiet);

    let probes = tokio::select! {
        result = bootstrapper.wait_until_ready() => result?,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\n{} Aborted", "✗".red());
            std::process::exit(130);
        }
    };

    if !args.quiet {
        println!("{} Ollama is ready ({} probe(s))", "✓".green(), probes);
    }

    Ok(())
}

/// List installed models
async fn list_models(config: &Config) -> Result<()> {
    let client = OllamaClient::new(config.daemon_url());
    let models = client.list_models().await?;

    if models.is_empty() {
        println!("No models installed");
        return Ok(());
    }

    println!("{}", "Installed models:".bold());
    for model in &models {
        println!(
            "  {:<40} {:>10}  {}",
            model.name,
            model.formatted_size(),
            model.modified_at.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}

/// Display the effective configuration (file merged with CLI flags)
fn show_config(config: &Config) -> Result<()> {
    println!("{}", "Configuration".bold());
    if let Ok(path) = Config::config_path() {
        println!("  File: {}", path.display());
    }
    println!();
    print!("{}", toml::to_string_pretty(config)?);

    Ok(())
}
