//! Command-line interface for govrun.
//!
//! Provides commands for running the governance demo, listing its stages
//! and showing the resolved configuration.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::{FunctionsClient, RemoteOperations, ScriptedBackend};
use crate::core::{
    ActivityEntry, ActivityFeed, DemoOrchestrator, ExportError, FileExportSink, RunOptions,
};
use crate::domain::{LogLevel, RunEvent, RunOutcome, RunSnapshot, Stage};

/// Response delay of the simulated backend, so a rehearsal reads like a live run
const SIMULATED_LATENCY: Duration = Duration::from_millis(150);

/// govrun - Governance demo orchestrator
#[derive(Parser, Debug)]
#[command(name = "govrun")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the governance demo end to end
    Run {
        /// Model under test
        #[arg(short, long)]
        model: String,

        /// System the model belongs to
        #[arg(short, long)]
        system: String,

        /// Tour mode: emit a navigation event before each stage
        #[arg(long)]
        tour: bool,

        /// Use the built-in simulated backend instead of a live project
        #[arg(long)]
        simulate: bool,

        /// Do not write scorecard files after the run
        #[arg(long)]
        no_export: bool,
    },

    /// List the demo stages in execution order
    Stages,

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Run {
                model,
                system,
                tour,
                simulate,
                no_export,
            } => run_demo(model, system, tour, simulate, no_export).await,
            Commands::Stages => {
                list_stages();
                Ok(())
            }
            Commands::Config => show_config(),
        }
    }
}

/// Run the demo, streaming activity to stdout
async fn run_demo(
    model: String,
    system: String,
    tour: bool,
    simulate: bool,
    no_export: bool,
) -> Result<()> {
    let config = crate::config::config()?;

    let backend: Arc<dyn RemoteOperations> = if simulate {
        Arc::new(ScriptedBackend::new().with_latency(SIMULATED_LATENCY))
    } else {
        let url = config.backend.url.clone().context(
            "No backend URL configured. Set GOVRUN_BACKEND_URL, add backend.url to \
             .govrun/config.yaml, or pass --simulate",
        )?;
        Arc::new(FunctionsClient::new(
            url,
            config.backend.api_key.clone(),
            config.backend.timeout(),
        ))
    };

    let activity = ActivityFeed::new(config.activity_capacity);
    let mut feed = activity.subscribe();
    let orchestrator = DemoOrchestrator::with_activity(backend, config.demo.clone(), activity);
    let mut events = orchestrator.subscribe();

    let mut options = RunOptions::new(model, system);
    if tour {
        options = options.tour();
    }

    let mut handle = orchestrator
        .start(options)
        .context("A demo run is already in progress")?;

    let outcome = loop {
        tokio::select! {
            result = &mut handle => break result.context("Demo task panicked")?,
            Some(entry) = feed.recv() => print_activity(&entry),
            event = events.recv() => {
                if let Ok(RunEvent::Navigate { path, .. }) = event {
                    println!("{:>12} {}", "navigate", path);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                orchestrator.stop();
            }
        }
    };

    while let Some(entry) = feed.try_recv() {
        print_activity(&entry);
    }

    let snapshot = orchestrator.snapshot();
    print_summary(&snapshot);

    if !no_export && snapshot.has_scorecard {
        let sink = FileExportSink::new(config.exports.clone());
        report_export("Scorecard", orchestrator.export_scorecard(&sink));
        report_export("Printable scorecard", orchestrator.print_scorecard(&sink));
    }

    match outcome {
        RunOutcome::Completed => {
            eprintln!("\n[Demo completed in {}s]", snapshot.elapsed_seconds);
        }
        RunOutcome::Cancelled => {
            eprintln!("\n[Demo stopped at {}]", snapshot.stage.label());
        }
        RunOutcome::Failed { error } => {
            eprintln!("\n[Demo failed: {}]", error);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_activity(entry: &ActivityEntry) {
    let level = match entry.level {
        LogLevel::Info => "info",
        LogLevel::Success => "ok",
        LogLevel::Warning => "warn",
        LogLevel::Error => "error",
    };
    println!(
        "{} {:>8} {}",
        entry.timestamp.format("%H:%M:%S"),
        level,
        entry.message
    );
}

fn print_summary(snapshot: &RunSnapshot) {
    let counters = &snapshot.counters;
    let artifacts = &snapshot.artifacts;

    println!("\nSummary");
    println!("{}", "-".repeat(40));
    println!("Stage:            {}", snapshot.stage.label());
    println!("Progress:         {:.0}%", snapshot.progress * 100.0);
    println!("Evaluations:      {}", counters.evaluations);
    println!(
        "Requests:         {} ({} blocked)",
        counters.requests, counters.blocks
    );
    println!("Drift alerts:     {}", counters.drift_alerts);
    println!("Incidents:        {}", artifacts.incident_ids.join(", "));
    println!("Pending reviews:  {}", counters.pending_reviews);
    if let Some(ref campaign) = artifacts.red_team_campaign_id {
        println!("Red-team:         {}", campaign);
    }
    if let Some(ref error) = snapshot.error {
        println!("Error:            {}", error);
    }
}

fn report_export(what: &str, result: std::result::Result<std::path::PathBuf, ExportError>) {
    match result {
        Ok(path) => println!("{} written to {}", what, path.display()),
        Err(ExportError::MissingScorecard) => {}
        Err(e) => eprintln!("{} export failed: {}", what, e),
    }
}

/// List the stage sequence
fn list_stages() {
    println!("{:<4} {:<22} {:<32} {}", "#", "STAGE", "LABEL", "VIEW");
    println!("{}", "-".repeat(72));

    for (i, stage) in Stage::SEQUENCE.iter().enumerate() {
        println!(
            "{:<4} {:<22} {:<32} {}",
            i + 1,
            stage.slug(),
            stage.label(),
            stage.tour_path().unwrap_or("-")
        );
    }
}

/// Show resolved configuration
fn show_config() -> Result<()> {
    let config = crate::config::config()?;

    println!("Home:           {}", config.home.display());
    println!("Exports:        {}", config.exports.display());
    match config.config_file {
        Some(ref path) => println!("Config file:    {}", path.display()),
        None => println!("Config file:    (none)"),
    }
    println!(
        "Backend URL:    {}",
        config.backend.url.as_deref().unwrap_or("(not set)")
    );
    println!(
        "API key:        {}",
        if config.backend.api_key.is_some() {
            "(set)"
        } else {
            "(not set)"
        }
    );
    println!("Timeout:        {}s", config.backend.timeout_seconds);
    println!("Stage delay:    {:?}", config.demo.stage_delay);
    println!("Nav settle:     {:?}", config.demo.navigation_settle);
    println!("Traffic batch:  {}", config.demo.traffic_batch_size);
    println!("Pass threshold: {}", config.demo.pass_threshold);
    println!("Attack types:   {}", config.demo.attack_types.join(", "));
    println!("Activity size:  {}", config.activity_capacity);

    Ok(())
}
