//! `vtext` command-line binary.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vtext_media::{render_sample, sample_text};
use vtext_models::JobOutcome;
use vtext_worker::args::{job_template, BatchArgs, Cli, Command, FontsArgs, RenderArgs, SampleArgs};
use vtext_worker::{run_batch, style_resolver, BatchReport, JobRunner, WorkerConfig};

#[tokio::main]
async fn main() -> ExitCode {
    // Install rustls crypto provider (required for the transcription API)
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        eprintln!("rustls crypto provider already installed");
    }

    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = WorkerConfig::from_env();
    tracing::debug!("Worker config: {:?}", config);

    match run(cli.command, config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(2)
        }
    }
}

fn init_tracing() {
    // Colored output for terminals, JSON for log collectors
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let mut env_filter = EnvFilter::from_default_env();
    if let Ok(directive) = "vtext=info".parse() {
        env_filter = env_filter.add_directive(directive);
    }

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

/// Returns whether every job succeeded.
async fn run(command: Command, config: WorkerConfig) -> anyhow::Result<bool> {
    match command {
        Command::Render(args) => render(args, config).await,
        Command::Batch(args) => batch(args, config).await,
        Command::Fonts(args) => fonts(args, &config),
        Command::Sample(args) => sample(args, &config).await,
    }
}

/// Cancellation flag raised on Ctrl-C.
fn cancel_on_ctrl_c() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received interrupt, cancelling");
            let _ = tx.send(true);
        }
    });
    rx
}

async fn render(args: RenderArgs, config: WorkerConfig) -> anyhow::Result<bool> {
    let template = job_template(
        &args.text,
        &args.style,
        &args.animation,
        &args.render,
        config.caption_limits,
    )?;
    let mut request = template.request_for(&args.input);
    request.output = args.output.clone();
    let output_dir = args.output_dir.clone().unwrap_or_else(|| config.output_dir.clone());

    let runner = JobRunner::from_config(config).context("failed to initialize job runner")?;
    let outcome = runner
        .run_request(request, &output_dir, Some(cancel_on_ctrl_c()))
        .await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }
    Ok(outcome.is_success())
}

async fn batch(args: BatchArgs, config: WorkerConfig) -> anyhow::Result<bool> {
    let template = job_template(
        &args.text,
        &args.style,
        &args.animation,
        &args.render,
        config.caption_limits,
    )?;
    let output_dir = args.output_dir.clone().unwrap_or_else(|| config.output_dir.clone());
    let jobs = args.jobs.unwrap_or(config.max_concurrent_jobs);

    let runner =
        Arc::new(JobRunner::from_config(config).context("failed to initialize job runner")?);
    let report = run_batch(
        runner,
        &args.input_dir,
        &output_dir,
        &template,
        jobs,
        Some(cancel_on_ctrl_c()),
    )
    .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(report.is_success())
}

fn fonts(args: FontsArgs, config: &WorkerConfig) -> anyhow::Result<bool> {
    let resolver = style_resolver(config);
    let report = resolver.catalog_report(args.variant());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(true);
    }

    println!("{} fonts indexed, variant {}", resolver.index().len(), args.variant());
    for entry in &report {
        match (&entry.resolved, &entry.error) {
            (Some(font), _) => {
                let mut notes = Vec::new();
                if font.family != entry.family {
                    notes.push(format!("via {}", font.family));
                }
                if font.synthetic_bold {
                    notes.push("synthetic bold".to_string());
                }
                if font.synthetic_italic {
                    notes.push("synthetic italic".to_string());
                }
                let notes = if notes.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", notes.join(", "))
                };
                println!("  {:<18} {}{}", entry.family, font.path.display(), notes);
            }
            (None, Some(error)) => println!("  {:<18} unavailable: {}", entry.family, error),
            (None, None) => println!("  {:<18} unavailable", entry.family),
        }
    }
    Ok(true)
}

async fn sample(args: SampleArgs, config: &WorkerConfig) -> anyhow::Result<bool> {
    let style = args.style.to_request().validate()?;
    let font = style_resolver(config).resolve(&style.font)?;
    for warning in font.warnings() {
        warn!("{}", warning);
    }

    let png = render_sample(&font, &style, &sample_text(args.text.as_deref()))?;
    tokio::fs::write(&args.output, png)
        .await
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!(output = %args.output.display(), font = %font.path.display(), "Wrote style sample");
    println!("{}", args.output.display());
    Ok(true)
}

fn print_outcome(outcome: &JobOutcome) {
    for warning in &outcome.warnings {
        println!("warning: {}", warning);
    }
    match (outcome.output(), outcome.failure()) {
        (Some(output), _) => println!(
            "{} -> {} ({:.1}s)",
            outcome.input.display(),
            output.display(),
            outcome.elapsed_secs
        ),
        (None, Some((kind, message))) => {
            println!("{} failed [{}]: {}", outcome.input.display(), kind, message)
        }
        (None, None) => println!("{} {}", outcome.input.display(), outcome.state),
    }
}

fn print_report(report: &BatchReport) {
    for outcome in &report.outcomes {
        print_outcome(outcome);
    }
    println!(
        "{} of {} video(s) rendered into {}",
        report.succeeded(),
        report.total(),
        report.output_dir.display()
    );
}
