use crate::model::{AlgorithmId, RunConfig, RunSummary, SpeedLevel, Status, VizEvent};
use crate::orchestrator::{self, UiCommand};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use tokio::sync::mpsc;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "sort-visualizer",
    version,
    about = "Step-by-step sorting algorithm visualizer with optional TUI"
)]
pub struct Cli {
    /// Number of values in the generated array
    #[arg(long, short = 'n', default_value_t = 20)]
    pub size: usize,

    /// Animation speed from 1 (500 ms per step) to 10 (1 ms per step).
    /// Defaults to 5 in the TUI and 10 with --text/--json; step delays apply in every mode
    #[arg(long, short, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub speed: Option<u8>,

    /// Sorting algorithm to run
    #[arg(long, short, value_enum)]
    pub algorithm: Option<AlgorithmId>,

    /// Smallest generated value
    #[arg(long, default_value_t = 5)]
    pub min_value: u32,

    /// Largest generated value
    #[arg(long, default_value_t = 100)]
    pub max_value: u32,

    /// Seed for the array generator (random if omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Start sorting as soon as the app launches (requires --algorithm)
    #[arg(long)]
    pub start: bool,

    /// Run one sort, print a text summary and exit (no TUI)
    #[arg(long)]
    pub text: bool,

    /// Run one sort, print the JSON summary and exit (no TUI)
    #[arg(long)]
    pub json: bool,

    /// Log engine lifecycle to stderr at debug level (headless modes only)
    #[arg(long, short)]
    pub verbose: bool,
}

pub async fn run(args: Cli) -> Result<()> {
    if args.text && args.json {
        return Err(anyhow::anyhow!("--text and --json are mutually exclusive"));
    }

    if !args.json && !args.text {
        #[cfg(feature = "tui")]
        {
            return crate::tui::run(args).await;
        }
        #[cfg(not(feature = "tui"))]
        {
            // Fallback when built without TUI support.
            return run_headless(args).await;
        }
    }

    run_headless(args).await
}

/// Build a `RunConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> Result<RunConfig> {
    let cfg = RunConfig {
        size: args.size,
        speed: match args.speed {
            Some(level) => SpeedLevel::new(level)?,
            None => SpeedLevel::DEFAULT,
        },
        algorithm: args.algorithm,
        min_value: args.min_value,
        max_value: args.max_value,
        seed: args.seed,
        start_on_launch: args.start,
    };
    cfg.validate()?;
    Ok(cfg)
}

/// Config for a single unattended run: starts immediately and, unless a speed
/// was given, steps at the fastest level.
fn build_headless_config(args: &Cli) -> Result<RunConfig> {
    let mut cfg = build_config(args)?;
    cfg.start_on_launch = true;
    if args.speed.is_none() {
        cfg.speed = SpeedLevel::new(SpeedLevel::MAX)?;
    }
    Ok(cfg)
}

/// Install a stderr tracing subscriber for the headless modes.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    let default = if verbose {
        "sort_visualizer=debug"
    } else {
        "sort_visualizer=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Run a single sort to completion without a TUI and print its summary.
async fn run_headless(args: Cli) -> Result<()> {
    init_tracing(args.verbose);

    let cfg = build_headless_config(&args)?;
    let algorithm = cfg
        .algorithm
        .context("--algorithm is required with --text or --json")?;

    let (out_tx, out_handle) = spawn_output_writer();
    let (evt_tx, mut evt_rx) = mpsc::unbounded_channel::<VizEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    let handle = tokio::spawn(orchestrator::run_controller(cfg, evt_tx, cmd_rx));

    if args.text {
        let _ = out_tx.send(OutputLine::Stderr(format!(
            "== {} ({} values) ==",
            algorithm.label(),
            args.size
        )));
    }

    let mut summary: Option<RunSummary> = None;
    while let Some(ev) = evt_rx.recv().await {
        match ev {
            VizEvent::Status(status) if args.text && status != Status::Ready => {
                let _ = out_tx.send(OutputLine::Stderr(format!("Status: {}", status.label())));
            }
            VizEvent::Info(info) if args.text => {
                let _ = out_tx.send(OutputLine::Stderr(info.to_message()));
            }
            VizEvent::RunCompleted { summary: s } => {
                summary = Some(*s);
                // One run per invocation; the controller drains and exits.
                let _ = cmd_tx.send(UiCommand::Quit);
            }
            _ => {}
        }
    }

    handle
        .await
        .context("controller task failed")?
        .context("sort run failed")?;
    let summary = summary.context("run ended without a result")?;

    if args.json {
        let out = serde_json::to_string_pretty(&summary)?;
        let _ = out_tx.send(OutputLine::Stdout(out));
    } else {
        for line in crate::text_summary::build_text_summary(&summary).lines {
            let _ = out_tx.send(OutputLine::Stdout(line));
        }
    }

    drop(out_tx);
    let _ = out_handle.await;
    Ok(())
}
