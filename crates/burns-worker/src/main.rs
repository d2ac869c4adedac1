//! Slideshow assembly CLI.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use burns_media::FfmpegRunner;
use burns_worker::{discover_scene, latest_scene_dir, metrics, write_captions, Pipeline, WorkerConfig};

#[derive(Parser, Debug)]
#[command(name = "burns-worker", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble a scene's images and narration into a video.
    Render(RenderArgs),
    /// Write `speech.srt` for a scene from narration text.
    Captions(CaptionsArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Scene directory. Defaults to the newest `scene_*` under the static dir.
    #[arg(long)]
    scene_dir: Option<PathBuf>,

    /// Root holding `scene_*` directories.
    #[arg(long, env = "BURNS_STATIC_DIR")]
    static_dir: Option<PathBuf>,

    /// Maximum clips rendered concurrently.
    #[arg(long)]
    max_parallel: Option<usize>,

    /// Per-stage encoder timeout in seconds.
    #[arg(long)]
    stage_timeout: Option<u64>,

    /// Seed for the pan/zoom effects.
    #[arg(long)]
    seed: Option<u64>,

    /// Print the run report as JSON on stdout.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Parser, Debug)]
struct CaptionsArgs {
    /// Scene directory containing `speech.mp3`.
    #[arg(long)]
    scene_dir: PathBuf,

    /// Narration text.
    #[arg(long, conflicts_with = "text_file", required_unless_present = "text_file")]
    text: Option<String>,

    /// File holding the narration text.
    #[arg(long)]
    text_file: Option<PathBuf>,
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("burns_worker=info,burns_media=info"));

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
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

/// Executor with the configured timeout, cancelled on Ctrl-C.
fn build_runner(config: &WorkerConfig) -> FfmpegRunner {
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal, cancelling encoder");
            let _ = cancel_tx.send(true);
        }
    });

    FfmpegRunner::new()
        .with_timeout(config.stage_timeout.as_secs())
        .with_cancel(cancel_rx)
        .with_progress(|p| {
            debug!(
                frame = p.frame,
                out_time = %p.out_time,
                speed = p.speed,
                "Encoder progress"
            );
        })
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let mut config = WorkerConfig::from_env();

    let metrics_handle = match &config.metrics_path {
        Some(_) => match metrics::init_recorder() {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("Failed to install metrics recorder: {}", e);
                None
            }
        },
        None => None,
    };

    let result = match cli.cmd {
        Command::Render(args) => cmd_render(args, &mut config).await,
        Command::Captions(args) => cmd_captions(args, &config).await,
    };

    if let (Some(handle), Some(path)) = (&metrics_handle, &config.metrics_path) {
        if let Err(e) = metrics::write_snapshot(handle, path).await {
            warn!("Failed to write metrics to {}: {}", path.display(), e);
        }
    }

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn cmd_render(args: RenderArgs, config: &mut WorkerConfig) -> anyhow::Result<()> {
    if let Some(dir) = args.static_dir {
        config.static_dir = dir;
    }
    if let Some(n) = args.max_parallel {
        config.max_render_parallel = n.max(1);
    }
    if let Some(secs) = args.stage_timeout {
        config.stage_timeout = std::time::Duration::from_secs(secs.max(1));
    }
    if args.seed.is_some() {
        config.effect_seed = args.seed;
    }
    info!("Worker config: {:?}", config);

    let scene_dir = match args.scene_dir {
        Some(dir) => dir,
        None => latest_scene_dir(&config.static_dir)
            .await
            .with_context(|| format!("reading {}", config.static_dir.display()))?
            .with_context(|| format!("no scene_* directory under {}", config.static_dir.display()))?,
    };

    let scene = discover_scene(&scene_dir)
        .await
        .with_context(|| format!("discovering assets in {}", scene_dir.display()))?;

    let runner = build_runner(config);
    let pipeline = Pipeline::new(Arc::new(runner), config.clone());

    match pipeline.run(&scene).await {
        Ok(report) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            Ok(())
        }
        Err(e) => {
            if let Some(diag) = e.diagnostics() {
                eprintln!("{}", diag);
            }
            Err(e.into())
        }
    }
}

async fn cmd_captions(args: CaptionsArgs, config: &WorkerConfig) -> anyhow::Result<()> {
    let text = match (args.text, args.text_file) {
        (Some(text), _) => text,
        (None, Some(path)) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading {}", path.display()))?,
        (None, None) => anyhow::bail!("either --text or --text-file is required"),
    };

    let runner = build_runner(config);
    let (path, cues) = write_captions(&runner, &args.scene_dir, &text).await?;
    println!("{} ({} cues)", path.display(), cues);
    Ok(())
}
