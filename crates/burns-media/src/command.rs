//! FFmpeg/FFprobe command builders and the process executor.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{MediaError, MediaResult};
use crate::progress::FfmpegProgress;

const FFMPEG_BIN: &str = "ffmpeg";
const FFPROBE_BIN: &str = "ffprobe";

type ProgressCallback = dyn Fn(FfmpegProgress) + Send + Sync;

/// One `-i` input together with the options that precede it.
#[derive(Debug, Clone)]
struct FfmpegInput {
    args: Vec<String>,
    path: PathBuf,
}

/// Where an FFmpeg command writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Regular output file
    File(PathBuf),
    /// `-f null -`, used for analysis filters
    Null,
}

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Inputs in `-i` order
    inputs: Vec<FfmpegInput>,
    /// Output target
    output: OutputTarget,
    /// Output arguments (after the last -i)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
    /// Log level
    log_level: String,
    /// Whether to emit `-progress pipe:2`
    progress: bool,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command with one input and one output file.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            inputs: vec![FfmpegInput {
                args: Vec::new(),
                path: input.as_ref().to_path_buf(),
            }],
            output: OutputTarget::File(output.as_ref().to_path_buf()),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
            progress: true,
        }
    }

    /// Create an analysis command that decodes the input and discards output.
    pub fn analyze(input: impl AsRef<Path>) -> Self {
        Self {
            output: OutputTarget::Null,
            progress: false,
            log_level: "info".to_string(),
            ..Self::new(input, "-")
        }
    }

    /// Append another input (`-i`). Subsequent `input_arg` calls apply to it.
    pub fn add_input(mut self, input: impl AsRef<Path>) -> Self {
        self.inputs.push(FfmpegInput {
            args: Vec::new(),
            path: input.as_ref().to_path_buf(),
        });
        self
    }

    /// Add an input argument to the most recently added input.
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        if let Some(input) = self.inputs.last_mut() {
            input.args.push(arg.into());
        }
        self
    }

    /// Add multiple input arguments to the most recently added input.
    pub fn input_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(input) = self.inputs.last_mut() {
            input.args.extend(args.into_iter().map(Into::into));
        }
        self
    }

    /// Add output arguments (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Loop the current (still image) input indefinitely.
    pub fn loop_input(self) -> Self {
        self.input_arg("-loop").input_arg("1")
    }

    /// Force the demuxer of the current input.
    pub fn input_format(self, format: impl Into<String>) -> Self {
        self.input_arg("-f").input_arg(format)
    }

    /// Set output start offset.
    pub fn seek(self, seconds: f64) -> Self {
        self.output_arg("-ss").output_arg(format_seconds(seconds))
    }

    /// Set output duration.
    pub fn duration(self, seconds: f64) -> Self {
        self.output_arg("-t").output_arg(format_seconds(seconds))
    }

    /// Set video filter.
    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    /// Set audio filter.
    pub fn audio_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-af").output_arg(filter)
    }

    /// Set filter complex.
    pub fn filter_complex(self, filter: impl Into<String>) -> Self {
        self.output_arg("-filter_complex").output_arg(filter)
    }

    /// Select a stream (or filter output label) for the output.
    pub fn map(self, spec: impl Into<String>) -> Self {
        self.output_arg("-map").output_arg(spec)
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set audio codec.
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Set preset.
    pub fn preset(self, preset: impl Into<String>) -> Self {
        self.output_arg("-preset").output_arg(preset)
    }

    /// Set pixel format.
    pub fn pixel_format(self, format: impl Into<String>) -> Self {
        self.output_arg("-pix_fmt").output_arg(format)
    }

    /// Set audio bitrate.
    pub fn audio_bitrate(self, bitrate: impl Into<String>) -> Self {
        self.output_arg("-b:a").output_arg(bitrate)
    }

    /// Set audio channel count.
    pub fn audio_channels(self, channels: u8) -> Self {
        self.output_arg("-ac").output_arg(channels.to_string())
    }

    /// Set audio sample rate.
    pub fn audio_sample_rate(self, rate: u32) -> Self {
        self.output_arg("-ar").output_arg(rate.to_string())
    }

    /// Stop writing when the shortest input ends.
    pub fn shortest(self) -> Self {
        self.output_arg("-shortest")
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Input paths in `-i` order.
    pub fn input_paths(&self) -> impl Iterator<Item = &Path> {
        self.inputs.iter().map(|i| i.path.as_path())
    }

    /// Output file, or `None` for analysis commands.
    pub fn output_path(&self) -> Option<&Path> {
        match &self.output {
            OutputTarget::File(path) => Some(path),
            OutputTarget::Null => None,
        }
    }

    /// Whether this command asks FFmpeg for `-progress` output.
    pub fn reports_progress(&self) -> bool {
        self.progress
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        // Overwrite flag
        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-hide_banner".to_string());

        // Log level
        args.push("-v".to_string());
        args.push(self.log_level.clone());

        // Progress output to stderr
        if self.progress {
            args.push("-progress".to_string());
            args.push("pipe:2".to_string());
            args.push("-nostats".to_string());
        }

        for input in &self.inputs {
            args.extend(input.args.iter().cloned());
            args.push("-i".to_string());
            args.push(input.path.to_string_lossy().to_string());
        }

        // Output args
        args.extend(self.output_args.iter().cloned());

        match &self.output {
            OutputTarget::File(path) => args.push(path.to_string_lossy().to_string()),
            OutputTarget::Null => {
                args.push("-f".to_string());
                args.push("null".to_string());
                args.push("-".to_string());
            }
        }

        args
    }

    /// Full command line, for logs and diagnostics.
    pub fn command_line(&self) -> String {
        format!("{} {}", FFMPEG_BIN, self.build_args().join(" "))
    }
}

/// Builder for FFprobe commands.
#[derive(Debug, Clone)]
pub struct FfprobeCommand {
    input: PathBuf,
    args: Vec<String>,
}

impl FfprobeCommand {
    /// Create a new quiet FFprobe command.
    pub fn new(input: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            args: vec!["-v".to_string(), "quiet".to_string()],
        }
    }

    /// Print container format information as JSON.
    pub fn format_json(mut self) -> Self {
        self.args.extend(
            ["-print_format", "json", "-show_format"]
                .into_iter()
                .map(String::from),
        );
        self
    }

    /// Restrict output to matching streams (e.g. `a`).
    pub fn select_streams(mut self, spec: impl Into<String>) -> Self {
        self.args.push("-select_streams".to_string());
        self.args.push(spec.into());
        self
    }

    /// Only show the given entries (e.g. `format=duration`).
    pub fn show_entries(mut self, entries: impl Into<String>) -> Self {
        self.args.push("-show_entries".to_string());
        self.args.push(entries.into());
        self
    }

    /// Set the writer (e.g. `csv=p=0`).
    pub fn output_format(mut self, format: impl Into<String>) -> Self {
        self.args.push("-of".to_string());
        self.args.push(format.into());
        self
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = self.args.clone();
        args.push(self.input.to_string_lossy().to_string());
        args
    }

    /// Full command line, for logs and diagnostics.
    pub fn command_line(&self) -> String {
        format!("{} {}", FFPROBE_BIN, self.build_args().join(" "))
    }
}

/// Captured output of a finished process.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

/// Runs encoder processes.
///
/// Every pipeline stage goes through this seam, so a run can be driven
/// against a fake in tests. Implementations return `Err` for non-zero exits.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run an FFmpeg command to completion.
    async fn ffmpeg(&self, cmd: &FfmpegCommand) -> MediaResult<ProcessOutput>;

    /// Run an FFprobe command to completion.
    async fn ffprobe(&self, cmd: &FfprobeCommand) -> MediaResult<ProcessOutput>;
}

/// Runner for FFmpeg commands with progress tracking, timeout and cancellation.
#[derive(Clone, Default)]
pub struct FfmpegRunner {
    /// Cancellation signal receiver
    cancel_rx: Option<watch::Receiver<bool>>,
    /// Timeout in seconds
    timeout_secs: Option<u64>,
    /// Progress callback for `-progress` output
    progress_callback: Option<Arc<ProgressCallback>>,
}

impl std::fmt::Debug for FfmpegRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegRunner")
            .field("timeout_secs", &self.timeout_secs)
            .field("cancellable", &self.cancel_rx.is_some())
            .finish()
    }
}

enum Waited {
    Exited(std::io::Result<ExitStatus>),
    TimedOut,
    Cancelled,
}

impl FfmpegRunner {
    /// Create a new runner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set cancellation signal.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    /// Set timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Set progress callback.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(FfmpegProgress) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    /// Run an FFmpeg command, discarding its output.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        self.ffmpeg(cmd).await.map(|_| ())
    }

    /// Spawn a process, collect stdout/stderr and wait for it.
    async fn execute(
        &self,
        program: &str,
        args: &[String],
        parse_progress: bool,
    ) -> MediaResult<(ExitStatus, ProcessOutput)> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| MediaError::invalid_media("stdout not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MediaError::invalid_media("stderr not captured"))?;

        let stdout_handle = tokio::spawn(async move {
            let mut buf = String::new();
            let _ = stdout.read_to_string(&mut buf).await;
            buf
        });

        let callback = self.progress_callback.clone().filter(|_| parse_progress);
        let stderr_handle = tokio::spawn(async move {
            drain_stderr(BufReader::new(stderr), parse_progress, callback.as_deref()).await
        });

        let waited = self.wait_for_completion(&mut child).await;

        match waited {
            Waited::Exited(status) => {
                let status = status?;
                let stdout = stdout_handle.await.unwrap_or_default();
                let stderr = stderr_handle.await.unwrap_or_default();
                Ok((
                    status,
                    ProcessOutput {
                        stdout,
                        stderr,
                        exit_code: status.code(),
                    },
                ))
            }
            Waited::TimedOut => {
                let secs = self.timeout_secs.unwrap_or_default();
                warn!("{} timed out after {} seconds, killing process", program, secs);
                let _ = child.kill().await;
                Err(MediaError::Timeout(secs))
            }
            Waited::Cancelled => {
                info!("{} cancelled, killing process", program);
                let _ = child.kill().await;
                Err(MediaError::Cancelled)
            }
        }
    }

    /// Wait for child process with cancellation and timeout.
    async fn wait_for_completion(&self, child: &mut Child) -> Waited {
        let timeout = self.timeout_secs.map(Duration::from_secs);
        let deadline = async move {
            match timeout {
                Some(t) => tokio::time::sleep(t).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            status = child.wait() => Waited::Exited(status),
            _ = deadline => Waited::TimedOut,
            _ = wait_for_cancel(self.cancel_rx.clone()) => Waited::Cancelled,
        }
    }
}

async fn wait_for_cancel(cancel_rx: Option<watch::Receiver<bool>>) {
    let Some(mut rx) = cancel_rx else {
        return std::future::pending::<()>().await;
    };

    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            // Sender dropped without cancelling
            return std::future::pending::<()>().await;
        }
    }
}

#[async_trait]
impl CommandExecutor for FfmpegRunner {
    async fn ffmpeg(&self, cmd: &FfmpegCommand) -> MediaResult<ProcessOutput> {
        // Check FFmpeg exists
        check_ffmpeg()?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: {}", cmd.command_line());

        let (status, output) = self
            .execute(FFMPEG_BIN, &args, cmd.reports_progress())
            .await?;

        if status.success() {
            Ok(output)
        } else {
            Err(MediaError::ffmpeg_failed(
                "FFmpeg exited with non-zero status",
                Some(output.stderr),
                status.code(),
            )
            .with_command(cmd.command_line()))
        }
    }

    async fn ffprobe(&self, cmd: &FfprobeCommand) -> MediaResult<ProcessOutput> {
        check_ffprobe()?;

        let args = cmd.build_args();
        debug!("Running FFprobe: {}", cmd.command_line());

        let (status, output) = self.execute(FFPROBE_BIN, &args, false).await?;

        if status.success() {
            Ok(output)
        } else {
            Err(MediaError::FfprobeFailed {
                message: format!("FFprobe failed on {}", cmd.input().display()),
                stderr: Some(output.stderr),
            })
        }
    }
}

/// Read stderr to the end, feeding progress blocks to `callback`.
///
/// Returns the non-progress lines. Lines are decoded lossily so a stray
/// non-UTF-8 byte (e.g. latin-1 tags) never stops the drain.
async fn drain_stderr<R>(
    mut reader: R,
    parse_progress: bool,
    callback: Option<&ProgressCallback>,
) -> String
where
    R: AsyncBufRead + Unpin,
{
    let mut current = FfmpegProgress::default();
    let mut kept = Vec::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                debug!("Stopped reading stderr: {}", e);
                break;
            }
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);

        if parse_progress && FfmpegProgress::is_progress_line(line) {
            if let (Some(progress), Some(cb)) = (current.apply_line(line), callback) {
                cb(progress);
            }
        } else {
            kept.push(line.to_string());
        }
    }
    kept.join("\n")
}

/// Format seconds the way FFmpeg duration options expect.
///
/// Microsecond precision keeps per-clip durations summing to the total.
fn format_seconds(seconds: f64) -> String {
    format!("{:.6}", seconds.max(0.0))
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which(FFMPEG_BIN).map_err(|_| MediaError::FfmpegNotFound)
}

/// Check if FFprobe is available.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which(FFPROBE_BIN).map_err(|_| MediaError::FfprobeNotFound)
}
