//! Supervision of the external transcoder that records a variant to disk.

mod interrupt;

pub use interrupt::{CtrlC, InterruptSource};

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use chrono::{DateTime, Local};
use tokio::io::AsyncWriteExt;
use tokio::process::{ChildStdin, Command};
use tracing::{debug, error, info, warn};

use crate::catalog::StreamVariant;
use crate::config::TranscoderConfig;
use crate::error::{Error, Result};

/// Everything needed to record one variant.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRequest {
    pub variant: StreamVariant,
    pub channel: String,
    /// Desired output frame rate. `None` keeps the source rate.
    pub frame_rate: Option<u32>,
    pub destination: PathBuf,
}

impl DownloadRequest {
    /// Frame rate the output file will have.
    pub fn effective_frame_rate(&self) -> u32 {
        self.frame_rate
            .unwrap_or_else(|| self.variant.rounded_frame_rate())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscodeMode {
    /// Repackage without re-encoding.
    StreamCopy,
    /// Re-encode video at the given frame rate.
    FrameRate(u32),
}

impl TranscodeMode {
    /// Re-encode only when a frame rate is requested and it differs from the
    /// source. Sources are compared at integer precision.
    pub fn decide(source_frame_rate: f64, desired: Option<u32>) -> Self {
        match desired {
            Some(fps) if f64::from(fps) != source_frame_rate.round() => Self::FrameRate(fps),
            _ => Self::StreamCopy,
        }
    }

    fn args(self) -> Vec<String> {
        match self {
            Self::StreamCopy => vec!["-c".to_string(), "copy".to_string()],
            Self::FrameRate(fps) => vec![
                "-filter:v".to_string(),
                format!("fps={fps}"),
                "-c:a".to_string(),
                "copy".to_string(),
            ],
        }
    }
}

/// `"<channel> <YYYY-mm-dd HH_MM> (<height>p<fps>).<container>"`
///
/// Minute granularity: two recordings of the same channel started within the
/// same minute get the same name and the later one overwrites the first.
pub fn output_file_name(
    channel: &str,
    height: u32,
    frame_rate: u32,
    started_at: &DateTime<Local>,
    container: &str,
) -> String {
    format!(
        "{channel} {timestamp} ({height}p{frame_rate}).{container}",
        timestamp = started_at.format("%Y-%m-%d %H_%M"),
    )
}

#[derive(Debug)]
pub enum DownloadStatus {
    /// The transcoder exited on its own.
    Finished(ExitStatus),
    /// The user interrupted the download and the transcoder shut down.
    Interrupted(ExitStatus),
    /// The transcoder could not be started or waited on.
    Failed(Error),
}

#[derive(Debug)]
pub struct DownloadReport {
    pub output_path: PathBuf,
    pub mode: TranscodeMode,
    pub status: DownloadStatus,
}

impl DownloadReport {
    pub fn is_success(&self) -> bool {
        match &self.status {
            DownloadStatus::Finished(status) => status.success(),
            DownloadStatus::Interrupted(_) => true,
            DownloadStatus::Failed(_) => false,
        }
    }
}

/// Owns the transcoder process from spawn to reap.
#[derive(Debug, Clone, Default)]
pub struct Supervisor {
    config: TranscoderConfig,
}

impl Supervisor {
    pub fn new(config: TranscoderConfig) -> Self {
        Self { config }
    }

    pub fn output_path(&self, request: &DownloadRequest, started_at: &DateTime<Local>) -> PathBuf {
        request.destination.join(output_file_name(
            &request.channel,
            request.variant.height(),
            request.effective_frame_rate(),
            started_at,
            &self.config.container,
        ))
    }

    fn build_args(&self, url: &str, mode: TranscodeMode, output: &Path) -> Vec<String> {
        let mut args = vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            self.config.log_level.clone(),
            "-i".to_string(),
            url.to_string(),
        ];
        args.extend(mode.args());
        args.extend(["-y".to_string(), output.to_string_lossy().to_string()]);
        args
    }

    /// Record `request.variant` until the transcoder exits.
    ///
    /// Never fails: spawn and wait errors are logged and reported through
    /// [`DownloadStatus::Failed`].
    pub async fn download<I>(&self, request: &DownloadRequest, interrupts: &mut I) -> DownloadReport
    where
        I: InterruptSource + ?Sized,
    {
        let mode = TranscodeMode::decide(request.variant.frame_rate(), request.frame_rate);
        let output_path = self.output_path(request, &Local::now());
        let args = self.build_args(request.variant.url(), mode, &output_path);

        if let Err(e) = tokio::fs::create_dir_all(&request.destination).await {
            warn!(
                path = %request.destination.display(),
                error = %e,
                "Cannot create destination directory"
            );
        }

        info!(
            channel = %request.channel,
            variant = %request.variant,
            ?mode,
            output = %output_path.display(),
            "Downloading stream with {}",
            self.config.program
        );

        let status = match self.supervise(&args, interrupts).await {
            Ok(status) => status,
            Err(e) => {
                error!(
                    program = %self.config.program,
                    ?args,
                    error = %e,
                    "Transcoder failed"
                );
                DownloadStatus::Failed(e)
            }
        };

        if let DownloadStatus::Finished(exit) = &status {
            if exit.success() {
                info!(output = %output_path.display(), "Download finished");
            } else {
                warn!(output = %output_path.display(), "Transcoder exited with status: {}", exit);
            }
        }

        DownloadReport {
            output_path,
            mode,
            status,
        }
    }

    async fn supervise<I>(&self, args: &[String], interrupts: &mut I) -> Result<DownloadStatus>
    where
        I: InterruptSource + ?Sized,
    {
        let mut child = Command::new(&self.config.program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| Error::Spawn {
                program: self.config.program.clone(),
                source,
            })?;
        debug!(pid = ?child.id(), "Transcoder started");

        let mut stdin = child.stdin.take();
        let mut interrupted = false;

        // Interrupts never kill the child: ask it to quit, then wait again.
        let exit = loop {
            tokio::select! {
                status = child.wait() => break status.map_err(Error::Wait)?,
                _ = interrupts.interrupted() => {
                    if interrupted {
                        info!("Still waiting for the transcoder to stop");
                        continue;
                    }
                    interrupted = true;
                    info!("Stopping transcoder...");
                    if let Some(pipe) = stdin.take() {
                        request_quit(pipe).await;
                    }
                }
            }
        };

        if interrupted {
            info!("Transcoder has been stopped");
            Ok(DownloadStatus::Interrupted(exit))
        } else {
            Ok(DownloadStatus::Finished(exit))
        }
    }
}

/// Send ffmpeg's quit key and close its stdin. The child may already be
/// shutting down from the same signal, so a closed pipe is fine.
async fn request_quit(mut pipe: ChildStdin) {
    if let Err(e) = pipe.write_all(b"q").await {
        debug!(error = %e, "Transcoder stdin already closed");
        return;
    }
    if let Err(e) = pipe.flush().await {
        debug!(error = %e, "Transcoder stdin already closed");
    }
}
