use crate::error::JobError;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for one worker invocation (one input -> one denoised output).
#[derive(Debug, Clone, PartialEq)]
pub struct DenoiseJob {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub strength: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EncoderSettings {
    pub use_gpu: bool,      // CUDA decode + NVENC encode
    pub video_bitrate: String,
    pub audio_codec: String,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            use_gpu: true,
            video_bitrate: "3M".into(),
            audio_codec: "aac".into(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WorkerExit {
    /// `None` when the process was ended by a signal.
    pub code: Option<i32>,
}

impl WorkerExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// A running worker process. Shared between the thread draining its
/// diagnostics and the coordinator, which may need to stop it.
pub trait Worker: Send + Sync {
    /// The diagnostic stream. Yields `Some` at most once.
    fn take_diagnostics(&self) -> Option<Box<dyn Read + Send>>;

    fn try_wait(&self) -> io::Result<Option<WorkerExit>>;

    /// Ask the process to stop and flush its output.
    fn terminate(&self) -> io::Result<()>;

    fn kill(&self) -> io::Result<()>;
}

/// The external collaborators a batch needs: a duration probe and a worker launcher.
pub trait Toolchain: Send + Sync + 'static {
    /// Total media duration in seconds. Must be positive on success.
    fn probe_duration(&self, input: &std::path::Path) -> Result<f64, JobError>;

    fn launch(&self, job: &DenoiseJob) -> Result<Arc<dyn Worker>, JobError>;
}

pub struct ProbeArgs {
    pub file: PathBuf,
    pub ffprobe: Option<PathBuf>,
}
