use crate::denoiser::{output_path_for, DenoiseJob};
use crate::error::JobError;
use bd_core::{JobId, JobStatus};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// One file to denoise, plus the state the runner tracks for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub strength: f64,
    pub status: JobStatus,
    pub started_at: Option<Instant>,
    /// Last reported percentage, 0-100.
    pub progress: u8,
}

impl Job {
    pub fn new(input_path: PathBuf, output_path: PathBuf, strength: f64) -> Self {
        Self {
            input_path,
            output_path,
            strength,
            status: JobStatus::Pending,
            started_at: None,
            progress: 0,
        }
    }

    /// Output named after the input, see `output_path_for`.
    pub fn for_input(input_path: PathBuf, output_dir: Option<&Path>, strength: f64) -> Self {
        let output_path = output_path_for(&input_path, output_dir);
        Self::new(input_path, output_path, strength)
    }

    pub(crate) fn to_denoise_job(&self) -> DenoiseJob {
        DenoiseJob {
            input_path: self.input_path.clone(),
            output_path: self.output_path.clone(),
            strength: self.strength,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub id: JobId,
    pub percent: u8,
    /// Wall-clock time since the job was claimed.
    pub elapsed: Duration,
    /// `None` until the job reports a non-zero percent.
    pub remaining: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Completed { output: PathBuf, elapsed: Duration },
    Failed(JobError),
}

impl JobOutcome {
    pub fn status(&self) -> JobStatus {
        match self {
            JobOutcome::Completed { .. } => JobStatus::Completed,
            JobOutcome::Failed(_) => JobStatus::Failed,
        }
    }

    pub fn error(&self) -> Option<&JobError> {
        match self {
            JobOutcome::Failed(e) => Some(e),
            JobOutcome::Completed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    /// Jobs never claimed because the batch was cancelled.
    pub skipped: usize,
    pub cancelled: bool,
    pub elapsed: Duration,
}

impl BatchSummary {
    pub fn all_succeeded(&self) -> bool {
        self.completed == self.total
    }
}

/// Everything the runner reports. Per job: `JobStarted`, then `Progress`
/// with non-decreasing percent, then exactly one `JobDone`. `BatchDone` is last.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    JobStarted { id: JobId, input: PathBuf },
    Progress(ProgressUpdate),
    JobDone { id: JobId, outcome: JobOutcome },
    BatchDone(BatchSummary),
}

#[derive(Debug, Clone)]
pub struct RunnerOptions {
    /// How long cancelled workers get to exit before being killed.
    pub grace_period: Duration,
    /// Diagnostic lines kept for `WorkerFailure`.
    pub tail_lines: usize,
    /// Exit polling interval once a worker's stream has closed.
    pub poll_interval: Duration,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            grace_period: Duration::from_secs(5),
            tail_lines: 8,
            poll_interval: Duration::from_millis(25),
        }
    }
}

type ProgressFn = Box<dyn Fn(JobId, u8, Duration, Option<Duration>) + Send>;
type JobDoneFn = Box<dyn Fn(JobId, &JobOutcome) + Send>;
type BatchDoneFn = Box<dyn Fn(&BatchSummary) + Send>;

/// Separate subscription points for progress, job completion and batch completion.
#[derive(Default)]
pub struct Subscribers {
    progress: Vec<ProgressFn>,
    job_done: Vec<JobDoneFn>,
    batch_done: Vec<BatchDoneFn>,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_progress<F>(mut self, f: F) -> Self
    where
        F: Fn(JobId, u8, Duration, Option<Duration>) + Send + 'static,
    {
        self.progress.push(Box::new(f));
        self
    }

    pub fn on_job_done<F>(mut self, f: F) -> Self
    where
        F: Fn(JobId, &JobOutcome) + Send + 'static,
    {
        self.job_done.push(Box::new(f));
        self
    }

    pub fn on_batch_done<F>(mut self, f: F) -> Self
    where
        F: Fn(&BatchSummary) + Send + 'static,
    {
        self.batch_done.push(Box::new(f));
        self
    }

    pub fn dispatch(&self, event: BatchEvent) {
        match event {
            BatchEvent::JobStarted { .. } => {}
            BatchEvent::Progress(p) => {
                for f in &self.progress {
                    f(p.id, p.percent, p.elapsed, p.remaining);
                }
            }
            BatchEvent::JobDone { id, outcome } => {
                for f in &self.job_done {
                    f(id, &outcome);
                }
            }
            BatchEvent::BatchDone(summary) => {
                for f in &self.batch_done {
                    f(&summary);
                }
            }
        }
    }

    pub fn into_callback(self) -> impl Fn(BatchEvent) + Send + 'static {
        move |event| self.dispatch(event)
    }
}

pub struct DenoiseArgs {
    pub inputs: Vec<PathBuf>,
    pub dir: Option<PathBuf>,
    pub strength: Option<String>,
    pub jobs: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub use_gpu: bool,
    pub video_bitrate: String,
    pub ffmpeg: Option<PathBuf>,
    pub ffprobe: Option<PathBuf>,
}
