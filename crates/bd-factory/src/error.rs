use std::path::PathBuf;
use thiserror::Error;

/// Reasons a single job ends up `Failed`. None of them abort the batch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum JobError {
    #[error("Input {} is not a readable file: {reason}", .path.display())]
    InvalidInput { path: PathBuf, reason: String },

    #[error("Could not determine duration of {}: {reason}", .path.display())]
    DurationUnknown { path: PathBuf, reason: String },

    #[error("Failed to launch {program}: {reason}")]
    LaunchError { program: String, reason: String },

    #[error("Worker exited with {}", describe_exit(.code))]
    WorkerFailure { code: Option<i32>, tail: Vec<String> },

    #[error("Cancelled")]
    Cancelled,
}

impl JobError {
    pub fn kind(&self) -> &'static str {
        match self {
            JobError::InvalidInput { .. } => "InvalidInput",
            JobError::DurationUnknown { .. } => "DurationUnknown",
            JobError::LaunchError { .. } => "LaunchError",
            JobError::WorkerFailure { .. } => "WorkerFailure",
            JobError::Cancelled => "Cancelled",
        }
    }

    /// Last diagnostic lines of a failed worker, empty for every other kind.
    pub fn tail(&self) -> &[String] {
        match self {
            JobError::WorkerFailure { tail, .. } => tail,
            _ => &[],
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("code {}", c),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Rejections from `BatchRunner::start`; nothing has been launched when these occur.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("No jobs to run")]
    EmptyBatch,

    #[error("Concurrency limit must be at least 1")]
    InvalidConcurrency,

    #[error("A batch is already running")]
    AlreadyRunning,

    #[error("Failed to spawn batch coordinator: {0}")]
    Spawn(#[from] std::io::Error),
}
