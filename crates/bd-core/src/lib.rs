use std::fmt;
use std::path::Path;
use std::time::Duration;

pub mod prefs;

pub use prefs::PreferenceStore;

/// Position of a job in the ordered batch it was submitted with.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(pub usize);

impl JobId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0 + 1)
    }
}

/// Pending -> Processing -> {Completed, Failed}. Never goes backwards.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "Pending",
            JobStatus::Processing => "Processing",
            JobStatus::Completed => "Completed",
            JobStatus::Failed => "Failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub mod media {
    use std::path::Path;

    /// Containers offered by the file pickers.
    pub const VIDEO_EXTENSIONS: [&str; 11] = [
        "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "mpeg", "mpg", "m4v", "ts",
    ];

    pub const DEFAULT_STRENGTH: f64 = 3.0;

    pub const CONCURRENCY_CHOICES: [usize; 5] = [1, 2, 3, 4, 5];

    pub fn is_video_file(path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .map_or(false, |ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
    }
}

pub const UNKNOWN_TIME: &str = "--:--:--";

/// Formats a duration as `HH:MM:SS`, dropping sub-second precision.
pub fn format_hms(duration: Duration) -> String {
    let total = duration.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

pub fn format_optional_hms(duration: Option<Duration>) -> String {
    duration.map(format_hms).unwrap_or_else(|| UNKNOWN_TIME.to_string())
}

/// File name for display in tables and progress bars.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
