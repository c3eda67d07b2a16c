use super::types::*;
use crate::error::JobError;
use std::{
    io::{self, Read, Write},
    path::Path,
    process::{Child, ChildStderr, ChildStdin, Command, Stdio},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    thread,
    time::{Duration, Instant},
};
use tracing::{debug, warn};

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(30);
const PROBE_POLL: Duration = Duration::from_millis(10);

/// `ffprobe` for durations, `ffmpeg` with the hqdn3d filter for the actual work.
#[derive(Debug, Clone)]
pub struct FfmpegToolchain {
    pub paths: ToolPaths,
    pub encoder: EncoderSettings,
    /// A probe still running after this long is killed and the job fails.
    pub probe_timeout: Duration,
}

impl Default for FfmpegToolchain {
    fn default() -> Self {
        Self::new(ToolPaths::default(), EncoderSettings::default())
    }
}

impl FfmpegToolchain {
    pub fn new(paths: ToolPaths, encoder: EncoderSettings) -> Self {
        Self {
            paths,
            encoder,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn probe_command(&self, input: &Path) -> Command {
        let mut cmd = Command::new(&self.paths.ffprobe);
        cmd.args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(input);
        hide_console(&mut cmd);
        cmd
    }

    pub fn worker_command(&self, job: &DenoiseJob) -> Command {
        let mut cmd = Command::new(&self.paths.ffmpeg);
        if self.encoder.use_gpu {
            cmd.arg("-hwaccel").arg("cuda");
        }

        let codec = if self.encoder.use_gpu {
            "h264_nvenc"
        } else {
            "libx264"
        };

        cmd.arg("-i")
            .arg(&job.input_path)
            .arg("-c:v")
            .arg(codec)
            .arg("-b:v")
            .arg(&self.encoder.video_bitrate)
            .arg("-vf")
            .arg(format!("hqdn3d={}:1:2:3", job.strength))
            .arg("-c:a")
            .arg(&self.encoder.audio_codec)
            .arg("-y")
            .arg(&job.output_path);
        hide_console(&mut cmd);
        cmd
    }
}

impl Toolchain for FfmpegToolchain {
    fn probe_duration(&self, input: &Path) -> Result<f64, JobError> {
        let unknown = |reason: String| JobError::DurationUnknown {
            path: input.to_path_buf(),
            reason,
        };

        let mut child = self
            .probe_command(input)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| unknown(format!("failed to run ffprobe: {}", e)))?;

        let deadline = Instant::now() + self.probe_timeout;
        loop {
            match child.try_wait() {
                Ok(Some(_)) => break,
                Ok(None) if Instant::now() < deadline => thread::sleep(PROBE_POLL),
                Ok(None) => {
                    warn!(input = %input.display(), "ffprobe timed out, killing it");
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(unknown(format!(
                        "ffprobe did not finish within {:?}",
                        self.probe_timeout
                    )));
                }
                Err(e) => return Err(unknown(format!("failed to wait for ffprobe: {}", e))),
            }
        }
        let output = child
            .wait_with_output()
            .map_err(|e| unknown(format!("failed to read ffprobe output: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(unknown(format!(
                "ffprobe exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout);
        let text = text.trim();
        match text.parse::<f64>() {
            Ok(d) if d.is_finite() && d > 0.0 => Ok(d),
            _ if text.is_empty() => Err(unknown("ffprobe printed nothing".into())),
            _ => Err(unknown(format!("unusable duration '{}'", text))),
        }
    }

    fn launch(&self, job: &DenoiseJob) -> Result<Arc<dyn Worker>, JobError> {
        let mut child = self
            .worker_command(job)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| JobError::LaunchError {
                program: self.paths.ffmpeg.display().to_string(),
                reason: e.to_string(),
            })?;

        debug!(pid = child.id(), input = %job.input_path.display(), "ffmpeg spawned");

        let stderr = child.stderr.take();
        let stdin = child.stdin.take();
        Ok(Arc::new(ChildWorker {
            child: Mutex::new(child),
            stderr: Mutex::new(stderr),
            stdin: Mutex::new(stdin),
        }))
    }
}

#[cfg(windows)]
fn hide_console(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    cmd.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
fn hide_console(_cmd: &mut Command) {}

/// An OS process behind the `Worker` seam.
pub struct ChildWorker {
    child: Mutex<Child>,
    stderr: Mutex<Option<ChildStderr>>,
    stdin: Mutex<Option<ChildStdin>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Worker for ChildWorker {
    fn take_diagnostics(&self) -> Option<Box<dyn Read + Send>> {
        lock(&self.stderr)
            .take()
            .map(|s| Box::new(s) as Box<dyn Read + Send>)
    }

    fn try_wait(&self) -> io::Result<Option<WorkerExit>> {
        Ok(lock(&self.child)
            .try_wait()?
            .map(|status| WorkerExit {
                code: status.code(),
            }))
    }

    fn terminate(&self) -> io::Result<()> {
        // ffmpeg quits cleanly on 'q'
        if let Some(mut stdin) = lock(&self.stdin).take() {
            let _ = stdin.write_all(b"q");
            let _ = stdin.flush();
        }

        #[cfg(unix)]
        {
            // Hold the child lock so the pid cannot be reaped and reused under us.
            let mut child = lock(&self.child);
            if child.try_wait()?.is_none() {
                let pid = child.id() as libc::pid_t;
                if unsafe { libc::kill(pid, libc::SIGTERM) } != 0 {
                    return Err(io::Error::last_os_error());
                }
            }
        }
        Ok(())
    }

    fn kill(&self) -> io::Result<()> {
        let mut child = lock(&self.child);
        match child.kill() {
            Err(e) if e.kind() == io::ErrorKind::InvalidInput => Ok(()), // already exited
            other => other,
        }
    }
}
