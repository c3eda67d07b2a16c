#![allow(dead_code)]

use bd_factory::batch::{BatchEvent, RunnerOptions};
use bd_factory::denoiser::{DenoiseJob, Toolchain, Worker, WorkerExit};
use bd_factory::JobError;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::{
    collections::HashMap,
    io::{self, Read},
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

pub const WAIT: Duration = Duration::from_secs(5);

pub fn fast_options() -> RunnerOptions {
    RunnerOptions {
        grace_period: Duration::from_millis(50),
        tail_lines: 4,
        poll_interval: Duration::from_millis(2),
    }
}

/// Real (empty) input files the runner's readability check accepts.
pub fn inputs(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|n| {
            let p = dir.join(n);
            std::fs::write(&p, b"fake video").unwrap();
            p
        })
        .collect()
}

pub fn recorder() -> (Arc<Mutex<Vec<BatchEvent>>>, impl Fn(BatchEvent) + Send + 'static) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    (events, move |e| sink.lock().unwrap().push(e))
}

#[derive(Clone)]
pub enum Script {
    /// Writes all lines, then exits with the code.
    Auto { lines: Vec<String>, code: i32 },
    /// Stays alive until the test calls `finish` (or the runner stops it).
    Manual,
    /// Like `Manual` but ignores `terminate`.
    Stubborn,
    LaunchFails,
}

pub struct Launch {
    pub input: PathBuf,
    pub worker: Arc<FakeWorker>,
}

/// Probe answers and worker behaviour keyed by input path.
pub struct ScriptedToolchain {
    durations: Mutex<HashMap<PathBuf, f64>>,
    scripts: Mutex<HashMap<PathBuf, Script>>,
    launches: Sender<Launch>,
    live: Arc<AtomicUsize>,
    pub peak: Arc<AtomicUsize>,
    pub launched: Arc<AtomicUsize>,
}

impl ScriptedToolchain {
    pub fn new() -> (Self, Receiver<Launch>) {
        let (tx, rx) = unbounded();
        let tc = Self {
            durations: Mutex::new(HashMap::new()),
            scripts: Mutex::new(HashMap::new()),
            launches: tx,
            live: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
            launched: Arc::new(AtomicUsize::new(0)),
        };
        (tc, rx)
    }

    pub fn script(self, input: &Path, duration: Option<f64>, script: Script) -> Self {
        if let Some(d) = duration {
            self.durations.lock().unwrap().insert(input.to_path_buf(), d);
        }
        self.scripts
            .lock()
            .unwrap()
            .insert(input.to_path_buf(), script);
        self
    }
}

impl Toolchain for ScriptedToolchain {
    fn probe_duration(&self, input: &Path) -> Result<f64, JobError> {
        self.durations
            .lock()
            .unwrap()
            .get(input)
            .copied()
            .ok_or_else(|| JobError::DurationUnknown {
                path: input.to_path_buf(),
                reason: "ffprobe printed nothing".into(),
            })
    }

    fn launch(&self, job: &DenoiseJob) -> Result<Arc<dyn Worker>, JobError> {
        let script = self
            .scripts
            .lock()
            .unwrap()
            .get(&job.input_path)
            .cloned()
            .unwrap_or(Script::Manual);

        if let Script::LaunchFails = script {
            return Err(JobError::LaunchError {
                program: "fake-ffmpeg".into(),
                reason: "No such file or directory".into(),
            });
        }

        let now_live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now_live, Ordering::SeqCst);
        self.launched.fetch_add(1, Ordering::SeqCst);

        let worker = Arc::new(FakeWorker::new(
            !matches!(script, Script::Stubborn),
            self.live.clone(),
        ));
        if let Script::Auto { lines, code } = script {
            for line in lines {
                worker.emit(&line);
            }
            worker.finish(Some(code));
        }

        let _ = self.launches.send(Launch {
            input: job.input_path.clone(),
            worker: worker.clone(),
        });
        Ok(worker)
    }
}

pub struct FakeWorker {
    stream: Mutex<Option<ChannelReader>>,
    sender: Mutex<Option<Sender<Vec<u8>>>>,
    exit: Mutex<Option<WorkerExit>>,
    honours_terminate: bool,
    pub terminated: AtomicBool,
    pub killed: AtomicBool,
    live: Arc<AtomicUsize>,
}

impl FakeWorker {
    fn new(honours_terminate: bool, live: Arc<AtomicUsize>) -> Self {
        let (tx, rx) = unbounded();
        Self {
            stream: Mutex::new(Some(ChannelReader {
                rx,
                pending: Vec::new(),
                pos: 0,
            })),
            sender: Mutex::new(Some(tx)),
            exit: Mutex::new(None),
            honours_terminate,
            terminated: AtomicBool::new(false),
            killed: AtomicBool::new(false),
            live,
        }
    }

    /// One ffmpeg-style status record, carriage-return terminated.
    pub fn emit(&self, line: &str) {
        if let Some(tx) = self.sender.lock().unwrap().as_ref() {
            let _ = tx.send(format!("{}\r", line).into_bytes());
        }
    }

    pub fn finish(&self, code: Option<i32>) {
        let mut exit = self.exit.lock().unwrap();
        if exit.is_some() {
            return;
        }
        *exit = Some(WorkerExit { code });
        self.live.fetch_sub(1, Ordering::SeqCst);
        // Closing the stream after the exit is recorded, like a real process.
        self.sender.lock().unwrap().take();
    }
}

impl Worker for FakeWorker {
    fn take_diagnostics(&self) -> Option<Box<dyn Read + Send>> {
        self.stream
            .lock()
            .unwrap()
            .take()
            .map(|r| Box::new(r) as Box<dyn Read + Send>)
    }

    fn try_wait(&self) -> io::Result<Option<WorkerExit>> {
        Ok(*self.exit.lock().unwrap())
    }

    fn terminate(&self) -> io::Result<()> {
        self.terminated.store(true, Ordering::SeqCst);
        if self.honours_terminate {
            self.finish(None);
        }
        Ok(())
    }

    fn kill(&self) -> io::Result<()> {
        self.killed.store(true, Ordering::SeqCst);
        self.finish(None);
        Ok(())
    }
}

struct ChannelReader {
    rx: Receiver<Vec<u8>>,
    pending: Vec<u8>,
    pos: usize,
}

impl Read for ChannelReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.pos >= self.pending.len() {
            match self.rx.recv() {
                Ok(chunk) => {
                    self.pending = chunk;
                    self.pos = 0;
                }
                Err(_) => return Ok(0),
            }
        }
        let n = buf.len().min(self.pending.len() - self.pos);
        buf[..n].copy_from_slice(&self.pending[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Compact, timing-free rendering of an event for sequence comparisons.
pub fn describe(event: &BatchEvent) -> String {
    match event {
        BatchEvent::JobStarted { id, .. } => format!("start {}", id.index()),
        BatchEvent::Progress(p) => format!("progress {} {}", p.id.index(), p.percent),
        BatchEvent::JobDone { id, outcome } => match outcome.error() {
            None => format!("done {} ok", id.index()),
            Some(e) => format!("done {} {}", id.index(), e.kind()),
        },
        BatchEvent::BatchDone(s) => format!(
            "batch {}/{}/{}/{}",
            s.completed, s.failed, s.skipped, s.cancelled
        ),
    }
}
