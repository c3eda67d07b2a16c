//! Drives `FfmpegToolchain` against small shell scripts standing in for
//! ffprobe/ffmpeg, so the process plumbing (pipes, exit codes, SIGTERM) is
//! exercised without real media tools.
#![cfg(unix)]

mod common;

use bd_factory::batch::{BatchEvent, BatchRunner, Job, JobOutcome};
use bd_factory::denoiser::{EncoderSettings, FfmpegToolchain, ToolPaths, Toolchain};
use bd_factory::JobError;
use common::{fast_options, inputs, recorder, WAIT};
use pretty_assertions::assert_eq;
use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    thread,
    time::{Duration, Instant},
};

fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn toolchain(ffmpeg: &Path, ffprobe: &Path) -> FfmpegToolchain {
    FfmpegToolchain::new(
        ToolPaths {
            ffmpeg: ffmpeg.to_path_buf(),
            ffprobe: ffprobe.to_path_buf(),
        },
        EncoderSettings {
            use_gpu: false,
            ..Default::default()
        },
    )
}

fn run_one(toolchain: FfmpegToolchain, input: &Path) -> Vec<BatchEvent> {
    let (events, callback) = recorder();
    let mut runner = BatchRunner::new(toolchain, fast_options());
    runner
        .start(vec![Job::for_input(input.to_path_buf(), None, 3.0)], 1, callback)
        .unwrap();
    runner.wait().unwrap();
    let events = events.lock().unwrap().clone();
    events
}

fn outcome(events: &[BatchEvent]) -> JobOutcome {
    events
        .iter()
        .find_map(|e| match e {
            BatchEvent::JobDone { outcome, .. } => Some(outcome.clone()),
            _ => None,
        })
        .unwrap()
}

// One sequential test: scripts are written and executed from a single thread.
#[test]
fn scripted_tools_cover_success_failure_and_cancel() {
    let tmp = tempfile::tempdir().unwrap();
    let bin = tmp.path().join("bin");
    fs::create_dir(&bin).unwrap();
    let input = inputs(tmp.path(), &["holiday.mp4"]).remove(0);

    let probe_ok = script(&bin, "ffprobe-ok", "echo 120.000000");
    let probe_empty = script(&bin, "ffprobe-empty", "exit 0");
    let probe_hung = script(&bin, "ffprobe-hung", "exec sleep 30");
    let encode_ok = script(
        &bin,
        "ffmpeg-ok",
        "printf 'frame=1 time=00:01:00.00 bitrate=1k\\r' >&2\n\
         printf 'frame=2 time=00:02:00.00 bitrate=1k\\r' >&2\n\
         exit 0",
    );
    let encode_fail = script(
        &bin,
        "ffmpeg-fail",
        "echo \"Unknown encoder 'libx264'\" >&2\nexit 1",
    );
    let encode_slow = script(&bin, "ffmpeg-slow", "exec sleep 30");

    // Duration probe
    let tc = toolchain(&encode_ok, &probe_ok);
    assert_eq!(tc.probe_duration(&input), Ok(120.0));
    assert!(matches!(
        toolchain(&encode_ok, &probe_empty).probe_duration(&input),
        Err(JobError::DurationUnknown { .. })
    ));

    // A hung ffprobe is killed once its timeout passes
    let hung = toolchain(&encode_ok, &probe_hung).with_probe_timeout(Duration::from_millis(200));
    let probe_started = Instant::now();
    assert!(matches!(
        hung.probe_duration(&input),
        Err(JobError::DurationUnknown { .. })
    ));
    assert!(probe_started.elapsed() < WAIT);

    // Success with progress
    let events = run_one(tc, &input);
    let percents: Vec<u8> = events
        .iter()
        .filter_map(|e| match e {
            BatchEvent::Progress(p) => Some(p.percent),
            _ => None,
        })
        .collect();
    assert_eq!(percents, vec![50, 100]);
    assert!(matches!(outcome(&events), JobOutcome::Completed { .. }));

    // Non-zero exit keeps the diagnostic tail
    match outcome(&run_one(toolchain(&encode_fail, &probe_ok), &input)) {
        JobOutcome::Failed(JobError::WorkerFailure { code, tail }) => {
            assert_eq!(code, Some(1));
            assert_eq!(tail, vec!["Unknown encoder 'libx264'".to_string()]);
        }
        other => panic!("unexpected outcome {:?}", other),
    }

    // Missing executable
    let missing = bin.join("no-such-ffmpeg");
    assert!(matches!(
        outcome(&run_one(toolchain(&missing, &probe_ok), &input)),
        JobOutcome::Failed(JobError::LaunchError { .. })
    ));

    // Cancel delivers SIGTERM well before the sleep would end
    let (events, callback) = recorder();
    let mut runner = BatchRunner::new(toolchain(&encode_slow, &probe_ok), fast_options());
    runner
        .start(vec![Job::for_input(input.clone(), None, 3.0)], 1, callback)
        .unwrap();
    let started = Instant::now();
    while !events
        .lock()
        .unwrap()
        .iter()
        .any(|e| matches!(e, BatchEvent::JobStarted { .. }))
    {
        assert!(started.elapsed() < WAIT);
        thread::sleep(Duration::from_millis(5));
    }
    thread::sleep(Duration::from_millis(100));

    let summary = runner.cancel().unwrap();
    assert!(summary.cancelled);
    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(
        outcome(&events.lock().unwrap()),
        JobOutcome::Failed(JobError::Cancelled)
    );
}
