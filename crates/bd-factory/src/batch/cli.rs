use super::core::BatchRunner;
use super::types::*;
use crate::denoiser::{
    check_dependencies, parse_strength, scan_video_files, EncoderSettings, FfmpegToolchain,
    ToolPaths,
};
use anyhow::{bail, Context, Result};
use bd_core::{
    display_name, format_hms, format_optional_hms, media::CONCURRENCY_CHOICES, PreferenceStore,
};
use dialoguer::{theme::ColorfulTheme, MultiSelect, Select};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

pub fn run_cli(args: DenoiseArgs) -> Result<BatchSummary> {
    // 1. Tools
    let mut paths = ToolPaths::default();
    if let Some(ffmpeg) = args.ffmpeg {
        paths.ffmpeg = ffmpeg;
    }
    if let Some(ffprobe) = args.ffprobe {
        paths.ffprobe = ffprobe;
    }
    check_dependencies(&paths)?;

    // 2. Select Inputs
    let mut prefs = match PreferenceStore::open_default() {
        Ok(p) => Some(p),
        Err(e) => {
            warn!(error = %e, "Preferences unavailable");
            None
        }
    };

    let inputs = if !args.inputs.is_empty() {
        args.inputs
    } else {
        let dir = args
            .dir
            .or_else(|| prefs.as_ref().and_then(|p| p.last_input_dir()))
            .context("No input directory given and no home directory found")?;
        select_inputs(&dir)?
    };

    if let Some(prefs) = prefs.as_mut() {
        if let Some(dir) = input_folder_of(&inputs[0]) {
            if let Err(e) = prefs.set_last_input_dir(&dir) {
                warn!(error = %e, "Could not store input folder");
            }
        }
    }

    // 3. Parameters
    let strength = parse_strength(args.strength.as_deref().unwrap_or(""))?;
    let concurrency = match args.jobs {
        Some(0) => bail!("--jobs must be at least 1"),
        Some(n) => n,
        None => {
            let options: Vec<String> = CONCURRENCY_CHOICES.iter().map(|n| n.to_string()).collect();
            let idx = Select::with_theme(&ColorfulTheme::default())
                .with_prompt("Simultaneous Denoise")
                .items(&options)
                .default(0)
                .interact()?;
            CONCURRENCY_CHOICES[idx]
        }
    };

    if let Some(dir) = &args.output_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let jobs: Vec<Job> = inputs
        .iter()
        .map(|input| Job::for_input(input.clone(), args.output_dir.as_deref(), strength))
        .collect();

    println!(
        "\n🚀 Denoising {} file(s) [strength {} | {} at a time | {}]",
        jobs.len(),
        strength,
        concurrency,
        if args.use_gpu { "GPU" } else { "CPU" }
    );

    // 4. Progress Bars
    let multi = MultiProgress::new();
    let job_style = ProgressStyle::with_template(
        "{prefix:28} [{bar:30.cyan/blue}] {pos:>3}% {msg}",
    )?
    .progress_chars("#>-");
    let total_style =
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {pos}/{len} done {msg}")?;

    let bars: Vec<ProgressBar> = jobs
        .iter()
        .map(|job| {
            let pb = multi.add(ProgressBar::new(100));
            pb.set_style(job_style.clone());
            pb.set_prefix(display_name(&job.input_path));
            pb.set_message("Pending");
            pb
        })
        .collect();
    let overall = multi.add(ProgressBar::new(jobs.len() as u64));
    overall.set_style(total_style);

    // 5. Run
    let toolchain = FfmpegToolchain::new(
        paths,
        EncoderSettings {
            use_gpu: args.use_gpu,
            video_bitrate: args.video_bitrate,
            ..Default::default()
        },
    );
    let mut runner = BatchRunner::new(toolchain, RunnerOptions::default());

    let printer = multi.clone();
    let overall_cb = overall.clone();
    runner.start(jobs, concurrency, move |event| match event {
        BatchEvent::JobStarted { id, .. } => {
            bars[id.index()].set_message("Processing");
        }
        BatchEvent::Progress(p) => {
            let pb = &bars[p.id.index()];
            pb.set_position(u64::from(p.percent));
            pb.set_message(format!(
                "{} elapsed, {} left",
                format_hms(p.elapsed),
                format_optional_hms(p.remaining)
            ));
        }
        BatchEvent::JobDone { id, outcome } => {
            let pb = &bars[id.index()];
            match outcome {
                JobOutcome::Completed { output, elapsed } => {
                    pb.set_position(100);
                    pb.finish_with_message(format!(
                        "✅ {} ({})",
                        display_name(&output),
                        format_hms(elapsed)
                    ));
                }
                JobOutcome::Failed(e) => {
                    pb.abandon_with_message(format!("❌ {}", e));
                    for line in e.tail() {
                        let _ = printer.println(format!("   {} | {}", id, line));
                    }
                }
            }
            overall_cb.inc(1);
        }
        BatchEvent::BatchDone(_) => overall_cb.finish_with_message("All tasks finished."),
    })?;

    if let Some(handle) = runner.canceller() {
        if let Err(e) = ctrlc::set_handler(move || {
            println!("\n🛑 Cancelling, waiting for running jobs to stop...");
            handle.cancel();
        }) {
            warn!(error = %e, "Could not install Ctrl+C handler");
        }
    }

    let summary = runner
        .wait()
        .context("Batch coordinator stopped unexpectedly")?;

    println!(
        "\n--- {} completed, {} failed{} in {} ---",
        summary.completed,
        summary.failed,
        if summary.cancelled {
            format!(", {} skipped (cancelled)", summary.skipped)
        } else {
            String::new()
        },
        format_hms(summary.elapsed)
    );
    Ok(summary)
}

fn select_inputs(dir: &Path) -> Result<Vec<PathBuf>> {
    let files = scan_video_files(dir);
    if files.is_empty() {
        bail!("No video files found in {}", dir.display());
    }

    let names: Vec<String> = files.iter().map(|p| display_name(p)).collect();
    let selections = MultiSelect::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Select Videos ({})", dir.display()))
        .items(&names)
        .interact()?;
    if selections.is_empty() {
        bail!("Select at least one video.");
    }
    Ok(selections.into_iter().map(|i| files[i].clone()).collect())
}

fn input_folder_of(input: &Path) -> Option<PathBuf> {
    fs::canonicalize(input)
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
}
