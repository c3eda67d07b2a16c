use super::core::FfmpegToolchain;
use super::types::{ProbeArgs, Toolchain, ToolPaths};
use anyhow::Result;
use bd_core::{display_name, format_hms};
use std::time::Duration;

pub fn run_probe_cli(args: ProbeArgs) -> Result<f64> {
    let mut paths = ToolPaths::default();
    if let Some(ffprobe) = args.ffprobe {
        paths.ffprobe = ffprobe;
    }
    let toolchain = FfmpegToolchain {
        paths,
        ..Default::default()
    };

    let seconds = toolchain.probe_duration(&args.file)?;
    println!(
        "🎞️  {}: {:.3}s ({})",
        display_name(&args.file),
        seconds,
        format_hms(Duration::from_secs_f64(seconds))
    );
    Ok(seconds)
}
