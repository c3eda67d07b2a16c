use super::types::ToolPaths;
use anyhow::{bail, Context, Result};
use bd_core::media::{is_video_file, DEFAULT_STRENGTH};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub fn check_dependencies(paths: &ToolPaths) -> Result<()> {
    for dep in [&paths.ffmpeg, &paths.ffprobe] {
        which::which(dep)
            .with_context(|| format!("Error: '{}' not found in PATH.", dep.display()))?;
    }
    Ok(())
}

/// `HH:MM:SS[.fraction]` to seconds. Negative clocks are rejected
/// (ffmpeg prints a huge negative clock before the first packet).
pub fn parse_ffmpeg_time(time_str: &str) -> Option<f64> {
    if time_str.starts_with('-') {
        return None;
    }
    let parts: Vec<&str> = time_str.split(':').collect();
    if parts.len() != 3 {
        return None;
    }
    let h: f64 = parts[0].parse().ok()?;
    let m: f64 = parts[1].parse().ok()?;
    let s: f64 = parts[2].parse().ok()?;
    let total = h * 3600.0 + m * 60.0 + s;
    (total.is_finite() && total >= 0.0).then_some(total)
}

/// Media seconds from the `time=` field of a progress record.
pub fn extract_time_field(line: &str) -> Option<f64> {
    let idx = line.find("time=")?;
    let remainder = &line[idx + 5..];
    let time_str = remainder.split_whitespace().next()?;
    parse_ffmpeg_time(time_str)
}

pub fn progress_percent(media_seconds: f64, total_duration: f64) -> u8 {
    if total_duration <= 0.0 {
        return 0;
    }
    (100.0 * media_seconds / total_duration).round().clamp(0.0, 100.0) as u8
}

/// `elapsed * (100 - p) / p`; unknown until the first non-zero percent.
pub fn estimate_remaining(elapsed: Duration, percent: u8) -> Option<Duration> {
    if percent == 0 {
        return None;
    }
    let p = f64::from(percent.min(100));
    Some(elapsed.mul_f64((100.0 - p) / p))
}

/// `output_<stem>_denoised.mp4` next to the input unless an output dir is given.
pub fn output_path_for(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "video".into());
    let dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));
    dir.join(format!("output_{}_denoised.mp4", stem))
}

/// Blank means the default strength.
pub fn parse_strength(text: &str) -> Result<f64> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(DEFAULT_STRENGTH);
    }
    let value: f64 = text
        .parse()
        .with_context(|| format!("Denoise strength '{}' is not a number", text))?;
    if !value.is_finite() || value < 0.0 {
        bail!("Denoise strength must be a non-negative number, got {}", text);
    }
    Ok(value)
}

/// Video files directly inside `dir`, sorted by name.
pub fn scan_video_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_video_file(e.path()))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn halfway_through_two_minutes_is_fifty_percent() {
        let line = "frame= 1500 fps= 98 q=29.0 size=   10240kB time=00:01:00.00 bitrate=1398.1kbits/s speed=3.9x";
        let t = extract_time_field(line).unwrap();
        assert_eq!(t, 60.0);
        assert_eq!(progress_percent(t, 120.0), 50);
    }

    #[test]
    fn time_parsing_accepts_fraction_and_rejects_garbage() {
        assert_eq!(parse_ffmpeg_time("01:02:03.5"), Some(3723.5));
        assert_eq!(parse_ffmpeg_time("00:00:07"), Some(7.0));
        assert_eq!(parse_ffmpeg_time("N/A"), None);
        assert_eq!(parse_ffmpeg_time("12:30"), None);
        assert_eq!(parse_ffmpeg_time("-577014:32:22.77"), None);
        assert_eq!(parse_ffmpeg_time("-00:00:01.50"), None);
        assert_eq!(extract_time_field("frame=0 time=-00:00:00.04 bitrate=N/A"), None);
        assert_eq!(extract_time_field("time=N/A bitrate=N/A"), None);
        assert_eq!(extract_time_field("Press [q] to stop"), None);
        assert_eq!(extract_time_field("time="), None);
    }

    #[test]
    fn percent_is_rounded_and_clamped() {
        assert_eq!(progress_percent(0.0, 120.0), 0);
        assert_eq!(progress_percent(1.0, 3.0), 33);
        assert_eq!(progress_percent(2.0, 3.0), 67);
        assert_eq!(progress_percent(130.0, 120.0), 100);
        assert_eq!(progress_percent(10.0, 0.0), 0);
    }

    #[test]
    fn remaining_time_follows_linear_estimate() {
        assert_eq!(estimate_remaining(Duration::from_secs(30), 0), None);
        assert_eq!(
            estimate_remaining(Duration::from_secs(30), 25),
            Some(Duration::from_secs(90))
        );
        assert_eq!(
            estimate_remaining(Duration::from_secs(30), 100),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn output_name_keeps_stem() {
        let input = Path::new("/videos/holiday.mkv");
        assert_eq!(
            output_path_for(input, None),
            PathBuf::from("/videos/output_holiday_denoised.mp4")
        );
        assert_eq!(
            output_path_for(input, Some(Path::new("/out"))),
            PathBuf::from("/out/output_holiday_denoised.mp4")
        );
    }

    #[test]
    fn strength_defaults_when_blank() {
        assert_eq!(parse_strength("").unwrap(), 3.0);
        assert_eq!(parse_strength("  4.5 ").unwrap(), 4.5);
        assert!(parse_strength("strong").is_err());
        assert!(parse_strength("-1").is_err());
    }

    #[test]
    fn scan_picks_only_videos() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["b.mp4", "a.MOV", "readme.txt"] {
            std::fs::write(tmp.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(tmp.path().join("nested.mkv")).unwrap();

        let names: Vec<String> = scan_video_files(tmp.path())
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.MOV".to_string(), "b.mp4".to_string()]);
    }
}
