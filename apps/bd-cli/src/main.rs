use bd_core::PreferenceStore;
use bd_factory::{batch, denoiser};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "Bulk Denoiser")]
#[command(version = "1.0")]
#[command(about = "Denoise many videos at once with ffmpeg's hqdn3d filter")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    // 1. Denoise
    /// Runs a batch; prompts for anything not given on the command line
    Denoise {
        /// Input videos. When empty, pick from --dir (or the last used folder)
        inputs: Vec<PathBuf>,

        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// hqdn3d luma spatial strength, 3 when omitted
        #[arg(short, long)]
        strength: Option<String>,

        /// Simultaneous jobs
        #[arg(short, long)]
        jobs: Option<usize>,

        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Encode with libx264 instead of CUDA + h264_nvenc
        #[arg(long, default_value_t = false)]
        cpu: bool,

        #[arg(long, default_value = "3M")]
        bitrate: String,

        #[arg(long)]
        ffmpeg: Option<PathBuf>,

        #[arg(long)]
        ffprobe: Option<PathBuf>,
    },

    // 2. Probe
    /// Prints the duration ffprobe reports for a file
    Probe {
        file: PathBuf,

        #[arg(long)]
        ffprobe: Option<PathBuf>,
    },

    // 3. Prefs
    /// Shows stored preferences
    Prefs,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        // [1] DENOISE
        Commands::Denoise {
            inputs,
            dir,
            strength,
            jobs,
            output_dir,
            cpu,
            bitrate,
            ffmpeg,
            ffprobe,
        } => {
            let args = batch::DenoiseArgs {
                inputs,
                dir,
                strength,
                jobs,
                output_dir,
                use_gpu: !cpu,
                video_bitrate: bitrate,
                ffmpeg,
                ffprobe,
            };
            match batch::run_cli(args) {
                Ok(summary) if summary.all_succeeded() => ExitCode::SUCCESS,
                Ok(_) => ExitCode::FAILURE,
                Err(e) => {
                    eprintln!("❌ Denoise Error: {:#}", e);
                    ExitCode::FAILURE
                }
            }
        }

        // [2] PROBE
        Commands::Probe { file, ffprobe } => {
            let args = denoiser::ProbeArgs { file, ffprobe };
            if let Err(e) = denoiser::run_probe_cli(args) {
                eprintln!("❌ Probe Error: {}", e);
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }

        // [3] PREFS
        Commands::Prefs => match PreferenceStore::open_default() {
            Ok(store) => {
                println!("📁 {}", store.path().display());
                for (key, value) in store.iter() {
                    println!("   {} = {}", key, value);
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Preferences Error: {:#}", e);
                ExitCode::FAILURE
            }
        },
    }
}
