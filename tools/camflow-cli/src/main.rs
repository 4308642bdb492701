//! camflow CLI — find camera zooms and pans in video.
//!
//! Usage:
//!   camflow extract <VIDEO>...    Compute per-frame motion metrics
//!   camflow zoom <VIDEO>...       Export zoom-in segments as an mpv EDL
//!   camflow pan <VIDEO>...        Export pan segments as an mpv EDL
//!   camflow info <VIDEO>          Summarize stored metrics
//!   camflow validate <VIDEO>...   Check stored metrics against the schema
//!   camflow check                 Check for ffmpeg, ffprobe, and mpv

use std::path::PathBuf;

use camflow_common::config::AppConfig;
use clap::{Parser, Subcommand};

mod commands;
mod preview;

#[derive(Parser)]
#[command(
    name = "camflow",
    about = "Find camera zooms and pans in video and cut them into mpv edit lists",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute per-frame motion metrics for each video
    Extract(commands::extract::ExtractArgs),

    /// Find zoom-in segments in extracted metrics
    Zoom(commands::zoom::ZoomArgs),

    /// Find sustained pans in extracted metrics
    Pan(commands::pan::PanArgs),

    /// Summarize the stored metrics of a video
    Info {
        /// Source video
        video: PathBuf,
    },

    /// Check stored metrics files against the schema
    Validate {
        /// Source videos
        #[arg(required = true)]
        videos: Vec<PathBuf>,
    },

    /// Check for required external tools
    Check,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut config, config_error) = AppConfig::load();

    // Initialize logging
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    camflow_common::logging::init_logging(&config.logging);
    if let Some(e) = config_error {
        tracing::warn!(error = %e, "Ignoring config file; using defaults");
    }

    match cli.command {
        Commands::Extract(args) => commands::extract::run(args, &config),
        Commands::Zoom(args) => commands::zoom::run(args, &config),
        Commands::Pan(args) => commands::pan::run(args, &config),
        Commands::Info { video } => commands::info::run(video),
        Commands::Validate { videos } => commands::validate::run(videos),
        Commands::Check => commands::check::run(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camflow_media::edl::EdlPurpose;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_pan_flags_override_config() {
        let cli = Cli::try_parse_from([
            "camflow",
            "pan",
            "--no-zoom-gate",
            "--bad-frame-scope",
            "stream",
            "--min-frames",
            "4",
            "--purpose",
            "final",
            "a.mp4",
            "b.mp4",
        ])
        .unwrap();

        let Commands::Pan(args) = cli.command else {
            panic!("expected pan");
        };
        assert_eq!(args.inputs.len(), 2);
        assert_eq!(args.output.purpose, EdlPurpose::Final);
        assert_eq!(args.min_frames, Some(4));
        assert!(args.no_zoom_gate);
        assert!(args.angle.is_none());
    }

    #[test]
    fn test_extract_requires_an_input() {
        assert!(Cli::try_parse_from(["camflow", "extract"]).is_err());
        assert!(Cli::try_parse_from(["camflow", "-v", "extract", "--preview", "a.mp4"]).is_ok());
    }
}
