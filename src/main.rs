use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use matchdex_core::settings::normalize_fps;
use matchdex_core::timecode::hhmmss;
use matchdex_core::{FlushPolicy, FrameSource, Indexer, Layout, Reporter, RunSettings, VideoInfo};
use matchdex_cv::{DetectionConfig, PreviewWindow, TemplateAnalyzer, TemplateLoader, VideoSource};
use std::io;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod report;

use report::{ReportFormat, ReportWriter};

/// Index the matches played in a recorded fighting game video.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Layout name, resolved as `<layouts>/<LAYOUT>.json`
    layout: String,

    /// Video file to index
    filename: PathBuf,

    /// Print matches as CSV
    #[arg(short = 'c', long)]
    csv: bool,

    /// Prefix each match with its sequence number
    #[arg(short = 'n', long)]
    numbers: bool,

    /// Require the round clock to be visible for a match to start
    #[arg(short = 'i', long)]
    include_clock: bool,

    /// Show a live preview window (press `q` to stop)
    #[arg(short = 'p', long)]
    preview: bool,

    /// Open the preview window at half size
    #[arg(short = 'z', long)]
    zoom_out: bool,

    /// Character template directory
    #[arg(short = 't', long, default_value = "templates")]
    templates: PathBuf,

    /// Directory holding layout files
    #[arg(long, default_value = "layouts")]
    layouts: PathBuf,

    /// Frames skipped between samples (0 samples every frame)
    #[arg(long)]
    frame_skip: Option<u32>,

    /// Seconds a character may go unseen before the player is considered gone
    #[arg(long, value_name = "SECS")]
    detect_threshold: Option<f64>,

    /// Seconds the clock must hold a new state before it flips
    #[arg(long, value_name = "SECS")]
    clock_threshold: Option<f64>,

    /// When a match still open at end of video is reported
    #[arg(long, value_enum, default_value_t = Flush::Players)]
    flush_policy: Flush,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Flush {
    /// Both players still on screen
    Players,
    /// Both players and the clock still on screen
    All,
    /// Always
    Session,
}

impl From<Flush> for FlushPolicy {
    fn from(flush: Flush) -> Self {
        match flush {
            Flush::Players => FlushPolicy::PlayersPresent,
            Flush::All => FlushPolicy::AllSignalsPresent,
            Flush::Session => FlushPolicy::AnyOpenSession,
        }
    }
}

impl Cli {
    fn settings(&self) -> RunSettings {
        let defaults = RunSettings::default();
        RunSettings {
            include_clock: self.include_clock,
            frame_skip: self.frame_skip.unwrap_or(defaults.frame_skip),
            detect_threshold_sec: self.detect_threshold.unwrap_or(defaults.detect_threshold_sec),
            clock_threshold_sec: self.clock_threshold.unwrap_or(defaults.clock_threshold_sec),
            flush_policy: self.flush_policy.into(),
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "matchdex=debug" } else { "matchdex=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if !cli.templates.is_dir() {
        bail!("Templates directory not found: {}", cli.templates.display());
    }
    if !cli.filename.is_file() {
        bail!("Video file not found: {}", cli.filename.display());
    }

    let settings = cli.settings();
    settings.validate()?;

    let layout = Layout::find(&cli.layouts, &cli.layout)
        .with_context(|| format!("Failed to load layout `{}`", cli.layout))?;
    layout.validate(settings.include_clock)?;

    let mut video = VideoSource::open(&cli.filename)?;
    let info = video.info();
    let fps = normalize_fps(info.fps)?;
    layout.check_fits(info.width, info.height, settings.include_clock)?;

    info!("Templates: {}", cli.templates.display());
    info!("Layout: {}", cli.layout);
    info!("Clock detection: {}", on_off(settings.include_clock));
    info!("Preview: {}", on_off(cli.preview));
    info!("Detection threshold: {}", layout.threshold);
    info!("Video: {}", cli.filename.display());
    info!("Frame size: {}x{}", info.width, info.height);
    info!("Frame rate: {fps:.2}");
    info!("Length: {}", hhmmss(VideoInfo { fps, ..info }.length_secs()));

    let library = TemplateLoader::new(&cli.templates, layout.scale).load(settings.include_clock)?;
    let roster = library.roster().clone();

    let config = DetectionConfig::from_layout(&layout, settings.include_clock);
    let mut analyzer = TemplateAnalyzer::new(config, library)?;
    if cli.preview {
        analyzer = analyzer.with_preview(PreviewWindow::open(info.width, info.height, cli.zoom_out)?);
    }

    let indexer = Indexer::new(roster, settings)?;
    let format = if cli.csv { ReportFormat::Csv } else { ReportFormat::Text };
    let mut reporter = ReportWriter::new(io::stdout().lock(), format, cli.numbers);

    let summary = indexer.run(&mut video, &mut analyzer, &mut reporter)?;
    if summary.frames_read == 0 {
        warn!("No frames could be read from {}", cli.filename.display());
    }
    reporter.finish(&summary, indexer.roster())?;

    Ok(())
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}
