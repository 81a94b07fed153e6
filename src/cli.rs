use anyhow::Result;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::audio::spectrum::WindowFunction;
use crate::config::Config;
use crate::encode::ffmpeg::VideoSettings;
use crate::render::settings::RenderConfig;
use crate::render::style::{StyleConfig, StyleKind};

pub const DEFAULT_WIDTH: u32 = 1920;
pub const DEFAULT_HEIGHT: u32 = 1080;
pub const DEFAULT_FPS: u32 = 20;
pub const DEFAULT_CRF: u32 = 18;
pub const DEFAULT_CODEC: &str = "libx264";
pub const DEFAULT_PIX_FMT: &str = "yuv420p";
pub const DEFAULT_WINDOW: f32 = 0.3;
pub const DEFAULT_FFT_SIZE: usize = 3000;
pub const DEFAULT_MAX_Y: f32 = 1000.0;
pub const DEFAULT_BINS: usize = 64;
const DEFAULT_STYLE: &str = "simple";
const DEFAULT_WINDOW_FUNCTION: &str = "rectangular";

#[derive(Parser, Debug)]
#[command(name = "spectrovid", about = "Convert an audio file into a spectrum animation video")]
pub struct Cli {
    /// Input audio file (WAV, MP3, FLAC, OGG, AAC)
    pub input: PathBuf,

    /// Output video file
    #[arg(short, long, default_value = "final.mp4")]
    pub output: PathBuf,

    /// Animation style: simple (mirrored spectrum) or bar
    #[arg(short, long, default_value = DEFAULT_STYLE)]
    pub style: String,

    /// Frames per second
    #[arg(long, default_value_t = DEFAULT_FPS)]
    pub fps: u32,

    /// Verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Video width in pixels
    #[arg(long, default_value_t = DEFAULT_WIDTH, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: u32,

    /// Video height in pixels
    #[arg(long, default_value_t = DEFAULT_HEIGHT, value_parser = clap::value_parser!(u32).range(1..))]
    pub height: u32,

    /// H.264 CRF quality (0-51, lower = better). Ignored when --bitrate is set.
    #[arg(long, default_value_t = DEFAULT_CRF)]
    pub crf: u32,

    /// Video bitrate (e.g. 2400k, 5M). When set, uses -b:v instead of -crf.
    #[arg(short, long)]
    pub bitrate: Option<String>,

    /// FFmpeg video codec
    #[arg(long, default_value = DEFAULT_CODEC)]
    pub codec: String,

    /// FFmpeg pixel format
    #[arg(long, default_value = DEFAULT_PIX_FMT)]
    pub pix_fmt: String,

    /// Analysis window length in seconds
    #[arg(long, default_value_t = DEFAULT_WINDOW)]
    pub window: f32,

    /// FFT size; the spectrum shows the first fft_size/2 bins
    #[arg(long, default_value_t = DEFAULT_FFT_SIZE)]
    pub fft_size: usize,

    /// Window function applied before the FFT: rectangular or hann
    #[arg(long, default_value = DEFAULT_WINDOW_FUNCTION)]
    pub window_function: String,

    /// Vertical scale of the simple style
    #[arg(long, default_value_t = DEFAULT_MAX_Y)]
    pub max_y: f32,

    /// Number of bars in the bar style
    #[arg(long, default_value_t = DEFAULT_BINS)]
    pub bins: usize,

    /// Frames computed in parallel (defaults to the number of CPUs)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Config file (defaults to ./spectrovid.toml or the user config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Parent directory for temporary files
    #[arg(long)]
    pub temp_dir: Option<PathBuf>,

    /// Keep the temporary directory after the run
    #[arg(long)]
    pub keep_temp: bool,
}

impl Cli {
    /// Config values apply only where the command line was left at its default.
    pub fn merge(&mut self, cfg: Config) {
        if self.width == DEFAULT_WIDTH { self.width = cfg.output.width; }
        if self.height == DEFAULT_HEIGHT { self.height = cfg.output.height; }
        if self.fps == DEFAULT_FPS { self.fps = cfg.output.fps; }
        if self.crf == DEFAULT_CRF { self.crf = cfg.output.crf; }
        if self.codec == DEFAULT_CODEC { self.codec = cfg.output.codec; }
        if self.pix_fmt == DEFAULT_PIX_FMT { self.pix_fmt = cfg.output.pix_fmt; }
        if self.window == DEFAULT_WINDOW { self.window = cfg.analysis.window_duration; }
        if self.fft_size == DEFAULT_FFT_SIZE { self.fft_size = cfg.analysis.fft_size; }
        if self.max_y == DEFAULT_MAX_Y { self.max_y = cfg.style.amplitude_ceiling; }
        if self.bins == DEFAULT_BINS { self.bins = cfg.style.bin_count; }
        if self.window_function == DEFAULT_WINDOW_FUNCTION {
            self.window_function = match cfg.analysis.window_function {
                WindowFunction::Rectangular => "rectangular".into(),
                WindowFunction::Hann => "hann".into(),
            };
        }
        if self.style == DEFAULT_STYLE {
            self.style = match cfg.style.kind {
                StyleKind::Simple => "simple".into(),
                StyleKind::Bar => "bar".into(),
            };
        }
    }

    pub fn render_config(&self) -> Result<RenderConfig> {
        let style = match self.style.parse::<StyleKind>()? {
            StyleKind::Simple => StyleConfig::Waveform {
                amplitude_ceiling: self.max_y,
            },
            StyleKind::Bar => StyleConfig::BinnedBar {
                bin_count: self.bins,
            },
        };

        Ok(RenderConfig {
            fps: self.fps,
            window_duration: self.window,
            fft_size: self.fft_size,
            window_function: self.window_function.parse()?,
            style,
            parallelism: self.jobs.unwrap_or_else(rayon::current_num_threads),
        })
    }

    pub fn video_settings(&self) -> VideoSettings {
        VideoSettings {
            width: self.width,
            height: self.height,
            fps: self.fps,
            codec: self.codec.clone(),
            pix_fmt: self.pix_fmt.clone(),
            crf: self.crf,
            bitrate: self.bitrate.clone(),
        }
    }

    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
