mod audio;
mod cli;
mod config;
mod encode;
mod render;
mod workdir;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use audio::decode::{AudioSource, SymphoniaSource};
use cli::Cli;
use encode::ffmpeg::FfmpegEncoder;
use encode::mux::{MuxDurations, Muxer};
use render::driver::{AnimationDriver, CancelToken};
use render::error::RenderError;
use workdir::WorkDir;

fn main() -> Result<()> {
    let mut cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level()))
        .format_timestamp_millis()
        .init();

    // A config file that is present but does not parse is fatal.
    if let Some(path) = config::discover_config_path(cli.config.as_deref()) {
        let cfg = config::load_config(&path)?;
        log::info!("Loaded config from {}", path.display());
        cli.merge(cfg);
    }

    if !cli.input.exists() {
        anyhow::bail!("Input file not found: {}", cli.input.display());
    }

    log::info!("Input: {}", cli.input.display());
    log::info!("Output: {}", cli.output.display());
    log::info!("Style: {}", cli.style);
    log::info!("Resolution: {}x{} @ {}fps", cli.width, cli.height, cli.fps);

    // Configuration errors surface before any decoding work.
    let render_config = cli.render_config()?;
    render_config.validate()?;

    // 1. Decode audio
    log::info!("Decoding audio...");
    let audio = SymphoniaSource
        .load(&cli.input)
        .with_context(|| format!("Failed to load {}", cli.input.display()))?;
    log::debug!(
        "Audio loaded: {} samples at {}Hz",
        audio.samples().len(),
        audio.sample_rate()
    );

    // 2. Plan frames
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} frames ({eta} remaining)")
            .context("Invalid progress bar template")?
            .progress_chars("=>-"),
    );
    let mut driver = AnimationDriver::new().with_progress(pb.clone());
    let timing = driver.configure(&render_config, &audio)?;

    if timing.frame_count == 0 {
        log::warn!(
            "Audio is shorter than one frame ({} samples < {}), nothing to render",
            audio.samples().len(),
            timing.speed
        );
        return Ok(());
    }

    // 3. Render the silent animation into a scoped working directory
    let work = WorkDir::create(cli.temp_dir.as_deref())
        .context("Failed to create working directory")?;
    let animation = work.animation_path();
    log::debug!("Working directory: {}", work.path().display());

    log::info!("Making animation ({} frames)...", timing.frame_count);
    let mut encoder = FfmpegEncoder::open(&animation, &cli.video_settings())?;
    // Never set here; cancellation is only reachable when embedding the driver.
    let cancel = CancelToken::new();

    match driver.render(&audio, &mut encoder, &cancel) {
        Ok(summary) => {
            pb.finish_with_message("Rendering complete");
            log::debug!("Driver finished in state {:?}", driver.state());
            if summary.cancelled {
                anyhow::bail!(
                    "Rendering cancelled after {}/{} frames",
                    summary.frames_written,
                    summary.frame_count
                );
            }
        }
        Err(err) => {
            pb.abandon();
            if let RenderError::Encode {
                last_success_index, ..
            } = &err
            {
                match last_success_index {
                    Some(last) => log::error!("Frames 0..={} were encoded before the failure", last),
                    None => log::error!("No frames were encoded"),
                }
            }
            return Err(err.into());
        }
    }

    log::info!("Finishing encoding ({} frames)...", encoder.frames_written());
    encoder.finish().context("Failed to finish the animation")?;

    // 4. Mux with the original audio
    log::info!("Making video...");
    let durations = MuxDurations {
        video_secs: timing.video_secs(cli.fps),
        audio_secs: audio.duration_secs(),
    };
    Muxer::default()
        .combine(&animation, &cli.input, &cli.output, durations)
        .context("Failed to mux audio and video")?;

    if cli.keep_temp {
        let kept = work.keep();
        log::info!("Kept temporary files in {}", kept.display());
    }

    log::info!("Done! Output: {}", cli.output.display());
    Ok(())
}
