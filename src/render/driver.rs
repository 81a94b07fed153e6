use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use indicatif::ProgressBar;
use rayon::prelude::*;

use super::error::RenderError;
use super::frame::Frame;
use super::settings::RenderConfig;
use super::style::{render_frame, StyleState};
use super::timing::FrameTiming;
use crate::audio::buffer::AudioBuffer;
use crate::audio::spectrum::SpectrumTransform;
use crate::audio::window::WindowExtractor;
use crate::encode::sink::FrameSink;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    Uninitialized,
    Configured,
    Rendering,
    Complete,
    Cancelled,
    Failed,
}

/// Cooperative stop signal, checked between frames.
///
/// The binary never sets it: it has no interrupt handler, and Ctrl-C simply
/// terminates the process (the scratch directory is left to the OS). Callers
/// embedding the driver cancel by cloning the token into whatever thread owns
/// the stop condition.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderSummary {
    pub frame_count: usize,
    pub frames_written: usize,
    pub cancelled: bool,
}

struct Plan {
    /// Shape of the buffer the plan was built for.
    sample_rate: u32,
    buffer_len: usize,
    timing: FrameTiming,
    extractor: WindowExtractor,
    transform: SpectrumTransform,
    style: StyleState,
    parallelism: usize,
}

impl Plan {
    fn frame(&self, samples: &[f32], index: usize) -> Frame {
        let window = self.extractor.window(samples, index);
        let spectrum = self.transform.magnitudes(window);
        render_frame(index, &spectrum, &self.style)
    }
}

/// Turns an [`AudioBuffer`] into an ordered stream of frames.
///
/// `configure` validates everything up front, so a configured driver can only
/// fail while rendering if the sink rejects a frame. Frames are computed in
/// batches of `parallelism` indices and always delivered in index order, one
/// at a time.
pub struct AnimationDriver {
    state: DriverState,
    plan: Option<Plan>,
    progress: ProgressBar,
}

impl Default for AnimationDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationDriver {
    pub fn new() -> Self {
        Self {
            state: DriverState::Uninitialized,
            plan: None,
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn configure(
        &mut self,
        config: &RenderConfig,
        audio: &AudioBuffer,
    ) -> Result<FrameTiming, RenderError> {
        self.expect_state(DriverState::Uninitialized)?;

        match Self::plan(config, audio) {
            Ok(plan) => {
                let timing = plan.timing;
                log::info!(
                    "Configured: {} frames, {} samples/frame, {} samples/window",
                    timing.frame_count,
                    timing.speed,
                    timing.window_samples
                );
                self.plan = Some(plan);
                self.state = DriverState::Configured;
                Ok(timing)
            }
            Err(err) => {
                self.state = DriverState::Failed;
                Err(err)
            }
        }
    }

    fn plan(config: &RenderConfig, audio: &AudioBuffer) -> Result<Plan, RenderError> {
        config.validate()?;
        let timing = FrameTiming::new(
            audio.sample_rate(),
            audio.samples().len(),
            config.fps,
            config.window_duration,
        )?;

        Ok(Plan {
            sample_rate: audio.sample_rate(),
            buffer_len: audio.samples().len(),
            timing,
            extractor: WindowExtractor::new(timing.speed, timing.window_samples),
            transform: SpectrumTransform::new(
                config.fft_size,
                timing.window_samples,
                config.window_function,
            ),
            style: StyleState::new(&config.style, config.fft_size),
            parallelism: config.parallelism,
        })
    }

    pub fn render(
        &mut self,
        audio: &AudioBuffer,
        sink: &mut dyn FrameSink,
        cancel: &CancelToken,
    ) -> Result<RenderSummary, RenderError> {
        self.expect_state(DriverState::Configured)?;
        let Some(plan) = self.plan.as_ref() else {
            return Err(RenderError::InvalidState {
                actual: self.state,
                expected: DriverState::Configured,
            });
        };

        if audio.sample_rate() != plan.sample_rate || audio.samples().len() != plan.buffer_len {
            return Err(RenderError::Configuration(format!(
                "driver was configured for {} samples at {}Hz, got {} samples at {}Hz",
                plan.buffer_len,
                plan.sample_rate,
                audio.samples().len(),
                audio.sample_rate()
            )));
        }

        self.state = DriverState::Rendering;
        let samples = audio.samples();
        let frame_count = plan.timing.frame_count;
        self.progress.set_length(frame_count as u64);

        let mut written = 0usize;
        let mut start = 0usize;

        'batches: while start < frame_count {
            if cancel.is_cancelled() {
                break;
            }

            let end = (start + plan.parallelism).min(frame_count);
            let batch: Vec<Frame> = if end - start == 1 {
                vec![plan.frame(samples, start)]
            } else {
                (start..end)
                    .into_par_iter()
                    .map(|index| plan.frame(samples, index))
                    .collect()
            };

            for frame in batch {
                if cancel.is_cancelled() {
                    break 'batches;
                }
                let index = frame.index;
                if let Err(source) = sink.write_frame(&frame) {
                    log::error!("Sink rejected frame {}: {}", index, source);
                    self.state = DriverState::Failed;
                    return Err(RenderError::Encode {
                        index,
                        last_success_index: index.checked_sub(1),
                        source,
                    });
                }
                written += 1;
                self.progress.inc(1);
            }

            start = end;
        }

        let cancelled = written < frame_count;
        self.state = if cancelled {
            log::warn!("Render cancelled after {}/{} frames", written, frame_count);
            DriverState::Cancelled
        } else {
            log::info!("Rendered {} frames", written);
            DriverState::Complete
        };

        Ok(RenderSummary {
            frame_count,
            frames_written: written,
            cancelled,
        })
    }

    fn expect_state(&self, expected: DriverState) -> Result<(), RenderError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(RenderError::InvalidState {
                actual: self.state,
                expected,
            })
        }
    }
}
