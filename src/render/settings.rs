use super::error::RenderError;
use super::style::StyleConfig;
use crate::audio::spectrum::WindowFunction;

/// Parameters of one render. Fixed once the driver is configured.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    pub fps: u32,
    /// Length of each analysis window in seconds.
    pub window_duration: f32,
    /// Number of FFT points reported; the spectrum has `fft_size / 2` bins.
    pub fft_size: usize,
    pub window_function: WindowFunction,
    pub style: StyleConfig,
    /// Frames computed concurrently before being handed to the sink in order.
    pub parallelism: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fps: 20,
            window_duration: 0.3,
            fft_size: 3000,
            window_function: WindowFunction::Rectangular,
            style: StyleConfig::Waveform {
                amplitude_ceiling: 1000.0,
            },
            parallelism: 1,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.fps == 0 {
            return Err(RenderError::Configuration("fps must be positive".into()));
        }
        if !self.window_duration.is_finite() || self.window_duration <= 0.0 {
            return Err(RenderError::Configuration(format!(
                "window duration must be positive, got {}",
                self.window_duration
            )));
        }
        if self.fft_size < 2 || self.fft_size % 2 != 0 {
            return Err(RenderError::Configuration(format!(
                "fft size must be a positive even number, got {}",
                self.fft_size
            )));
        }
        if self.parallelism == 0 {
            return Err(RenderError::Configuration(
                "parallelism must be at least 1".into(),
            ));
        }
        self.style.validate(self.fft_size)
    }
}
