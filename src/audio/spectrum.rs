use std::str::FromStr;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use serde::Deserialize;

use crate::render::error::RenderError;

/// Taper applied to a window before the transform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowFunction {
    /// No taper; the raw samples go straight into the FFT.
    #[default]
    Rectangular,
    Hann,
}

impl WindowFunction {
    fn coefficients(self, size: usize) -> Option<Vec<f32>> {
        match self {
            WindowFunction::Rectangular => None,
            WindowFunction::Hann => Some(hann_window(size)),
        }
    }
}

impl FromStr for WindowFunction {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rectangular" | "rect" | "none" => Ok(WindowFunction::Rectangular),
            "hann" | "hanning" => Ok(WindowFunction::Hann),
            other => Err(RenderError::Configuration(format!(
                "unknown window function '{}' (expected rectangular or hann)",
                other
            ))),
        }
    }
}

/// Single-sided magnitude spectrum of one audio window.
///
/// The FFT is planned once for `max(window_samples, fft_size)` points.
/// Windows shorter than that (the tail of the track) are zero-padded, so
/// every frame shares the same bin spacing and the output always holds
/// exactly `fft_size / 2` magnitudes.
pub struct SpectrumTransform {
    fft: Arc<dyn Fft<f32>>,
    transform_len: usize,
    bins: usize,
    taper: Option<Vec<f32>>,
}

impl SpectrumTransform {
    pub fn new(fft_size: usize, window_samples: usize, window_function: WindowFunction) -> Self {
        let transform_len = window_samples.max(fft_size);
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(transform_len);

        log::debug!(
            "Planned {}-point FFT ({} samples per window, {} output bins)",
            transform_len,
            window_samples,
            fft_size / 2
        );

        Self {
            fft,
            transform_len,
            bins: fft_size / 2,
            taper: window_function.coefficients(window_samples),
        }
    }

    pub fn magnitudes(&self, window: &[f32]) -> Vec<f32> {
        let mut buffer = vec![Complex::new(0.0f32, 0.0); self.transform_len];

        // Taper is indexed by position in the nominal window so truncated
        // tail windows keep the same leading shape.
        for (i, (slot, &sample)) in buffer.iter_mut().zip(window).enumerate() {
            let gain = self
                .taper
                .as_ref()
                .and_then(|t| t.get(i).copied())
                .unwrap_or(1.0);
            *slot = Complex::new(sample * gain, 0.0);
        }

        self.fft.process(&mut buffer);

        buffer[..self.bins].iter().map(|c| c.norm()).collect()
    }
}

fn hann_window(size: usize) -> Vec<f32> {
    if size <= 1 {
        return vec![1.0; size];
    }
    (0..size)
        .map(|i| {
            0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32).cos())
        })
        .collect()
}
