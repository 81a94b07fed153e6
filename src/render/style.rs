use std::str::FromStr;

use serde::Deserialize;

use super::error::RenderError;
use super::frame::{AxisRange, Frame, FramePayload};

/// Smallest peak the bar style will scale to. Silent frames would otherwise
/// collapse the vertical range to zero width.
pub const MIN_BAR_SCALE: f32 = 1e-3;

/// Style identifiers accepted on the command line and in config files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleKind {
    #[default]
    Simple,
    Bar,
}

impl FromStr for StyleKind {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "simple" | "waveform" => Ok(StyleKind::Simple),
            "bar" | "bars" => Ok(StyleKind::Bar),
            other => Err(RenderError::Configuration(format!(
                "unknown animation style '{}' (expected simple or bar)",
                other
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StyleConfig {
    /// Mirrored magnitude curves on a fixed `[-ceiling, ceiling]` scale.
    Waveform { amplitude_ceiling: f32 },
    /// Averaged magnitude bars, rescaled to each frame's own peak.
    BinnedBar { bin_count: usize },
}

impl StyleConfig {
    pub fn validate(&self, fft_size: usize) -> Result<(), RenderError> {
        match *self {
            StyleConfig::Waveform { amplitude_ceiling } => {
                if !amplitude_ceiling.is_finite() || amplitude_ceiling <= 0.0 {
                    return Err(RenderError::Configuration(format!(
                        "amplitude ceiling must be a positive number, got {}",
                        amplitude_ceiling
                    )));
                }
            }
            StyleConfig::BinnedBar { bin_count } => {
                let half = fft_size / 2;
                if bin_count == 0 || bin_count > half {
                    return Err(RenderError::Configuration(format!(
                        "bin count must be between 1 and {} (fft_size / 2), got {}",
                        half, bin_count
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Per-style data derived once at configuration time and shared read-only by
/// every frame.
#[derive(Clone, Debug, PartialEq)]
pub enum StyleState {
    Waveform {
        x_range: AxisRange,
        y_range: AxisRange,
    },
    BinnedBar {
        edges: Vec<usize>,
    },
}

impl StyleState {
    pub fn new(style: &StyleConfig, fft_size: usize) -> Self {
        let half = fft_size / 2;
        match *style {
            StyleConfig::Waveform { amplitude_ceiling } => StyleState::Waveform {
                x_range: AxisRange::new(0.0, half as f32),
                y_range: AxisRange::new(-amplitude_ceiling, amplitude_ceiling),
            },
            StyleConfig::BinnedBar { bin_count } => StyleState::BinnedBar {
                edges: bin_edges(half, bin_count),
            },
        }
    }
}

/// Uniform histogram edges over the index range `0..len`.
///
/// Returns `bins + 1` monotonically non-decreasing edges starting at 0 and
/// ending at `len`. With more bins than indices some ranges are empty.
pub fn bin_edges(len: usize, bins: usize) -> Vec<usize> {
    if bins == 0 {
        return vec![0];
    }
    (0..=bins).map(|k| k * len / bins).collect()
}

/// Turn one frame's magnitude spectrum into its drawable payload.
pub fn render_frame(index: usize, spectrum: &[f32], state: &StyleState) -> Frame {
    match state {
        StyleState::Waveform { x_range, y_range } => Frame {
            index,
            x_range: *x_range,
            y_range: *y_range,
            payload: FramePayload::Waveform {
                positive: spectrum.to_vec(),
                negative: spectrum.iter().map(|m| -m).collect(),
            },
        },
        StyleState::BinnedBar { edges } => {
            let heights = bar_heights(spectrum, edges);
            Frame {
                index,
                x_range: AxisRange::new(0.0, heights.len() as f32),
                y_range: bar_range(index, spectrum),
                payload: FramePayload::Bars { heights },
            }
        }
    }
}

fn bar_heights(spectrum: &[f32], edges: &[usize]) -> Vec<f32> {
    edges
        .windows(2)
        .map(|edge| {
            let lo = edge[0].min(spectrum.len());
            let hi = edge[1].min(spectrum.len());
            let slice = &spectrum[lo..hi.max(lo)];
            if slice.is_empty() {
                0.0
            } else {
                slice.iter().sum::<f32>() / slice.len() as f32
            }
        })
        .collect()
}

fn bar_range(index: usize, spectrum: &[f32]) -> AxisRange {
    let peak = spectrum.iter().copied().fold(0.0f32, f32::max);
    let peak = if peak.is_finite() && peak >= MIN_BAR_SCALE {
        peak
    } else {
        log::trace!("Frame {}: peak {} below scale floor", index, peak);
        MIN_BAR_SCALE
    };
    AxisRange::new(-peak / 4.0, peak)
}
