/// Inclusive value range mapped onto one canvas axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisRange {
    pub min: f32,
    pub max: f32,
}

impl AxisRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> f32 {
        self.max - self.min
    }

    /// Position of `value` inside the range, 0.0 at `min` and 1.0 at `max`.
    pub fn normalize(&self, value: f32) -> f32 {
        (value - self.min) / self.width()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FramePayload {
    /// Mirrored magnitude curves. Point `k` of each curve sits at `x = k`.
    Waveform {
        positive: Vec<f32>,
        negative: Vec<f32>,
    },
    /// One height per frequency bin group; bar `k` spans `x in [k, k + 1)`.
    Bars { heights: Vec<f32> },
}

/// Everything needed to draw one video frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub index: usize,
    pub x_range: AxisRange,
    pub y_range: AxisRange,
    pub payload: FramePayload,
}
