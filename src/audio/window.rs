/// Slices the analysis window for a frame out of the full sample buffer.
///
/// Frame `i` starts `i * speed` samples in and spans `window_samples`
/// samples. Windows that run past the end of the buffer are truncated, and a
/// start beyond the end yields an empty slice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowExtractor {
    speed: usize,
    window_samples: usize,
}

impl WindowExtractor {
    pub fn new(speed: usize, window_samples: usize) -> Self {
        Self {
            speed,
            window_samples,
        }
    }

    pub fn window<'a>(&self, samples: &'a [f32], index: usize) -> &'a [f32] {
        let start = index.saturating_mul(self.speed).min(samples.len());
        let end = start.saturating_add(self.window_samples).min(samples.len());
        &samples[start..end]
    }
}
