use super::error::RenderError;

/// Sample-domain layout of the animation, derived once per render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameTiming {
    /// Samples advanced between consecutive frames.
    pub speed: usize,
    /// Samples covered by each analysis window, never more than the buffer
    /// holds.
    pub window_samples: usize,
    pub frame_count: usize,
}

impl FrameTiming {
    pub fn new(
        sample_rate: u32,
        buffer_len: usize,
        fps: u32,
        window_duration: f32,
    ) -> Result<Self, RenderError> {
        if fps == 0 {
            return Err(RenderError::Configuration("fps must be positive".into()));
        }

        let speed = (sample_rate / fps) as usize;
        if speed == 0 {
            return Err(RenderError::Configuration(format!(
                "{} fps exceeds the sample rate of {}Hz: less than one sample per frame",
                fps, sample_rate
            )));
        }

        let window_samples = (window_duration as f64 * sample_rate as f64).round();
        if !window_samples.is_finite() || window_samples < 1.0 {
            return Err(RenderError::Configuration(format!(
                "window of {}s holds no samples at {}Hz",
                window_duration, sample_rate
            )));
        }

        // Windows never extend past the end of the buffer.
        let nominal = window_samples as usize;
        let window_samples = nominal.min(buffer_len.max(1));
        if window_samples < nominal {
            log::debug!(
                "Window of {}s exceeds the {}-sample buffer, using {} samples",
                window_duration,
                buffer_len,
                window_samples
            );
        }

        Ok(Self {
            speed,
            window_samples,
            frame_count: buffer_len / speed,
        })
    }

    /// Length of the rendered video in seconds.
    pub fn video_secs(&self, fps: u32) -> f64 {
        self.frame_count as f64 / fps as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case::one_second_cd(44_100, 44_100, 20, 2205, 20)]
    #[case::telephone(8_000, 8_000, 20, 400, 20)]
    #[case::shorter_than_a_frame(8_000, 100, 20, 400, 0)]
    #[case::partial_last_frame(8_000, 1_199, 20, 400, 2)]
    #[case::uneven_rate(44_100, 100_000, 30, 1470, 68)]
    fn frame_count_scenarios(
        #[case] sample_rate: u32,
        #[case] len: usize,
        #[case] fps: u32,
        #[case] speed: usize,
        #[case] frames: usize,
    ) {
        let timing = FrameTiming::new(sample_rate, len, fps, 0.3).unwrap();
        assert_eq!(timing.speed, speed);
        assert_eq!(timing.frame_count, frames);
    }

    #[test]
    fn fps_above_sample_rate_is_a_configuration_error() {
        let err = FrameTiming::new(20, 1_000, 50, 0.3).unwrap_err();
        assert!(matches!(err, RenderError::Configuration(_)));
    }

    #[test]
    fn zero_fps_is_rejected() {
        assert!(FrameTiming::new(44_100, 1_000, 0, 0.3).is_err());
    }

    #[test]
    fn window_rounds_to_nearest_sample() {
        let timing = FrameTiming::new(44_100, 44_100, 20, 0.3).unwrap();
        assert_eq!(timing.window_samples, 13_230);
        assert!(FrameTiming::new(44_100, 44_100, 20, 0.0).is_err());
        assert!(FrameTiming::new(44_100, 44_100, 20, f32::NAN).is_err());
    }

    #[test]
    fn window_is_capped_at_buffer_length() {
        let timing = FrameTiming::new(8_000, 8_000, 20, 1.0e7).unwrap();
        assert_eq!(timing.window_samples, 8_000);
        assert_eq!(timing.frame_count, 20);

        let short = FrameTiming::new(8_000, 100, 20, 0.3).unwrap();
        assert_eq!(short.window_samples, 100);
    }

    #[test]
    fn deterministic_across_calls() {
        let a = FrameTiming::new(48_000, 1_234_567, 24, 0.25).unwrap();
        let b = FrameTiming::new(48_000, 1_234_567, 24, 0.25).unwrap();
        assert_eq!(a, b);
        assert_relative_eq!(a.video_secs(24), a.frame_count as f64 / 24.0);
    }
}
