use super::decode::AudioError;

/// Mono samples in roughly [-1, 1] and the rate they play back at.
///
/// Only constructible through [`AudioBuffer::new`], so a buffer in hand always
/// has at least one sample and a non-zero sample rate.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self, AudioError> {
        if sample_rate == 0 {
            return Err(AudioError::ZeroSampleRate);
        }
        if samples.is_empty() {
            return Err(AudioError::Empty);
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rejects_zero_sample_rate() {
        assert!(matches!(
            AudioBuffer::new(vec![0.0; 10], 0),
            Err(AudioError::ZeroSampleRate)
        ));
    }

    #[test]
    fn rejects_empty_samples() {
        assert!(matches!(
            AudioBuffer::new(Vec::new(), 44_100),
            Err(AudioError::Empty)
        ));
    }

    #[test]
    fn duration_from_length_and_rate() {
        let audio = AudioBuffer::new(vec![0.0; 22_050], 44_100).unwrap();
        assert_relative_eq!(audio.duration_secs(), 0.5);
        assert_eq!(audio.samples().len(), 22_050);
        assert_eq!(audio.sample_rate(), 44_100);
    }
}
