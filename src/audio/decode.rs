use std::path::{Path, PathBuf};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

use super::buffer::AudioBuffer;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("failed to open audio file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),
    #[error("failed to decode audio: {0}")]
    Decode(#[from] SymphoniaError),
    #[error("audio contains no samples")]
    Empty,
    #[error("audio reports a sample rate of zero")]
    ZeroSampleRate,
}

/// Anything that can turn a file on disk into a mono [`AudioBuffer`].
pub trait AudioSource {
    fn load(&self, path: &Path) -> Result<AudioBuffer, AudioError>;
}

/// Decodes every container symphonia was built with, downmixing to mono.
#[derive(Clone, Copy, Debug, Default)]
pub struct SymphoniaSource;

impl AudioSource for SymphoniaSource {
    fn load(&self, path: &Path) -> Result<AudioBuffer, AudioError> {
        let file = std::fs::File::open(path).map_err(|source| AudioError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| AudioError::UnsupportedFormat(e.to_string()))?;

        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| AudioError::UnsupportedFormat("no audio tracks found".into()))?;

        let track_id = track.id;
        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| AudioError::UnsupportedFormat("unknown sample rate".into()))?;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| AudioError::UnsupportedFormat(e.to_string()))?;

        let mut all_samples: Vec<f32> = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => return Err(e.into()),
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(SymphoniaError::DecodeError(msg)) => {
                    log::debug!("Skipping corrupt packet: {}", msg);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let spec = *decoded.spec();
            let channels = spec.channels.count().max(1);

            let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
            sample_buf.copy_interleaved_ref(decoded);

            let samples = sample_buf.samples();

            if channels == 1 {
                all_samples.extend_from_slice(samples);
            } else {
                all_samples.extend(
                    samples
                        .chunks(channels)
                        .map(|frame| frame.iter().sum::<f32>() / channels as f32),
                );
            }
        }

        log::info!(
            "Decoded audio: {} samples, {}Hz, {:.1}s",
            all_samples.len(),
            sample_rate,
            all_samples.len() as f32 / sample_rate as f32
        );

        AudioBuffer::new(all_samples, sample_rate)
    }
}
