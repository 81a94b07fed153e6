use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MuxError {
    #[error("failed to run ffmpeg for muxing: {0}")]
    Io(#[from] std::io::Error),
    #[error("ffmpeg muxing exited with {status}:\n{stderr}")]
    Codec { status: ExitStatus, stderr: String },
}

/// Which stream gets cut so both end together.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trim {
    None,
    Audio,
    Video,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MuxDurations {
    pub video_secs: f64,
    pub audio_secs: f64,
}

impl MuxDurations {
    /// The output length and the stream that has to be shortened to reach it.
    pub fn reconciled(&self) -> (f64, Trim) {
        if self.audio_secs > self.video_secs {
            (self.video_secs, Trim::Audio)
        } else if self.video_secs > self.audio_secs {
            (self.audio_secs, Trim::Video)
        } else {
            (self.video_secs, Trim::None)
        }
    }
}

/// Combines the rendered animation with the source audio into one container.
pub struct Muxer {
    program: OsString,
}

impl Default for Muxer {
    fn default() -> Self {
        Self {
            program: "ffmpeg".into(),
        }
    }
}

impl Muxer {
    pub fn args(video: &Path, audio: &Path, output: &Path, duration_secs: f64) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-y",
            "-hide_banner",
            "-loglevel",
            "error",
            "-i",
        ]
        .map(OsString::from)
        .to_vec();
        args.push(video.into());
        args.push("-i".into());
        args.push(audio.into());
        args.extend(
            [
                "-map".to_string(), "0:v:0".into(),
                "-map".into(), "1:a:0".into(),
                "-t".into(), format!("{:.3}", duration_secs),
                "-c:v".into(), "copy".into(),
                "-c:a".into(), "aac".into(),
                "-b:a".into(), "192k".into(),
            ]
            .map(OsString::from),
        );
        args.push(output.into());
        args
    }

    pub fn combine(
        &self,
        video: &Path,
        audio: &Path,
        output: &Path,
        durations: MuxDurations,
    ) -> Result<(), MuxError> {
        let (duration, trim) = durations.reconciled();
        match trim {
            Trim::Audio => log::info!(
                "Audio ({:.2}s) is longer than video, cutting to {:.2}s",
                durations.audio_secs,
                duration
            ),
            Trim::Video => log::info!(
                "Video ({:.2}s) is longer than audio, cutting to {:.2}s",
                durations.video_secs,
                duration
            ),
            Trim::None => log::debug!("Audio and video both last {:.2}s", duration),
        }

        let output_status = Command::new(&self.program)
            .args(Self::args(video, audio, output, duration))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()?;

        if !output_status.status.success() {
            return Err(MuxError::Codec {
                status: output_status.status,
                stderr: String::from_utf8_lossy(&output_status.stderr).into_owned(),
            });
        }

        log::info!("Muxed {} ({:.2}s)", output.display(), duration);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case::audio_longer(10.0, 10.4, 10.0, Trim::Audio)]
    #[case::video_longer(10.0, 9.95, 9.95, Trim::Video)]
    #[case::equal(3.0, 3.0, 3.0, Trim::None)]
    fn cuts_the_longer_stream(
        #[case] video_secs: f64,
        #[case] audio_secs: f64,
        #[case] expected: f64,
        #[case] trim: Trim,
    ) {
        let (duration, actual) = MuxDurations {
            video_secs,
            audio_secs,
        }
        .reconciled();
        assert_relative_eq!(duration, expected);
        assert_eq!(actual, trim);
    }

    #[test]
    fn maps_video_then_audio_and_limits_duration() {
        let args: Vec<String> = Muxer::args(
            Path::new("work/animation.mp4"),
            Path::new("song.flac"),
            Path::new("final.mp4"),
            12.25,
        )
        .iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
        let joined = args.join(" ");
        assert!(joined.contains("-i work/animation.mp4 -i song.flac"));
        assert!(joined.contains("-map 0:v:0 -map 1:a:0 -t 12.250"));
        assert!(joined.contains("-c:v copy"));
        assert_eq!(args.last().unwrap(), "final.mp4");
    }

    #[test]
    fn missing_program_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let muxer = Muxer {
            program: dir.path().join("no-such-ffmpeg").into_os_string(),
        };
        let err = muxer
            .combine(
                Path::new("a.mp4"),
                Path::new("b.wav"),
                &dir.path().join("out.mp4"),
                MuxDurations {
                    video_secs: 1.0,
                    audio_secs: 1.0,
                },
            )
            .unwrap_err();
        assert!(matches!(err, MuxError::Io(_)));
    }
}
