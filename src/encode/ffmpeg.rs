use std::ffi::OsString;
use std::io::{Read, Write};
use std::path::Path;
use std::process::{Child, Command, Stdio};

use super::sink::{EncodeError, FrameSink};
use crate::render::canvas::Canvas;
use crate::render::frame::Frame;

#[derive(Clone, Debug, PartialEq)]
pub struct VideoSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub codec: String,
    pub pix_fmt: String,
    pub crf: u32,
    pub bitrate: Option<String>,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fps: 20,
            codec: "libx264".into(),
            pix_fmt: "yuv420p".into(),
            crf: 18,
            bitrate: None,
        }
    }
}

/// Builds the ffmpeg arguments for a silent video fed raw RGBA on stdin.
pub fn encoder_args(output_path: &Path, settings: &VideoSettings) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        "-y".to_string(),
        "-hide_banner".into(),
        "-loglevel".into(), "error".into(),
        "-f".into(), "rawvideo".into(),
        "-pixel_format".into(), "rgba".into(),
        "-video_size".into(), format!("{}x{}", settings.width, settings.height),
        "-framerate".into(), settings.fps.to_string(),
        "-i".into(), "pipe:0".into(),
        "-an".into(),
        "-c:v".into(), settings.codec.clone(),
        "-pix_fmt".into(), settings.pix_fmt.clone(),
    ]
    .into_iter()
    .map(OsString::from)
    .collect();

    if let Some(ref br) = settings.bitrate {
        args.extend(["-b:v", br.as_str()].map(OsString::from));
    } else {
        args.push("-crf".into());
        args.push(settings.crf.to_string().into());
        args.extend(["-preset", "medium"].map(OsString::from));
    }

    args.push(output_path.as_os_str().to_os_string());
    args
}

/// Video sink that rasterizes each frame and pipes it into an ffmpeg child.
pub struct FfmpegEncoder {
    child: Option<Child>,
    canvas: Canvas,
    pixels: Vec<u8>,
    frames_written: usize,
}

impl FfmpegEncoder {
    pub fn open(output_path: &Path, settings: &VideoSettings) -> Result<Self, EncodeError> {
        let child = Command::new("ffmpeg")
            .args(encoder_args(output_path, settings))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(EncodeError::Spawn)?;

        log::info!(
            "FFmpeg encoder started: {}x{} @ {}fps, codec={}",
            settings.width,
            settings.height,
            settings.fps,
            settings.codec
        );

        let canvas = Canvas::new(settings.width, settings.height);
        Ok(Self {
            child: Some(child),
            pixels: Vec::with_capacity(canvas.frame_bytes()),
            canvas,
            frames_written: 0,
        })
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    pub fn finish(mut self) -> Result<(), EncodeError> {
        let mut child = self.child.take().ok_or(EncodeError::Closed)?;
        // Close stdin to signal EOF
        drop(child.stdin.take());

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(EncodeError::Process {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        log::info!("FFmpeg encoding complete ({} frames)", self.frames_written);
        Ok(())
    }
}

impl FrameSink for FfmpegEncoder {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), EncodeError> {
        let child = self.child.as_mut().ok_or(EncodeError::Closed)?;
        let stdin = child.stdin.as_mut().ok_or(EncodeError::Closed)?;

        self.canvas.rasterize(frame, &mut self.pixels);
        if let Err(err) = stdin.write_all(&self.pixels) {
            // A broken pipe means ffmpeg died; its stderr says why.
            let mut stderr = String::new();
            if let Some(mut pipe) = child.stderr.take() {
                let _ = pipe.read_to_string(&mut stderr);
            }
            if !stderr.is_empty() {
                log::error!("ffmpeg: {}", stderr.trim_end());
            }
            return Err(err.into());
        }

        self.frames_written += 1;
        Ok(())
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            log::debug!("Killing unfinished ffmpeg encoder");
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_as_strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn encodes_silent_rawvideo_with_crf_by_default() {
        let args = args_as_strings(&encoder_args(
            Path::new("/tmp/work/animation.mp4"),
            &VideoSettings::default(),
        ));
        let joined = args.join(" ");
        assert!(joined.contains("-f rawvideo -pixel_format rgba -video_size 1920x1080"));
        assert!(joined.contains("-framerate 20"));
        assert!(joined.contains("-an"));
        assert!(joined.contains("-crf 18 -preset medium"));
        assert_eq!(args.last().unwrap(), "/tmp/work/animation.mp4");
    }

    #[test]
    fn bitrate_replaces_crf() {
        let settings = VideoSettings {
            bitrate: Some("5M".into()),
            ..Default::default()
        };
        let args = args_as_strings(&encoder_args(Path::new("out.mp4"), &settings));
        assert!(args.windows(2).any(|w| w[0] == "-b:v" && w[1] == "5M"));
        assert!(!args.iter().any(|a| a == "-crf"));
    }
}
