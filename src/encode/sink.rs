use std::process::ExitStatus;

use thiserror::Error;

use crate::render::frame::Frame;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("failed to spawn ffmpeg (is it installed?): {0}")]
    Spawn(#[source] std::io::Error),
    #[error("failed to write frame to encoder: {0}")]
    Io(#[from] std::io::Error),
    #[error("encoder input is already closed")]
    Closed,
    #[error("ffmpeg exited with {status}:\n{stderr}")]
    Process { status: ExitStatus, stderr: String },
}

/// Receives frames strictly in the order they were produced.
pub trait FrameSink {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), EncodeError>;
}

impl FrameSink for Vec<Frame> {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), EncodeError> {
        self.push(frame.clone());
        Ok(())
    }
}
