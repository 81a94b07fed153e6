use thiserror::Error;

use super::driver::DriverState;
use crate::encode::sink::EncodeError;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("invalid render configuration: {0}")]
    Configuration(String),
    #[error("animation driver is {actual:?}, expected {expected:?}")]
    InvalidState {
        actual: DriverState,
        expected: DriverState,
    },
    /// The sink rejected `index`; every frame up to `last_success_index` was
    /// accepted and nothing after `index` was produced.
    #[error("encoder rejected frame {index}: {source}")]
    Encode {
        index: usize,
        last_success_index: Option<usize>,
        #[source]
        source: EncodeError,
    },
}
