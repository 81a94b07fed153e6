pub mod canvas;
pub mod driver;
pub mod error;
pub mod frame;
pub mod settings;
pub mod style;
pub mod timing;
