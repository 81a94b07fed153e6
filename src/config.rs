use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::audio::spectrum::WindowFunction;
use crate::cli;
use crate::render::style::StyleKind;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub style: StyleSection,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_crf")]
    pub crf: u32,
    #[serde(default = "default_codec")]
    pub codec: String,
    #[serde(default = "default_pix_fmt")]
    pub pix_fmt: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_window")]
    pub window_duration: f32,
    #[serde(default = "default_fft_size")]
    pub fft_size: usize,
    #[serde(default)]
    pub window_function: WindowFunction,
}

#[derive(Debug, Deserialize)]
pub struct StyleSection {
    #[serde(default)]
    pub kind: StyleKind,
    #[serde(default = "default_max_y")]
    pub amplitude_ceiling: f32,
    #[serde(default = "default_bins")]
    pub bin_count: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            fps: default_fps(),
            crf: default_crf(),
            codec: default_codec(),
            pix_fmt: default_pix_fmt(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_duration: default_window(),
            fft_size: default_fft_size(),
            window_function: WindowFunction::default(),
        }
    }
}

impl Default for StyleSection {
    fn default() -> Self {
        Self {
            kind: StyleKind::default(),
            amplitude_ceiling: default_max_y(),
            bin_count: default_bins(),
        }
    }
}

fn default_width() -> u32 { cli::DEFAULT_WIDTH }
fn default_height() -> u32 { cli::DEFAULT_HEIGHT }
fn default_fps() -> u32 { cli::DEFAULT_FPS }
fn default_crf() -> u32 { cli::DEFAULT_CRF }
fn default_codec() -> String { cli::DEFAULT_CODEC.into() }
fn default_pix_fmt() -> String { cli::DEFAULT_PIX_FMT.into() }
fn default_window() -> f32 { cli::DEFAULT_WINDOW }
fn default_fft_size() -> usize { cli::DEFAULT_FFT_SIZE }
fn default_max_y() -> f32 { cli::DEFAULT_MAX_Y }
fn default_bins() -> usize { cli::DEFAULT_BINS }

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse config: {}", path.display()))
}

/// Explicit path, else `spectrovid.toml` in the working directory, else the
/// per-user config file.
pub fn discover_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from("spectrovid.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("spectrovid").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("spectrovid").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.output.fps, 20);
        assert_eq!(cfg.output.width, 1920);
        assert_eq!(cfg.analysis.fft_size, 3000);
        assert_eq!(cfg.analysis.window_function, WindowFunction::Rectangular);
        assert_eq!(cfg.style.kind, StyleKind::Simple);
        assert_eq!(cfg.style.amplitude_ceiling, 1000.0);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [output]
            fps = 30

            [analysis]
            window_function = "hann"

            [style]
            kind = "bar"
            bin_count = 48
            "#,
        )
        .unwrap();
        assert_eq!(cfg.output.fps, 30);
        assert_eq!(cfg.output.codec, "libx264");
        assert_eq!(cfg.analysis.window_function, WindowFunction::Hann);
        assert_eq!(cfg.analysis.window_duration, 0.3);
        assert_eq!(cfg.style.kind, StyleKind::Bar);
        assert_eq!(cfg.style.bin_count, 48);
    }

    #[test]
    fn load_reports_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spectrovid.toml");
        std::fs::write(&path, "[output]\nfps = \"fast\"\n").unwrap();
        assert!(load_config(&path).is_err());
        assert!(load_config(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn unknown_style_kind_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spectrovid.toml");
        std::fs::write(&path, "[style]\nkind = \"sparkles\"\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("sparkles"));
    }

    #[test]
    fn unknown_window_function_is_rejected() {
        assert!(toml::from_str::<Config>("[analysis]\nwindow_function = \"kaiser\"\n").is_err());
    }

    #[test]
    fn explicit_path_wins() {
        let path = Path::new("/somewhere/custom.toml");
        assert_eq!(discover_config_path(Some(path)), Some(path.to_path_buf()));
    }
}
