//! Composer configuration parsed from environment variables.
//!
//! Every knob has a default, so an empty environment yields a working
//! 1024×1024 composer that writes into the current directory. Command-line
//! flags are applied on top by `main`.

use std::path::PathBuf;

use canvas::geometry::{ClientRect, Size};
use tracing_subscriber::EnvFilter;

pub const DEFAULT_CANVAS_SIZE: u32 = 1024;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_OUT_DIR: &str = ".";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var}: {value:?} (expected {expected})")]
    Invalid { var: &'static str, value: String, expected: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComposerConfig {
    /// Edge length of the square logical canvas.
    pub canvas_size: u32,
    /// Size the canvas is displayed at in client space; scripts speak in these units.
    pub client_width: f64,
    pub client_height: f64,
    pub timeouts: FetchTimeouts,
    /// Directory exports are written into.
    pub out_dir: PathBuf,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            canvas_size: DEFAULT_CANVAS_SIZE,
            client_width: f64::from(DEFAULT_CANVAS_SIZE),
            client_height: f64::from(DEFAULT_CANVAS_SIZE),
            timeouts: FetchTimeouts {
                request_secs: DEFAULT_FETCH_TIMEOUT_SECS,
                connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            },
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
        }
    }
}

impl ComposerConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `STICKERBOARD_CANVAS_SIZE`: default 1024, must be positive
    /// - `STICKERBOARD_CLIENT_WIDTH` / `STICKERBOARD_CLIENT_HEIGHT`: default canvas size
    /// - `STICKERBOARD_FETCH_TIMEOUT_SECS`: default 30
    /// - `STICKERBOARD_CONNECT_TIMEOUT_SECS`: default 10
    /// - `STICKERBOARD_OUT_DIR`: default `.`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for a zero canvas size or a non-positive client extent.
    pub fn from_env() -> Result<Self, ConfigError> {
        let canvas_size = parse_canvas_size(std::env::var("STICKERBOARD_CANVAS_SIZE").ok().as_deref())?;
        let client_width = parse_client_extent(
            "STICKERBOARD_CLIENT_WIDTH",
            std::env::var("STICKERBOARD_CLIENT_WIDTH").ok().as_deref(),
            canvas_size,
        )?;
        let client_height = parse_client_extent(
            "STICKERBOARD_CLIENT_HEIGHT",
            std::env::var("STICKERBOARD_CLIENT_HEIGHT").ok().as_deref(),
            canvas_size,
        )?;
        let timeouts = FetchTimeouts {
            request_secs: env_parse("STICKERBOARD_FETCH_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT_SECS),
            connect_secs: env_parse("STICKERBOARD_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let out_dir = std::env::var("STICKERBOARD_OUT_DIR").map_or_else(|_| PathBuf::from(DEFAULT_OUT_DIR), PathBuf::from);

        Ok(Self { canvas_size, client_width, client_height, timeouts, out_dir })
    }

    /// Logical canvas size.
    #[must_use]
    pub fn canvas(&self) -> Size {
        Size::square(f64::from(self.canvas_size))
    }

    /// Where the canvas sits in client space.
    #[must_use]
    pub fn client_rect(&self) -> ClientRect {
        ClientRect::at_origin(Size::new(self.client_width, self.client_height))
    }

    /// Override the canvas size, keeping the client size in step when it was tracking it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for a zero size.
    #[allow(clippy::float_cmp)]
    pub fn with_canvas_size(mut self, size: u32) -> Result<Self, ConfigError> {
        if size == 0 {
            return Err(ConfigError::Invalid {
                var: "--canvas-size",
                value: size.to_string(),
                expected: "a positive integer",
            });
        }
        let previous = f64::from(self.canvas_size);
        if self.client_width == previous && self.client_height == previous {
            self.client_width = f64::from(size);
            self.client_height = f64::from(size);
        }
        self.canvas_size = size;
        Ok(self)
    }

    /// Override the client display size. Either extent may be left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for a zero, negative, or non-finite extent.
    pub fn with_client_size(mut self, width: Option<f64>, height: Option<f64>) -> Result<Self, ConfigError> {
        if let Some(width) = width {
            self.client_width = check_client_extent("--client-width", width)?;
        }
        if let Some(height) = height {
            self.client_height = check_client_extent("--client-height", height)?;
        }
        Ok(self)
    }
}

/// Log filter from a `RUST_LOG`-style directive string. Unset or malformed
/// input falls back to [`DEFAULT_LOG_FILTER`].
#[must_use]
pub fn log_filter(raw: Option<&str>) -> EnvFilter {
    raw.and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_canvas_size(raw: Option<&str>) -> Result<u32, ConfigError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_CANVAS_SIZE);
    };
    match raw.trim().parse::<u32>() {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(ConfigError::Invalid {
            var: "STICKERBOARD_CANVAS_SIZE",
            value: raw.to_string(),
            expected: "a positive integer",
        }),
    }
}

fn parse_client_extent(var: &'static str, raw: Option<&str>, canvas_size: u32) -> Result<f64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(f64::from(canvas_size));
    };
    match raw.trim().parse::<f64>() {
        Ok(v) => check_client_extent(var, v),
        Err(_) => Err(ConfigError::Invalid { var, value: raw.to_string(), expected: "a positive number" }),
    }
}

fn check_client_extent(var: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::Invalid { var, value: value.to_string(), expected: "a positive number" })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
