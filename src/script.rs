//! Replayable editing scripts.
//!
//! A script is a JSON array of steps, each an object tagged by `op`:
//!
//! ```json
//! [
//!   { "op": "load_background", "source": "beach.jpg" },
//!   { "op": "add_sticker", "source": "sun" },
//!   { "op": "pointer_down", "x": 512, "y": 512 },
//!   { "op": "pointer_move", "x": 700, "y": 300 },
//!   { "op": "pointer_up" },
//!   { "op": "export" }
//! ]
//! ```
//!
//! Coordinates are in client space. Load steps wait for their image before
//! the next step runs, so scripts are deterministic.

use std::path::{Path, PathBuf};

use canvas::geometry::Point;
use canvas::input::{InputEvent, WheelDelta};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::loader::ImageSource;
use crate::palette::Palette;
use crate::session::{Session, SessionError};

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("failed to read script {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid script: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp,
    PointerLeave,
    Wheel {
        x: f64,
        y: f64,
        #[serde(default)]
        dx: f64,
        dy: f64,
    },
    TouchStart { touches: Vec<Point> },
    TouchMove { touches: Vec<Point> },
    TouchEnd,
    TouchCancel,
    SetRotation { degrees: f64 },
    SetScale { scale: f64 },
    ToggleFlip,
    DeleteActive,
    /// Palette name or raw source.
    AddSticker { source: String },
    LoadBackground { source: String },
    Reset,
    /// Export into `dir`, or the run's output directory when absent.
    Export {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dir: Option<PathBuf>,
    },
}

impl Step {
    /// The input event this step replays, if it is an input step.
    #[must_use]
    pub fn input_event(&self) -> Option<InputEvent> {
        let event = match self {
            Self::PointerDown { x, y } => InputEvent::PointerDown(Point::new(*x, *y)),
            Self::PointerMove { x, y } => InputEvent::PointerMove(Point::new(*x, *y)),
            Self::PointerUp => InputEvent::PointerUp,
            Self::PointerLeave => InputEvent::PointerLeave,
            Self::Wheel { x, y, dx, dy } => InputEvent::Wheel {
                client: Point::new(*x, *y),
                delta: WheelDelta { dx: *dx, dy: *dy },
            },
            Self::TouchStart { touches } => InputEvent::TouchStart(touches.clone()),
            Self::TouchMove { touches } => InputEvent::TouchMove(touches.clone()),
            Self::TouchEnd => InputEvent::TouchEnd,
            Self::TouchCancel => InputEvent::TouchCancel,
            _ => return None,
        };
        Some(event)
    }
}

/// Parse a script from JSON text.
///
/// # Errors
///
/// Returns `ScriptError::Parse` for malformed JSON or an unknown `op`.
pub fn parse(json: &str) -> Result<Vec<Step>, ScriptError> {
    Ok(serde_json::from_str(json)?)
}

/// Read and parse a script file.
///
/// # Errors
///
/// Returns `ScriptError::Io` if the file cannot be read, or `Parse`.
pub async fn load(path: &Path) -> Result<Vec<Step>, ScriptError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ScriptError::Io { path: path.to_path_buf(), source })?;
    parse(&text)
}

/// What a script run produced.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub steps: usize,
    /// Files written by `export` steps, in order.
    pub exports: Vec<PathBuf>,
}

/// Replay `steps` against `session`.
///
/// # Errors
///
/// Only export failures abort a run; load failures become session notices.
pub async fn run(
    session: &mut Session,
    steps: &[Step],
    palette: &Palette,
    out_dir: &Path,
) -> Result<RunReport, ScriptError> {
    let mut report = RunReport::default();
    for (index, step) in steps.iter().enumerate() {
        debug!(index, ?step, "script step");
        if let Some(event) = step.input_event() {
            session.handle_input(event);
        } else {
            match step {
                Step::SetRotation { degrees } => session.set_rotation(*degrees),
                Step::SetScale { scale } => session.set_scale(*scale),
                Step::ToggleFlip => session.toggle_flip(),
                Step::DeleteActive => session.delete_active(),
                Step::AddSticker { source } => {
                    session.add_sticker(palette.resolve(source));
                    session.settle().await;
                }
                Step::LoadBackground { source } => {
                    session.load_background(ImageSource::parse(source));
                    session.settle().await;
                }
                Step::Reset => session.reset(),
                Step::Export { dir } => {
                    let dir = dir.as_deref().unwrap_or(out_dir);
                    if let Some(path) = session.export_to(dir).await? {
                        report.exports.push(path);
                    }
                }
                _ => {}
            }
        }
        report.steps += 1;
    }
    info!(steps = report.steps, exports = report.exports.len(), "script finished");
    Ok(report)
}

#[cfg(test)]
#[path = "script_test.rs"]
mod tests;
