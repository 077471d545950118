//! An editing session: one engine, one surface, and the loads in flight.
//!
//! Image loads run as tasks in a [`JoinSet`] owned by the session, which
//! applies completions in arrival order, either opportunistically with
//! [`Session::pump`] or by waiting for all of them with [`Session::settle`].
//! Nothing else mutates the session, so no locks are needed.
//!
//! Load failures never reach the caller as errors. They are logged and
//! recorded as [`Notice`]s, and the scene is left as it was.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use canvas::engine::{Action, ControlValues, EngineCore};
use canvas::geometry::{ClientRect, Size};
use canvas::images::ImageHandle;
use canvas::input::{Cursor, InputEvent};
use canvas::render::{self, RenderError, RenderOptions};
use canvas::scene::{Scene, StickerId};
use image::RgbaImage;
use tokio::task::{self, JoinError, JoinSet};
use tracing::{debug, info, trace, warn};

use crate::loader::{ImageSource, LoadError, Loader};

/// Fixed name of the exported file.
pub const EXPORT_FILENAME: &str = "sticker-creation.png";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("export encode failed: {0}")]
    Export(#[from] RenderError),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadKind {
    Background,
    Sticker,
}

/// A user-facing message about something that went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: LoadKind,
    pub message: String,
}

struct LoadOutcome {
    kind: LoadKind,
    source: ImageSource,
    result: Result<ImageHandle, LoadError>,
}

pub struct Session {
    engine: EngineCore,
    surface: RgbaImage,
    loader: Arc<Loader>,
    loads: JoinSet<LoadOutcome>,
    pending: HashMap<task::Id, LoadKind>,
    notices: Vec<Notice>,
    cursor: Cursor,
    controls: Option<ControlValues>,
}

impl Session {
    /// Start an empty session on a `canvas`-sized logical canvas displayed at `client_rect`.
    #[must_use]
    pub fn new(canvas: Size, client_rect: ClientRect, loader: Arc<Loader>) -> Self {
        let mut engine = EngineCore::new(canvas);
        engine.set_client_rect(client_rect);
        let mut surface = engine.new_surface();
        engine.render(&mut surface, RenderOptions::default());
        Self {
            engine,
            surface,
            loader,
            loads: JoinSet::new(),
            pending: HashMap::new(),
            notices: Vec::new(),
            cursor: Cursor::Pointer,
            controls: None,
        }
    }

    // --- Loading ---

    /// Begin loading a replacement background. Must be called inside a tokio runtime.
    pub fn load_background(&mut self, source: ImageSource) {
        self.spawn_load(LoadKind::Background, source);
    }

    /// Begin loading a new sticker. Must be called inside a tokio runtime.
    pub fn add_sticker(&mut self, source: ImageSource) {
        self.spawn_load(LoadKind::Sticker, source);
    }

    fn spawn_load(&mut self, kind: LoadKind, source: ImageSource) {
        debug!(?kind, %source, remote = source.is_remote(), "load requested");
        let loader = Arc::clone(&self.loader);
        let handle = self.loads.spawn(async move {
            let result = loader.load(&source).await;
            LoadOutcome { kind, source, result }
        });
        self.pending.insert(handle.id(), kind);
    }

    /// Apply every completion that has already arrived, without waiting.
    /// Returns how many were applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Some(joined) = self.loads.try_join_next_with_id() {
            self.finish(joined);
            applied += 1;
        }
        applied
    }

    /// Wait until every requested load has completed and been applied.
    /// A load task that panics is recorded as a notice.
    pub async fn settle(&mut self) {
        while let Some(joined) = self.loads.join_next_with_id().await {
            self.finish(joined);
        }
    }

    /// Loads requested but not yet applied.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.loads.len()
    }

    fn finish(&mut self, joined: Result<(task::Id, LoadOutcome), JoinError>) {
        match joined {
            Ok((id, outcome)) => {
                self.pending.remove(&id);
                self.apply(outcome);
            }
            Err(e) => {
                let kind = self.pending.remove(&e.id()).unwrap_or(LoadKind::Sticker);
                warn!(?kind, error = %e, "load task failed");
                self.notices.push(Notice { kind, message: format!("Image load stopped unexpectedly: {e}") });
            }
        }
    }

    fn apply(&mut self, outcome: LoadOutcome) {
        let LoadOutcome { kind, source, result } = outcome;
        match (kind, result) {
            (LoadKind::Background, Ok(image)) => {
                let size = image.size();
                info!(%source, width = size.width, height = size.height, "background loaded");
                let actions = self.engine.set_background(image);
                self.process(actions);
            }
            (LoadKind::Sticker, Ok(image)) => {
                let (id, actions) = self.engine.add_sticker(image, source.to_string());
                info!(sticker = %id, %source, "sticker added");
                self.process(actions);
            }
            (LoadKind::Background, Err(e)) => {
                warn!(%source, error = %e, "background load failed");
                self.notices.push(Notice {
                    kind,
                    message: format!("Could not load background image {source}: {e}"),
                });
            }
            (LoadKind::Sticker, Err(e)) => {
                warn!(%source, error = %e, "sticker load failed");
                self.notices.push(Notice {
                    kind,
                    message: format!(
                        "Failed to load sticker from {source}. The image may be blocked by \
                         cross-origin or server restrictions. ({e})"
                    ),
                });
            }
        }
    }

    // --- Editing ---

    /// Feed one input event through the gesture state machine.
    pub fn handle_input(&mut self, event: InputEvent) {
        let actions = self.engine.handle(event);
        self.process(actions);
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        let actions = self.engine.set_rotation(degrees);
        self.process(actions);
        self.controls = self.engine.controls();
    }

    pub fn set_scale(&mut self, scale: f64) {
        let actions = self.engine.set_scale(scale);
        self.process(actions);
        self.controls = self.engine.controls();
    }

    pub fn toggle_flip(&mut self) {
        let actions = self.engine.toggle_flip();
        self.process(actions);
        self.controls = self.engine.controls();
    }

    /// Remove the selected sticker. No-op without a selection.
    pub fn delete_active(&mut self) {
        let actions = self.engine.delete_active();
        self.process(actions);
    }

    /// Clear the scene. Decoded images and pending loads are kept.
    pub fn reset(&mut self) {
        info!(stickers = self.engine.scene.stickers().len(), "session reset");
        let actions = self.engine.reset();
        self.process(actions);
    }

    /// Apply engine actions, redrawing at most once.
    fn process(&mut self, actions: Vec<Action>) {
        let mut redraw = false;
        for action in actions {
            match action {
                Action::RenderNeeded => redraw = true,
                Action::SelectionChanged(values) => self.controls = values,
                Action::ControlsChanged(values) => self.controls = Some(values),
                Action::SetCursor(cursor) => {
                    trace!(cursor = cursor.as_css(), "cursor");
                    self.cursor = cursor;
                }
            }
        }
        if redraw {
            self.engine.render(&mut self.surface, RenderOptions::default());
        }
    }

    // --- Export ---

    /// Encode the scene as PNG without the selection outline.
    ///
    /// Returns `Ok(None)` when there is no background. The surface is
    /// redrawn with the outline afterwards, whether or not encoding succeeded.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Export` if PNG encoding fails.
    pub fn export(&mut self) -> Result<Option<Vec<u8>>, SessionError> {
        if !self.engine.scene.has_background() {
            debug!("export skipped: no background");
            return Ok(None);
        }
        self.engine.render(&mut self.surface, RenderOptions { selection: false });
        let encoded = render::encode_png(&self.surface);
        self.engine.render(&mut self.surface, RenderOptions::default());
        Ok(Some(encoded?))
    }

    /// Export into `dir` as [`EXPORT_FILENAME`], creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Encoding or filesystem failures.
    pub async fn export_to(&mut self, dir: &Path) -> Result<Option<PathBuf>, SessionError> {
        let Some(bytes) = self.export()? else {
            return Ok(None);
        };
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| SessionError::Io { path: dir.to_path_buf(), source })?;
        let path = dir.join(EXPORT_FILENAME);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|source| SessionError::Io { path: path.clone(), source })?;
        info!(path = %path.display(), bytes = bytes.len(), "exported");
        Ok(Some(path))
    }

    // --- Queries ---

    /// The last rendered frame, selection outline included.
    #[must_use]
    pub fn surface(&self) -> &RgbaImage {
        &self.surface
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.engine.scene
    }

    #[must_use]
    pub fn engine(&self) -> &EngineCore {
        &self.engine
    }

    #[must_use]
    pub fn selection(&self) -> Option<StickerId> {
        self.engine.selection()
    }

    /// Control values as last reported for the selected sticker.
    #[must_use]
    pub fn controls(&self) -> Option<ControlValues> {
        self.controls
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    #[must_use]
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Drain recorded notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
