use image::RgbaImage;
use tracing::{debug, trace};

use crate::geometry::{ClientRect, Placement, Point, Size, distance, midpoint, to_canvas_coordinates};
use crate::hit::{Target, hit_test};
use crate::images::{ImageHandle, ImageStore};
use crate::input::{Cursor, InputEvent, InputState, WheelDelta, drag_position, pinch_scale, wheel_scale};
use crate::render::{self, RenderOptions};
use crate::scene::{BackgroundPatch, Scene, StickerId, StickerPatch};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Values the editing controls display for the active sticker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlValues {
    /// Rotation in degrees.
    pub rotation: f64,
    /// Scale factor, same units as the scene.
    pub scale: f64,
    /// Mirrored horizontally.
    pub flip: bool,
}

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The scene changed; redraw.
    RenderNeeded,
    /// The active sticker changed. `None` hides the editing controls.
    SelectionChanged(Option<ControlValues>),
    /// The active sticker was edited by a gesture; refresh the controls.
    ControlsChanged(ControlValues),
    /// Update the cursor shown over the canvas.
    SetCursor(Cursor),
}

/// Core engine state: scene, decoded images, and the live gesture.
///
/// Nothing here touches a display, so every handler can be tested directly.
pub struct EngineCore {
    pub scene: Scene,
    pub images: ImageStore,
    pub input: InputState,
    client_rect: ClientRect,
    cursor: Cursor,
}

impl EngineCore {
    /// Create an engine for a canvas of `canvas` logical size, displayed 1:1.
    #[must_use]
    pub fn new(canvas: Size) -> Self {
        Self {
            scene: Scene::new(canvas),
            images: ImageStore::new(),
            input: InputState::Idle,
            client_rect: ClientRect::at_origin(canvas),
            cursor: Cursor::Pointer,
        }
    }

    // --- Viewport ---

    /// Record where the canvas is displayed in client space.
    pub fn set_client_rect(&mut self, rect: ClientRect) {
        self.client_rect = rect;
    }

    #[must_use]
    pub fn client_rect(&self) -> ClientRect {
        self.client_rect
    }

    fn to_canvas(&self, client: Point) -> Point {
        to_canvas_coordinates(client, self.client_rect, self.scene.canvas())
    }

    // --- Data inputs ---

    /// Replace the background with a decoded image.
    pub fn set_background(&mut self, image: ImageHandle) -> Vec<Action> {
        self.scene.set_background(image);
        let mut actions = vec![Action::RenderNeeded];
        self.push_cursor(&mut actions);
        actions
    }

    /// Insert a decoded sticker on top of the stack and select it.
    pub fn add_sticker(&mut self, image: ImageHandle, source: impl Into<String>) -> (StickerId, Vec<Action>) {
        let id = self.scene.add_sticker(image.size(), source);
        self.images.insert(id, image);
        let actions = vec![Action::SelectionChanged(self.controls()), Action::RenderNeeded];
        (id, actions)
    }

    /// Remove a sticker by id. Unknown ids are ignored.
    pub fn remove_sticker(&mut self, id: &StickerId) -> Vec<Action> {
        let was_active = self.scene.active().as_ref() == Some(id);
        if self.scene.remove_sticker(id).is_none() {
            return Vec::new();
        }
        if self.input.target() == Some(Target::Sticker(*id)) {
            self.input = InputState::Idle;
        }
        let mut actions = Vec::new();
        if was_active {
            actions.push(Action::SelectionChanged(None));
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Clear the background, every sticker, and any gesture. The image store is kept.
    pub fn reset(&mut self) -> Vec<Action> {
        self.scene.reset();
        self.input = InputState::Idle;
        let mut actions = vec![Action::SelectionChanged(None), Action::RenderNeeded];
        self.push_cursor(&mut actions);
        actions
    }

    // --- Editing controls ---

    /// Current control values for the active sticker.
    #[must_use]
    pub fn controls(&self) -> Option<ControlValues> {
        self.scene.active_sticker().map(|s| ControlValues {
            rotation: s.rotation,
            scale: s.placement.scale(),
            flip: s.flip,
        })
    }

    /// Set the active sticker's rotation in degrees. No-op without a selection.
    pub fn set_rotation(&mut self, degrees: f64) -> Vec<Action> {
        self.patch_active(&StickerPatch { rotation: Some(degrees), ..Default::default() })
    }

    /// Set the active sticker's scale (clamped). Position is not re-anchored.
    pub fn set_scale(&mut self, scale: f64) -> Vec<Action> {
        self.patch_active(&StickerPatch { scale: Some(scale), ..Default::default() })
    }

    /// Mirror the active sticker horizontally.
    pub fn toggle_flip(&mut self) -> Vec<Action> {
        let Some(flip) = self.scene.active_sticker().map(|s| !s.flip) else {
            return Vec::new();
        };
        self.patch_active(&StickerPatch { flip: Some(flip), ..Default::default() })
    }

    /// Delete the active sticker. No-op without a selection.
    pub fn delete_active(&mut self) -> Vec<Action> {
        match self.scene.active() {
            Some(id) => self.remove_sticker(&id),
            None => Vec::new(),
        }
    }

    fn patch_active(&mut self, patch: &StickerPatch) -> Vec<Action> {
        let Some(id) = self.scene.active() else {
            return Vec::new();
        };
        if !self.scene.update_sticker(&id, patch) {
            return Vec::new();
        }
        vec![Action::RenderNeeded]
    }

    // --- Input events ---

    /// Dispatch a raw input event to its handler.
    pub fn handle(&mut self, event: InputEvent) -> Vec<Action> {
        match event {
            InputEvent::PointerDown(client) => self.on_pointer_down(client),
            InputEvent::PointerMove(client) => self.on_pointer_move(client),
            InputEvent::PointerUp | InputEvent::PointerLeave | InputEvent::TouchEnd | InputEvent::TouchCancel => {
                self.on_gesture_end()
            }
            InputEvent::Wheel { client, delta } => self.on_wheel(client, delta),
            InputEvent::TouchStart(touches) => self.on_touch_start(&touches),
            InputEvent::TouchMove(touches) => self.on_touch_move(&touches),
        }
    }

    /// Press: hit-test, update the selection, and start a drag on a hit.
    pub fn on_pointer_down(&mut self, client: Point) -> Vec<Action> {
        let canvas_pt = self.to_canvas(client);
        let target = hit_test(&self.scene, canvas_pt);
        let mut actions = Vec::new();

        let selected = target.and_then(|t| t.sticker_id());
        if self.scene.set_active(selected) {
            actions.push(Action::SelectionChanged(self.controls()));
        }

        match target.and_then(|t| self.scene.placement(&t).map(|p| (t, p.position))) {
            Some((target, anchor_position)) => {
                debug!(?target, x = canvas_pt.x, y = canvas_pt.y, "drag start");
                self.input = InputState::Dragging { target, anchor_pointer: canvas_pt, anchor_position };
            }
            None => {
                self.input = InputState::Idle;
            }
        }

        actions.push(Action::RenderNeeded);
        self.push_cursor(&mut actions);
        actions
    }

    /// Move: reposition the dragged element. Ignored unless dragging.
    pub fn on_pointer_move(&mut self, client: Point) -> Vec<Action> {
        let InputState::Dragging { target, anchor_pointer, anchor_position } = self.input else {
            return Vec::new();
        };
        let position = drag_position(anchor_pointer, anchor_position, self.to_canvas(client));
        let applied = match target {
            Target::Background => self
                .scene
                .update_background(&BackgroundPatch { x: Some(position.x), y: Some(position.y), scale: None }),
            Target::Sticker(id) => self
                .scene
                .update_sticker(&id, &StickerPatch { x: Some(position.x), y: Some(position.y), ..Default::default() }),
        };
        if !applied {
            return Vec::new();
        }
        trace!(?target, x = position.x, y = position.y, "drag move");
        vec![Action::RenderNeeded]
    }

    /// Release, leave, touch end, or touch cancel. Applied changes are kept.
    pub fn on_gesture_end(&mut self) -> Vec<Action> {
        if !self.input.is_idle() {
            debug!(state = ?self.input, "gesture end");
        }
        self.input = InputState::Idle;
        let mut actions = vec![Action::RenderNeeded];
        self.push_cursor(&mut actions);
        actions
    }

    /// Wheel: zoom the element under the cursor about the cursor.
    ///
    /// Does nothing until a background is loaded, or for a delta that yields
    /// a non-finite scale.
    pub fn on_wheel(&mut self, client: Point, delta: WheelDelta) -> Vec<Action> {
        if !self.scene.has_background() {
            return Vec::new();
        }
        let cursor = self.to_canvas(client);
        let Some(target) = hit_test(&self.scene, cursor) else {
            return Vec::new();
        };
        let Some(current) = self.scene.placement(&target).map(Placement::scale) else {
            return Vec::new();
        };
        let requested = wheel_scale(current, delta.dy);
        if !self.zoom_target(target, cursor, requested) {
            return Vec::new();
        }

        let mut actions = vec![Action::RenderNeeded];
        self.push_controls_if_active(target, &mut actions);
        actions
    }

    /// Touch start: one finger behaves like a press; two begin a pinch.
    pub fn on_touch_start(&mut self, touches: &[Point]) -> Vec<Action> {
        match touches {
            // No contact point: treat as a press at the canvas origin.
            [] => self.on_pointer_down(Point::new(self.client_rect.left, self.client_rect.top)),
            [only] => self.on_pointer_down(*only),
            [a, b, ..] => self.begin_pinch(*a, *b),
        }
    }

    /// Touch move: one finger drags, two fingers pinch.
    pub fn on_touch_move(&mut self, touches: &[Point]) -> Vec<Action> {
        match (touches, self.input) {
            ([only], InputState::Dragging { .. }) => self.on_pointer_move(*only),
            (
                [a, b, ..],
                InputState::Pinching { target, initial_distance, initial_scale },
            ) => self.update_pinch(target, initial_distance, initial_scale, *a, *b),
            _ => Vec::new(),
        }
    }

    fn begin_pinch(&mut self, a: Point, b: Point) -> Vec<Action> {
        // Any drag is cancelled, hit or miss.
        self.input = InputState::Idle;
        let (a, b) = (self.to_canvas(a), self.to_canvas(b));
        let initial_distance = distance(a, b);
        let mut actions = Vec::new();

        let target = hit_test(&self.scene, midpoint(a, b));
        let baseline = target.and_then(|t| self.scene.placement(&t).map(|p| (t, p.scale())));
        if let Some((target, initial_scale)) = baseline {
            if initial_distance > 0.0 {
                debug!(?target, initial_distance, initial_scale, "pinch start");
                self.input = InputState::Pinching { target, initial_distance, initial_scale };
            }
        }

        self.push_cursor(&mut actions);
        actions
    }

    fn update_pinch(
        &mut self,
        target: Target,
        initial_distance: f64,
        initial_scale: f64,
        a: Point,
        b: Point,
    ) -> Vec<Action> {
        let (a, b) = (self.to_canvas(a), self.to_canvas(b));
        let requested = pinch_scale(initial_scale, initial_distance, distance(a, b));
        if !self.zoom_target(target, midpoint(a, b), requested) {
            return Vec::new();
        }

        let mut actions = vec![Action::RenderNeeded];
        self.push_controls_if_active(target, &mut actions);
        actions
    }

    /// Zoom `target` about `anchor`. Non-finite requests and vanished
    /// targets are ignored; returns whether the scene changed.
    fn zoom_target(&mut self, target: Target, anchor: Point, requested: f64) -> bool {
        if !requested.is_finite() {
            trace!(?target, requested, "zoom ignored: non-finite scale");
            return false;
        }
        let Some(mut placement) = self.scene.placement(&target).copied() else {
            return false;
        };
        placement.zoom_about(anchor, requested);
        let (x, y, scale) = (Some(placement.position.x), Some(placement.position.y), Some(placement.scale()));
        trace!(?target, scale = placement.scale(), "zoom");
        match target {
            Target::Background => self.scene.update_background(&BackgroundPatch { x, y, scale }),
            Target::Sticker(id) => self.scene.update_sticker(&id, &StickerPatch { x, y, scale, ..Default::default() }),
        }
    }

    fn push_controls_if_active(&self, target: Target, actions: &mut Vec<Action>) {
        if target.sticker_id().is_some() && target.sticker_id() == self.scene.active() {
            if let Some(values) = self.controls() {
                actions.push(Action::ControlsChanged(values));
            }
        }
    }

    // --- Cursor ---

    /// The cursor the host should show for the current state.
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        if self.input.is_dragging() {
            Cursor::Grabbing
        } else if self.scene.has_background() {
            Cursor::Grab
        } else {
            Cursor::Pointer
        }
    }

    fn push_cursor(&mut self, actions: &mut Vec<Action>) {
        let next = self.cursor();
        if next != self.cursor {
            self.cursor = next;
            actions.push(Action::SetCursor(next));
        }
    }

    // --- Render ---

    /// Draw the current state into `surface`.
    pub fn render(&self, surface: &mut RgbaImage, options: RenderOptions) {
        render::draw(surface, &self.scene, &self.images, options);
    }

    /// A transparent surface sized to the canvas.
    #[must_use]
    pub fn new_surface(&self) -> RgbaImage {
        render::surface_for(&self.scene)
    }

    // --- Queries ---

    /// The currently selected sticker, if any.
    #[must_use]
    pub fn selection(&self) -> Option<StickerId> {
        self.scene.active()
    }
}
