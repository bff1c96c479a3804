use crate::assets::text::TextMeasure;
use crate::compile::plan::{Element, PREVIEW_SAMPLE_NAME, resize_handle_rect};
use crate::foundation::core::{Canvas, Point, Rect, Vec2};
use crate::foundation::error::{DpError, DpResult};
use crate::model::frame::{DpFrame, MIN_PLACEHOLDER_SIZE};

/// Maps client (display) coordinates onto the canvas pixel buffer.
///
/// The preview may be displayed scaled; `scale = canvas_size / display_size` per axis. Without a
/// display rect the canvas is assumed to be shown 1:1 at the client origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportMapping {
    display: Option<Rect>,
    scale: Vec2,
}

impl ViewportMapping {
    pub fn new(canvas: Canvas, display: Rect) -> DpResult<Self> {
        if !(display.width() > 0.0 && display.height() > 0.0) {
            return Err(DpError::invalid_argument(
                "display rect must have a positive size",
            ));
        }
        Ok(Self {
            display: Some(display),
            scale: Vec2::new(
                f64::from(canvas.width) / display.width(),
                f64::from(canvas.height) / display.height(),
            ),
        })
    }

    /// Canvas shown at its natural size with its origin at the client origin.
    pub fn identity() -> Self {
        Self {
            display: None,
            scale: Vec2::new(1.0, 1.0),
        }
    }

    /// Client rect the canvas is shown in, if the host reported one.
    pub fn display(&self) -> Option<Rect> {
        self.display
    }

    /// Same display rect, rescaled for a canvas of a new pixel size.
    pub fn with_canvas(&self, canvas: Canvas) -> DpResult<Self> {
        match self.display {
            Some(display) => Self::new(canvas, display),
            None => Ok(Self::identity()),
        }
    }

    pub fn to_canvas(&self, client: Point) -> Point {
        let origin = self.display.map_or(Point::ZERO, |d| d.origin());
        Point::new(
            (client.x - origin.x) * self.scale.x,
            (client.y - origin.y) * self.scale.y,
        )
    }
}

/// Pointer input in client coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up,
    Leave,
}

/// Current gesture. Grab offsets are pointer minus element origin at pointer-down.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum EditorState {
    #[default]
    Idle,
    DraggingPhoto { grab: Vec2 },
    DraggingText { grab: Vec2 },
    ResizingPhoto,
}

/// Gesture state plus the selected element for one configurator canvas.
#[derive(Clone, Debug)]
pub struct Editor {
    state: EditorState,
    selected: Option<Element>,
    canvas: Canvas,
    viewport: ViewportMapping,
}

impl Editor {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            state: EditorState::Idle,
            selected: None,
            canvas,
            viewport: ViewportMapping::identity(),
        }
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn selected(&self) -> Option<Element> {
        self.selected
    }

    pub fn viewport(&self) -> ViewportMapping {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: ViewportMapping) {
        self.viewport = viewport;
    }

    /// Show the canvas in `display` (client coordinates).
    pub fn set_display_rect(&mut self, display: Rect) -> DpResult<()> {
        self.viewport = ViewportMapping::new(self.canvas, display)?;
        Ok(())
    }

    /// The canvas changed pixel size; the display rect, if any, stays where it is.
    pub fn set_canvas(&mut self, canvas: Canvas) -> DpResult<()> {
        self.viewport = self.viewport.with_canvas(canvas)?;
        self.canvas = canvas;
        Ok(())
    }

    /// Advance the state machine by one pointer event, mutating `frame` placeholders as needed.
    ///
    /// Returns `true` when the preview must be redrawn.
    pub fn transition(
        &mut self,
        frame: &mut DpFrame,
        event: PointerEvent,
        measure: &mut dyn TextMeasure,
    ) -> bool {
        match (self.state, event) {
            (EditorState::Idle, PointerEvent::Down(client)) => {
                let p = self.viewport.to_canvas(client);
                self.pointer_down(frame, p, measure)
            }
            (_, PointerEvent::Down(client)) => {
                // A Down without an intervening Up restarts the gesture.
                self.state = EditorState::Idle;
                let p = self.viewport.to_canvas(client);
                self.pointer_down(frame, p, measure)
            }
            (EditorState::DraggingPhoto { grab }, PointerEvent::Move(client)) => {
                let p = self.viewport.to_canvas(client);
                let ph = &mut frame.photo_placeholder;
                ph.x = p.x - grab.x;
                ph.y = p.y - grab.y;
                true
            }
            (EditorState::DraggingText { grab }, PointerEvent::Move(client)) => {
                let p = self.viewport.to_canvas(client);
                let t = &mut frame.text_placeholder;
                t.x = p.x - grab.x;
                t.y = p.y - grab.y;
                true
            }
            (EditorState::ResizingPhoto, PointerEvent::Move(client)) => {
                let p = self.viewport.to_canvas(client);
                let ph = &mut frame.photo_placeholder;
                ph.width = (p.x - ph.x).max(MIN_PLACEHOLDER_SIZE);
                ph.height = (p.y - ph.y).max(MIN_PLACEHOLDER_SIZE);
                true
            }
            (EditorState::Idle, PointerEvent::Move(_)) => false,
            (_, PointerEvent::Up | PointerEvent::Leave) => {
                self.state = EditorState::Idle;
                false
            }
        }
    }

    fn pointer_down(&mut self, frame: &DpFrame, p: Point, measure: &mut dyn TextMeasure) -> bool {
        let ph = &frame.photo_placeholder;
        let photo_rect = ph.rect();

        if self.selected == Some(Element::Photo) && resize_handle_rect(photo_rect).contains(p) {
            self.state = EditorState::ResizingPhoto;
            return true;
        }

        let t = &frame.text_placeholder;
        if let Some(text_rect) = text_hit_rect(frame, measure)
            && text_rect.contains(p)
        {
            self.state = EditorState::DraggingText {
                grab: Vec2::new(p.x - t.x, p.y - t.y),
            };
            self.selected = Some(Element::Text);
            return true;
        }

        if photo_rect.contains(p) {
            self.state = EditorState::DraggingPhoto {
                grab: Vec2::new(p.x - ph.x, p.y - ph.y),
            };
            self.selected = Some(Element::Photo);
            return true;
        }

        self.state = EditorState::Idle;
        self.selected.take().is_some()
    }
}

/// Hit box of the preview sample name, or `None` when it cannot be measured.
pub fn text_hit_rect(frame: &DpFrame, measure: &mut dyn TextMeasure) -> Option<Rect> {
    let t = &frame.text_placeholder;
    match measure.measure_text(PREVIEW_SAMPLE_NAME, &t.font_family, t.font_size) {
        Ok(w) => Some(t.hit_rect(w)),
        Err(err) => {
            tracing::debug!(%err, "text placeholder not measurable; skipping text hit test");
            None
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/pointer.rs"]
mod tests;
