use chrono::{DateTime, Utc};

use crate::assets::decode::{PreparedImage, decode_image};
use crate::assets::text::{TextLayoutEngine, TextMeasure};
use crate::assets::upload::{Upload, UploadPolicy, validate_image_upload};
use crate::compile::plan::{Element, PREVIEW_SAMPLE_NAME, PreviewInputs, RenderPlan, compile_preview};
use crate::editor::pointer::{Editor, PointerEvent};
use crate::foundation::core::{Canvas, Rect};
use crate::foundation::error::DpResult;
use crate::model::frame::{DpFrame, TextPlaceholder};
use crate::render::cpu::{CpuRenderer, FrameRGBA, SceneImages};
use crate::session::notice::Notice;
use crate::shape::path::PlaceholderShape;

/// Organizer-side editing state for one frame.
pub struct FrameDraft {
    frame: DpFrame,
    frame_image: Option<PreparedImage>,
    editor: Editor,
}

impl FrameDraft {
    pub fn new(frame: DpFrame, frame_image: Option<PreparedImage>) -> DpResult<Self> {
        frame.validate()?;
        let editor = Editor::new(frame.canvas()?);
        Ok(Self {
            frame,
            frame_image,
            editor,
        })
    }

    pub fn frame(&self) -> &DpFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DpFrame {
        self.frame
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    /// Replace the frame artwork. The canvas adopts the image's pixel size; a display rect set
    /// earlier keeps mapping pointer input onto the resized canvas.
    #[tracing::instrument(skip(self, upload), fields(file = %upload.file_name))]
    pub fn upload_frame_image(&mut self, upload: Upload) -> DpResult<()> {
        validate_image_upload(&upload, &UploadPolicy::admin())?;
        let image = decode_image(&upload.bytes)?;
        let canvas = Canvas::new(image.width, image.height)?;
        self.editor.set_canvas(canvas)?;

        self.frame.frame_width = canvas.width;
        self.frame.frame_height = canvas.height;
        self.frame.frame_image_url = upload.file_name;
        self.frame_image = Some(image);
        tracing::debug!(width = canvas.width, height = canvas.height, "adopted frame image size");
        Ok(())
    }

    pub fn set_photo_shape(&mut self, shape: PlaceholderShape) {
        self.frame.photo_placeholder.shape = shape;
    }

    /// Edit the name style in place. Changes that fail validation are rolled back.
    pub fn set_text_style(&mut self, edit: impl FnOnce(&mut TextPlaceholder)) -> DpResult<()> {
        let before = self.frame.text_placeholder.clone();
        edit(&mut self.frame.text_placeholder);
        if let Err(err) = self.frame.validate() {
            self.frame.text_placeholder = before;
            return Err(err);
        }
        Ok(())
    }

    /// Where the preview canvas is shown in client coordinates.
    pub fn set_display_rect(&mut self, display: Rect) -> DpResult<()> {
        self.editor.set_display_rect(display)
    }

    /// Feed one pointer event to the editor. Returns `true` when the preview must be redrawn.
    pub fn pointer(&mut self, event: PointerEvent, measure: &mut dyn TextMeasure) -> bool {
        self.editor.transition(&mut self.frame, event, measure)
    }

    pub fn plan(&self, measure: &mut dyn TextMeasure) -> DpResult<RenderPlan> {
        let t = &self.frame.text_placeholder;
        let text_width = match self.editor.selected() {
            Some(Element::Text) => measure
                .measure_text(PREVIEW_SAMPLE_NAME, &t.font_family, t.font_size)
                .ok(),
            _ => None,
        };
        compile_preview(
            &self.frame,
            &PreviewInputs {
                has_frame_image: self.frame_image.is_some(),
                sample_name: PREVIEW_SAMPLE_NAME,
                selected: self.editor.selected(),
                text_width,
            },
        )
    }

    pub fn render_preview(
        &self,
        renderer: &mut CpuRenderer,
        text: &mut TextLayoutEngine,
    ) -> DpResult<FrameRGBA> {
        let plan = self.plan(text)?;
        let images = SceneImages {
            frame: self.frame_image.as_ref(),
            photo: None,
        };
        renderer.render(&plan, &images, text)
    }

    /// Validate and stamp `updatedAt`.
    pub fn save(&mut self, now: DateTime<Utc>) -> Notice {
        match self.frame.validate() {
            Ok(()) => {
                self.frame.updated_at = now;
                Notice::success("Frame saved")
            }
            Err(err) => Notice::from_error(&err),
        }
    }

    pub fn publish(&mut self, now: DateTime<Utc>) -> Notice {
        self.set_published(true, now)
    }

    pub fn unpublish(&mut self, now: DateTime<Utc>) -> Notice {
        self.set_published(false, now)
    }

    fn set_published(&mut self, published: bool, now: DateTime<Utc>) -> Notice {
        if let Err(err) = self.frame.validate() {
            return Notice::from_error(&err);
        }
        self.frame.is_published = published;
        self.frame.updated_at = now;
        Notice::success(if published {
            "Frame published"
        } else {
            "Frame unpublished"
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/draft.rs"]
mod tests;
