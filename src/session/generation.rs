use crate::assets::decode::{PreparedImage, decode_image};
use crate::assets::text::TextLayoutEngine;
use crate::assets::upload::{Upload, UploadPolicy, validate_image_upload};
use crate::compile::plan::{GenerateInputs, PhotoLayer, RenderPlan, compile_generate};
use crate::export::png::{encode_png, export_file_name};
use crate::foundation::core::Vec2;
use crate::foundation::error::{DpError, DpResult};
use crate::model::frame::DpFrame;
use crate::render::cpu::{CpuRenderer, SceneImages};
use crate::session::redraw::{RedrawGate, RedrawTicket};

/// Longest attendee name kept, in characters.
pub const MAX_NAME_CHARS: usize = 30;
pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 3.0;
pub const DEFAULT_ZOOM: f64 = 1.0;

/// A validated photo upload waiting to be decoded.
///
/// Decoding is independent of the session and may run on another thread; the result is handed
/// back through [`GenerationSession::apply_photo`].
#[derive(Debug)]
pub struct PendingPhoto {
    ticket: RedrawTicket,
    upload: Upload,
}

impl PendingPhoto {
    pub fn ticket(&self) -> RedrawTicket {
        self.ticket
    }

    pub fn decode(self) -> DecodedPhoto {
        let result = decode_image(&self.upload.bytes);
        DecodedPhoto {
            ticket: self.ticket,
            file_name: self.upload.file_name,
            result,
        }
    }
}

/// Outcome of [`PendingPhoto::decode`].
#[derive(Debug)]
pub struct DecodedPhoto {
    ticket: RedrawTicket,
    file_name: String,
    result: DpResult<PreparedImage>,
}

/// The attendee's photo as currently placed.
#[derive(Clone, Debug, PartialEq)]
pub struct AttendeePhoto {
    pub file_name: String,
    pub image: PreparedImage,
}

/// Encoded composite ready to download.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedDp {
    pub file_name: String,
    pub png: Vec<u8>,
}

/// Attendee-side state for personalizing one frame.
pub struct GenerationSession {
    frame: DpFrame,
    frame_image: Option<PreparedImage>,
    photo: Option<AttendeePhoto>,
    name: String,
    zoom: f64,
    offset: Vec2,
    gate: RedrawGate,
    policy: UploadPolicy,
}

impl GenerationSession {
    pub fn new(frame: DpFrame, frame_image: Option<PreparedImage>) -> DpResult<Self> {
        frame.validate()?;
        Ok(Self {
            frame,
            frame_image,
            photo: None,
            name: String::new(),
            zoom: DEFAULT_ZOOM,
            offset: Vec2::ZERO,
            gate: RedrawGate::new(),
            policy: UploadPolicy::public(),
        })
    }

    /// Replace the upload limits (public 5 MiB cap by default).
    pub fn with_upload_policy(mut self, policy: UploadPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn frame(&self) -> &DpFrame {
        &self.frame
    }

    pub fn photo(&self) -> Option<&AttendeePhoto> {
        self.photo.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Validate `upload` and reserve a ticket for its decode. Rejected uploads leave the session
    /// untouched.
    #[tracing::instrument(skip(self, upload), fields(file = %upload.file_name, size = upload.size()))]
    pub fn request_photo(&mut self, upload: Upload) -> DpResult<PendingPhoto> {
        validate_image_upload(&upload, &self.policy)?;
        Ok(PendingPhoto {
            ticket: self.gate.begin(),
            upload,
        })
    }

    /// Install a decoded photo if it is still the latest request.
    ///
    /// Returns `Ok(false)` for stale results. A new photo starts centred at the default zoom.
    pub fn apply_photo(&mut self, decoded: DecodedPhoto) -> DpResult<bool> {
        if !self.gate.is_current(decoded.ticket) {
            tracing::debug!(
                ticket = decoded.ticket.generation(),
                "discarding stale photo decode"
            );
            return Ok(false);
        }
        let image = decoded.result?;
        self.photo = Some(AttendeePhoto {
            file_name: decoded.file_name,
            image,
        });
        self.zoom = DEFAULT_ZOOM;
        self.offset = Vec2::ZERO;
        Ok(true)
    }

    /// Validate, decode and apply a photo on the calling thread.
    pub fn load_photo(&mut self, upload: Upload) -> DpResult<()> {
        let pending = self.request_photo(upload)?;
        self.apply_photo(pending.decode())?;
        Ok(())
    }

    pub fn clear_photo(&mut self) {
        self.gate.invalidate();
        self.photo = None;
    }

    /// Set the attendee name, keeping at most [`MAX_NAME_CHARS`] characters.
    pub fn set_name(&mut self, name: &str) {
        self.name = name.chars().take(MAX_NAME_CHARS).collect();
    }

    /// Set the photo zoom, clamped to `[MIN_ZOOM, MAX_ZOOM]`. Non-finite values are ignored.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    pub fn zoom_by(&mut self, delta: f64) {
        self.set_zoom(self.zoom + delta);
    }

    pub fn pan_to(&mut self, offset: Vec2) {
        if offset.is_finite() {
            self.offset = offset;
        }
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan_to(self.offset + delta);
    }

    pub fn can_generate(&self) -> bool {
        self.photo.is_some() && !self.name.trim().is_empty()
    }

    pub fn plan(&self) -> DpResult<RenderPlan> {
        let photo = self.photo.as_ref().map(|p| PhotoLayer {
            natural: p.image.natural_size(),
            zoom: self.zoom,
            offset: self.offset,
        });
        compile_generate(
            &self.frame,
            &GenerateInputs {
                photo,
                name: &self.name,
                has_frame_image: self.frame_image.is_some(),
            },
        )
    }

    pub fn scene_images(&self) -> SceneImages<'_> {
        SceneImages {
            frame: self.frame_image.as_ref(),
            photo: self.photo.as_ref().map(|p| &p.image),
        }
    }

    /// Render and encode the composite. Requires a photo and a non-blank name.
    #[tracing::instrument(skip_all, fields(frame = %self.frame.id))]
    pub fn generate(
        &self,
        renderer: &mut CpuRenderer,
        text: &mut TextLayoutEngine,
    ) -> DpResult<GeneratedDp> {
        if self.photo.is_none() {
            return Err(DpError::MissingRequiredField("photo"));
        }
        if self.name.trim().is_empty() {
            return Err(DpError::MissingRequiredField("name"));
        }
        let plan = self.plan()?;
        let frame = renderer.render(&plan, &self.scene_images(), text)?;
        let png = encode_png(&frame)?;
        let file_name = export_file_name(&self.name, &self.frame.name);
        tracing::info!(%file_name, bytes = png.len(), "generated dp");
        Ok(GeneratedDp { file_name, png })
    }

    /// Forget the photo, name and placement.
    pub fn reset(&mut self) {
        self.clear_photo();
        self.name.clear();
        self.zoom = DEFAULT_ZOOM;
        self.offset = Vec2::ZERO;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/generation.rs"]
mod tests;
