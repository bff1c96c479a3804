//! dpframe composites personalized display pictures.
//!
//! An organizer authors a [`DpFrame`]: frame artwork plus a photo placeholder (one of six
//! [`PlaceholderShape`]s) and a name placeholder. Attendees supply a photo and a name and get a PNG
//! back.
//!
//! - [`build_path`] produces the placeholder outline used for clipping, filling and dashed strokes
//! - [`compile_generate`] / [`compile_preview`] turn a frame and session inputs into an ordered
//!   [`RenderPlan`]
//! - [`CpuRenderer`] executes a plan with `vello_cpu`
//! - [`GenerationSession`] drives the attendee flow, [`FrameDraft`] the organizer configurator
#![forbid(unsafe_code)]

mod assets;
mod foundation;

pub(crate) mod compile;
pub(crate) mod editor;
pub(crate) mod export;
pub(crate) mod model;
pub(crate) mod render;
pub(crate) mod session;
pub(crate) mod shape;

pub use crate::foundation::core::{Affine, BezPath, Canvas, Point, Rect, Rgba8Premul, Vec2};
pub use crate::foundation::error::{DpError, DpResult};

pub use crate::assets::color::parse_css_color;
pub use crate::assets::decode::{PreparedImage, decode_image};
pub use crate::assets::text::{TextLayoutEngine, TextMeasure};
pub use crate::assets::upload::{Upload, UploadPolicy, validate_image_upload};
pub use crate::compile::plan::{
    DrawOp, Element, GenerateInputs, ImageSlot, PREVIEW_SAMPLE_NAME, PhotoLayer, PreviewInputs,
    RESIZE_HANDLE_SIZE, RenderPlan, TextOp, TextShadow, compile_generate, compile_preview,
    resize_handle_rect,
};
pub use crate::editor::pointer::{
    Editor, EditorState, PointerEvent, ViewportMapping, text_hit_rect,
};
pub use crate::export::png::{
    ANONYMOUS_PREFIX, encode_png, export_file_name, straight_rgba8, write_png,
};
pub use crate::model::frame::{
    DpFrame, MIN_PLACEHOLDER_SIZE, PhotoPlaceholder, TextAlign, TextPlaceholder,
};
pub use crate::render::cpu::{CpuRenderer, CpuRendererOpts, FrameRGBA, SceneImages};
pub use crate::session::draft::FrameDraft;
pub use crate::session::generation::{
    AttendeePhoto, DEFAULT_ZOOM, DecodedPhoto, GeneratedDp, GenerationSession, MAX_NAME_CHARS,
    MAX_ZOOM, MIN_ZOOM, PendingPhoto,
};
pub use crate::session::notice::{Notice, NoticeKind};
pub use crate::session::redraw::{RedrawGate, RedrawTicket};
pub use crate::shape::glyph::placeholder_glyph;
pub use crate::shape::path::{
    DrawMode, PathCommand, PathGeometry, PlaceholderShape, build_path, build_path_in,
};
