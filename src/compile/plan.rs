use kurbo::Shape;

use crate::assets::color::parse_css_color;
use crate::foundation::core::{BezPath, Canvas, Point, Rect, Rgba8Premul, Vec2};
use crate::foundation::error::{DpError, DpResult};
use crate::model::frame::{DpFrame, TextAlign};
use crate::shape::glyph::placeholder_glyph;
use crate::shape::path::{DrawMode, build_path_in};

/// Side length of the square photo resize handle.
pub const RESIZE_HANDLE_SIZE: f64 = 20.0;

/// Name shown in the organizer preview.
pub const PREVIEW_SAMPLE_NAME: &str = "Attendee Name";

const GENERATE_BACKGROUND: [u8; 4] = [0xf1, 0xf5, 0xf9, 0xff];
const EMPTY_FILL: [u8; 4] = [0xe2, 0xe8, 0xf0, 0xff];
const EMPTY_OUTLINE: [u8; 4] = [0x94, 0xa3, 0xb8, 0xff];
const PREVIEW_FILL: [u8; 4] = [0xff, 0xff, 0xff, 0x4d];
const ACCENT: [u8; 4] = [0x3b, 0x82, 0xf6, 0xff];
const OUTLINE_WIDTH: f64 = 2.0;
const OUTLINE_DASH: [f64; 2] = [8.0, 4.0];

fn rgba([r, g, b, a]: [u8; 4]) -> Rgba8Premul {
    Rgba8Premul::from_straight_rgba(r, g, b, a)
}

/// Which externally supplied raster an image op draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageSlot {
    /// Organizer frame artwork.
    Frame,
    /// Attendee photo.
    Photo,
}

/// Drop shadow applied to a text op only.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextShadow {
    pub color: Rgba8Premul,
    /// Canvas `shadowBlur` in px.
    pub blur: f64,
    pub offset: Vec2,
}

impl Default for TextShadow {
    fn default() -> Self {
        Self {
            color: Rgba8Premul::from_straight_rgba(0, 0, 0, 77),
            blur: 4.0,
            offset: Vec2::new(2.0, 2.0),
        }
    }
}

/// One line of styled text anchored at an alphabetic baseline point.
#[derive(Clone, Debug, PartialEq)]
pub struct TextOp {
    pub text: String,
    pub anchor: Point,
    pub font_family: String,
    pub font_size: f64,
    pub color: Rgba8Premul,
    pub alignment: TextAlign,
    pub max_width: Option<f64>,
    pub shadow: Option<TextShadow>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// Image scaled into `dest`.
    Image { slot: ImageSlot, dest: Rect },
    /// Image scaled into `dest`, visible only inside `clip`.
    ClippedImage {
        slot: ImageSlot,
        dest: Rect,
        clip: BezPath,
    },
    FillPath { path: BezPath, color: Rgba8Premul },
    StrokePath {
        path: BezPath,
        color: Rgba8Premul,
        width: f64,
        dash: Option<[f64; 2]>,
    },
    Text(TextOp),
}

/// Ordered draw operations for one canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderPlan {
    pub canvas: Canvas,
    /// Color the surface is cleared to before the first op.
    pub clear: Rgba8Premul,
    pub ops: Vec<DrawOp>,
}

impl RenderPlan {
    /// Index of the first op drawing `slot`, clipped or not.
    pub fn position_of_image(&self, slot: ImageSlot) -> Option<usize> {
        self.ops.iter().position(|op| match op {
            DrawOp::Image { slot: s, .. } | DrawOp::ClippedImage { slot: s, .. } => *s == slot,
            _ => false,
        })
    }

    pub fn text_ops(&self) -> impl Iterator<Item = &TextOp> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text(t) => Some(t),
            _ => None,
        })
    }
}

/// Attendee photo placement inside the photo placeholder.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhotoLayer {
    /// Natural image size in px.
    pub natural: (f64, f64),
    pub zoom: f64,
    /// Pan offset from the centred position.
    pub offset: Vec2,
}

impl PhotoLayer {
    /// Destination rectangle centred on `center`, scaled by zoom, shifted by the pan offset.
    pub fn dest_rect(&self, center: Point) -> Rect {
        let w = self.natural.0 * self.zoom;
        let h = self.natural.1 * self.zoom;
        let x0 = center.x - w / 2.0 + self.offset.x;
        let y0 = center.y - h / 2.0 + self.offset.y;
        Rect::new(x0, y0, x0 + w, y0 + h)
    }
}

/// Inputs for the attendee-facing composite.
#[derive(Clone, Debug, Default)]
pub struct GenerateInputs<'a> {
    pub photo: Option<PhotoLayer>,
    pub name: &'a str,
    pub has_frame_image: bool,
}

/// Element highlighted in the organizer preview.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Element {
    Photo,
    Text,
}

/// Inputs for the organizer preview.
#[derive(Clone, Debug, Default)]
pub struct PreviewInputs<'a> {
    pub has_frame_image: bool,
    pub sample_name: &'a str,
    pub selected: Option<Element>,
    /// Measured advance width of `sample_name`, used to outline a selected text placeholder.
    pub text_width: Option<f64>,
}

fn text_op(frame: &DpFrame, text: &str) -> DpResult<TextOp> {
    let t = &frame.text_placeholder;
    Ok(TextOp {
        text: text.to_owned(),
        anchor: Point::new(t.x, t.y),
        font_family: t.font_family.clone(),
        font_size: t.font_size,
        color: parse_css_color(&t.color)?,
        alignment: t.alignment,
        max_width: t.max_width,
        shadow: Some(TextShadow::default()),
    })
}

/// Placeholder outline op: a solid fill, or the dashed editor stroke.
fn shape_op(path: BezPath, mode: DrawMode, color: [u8; 4]) -> DrawOp {
    match mode {
        DrawMode::Fill => DrawOp::FillPath {
            path,
            color: rgba(color),
        },
        DrawMode::Stroke => DrawOp::StrokePath {
            path,
            color: rgba(color),
            width: OUTLINE_WIDTH,
            dash: Some(OUTLINE_DASH),
        },
    }
}

/// Compile the attendee composite: background, clipped photo (or empty placeholder), frame
/// overlay, then the name with its shadow.
#[tracing::instrument(skip(frame, inputs), fields(frame = %frame.id))]
pub fn compile_generate(frame: &DpFrame, inputs: &GenerateInputs<'_>) -> DpResult<RenderPlan> {
    let canvas = frame.canvas()?;
    let ph = &frame.photo_placeholder;
    let outline = build_path_in(ph.shape, ph.rect())?.to_bezpath();
    let mut ops = Vec::with_capacity(5);

    match inputs.photo {
        Some(photo) => {
            if !photo.zoom.is_finite() || photo.zoom <= 0.0 {
                return Err(DpError::invalid_argument("photo zoom must be > 0"));
            }
            let (cx, cy) = ph.center();
            ops.push(DrawOp::ClippedImage {
                slot: ImageSlot::Photo,
                dest: photo.dest_rect(Point::new(cx, cy)),
                clip: outline,
            });
        }
        None => {
            ops.push(shape_op(outline.clone(), DrawMode::Fill, EMPTY_FILL));
            ops.push(shape_op(outline, DrawMode::Stroke, EMPTY_OUTLINE));
            ops.push(DrawOp::FillPath {
                path: placeholder_glyph(ph.rect()),
                color: rgba(EMPTY_OUTLINE),
            });
        }
    }

    if inputs.has_frame_image {
        ops.push(DrawOp::Image {
            slot: ImageSlot::Frame,
            dest: canvas.rect(),
        });
    }

    if !inputs.name.trim().is_empty() {
        ops.push(DrawOp::Text(text_op(frame, inputs.name)?));
    }

    tracing::debug!(ops = ops.len(), "compiled generate plan");
    Ok(RenderPlan {
        canvas,
        clear: rgba(GENERATE_BACKGROUND),
        ops,
    })
}

/// Compile the organizer preview: frame artwork, translucent placeholder with a dashed outline,
/// sample name, then selection decoration.
#[tracing::instrument(skip(frame, inputs), fields(frame = %frame.id))]
pub fn compile_preview(frame: &DpFrame, inputs: &PreviewInputs<'_>) -> DpResult<RenderPlan> {
    let canvas = frame.canvas()?;
    let ph = &frame.photo_placeholder;
    let outline = build_path_in(ph.shape, ph.rect())?.to_bezpath();
    let mut ops = Vec::with_capacity(7);

    if inputs.has_frame_image {
        ops.push(DrawOp::Image {
            slot: ImageSlot::Frame,
            dest: canvas.rect(),
        });
    }

    ops.push(shape_op(outline.clone(), DrawMode::Fill, PREVIEW_FILL));
    ops.push(shape_op(outline, DrawMode::Stroke, ACCENT));

    if !inputs.sample_name.is_empty() {
        ops.push(DrawOp::Text(text_op(frame, inputs.sample_name)?));
    }

    match inputs.selected {
        Some(Element::Photo) => {
            let r = ph.rect();
            ops.push(DrawOp::StrokePath {
                path: r.to_path(0.1),
                color: rgba(ACCENT),
                width: OUTLINE_WIDTH,
                dash: None,
            });
            ops.push(DrawOp::FillPath {
                path: resize_handle_rect(r).to_path(0.1),
                color: rgba(ACCENT),
            });
        }
        Some(Element::Text) => {
            if let Some(w) = inputs.text_width {
                ops.push(DrawOp::StrokePath {
                    path: frame.text_placeholder.hit_rect(w).to_path(0.1),
                    color: rgba(ACCENT),
                    width: OUTLINE_WIDTH,
                    dash: None,
                });
            }
        }
        None => {}
    }

    Ok(RenderPlan {
        canvas,
        clear: Rgba8Premul::transparent(),
        ops,
    })
}

/// Resize handle anchored inside the bottom-right corner of `photo`.
pub fn resize_handle_rect(photo: Rect) -> Rect {
    Rect::new(
        photo.x1 - RESIZE_HANDLE_SIZE,
        photo.y1 - RESIZE_HANDLE_SIZE,
        photo.x1,
        photo.y1,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/compile/plan.rs"]
mod tests;
