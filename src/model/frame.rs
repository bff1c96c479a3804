use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};

use crate::assets::color::parse_css_color;
use crate::foundation::core::{Canvas, Rect};
use crate::foundation::error::{DpError, DpResult};
use crate::shape::path::PlaceholderShape;

/// Smallest width/height the editor lets a photo placeholder shrink to.
pub const MIN_PLACEHOLDER_SIZE: f64 = 50.0;

/// Where and in what shape the attendee photo is composited.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoPlaceholder {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub shape: PlaceholderShape,
    /// Degrees. Stored for round-tripping; geometry does not apply it.
    #[serde(default)]
    pub rotation: f64,
}

impl PhotoPlaceholder {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    fn validate(&self) -> DpResult<()> {
        if ![self.x, self.y, self.width, self.height, self.rotation]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(DpError::validation(
                "photo placeholder values must be finite",
            ));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(DpError::validation(
                "photo placeholder width and height must be > 0",
            ));
        }
        Ok(())
    }
}

impl Default for PhotoPlaceholder {
    fn default() -> Self {
        Self {
            x: 340.0,
            y: 240.0,
            width: 400.0,
            height: 400.0,
            shape: PlaceholderShape::Circle,
            rotation: 0.0,
        }
    }
}

/// Horizontal placement of the name relative to its anchor point.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl TextAlign {
    /// Offset from the anchor to the left edge of a line `width` px wide.
    pub fn left_offset(self, width: f64) -> f64 {
        match self {
            TextAlign::Left => 0.0,
            TextAlign::Center => -width / 2.0,
            TextAlign::Right => -width,
        }
    }
}

/// Where the attendee name is drawn and how.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextPlaceholder {
    /// Anchor x; meaning depends on `alignment`.
    pub x: f64,
    /// Alphabetic baseline.
    pub y: f64,
    pub font_size: f64,
    pub font_family: String,
    /// CSS color string.
    pub color: String,
    #[serde(default)]
    pub alignment: TextAlign,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<f64>,
}

impl TextPlaceholder {
    /// Width a line of `measured` px occupies once `max_width` compression is applied.
    pub fn fitted_width(&self, measured: f64) -> f64 {
        match self.max_width {
            Some(max) if max > 0.0 && measured > max => max,
            _ => measured,
        }
    }

    /// Hit region for a line of `measured` advance width: one font size tall above the baseline.
    pub fn hit_rect(&self, measured: f64) -> Rect {
        let w = self.fitted_width(measured);
        let x0 = self.x + self.alignment.left_offset(w);
        Rect::new(x0, self.y - self.font_size, x0 + w, self.y)
    }

    fn validate(&self) -> DpResult<()> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(DpError::validation("text placeholder anchor must be finite"));
        }
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(DpError::validation("text font size must be > 0"));
        }
        if let Some(w) = self.max_width
            && (!w.is_finite() || w <= 0.0)
        {
            return Err(DpError::validation("text maxWidth must be > 0"));
        }
        parse_css_color(&self.color)?;
        Ok(())
    }
}

impl Default for TextPlaceholder {
    fn default() -> Self {
        Self {
            x: 540.0,
            y: 760.0,
            font_size: 48.0,
            font_family: "Arial".to_owned(),
            color: "#ffffff".to_owned(),
            alignment: TextAlign::Center,
            max_width: None,
        }
    }
}

/// Frame artwork plus placeholder definitions for one event.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DpFrame {
    pub id: String,
    pub event_id: String,
    pub name: String,
    /// Frame artwork location; empty until an image has been uploaded.
    #[serde(default)]
    pub frame_image_url: String,
    pub frame_width: u32,
    pub frame_height: u32,
    pub photo_placeholder: PhotoPlaceholder,
    pub text_placeholder: TextPlaceholder,
    #[serde(default)]
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DpFrame {
    /// New unpublished 1080×1080 frame with default placeholders.
    pub fn new(
        id: impl Into<String>,
        event_id: impl Into<String>,
        name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let canvas = Canvas::default();
        Self {
            id: id.into(),
            event_id: event_id.into(),
            name: name.into(),
            frame_image_url: String::new(),
            frame_width: canvas.width,
            frame_height: canvas.height,
            photo_placeholder: PhotoPlaceholder::default(),
            text_placeholder: TextPlaceholder::default(),
            is_published: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn canvas(&self) -> DpResult<Canvas> {
        Canvas::new(self.frame_width, self.frame_height)
    }

    pub fn validate(&self) -> DpResult<()> {
        if self.name.trim().is_empty() {
            return Err(DpError::validation("frame name must be non-empty"));
        }
        self.canvas()?;
        self.photo_placeholder.validate()?;
        self.text_placeholder.validate()?;
        if self.updated_at < self.created_at {
            return Err(DpError::validation("updatedAt must not precede createdAt"));
        }
        Ok(())
    }

    pub fn from_json(s: &str) -> DpResult<Self> {
        let frame: DpFrame =
            serde_json::from_str(s).map_err(|e| DpError::serde(format!("frame json: {e}")))?;
        frame.validate()?;
        Ok(frame)
    }

    pub fn from_path(path: &Path) -> DpResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read frame '{}'", path.display()))?;
        Self::from_json(&s)
    }

    pub fn to_json_pretty(&self) -> DpResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| DpError::serde(e.to_string()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/frame.rs"]
mod tests;
