use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{DpError, DpResult};

/// RGBA8 brush color used by Parley text layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Measures the advance width of a single line of text.
///
/// The editor uses this to hit-test the name placeholder without a raster surface.
pub trait TextMeasure {
    fn measure_text(&mut self, text: &str, font_family: &str, font_size: f64) -> DpResult<f64>;
}

#[derive(Clone)]
struct RegisteredFont {
    family: String,
    bytes: Arc<Vec<u8>>,
}

/// Laid-out single-line text plus the font bytes needed to rasterize it.
pub(crate) struct ShapedText {
    pub(crate) layout: parley::Layout<TextBrushRgba8>,
    pub(crate) font_bytes: Arc<Vec<u8>>,
    /// Advance width in px.
    pub(crate) width: f64,
    /// Distance from layout top to the first baseline in px.
    pub(crate) baseline: f64,
}

/// Font registry and Parley contexts for laying out name text.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    fonts: Vec<RegisteredFont>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Environment variable naming an extra directory of fonts to register.
    pub const FONT_DIR_ENV: &'static str = "DPFRAME_FONT_DIR";

    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            fonts: Vec::new(),
        }
    }

    /// Construct an engine and register fonts from `DPFRAME_FONT_DIR` when set.
    pub fn from_env() -> DpResult<Self> {
        let mut engine = Self::new();
        if let Some(dir) = std::env::var_os(Self::FONT_DIR_ENV) {
            engine.register_font_dir(Path::new(&dir))?;
        }
        Ok(engine)
    }

    pub fn has_fonts(&self) -> bool {
        !self.fonts.is_empty()
    }

    /// Family names in registration order.
    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.fonts.iter().map(|f| f.family.as_str())
    }

    /// Register a font from raw TTF/OTF bytes and return its family name.
    pub fn register_font_bytes(&mut self, bytes: Vec<u8>) -> DpResult<String> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| DpError::validation("no font families registered from font bytes"))?;

        let family = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| DpError::validation("registered font family has no name"))?
            .to_string();

        tracing::debug!(%family, "registered font");
        self.fonts.push(RegisteredFont {
            family: family.clone(),
            bytes: Arc::new(bytes),
        });
        Ok(family)
    }

    pub fn register_font_file(&mut self, path: &Path) -> DpResult<String> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        self.register_font_bytes(bytes)
    }

    /// Register every `.ttf`/`.otf` file in `dir` (non-recursive). Returns how many were added.
    pub fn register_font_dir(&mut self, dir: &Path) -> DpResult<usize> {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("read font dir '{}'", dir.display()))?;
        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.context("read font dir entry")?.path();
            let is_font = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "ttf" | "otf"));
            if is_font {
                paths.push(path);
            }
        }
        paths.sort();
        for path in &paths {
            self.register_font_file(path)?;
        }
        Ok(paths.len())
    }

    /// Pick the registered font for a CSS `font-family` list.
    ///
    /// Each listed family is tried in order (case-insensitive, quotes stripped); when none match
    /// the first registered font is used.
    fn resolve(&self, font_family: &str) -> DpResult<&RegisteredFont> {
        font_family
            .split(',')
            .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\''))
            .filter(|f| !f.is_empty())
            .find_map(|want| {
                self.fonts
                    .iter()
                    .find(|f| f.family.eq_ignore_ascii_case(want))
            })
            .or_else(|| self.fonts.first())
            .ok_or_else(|| DpError::evaluation("no fonts registered for text rendering"))
    }

    pub(crate) fn shape_line(
        &mut self,
        text: &str,
        font_family: &str,
        size_px: f64,
        brush: TextBrushRgba8,
    ) -> DpResult<ShapedText> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(DpError::validation("font size must be finite and > 0"));
        }
        let font = self.resolve(font_family)?.clone();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(font.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px as f32));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);

        let baseline = layout
            .lines()
            .next()
            .map(|line| f64::from(line.metrics().baseline))
            .unwrap_or(size_px);
        let width = f64::from(layout.width());

        Ok(ShapedText {
            layout,
            font_bytes: font.bytes,
            width,
            baseline,
        })
    }
}

impl TextMeasure for TextLayoutEngine {
    fn measure_text(&mut self, text: &str, font_family: &str, font_size: f64) -> DpResult<f64> {
        if text.is_empty() {
            return Ok(0.0);
        }
        Ok(self
            .shape_line(text, font_family, font_size, TextBrushRgba8::default())?
            .width)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/text.rs"]
mod tests;
