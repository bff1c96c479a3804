//! Retained-mode scene compilation.
//!
//! A [`plan::RenderPlan`] is the ordered list of draw operations for one canvas. Compiling is
//! pure, so draw order can be checked without a raster surface.

pub(crate) mod plan;
