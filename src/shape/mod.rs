//! Placeholder outline geometry.
//!
//! [`build_path`] turns a [`PlaceholderShape`] and a bounding box into a [`PathGeometry`]: an
//! ordered list of canvas-style path commands that can be converted to a `kurbo` path for
//! filling, stroking or clipping.

pub(crate) mod glyph;
pub(crate) mod path;
