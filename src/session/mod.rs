//! Stateful front ends over the compositor.
//!
//! - [`generation::GenerationSession`]: the attendee flow (photo, name, zoom, pan, export).
//! - [`draft::FrameDraft`]: the organizer configurator for one frame.
//!
//! Photo decodes that may finish out of order are reconciled through a [`redraw::RedrawGate`].

pub(crate) mod draft;
pub(crate) mod generation;
pub(crate) mod notice;
pub(crate) mod redraw;
