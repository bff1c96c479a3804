//! Organizer-side placeholder editing.
//!
//! The configurator canvas is driven by pointer events fed through a single explicit state
//! machine ([`pointer::Editor::transition`]). Client coordinates are mapped into canvas space by a
//! [`pointer::ViewportMapping`] before hit testing.

pub(crate) mod pointer;
