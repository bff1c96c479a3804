//! Organizer-authored frame definitions.

pub(crate) mod frame;
