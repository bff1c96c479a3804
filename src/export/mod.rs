//! PNG export of rendered composites.

pub(crate) mod png;
