//! Raster execution of compiled render plans.

pub(crate) mod composite;
pub(crate) mod cpu;
