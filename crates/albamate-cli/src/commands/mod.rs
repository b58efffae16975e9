//! Command handlers.

pub(crate) mod alba;
pub(crate) mod scrap;
