pub mod classify;
pub mod lifecycle;
pub mod registry;
