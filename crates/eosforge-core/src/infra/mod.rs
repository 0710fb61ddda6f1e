//! Process boundary: spawning toolchain binaries and capturing their output.

pub mod process;
pub mod toolchain;
