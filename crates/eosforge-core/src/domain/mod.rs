//! Side-effect-free decision rules. Nothing in here touches files or spawns
//! processes; callers feed in snapshots and act on the verdict.

pub mod policy;
