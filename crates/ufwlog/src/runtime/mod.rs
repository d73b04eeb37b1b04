//! Runtime module — process lifecycle: logging init, config load, run.

pub mod boot;
