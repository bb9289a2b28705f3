//! CLI command implementations
//!
//! Each module holds the clap definitions of one command family, the typed
//! actions they decode into and the execution entry point.

pub mod rmb;
pub mod substrate;
