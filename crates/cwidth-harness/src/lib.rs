//! Command-line harness for cwidth.
//!
//! This crate provides:
//! - Descriptor loading: JSON files, named data models, the host C ABI
//! - Resolution runs that log every registry commit as structured JSONL
//! - Header emission with a SHA-256 artifact index
//! - Machine-readable table reports

#![forbid(unsafe_code)]

pub mod descriptor;
pub mod emit;
pub mod error;
pub mod report;
pub mod runner;
pub mod structured_log;

pub use descriptor::{DescriptorSource, host_descriptor};
pub use error::HarnessError;
pub use report::TableReport;
pub use runner::ResolutionRun;
