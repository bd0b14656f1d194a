//! Model Scout: finds out which of a platform's listed models are
//! actually callable.
//!
//! `adapters` talk to the platforms, `discovery` decides what to probe
//! and runs the worker pool, `filter` narrows the results and `output`
//! writes the report.

pub mod adapters;
pub mod config;
pub mod discovery;
pub mod filter;
pub mod output;
pub mod runner;

pub use adapters::{Model, PlatformAdapter, ProbeResult, ProbeStatus};
pub use discovery::{ScanError, Scanner};
pub use filter::{apply_filters, parse_filters, Filter, FilterError};
