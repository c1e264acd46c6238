//! Observability for zipstore
//!
//! Structured JSON log lines on stderr, plus a scope helper that brackets
//! a pipeline step with BEGIN/COMPLETE events.
//!
//! # Usage
//!
//! ```ignore
//! use zipstore::observability::{Logger, ObservationScope};
//!
//! Logger::info("INDEX_LOADED", &[("entries", "41692")]);
//!
//! let scope = ObservationScope::new("INDEX_BUILD");
//! // ... do work ...
//! scope.complete();
//! ```

mod logger;
mod scope;

pub use logger::{Logger, Severity};
pub use scope::{ObservationScope, Timer};
