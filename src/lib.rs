//! Source-level span instrumentation for Rust services.
//!
//! `traceweave` rewrites Rust source files in place, inserting a tracing
//! prologue into every function that threads a request-scoped carrier
//! parameter and returns a status result. The rewrite is idempotent: files
//! already carrying the prologue come back unchanged, so the tool can run
//! on every build.
//!
//! The library splits into a handful of layers:
//!
//! - [`matcher`] decides which function signatures qualify
//! - [`directives`] parses per-file and per-function source directives
//! - [`selector`] resolves directives into an accept/reject decision
//! - [`instrument`] renders the statements a traced function receives
//! - [`patch`] collects and applies edits over a parsed file
//! - [`rewrite`] drives a single file end to end
//! - [`processor`] fans the rewrite out over a batch of files
//! - [`walker`] discovers source files under the requested paths

pub mod cli;
pub mod config;
pub mod directives;
pub mod errors;
pub mod instrument;
pub mod matcher;
pub mod patch;
pub mod processor;
pub mod rewrite;
pub mod selector;
pub mod walker;

pub use config::{FileConfig, TraceConfig, TracePattern};
pub use errors::{Error, Result};
pub use instrument::{ImportRef, Instrumenter, TracingInstrumenter};
pub use processor::{BatchSummary, TraceProcessor};
pub use rewrite::{FileRewriter, Outcome, Rewritten};
pub use selector::FunctionSelector;
pub use walker::{find_source_files, FileWalker};
