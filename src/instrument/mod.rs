//! Pluggable prologue generation.
//!
//! The rewriting engine never inspects the content of the statements an
//! instrumenter produces; it only requires that each statement is valid
//! standalone, that [`Instrumenter::imports`] is idempotent so imports are
//! safe to deduplicate, and that [`Instrumenter::is_prologue_marker`]
//! recognizes the head of a previously injected prologue so reruns do not
//! double-instrument.

mod tracing;

pub use tracing::{TracingInstrumenter, MARKER_PREFIX};

/// An external symbol a prologue references, rendered as a `use` item.
/// When `name` differs from the last segment of `path`, the import is
/// emitted as `use path as name;`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportRef {
    pub name: String,
    pub path: String,
}

impl ImportRef {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

pub trait Instrumenter: Send + Sync {
    /// Symbols the prologue statements reference. Same input, same output.
    fn imports(&self) -> Vec<ImportRef>;

    /// Ordered statements to insert at the top of a matched body. An empty
    /// list means "leave this function alone".
    fn prologue(&self, span_name: &str, has_status_result: bool) -> Vec<syn::Stmt>;

    /// Whether a statement is the head of a previously injected prologue.
    fn is_prologue_marker(&self, stmt: &syn::Stmt) -> bool;
}
