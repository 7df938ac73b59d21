//! Default instrumenter: a `tracing` span plus an entered guard.

use super::{ImportRef, Instrumenter};
use syn::parse_quote;

/// Prefix carried by every identifier the prologue binds. A body whose
/// first statement binds such an identifier is already instrumented.
pub const MARKER_PREFIX: &str = "__tw_";

/// Emits, for a span named `Server.handle` in application `checkout`:
///
/// ```text
/// let __tw_span = span!(target: "checkout", Level::INFO, "Server.handle");
/// let __tw_guard = __tw_span.enter();
/// ```
///
/// Functions with a status result declare an empty `error` field on the
/// span so callers can record failures into it later.
#[derive(Debug, Clone)]
pub struct TracingInstrumenter {
    app: String,
}

impl TracingInstrumenter {
    pub fn new(app: impl Into<String>) -> Self {
        Self { app: app.into() }
    }
}

impl Instrumenter for TracingInstrumenter {
    fn imports(&self) -> Vec<ImportRef> {
        vec![
            ImportRef::new("span", "tracing::span"),
            ImportRef::new("Level", "tracing::Level"),
            ImportRef::new("field", "tracing::field"),
        ]
    }

    fn prologue(&self, span_name: &str, has_status_result: bool) -> Vec<syn::Stmt> {
        let app = &self.app;
        let span_stmt: syn::Stmt = if has_status_result {
            parse_quote! {
                let __tw_span = span!(target: #app, Level::INFO, #span_name, error = field::Empty);
            }
        } else {
            parse_quote! {
                let __tw_span = span!(target: #app, Level::INFO, #span_name);
            }
        };
        let guard_stmt: syn::Stmt = parse_quote! {
            let __tw_guard = __tw_span.enter();
        };
        vec![span_stmt, guard_stmt]
    }

    fn is_prologue_marker(&self, stmt: &syn::Stmt) -> bool {
        let syn::Stmt::Local(local) = stmt else {
            return false;
        };
        match &local.pat {
            syn::Pat::Ident(pat_ident) => pat_ident.ident.to_string().starts_with(MARKER_PREFIX),
            _ => false,
        }
    }
}
