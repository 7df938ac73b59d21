//! Per-file rewriting pipeline.
//!
//! One file moves through: read → generated-marker check → parse → build
//! directives → commands → selector → patch collection → patch application
//! → import insertion → serialization. Skips are terminal, produce no
//! output, and are not errors.

use std::collections::HashSet;
use std::path::Path;

use crate::config::{TraceConfig, TracePattern};
use crate::directives;
use crate::errors::{Error, Result};
use crate::instrument::{ImportRef, Instrumenter};
use crate::matcher;
use crate::patch::{self, FnShape};
use crate::selector::FunctionSelector;

/// Terminal state for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Prologues were injected into this many functions.
    Patched(usize),
    /// Nothing matched; the output is still canonicalized when overwriting.
    Unpatched,
    /// Generated-file marker present while `skip_generated` is set.
    SkippedGenerated,
    /// A build directive the host cannot satisfy.
    SkippedBuildConstraint,
}

impl Outcome {
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::SkippedGenerated | Self::SkippedBuildConstraint)
    }
}

/// Result of rewriting source text without touching the file system.
/// Skipped files keep their original text byte for byte.
#[derive(Debug)]
pub struct Rewritten {
    pub source: String,
    pub outcome: Outcome,
}

/// Rewrites one file at a time. Stateless across files, so a single
/// instance can be shared by concurrent workers.
pub struct FileRewriter<'a> {
    pattern: &'a TracePattern,
    instrumenter: &'a dyn Instrumenter,
}

impl<'a> FileRewriter<'a> {
    pub fn new(pattern: &'a TracePattern, instrumenter: &'a dyn Instrumenter) -> Self {
        Self {
            pattern,
            instrumenter,
        }
    }

    /// Full pipeline for one path: read, rewrite, then overwrite in place or
    /// discard depending on configuration. The write fully replaces the
    /// previous contents and the handle is closed on every exit path.
    pub fn process(&self, path: &Path, config: &TraceConfig) -> Result<Outcome> {
        let source = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let rewritten = self.rewrite_source(path, &source, config)?;
        log::debug!("{}: {:?}", path.display(), rewritten.outcome);

        if config.overwrite && !rewritten.outcome.is_skip() {
            std::fs::write(path, rewritten.source).map_err(|source| Error::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }

        Ok(rewritten.outcome)
    }

    /// The pure core: parse, select, match, patch, import, serialize.
    pub fn rewrite_source(
        &self,
        path: &Path,
        source: &str,
        config: &TraceConfig,
    ) -> Result<Rewritten> {
        if config.skip_generated && directives::is_generated(source) {
            return Ok(Rewritten {
                source: source.to_string(),
                outcome: Outcome::SkippedGenerated,
            });
        }

        let mut file = syn::parse_file(source).map_err(|err| Error::parse(path, &err))?;

        if directives::build_directives(&file)
            .iter()
            .any(directives::BuildDirective::skip_file)
        {
            return Ok(Rewritten {
                source: source.to_string(),
                outcome: Outcome::SkippedBuildConstraint,
            });
        }

        let commands = directives::commands(path, &file)?;
        let selector = FunctionSelector::new(config.default_select, &commands);

        let patches = patch::collect_patches(&file, |view| {
            let Some(body) = view.body else {
                return Vec::new();
            };
            if !selector.accept(&view.name) {
                return Vec::new();
            }
            let (has_carrier, has_status) = match &view.shape {
                FnShape::Signature(sig) => (
                    matcher::has_carrier_param(sig, self.pattern),
                    matcher::has_status_result(&sig.output, self.pattern),
                ),
                FnShape::Closure(closure) => (
                    matcher::closure_has_carrier_param(closure, self.pattern),
                    matcher::has_status_result(&closure.output, self.pattern),
                ),
            };
            // the carrier check gates eligibility; the status check only
            // picks the prologue variant
            if !has_carrier {
                return Vec::new();
            }
            if body
                .stmts
                .first()
                .is_some_and(|stmt| self.instrumenter.is_prologue_marker(stmt))
            {
                return Vec::new();
            }
            self.instrumenter
                .prologue(&matcher::span_name(&view.receiver, &view.name), has_status)
        });

        let outcome = if patches.is_empty() {
            Outcome::Unpatched
        } else {
            Outcome::Patched(patches.len())
        };

        // imports go in only after all patches were applied, so a file that
        // ends up unpatched never gains them
        if !patches.is_empty() {
            let unapplied = patch::apply_patches(&mut file, patches);
            if unapplied > 0 {
                return Err(Error::MalformedTree {
                    path: path.to_path_buf(),
                    unapplied,
                });
            }
            add_imports(&mut file, &self.instrumenter.imports());
        }

        Ok(Rewritten {
            source: prettyplease::unparse(&file),
            outcome,
        })
    }
}

/// Append one `use` item per distinct required symbol, after any existing
/// top-level `use` items, skipping symbols the file already imports.
fn add_imports(file: &mut syn::File, imports: &[ImportRef]) {
    let existing: HashSet<String> = file
        .items
        .iter()
        .filter_map(|item| match item {
            syn::Item::Use(item_use) => Some(quote::quote!(#item_use).to_string()),
            _ => None,
        })
        .collect();

    let mut insert_at = file
        .items
        .iter()
        .rposition(|item| matches!(item, syn::Item::Use(_)))
        .map(|index| index + 1)
        .unwrap_or(0);

    let mut seen = HashSet::new();
    for import in imports {
        if !seen.insert(import.path.as_str()) {
            continue;
        }
        let Some(item) = render_use_item(import) else {
            continue;
        };
        let syn::Item::Use(item_use) = &item else {
            continue;
        };
        if existing.contains(&quote::quote!(#item_use).to_string()) {
            continue;
        }
        file.items.insert(insert_at, item);
        insert_at += 1;
    }
}

fn render_use_item(import: &ImportRef) -> Option<syn::Item> {
    let path: syn::Path = syn::parse_str(&import.path).ok()?;
    let tail = path.segments.last()?.ident.to_string();
    let item = if tail == import.name {
        syn::parse_quote! { use #path; }
    } else {
        let alias: syn::Ident = syn::parse_str(&import.name).ok()?;
        syn::parse_quote! { use #path as #alias; }
    };
    Some(item)
}
