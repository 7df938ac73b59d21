//! File-level and per-declaration rewrite directives.
//!
//! Plain `//` comments do not survive the parse/unparse round trip, so
//! directives use the comment forms that do (the cbindgen-style annotation
//! convention):
//!
//! - `//! traceweave:build TERM...` — file-level build constraint in the
//!   file's inner docs. The file is skipped when the host cannot satisfy it.
//! - `/// traceweave:select` / `/// traceweave:skip` — per-declaration
//!   override on a function, method, or trait default method. An optional
//!   explicit target (`/// traceweave:skip anonymous`) addresses a name
//!   other than the annotated one, which is how all closures in a file are
//!   toggled through their shared synthetic key.
//!
//! The generated-file marker is checked against the raw source header,
//! before any parse, so skipped files stay byte-identical.

use crate::errors::{Error, Result};
use std::path::Path;
use syn::visit::{self, Visit};

/// Every directive comment starts with this prefix.
pub const DIRECTIVE_PREFIX: &str = "traceweave:";

const KEYWORD_BUILD: &str = "build";
const KEYWORD_SELECT: &str = "select";
const KEYWORD_SKIP: &str = "skip";

/// Keyword of a per-declaration command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Select,
    Skip,
}

/// One per-declaration override, collected in source order. A later command
/// for the same name overrides an earlier one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub kind: CommandKind,
    pub name: String,
}

/// A file-level build constraint: a conjunction of (possibly negated) tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDirective {
    terms: Vec<String>,
}

impl BuildDirective {
    /// True when the host cannot satisfy the constraint. Tags the tool does
    /// not recognize (anything other than the host OS, host architecture,
    /// or `any`) are unsatisfiable, so `ignore` always skips the file.
    pub fn skip_file(&self) -> bool {
        !self.satisfied_by(&[std::env::consts::OS, std::env::consts::ARCH])
    }

    fn satisfied_by(&self, tags: &[&str]) -> bool {
        self.terms.iter().all(|term| match term.strip_prefix('!') {
            Some(tag) => !tag_matches(tags, tag),
            None => tag_matches(tags, term),
        })
    }
}

fn tag_matches(tags: &[&str], tag: &str) -> bool {
    tag == "any" || tags.contains(&tag)
}

/// Whether the raw source header marks the file as generated: any leading
/// comment line containing `@generated` or following the
/// `Code generated ... DO NOT EDIT.` convention.
pub fn is_generated(source: &str) -> bool {
    for line in source.lines() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            continue;
        }
        if !trimmed.starts_with("//") {
            break;
        }
        let text = trimmed.trim_start_matches('/').trim_start_matches('!').trim();
        if text.contains("@generated")
            || (text.starts_with("Code generated") && text.ends_with("DO NOT EDIT."))
        {
            return true;
        }
    }
    false
}

/// Collect the file-level build directives from the inner doc comments.
pub fn build_directives(file: &syn::File) -> Vec<BuildDirective> {
    doc_lines(&file.attrs)
        .filter_map(|line| {
            let rest = line.trim().strip_prefix(DIRECTIVE_PREFIX)?;
            let mut words = rest.split_whitespace();
            (words.next() == Some(KEYWORD_BUILD)).then(|| BuildDirective {
                terms: words.map(str::to_string).collect(),
            })
        })
        .collect()
}

/// Collect per-declaration commands in source order. File-level command
/// lines are accepted when they name an explicit target. A `traceweave:`
/// line with an unknown keyword is a fatal directive error.
pub fn commands(path: &Path, file: &syn::File) -> Result<Vec<Command>> {
    let mut collector = CommandCollector::default();

    // File-level commands must carry an explicit target name.
    for line in doc_lines(&file.attrs) {
        let Some(rest) = line.trim().strip_prefix(DIRECTIVE_PREFIX) else {
            continue;
        };
        let mut words = rest.split_whitespace();
        match words.next() {
            Some(KEYWORD_BUILD) => {}
            Some(keyword @ (KEYWORD_SELECT | KEYWORD_SKIP)) => match words.next() {
                Some(target) => collector.push(keyword, target.to_string(), words.next()),
                None => collector.fail(format!(
                    "file-level `{DIRECTIVE_PREFIX}{keyword}` requires a function name"
                )),
            },
            other => collector.fail(format!(
                "unknown directive keyword {:?}",
                other.unwrap_or_default()
            )),
        }
    }

    collector.visit_file(file);

    match collector.error {
        Some(message) => Err(Error::directive(path, message)),
        None => Ok(collector.commands),
    }
}

#[derive(Default)]
struct CommandCollector {
    commands: Vec<Command>,
    error: Option<String>,
}

impl CommandCollector {
    fn collect(&mut self, attrs: &[syn::Attribute], declared_name: &str) {
        for line in doc_lines(attrs) {
            let Some(rest) = line.trim().strip_prefix(DIRECTIVE_PREFIX) else {
                continue;
            };
            let mut words = rest.split_whitespace();
            match words.next() {
                Some(keyword @ (KEYWORD_SELECT | KEYWORD_SKIP)) => {
                    let target = words
                        .next()
                        .map(str::to_string)
                        .unwrap_or_else(|| declared_name.to_string());
                    self.push(keyword, target, words.next());
                }
                Some(KEYWORD_BUILD) => {
                    self.fail("build directives are file-level (`//!`), not per-declaration")
                }
                other => self.fail(format!(
                    "unknown directive keyword {:?}",
                    other.unwrap_or_default()
                )),
            }
        }
    }

    fn push(&mut self, keyword: &str, target: String, trailing: Option<&str>) {
        if trailing.is_some() {
            self.fail(format!(
                "trailing tokens after `{DIRECTIVE_PREFIX}{keyword} {target}`"
            ));
            return;
        }
        let kind = if keyword == KEYWORD_SELECT {
            CommandKind::Select
        } else {
            CommandKind::Skip
        };
        self.commands.push(Command { kind, name: target });
    }

    fn fail(&mut self, message: impl Into<String>) {
        // first malformed directive wins
        if self.error.is_none() {
            self.error = Some(message.into());
        }
    }
}

impl<'ast> Visit<'ast> for CommandCollector {
    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        self.collect(&node.attrs, &node.sig.ident.to_string());
        visit::visit_item_fn(self, node);
    }

    fn visit_impl_item_fn(&mut self, node: &'ast syn::ImplItemFn) {
        self.collect(&node.attrs, &node.sig.ident.to_string());
        visit::visit_impl_item_fn(self, node);
    }

    fn visit_trait_item_fn(&mut self, node: &'ast syn::TraitItemFn) {
        self.collect(&node.attrs, &node.sig.ident.to_string());
        visit::visit_trait_item_fn(self, node);
    }
}

/// Text of every `#[doc = "..."]` attribute, one entry per doc line.
fn doc_lines(attrs: &[syn::Attribute]) -> impl Iterator<Item = String> + '_ {
    attrs.iter().filter_map(|attr| {
        if !attr.path().is_ident("doc") {
            return None;
        }
        let syn::Meta::NameValue(name_value) = &attr.meta else {
            return None;
        };
        let syn::Expr::Lit(expr_lit) = &name_value.value else {
            return None;
        };
        match &expr_lit.lit {
            syn::Lit::Str(lit) => Some(lit.value()),
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn parse(source: &str) -> syn::File {
        syn::parse_file(source).unwrap()
    }

    fn commands_of(source: &str) -> Result<Vec<Command>> {
        commands(Path::new("test.rs"), &parse(source))
    }

    #[test]
    fn test_generated_marker_detected() {
        assert!(is_generated("// @generated by prost-build\nfn a() {}\n"));
        assert!(is_generated(
            "// Code generated by protoc. DO NOT EDIT.\nfn a() {}\n"
        ));
        assert!(!is_generated("fn a() {}\n"));
        // marker below the first item is not a header
        assert!(!is_generated("fn a() {}\n// @generated\n"));
    }

    #[test]
    fn test_build_directive_ignore_skips() {
        let file = parse("//! traceweave:build ignore\nfn a() {}\n");
        let directives = build_directives(&file);
        assert_eq!(directives.len(), 1);
        assert!(directives[0].skip_file());
    }

    #[test]
    fn test_build_directive_host_os_satisfied() {
        let source = format!("//! traceweave:build {}\nfn a() {{}}\n", std::env::consts::OS);
        let directives = build_directives(&parse(&source));
        assert!(!directives[0].skip_file());
    }

    #[test]
    fn test_build_directive_negation() {
        let directive = BuildDirective {
            terms: vec!["!windows".to_string()],
        };
        assert!(directive.satisfied_by(&["linux", "x86_64"]));
        assert!(!directive.satisfied_by(&["windows", "x86_64"]));
    }

    #[test]
    fn test_build_directive_conjunction() {
        let directive = BuildDirective {
            terms: vec!["linux".to_string(), "aarch64".to_string()],
        };
        assert!(directive.satisfied_by(&["linux", "aarch64"]));
        assert!(!directive.satisfied_by(&["linux", "x86_64"]));
    }

    #[test]
    fn test_unknown_tag_is_unsatisfiable() {
        let directive = BuildDirective {
            terms: vec!["wasm-exotic".to_string()],
        };
        assert!(!directive.satisfied_by(&["linux", "x86_64"]));
    }

    #[test]
    fn test_commands_attach_to_declared_function() {
        let source = indoc! {r#"
            /// traceweave:skip
            fn alpha() {}

            /// traceweave:select
            fn beta() {}
        "#};
        let commands = commands_of(source).unwrap();
        assert_eq!(
            commands,
            vec![
                Command {
                    kind: CommandKind::Skip,
                    name: "alpha".to_string()
                },
                Command {
                    kind: CommandKind::Select,
                    name: "beta".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_commands_on_methods_and_trait_defaults() {
        let source = indoc! {r#"
            struct S;
            impl S {
                /// traceweave:skip
                fn run(&self) {}
            }
            trait T {
                /// traceweave:select
                fn go(&self) {}
            }
        "#};
        let commands = commands_of(source).unwrap();
        let names: Vec<&str> = commands.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["run", "go"]);
    }

    #[test]
    fn test_explicit_target_name() {
        let source = indoc! {r#"
            /// traceweave:skip anonymous
            fn alpha() {}
        "#};
        let commands = commands_of(source).unwrap();
        assert_eq!(commands[0].name, "anonymous");
        assert_eq!(commands[0].kind, CommandKind::Skip);
    }

    #[test]
    fn test_file_level_command_needs_target() {
        let source = "//! traceweave:skip\nfn alpha() {}\n";
        assert!(commands_of(source).is_err());

        let source = "//! traceweave:skip anonymous\nfn alpha() {}\n";
        let commands = commands_of(source).unwrap();
        assert_eq!(commands[0].name, "anonymous");
    }

    #[test]
    fn test_unknown_keyword_is_malformed() {
        let source = indoc! {r#"
            /// traceweave:trace
            fn alpha() {}
        "#};
        let err = commands_of(source).unwrap_err();
        assert!(err.to_string().contains("unknown directive keyword"));
    }

    #[test]
    fn test_unrelated_doc_lines_are_ignored() {
        let source = indoc! {r#"
            /// Runs the handler; see traceweave docs.
            fn alpha() {}
        "#};
        assert!(commands_of(source).unwrap().is_empty());
    }
}
