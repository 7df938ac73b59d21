//! Candidate-file discovery: expand file and directory arguments into a
//! deterministic list of Rust sources.
//!
//! Explicitly named files are taken as-is; directories expand recursively
//! to `*.rs` files through a gitignore-aware walk. The combined list is
//! sorted and deduplicated so batch order never depends on filesystem
//! iteration order.

use anyhow::{Context as _, Result};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

pub struct FileWalker {
    roots: Vec<PathBuf>,
    ignore_patterns: Vec<String>,
}

impl FileWalker {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            ignore_patterns: vec![],
        }
    }

    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }

    pub fn walk(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for root in &self.roots {
            let metadata = std::fs::metadata(root)
                .with_context(|| format!("cannot stat {}", root.display()))?;

            if metadata.is_file() {
                files.push(root.clone());
                continue;
            }

            let walker = WalkBuilder::new(root).hidden(false).git_ignore(true).build();
            for entry in walker {
                let entry = entry?;
                let path = entry.path();
                if path.is_file() && self.should_process(path) {
                    files.push(path.to_path_buf());
                }
            }
        }

        files.sort();
        files.dedup();
        Ok(files)
    }

    fn should_process(&self, path: &Path) -> bool {
        let is_rust = path
            .extension()
            .map(|ext| ext == "rs")
            .unwrap_or(false);
        if !is_rust {
            return false;
        }

        let path_str = path.to_string_lossy();
        for pattern in &self.ignore_patterns {
            if glob::Pattern::new(pattern)
                .map(|p| p.matches(&path_str))
                .unwrap_or(false)
            {
                return false;
            }
        }
        true
    }
}

/// Expand mixed file/directory arguments into rewriter input.
pub fn find_source_files(args: &[PathBuf]) -> Result<Vec<PathBuf>> {
    FileWalker::new(args.to_vec()).walk()
}
