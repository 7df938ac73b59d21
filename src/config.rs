//! Invocation configuration: the signature pattern to match, per-run
//! options, and the optional `traceweave.toml` config file.

use anyhow::Context as _;
use serde::Deserialize;
use std::path::Path;

/// Which parameter constitutes the request-scoped carrier and which return
/// type constitutes a status result.
///
/// Matching is name/shape based, not type-identity based: a renamed import
/// of the carrier type is not resolved. This keeps the matcher independent
/// of semantic analysis while covering the common calling convention.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TracePattern {
    /// Identifier the carrier parameter must be bound to.
    pub carrier_name: String,
    /// First segment of the carrier parameter's `package::Type` path.
    pub carrier_package: String,
    /// Second segment of the carrier parameter's `package::Type` path.
    pub carrier_type: String,
    /// Leading identifier of a status return type. Rust has no named
    /// results, so only the type is consulted; generics are ignored.
    pub status_type: String,
}

impl Default for TracePattern {
    fn default() -> Self {
        Self {
            carrier_name: "cx".to_string(),
            carrier_package: "opentelemetry".to_string(),
            carrier_type: "Context".to_string(),
            status_type: "Result".to_string(),
        }
    }
}

/// Per-invocation options, fixed for every file in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TraceConfig {
    /// Span target label for the traced application.
    pub app: String,
    /// Overwrite files in place; when false rewritten output is discarded.
    pub overwrite: bool,
    /// Instrument every matching function unless a directive opts it out.
    pub default_select: bool,
    /// Skip files whose header carries a generated-file marker.
    pub skip_generated: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            app: "app".to_string(),
            overwrite: false,
            default_select: true,
            skip_generated: false,
        }
    }
}

/// Contents of a `traceweave.toml` file. CLI flags override these values;
/// these values override the built-in defaults.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub trace: TraceConfig,
    pub pattern: TracePattern,
    /// Worker count; `0` means one worker per CPU.
    pub jobs: Option<usize>,
}

impl FileConfig {
    pub const DEFAULT_PATH: &'static str = "traceweave.toml";

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Load `traceweave.toml` from the working directory when present,
    /// otherwise fall back to defaults.
    pub fn load_default() -> anyhow::Result<Self> {
        let path = Path::new(Self::DEFAULT_PATH);
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}
