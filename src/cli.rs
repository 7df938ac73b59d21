//! Command-line surface.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{FileConfig, TraceConfig, TracePattern};

#[derive(Parser, Debug)]
#[command(name = "traceweave")]
#[command(about = "Inject tracing span prologues into Rust functions that thread a request-scoped handle", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Files or directories to instrument
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Span target label for the traced application
    #[arg(short = 'n', long, env = "TRACEWEAVE_APP")]
    pub app: Option<String>,

    /// Overwrite original files (omit for a dry run)
    #[arg(short = 'w', long, env = "TRACEWEAVE_OVERWRITE")]
    pub overwrite: bool,

    /// Instrument all matching functions by default
    #[arg(
        short = 's',
        long,
        env = "TRACEWEAVE_DEFAULT_SELECT",
        action = clap::ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub default_select: Option<bool>,

    /// Skip files carrying a generated-file header
    #[arg(short = 'k', long, env = "TRACEWEAVE_SKIP_GENERATED")]
    pub skip_generated: bool,

    /// Number of parallel workers (0 = one per CPU)
    #[arg(short = 'j', long, env = "TRACEWEAVE_JOBS")]
    pub jobs: Option<usize>,

    /// Config file (default: ./traceweave.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Carrier parameter name to match
    #[arg(long, env = "TRACEWEAVE_CARRIER_NAME")]
    pub carrier_name: Option<String>,

    /// Package segment of the carrier parameter type
    #[arg(long, env = "TRACEWEAVE_CARRIER_PACKAGE")]
    pub carrier_package: Option<String>,

    /// Type segment of the carrier parameter type
    #[arg(long, env = "TRACEWEAVE_CARRIER_TYPE")]
    pub carrier_type: Option<String>,

    /// Return type identifier treated as a status result
    #[arg(long, env = "TRACEWEAVE_STATUS_TYPE")]
    pub status_type: Option<String>,

    /// Glob patterns excluded during directory walks
    #[arg(long = "ignore", value_delimiter = ',')]
    pub ignore_patterns: Vec<String>,
}

impl Cli {
    /// Flags override config-file values; config-file values override the
    /// built-in defaults.
    pub fn trace_config(&self, file: &FileConfig) -> TraceConfig {
        TraceConfig {
            app: self.app.clone().unwrap_or_else(|| file.trace.app.clone()),
            overwrite: self.overwrite || file.trace.overwrite,
            default_select: self.default_select.unwrap_or(file.trace.default_select),
            skip_generated: self.skip_generated || file.trace.skip_generated,
        }
    }

    pub fn trace_pattern(&self, file: &FileConfig) -> TracePattern {
        TracePattern {
            carrier_name: self
                .carrier_name
                .clone()
                .unwrap_or_else(|| file.pattern.carrier_name.clone()),
            carrier_package: self
                .carrier_package
                .clone()
                .unwrap_or_else(|| file.pattern.carrier_package.clone()),
            carrier_type: self
                .carrier_type
                .clone()
                .unwrap_or_else(|| file.pattern.carrier_type.clone()),
            status_type: self
                .status_type
                .clone()
                .unwrap_or_else(|| file.pattern.status_type.clone()),
        }
    }

    pub fn worker_count(&self, file: &FileConfig) -> usize {
        self.jobs.or(file.jobs).unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_defaults_without_config_file() {
        let cli = parse(&["traceweave", "src"]);
        let file = FileConfig::default();
        let config = cli.trace_config(&file);
        assert_eq!(config.app, "app");
        assert!(!config.overwrite);
        assert!(config.default_select);
        assert!(!config.skip_generated);
        assert_eq!(cli.worker_count(&file), 1);
    }

    #[test]
    fn test_flags_override_config_file() {
        let cli = parse(&[
            "traceweave",
            "-n",
            "checkout",
            "--default-select",
            "false",
            "-j",
            "8",
            "src",
        ]);
        let mut file = FileConfig::default();
        file.trace.app = "from-file".to_string();
        file.jobs = Some(2);

        let config = cli.trace_config(&file);
        assert_eq!(config.app, "checkout");
        assert!(!config.default_select);
        assert_eq!(cli.worker_count(&file), 8);
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let cli = parse(&["traceweave", "src"]);
        let mut file = FileConfig::default();
        file.trace.overwrite = true;
        file.pattern.carrier_name = "ctx".to_string();
        file.jobs = Some(4);

        assert!(cli.trace_config(&file).overwrite);
        assert_eq!(cli.trace_pattern(&file).carrier_name, "ctx");
        assert_eq!(cli.worker_count(&file), 4);
    }

    #[test]
    fn test_paths_are_required() {
        assert!(Cli::try_parse_from(["traceweave"]).is_err());
    }
}
