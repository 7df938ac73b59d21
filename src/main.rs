use anyhow::Result;
use clap::Parser;

use traceweave::cli::Cli;
use traceweave::config::FileConfig;
use traceweave::processor::TraceProcessor;
use traceweave::walker::FileWalker;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let file_config = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::load_default()?,
    };

    let config = cli.trace_config(&file_config);
    let pattern = cli.trace_pattern(&file_config);
    let workers = cli.worker_count(&file_config);

    let files = FileWalker::new(cli.paths.clone())
        .with_ignore_patterns(cli.ignore_patterns.clone())
        .walk()?;

    let summary = TraceProcessor::new(workers, pattern).process(&files, &config)?;

    println!(
        "{} files: {} patched, {} unpatched, {} skipped",
        summary.total(),
        summary.patched,
        summary.unpatched,
        summary.skipped
    );

    Ok(())
}
