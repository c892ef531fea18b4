use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::EnvFilter;

use nslog_extract::cli::Args;
use nslog_extract::config::ExtractConfig;
use nslog_extract::error::Result;
use nslog_extract::extractor::{LogExtractor, MISSING_FILE_TARGET};
use nslog_extract::report::{print_summary, write_report_file};

fn main() -> ExitCode {
    let args = Args::parse();

    let mut filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    // Skipped-file warnings stay visible even under RUST_LOG=error
    if let Ok(directive) = format!("{}=warn", MISSING_FILE_TARGET).parse::<Directive>() {
        filter = filter.add_directive(directive);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .with_target(false)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    // Bounds and patterns are validated before any file is touched
    let config = ExtractConfig::from_args(args)?;
    let extractor = LogExtractor::new(config)?;

    let result = extractor.run()?;
    write_report_file(extractor.config(), &result)?;
    print_summary(&extractor.config().output, &result);

    Ok(())
}
