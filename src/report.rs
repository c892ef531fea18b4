use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::{Local, NaiveDateTime};
use tracing::debug;

use crate::config::ExtractConfig;
use crate::error::{ExtractError, Result};
use crate::extractor::ExtractionResult;
use crate::matcher::MatchMode;

pub const TOOL_LABEL: &str = concat!(
    "NetScaler Log Keyword Extractor v",
    env!("CARGO_PKG_VERSION")
);

const RULE_WIDTH: usize = 60;

/// Write the report header: run parameters, then a rule and a blank line.
pub fn write_header<W: Write>(
    writer: &mut W,
    config: &ExtractConfig,
    generated: &NaiveDateTime,
) -> io::Result<()> {
    let excluded = if config.exclude.is_empty() {
        "None".to_string()
    } else {
        config.exclude.join(", ")
    };
    let regex_mode = match config.mode {
        MatchMode::Regex => "Enabled",
        MatchMode::Substring => "Disabled",
    };

    writeln!(writer, "### {} ###", TOOL_LABEL)?;
    writeln!(writer, "Generated: {}", generated.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(writer, "Path: {}", config.path.display())?;
    writeln!(writer, "Keywords: {}", config.keywords.join(", "))?;
    writeln!(writer, "Excluded: {}", excluded)?;
    writeln!(writer, "Regex Mode: {}", regex_mode)?;
    writeln!(writer, "Time Filter: {}", config.window.describe())?;
    writeln!(writer, "{}", "-".repeat(RULE_WIDTH))?;
    writeln!(writer)?;
    Ok(())
}

/// Write the header followed by every record and a blank separator line.
pub fn write_report<W: Write>(
    writer: &mut W,
    config: &ExtractConfig,
    result: &ExtractionResult,
    generated: &NaiveDateTime,
) -> io::Result<()> {
    write_header(writer, config, generated)?;
    for record in &result.records {
        writeln!(writer, "{}", record)?;
        writeln!(writer)?;
    }
    Ok(())
}

/// Create (or truncate) the configured output file and write the report.
pub fn write_report_file(config: &ExtractConfig, result: &ExtractionResult) -> Result<()> {
    let output = config.output.as_path();
    let file = File::create(output).map_err(|e| ExtractError::io(output, "create", e))?;
    let mut writer = BufWriter::new(file);
    let generated = Local::now().naive_local();

    write_report(&mut writer, config, result, &generated)
        .and_then(|_| writer.flush())
        .map_err(|e| ExtractError::io(output, "write", e))
}

// Main production function - prints directly to stdout
pub fn print_summary(output: &Path, result: &ExtractionResult) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    // Nothing sensible to do if stdout is gone
    if let Err(e) = print_summary_to_writer(output, result, &mut handle) {
        debug!(error = %e, "summary not written to stdout");
    }
}

// Test-friendly version that can write to any writer
pub fn print_summary_to_writer<W: Write>(
    output: &Path,
    result: &ExtractionResult,
    writer: &mut W,
) -> io::Result<()> {
    writeln!(writer, "\n[+] Log extraction complete → {}", output.display())?;
    writeln!(writer, "[+] Total matches: {}", result.total_matches())?;
    writeln!(writer, "[+] Keyword breakdown:")?;
    for (keyword, count) in result.counters.iter() {
        writeln!(writer, "    {}: {}", keyword, count)?;
    }
    writeln!(writer, "[+] Total lines written: {}", result.records.len())?;
    Ok(())
}
