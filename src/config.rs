use std::path::PathBuf;

use chrono::{Datelike, Local, NaiveDateTime};

use crate::cli::Args;
use crate::error::{ExtractError, Result};
use crate::matcher::MatchMode;
use crate::timestamp::{format_timestamp, parse_timestamp};

/// Inclusive `[since, until]` window; a missing side is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindow {
    pub since: Option<NaiveDateTime>,
    pub until: Option<NaiveDateTime>,
}

impl TimeWindow {
    pub fn new(since: Option<NaiveDateTime>, until: Option<NaiveDateTime>) -> Self {
        Self { since, until }
    }

    pub fn contains(&self, ts: &NaiveDateTime) -> bool {
        self.since.is_none_or(|since| *ts >= since) && self.until.is_none_or(|until| *ts <= until)
    }

    pub fn is_unbounded(&self) -> bool {
        self.since.is_none() && self.until.is_none()
    }

    /// Header form, e.g. `Oct 28 10:00:00 → End`.
    pub fn describe(&self) -> String {
        let since = self
            .since
            .as_ref()
            .map_or_else(|| "Start".to_string(), format_timestamp);
        let until = self
            .until
            .as_ref()
            .map_or_else(|| "End".to_string(), format_timestamp);
        format!("{} → {}", since, until)
    }
}

/// Validated settings for one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// File or directory to scan, as given.
    pub path: PathBuf,
    /// Keywords in priority order.
    pub keywords: Vec<String>,
    /// Lowercase exclusion terms.
    pub exclude: Vec<String>,
    pub mode: MatchMode,
    pub window: TimeWindow,
    pub output: PathBuf,
    /// Year stamped onto line timestamps.
    pub year: i32,
}

impl ExtractConfig {
    pub fn new(path: impl Into<PathBuf>, keywords: Vec<String>) -> Self {
        Self {
            path: path.into(),
            keywords,
            exclude: Vec::new(),
            mode: MatchMode::Substring,
            window: TimeWindow::default(),
            output: PathBuf::from("filtered_logs.txt"),
            year: Local::now().year(),
        }
    }

    pub fn with_exclude(mut self, exclude: Vec<String>) -> Self {
        self.exclude = exclude.into_iter().map(|e| e.to_lowercase()).collect();
        self
    }

    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = year;
        self
    }

    /// Build a config from command-line arguments.
    ///
    /// Time bounds are parsed here, so a malformed `--since`/`--until` fails
    /// before any file is opened.
    pub fn from_args(args: &Args) -> Result<Self> {
        let year = Local::now().year();
        let since = parse_bound("--since", args.since.as_deref(), year)?;
        let until = parse_bound("--until", args.until.as_deref(), year)?;

        let mode = if args.regex {
            MatchMode::Regex
        } else {
            MatchMode::Substring
        };

        Ok(ExtractConfig::new(&args.path, split_keywords(&args.keywords))
            .with_exclude(args.exclude.as_deref().map(split_terms).unwrap_or_default())
            .with_mode(mode)
            .with_window(TimeWindow::new(since, until))
            .with_output(&args.output)
            .with_year(year))
    }
}

/// Split a comma-separated keyword list, trimming entries.
///
/// Empty entries are kept: an empty keyword matches every non-blank line.
pub fn split_keywords(raw: &str) -> Vec<String> {
    raw.split(',').map(|term| term.trim().to_string()).collect()
}

/// Split a comma-separated exclusion list, trimming entries and dropping
/// empty ones, which would otherwise exclude every line.
pub fn split_terms(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(String::from)
        .collect()
}

fn parse_bound(flag: &'static str, value: Option<&str>, year: i32) -> Result<Option<NaiveDateTime>> {
    value
        .map(|value| {
            parse_timestamp(value, year).map_err(|source| ExtractError::InvalidTimestamp {
                flag,
                value: value.to_string(),
                source,
            })
        })
        .transpose()
}
