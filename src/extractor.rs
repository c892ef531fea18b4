use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use memchr::memchr2;
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use crate::config::ExtractConfig;
use crate::error::{ExtractError, Result};
use crate::matcher::{PatternMatcher, PatternMatcherFactory};
use crate::timestamp::parse_line_timestamp;

/// Tracing target for skipped-file warnings. The binary keeps this target at
/// `warn` or louder whatever `RUST_LOG` says.
pub const MISSING_FILE_TARGET: &str = "nslog_extract::missing_file";

/// One accepted line with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub source: PathBuf,
    /// 1-based, reset per file.
    pub line_number: usize,
    /// Line text with surrounding whitespace trimmed.
    pub text: String,
}

impl fmt::Display for MatchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] Line {}: {}",
            self.source.display(),
            self.line_number,
            self.text
        )
    }
}

/// Per-keyword match counts in declaration order.
///
/// Every keyword starts at zero. A keyword declared twice shares one counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchCounters {
    order: Vec<String>,
    counts: FxHashMap<String, usize>,
}

impl MatchCounters {
    pub fn new(keywords: &[String]) -> Self {
        let mut counters = MatchCounters::default();
        for keyword in keywords {
            if !counters.counts.contains_key(keyword) {
                counters.counts.insert(keyword.clone(), 0);
                counters.order.push(keyword.clone());
            }
        }
        counters
    }

    pub fn increment(&mut self, keyword: &str) {
        if let Some(count) = self.counts.get_mut(keyword) {
            *count += 1;
        }
    }

    pub fn get(&self, keyword: &str) -> usize {
        self.counts.get(keyword).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Keywords and counts in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.order
            .iter()
            .map(|keyword| (keyword.as_str(), self.get(keyword)))
    }
}

/// Everything one run produced.
#[derive(Debug, Clone, Default)]
pub struct ExtractionResult {
    /// Accepted lines in discovery order.
    pub records: Vec<MatchRecord>,
    pub counters: MatchCounters,
    pub files_scanned: usize,
    pub files_missing: Vec<PathBuf>,
    pub lines_read: usize,
}

impl ExtractionResult {
    pub fn new(keywords: &[String]) -> Self {
        Self {
            counters: MatchCounters::new(keywords),
            ..Default::default()
        }
    }

    pub fn total_matches(&self) -> usize {
        self.counters.total()
    }
}

/// Outcome of running one line through the filter pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineVerdict {
    /// Empty after trimming.
    Blank,
    /// Dated outside the `since`/`until` window.
    OutOfWindow,
    /// Contains an exclusion term.
    Excluded,
    /// No keyword matched.
    NoMatch,
    /// Accepted; index of the winning keyword.
    Matched(usize),
}

pub struct LogExtractor {
    config: ExtractConfig,
    matchers: Vec<Box<dyn PatternMatcher>>,
}

impl fmt::Debug for LogExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogExtractor")
            .field("config", &self.config)
            .field("matchers", &self.matchers.len())
            .finish()
    }
}

impl LogExtractor {
    /// Compile the keywords of `config`.
    ///
    /// Fails if the keyword list is empty or, in regex mode, if any keyword
    /// is not a valid pattern. Keywords parsed from the command line always
    /// hold at least one entry, possibly the empty string.
    pub fn new(config: ExtractConfig) -> Result<Self> {
        if config.keywords.is_empty() {
            return Err(ExtractError::NoKeywords);
        }
        let matchers = PatternMatcherFactory::create_all(&config.keywords, config.mode)?;
        Ok(Self { config, matchers })
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Run the time, exclude and keyword stages, in that order.
    pub fn evaluate_line(&self, line: &str) -> LineVerdict {
        if line.trim().is_empty() {
            return LineVerdict::Blank;
        }

        if !self.config.window.is_unbounded() {
            if let Some(ts) = parse_line_timestamp(line, self.config.year) {
                if !self.config.window.contains(&ts) {
                    return LineVerdict::OutOfWindow;
                }
            }
        }

        let line_lower = line.to_lowercase();
        if self
            .config
            .exclude
            .iter()
            .any(|term| line_lower.contains(term.as_str()))
        {
            return LineVerdict::Excluded;
        }

        self.matchers
            .iter()
            .position(|m| m.is_match(line, &line_lower))
            .map_or(LineVerdict::NoMatch, LineVerdict::Matched)
    }

    /// Feed one numbered line from `source` through the pipeline.
    pub fn process_line(
        &self,
        source: &Path,
        line_number: usize,
        line: &str,
        result: &mut ExtractionResult,
    ) -> LineVerdict {
        result.lines_read += 1;
        let verdict = self.evaluate_line(line);
        if let LineVerdict::Matched(idx) = verdict {
            result.records.push(MatchRecord {
                source: source.to_path_buf(),
                line_number,
                text: line.trim().to_string(),
            });
            result.counters.increment(&self.config.keywords[idx]);
        }
        verdict
    }

    /// Process in-memory lines as if read from `source`.
    pub fn process_lines<I, S>(&self, source: &Path, lines: I, result: &mut ExtractionResult)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (idx, line) in lines.into_iter().enumerate() {
            self.process_line(source, idx + 1, line.as_ref(), result);
        }
    }

    /// Stream lines from `reader`, replacing invalid UTF-8.
    pub fn process_reader<R: BufRead>(
        &self,
        source: &Path,
        reader: R,
        result: &mut ExtractionResult,
    ) -> io::Result<()> {
        for (idx, line) in LossyLines::new(reader).enumerate() {
            self.process_line(source, idx + 1, &line?, result);
        }
        Ok(())
    }

    /// Process one resolved path. A missing file is a warning, not an error.
    pub fn process_file(&self, path: &Path, result: &mut ExtractionResult) -> Result<()> {
        if !path.exists() {
            warn!(target: MISSING_FILE_TARGET, "File not found: {}", path.display());
            result.files_missing.push(path.to_path_buf());
            return Ok(());
        }

        debug!("Scanning {}", path.display());
        let file = File::open(path).map_err(|e| ExtractError::io(path, "open", e))?;
        self.process_reader(path, BufReader::new(file), result)
            .map_err(|e| ExtractError::io(path, "read", e))?;
        result.files_scanned += 1;
        Ok(())
    }

    /// Resolve the configured path and process every file in order.
    pub fn run(&self) -> Result<ExtractionResult> {
        let mut result = ExtractionResult::new(&self.config.keywords);

        for path in resolve_paths(&self.config.path)? {
            self.process_file(&path, &mut result)?;
        }

        info!(
            files_scanned = result.files_scanned,
            files_missing = result.files_missing.len(),
            lines_read = result.lines_read,
            matches = result.total_matches(),
            "extraction finished"
        );
        Ok(result)
    }
}

/// Expand `path` into the files to scan.
///
/// A directory yields its immediate `*.log` files, sorted. Anything else,
/// including a path that does not exist, is returned as-is.
pub fn resolve_paths(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let entries = fs::read_dir(path).map_err(|e| ExtractError::io(path, "list directory", e))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ExtractError::io(path, "list directory", e))?;
        let entry_path = entry.path();
        if entry.file_name().to_string_lossy().ends_with(".log") && !entry_path.is_dir() {
            files.push(entry_path);
        }
    }
    files.sort();
    Ok(files)
}

/// Line iterator that decodes each line lossily instead of failing on
/// invalid UTF-8. `\n`, `\r\n` and a lone `\r` all end a line and are
/// stripped.
struct LossyLines<R> {
    reader: R,
    buf: Vec<u8>,
    /// Last line ended in `\r`; a `\n` right after it belongs to that line.
    after_cr: bool,
}

impl<R: BufRead> LossyLines<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(256),
            after_cr: false,
        }
    }

    fn skip_lf_after_cr(&mut self) -> io::Result<()> {
        if self.after_cr {
            self.after_cr = false;
            if self.reader.fill_buf()?.first() == Some(&b'\n') {
                self.reader.consume(1);
            }
        }
        Ok(())
    }
}

impl<R: BufRead> Iterator for LossyLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        if let Err(e) = self.skip_lf_after_cr() {
            return Some(Err(e));
        }

        let mut read_any = false;
        loop {
            let bytes = match self.reader.fill_buf() {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Some(Err(e)),
            };
            if bytes.is_empty() {
                break;
            }
            read_any = true;

            let (used, line_done) = match memchr2(b'\n', b'\r', bytes) {
                Some(end) => {
                    self.buf.extend_from_slice(&bytes[..end]);
                    self.after_cr = bytes[end] == b'\r';
                    (end + 1, true)
                }
                None => {
                    self.buf.extend_from_slice(bytes);
                    (bytes.len(), false)
                }
            };
            self.reader.consume(used);
            if line_done {
                break;
            }
        }

        if !read_any {
            return None;
        }
        Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}
