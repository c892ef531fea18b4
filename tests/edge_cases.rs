// tests/edge_cases.rs
use std::fs;
use std::io::Write;

use nslog_extract::config::ExtractConfig;
use nslog_extract::extractor::{resolve_paths, LogExtractor};
use tempfile::{NamedTempFile, TempDir};

fn error_extractor(path: &std::path::Path) -> LogExtractor {
    LogExtractor::new(ExtractConfig::new(path, vec!["error".to_string()])).unwrap()
}

#[test]
fn test_resolve_plain_file_as_is() {
    let temp_file = NamedTempFile::new().unwrap();
    let paths = resolve_paths(temp_file.path()).unwrap();
    assert_eq!(paths, vec![temp_file.path().to_path_buf()]);
}

#[test]
fn test_resolve_missing_path_as_is() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("gone.log");
    assert_eq!(resolve_paths(&missing).unwrap(), vec![missing]);
}

#[test]
fn test_resolve_directory_is_flat_and_sorted() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("b.log"), "").unwrap();
    fs::write(dir.path().join("a.log"), "").unwrap();
    fs::write(dir.path().join("c.log.gz"), "").unwrap();
    fs::write(dir.path().join("readme.txt"), "").unwrap();
    fs::create_dir(dir.path().join("archive.log")).unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("nested").join("deep.log"), "").unwrap();

    let paths = resolve_paths(dir.path()).unwrap();
    assert_eq!(
        paths,
        vec![dir.path().join("a.log"), dir.path().join("b.log")]
    );
}

#[test]
fn test_invalid_utf8_does_not_abort() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"Oct 29 12:00:00 ERROR bad byte \xff\xfe here\n").unwrap();
    temp_file.write_all(b"Oct 29 12:00:01 ERROR clean line\n").unwrap();

    let extractor = error_extractor(temp_file.path());
    let result = extractor.run().unwrap();

    assert_eq!(result.records.len(), 2);
    assert!(result.records[0].text.starts_with("Oct 29 12:00:00 ERROR bad byte"));
    assert_eq!(result.records[1].text, "Oct 29 12:00:01 ERROR clean line");
}

#[test]
fn test_crlf_line_endings() {
    let mut temp_file = NamedTempFile::new().unwrap();
    write!(temp_file, "Oct 29 12:00:00 ERROR one\r\n\r\nOct 29 12:00:01 ERROR two\r\n").unwrap();

    let result = error_extractor(temp_file.path()).run().unwrap();

    let lines: Vec<(usize, &str)> = result
        .records
        .iter()
        .map(|r| (r.line_number, r.text.as_str()))
        .collect();
    assert_eq!(
        lines,
        vec![(1, "Oct 29 12:00:00 ERROR one"), (3, "Oct 29 12:00:01 ERROR two")]
    );
}

#[test]
fn test_last_line_without_newline() {
    let mut temp_file = NamedTempFile::new().unwrap();
    write!(temp_file, "Oct 29 12:00:00 INFO ok\nOct 29 12:00:01 ERROR tail").unwrap();

    let result = error_extractor(temp_file.path()).run().unwrap();
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].line_number, 2);
}

#[test]
fn test_line_numbers_reset_per_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.log"), "noise\nOct 29 12:00:00 ERROR a\n").unwrap();
    fs::write(dir.path().join("b.log"), "Oct 29 12:00:00 ERROR b\n").unwrap();

    let result = error_extractor(dir.path()).run().unwrap();

    assert_eq!(result.files_scanned, 2);
    assert_eq!(result.lines_read, 3);
    let provenance: Vec<(String, usize)> = result
        .records
        .iter()
        .map(|r| (r.source.file_name().unwrap().to_string_lossy().into_owned(), r.line_number))
        .collect();
    assert_eq!(
        provenance,
        vec![("a.log".to_string(), 2), ("b.log".to_string(), 1)]
    );
}

#[test]
fn test_missing_file_is_recorded() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("gone.log");

    let result = error_extractor(&missing).run().unwrap();

    assert_eq!(result.files_missing, vec![missing]);
    assert_eq!(result.files_scanned, 0);
    assert_eq!(result.total_matches(), 0);
    assert!(result.records.is_empty());
}

#[test]
fn test_empty_directory() {
    let dir = TempDir::new().unwrap();
    let result = error_extractor(dir.path()).run().unwrap();
    assert_eq!(result.files_scanned, 0);
    assert_eq!(result.counters.get("error"), 0);
}
