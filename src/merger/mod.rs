//! Per-pair file merging
//!
//! Reads every `"{job_title}__{region}.csv"` in a directory, tags each row
//! with the job title and region recovered from the file name, and stacks
//! the results into one table.

use crate::error::{JobMapError, Result};
use jobmap_common::{PairKey, Table};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

pub const JOB_POSITION_COLUMN: &str = "job_position";
pub const LOCATION_COLUMN: &str = "location";

const TABLE_EXTENSIONS: &[&str] = &["csv", "CSV"];

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    MalformedName,
    Unreadable(String),
}

#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default)]
pub struct MergeReport {
    pub table: Table,
    pub accepted: Vec<PathBuf>,
    pub skipped: Vec<SkippedFile>,
}

/// List tabular files directly inside `directory`, sorted by file name.
pub fn scan_tables(directory: &Path) -> Result<Vec<PathBuf>> {
    if !directory.is_dir() {
        return Err(JobMapError::DirectoryNotFound(directory.display().to_string()));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .map(|ext| TABLE_EXTENSIONS.iter().any(|&e| e == ext.to_string_lossy()))
                .unwrap_or(false)
        })
        .collect();

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Merge all per-pair files in `directory`.
///
/// A file whose name does not split into exactly two non-empty parts, or
/// that cannot be parsed as CSV, is skipped and logged. No accepted files
/// yields an empty table, not an error.
pub fn merge(directory: &Path) -> Result<MergeReport> {
    let mut report = MergeReport::default();
    let mut tables = Vec::new();

    for path in scan_tables(directory)? {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let pair = match PairKey::from_file_name(&file_name) {
            Ok(pair) => pair,
            Err(_) => {
                warn!("Skipping file {}: incorrect filename format", file_name);
                report.skipped.push(SkippedFile {
                    path,
                    reason: SkipReason::MalformedName,
                });
                continue;
            }
        };

        let mut table = match Table::read_csv(&path) {
            Ok(table) => table,
            Err(e) => {
                warn!("Error reading {}: {}", path.display(), e);
                report.skipped.push(SkippedFile {
                    path,
                    reason: SkipReason::Unreadable(e.to_string()),
                });
                continue;
            }
        };

        table.set_constant(JOB_POSITION_COLUMN, &pair.job_title);
        table.set_constant(LOCATION_COLUMN, &pair.region);
        info!(rows = table.len(), "merged {}", file_name);

        tables.push(table);
        report.accepted.push(path);
    }

    if tables.is_empty() {
        warn!("No valid CSV files were processed in {}", directory.display());
    }

    report.table = Table::concat(tables);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_scan_tables_filters_and_sorts() {
        let dir = tempdir().expect("Failed to create temp dir");
        std::fs::write(dir.path().join("b__x.csv"), "a\n1\n").unwrap();
        std::fs::write(dir.path().join("a__x.csv"), "a\n1\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        std::fs::create_dir(dir.path().join("nested__dir.csv")).unwrap();

        let files = scan_tables(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a__x.csv", "b__x.csv"]);
    }

    #[test]
    fn test_merge_missing_directory() {
        let result = merge(Path::new("/nonexistent/jobmap/pairs"));
        assert!(matches!(result, Err(JobMapError::DirectoryNotFound(_))));
    }

    #[test]
    fn test_merge_empty_directory() {
        let dir = tempdir().expect("Failed to create temp dir");
        let report = merge(dir.path()).unwrap();

        assert!(report.table.is_empty());
        assert!(report.accepted.is_empty());
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_merge_skips_unreadable_file() {
        let dir = tempdir().expect("Failed to create temp dir");
        std::fs::write(dir.path().join("GIS__Wales.csv"), "jobId,jobTitle\n1,GIS Officer\n").unwrap();
        std::fs::write(dir.path().join("GIS__Scotland.csv"), "jobId,jobTitle\n1,a,b\n").unwrap();

        let report = merge(dir.path()).unwrap();

        assert_eq!(report.table.len(), 1);
        assert_eq!(report.accepted.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert!(matches!(report.skipped[0].reason, SkipReason::Unreadable(_)));
    }

    #[test]
    fn test_merge_overwrites_location_column() {
        let dir = tempdir().expect("Failed to create temp dir");
        std::fs::write(
            dir.path().join("data analyst__remote.csv"),
            "jobId,location\n7,Leeds\n",
        )
        .unwrap();

        let report = merge(dir.path()).unwrap();

        assert_eq!(report.table.columns(), &["jobId", "location", "job_position"]);
        assert_eq!(report.table.get(0, LOCATION_COLUMN), Some("remote"));
        assert_eq!(report.table.get(0, JOB_POSITION_COLUMN), Some("data analyst"));
    }
}
