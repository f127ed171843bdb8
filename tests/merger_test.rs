//! Merging per-pair files

use jobmap_rust::merger::{self, SkipReason, JOB_POSITION_COLUMN, LOCATION_COLUMN};
use std::path::Path;
use tempfile::tempdir;

fn write_rows(path: &Path, header: &str, rows: usize) {
    let mut content = format!("{}\n", header);
    for i in 0..rows {
        content.push_str(&format!("{},Job {},Leeds\n", i, i));
    }
    std::fs::write(path, content).unwrap();
}

/// A well-formed file and a badly named one.
#[test]
fn test_bad_name_is_skipped() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_rows(&dir.path().join("GIS__England.csv"), "jobId,jobTitle,locationName", 5);
    write_rows(&dir.path().join("badname.csv"), "jobId,jobTitle,locationName", 3);

    let report = merger::merge(dir.path()).unwrap();

    assert_eq!(report.table.len(), 5);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].reason, SkipReason::MalformedName);
    assert!(report.skipped[0].path.ends_with("badname.csv"));
    for row in 0..5 {
        assert_eq!(report.table.get(row, JOB_POSITION_COLUMN), Some("GIS"));
        assert_eq!(report.table.get(row, LOCATION_COLUMN), Some("England"));
    }
}

/// Merged row count is the sum of the accepted files' row counts.
#[test]
fn test_row_count_is_sum_of_accepted() {
    let dir = tempdir().expect("Failed to create temp dir");
    let files = [
        ("data analyst__England.csv", 12),
        ("data analyst__Wales.csv", 0),
        ("GIS__Scotland.csv", 7),
        ("GIS__Northern Ireland.csv", 1),
    ];
    for (name, rows) in files {
        write_rows(&dir.path().join(name), "jobId,jobTitle,locationName", rows);
    }
    write_rows(&dir.path().join("a__b__c.csv"), "jobId,jobTitle,locationName", 4);
    write_rows(&dir.path().join("__Wales.csv"), "jobId,jobTitle,locationName", 4);

    let report = merger::merge(dir.path()).unwrap();

    assert_eq!(report.accepted.len(), 4);
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(report.table.len(), 12 + 7 + 1);
}

/// Files with different columns merge into the union.
#[test]
fn test_column_union() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("GIS__England.csv"), "jobId,minimumSalary\n1,30000\n").unwrap();
    std::fs::write(dir.path().join("GIS__Wales.csv"), "jobId,maximumSalary\n2,40000\n").unwrap();

    let report = merger::merge(dir.path()).unwrap();
    let table = report.table;

    assert_eq!(
        table.columns(),
        &["jobId", "minimumSalary", "job_position", "location", "maximumSalary"]
    );
    assert_eq!(table.get(0, "maximumSalary"), Some(""));
    assert_eq!(table.get(1, "minimumSalary"), Some(""));
    assert_eq!(table.get(1, "location"), Some("Wales"));
}

/// Short rows are padded, not a reason to drop the file.
#[test]
fn test_short_rows_are_kept() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(
        dir.path().join("GIS__England.csv"),
        "jobId,jobTitle,minimumSalary\n1,GIS,30000\n2,GIS\n",
    )
    .unwrap();

    let report = merger::merge(dir.path()).unwrap();

    assert!(report.skipped.is_empty());
    assert_eq!(report.table.len(), 2);
    assert_eq!(report.table.get(1, "jobId"), Some("2"));
    assert_eq!(report.table.get(1, "minimumSalary"), Some(""));
    assert_eq!(report.table.get(1, LOCATION_COLUMN), Some("England"));
}

/// Rows longer than the header still make the file unreadable.
#[test]
fn test_long_row_skips_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("GIS__England.csv"), "jobId,jobTitle\n1,GIS,extra\n").unwrap();

    let report = merger::merge(dir.path()).unwrap();

    assert!(report.table.is_empty());
    assert_eq!(report.skipped.len(), 1);
    match &report.skipped[0].reason {
        SkipReason::Unreadable(message) => {
            assert!(message.contains("3 fields"), "{}", message);
            assert!(!message.contains("CSV error: CSV error"), "{}", message);
        }
        other => panic!("expected Unreadable, got {:?}", other),
    }
}

/// A repeated `location` header keeps both columns and the region tag wins.
#[test]
fn test_repeated_location_header_keeps_region_tag() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("GIS__England.csv"), "jobId,location,location\n1,Leeds,York\n")
        .unwrap();

    let report = merger::merge(dir.path()).unwrap();
    let table = report.table;

    assert_eq!(table.columns(), &["jobId", "location", "location.1", "job_position"]);
    assert_eq!(table.get(0, LOCATION_COLUMN), Some("England"));
    assert_eq!(table.get(0, "location.1"), Some("York"));
    assert_eq!(table.get(0, JOB_POSITION_COLUMN), Some("GIS"));
}
