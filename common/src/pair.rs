//! Per-pair filename convention
//!
//! Every fetched (job title, region) pair is persisted as
//! `"{job_title}__{region}.csv"`. The merger recovers both parts from the
//! file name, so a key is only valid if it survives that round trip.

use crate::error::{Error, Result};
use std::fmt;
use std::path::Path;

/// Separator between job title and region in a per-pair file name.
pub const PAIR_SEPARATOR: &str = "__";

/// Extension of per-pair files.
pub const PAIR_EXTENSION: &str = "csv";

/// One (job title, region) combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairKey {
    pub job_title: String,
    pub region: String,
}

impl PairKey {
    /// Build a key, rejecting parts that could not be recovered from the
    /// resulting file name.
    pub fn new(job_title: impl Into<String>, region: impl Into<String>) -> Result<Self> {
        let job_title = job_title.into();
        let region = region.into();
        check_part("job title", &job_title)?;
        check_part("region", &region)?;
        Ok(Self { job_title, region })
    }

    /// `"{job_title}__{region}.csv"`
    pub fn file_name(&self) -> String {
        format!(
            "{}{}{}.{}",
            self.job_title, PAIR_SEPARATOR, self.region, PAIR_EXTENSION
        )
    }

    /// Recover a key from a per-pair file name.
    ///
    /// The extension is stripped and the stem must split on the separator
    /// into exactly two non-empty parts. Nothing is repaired.
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let stem = Path::new(file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::InvalidPair(format!("no file stem in '{}'", file_name)))?;

        let parts: Vec<&str> = stem.split(PAIR_SEPARATOR).collect();
        match parts.as_slice() {
            [job_title, region] if !job_title.is_empty() && !region.is_empty() => Ok(Self {
                job_title: (*job_title).to_string(),
                region: (*region).to_string(),
            }),
            _ => Err(Error::InvalidPair(format!(
                "'{}' does not split into <job title>{}<region>",
                file_name, PAIR_SEPARATOR
            ))),
        }
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.job_title, self.region)
    }
}

fn check_part(what: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidPair(format!("{} is empty", what)));
    }
    if value.contains(PAIR_SEPARATOR) {
        return Err(Error::InvalidPair(format!(
            "{} '{}' contains '{}'",
            what, value, PAIR_SEPARATOR
        )));
    }
    if value.contains('/') || value.contains('\\') || value.starts_with('.') {
        return Err(Error::InvalidPair(format!(
            "{} '{}' is not usable in a file name",
            what, value
        )));
    }
    Ok(())
}
