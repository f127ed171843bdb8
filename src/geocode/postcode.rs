//! Offline postcode index
//!
//! Loaded once from a reference CSV with at least `postcode`, `latitude`
//! and `longitude` columns, then only read.

use crate::error::{JobMapError, Result};
use jobmap_common::Coordinates;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct PostcodeRow {
    postcode: String,
    latitude: Option<String>,
    longitude: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PostcodeIndex {
    entries: HashMap<String, Coordinates>,
}

/// Drop all whitespace and upper-case: `"hg1 5hh"` → `"HG15HH"`.
pub fn normalize_postcode(postcode: &str) -> String {
    postcode
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

impl PostcodeIndex {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(JobMapError::FileNotFound(path.display().to_string()));
        }

        let mut reader = csv::Reader::from_path(path)?;
        let mut index = Self::default();
        let mut skipped = 0usize;

        for row in reader.deserialize::<PostcodeRow>() {
            let row = row?;
            let coordinates = match (row.latitude.as_deref(), row.longitude.as_deref()) {
                (Some(lat), Some(lon)) => Coordinates::parse(lat, lon),
                _ => None,
            };
            match coordinates {
                Some(c) => index.insert(&row.postcode, c),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            debug!(skipped, "postcode rows without usable coordinates");
        }
        info!(postcodes = index.len(), "loaded postcode index from {}", path.display());
        Ok(index)
    }

    /// Add an entry. The first coordinates seen for a postcode are kept.
    pub fn insert(&mut self, postcode: &str, coordinates: Coordinates) {
        self.entries
            .entry(normalize_postcode(postcode))
            .or_insert(coordinates);
    }

    /// Exact match after normalisation.
    pub fn lookup(&self, postcode: &str) -> Option<Coordinates> {
        self.entries.get(&normalize_postcode(postcode)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Coordinates)> for PostcodeIndex {
    fn from_iter<I: IntoIterator<Item = (String, Coordinates)>>(iter: I) -> Self {
        let mut index = Self::default();
        for (postcode, coordinates) in iter {
            index.insert(&postcode, coordinates);
        }
        index
    }
}
