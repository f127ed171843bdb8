//! Geocoding
//!
//! A location string is resolved one of two ways:
//! - postcode: exact lookup in the offline [`PostcodeIndex`]
//! - place name: cached online search through a [`PlaceSearch`] backend
//!
//! Which way is decided by a [`LocationClassifier`]; the default is the
//! digit heuristic (anything containing a digit is a postcode).

pub mod cache;
pub mod nominatim;
pub mod postcode;

pub use cache::GeoCache;
pub use nominatim::{NominatimClient, PlaceCandidate, PlaceSearch};
pub use postcode::{normalize_postcode, PostcodeIndex};

use indicatif::ProgressBar;
use jobmap_common::{Coordinates, Table};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const LATITUDE_COLUMN: &str = "latitude";
pub const LONGITUDE_COLUMN: &str = "longitude";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    Postcode,
    PlaceName,
}

/// Decides which resolution path a location string takes.
pub trait LocationClassifier {
    fn classify(&self, location: &str) -> LocationKind;
}

/// Anything containing an ASCII or Unicode digit is treated as a postcode.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigitHeuristic;

impl LocationClassifier for DigitHeuristic {
    fn classify(&self, location: &str) -> LocationKind {
        if location.chars().any(|c| c.is_numeric()) {
            LocationKind::Postcode
        } else {
            LocationKind::PlaceName
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverStats {
    pub postcode_hits: usize,
    pub postcode_misses: usize,
    pub cache_hits: usize,
    pub online_lookups: usize,
    pub online_not_found: usize,
    pub online_failures: usize,
}

pub struct GeocodeResolver<P, C = DigitHeuristic> {
    postcodes: PostcodeIndex,
    search: P,
    classifier: C,
    cache: GeoCache,
    pause: Duration,
    stats: ResolverStats,
}

impl<P: PlaceSearch> GeocodeResolver<P> {
    pub fn new(postcodes: PostcodeIndex, search: P) -> Self {
        Self {
            postcodes,
            search,
            classifier: DigitHeuristic,
            cache: GeoCache::new(),
            pause: Duration::from_secs(1),
            stats: ResolverStats::default(),
        }
    }
}

impl<P: PlaceSearch, C: LocationClassifier> GeocodeResolver<P, C> {
    /// Swap the postcode/place-name classifier.
    pub fn with_classifier<C2: LocationClassifier>(self, classifier: C2) -> GeocodeResolver<P, C2> {
        GeocodeResolver {
            postcodes: self.postcodes,
            search: self.search,
            classifier,
            cache: self.cache,
            pause: self.pause,
            stats: self.stats,
        }
    }

    /// Pause after each successful online lookup (cache misses only).
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Resolve a location to coordinates, or `None` if it cannot be found.
    ///
    /// Failures of the online service are logged and reported as `None`;
    /// only successful online hits are cached.
    pub async fn resolve(&mut self, location: &str) -> Option<Coordinates> {
        if location.trim().is_empty() {
            return None;
        }

        match self.classifier.classify(location) {
            LocationKind::Postcode => self.resolve_postcode(location),
            LocationKind::PlaceName => self.resolve_place(location).await,
        }
    }

    fn resolve_postcode(&mut self, postcode: &str) -> Option<Coordinates> {
        let found = self.postcodes.lookup(postcode);
        if found.is_some() {
            self.stats.postcode_hits += 1;
        } else {
            self.stats.postcode_misses += 1;
            debug!(postcode, "postcode not in index");
        }
        found
    }

    async fn resolve_place(&mut self, place: &str) -> Option<Coordinates> {
        if let Some(hit) = self.cache.get(place) {
            self.stats.cache_hits += 1;
            return Some(hit);
        }

        self.stats.online_lookups += 1;
        let candidates = match self.search.search(place).await {
            Ok(candidates) => candidates,
            Err(e) => {
                self.stats.online_failures += 1;
                warn!("Error fetching data for {}: {}", place, e);
                return None;
            }
        };

        let Some(first) = candidates.first() else {
            self.stats.online_not_found += 1;
            debug!(place, "no search results");
            return None;
        };

        let Some(coordinates) = Coordinates::parse(&first.lat, &first.lon) else {
            self.stats.online_failures += 1;
            warn!(place, lat = %first.lat, lon = %first.lon, "unparseable coordinates in search result");
            return None;
        };

        debug!(
            place,
            matched = first.display_name.as_deref().unwrap_or_default(),
            "resolved online"
        );
        self.cache.insert(place.to_string(), coordinates);
        if !self.pause.is_zero() {
            tokio::time::sleep(self.pause).await;
        }
        Some(coordinates)
    }

    pub fn cache(&self) -> &GeoCache {
        &self.cache
    }

    pub fn stats(&self) -> ResolverStats {
        self.stats
    }
}

/// First non-blank cell among `columns` for `row`, as stored. The cell is
/// not trimmed, so the cache key is the exact text of the row.
fn row_location<'a>(table: &'a Table, row: usize, columns: &[String]) -> Option<&'a str> {
    columns
        .iter()
        .filter_map(|column| table.get(row, column))
        .find(|value| !value.trim().is_empty())
}

/// Append `latitude`/`longitude` to every row of `table`.
///
/// Each row is resolved from the first non-blank cell among
/// `location_columns`. Rows that cannot be resolved get empty cells in
/// both columns. Returns the number of rows that received coordinates.
pub async fn geocode_table<P, C>(
    table: &mut Table,
    resolver: &mut GeocodeResolver<P, C>,
    location_columns: &[String],
    progress: &ProgressBar,
) -> usize
where
    P: PlaceSearch,
    C: LocationClassifier,
{
    let mut latitudes = Vec::with_capacity(table.len());
    let mut longitudes = Vec::with_capacity(table.len());
    let mut resolved = 0;

    for row in 0..table.len() {
        let coordinates = match row_location(table, row, location_columns) {
            Some(location) => resolver.resolve(location).await,
            None => None,
        };

        match coordinates {
            Some(c) => {
                resolved += 1;
                latitudes.push(c.latitude.to_string());
                longitudes.push(c.longitude.to_string());
            }
            None => {
                latitudes.push(String::new());
                longitudes.push(String::new());
            }
        }
        progress.inc(1);
    }

    table.set_column(LATITUDE_COLUMN, latitudes);
    table.set_column(LONGITUDE_COLUMN, longitudes);

    let stats = resolver.stats();
    info!(
        rows = table.len(),
        resolved,
        postcode_hits = stats.postcode_hits,
        postcode_misses = stats.postcode_misses,
        cache_hits = stats.cache_hits,
        online_lookups = stats.online_lookups,
        online_not_found = stats.online_not_found,
        online_failures = stats.online_failures,
        "geocoding finished"
    );
    resolved
}
