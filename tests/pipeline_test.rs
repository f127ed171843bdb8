//! End-to-end pipeline with in-process backends

use jobmap_common::{Coordinates, JobRecord, PairKey, Table};
use jobmap_rust::config::Config;
use jobmap_rust::error::{JobMapError, Result};
use jobmap_rust::fetcher::{JobFetcher, JobSource, PageQuery};
use jobmap_rust::geocode::{GeocodeResolver, PlaceCandidate, PlaceSearch, PostcodeIndex};
use jobmap_rust::pipeline;
use serde_json::json;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::tempdir;

/// Listings per pair; `GIS / Wales` is rejected by the "server".
struct FakeReed;

impl FakeReed {
    fn listings(keywords: &str, location: &str) -> Vec<JobRecord> {
        let places: Vec<&str> = match (keywords, location) {
            ("GIS", "England") => vec!["HG1 5HH", "HG1 5HH", "HG1 5HH", "Leeds", "Leeds"],
            ("data analyst", "Wales") => vec!["Cardiff", "Cardiff"],
            _ => Vec::new(),
        };
        places
            .into_iter()
            .enumerate()
            .map(|(i, place)| {
                json!({"jobId": i, "jobTitle": keywords, "locationName": place})
                    .as_object()
                    .cloned()
                    .unwrap()
            })
            .collect()
    }
}

impl JobSource for FakeReed {
    async fn fetch_page(&self, query: &PageQuery<'_>) -> Result<Vec<JobRecord>> {
        if query.keywords == "GIS" && query.location == "Wales" {
            return Err(JobMapError::Rejected {
                status: 400,
                body: "bad request".into(),
            });
        }
        Ok(Self::listings(query.keywords, query.location)
            .into_iter()
            .skip(query.skip)
            .take(query.take)
            .collect())
    }
}

struct FakePlaces {
    calls: Mutex<Vec<String>>,
}

impl PlaceSearch for FakePlaces {
    async fn search(&self, query: &str) -> Result<Vec<PlaceCandidate>> {
        self.calls.lock().unwrap().push(query.to_string());
        let hit = |lat: &str, lon: &str| PlaceCandidate {
            lat: lat.into(),
            lon: lon.into(),
            display_name: Some(query.to_string()),
        };
        Ok(match query {
            "Leeds" => vec![hit("53.7974185", "-1.5437941")],
            "Cardiff" => vec![hit("51.4816546", "-3.1791934")],
            _ => Vec::new(),
        })
    }
}

fn test_config(root: &std::path::Path) -> Config {
    Config {
        job_titles: vec!["GIS".into(), "data analyst".into()],
        regions: vec!["England".into(), "Wales".into()],
        total_results: 100,
        results_per_page: 2,
        page_pause_ms: 0,
        geocode_pause_ms: 0,
        pairs_dir: root.join("pairs"),
        output_file: root.join("out").join("jobs_geocoded.csv"),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_full_run() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = test_config(dir.path());

    // leftover from an earlier run; must be skipped, not fatal
    std::fs::create_dir_all(&config.pairs_dir).unwrap();
    std::fs::write(config.pairs_dir.join("notes.csv"), "a\n1\n").unwrap();

    let fetcher = JobFetcher::new(FakeReed, config.pairs_dir.clone()).with_page_pause(Duration::ZERO);
    let places = FakePlaces {
        calls: Mutex::new(Vec::new()),
    };
    let postcodes: PostcodeIndex = [("HG15HH".to_string(), Coordinates::new(53.998115, -1.536476))]
        .into_iter()
        .collect();
    let mut resolver = GeocodeResolver::new(postcodes, &places).with_pause(Duration::ZERO);

    let summary = pipeline::run_with(&config, &fetcher, &mut resolver).await.unwrap();

    assert_eq!(summary.pairs, 4);
    assert_eq!(summary.files_written.len(), 2);
    assert_eq!(summary.failed_pairs, vec![PairKey::new("GIS", "Wales").unwrap()]);
    assert_eq!(summary.merged_rows, 7);
    assert_eq!(summary.skipped_files, 1);
    assert_eq!(summary.geocoded_rows, 7);

    // each place name looked up once
    assert_eq!(*places.calls.lock().unwrap(), vec!["Leeds".to_string(), "Cardiff".to_string()]);

    let output = Table::read_csv(&config.output_file).unwrap();
    assert_eq!(output.len(), 7);
    for column in ["job_position", "location", "latitude", "longitude", "locationName"] {
        assert!(output.column_index(column).is_some(), "missing {}", column);
    }
    // sorted merge order: "GIS__England.csv" before "data analyst__Wales.csv"
    assert_eq!(output.get(0, "job_position"), Some("GIS"));
    assert_eq!(output.get(0, "latitude"), Some("53.998115"));
    assert_eq!(output.get(3, "longitude"), Some("-1.5437941"));
    assert_eq!(output.get(6, "location"), Some("Wales"));
    assert_eq!(output.get(6, "latitude"), Some("51.4816546"));
}

#[tokio::test]
async fn test_run_without_results_writes_empty_output() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut config = test_config(dir.path());
    config.job_titles = vec!["astronaut".into()];

    let fetcher = JobFetcher::new(FakeReed, config.pairs_dir.clone()).with_page_pause(Duration::ZERO);
    let places = FakePlaces {
        calls: Mutex::new(Vec::new()),
    };
    let mut resolver = GeocodeResolver::new(PostcodeIndex::default(), &places);

    let summary = pipeline::run_with(&config, &fetcher, &mut resolver).await.unwrap();

    assert!(summary.files_written.is_empty());
    assert_eq!(summary.merged_rows, 0);
    assert!(config.output_file.exists());
}

#[tokio::test]
async fn test_missing_api_key_fails_before_fetching() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut config = test_config(dir.path());
    config.api_key = None;

    let result = pipeline::run_with_env(&config, |_| None).await;

    assert!(matches!(result, Err(JobMapError::MissingApiKey)));
    assert!(!config.pairs_dir.exists());
}

#[tokio::test]
async fn test_blank_env_key_does_not_count() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut config = test_config(dir.path());
    config.api_key = None;

    let result = pipeline::run_with_env(&config, |name| {
        (name == "REED_API_KEY").then(|| "   ".to_string())
    })
    .await;

    assert!(matches!(result, Err(JobMapError::MissingApiKey)));
    assert!(!config.pairs_dir.exists());
}
