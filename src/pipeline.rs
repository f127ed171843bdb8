//! End-to-end pipeline: fetch every pair, merge, geocode, write.

use crate::config::Config;
use crate::error::Result;
use crate::fetcher::{FetchOutcome, JobFetcher, JobSource, ReedClient, StopReason};
use crate::geocode::{
    geocode_table, GeocodeResolver, LocationClassifier, NominatimClient, PlaceSearch,
    PostcodeIndex,
};
use crate::merger::{self, MergeReport};
use indicatif::{ProgressBar, ProgressStyle};
use jobmap_common::{PairKey, Table};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{error, info};

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub pairs: usize,
    pub files_written: Vec<PathBuf>,
    pub failed_pairs: Vec<PairKey>,
    pub merged_rows: usize,
    pub skipped_files: usize,
    pub geocoded_rows: usize,
    pub output: PathBuf,
    pub elapsed: Duration,
}

fn progress_bar(len: usize, label: &str) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    let style = ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len} ({elapsed})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    bar.set_style(style);
    bar.set_message(label.to_string());
    bar
}

/// Fetch every pair in turn. A pair that errors is logged and left out;
/// the remaining pairs still run.
pub async fn fetch_all<S: JobSource>(
    fetcher: &JobFetcher<S>,
    pairs: &[PairKey],
    total_results: usize,
    results_per_page: usize,
) -> Vec<FetchOutcome> {
    let bar = progress_bar(pairs.len(), "fetching");
    let mut outcomes = Vec::with_capacity(pairs.len());

    for pair in pairs {
        bar.set_message(format!("fetching {}", pair));
        match fetcher.fetch(pair, total_results, results_per_page).await {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => error!(%pair, "fetch aborted: {}", e),
        }
        bar.inc(1);
    }

    bar.finish_and_clear();
    outcomes
}

/// Geocode `table` in place with a progress bar.
pub async fn geocode_stage<P, C>(
    table: &mut Table,
    resolver: &mut GeocodeResolver<P, C>,
    location_columns: &[String],
) -> usize
where
    P: PlaceSearch,
    C: LocationClassifier,
{
    let bar = progress_bar(table.len(), "geocoding");
    let resolved = geocode_table(table, resolver, location_columns, &bar).await;
    bar.finish_and_clear();
    resolved
}

/// Geocode an existing consolidated CSV and write the result.
pub async fn geocode_file<P, C>(
    input: &Path,
    output: &Path,
    resolver: &mut GeocodeResolver<P, C>,
    location_columns: &[String],
) -> Result<usize>
where
    P: PlaceSearch,
    C: LocationClassifier,
{
    let mut table = Table::read_csv(input)?;
    let resolved = geocode_stage(&mut table, resolver, location_columns).await;
    table.write_csv(output)?;
    Ok(resolved)
}

/// Build a resolver against the configured place-search service.
pub fn build_resolver(
    config: &Config,
    postcodes: PostcodeIndex,
) -> Result<GeocodeResolver<NominatimClient>> {
    let search = NominatimClient::new(
        config.place_search_url.as_str(),
        config.user_agent.as_str(),
        config.timeout(),
    )?;
    Ok(GeocodeResolver::new(postcodes, search).with_pause(config.geocode_pause()))
}

/// Build a fetcher against the configured job-search API.
pub fn build_fetcher(config: &Config, api_key: &str) -> Result<JobFetcher<ReedClient>> {
    let client = ReedClient::new(api_key, config.job_search_url.as_str(), config.timeout())?;
    Ok(JobFetcher::new(client, config.pairs_dir.clone()).with_page_pause(config.page_pause()))
}

/// Run the pipeline with explicit backends.
pub async fn run_with<S, P, C>(
    config: &Config,
    fetcher: &JobFetcher<S>,
    resolver: &mut GeocodeResolver<P, C>,
) -> Result<RunSummary>
where
    S: JobSource,
    P: PlaceSearch,
    C: LocationClassifier,
{
    let started = Instant::now();
    let pairs = config.pairs()?;
    std::fs::create_dir_all(fetcher.output_dir())?;

    println!("[1/4] Fetching jobs for {} pairs...", pairs.len());
    let outcomes = fetch_all(fetcher, &pairs, config.total_results, config.results_per_page).await;
    let files_written: Vec<PathBuf> = outcomes.iter().filter_map(|o| o.file.clone()).collect();
    let failed_pairs: Vec<PairKey> = outcomes
        .iter()
        .filter(|o| o.stop == StopReason::Failed)
        .map(|o| o.pair.clone())
        .chain(
            pairs
                .iter()
                .filter(|p| !outcomes.iter().any(|o| &o.pair == *p))
                .cloned(),
        )
        .collect();
    println!("✔ {} files written, {} pairs failed\n", files_written.len(), failed_pairs.len());

    println!("[2/4] Merging {}...", fetcher.output_dir().display());
    let MergeReport { mut table, skipped, .. } = merger::merge(fetcher.output_dir())?;
    println!("✔ {} rows merged ({} files skipped)\n", table.len(), skipped.len());

    println!("[3/4] Geocoding {} rows...", table.len());
    let geocoded_rows = geocode_stage(&mut table, resolver, &config.location_columns).await;
    println!("✔ {} rows with coordinates\n", geocoded_rows);

    println!("[4/4] Writing {}...", config.output_file.display());
    table.write_csv(&config.output_file)?;

    let elapsed = started.elapsed();
    info!(elapsed_secs = elapsed.as_secs_f64(), "pipeline finished");
    println!("Time taken: {:.2} seconds", elapsed.as_secs_f64());

    Ok(RunSummary {
        pairs: pairs.len(),
        files_written,
        failed_pairs,
        merged_rows: table.len(),
        skipped_files: skipped.len(),
        geocoded_rows,
        output: config.output_file.clone(),
        elapsed,
    })
}

/// Run the full pipeline against the live services.
///
/// Everything that can make the whole run pointless is checked before the
/// first request: credential, page size, pair names and the postcode file.
pub async fn run(config: &Config) -> Result<RunSummary> {
    run_with_env(config, |name| std::env::var(name).ok()).await
}

/// [`run`] with `env` standing in for the process environment when the
/// credential is resolved.
pub async fn run_with_env(
    config: &Config,
    env: impl Fn(&str) -> Option<String>,
) -> Result<RunSummary> {
    let api_key = config.api_key_from(env)?;
    config.validate_fetch()?;
    let postcodes = PostcodeIndex::load(&config.postcode_file)?;

    let fetcher = build_fetcher(config, &api_key)?;
    let mut resolver = build_resolver(config, postcodes)?;
    run_with(config, &fetcher, &mut resolver).await
}
