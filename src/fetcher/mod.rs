//! Paginated job fetching
//!
//! One `fetch` call pages through the job-search API for a single
//! (job title, region) pair and writes whatever it collected to
//! `"{job_title}__{region}.csv"` in the output directory.

mod reed;

pub use reed::ReedClient;

use crate::error::{JobMapError, Result};
use jobmap_common::{JobRecord, PairKey, Table};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Query for one page of search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery<'a> {
    pub keywords: &'a str,
    pub location: &'a str,
    pub take: usize,
    pub skip: usize,
}

/// A backend that serves pages of job listings.
#[allow(async_fn_in_trait)]
pub trait JobSource {
    /// Fetch one page. An empty vector means the corpus is exhausted.
    async fn fetch_page(&self, query: &PageQuery<'_>) -> Result<Vec<JobRecord>>;
}

impl<T: JobSource + ?Sized> JobSource for &T {
    async fn fetch_page(&self, query: &PageQuery<'_>) -> Result<Vec<JobRecord>> {
        (**self).fetch_page(query).await
    }
}

/// Why the pagination loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A page came back empty.
    Exhausted,
    /// The offset reached `total_results`.
    LimitReached,
    /// A request failed; the pair was abandoned.
    Failed,
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub pair: PairKey,
    pub requests: usize,
    pub records: usize,
    /// Written file, `None` when nothing was retrieved.
    pub file: Option<PathBuf>,
    pub stop: StopReason,
}

pub struct JobFetcher<S> {
    source: S,
    output_dir: PathBuf,
    page_pause: Duration,
}

impl<S: JobSource> JobFetcher<S> {
    pub fn new(source: S, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            output_dir: output_dir.into(),
            page_pause: Duration::from_millis(250),
        }
    }

    /// Pause after each successful page.
    pub fn with_page_pause(mut self, pause: Duration) -> Self {
        self.page_pause = pause;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Page through the API for `pair` and persist the collected records.
    ///
    /// Request failures end the loop for this pair and are reported through
    /// `FetchOutcome::stop`; whatever was collected before the failure is
    /// still written. Only an invalid page size or a failed file write
    /// return `Err`.
    pub async fn fetch(
        &self,
        pair: &PairKey,
        total_results: usize,
        results_per_page: usize,
    ) -> Result<FetchOutcome> {
        if results_per_page == 0 {
            return Err(JobMapError::Config("results_per_page must be greater than 0".into()));
        }

        let mut records: Vec<JobRecord> = Vec::new();
        let mut requests = 0;
        let mut stop = StopReason::LimitReached;
        let mut skip = 0;

        while skip < total_results {
            let query = PageQuery {
                keywords: &pair.job_title,
                location: &pair.region,
                take: results_per_page,
                skip,
            };
            requests += 1;

            match self.source.fetch_page(&query).await {
                Ok(page) if page.is_empty() => {
                    debug!(%pair, skip, "empty page, no more results");
                    stop = StopReason::Exhausted;
                    break;
                }
                Ok(page) => {
                    records.extend(page);
                    info!(%pair, total = records.len(), "retrieved page at offset {}", skip);
                    if !self.page_pause.is_zero() {
                        tokio::time::sleep(self.page_pause).await;
                    }
                }
                Err(e) => {
                    error!(%pair, skip, "page request failed: {}", e);
                    stop = StopReason::Failed;
                    break;
                }
            }

            skip += results_per_page;
        }

        let file = if records.is_empty() {
            warn!(%pair, "no jobs found");
            None
        } else {
            let path = self.output_dir.join(pair.file_name());
            Table::from_records(&records).write_csv(&path)?;
            info!(%pair, jobs = records.len(), "saved {}", path.display());
            Some(path)
        };

        Ok(FetchOutcome {
            pair: pair.clone(),
            requests,
            records: records.len(),
            file,
            stop,
        })
    }
}
