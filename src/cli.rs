use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "jobmap")]
#[command(about = "Fetch job listings per title and region, merge them and geocode every row", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: ~/.config/jobmap/config.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch, merge and geocode in one go
    Run {
        /// Final geocoded CSV (default from config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Upper bound on results per pair
        #[arg(long)]
        total_results: Option<usize>,
    },

    /// Fetch every job title × region pair into per-pair CSV files
    Fetch {
        /// Directory for per-pair files (default from config)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Upper bound on results per pair
        #[arg(long)]
        total_results: Option<usize>,

        /// Page size
        #[arg(long)]
        results_per_page: Option<usize>,
    },

    /// Merge per-pair CSV files into one table
    Merge {
        /// Directory containing "<job title>__<region>.csv" files
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Merged CSV
        #[arg(short, long, default_value = "merged.csv")]
        output: PathBuf,
    },

    /// Add latitude/longitude to an existing merged CSV
    Geocode {
        /// Merged CSV
        #[arg(required = true)]
        input: PathBuf,

        /// Output CSV (default: overwrite input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Postcode reference CSV (default from config)
        #[arg(long)]
        postcodes: Option<PathBuf>,
    },

    /// Show or edit the configuration
    Config {
        /// Store the job-search API key in the config file
        #[arg(long)]
        set_api_key: Option<String>,

        /// Write the current settings (defaults if no file) to the config file
        #[arg(long)]
        init: bool,

        /// Print the settings
        #[arg(long)]
        show: bool,
    },
}
