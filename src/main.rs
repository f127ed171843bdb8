use anyhow::Context;
use clap::Parser;
use jobmap_rust::{cli, config, fetcher, geocode, logging, merger, pipeline};
use cli::{Cli, Commands};
use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    // a `.env` in the working directory or a parent may carry API_KEY
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("ignoring .env: {}", e),
    }

    // `config --init` may target a file that does not exist yet
    let mut config = match (&cli.command, cli.config.as_deref()) {
        (Commands::Config { .. }, Some(path)) if !path.exists() => Config::default(),
        (_, path) => Config::load(path).context("loading configuration")?,
    };

    match cli.command {
        Commands::Run { output, total_results } => {
            println!("jobmap - full pipeline\n");
            if let Some(output) = output {
                config.output_file = output;
            }
            if let Some(total) = total_results {
                config.total_results = total;
            }

            let summary = pipeline::run(&config).await?;
            println!(
                "\n✅ {} rows ({} geocoded) saved to {}",
                summary.merged_rows,
                summary.geocoded_rows,
                summary.output.display()
            );
        }

        Commands::Fetch { dir, total_results, results_per_page } => {
            println!("jobmap - fetch\n");
            if let Some(dir) = dir {
                config.pairs_dir = dir;
            }
            if let Some(total) = total_results {
                config.total_results = total;
            }
            if let Some(per_page) = results_per_page {
                config.results_per_page = per_page;
            }

            let api_key = config.api_key()?;
            config.validate_fetch()?;
            std::fs::create_dir_all(&config.pairs_dir)
                .with_context(|| format!("creating {}", config.pairs_dir.display()))?;

            let job_fetcher = pipeline::build_fetcher(&config, &api_key)?;
            let pairs = config.pairs()?;
            let outcomes =
                pipeline::fetch_all(&job_fetcher, &pairs, config.total_results, config.results_per_page)
                    .await;

            for outcome in &outcomes {
                let status = match outcome.stop {
                    fetcher::StopReason::Failed => "failed",
                    _ => "ok",
                };
                println!(
                    "  {:<40} {:>6} jobs  {:>3} requests  {}",
                    outcome.pair.to_string(),
                    outcome.records,
                    outcome.requests,
                    status
                );
            }
            println!("\n✅ Fetch finished");
        }

        Commands::Merge { dir, output } => {
            println!("jobmap - merge\n");
            let dir = dir.unwrap_or_else(|| config.pairs_dir.clone());
            let report = merger::merge(&dir)?;

            for skipped in &report.skipped {
                println!("  skipped {} ({:?})", skipped.path.display(), skipped.reason);
            }
            report.table.write_csv(&output)?;
            println!(
                "✔ {} rows from {} files saved to {}",
                report.table.len(),
                report.accepted.len(),
                output.display()
            );
        }

        Commands::Geocode { input, output, postcodes } => {
            println!("jobmap - geocode\n");
            if !input.exists() {
                anyhow::bail!("input file not found: {}", input.display());
            }
            if let Some(postcodes) = postcodes {
                config.postcode_file = postcodes;
            }

            let index = geocode::PostcodeIndex::load(&config.postcode_file)?;
            let mut resolver = pipeline::build_resolver(&config, index)?;
            let output = output.unwrap_or_else(|| input.clone());

            let resolved =
                pipeline::geocode_file(&input, &output, &mut resolver, &config.location_columns)
                    .await?;
            println!("✔ {} rows with coordinates saved to {}", resolved, output.display());
        }

        Commands::Config { set_api_key, init, show } => {
            if let Some(key) = set_api_key {
                config.api_key = Some(key);
                let path = config.save(cli.config.as_deref())?;
                println!("✔ API key saved to {}", path.display());
            } else if init {
                let path = config.save(cli.config.as_deref())?;
                println!("✔ Config written to {}", path.display());
            }

            if show || !init {
                println!("Settings:");
                println!("  job titles:       {}", config.job_titles.join(", "));
                println!("  regions:          {}", config.regions.join(", "));
                println!("  total results:    {}", config.total_results);
                println!("  results per page: {}", config.results_per_page);
                println!("  postcode file:    {}", config.postcode_file.display());
                println!("  pairs dir:        {}", config.pairs_dir.display());
                println!("  output file:      {}", config.output_file.display());
                println!(
                    "  API key:          {}",
                    if config.api_key().is_ok() { "set" } else { "not set" }
                );
            }
        }
    }

    Ok(())
}
