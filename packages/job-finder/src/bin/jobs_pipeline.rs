//! Job ingestion pipeline CLI

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use job_finder_core::config::Config;
use job_finder_core::domains::ingestion::pipeline::{DEFAULT_LOCATION, DEFAULT_QUERY};
use job_finder_core::domains::ingestion::{
    run_incremental_update, run_pipeline, DedupPolicy, PipelineOptions, PipelineReport,
};
use job_finder_core::domains::jobs::{IngestionRun, JobPosting};
use job_finder_core::kernel::{init_logging, run_migrations, PipelineDeps};

#[derive(Parser)]
#[command(name = "jobs_pipeline")]
#[command(about = "Fetch, normalize and store job postings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SearchArgs {
    /// Job search query sent to every source
    #[arg(long, default_value = DEFAULT_QUERY)]
    query: String,

    /// Location filter sent to every source
    #[arg(long, default_value = DEFAULT_LOCATION)]
    location: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one full ingestion cycle
    Run {
        #[command(flatten)]
        search: SearchArgs,

        /// Fetch and normalize without writing postings
        #[arg(long)]
        no_save: bool,

        /// How to deduplicate the fetched batch
        #[arg(long, value_enum, default_value_t = DedupPolicy::Url)]
        dedup: DedupPolicy,
    },

    /// Store only postings whose URL is not yet known
    Incremental {
        #[command(flatten)]
        search: SearchArgs,
    },

    /// Show ingestion statistics
    Stats {
        /// Look back this many days
        #[arg(long, default_value_t = 7)]
        days: i32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    let deps = PipelineDeps::from_config(&config).await?;
    run_migrations(&deps.db_pool).await?;

    match cli.command {
        Commands::Run {
            search,
            no_save,
            dedup,
        } => {
            let options = PipelineOptions::builder()
                .query(search.query)
                .location(search.location)
                .save(!no_save)
                .dedup(dedup)
                .build();
            let report = run_pipeline(&deps, &options).await?;
            print_report(&report);
        }
        Commands::Incremental { search } => {
            let options = PipelineOptions::builder()
                .query(search.query)
                .location(search.location)
                .build();
            let report = run_incremental_update(&deps, &options).await?;
            print_report(&report);
        }
        Commands::Stats { days } => cmd_stats(&deps, days).await?,
    }

    Ok(())
}

fn print_report(report: &PipelineReport) {
    println!("Pipeline Summary:");
    println!("  Total raw jobs fetched: {}", report.fetched);
    println!("  Rejected (missing title/company): {}", report.rejected);
    println!("  Duplicates dropped: {}", report.duplicates);
    if report.already_stored > 0 {
        println!("  Already stored: {}", report.already_stored);
    }
    println!("  Unique jobs: {}", report.postings.len());
    println!("  Jobs with skills: {}", report.postings_with_skills());
    println!("  Jobs inserted to DB: {}", report.inserted);
    println!("  Insert failures: {}", report.failed);
    println!("  Pipeline duration: {:.2} seconds", report.duration_seconds);

    println!("  Source Statistics:");
    for source in &report.sources {
        print!(
            "    {}: {} ({} fetched, {} inserted, {:.2}s)",
            source.source, source.status, source.fetched, source.inserted, source.duration_seconds
        );
        match &source.error {
            Some(error) => println!(" - {}", error),
            None => println!(),
        }
    }
}

async fn cmd_stats(deps: &PipelineDeps, days: i32) -> Result<()> {
    let stats = IngestionRun::stats_since(days, &deps.db_pool)
        .await
        .context("Failed to load ingestion statistics")?;

    println!("Ingestion Statistics (Last {} Days)", days);
    println!("Total runs: {}", stats.total_runs);
    println!("Successful: {}", stats.successful_runs);
    println!("Failed: {}", stats.failed_runs);
    println!("Jobs fetched: {}", stats.total_jobs_fetched);
    println!("Jobs inserted: {}", stats.total_jobs_inserted);

    if !stats.by_source.is_empty() {
        println!("\nBy Source:");
        for (source, source_stats) in &stats.by_source {
            println!("  {}:", source);
            println!("    Runs: {}", source_stats.runs);
            println!("    Fetched: {}", source_stats.jobs_fetched);
            println!("    Inserted: {}", source_stats.jobs_inserted);
        }
    }

    let total = JobPosting::count(&deps.db_pool).await?;
    println!("\nJobs in database: {}", total);

    let top = JobPosting::top_skills(10, &deps.db_pool).await?;
    if !top.is_empty() {
        println!("\nTop 10 Skills in Database:");
        for (i, skill) in top.iter().enumerate() {
            println!("  {}. {}: {} jobs", i + 1, skill.skill, skill.job_count);
        }
    }

    Ok(())
}
