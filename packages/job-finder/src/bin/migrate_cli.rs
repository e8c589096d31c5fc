//! CLI for schema migrations and data backfills

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use job_finder_core::config::Config;
use job_finder_core::domains::ingestion::backfill_skills;
use job_finder_core::kernel::{connect, init_logging, run_migrations, verify_jobs_schema};

#[derive(Parser)]
#[command(name = "migrate_cli")]
#[command(about = "Schema migration and data backfill CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Apply,

    /// Check that the jobs table has the expected layout
    Verify,

    /// Extract skills for stored postings that have none
    BackfillSkills {
        #[arg(long, default_value_t = 100)]
        batch_size: i64,
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    let pool = connect(&config).await?;

    match cli.command {
        Commands::Apply => {
            run_migrations(&pool).await?;
            println!("Migrations applied");
        }
        Commands::Verify => {
            let problems = verify_jobs_schema(&pool).await?;
            if problems.is_empty() {
                println!("jobs table layout OK");
            } else {
                for problem in &problems {
                    eprintln!("  {}", problem);
                }
                anyhow::bail!("jobs table layout has {} problem(s)", problems.len());
            }
        }
        Commands::BackfillSkills {
            batch_size,
            dry_run,
        } => {
            let report = backfill_skills(&pool, batch_size, dry_run).await?;
            println!("Postings without skills: {}", report.candidates);
            if dry_run {
                println!("Would update: {}", report.updated);
            } else {
                println!("Updated: {}", report.updated);
            }
            println!("No skills found: {}", report.unchanged);
        }
    }

    Ok(())
}
