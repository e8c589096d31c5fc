//! Search stored job postings from the command line

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use job_finder_core::common::JobPostingId;
use job_finder_core::config::Config;
use job_finder_core::domains::jobs::JobPosting;
use job_finder_core::domains::search::{
    recommend_jobs, recommend_jobs_for_user, search_jobs, SearchFilters, DEFAULT_RECOMMEND_LIMIT,
    DEFAULT_SEARCH_LIMIT,
};
use job_finder_core::domains::users::{
    NewSavedSearch, NewUser, NewUserSkill, SavedSearch, User, UserJobInteraction, UserSkill,
};
use job_finder_core::kernel::{connect, init_logging};
use sqlx::PgPool;

#[derive(Parser)]
#[command(name = "job_search")]
#[command(about = "Search stored job postings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Keyword search over title, description and company
    Search {
        query: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        company: Option<String>,
        /// Required skill (repeatable)
        #[arg(long = "skill")]
        skills: Vec<String>,
        #[arg(long)]
        source: Option<String>,
        /// Only postings from the last N days
        #[arg(long)]
        days: Option<i32>,
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: i64,
        #[arg(long, default_value_t = 0)]
        offset: i64,
    },

    /// Postings matching any of the given skills
    Recommend {
        #[arg(required = true)]
        skills: Vec<String>,
        #[arg(long, default_value_t = DEFAULT_RECOMMEND_LIMIT)]
        limit: i64,
    },

    /// Show one posting as JSON
    Show { id: JobPostingId },

    /// Most common skills
    TopSkills {
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },

    /// Daily posting counts for a skill
    Trend {
        skill: String,
        #[arg(long, default_value_t = 30)]
        days: i32,
    },

    /// Manage user profiles, saved postings and saved searches
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Create a user profile
    Create {
        email: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },

    /// Replace a user's skills
    Skills {
        email: String,
        #[arg(required = true)]
        skills: Vec<String>,
    },

    /// Save a posting for later
    Save { email: String, job_id: JobPostingId },

    /// List saved postings, most recently saved first
    Saved {
        email: String,
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: i64,
    },

    /// Postings matching the user's stored skills
    Recommend {
        email: String,
        #[arg(long, default_value_t = DEFAULT_RECOMMEND_LIMIT)]
        limit: i64,
    },

    /// Store a keyword search under a name
    SaveSearch {
        email: String,
        name: String,
        query: Option<String>,
        #[arg(long = "skill")]
        skills: Vec<String>,
        #[arg(long)]
        location: Option<String>,
    },

    /// Run each of the user's saved searches
    Searches { email: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    let pool = connect(&config).await?;

    match cli.command {
        Commands::Search {
            query,
            location,
            company,
            skills,
            source,
            days,
            limit,
            offset,
        } => {
            let filters = SearchFilters {
                query,
                location,
                company,
                skills,
                source,
                days_old: days,
                limit,
                offset,
            };
            let jobs = search_jobs(&filters, &pool).await?;
            if jobs.is_empty() {
                println!("No jobs found");
            }
            for job in &jobs {
                print_job_line(job);
            }
        }
        Commands::Recommend { skills, limit } => {
            let matches = recommend_jobs(&skills, limit, &pool).await?;
            if matches.is_empty() {
                println!("No matching jobs found");
            }
            for m in &matches {
                print!("[{} matching] ", m.matched_skills);
                print_job_line(&m.job);
            }
        }
        Commands::Show { id } => cmd_show(id, &pool).await?,
        Commands::TopSkills { limit } => {
            let counts = JobPosting::top_skills(limit, &pool).await?;
            for (i, count) in counts.iter().enumerate() {
                println!("{:>3}. {}: {} jobs", i + 1, count.skill, count.job_count);
            }
        }
        Commands::Trend { skill, days } => {
            let trend = JobPosting::skill_trend(&skill, days, &pool).await?;
            println!("{} over the last {} days:", trend.skill, days);
            for point in &trend.daily_counts {
                println!("  {}: {}", point.day, point.job_count);
            }
            let recent: i64 = trend.daily_counts.iter().map(|p| p.job_count).sum();
            println!("In window: {}", recent);
            println!("All time: {}", trend.total_jobs);
        }
        Commands::User { command } => cmd_user(command, &pool).await?,
    }

    Ok(())
}

fn print_job_line(job: &JobPosting) {
    println!(
        "{} at {} - {}",
        job.title,
        job.company,
        job.url.as_deref().unwrap_or("(no url)")
    );
}

async fn cmd_show(id: JobPostingId, pool: &PgPool) -> Result<()> {
    match JobPosting::find_by_id(id, pool).await? {
        Some(job) => println!("{}", serde_json::to_string_pretty(&job)?),
        None => println!("Job {} not found", id),
    }
    Ok(())
}

async fn find_user(email: &str, pool: &PgPool) -> Result<User> {
    User::find_by_email(email, pool)
        .await?
        .with_context(|| format!("No user with email {}", email))
}

async fn cmd_user(command: UserCommands, pool: &PgPool) -> Result<()> {
    match command {
        UserCommands::Create {
            email,
            name,
            location,
        } => {
            let new = NewUser {
                email: Some(email),
                name,
                location,
                ..NewUser::builder().build()
            };
            let user = User::create(new, pool).await?;
            println!("Created user {}", user.id);
        }
        UserCommands::Skills { email, skills } => {
            let user = find_user(&email, pool).await?;
            let skills = skills.iter().map(|s| NewUserSkill::from(s.as_str())).collect();
            let stored = UserSkill::replace_for_user(user.id, skills, pool).await?;
            println!("Stored {} skills", stored.len());
        }
        UserCommands::Save { email, job_id } => {
            let user = find_user(&email, pool).await?;
            if JobPosting::find_by_id(job_id, pool).await?.is_none() {
                println!("Job {} not found", job_id);
                return Ok(());
            }
            UserJobInteraction::save_job(user.id, job_id, pool).await?;
            println!("Saved job {}", job_id);
        }
        UserCommands::Saved { email, limit } => {
            let user = find_user(&email, pool).await?;
            let jobs = UserJobInteraction::saved_jobs(user.id, limit, pool).await?;
            if jobs.is_empty() {
                println!("No saved jobs");
            }
            for job in &jobs {
                print_job_line(job);
            }
        }
        UserCommands::Recommend { email, limit } => {
            let user = find_user(&email, pool).await?;
            let matches = recommend_jobs_for_user(user.id, limit, pool).await?;
            if matches.is_empty() {
                println!("No matching jobs found");
            }
            for m in &matches {
                print!("[{} matching] ", m.matched_skills);
                print_job_line(&m.job);
            }
        }
        UserCommands::SaveSearch {
            email,
            name,
            query,
            skills,
            location,
        } => {
            let user = find_user(&email, pool).await?;
            let filters = SearchFilters {
                query,
                location,
                skills,
                ..SearchFilters::default()
            };
            let search = SavedSearch::create(
                NewSavedSearch::builder()
                    .user_id(user.id)
                    .name(name)
                    .filters(filters)
                    .build(),
                pool,
            )
            .await?;
            println!("Saved search {} ({})", search.id, search.name);
        }
        UserCommands::Searches { email } => {
            let user = find_user(&email, pool).await?;
            for search in SavedSearch::find_for_user(user.id, pool).await? {
                let jobs = search.run(pool).await?;
                println!("{} ({} jobs)", search.name, jobs.len());
                for job in &jobs {
                    print!("  ");
                    print_job_line(job);
                }
            }
        }
    }
    Ok(())
}
