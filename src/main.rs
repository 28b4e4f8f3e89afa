use std::env;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use team_engagement::config::{load_config, EngagementConfig};
use team_engagement::contribution::member_issue_contributions;
use team_engagement::index::ActivityIndex;
use team_engagement::recompute::recompute;
use team_engagement::report;
use team_engagement::snapshot::{
    load_snapshot, read_comments_csv, read_pr_activities_csv, save_snapshot, Snapshot,
};

#[derive(Parser)]
#[command(name = "team-engagement")]
#[command(about = "Day-granular, role-aware engagement metrics for a team's issues", long_about = None)]
struct Cli {
    /// Team roster and areas of responsibility (TOML)
    #[arg(long, default_value = "team.toml")]
    config: PathBuf,
    /// Snapshot of issues, comments and PR activity (JSON)
    #[arg(long, default_value = "snapshot.json")]
    snapshot: PathBuf,
    /// Only count activity from the last N days
    #[arg(long)]
    since_days: Option<i64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank team members by active days
    Members {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Rank issues by team effort days
    Issues {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Show who did what on one issue
    Issue {
        #[arg(long)]
        id: String,
    },
    /// Generate a markdown report
    Report {
        #[arg(long, default_value = "engagement.md")]
        out: PathBuf,
    },
    /// Export result tables as CSV
    Export {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Merge comment and PR activity CSV files into the snapshot
    Import {
        #[arg(long)]
        comments: Option<PathBuf>,
        #[arg(long)]
        pr_activities: Option<PathBuf>,
        /// Where to write the merged snapshot (defaults to --snapshot)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the full results as JSON
    Json,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TEAM_ENGAGEMENT_LOG")
        .unwrap_or_else(|_| EnvFilter::new("team_engagement=info,warn"));

    let format = env::var("TEAM_ENGAGEMENT_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn cutoff_date(since_days: i64) -> anyhow::Result<NaiveDate> {
    let window = Duration::try_days(since_days.max(1))
        .with_context(|| format!("--since-days {since_days} is out of range"))?;
    Utc::now()
        .date_naive()
        .checked_sub_signed(window)
        .with_context(|| format!("--since-days {since_days} reaches before the calendar starts"))
}

/// Config and snapshot for the reporting commands, narrowed to the window.
struct Inputs {
    config: EngagementConfig,
    snapshot: Snapshot,
    since: Option<NaiveDate>,
}

fn load_inputs(cli: &Cli) -> anyhow::Result<Inputs> {
    let config = load_config(&cli.config)
        .with_context(|| format!("could not load team config from {}", cli.config.display()))?;
    let snapshot = load_snapshot(&cli.snapshot)?;
    let since = cli.since_days.map(cutoff_date).transpose()?;
    let snapshot = match since {
        Some(cutoff) => snapshot.since(cutoff),
        None => snapshot,
    };
    Ok(Inputs {
        config,
        snapshot,
        since,
    })
}

fn import(
    snapshot_path: &Path,
    comments: Option<&Path>,
    pr_activities: Option<&Path>,
    out: Option<&Path>,
) -> anyhow::Result<()> {
    let mut snapshot = if snapshot_path.exists() {
        load_snapshot(snapshot_path)?
    } else {
        Snapshot::default()
    };
    let mut inserted = 0usize;
    if let Some(path) = comments {
        inserted += snapshot.merge_comments(read_comments_csv(path)?);
    }
    if let Some(path) = pr_activities {
        inserted += snapshot.merge_pr_activities(read_pr_activities_csv(path)?);
    }
    let out = out.unwrap_or(snapshot_path);
    save_snapshot(out, &snapshot)?;
    println!("Inserted {inserted} records into {}.", out.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Members { limit } => {
            let inputs = load_inputs(&cli)?;
            let results = recompute(&inputs.snapshot, &inputs.config);
            if results.members.is_empty() {
                println!("No team activity found for this window.");
                return Ok(());
            }

            println!("Team members by active days:");
            for member in results.members.iter().take(*limit) {
                println!("- {}", report::member_line(member));
            }
        }
        Commands::Issues { limit } => {
            let inputs = load_inputs(&cli)?;
            let results = recompute(&inputs.snapshot, &inputs.config);
            if results.issue_effort.is_empty() {
                println!("No issues with team effort in this window.");
                return Ok(());
            }

            println!("Issues by team effort days:");
            for effort in results.issue_effort.iter().take(*limit) {
                println!("- {}", report::effort_line(effort));
            }
        }
        Commands::Issue { id } => {
            let inputs = load_inputs(&cli)?;
            let index = ActivityIndex::new(&inputs.snapshot, &inputs.config);
            let issue = index
                .issue(id)
                .with_context(|| format!("issue {id} is not in the snapshot"))?;
            let contributions = member_issue_contributions(&index, &inputs.config, id);
            print!("{}", report::build_issue_report(issue, &contributions));
        }
        Commands::Report { out } => {
            let inputs = load_inputs(&cli)?;
            let results = recompute(&inputs.snapshot, &inputs.config);
            let document = report::build_report(&inputs.config, &results, inputs.since);
            std::fs::write(out, document)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export { dir } => {
            let inputs = load_inputs(&cli)?;
            let results = recompute(&inputs.snapshot, &inputs.config);
            std::fs::create_dir_all(dir)?;
            report::write_effort_csv(&dir.join("issue_effort.csv"), &results.issue_effort)?;
            report::write_member_csv(&dir.join("members.csv"), &results.members)?;
            println!("Exported tables to {}.", dir.display());
        }
        Commands::Import {
            comments,
            pr_activities,
            out,
        } => {
            import(
                &cli.snapshot,
                comments.as_deref(),
                pr_activities.as_deref(),
                out.as_deref(),
            )?;
        }
        Commands::Json => {
            let inputs = load_inputs(&cli)?;
            let results = recompute(&inputs.snapshot, &inputs.config);
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
    }

    Ok(())
}
