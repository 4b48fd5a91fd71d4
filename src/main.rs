use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use player_registry::calculate::{aggregate, filter_scope, find_profile, rank_profiles, RankBy};
use player_registry::config::AppConfig;
use player_registry::ingest::{import_batch, parse_sheet, ImportContext, SourceKind};
use player_registry::models::{NormalizedRow, Stage, Tournament};
use player_registry::reconcile::reconcile;
use player_registry::storage::{RegistryStore, StorageConfig};

#[derive(Parser)]
#[command(name = "player-registry")]
#[command(about = "Competitive-match player stat registry")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides config)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error; overrides config)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import stat sheets (CSV or workbook) into the registry
    Import {
        /// Files or glob patterns
        #[arg(required = true)]
        files: Vec<String>,

        /// Tournament the sheets belong to
        #[arg(long, default_value = "")]
        tournament: String,

        /// Stage id, or "all" for whole-event stats
        #[arg(long, default_value = "")]
        stage: String,

        /// Parse and normalize but don't store
        #[arg(long)]
        dry_run: bool,
    },

    /// Show ranked player profiles
    Leaderboard {
        /// Only records from this tournament
        #[arg(long)]
        tournament: Option<String>,

        /// Only records from this stage (requires --tournament)
        #[arg(long, requires = "tournament")]
        stage: Option<String>,

        /// Number of rows to show
        #[arg(long)]
        limit: Option<usize>,

        /// avg_rating, avg_adr, avg_kd or record_count
        #[arg(long)]
        rank_by: Option<RankBy>,
    },

    /// Show one player's aggregated profile as JSON
    Profile {
        /// Identity key or player name
        query: String,
    },

    /// Repair identity fields across the registry
    Reconcile {
        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Manage the tournament catalog
    Tournament {
        #[command(subcommand)]
        action: TournamentAction,
    },
}

#[derive(Subcommand)]
enum TournamentAction {
    /// Add or update a tournament
    Add {
        #[arg(long)]
        id: String,

        #[arg(long)]
        name: String,

        /// e.g. "2024/1/1-2024/2/1"
        #[arg(long, default_value = "")]
        date_range: String,

        /// Stage as "id:name" (repeatable)
        #[arg(long = "stage")]
        stages: Vec<String>,
    },

    /// List tournaments
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;
    let log_level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    info!("Starting player-registry v{}", env!("CARGO_PKG_VERSION"));

    let data_dir = cli.data_dir.clone().unwrap_or_else(|| config.data_dir.clone());
    let store = RegistryStore::new(StorageConfig::new(data_dir));

    match cli.command {
        Commands::Import {
            files,
            tournament,
            stage,
            dry_run,
        } => {
            // Context is checked before any file is read.
            let ctx = ImportContext::new(&tournament, &stage)?;
            if config.import.require_known_tournament {
                ctx.validate_against(&store.tournaments()?)?;
            }

            let paths = expand_paths(&files)?;
            if paths.is_empty() {
                bail!("No files matched {:?}", files);
            }

            // Parse everything first so one bad sheet aborts the whole run.
            let mut parsed: Vec<(PathBuf, Vec<NormalizedRow>)> = Vec::new();
            for path in paths {
                let kind = SourceKind::from_path(&path).with_context(|| {
                    format!("Unsupported file type: {}", path.display())
                })?;
                let bytes = std::fs::read(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                let rows = parse_sheet(&bytes, kind)
                    .with_context(|| format!("Failed to parse {}", path.display()))?;
                info!("{}: {} player rows ({})", path.display(), rows.len(), kind);
                parsed.push((path, rows));
            }

            for (path, rows) in parsed {
                let records = import_batch(rows, &ctx.tournament_id, ctx.stage_id())?;

                if dry_run {
                    println!("{} (dry run, {} records):", path.display(), records.len());
                    for r in &records {
                        println!(
                            "  {:<24} {:<16} rating {} kd {} hs {} adr {}",
                            r.name, r.team, r.rating, r.kd, r.hs, r.adr
                        );
                    }
                    continue;
                }

                let report = store.import(&ctx, records)?;
                println!(
                    "{}: imported {} records ({} replaced), registry now {} [batch {}]",
                    path.display(),
                    report.imported,
                    report.replaced,
                    report.registry_size,
                    report.batch_id
                );
            }
        }
        Commands::Leaderboard {
            tournament,
            stage,
            limit,
            rank_by,
        } => {
            let mut records = store.snapshot()?;
            if let Some(ref tournament_id) = tournament {
                records = filter_scope(&records, tournament_id, stage.as_deref());
            }

            let tournaments = store.tournaments()?;
            let rank_by = rank_by.unwrap_or(config.leaderboard.rank_by);
            let limit = limit.unwrap_or(config.leaderboard.limit);
            let ranked = rank_profiles(aggregate(&records, &tournaments), rank_by);

            println!(
                "\n=== Leaderboard by {} ({} players) ===\n",
                rank_by,
                ranked.len()
            );
            println!(
                "{:>4}  {:<24} {:<20} {:>7} {:>6} {:>6} {:>5}",
                "#", "Player", "Team", "Rating", "ADR", "K/D", "Recs"
            );
            for entry in ranked.iter().take(limit) {
                let p = &entry.profile;
                println!(
                    "{:>4}  {:<24} {:<20} {:>7} {:>6} {:>6} {:>5}",
                    entry.rank, p.name, p.team, p.avg_rating, p.avg_adr, p.avg_kd, p.record_count
                );
            }
        }
        Commands::Profile { query } => {
            let profiles = aggregate(&store.snapshot()?, &store.tournaments()?);
            match find_profile(&profiles, &query) {
                Some(profile) => println!("{}", serde_json::to_string_pretty(profile)?),
                None => {
                    warn!("No profile matches '{}'", query);
                    println!("No profile found for '{}'", query);
                }
            }
        }
        Commands::Reconcile { dry_run } => {
            let outcome = reconcile(store.snapshot()?);
            println!("{}", serde_json::to_string_pretty(&outcome.report)?);

            if outcome.report.is_noop() {
                println!("Registry already reconciled; nothing to write.");
            } else if dry_run {
                println!("Dry run: {} records would change.", outcome.report.changed);
            } else {
                let written = store.replace(&outcome.records)?;
                println!(
                    "Wrote {} records ({} changed).",
                    written, outcome.report.changed
                );
            }
        }
        Commands::Tournament { action } => match action {
            TournamentAction::Add {
                id,
                name,
                date_range,
                stages,
            } => {
                let mut tournament = Tournament::new(id, name, date_range);
                for stage in &stages {
                    tournament = tournament.with_stage(parse_stage(stage)?);
                }

                let summary = tournament_summary(&tournament);
                store
                    .upsert_tournament(tournament)
                    .context("Failed to save tournament")?;
                println!("Saved tournament {}", summary);
            }
            TournamentAction::List => {
                let catalog = store.tournaments()?;
                println!("\n=== Tournaments ({}) ===\n", catalog.len());
                for t in &catalog {
                    let stages: Vec<&str> = t.stages.iter().map(|s| s.id.as_str()).collect();
                    println!(
                        "  {:<16} {:<32} {:<24} [{}]",
                        t.id,
                        t.name,
                        t.date_range,
                        stages.join(", ")
                    );
                }
            }
        },
    }

    Ok(())
}

/// Expand file arguments, treating any argument with glob characters as a pattern.
fn expand_paths(args: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for arg in args {
        if arg.contains(['*', '?', '[']) {
            for entry in glob::glob(arg).with_context(|| format!("Invalid pattern: {}", arg))? {
                paths.push(entry?);
            }
        } else {
            paths.push(PathBuf::from(arg));
        }
    }
    paths.sort();
    paths.dedup();
    Ok(paths)
}

/// Parse a `--stage id:name` argument; a bare id doubles as the name.
fn parse_stage(arg: &str) -> Result<Stage> {
    let (id, name) = arg.split_once(':').unwrap_or((arg, arg));
    let id = id.trim();
    if id.is_empty() {
        bail!("Invalid stage '{}': expected id:name", arg);
    }
    let name = if name.trim().is_empty() { id } else { name.trim() };
    Ok(Stage::new(id, name))
}

/// One-line description of a tournament for CLI output.
fn tournament_summary(tournament: &Tournament) -> String {
    let end = tournament
        .end_date()
        .map(|d| d.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    format!(
        "{} ({}), ends {}, {} stages",
        tournament.id,
        tournament.name,
        end,
        tournament.stages.len()
    )
}
