//! agencydesk command line.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agencydesk::config::load_settings;
use agencydesk::models::{ActingUser, DeletedRecord, RecordSummary, Role};
use agencydesk::repository::migrations;
use agencydesk::{AppContext, EntityType, OpResult};

#[derive(Parser)]
#[command(name = "agencydesk")]
#[command(about = "Recruitment agency records: recycle bin, restore and purge")]
#[command(version)]
struct Cli {
    /// Data directory (overrides the config file)
    #[arg(long, global = true, env = "AGENCYDESK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Print results as a JSON envelope
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory and migrate the database
    Init,
    /// Operator accounts
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// List live records of one type
    List {
        entity: EntityType,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show the recycle bin for one type
    Bin {
        entity: EntityType,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Move a record and its dependents to the recycle bin
    Delete {
        entity: EntityType,
        id: i32,
        /// Username performing the action
        #[arg(long = "as", env = "AGENCYDESK_USER")]
        actor: String,
    },
    /// Bring a record back from the recycle bin
    Restore {
        entity: EntityType,
        id: i32,
        #[arg(long = "as", env = "AGENCYDESK_USER")]
        actor: String,
    },
    /// Permanently remove a record
    Purge {
        entity: EntityType,
        id: i32,
        #[arg(long = "as", env = "AGENCYDESK_USER")]
        actor: String,
    },
    /// Recent lifecycle actions
    Audit {
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Print the effective settings
    Config,
}

#[derive(Subcommand)]
enum UserCommands {
    /// Add an operator
    Add {
        username: String,
        /// staff, admin or super_admin
        #[arg(long, default_value = "staff")]
        role: Role,
    },
    /// List operators
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agencydesk=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut settings = load_settings().await;
    if let Some(dir) = cli.data_dir.clone() {
        settings.documents_dir = dir.join("documents");
        settings.data_dir = dir;
    }

    if let Commands::Config = cli.command {
        print!("{}", toml::to_string_pretty(&settings)?);
        return Ok(());
    }

    let ctx = AppContext::open(settings).await?;

    match cli.command {
        Commands::Init => {
            let version = migrations::current_version(&ctx.settings.database_path())?;
            println!(
                "{} {} (schema v{})",
                style("Database ready:").green().bold(),
                ctx.settings.database_path().display(),
                version
            );
        }
        Commands::User { command } => match command {
            UserCommands::Add { username, role } => {
                let user = ctx
                    .users
                    .create(&username, role)
                    .await
                    .with_context(|| format!("failed to add user {username}"))?;
                emit(cli.json, &OpResult::ok(&user), |u| {
                    println!("{} {} ({})", style("Added").green(), u.username, u.role);
                })?;
            }
            UserCommands::List => {
                let users = ctx.users.get_all().await?;
                emit(cli.json, &OpResult::ok(&users), |users| {
                    for u in users.iter() {
                        println!("{:<20} {}", u.username, style(u.role).cyan());
                    }
                })?;
            }
        },
        Commands::List { entity, limit } => {
            let rows = ctx.records.list_active(entity, limit).await?;
            emit(cli.json, &OpResult::ok(&rows), |rows| print_summaries(rows))?;
        }
        Commands::Bin { entity, limit } => {
            let result: OpResult<Vec<DeletedRecord>> =
                ctx.lifecycle.try_list_deleted(entity, limit).await.into();
            emit(cli.json, &result, |rows| print_deleted(rows))?;
        }
        Commands::Delete { entity, id, actor } => {
            let actor = resolve_actor(&ctx, &actor).await?;
            let result = ctx.lifecycle.soft_delete(entity, id, &actor).await;
            emit(cli.json, &result, |report| {
                println!(
                    "{} {} #{} and {} dependent rows (batch {})",
                    style("Deleted").yellow().bold(),
                    report.entity,
                    report.id,
                    report.dependent_count(),
                    report.batch_id.as_deref().unwrap_or("-")
                );
            })?;
        }
        Commands::Restore { entity, id, actor } => {
            let actor = resolve_actor(&ctx, &actor).await?;
            let result = ctx.lifecycle.restore(entity, id, &actor).await;
            emit(cli.json, &result, |report| {
                println!(
                    "{} {} #{} and {} dependent rows",
                    style("Restored").green().bold(),
                    report.entity,
                    report.id,
                    report.dependent_count()
                );
            })?;
        }
        Commands::Purge { entity, id, actor } => {
            let actor = resolve_actor(&ctx, &actor).await?;
            let result = ctx.lifecycle.purge(entity, id, &actor).await;
            emit(cli.json, &result, |report| {
                println!(
                    "{} {} #{}",
                    style("Purged").red().bold(),
                    report.entity,
                    report.id
                );
                if report.orphaned_dependents > 0 {
                    println!(
                        "  {} {} deleted dependent rows no longer have a parent",
                        style("note:").dim(),
                        report.orphaned_dependents
                    );
                }
            })?;
        }
        Commands::Audit { limit } => {
            let entries = ctx.audit_log.get_recent(limit).await?;
            emit(cli.json, &OpResult::ok(&entries), |entries| {
                for e in entries.iter() {
                    println!(
                        "{}  {:<12} {:<16} #{:<6} {}",
                        style(e.created_at.format("%Y-%m-%d %H:%M:%S")).dim(),
                        e.action,
                        e.target_type,
                        e.target_id,
                        style(&e.username).cyan()
                    );
                }
            })?;
        }
        Commands::Config => {}
    }

    Ok(())
}

/// Look up the acting operator by username.
async fn resolve_actor(ctx: &AppContext, username: &str) -> Result<ActingUser> {
    match ctx.users.get_by_username(username).await? {
        Some(user) => Ok(ActingUser::from(&user)),
        None => bail!("unknown user '{username}' (add one with `agencydesk user add`)"),
    }
}

/// Print a result as JSON or through `render`, failing on an error envelope.
fn emit<T: Serialize>(json: bool, result: &OpResult<T>, render: impl FnOnce(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else if let Some(data) = &result.data {
        render(data);
    }

    if result.success {
        return Ok(());
    }
    bail!(
        "{}: {}",
        result.error.as_deref().unwrap_or("Error"),
        result.message.as_deref().unwrap_or("operation failed")
    )
}

fn print_summaries(rows: &[RecordSummary]) {
    if rows.is_empty() {
        println!("{}", style("No records").dim());
        return;
    }
    for row in rows {
        println!(
            "#{:<6} {:<32} {}",
            row.id,
            row.label.as_deref().unwrap_or("-"),
            style(row.context.as_deref().unwrap_or("")).dim()
        );
    }
}

fn print_deleted(rows: &[DeletedRecord]) {
    if rows.is_empty() {
        println!("{}", style("Recycle bin is empty").dim());
        return;
    }
    for row in rows {
        let deleted_at = row
            .deleted_at
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "#{:<6} {:<32} {:<24} {}",
            row.id,
            row.label.as_deref().unwrap_or("-"),
            style(row.context.as_deref().unwrap_or("")).dim(),
            style(deleted_at).yellow()
        );
    }
}
