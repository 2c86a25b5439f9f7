//! # hbd CLI
//!
//! Keeps a list of birthdays, refreshes everyone's age and emails a
//! reminder on the day.
//!
//! Usage:
//!   hbd add "Ada" 1990-03-15          # Track a birthday
//!   hbd list                          # Show all birthdays
//!   hbd edit 3 --date 1990-03-16      # Fix a record
//!   hbd delete 3                      # Stop tracking
//!   hbd check                         # Run today's scan now
//!   hbd run                           # Scan every day at the configured hour
//!   hbd log                           # Recent reminders

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hbd_channels::SmtpMailer;
use hbd_core::traits::{Clock, RecordStore, SystemClock};
use hbd_core::types::NewBirthday;
use hbd_core::{HbdConfig, HbdError};
use hbd_scheduler::{DailySchedule, DailyScanJob, Notifier, OutcomeStatus, ScanReport, StepResult};
use hbd_store::SqliteStore;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "hbd",
    version,
    about = "🎂 hbd — daily birthday reminders by email"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (default: ~/.hbd/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List all birthdays, newest first
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Add a birthday
    Add {
        name: String,
        /// Birthdate, YYYY-MM-DD
        date: String,
    },

    /// Edit a birthday; omitted fields keep their value
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        /// Birthdate, YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
    },

    /// Delete a birthday (its notification log stays)
    Delete { id: i64 },

    /// Show recent notification log entries
    Log {
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
        /// Print JSON instead of lines
        #[arg(long)]
        json: bool,
    },

    /// Run today's birthday scan once, now
    Check {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the daily scheduler in the foreground
    Run,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "hbd=debug,hbd_core=debug,hbd_store=debug,hbd_channels=debug,hbd_scheduler=debug"
    } else {
        "hbd=info,hbd_core=info,hbd_store=info,hbd_channels=info,hbd_scheduler=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<HbdConfig> {
    let config = match path {
        Some(p) => HbdConfig::load_from(p)?,
        None => HbdConfig::load()?,
    }
    .with_env_overrides();
    config.validate()?;
    Ok(config)
}

/// Job wired to SMTP and the system clock.
fn build_job(config: &HbdConfig) -> Result<DailyScanJob> {
    let mailer = SmtpMailer::new(&config.mail).context("Mail is not configured")?;
    let notifier = Notifier::new(config.mail.recipient.clone(), Arc::new(mailer));
    Ok(DailyScanJob::new(notifier, Arc::new(SystemClock)))
}

fn age_today(birthday: &NewBirthday) -> Result<u32> {
    Ok(hbd_scheduler::age_on(birthday.birthdate()?, SystemClock.today()))
}

fn step_label(step: &StepResult) -> String {
    match step {
        StepResult::Done => "ok".into(),
        StepResult::Skipped => "skipped".into(),
        StepResult::Failed(e) => format!("failed ({e})"),
    }
}

fn print_report(report: &ScanReport) {
    println!("🎉 {report}");
    for o in &report.outcomes {
        let icon = match o.status() {
            OutcomeStatus::Success => "✅",
            OutcomeStatus::PartialFailure => "⚠️ ",
            OutcomeStatus::Failure => "❌",
        };
        let age = o.age.map(|a| a.to_string()).unwrap_or_else(|| "?".into());
        println!(
            "   {icon} #{} {} (turns {age}) age: {}, email: {}, log: {}",
            o.birthday_id,
            o.name,
            step_label(&o.age_update),
            step_label(&o.delivery),
            step_label(&o.log_write),
        );
        if let StepResult::Failed(e) = &o.age_calc {
            println!("      date error: {e}");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    let db_path = config.database_file();

    match cli.command {
        Commands::List { json } => {
            let store = SqliteStore::open(&db_path)?;
            let birthdays = store.list_all()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&birthdays)?);
            } else if birthdays.is_empty() {
                println!("No birthdays yet. Add one with: hbd add <name> <YYYY-MM-DD>");
            } else {
                println!("{:>5}  {:<24} {:<10}  {:>3}", "ID", "NAME", "DATE", "AGE");
                for b in &birthdays {
                    println!("{:>5}  {:<24} {:<10}  {:>3}", b.id, b.name, b.date, b.age);
                }
            }
        }

        Commands::Add { name, date } => {
            let birthday = NewBirthday::parse(&name, &date)?;
            let age = age_today(&birthday)?;
            let store = SqliteStore::open(&db_path)?;
            let id = store.add(&birthday, age)?;
            println!("✅ Added #{id}: {} ({}, age {age})", birthday.name, birthday.date);
        }

        Commands::Edit { id, name, date } => {
            let store = SqliteStore::open(&db_path)?;
            let current = store.get(id)?.ok_or(HbdError::NotFound(id))?;
            let birthday = NewBirthday::parse(
                name.as_deref().unwrap_or(&current.name),
                date.as_deref().unwrap_or(&current.date),
            )?;
            let age = age_today(&birthday)?;
            store.update(id, &birthday, age)?;
            println!("✅ Updated #{id}: {} ({}, age {age})", birthday.name, birthday.date);
        }

        Commands::Delete { id } => {
            let store = SqliteStore::open(&db_path)?;
            store.delete(id)?;
            println!("🗑️  Deleted #{id}");
        }

        Commands::Log { limit, json } => {
            let store = SqliteStore::open(&db_path)?;
            let entries = store.list_notifications(limit)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("No notifications sent yet.");
            } else {
                for e in &entries {
                    println!(
                        "{}  #{:<5} {}",
                        e.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
                        e.birthday_id,
                        e.message
                    );
                }
            }
        }

        Commands::Check { json } => {
            let job = build_job(&config)?;
            let store = SqliteStore::open(&db_path)?;
            let report = job.run(&store).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }

        Commands::Run => {
            let schedule = DailySchedule::from_config(&config.schedule)?;
            let job = Arc::new(build_job(&config)?);

            println!("🎂 hbd v{}", env!("CARGO_PKG_VERSION"));
            println!("   🗄️  Database:  {}", db_path.display());
            println!("   📧 Recipient: {}", config.mail.recipient);
            println!("   ⏰ Daily at:  {}", schedule.time().format("%H:%M"));
            println!();

            let scheduler = hbd_scheduler::run_daily(schedule, move || {
                let job = job.clone();
                let db_path = db_path.clone();
                async move {
                    // One connection per run, dropped when the run ends.
                    let store = SqliteStore::open(&db_path)?;
                    job.run(&store).await
                }
            });

            tokio::select! {
                _ = scheduler => {}
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("👋 Shutting down");
                }
            }
        }
    }

    Ok(())
}
