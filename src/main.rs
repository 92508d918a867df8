mod auto_schedule;
mod client;
mod commands;
mod config;
mod drag;
mod error;
mod grid;
mod models;
mod palette;
mod session;
mod stats;
mod time_slots;
mod web;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use auto_schedule::{AutoScheduleParams, DEFAULT_BREAK_MINUTES, DEFAULT_LESSON_MINUTES};

/// YKS weekly planner: view and edit a student's study plan.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print detailed API responses
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Path to config file
    #[arg(short = 'c', long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Override the student ID from config
    #[arg(long, global = true)]
    student: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the week's lesson blocks
    Show {
        /// Print blocks as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a lesson block
    ///
    /// Example:
    ///   add 12 monday 09:00 10:30
    Add {
        /// Lesson ID
        lesson: u32,
        /// Day name (English or Turkish) or 0-6 with Monday = 0
        day: String,
        /// Start time, HH:MM
        start: String,
        /// End time, HH:MM
        end: String,
    },

    /// Move the block covering DAY START to another day or time
    Move {
        day: String,
        start: String,
        #[arg(long)]
        to_day: String,
        #[arg(long)]
        to_start: String,
    },

    /// Change the end time of the block covering DAY START
    Resize {
        day: String,
        start: String,
        /// New end time, HH:MM
        end: String,
    },

    /// Delete the block covering DAY START
    Delete { day: String, start: String },

    /// Delete every lesson in the plan
    Clear,

    /// Ask the backend to generate a weekly plan
    AutoSchedule {
        /// Days to fill (comma-separated, e.g. "monday,wednesday")
        #[arg(long)]
        days: String,
        /// Daily start time, HH:MM
        #[arg(long)]
        start: String,
        /// Daily end time, HH:MM
        #[arg(long)]
        end: String,
        #[arg(long, default_value_t = DEFAULT_LESSON_MINUTES)]
        lesson_minutes: u32,
        #[arg(long, default_value_t = DEFAULT_BREAK_MINUTES)]
        break_minutes: u32,
        /// Dry run: print the plan without sending it
        #[arg(short = 'd', long)]
        dry_run: bool,
    },

    /// Print the plan as a "day_slot" -> lesson JSON map
    Export,

    /// Replace the plan with a JSON map written by `export`
    Import { file: PathBuf },

    /// Start the read-only web view
    Serve {
        /// Listen address (e.g. "0.0.0.0:3000")
        #[arg(short = 'a', long, default_value = "127.0.0.1:3010")]
        addr: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let mut cfg = config::load_config(&cli.config)?;
    if let Some(student) = cli.student {
        cfg.api.student_id = student;
    }

    match cli.command {
        Command::Show { json } => commands::run_show(&cfg, json).await?,
        Command::Add {
            lesson,
            day,
            start,
            end,
        } => commands::run_add(&cfg, lesson, &day, &start, &end).await?,
        Command::Move {
            day,
            start,
            to_day,
            to_start,
        } => commands::run_move(&cfg, &day, &start, &to_day, &to_start).await?,
        Command::Resize { day, start, end } => {
            commands::run_resize(&cfg, &day, &start, &end).await?
        }
        Command::Delete { day, start } => commands::run_delete(&cfg, &day, &start).await?,
        Command::Clear => commands::run_clear(&cfg).await?,
        Command::AutoSchedule {
            days,
            start,
            end,
            lesson_minutes,
            break_minutes,
            dry_run,
        } => {
            let params = AutoScheduleParams {
                lesson_minutes,
                break_minutes,
                ..AutoScheduleParams::new(commands::parse_day_list(&days)?, &start, &end)
            };
            commands::run_auto_schedule(&cfg, &params, dry_run).await?;
        }
        Command::Export => commands::run_export(&cfg).await?,
        Command::Import { file } => commands::run_import(&cfg, &file).await?,
        Command::Serve { addr } => web::serve(cfg, &addr).await?,
    }

    Ok(())
}
