use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::auto_schedule::AutoScheduleParams;
use crate::client::PlanClient;
use crate::grid::{BlockId, LessonBlock, LessonId, ResizeStop, ScheduleGrid};
use crate::models::Config;
use crate::session::{self, PlannerSession};
use crate::stats::{format_minutes, WeeklySummary};
use crate::time_slots;

pub async fn open_session(cfg: &Config) -> Result<PlannerSession<PlanClient>> {
    let client = PlanClient::new(&cfg.api)?;
    info!("Using schedule endpoint {}", client.endpoint());
    let mut session =
        PlannerSession::new(client, cfg.grid.slots_per_day, cfg.grid.max_block_slots());
    session.load().await.context("Failed to load the weekly plan")?;
    Ok(session)
}

pub fn parse_day_arg(day: &str) -> Result<u8> {
    time_slots::parse_day(day).with_context(|| format!("Unknown day '{day}'"))
}

/// Parse a comma-separated day list such as "monday,wednesday".
pub fn parse_day_list(days: &str) -> Result<Vec<u8>> {
    let parsed = days
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_day_arg)
        .collect::<Result<Vec<u8>>>()?;
    if parsed.is_empty() {
        bail!("No days specified");
    }
    Ok(parsed)
}

fn start_slot(time: &str) -> Result<usize> {
    let minutes =
        time_slots::parse_clock(time).with_context(|| format!("Bad time '{time}', expected HH:MM"))?;
    time_slots::slot_for_start(minutes).with_context(|| format!("{time} is before the first slot"))
}

/// Find the block covering `time` on `day`.
fn locate_block(session: &PlannerSession<PlanClient>, day: u8, time: &str) -> Result<BlockId> {
    let slot = start_slot(time)?;
    session
        .grid()
        .block_at(day, slot)
        .map(|b| b.id())
        .with_context(|| {
            format!(
                "No lesson on {} at {}",
                time_slots::day_name(day),
                time_slots::slot_label(slot)
            )
        })
}

fn lesson_title(cfg: &Config, session: &PlannerSession<PlanClient>, lesson: LessonId) -> String {
    session
        .title(lesson)
        .or_else(|| cfg.lesson_name(lesson))
        .map(str::to_string)
        .unwrap_or_else(|| format!("Lesson {lesson}"))
}

fn print_block(cfg: &Config, session: &PlannerSession<PlanClient>, block: &LessonBlock) {
    println!(
        "  {}-{}  {} ({} min)",
        block.start_time(),
        block.end_time(),
        lesson_title(cfg, session, block.lesson),
        block.duration_minutes()
    );
}

pub async fn run_show(cfg: &Config, json: bool) -> Result<()> {
    let session = open_session(cfg).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session.blocks())?);
        return Ok(());
    }

    if session.grid().is_empty() {
        println!("No lessons scheduled for student {}.", cfg.api.student_id);
        return Ok(());
    }

    let blocks = session.blocks();
    println!("Weekly plan for student {}:\n", cfg.api.student_id);
    for day in 0..7u8 {
        let day_blocks: Vec<&LessonBlock> = blocks.iter().filter(|b| b.day == day).collect();
        if day_blocks.is_empty() {
            continue;
        }
        println!("{}", time_slots::day_name(day));
        for block in day_blocks {
            print_block(cfg, &session, block);
        }
    }

    let summary = WeeklySummary::from_blocks(&blocks);
    println!("\nTotal: {}", format_minutes(summary.total_minutes));
    for (lesson, minutes) in &summary.per_lesson {
        println!(
            "  {}: {}",
            lesson_title(cfg, &session, *lesson),
            format_minutes(*minutes)
        );
    }
    Ok(())
}

pub async fn run_add(cfg: &Config, lesson: u32, day: &str, start: &str, end: &str) -> Result<()> {
    let day = parse_day_arg(day)?;
    let (first, last) = session::slot_range(start, end)?;
    let mut session = open_session(cfg).await?;

    let id = session.add_lesson(LessonId(lesson), day, first, last).await?;
    match session.grid().block(id) {
        Ok(block) => {
            println!("Added:");
            print_block(cfg, &session, &block);
        }
        Err(_) => println!("Added lesson {lesson}; the backend rearranged the plan."),
    }
    Ok(())
}

pub async fn run_move(
    cfg: &Config,
    day: &str,
    start: &str,
    to_day: &str,
    to_start: &str,
) -> Result<()> {
    let (day, to_day) = (parse_day_arg(day)?, parse_day_arg(to_day)?);
    let target_slot = start_slot(to_start)?;
    let mut session = open_session(cfg).await?;
    let id = locate_block(&session, day, start)?;

    let mut drag = session.begin_drag(id)?;
    let preview = drag.hover(session.grid(), to_day, target_slot);
    if !preview.is_droppable() {
        match &preview.conflict {
            Some(conflict) => bail!("Cannot move there: {conflict}"),
            None => bail!("Cannot move there: the block would run past the end of the day"),
        }
    }

    let moved = session.drop_drag(drag).await?;
    println!(
        "Moved to {} {}",
        time_slots::day_name(moved.day),
        time_slots::slot_label(moved.start)
    );
    Ok(())
}

pub async fn run_resize(cfg: &Config, day: &str, start: &str, end: &str) -> Result<()> {
    let day = parse_day_arg(day)?;
    let end_minutes =
        time_slots::parse_clock(end).with_context(|| format!("Bad time '{end}', expected HH:MM"))?;
    let new_end = time_slots::last_slot_for_end(end_minutes)
        .with_context(|| format!("{end} is before the first slot"))?;
    let mut session = open_session(cfg).await?;
    let id = locate_block(&session, day, start)?;

    let outcome = session.resize_block(id, new_end).await?;
    println!(
        "Block now {}-{} ({} min)",
        outcome.block.start_time(),
        outcome.block.end_time(),
        outcome.block.duration_minutes()
    );
    match outcome.stop {
        Some(ResizeStop::Conflict(c)) => warn!("Stopped early: {}", c),
        Some(ResizeStop::MaxLength { max_slots }) => warn!(
            "Stopped at the {} minute limit",
            max_slots as u32 * time_slots::SLOT_MINUTES
        ),
        Some(ResizeStop::EndOfDay) => warn!("Stopped at the end of the day"),
        None => {}
    }
    Ok(())
}

pub async fn run_delete(cfg: &Config, day: &str, start: &str) -> Result<()> {
    let day = parse_day_arg(day)?;
    let mut session = open_session(cfg).await?;
    let id = locate_block(&session, day, start)?;
    session.delete_block(id).await?;
    println!("Deleted the block at {} {}", time_slots::day_name(day), start);
    Ok(())
}

pub async fn run_clear(cfg: &Config) -> Result<()> {
    let mut session = open_session(cfg).await?;
    session.clear().await?;
    println!("Cleared the weekly plan for student {}.", cfg.api.student_id);
    Ok(())
}

pub async fn run_auto_schedule(
    cfg: &Config,
    params: &AutoScheduleParams,
    dry_run: bool,
) -> Result<()> {
    if dry_run {
        let lessons: Vec<LessonId> = cfg.lessons.iter().map(|l| l.id).collect();
        if lessons.is_empty() {
            bail!("Dry run needs the [[lessons]] list in the config");
        }
        for planned in params.preview(&lessons)? {
            println!(
                "[DRY RUN] {} {}-{} {}",
                time_slots::day_name(planned.day),
                planned.start,
                planned.end,
                cfg.lesson_name(planned.lesson).unwrap_or("?")
            );
        }
        return Ok(());
    }

    let mut session = open_session(cfg).await?;
    session.auto_schedule(params).await?;
    println!(
        "Generated {} blocks for student {}.",
        session.blocks().len(),
        cfg.api.student_id
    );
    Ok(())
}

pub async fn run_export(cfg: &Config) -> Result<()> {
    let session = open_session(cfg).await?;
    println!("{}", serde_json::to_string_pretty(&session.grid().to_wire_map())?);
    Ok(())
}

/// Read a `{"day_slot": lesson}` JSON file. Lesson ids may be strings or numbers.
pub fn read_wire_map(path: &Path, slots_per_day: usize) -> Result<ScheduleGrid> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    let entries = raw.into_iter().map(|(k, v)| {
        let value = match v {
            serde_json::Value::String(s) => s,
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        };
        (k, value)
    });
    Ok(ScheduleGrid::from_wire_map(entries, slots_per_day))
}

pub async fn run_import(cfg: &Config, path: &Path) -> Result<()> {
    let grid = read_wire_map(path, cfg.grid.slots_per_day)?
        .with_max_block_slots(cfg.grid.max_block_slots());
    let blocks = grid.compute_blocks().len();
    let mut session = open_session(cfg).await?;
    session.import_grid(grid).await?;
    println!("Imported {} blocks for student {}.", blocks, cfg.api.student_id);
    Ok(())
}
