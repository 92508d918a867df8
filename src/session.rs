use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Timelike};
use tracing::{debug, info, warn};

use crate::auto_schedule::AutoScheduleParams;
use crate::client::ScheduleBackend;
use crate::drag::DragGesture;
use crate::error::{GridError, PlannerError, PlannerResult};
use crate::grid::{BlockId, LessonBlock, LessonId, ResizeOutcome, ScheduleGrid, DAYS};
use crate::models::{CalendarEvent, ScheduleRequest};
use crate::time_slots::{self, MINUTES_PER_DAY};

/// A server-side schedule record placed on the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSlot {
    pub id: u64,
    pub lesson: LessonId,
    pub day: u8,
    pub start: usize,
    pub end: usize,
}

/// Grid rebuilt from the event source, with what is needed to address the
/// records behind each block.
#[derive(Debug, Clone)]
pub struct LoadedSchedule {
    pub grid: ScheduleGrid,
    pub events: Vec<EventSlot>,
    pub titles: HashMap<LessonId, String>,
    pub color_indices: HashMap<LessonId, u32>,
    /// Explicit `backgroundColor` overrides sent by the event source.
    pub colors: HashMap<LessonId, String>,
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.naive_local())
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").ok())
        .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").ok())
}

/// Day and minute span of an event. Timestamps win; the stored weekday and
/// clock strings are the fallback when they do not parse.
fn event_span(event: &CalendarEvent) -> Result<(u8, u32, u32), String> {
    let props = &event.extended_props;
    if let (Some(start), Some(end)) = (parse_timestamp(&event.start), parse_timestamp(&event.end)) {
        let day = time_slots::canonical_day_of(start.date());
        if let Some(gun) = props.gun.filter(|g| *g != day) {
            warn!(
                "Event {} is stored on day {} but starts on day {}; using the date",
                event.id, gun, day
            );
        }
        let start_min = start.hour() * 60 + start.minute();
        let mut end_min = end.hour() * 60 + end.minute();
        if end.date() > start.date() {
            end_min += MINUTES_PER_DAY;
        }
        return Ok((day, start_min, end_min));
    }

    let clock = |s: &Option<String>| s.as_deref().and_then(time_slots::parse_clock);
    match (props.gun, clock(&props.baslangic_saat), clock(&props.bitis_saat)) {
        (Some(day), Some(start), Some(end)) if (day as usize) < DAYS => Ok((day, start, end)),
        _ => Err(format!("bad start/end '{}' - '{}'", event.start, event.end)),
    }
}

/// Grid position of one event, or a reason to drop it.
fn event_position(event: &CalendarEvent, slots_per_day: usize) -> Result<(u8, usize, usize), String> {
    let (day, start_min, end_min) = event_span(event)?;
    if end_min <= start_min {
        return Err(format!("ends before it starts ({} - {})", event.start, event.end));
    }

    let first = time_slots::slot_for_start(start_min)
        .ok_or_else(|| format!("starts before the first slot ({})", event.start))?;
    let last = time_slots::last_slot_for_end(end_min)
        .ok_or_else(|| format!("ends before the first slot ({})", event.end))?;
    if last >= slots_per_day {
        return Err(format!("runs past the last slot ({})", event.end));
    }
    Ok((day, first, last.max(first)))
}

/// Rebuild a grid from calendar events. Events that cannot be placed are
/// dropped with a warning so the rest of the week still loads.
pub fn events_to_grid(
    events: &[CalendarEvent],
    slots_per_day: usize,
    max_block_slots: Option<usize>,
) -> LoadedSchedule {
    let mut grid = ScheduleGrid::with_slots(slots_per_day).with_max_block_slots(max_block_slots);
    let mut placed = Vec::new();
    let mut titles = HashMap::new();
    let mut color_indices = HashMap::new();
    let mut colors = HashMap::new();

    for event in events {
        let Some(lesson) = event.lesson() else {
            warn!("Dropping event {} without a lesson id", event.id);
            continue;
        };
        let (day, start, end) = match event_position(event, slots_per_day) {
            Ok(pos) => pos,
            Err(reason) => {
                warn!("Dropping event {}: {}", event.id, reason);
                continue;
            }
        };
        if let Err(e) = grid.occupy(day, start, end, lesson) {
            warn!("Dropping event {}: {}", event.id, e);
            continue;
        }
        if let Some(title) = &event.title {
            titles.entry(lesson).or_insert_with(|| title.clone());
        }
        if let Some(idx) = event.extended_props.renk_index {
            color_indices.entry(lesson).or_insert(idx);
        }
        if let Some(color) = &event.background_color {
            colors.entry(lesson).or_insert_with(|| color.clone());
        }
        match event.server_id() {
            Some(id) => placed.push(EventSlot {
                id,
                lesson,
                day,
                start,
                end,
            }),
            None => warn!("Event {} has no numeric id; it cannot be edited", event.id),
        }
    }

    LoadedSchedule {
        grid,
        events: placed,
        titles,
        color_indices,
        colors,
    }
}

/// Start/end clock strings for syncing a block. A block ending exactly at
/// midnight is sent as ending at 23:59.
pub fn block_times(block: &LessonBlock) -> PlannerResult<(String, String)> {
    let end = block.end_minutes();
    if end > MINUTES_PER_DAY {
        return Err(PlannerError::Validation(format!(
            "block {} runs past midnight",
            block.id()
        )));
    }
    let end_label = if end == MINUTES_PER_DAY {
        "23:59".to_string()
    } else {
        time_slots::clock_label(end)
    };
    Ok((block.start_time(), end_label))
}

/// Slot range covered by a `start`-`end` clock interval.
pub fn slot_range(start: &str, end: &str) -> PlannerResult<(usize, usize)> {
    let s = time_slots::parse_clock(start)
        .ok_or_else(|| PlannerError::Validation(format!("missing or bad start time '{start}'")))?;
    let e = time_slots::parse_clock(end)
        .ok_or_else(|| PlannerError::Validation(format!("missing or bad end time '{end}'")))?;
    if s >= e {
        return Err(PlannerError::Validation(
            "start time must be before end time".into(),
        ));
    }
    let first = time_slots::slot_for_start(s)
        .ok_or_else(|| PlannerError::Validation(format!("{start} is before the first slot")))?;
    let last = time_slots::last_slot_for_end(e).unwrap_or(first).max(first);
    Ok((first, last))
}

/// Local grid plus the remote plan it mirrors. Mutations are applied to the
/// grid first, sent to the backend, rolled back if the backend refuses, and
/// reconciled with a fresh fetch when it accepts.
pub struct PlannerSession<B> {
    backend: B,
    loaded: LoadedSchedule,
}

impl<B: ScheduleBackend> PlannerSession<B> {
    pub fn new(backend: B, slots_per_day: usize, max_block_slots: Option<usize>) -> Self {
        Self {
            backend,
            loaded: events_to_grid(&[], slots_per_day, max_block_slots),
        }
    }

    pub fn grid(&self) -> &ScheduleGrid {
        &self.loaded.grid
    }

    pub fn blocks(&self) -> Vec<LessonBlock> {
        self.loaded.grid.compute_blocks()
    }

    pub fn title(&self, lesson: LessonId) -> Option<&str> {
        self.loaded.titles.get(&lesson).map(String::as_str)
    }

    /// Replace local state with the backend's.
    pub async fn load(&mut self) -> PlannerResult<()> {
        let events = self.backend.fetch_events().await?;
        let slots_per_day = self.loaded.grid.slots_per_day();
        let max_block_slots = self.loaded.grid.max_block_slots();
        self.loaded = events_to_grid(&events, slots_per_day, max_block_slots);
        info!(
            "Loaded {} events into {} blocks",
            self.loaded.events.len(),
            self.loaded.grid.compute_blocks().len()
        );
        Ok(())
    }

    /// Re-fetch after a write. If the fetch fails, the record index is patched
    /// with `applied` so later edits still address the right records. Records
    /// created by `Add` only get an id from a successful fetch.
    async fn refresh(&mut self, applied: &[ScheduleRequest]) {
        if let Err(e) = self.load().await {
            warn!("Could not re-fetch schedule, keeping local state: {}", e);
            self.apply_to_events(applied);
        }
    }

    fn apply_to_events(&mut self, applied: &[ScheduleRequest]) {
        let events = &mut self.loaded.events;
        for request in applied {
            match request {
                ScheduleRequest::Update {
                    id,
                    day,
                    start,
                    end,
                } => match slot_range(start, end) {
                    Ok((first, last)) => {
                        if let Some(e) = events.iter_mut().find(|e| e.id == *id) {
                            e.day = *day;
                            e.start = first;
                            e.end = last;
                        }
                    }
                    Err(_) => events.retain(|e| e.id != *id),
                },
                ScheduleRequest::Delete { id } => events.retain(|e| e.id != *id),
                ScheduleRequest::Clear | ScheduleRequest::AutoSchedule { .. } => events.clear(),
                ScheduleRequest::Add { .. } => {}
            }
        }
    }

    /// Server records starting inside `start..=end` on `day`, in load order.
    fn events_within(&self, day: u8, start: usize, end: usize) -> Vec<u64> {
        self.loaded
            .events
            .iter()
            .filter(|e| e.day == day && (start..=end).contains(&e.start))
            .map(|e| e.id)
            .collect()
    }

    fn events_for_block(&self, block: &LessonBlock) -> PlannerResult<Vec<u64>> {
        let ids = self.events_within(block.day, block.start, block.end);
        if ids.is_empty() {
            return Err(PlannerError::NotFound(format!(
                "no saved record behind block {}",
                block.id()
            )));
        }
        Ok(ids)
    }

    /// Send `requests` in order. On the first failure the grid goes back to
    /// `snapshot`; on success it is replaced by the backend's view.
    async fn commit(
        &mut self,
        snapshot: ScheduleGrid,
        requests: Vec<ScheduleRequest>,
    ) -> PlannerResult<()> {
        let mut sent = 0;
        for request in &requests {
            let failure = match self.backend.send(request).await {
                Ok(resp) if resp.is_success() => {
                    debug!(
                        "Backend accepted {:?}: {:?} {:?}",
                        request, resp.message, resp.data
                    );
                    sent += 1;
                    continue;
                }
                Ok(resp) => PlannerError::Network(
                    resp.message
                        .unwrap_or_else(|| "backend rejected the request".to_string()),
                ),
                Err(e) => e,
            };

            warn!("Rolling back local change: {}", failure);
            self.loaded.grid = snapshot;
            if sent > 0 {
                // part of the change reached the server
                self.refresh(&requests[..sent]).await;
            }
            return Err(failure);
        }

        self.refresh(&requests).await;
        Ok(())
    }

    /// Update the primary record to `target`, delete every other record that
    /// started inside the old or new range.
    fn rewrite_requests(
        &self,
        primary: u64,
        old: &LessonBlock,
        target: &LessonBlock,
    ) -> PlannerResult<Vec<ScheduleRequest>> {
        let (start, end) = block_times(target)?;
        let mut requests = vec![ScheduleRequest::Update {
            id: primary,
            day: target.day,
            start,
            end,
        }];
        let mut extra: Vec<u64> = self
            .events_within(old.day, old.start, old.end)
            .into_iter()
            .chain(self.events_within(target.day, target.start, target.end))
            .filter(|id| *id != primary)
            .collect();
        extra.sort_unstable();
        extra.dedup();
        requests.extend(extra.into_iter().map(|id| ScheduleRequest::Delete { id }));
        Ok(requests)
    }

    pub async fn add_lesson(
        &mut self,
        lesson: LessonId,
        day: u8,
        start: usize,
        end: usize,
    ) -> PlannerResult<BlockId> {
        if end < start {
            return Err(GridError::BelowMinimum.into());
        }
        let candidate = LessonBlock {
            day,
            lesson,
            start,
            end,
        };
        if let Some(max) = self.loaded.grid.max_block_slots() {
            if candidate.len() > max {
                return Err(PlannerError::Validation(format!(
                    "a lesson block may be at most {} minutes",
                    max as u32 * time_slots::SLOT_MINUTES
                )));
            }
        }
        let (start_time, end_time) = block_times(&candidate)?;

        let snapshot = self.loaded.grid.clone();
        let id = self.loaded.grid.occupy(day, start, end, lesson)?;
        self.commit(
            snapshot,
            vec![ScheduleRequest::Add {
                lesson,
                day,
                start: start_time,
                end: end_time,
            }],
        )
        .await?;
        Ok(id)
    }

    pub async fn move_block(
        &mut self,
        id: BlockId,
        new_day: u8,
        new_start: usize,
    ) -> PlannerResult<BlockId> {
        let block = self.loaded.grid.block(id)?;
        let ids = self.events_for_block(&block)?;

        let snapshot = self.loaded.grid.clone();
        let moved = self.loaded.grid.move_block(id, new_day, new_start)?;
        // a same-lesson neighbour may have merged into the landed run
        let requests = self
            .loaded
            .grid
            .block(moved)
            .map_err(PlannerError::from)
            .and_then(|landed| self.rewrite_requests(ids[0], &block, &landed));
        let requests = match requests {
            Ok(r) => r,
            Err(e) => {
                self.loaded.grid = snapshot;
                return Err(e);
            }
        };
        self.commit(snapshot, requests).await?;
        Ok(moved)
    }

    /// Resize and sync. If the block could not change at all (blocked right
    /// away), nothing is sent and the outcome says why.
    pub async fn resize_block(&mut self, id: BlockId, new_end: usize) -> PlannerResult<ResizeOutcome> {
        let block = self.loaded.grid.block(id)?;
        let ids = self.events_for_block(&block)?;

        let snapshot = self.loaded.grid.clone();
        let outcome = self.loaded.grid.resize_block(id, new_end)?;
        if outcome.block == block {
            return Ok(outcome);
        }
        let requests = match self.rewrite_requests(ids[0], &block, &outcome.block) {
            Ok(r) => r,
            Err(e) => {
                self.loaded.grid = snapshot;
                return Err(e);
            }
        };
        self.commit(snapshot, requests).await?;
        Ok(outcome)
    }

    pub async fn delete_block(&mut self, id: BlockId) -> PlannerResult<()> {
        let block = self.loaded.grid.block(id)?;
        let ids = self.events_for_block(&block)?;

        let snapshot = self.loaded.grid.clone();
        self.loaded.grid.release(block.day, block.start, block.end);
        let requests = ids
            .into_iter()
            .map(|id| ScheduleRequest::Delete { id })
            .collect();
        self.commit(snapshot, requests).await
    }

    pub async fn clear(&mut self) -> PlannerResult<()> {
        let snapshot = self.loaded.grid.clone();
        self.loaded.grid.clear();
        self.commit(snapshot, vec![ScheduleRequest::Clear]).await
    }

    /// Ask the backend to generate a plan. Nothing changes locally until the
    /// generated plan is fetched back.
    pub async fn auto_schedule(&mut self, params: &AutoScheduleParams) -> PlannerResult<()> {
        params.validate()?;
        let snapshot = self.loaded.grid.clone();
        self.commit(snapshot, vec![params.to_request()]).await
    }

    /// Replace the whole plan with `grid`: clear, then one add per block.
    pub async fn import_grid(&mut self, grid: ScheduleGrid) -> PlannerResult<()> {
        let mut requests = vec![ScheduleRequest::Clear];
        for block in grid.compute_blocks() {
            let (start, end) = block_times(&block)?;
            requests.push(ScheduleRequest::Add {
                lesson: block.lesson,
                day: block.day,
                start,
                end,
            });
        }
        let snapshot = std::mem::replace(&mut self.loaded.grid, grid);
        self.commit(snapshot, requests).await
    }

    pub fn begin_drag(&self, id: BlockId) -> PlannerResult<DragGesture> {
        Ok(DragGesture::begin(&self.loaded.grid, id)?)
    }

    /// Finish a drag. Dropping back where it started is a no-op.
    pub async fn drop_drag(&mut self, gesture: DragGesture) -> PlannerResult<BlockId> {
        match gesture.target() {
            Some((day, slot)) => self.move_block(gesture.origin().id(), day, slot).await,
            None => Ok(gesture.origin().id()),
        }
    }
}
