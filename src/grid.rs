use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConflictError, GridError};
use crate::time_slots::{self, DEFAULT_SLOTS_PER_DAY, SLOT_MINUTES};

pub const DAYS: usize = 7;

/// Backend lesson id (`ders_id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LessonId(pub u32);

impl fmt::Display for LessonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Addresses a block by its day and first slot. Blocks are derived from
/// occupancy, so an id is only meaningful while a block still starts there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BlockId {
    pub day: u8,
    pub start: usize,
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.day, self.start)
    }
}

/// A maximal run of contiguous slots on one day holding the same lesson.
/// `end` is inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonBlock {
    pub day: u8,
    pub lesson: LessonId,
    pub start: usize,
    pub end: usize,
}

impl LessonBlock {
    pub fn id(&self) -> BlockId {
        BlockId {
            day: self.day,
            start: self.start,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn duration_minutes(&self) -> u32 {
        self.len() as u32 * SLOT_MINUTES
    }

    pub fn start_minutes(&self) -> u32 {
        time_slots::slot_start_minutes(self.start)
    }

    /// Exclusive end, in minutes since midnight.
    pub fn end_minutes(&self) -> u32 {
        time_slots::slot_start_minutes(self.end + 1)
    }

    pub fn start_time(&self) -> String {
        time_slots::clock_label(self.start_minutes())
    }

    pub fn end_time(&self) -> String {
        time_slots::clock_label(self.end_minutes())
    }

    pub fn contains(&self, day: u8, slot: usize) -> bool {
        self.day == day && (self.start..=self.end).contains(&slot)
    }
}

/// Why an extension stopped short of the requested end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResizeStop {
    Conflict(ConflictError),
    MaxLength { max_slots: usize },
    EndOfDay,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeOutcome {
    pub block: LessonBlock,
    pub stop: Option<ResizeStop>,
}

/// Week grid: 7 days × `slots_per_day` half-hour slots, each free or held by
/// one lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleGrid {
    slots_per_day: usize,
    max_block_slots: Option<usize>,
    cells: Vec<Option<LessonId>>,
}

impl Default for ScheduleGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleGrid {
    pub fn new() -> Self {
        Self::with_slots(DEFAULT_SLOTS_PER_DAY)
    }

    pub fn with_slots(slots_per_day: usize) -> Self {
        Self {
            slots_per_day,
            max_block_slots: None,
            cells: vec![None; DAYS * slots_per_day],
        }
    }

    /// Cap applied when a block is extended by `resize_block`.
    pub fn with_max_block_slots(mut self, max: Option<usize>) -> Self {
        self.max_block_slots = max.filter(|m| *m > 0);
        self
    }

    pub fn slots_per_day(&self) -> usize {
        self.slots_per_day
    }

    pub fn max_block_slots(&self) -> Option<usize> {
        self.max_block_slots
    }

    fn index(&self, day: u8, slot: usize) -> usize {
        day as usize * self.slots_per_day + slot
    }

    pub fn get(&self, day: u8, slot: usize) -> Option<LessonId> {
        if (day as usize) < DAYS && slot < self.slots_per_day {
            self.cells[self.index(day, slot)]
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = None);
    }

    fn check_range(&self, day: u8, start: usize, end: usize) -> Result<(), GridError> {
        if (day as usize) >= DAYS || start > end || end >= self.slots_per_day {
            return Err(GridError::OutOfRange { day, start, end });
        }
        Ok(())
    }

    fn first_conflict(
        &self,
        day: u8,
        start: usize,
        end: usize,
        lesson: LessonId,
        ignore: Option<&LessonBlock>,
    ) -> Option<ConflictError> {
        (start..=end).find_map(|slot| match self.get(day, slot) {
            Some(existing) if existing != lesson => {
                if ignore.is_some_and(|b| b.contains(day, slot)) {
                    None
                } else {
                    Some(ConflictError {
                        day,
                        slot,
                        existing,
                        requested: lesson,
                    })
                }
            }
            _ => None,
        })
    }

    fn fill(&mut self, day: u8, start: usize, end: usize, lesson: Option<LessonId>) {
        for slot in start..=end {
            let i = self.index(day, slot);
            self.cells[i] = lesson;
        }
    }

    /// First slot of the run holding the same lesson that contains `slot`.
    fn run_start(&self, day: u8, slot: usize) -> usize {
        let lesson = self.get(day, slot);
        let mut start = slot;
        while start > 0 && lesson.is_some() && self.get(day, start - 1) == lesson {
            start -= 1;
        }
        start
    }

    /// Mark `start..=end` on `day` with `lesson`, all or nothing. Slots that
    /// already hold the same lesson are not a conflict.
    pub fn occupy(
        &mut self,
        day: u8,
        start: usize,
        end: usize,
        lesson: LessonId,
    ) -> Result<BlockId, GridError> {
        self.check_range(day, start, end)?;
        if let Some(conflict) = self.first_conflict(day, start, end, lesson, None) {
            return Err(conflict.into());
        }
        self.fill(day, start, end, Some(lesson));
        Ok(BlockId {
            day,
            start: self.run_start(day, start),
        })
    }

    /// Clear `start..=end` on `day`. Positions outside the grid are ignored.
    pub fn release(&mut self, day: u8, start: usize, end: usize) {
        if (day as usize) >= DAYS || start >= self.slots_per_day || start > end {
            return;
        }
        let end = end.min(self.slots_per_day - 1);
        self.fill(day, start, end, None);
    }

    /// Would `lesson` fit at `start..=end`, treating `ignore`'s own slots as free?
    pub fn can_place(
        &self,
        day: u8,
        start: usize,
        end: usize,
        lesson: LessonId,
        ignore: Option<&LessonBlock>,
    ) -> Result<(), GridError> {
        self.check_range(day, start, end)?;
        match self.first_conflict(day, start, end, lesson, ignore) {
            Some(conflict) => Err(conflict.into()),
            None => Ok(()),
        }
    }

    /// The block starting exactly at `id`.
    pub fn block(&self, id: BlockId) -> Result<LessonBlock, GridError> {
        let lesson = self.get(id.day, id.start).ok_or(GridError::NotFound(id))?;
        if self.run_start(id.day, id.start) != id.start {
            return Err(GridError::NotFound(id));
        }
        let mut end = id.start;
        while self.get(id.day, end + 1) == Some(lesson) {
            end += 1;
        }
        Ok(LessonBlock {
            day: id.day,
            lesson,
            start: id.start,
            end,
        })
    }

    /// The block covering `slot`, if any.
    pub fn block_at(&self, day: u8, slot: usize) -> Option<LessonBlock> {
        self.get(day, slot)?;
        self.block(BlockId {
            day,
            start: self.run_start(day, slot),
        })
        .ok()
    }

    /// Move a block to `new_day`/`new_start`, keeping its length. On conflict
    /// the block is restored where it was.
    pub fn move_block(
        &mut self,
        id: BlockId,
        new_day: u8,
        new_start: usize,
    ) -> Result<BlockId, GridError> {
        let block = self.block(id)?;
        let new_end = new_start + block.len() - 1;
        self.check_range(new_day, new_start, new_end)?;

        self.release(block.day, block.start, block.end);
        match self.occupy(new_day, new_start, new_end, block.lesson) {
            Ok(moved) => Ok(moved),
            Err(e) => {
                self.fill(block.day, block.start, block.end, Some(block.lesson));
                Err(e)
            }
        }
    }

    /// Move a block's end to `new_end`. Shrinking always succeeds; extending
    /// goes as far as it can and reports what stopped it.
    pub fn resize_block(&mut self, id: BlockId, new_end: usize) -> Result<ResizeOutcome, GridError> {
        let block = self.block(id)?;
        if new_end < block.start {
            return Err(GridError::BelowMinimum);
        }

        if new_end <= block.end {
            self.release(block.day, new_end + 1, block.end);
            return Ok(ResizeOutcome {
                block: self.block(id)?,
                stop: None,
            });
        }

        let mut target = new_end;
        let mut stop = None;
        if target >= self.slots_per_day {
            target = self.slots_per_day - 1;
            stop = Some(ResizeStop::EndOfDay);
        }
        if let Some(max_slots) = self.max_block_slots {
            let cap_end = (block.start + max_slots - 1).max(block.end);
            if target > cap_end {
                target = cap_end;
                stop = Some(ResizeStop::MaxLength { max_slots });
            }
        }

        for slot in block.end + 1..=target {
            match self.get(block.day, slot) {
                Some(existing) if existing != block.lesson => {
                    stop = Some(ResizeStop::Conflict(ConflictError {
                        day: block.day,
                        slot,
                        existing,
                        requested: block.lesson,
                    }));
                    break;
                }
                _ => {
                    let i = self.index(block.day, slot);
                    self.cells[i] = Some(block.lesson);
                }
            }
        }

        Ok(ResizeOutcome {
            block: self.block(id)?,
            stop,
        })
    }

    pub fn blocks_on(&self, day: u8) -> Vec<LessonBlock> {
        if (day as usize) >= DAYS {
            return Vec::new();
        }
        merge_runs(
            day,
            (0..self.slots_per_day).filter_map(|slot| self.get(day, slot).map(|l| (slot, l))),
        )
    }

    /// All blocks, ordered by day then start slot.
    pub fn compute_blocks(&self) -> Vec<LessonBlock> {
        (0..DAYS as u8).flat_map(|day| self.blocks_on(day)).collect()
    }

    /// Flat `"day_slot" -> lesson` form representation.
    pub fn to_wire_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        for day in 0..DAYS as u8 {
            for slot in 0..self.slots_per_day {
                if let Some(lesson) = self.get(day, slot) {
                    map.insert(wire_key(day, slot), lesson.to_string());
                }
            }
        }
        map
    }

    /// Rebuild a grid from a wire map. Bad entries are dropped with a warning;
    /// empty values mean a free slot.
    pub fn from_wire_map<I, K, V>(entries: I, slots_per_day: usize) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut per_day: BTreeMap<u8, BTreeMap<usize, LessonId>> = BTreeMap::new();

        for (key, value) in entries {
            let (key, value) = (key.as_ref(), value.as_ref().trim());
            if value.is_empty() {
                continue;
            }
            let Some((day, slot)) = parse_wire_key(key) else {
                warn!("Wire map: dropping malformed key '{}'", key);
                continue;
            };
            if (day as usize) >= DAYS || slot >= slots_per_day {
                warn!("Wire map: dropping out-of-range key '{}'", key);
                continue;
            }
            let Ok(lesson) = value.parse::<u32>().map(LessonId) else {
                warn!("Wire map: dropping '{}' with non-numeric lesson '{}'", key, value);
                continue;
            };
            let day_slots = per_day.entry(day).or_default();
            if let Some(existing) = day_slots.get(&slot) {
                warn!(
                    "Wire map: '{}' duplicates slot {}_{} (kept lesson {})",
                    key, day, slot, existing
                );
                continue;
            }
            day_slots.insert(slot, lesson);
        }

        let mut grid = Self::with_slots(slots_per_day);
        for (day, slots) in per_day {
            for block in merge_runs(day, slots) {
                grid.fill(block.day, block.start, block.end, Some(block.lesson));
            }
        }
        grid
    }
}

pub fn wire_key(day: u8, slot: usize) -> String {
    format!("{day}_{slot}")
}

fn parse_wire_key(key: &str) -> Option<(u8, usize)> {
    let (day, slot) = key.trim().split_once('_')?;
    Some((day.parse().ok()?, slot.parse().ok()?))
}

/// Merge slots (sorted by index) into blocks. Two slots join only when they
/// are adjacent and hold the same lesson.
fn merge_runs(day: u8, cells: impl IntoIterator<Item = (usize, LessonId)>) -> Vec<LessonBlock> {
    let mut blocks: Vec<LessonBlock> = Vec::new();
    for (slot, lesson) in cells {
        match blocks.last_mut() {
            Some(last) if last.lesson == lesson && slot == last.end + 1 => last.end = slot,
            _ => blocks.push(LessonBlock {
                day,
                lesson,
                start: slot,
                end: slot,
            }),
        }
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const A: LessonId = LessonId(1);
    const B: LessonId = LessonId(2);

    fn block(day: u8, lesson: LessonId, start: usize, end: usize) -> LessonBlock {
        LessonBlock {
            day,
            lesson,
            start,
            end,
        }
    }

    #[test]
    fn test_occupy_single_block() {
        let mut grid = ScheduleGrid::new();
        let id = grid.occupy(0, 2, 3, A).unwrap();
        assert_eq!(id, BlockId { day: 0, start: 2 });

        let blocks = grid.compute_blocks();
        assert_eq!(blocks, vec![block(0, A, 2, 3)]);
        assert_eq!(blocks[0].duration_minutes(), 60);
        assert_eq!(blocks[0].start_time(), "09:00");
        assert_eq!(blocks[0].end_time(), "10:00");
    }

    #[test]
    fn test_gap_keeps_blocks_apart() {
        let mut grid = ScheduleGrid::new();
        grid.occupy(0, 2, 2, A).unwrap();
        grid.occupy(0, 4, 4, A).unwrap();
        assert_eq!(
            grid.compute_blocks(),
            vec![block(0, A, 2, 2), block(0, A, 4, 4)]
        );
    }

    #[test]
    fn test_adjacent_same_lesson_merges() {
        let mut grid = ScheduleGrid::new();
        grid.occupy(3, 4, 5, A).unwrap();
        let id = grid.occupy(3, 6, 6, A).unwrap();
        assert_eq!(id, BlockId { day: 3, start: 4 });
        assert_eq!(grid.compute_blocks(), vec![block(3, A, 4, 6)]);
    }

    #[test]
    fn test_occupy_conflict_leaves_grid_unchanged() {
        let mut grid = ScheduleGrid::new();
        grid.occupy(1, 4, 4, B).unwrap();
        let before = grid.clone();

        let err = grid.occupy(1, 2, 5, A).unwrap_err();
        assert_eq!(
            err,
            GridError::Conflict(ConflictError {
                day: 1,
                slot: 4,
                existing: B,
                requested: A,
            })
        );
        assert_eq!(grid, before);
    }

    #[test]
    fn test_occupy_same_lesson_is_idempotent() {
        let mut grid = ScheduleGrid::new();
        grid.occupy(2, 0, 3, A).unwrap();
        let before = grid.clone();
        grid.occupy(2, 1, 2, A).unwrap();
        assert_eq!(grid, before);
    }

    #[test]
    fn test_occupy_out_of_range() {
        let mut grid = ScheduleGrid::new();
        assert!(matches!(
            grid.occupy(7, 0, 0, A),
            Err(GridError::OutOfRange { .. })
        ));
        assert!(matches!(
            grid.occupy(0, 34, 35, A),
            Err(GridError::OutOfRange { .. })
        ));
        assert!(matches!(
            grid.occupy(0, 5, 4, A),
            Err(GridError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_release_is_unconditional() {
        let mut grid = ScheduleGrid::new();
        grid.occupy(0, 0, 3, A).unwrap();
        grid.release(0, 1, 2);
        assert_eq!(
            grid.compute_blocks(),
            vec![block(0, A, 0, 0), block(0, A, 3, 3)]
        );
        // already empty and past the end
        grid.release(0, 1, 100);
        grid.release(9, 0, 1);
        assert_eq!(grid.compute_blocks(), vec![block(0, A, 0, 0)]);
    }

    #[test]
    fn test_block_lookup() {
        let mut grid = ScheduleGrid::new();
        grid.occupy(4, 6, 9, A).unwrap();
        assert_eq!(grid.block(BlockId { day: 4, start: 6 }).unwrap(), block(4, A, 6, 9));
        assert_eq!(
            grid.block(BlockId { day: 4, start: 7 }),
            Err(GridError::NotFound(BlockId { day: 4, start: 7 }))
        );
        assert_eq!(grid.block_at(4, 8), Some(block(4, A, 6, 9)));
        assert_eq!(grid.block_at(4, 10), None);
    }

    #[test]
    fn test_move_block() {
        let mut grid = ScheduleGrid::new();
        grid.occupy(0, 2, 3, A).unwrap();
        let id = grid.move_block(BlockId { day: 0, start: 2 }, 5, 10).unwrap();
        assert_eq!(id, BlockId { day: 5, start: 10 });
        assert_eq!(grid.compute_blocks(), vec![block(5, A, 10, 11)]);
    }

    #[test]
    fn test_move_block_overlapping_itself() {
        let mut grid = ScheduleGrid::new();
        grid.occupy(0, 2, 5, A).unwrap();
        grid.move_block(BlockId { day: 0, start: 2 }, 0, 4).unwrap();
        assert_eq!(grid.compute_blocks(), vec![block(0, A, 4, 7)]);
    }

    #[test]
    fn test_move_block_conflict_restores_original() {
        let mut grid = ScheduleGrid::new();
        grid.occupy(0, 2, 3, A).unwrap();
        grid.occupy(1, 3, 3, B).unwrap();
        let before = grid.clone();

        let err = grid.move_block(BlockId { day: 0, start: 2 }, 1, 2).unwrap_err();
        assert!(matches!(err, GridError::Conflict(ConflictError { slot: 3, .. })));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_move_block_out_of_range_keeps_block() {
        let mut grid = ScheduleGrid::new();
        grid.occupy(0, 2, 3, A).unwrap();
        let before = grid.clone();
        assert!(matches!(
            grid.move_block(BlockId { day: 0, start: 2 }, 0, 34),
            Err(GridError::OutOfRange { .. })
        ));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_resize_stops_at_conflict() {
        let mut grid = ScheduleGrid::new();
        grid.occupy(1, 5, 5, A).unwrap();
        grid.occupy(1, 7, 7, B).unwrap();

        let outcome = grid.resize_block(BlockId { day: 1, start: 5 }, 7).unwrap();
        assert_eq!(outcome.block, block(1, A, 5, 6));
        assert_eq!(
            outcome.stop,
            Some(ResizeStop::Conflict(ConflictError {
                day: 1,
                slot: 7,
                existing: B,
                requested: A,
            }))
        );
        assert_eq!(grid.get(1, 7), Some(B));
    }

    #[test]
    fn test_resize_shrink_releases_slots() {
        let mut grid = ScheduleGrid::new();
        grid.occupy(2, 0, 3, A).unwrap();
        let outcome = grid.resize_block(BlockId { day: 2, start: 0 }, 1).unwrap();
        assert_eq!(outcome.block, block(2, A, 0, 1));
        assert_eq!(outcome.stop, None);
        assert_eq!(grid.get(2, 2), None);
        assert_eq!(grid.get(2, 3), None);
    }

    #[test]
    fn test_resize_below_minimum() {
        let mut grid = ScheduleGrid::new();
        grid.occupy(2, 4, 5, A).unwrap();
        let before = grid.clone();
        assert_eq!(
            grid.resize_block(BlockId { day: 2, start: 4 }, 3),
            Err(GridError::BelowMinimum)
        );
        assert_eq!(grid, before);
    }

    #[test]
    fn test_resize_respects_max_length() {
        let mut grid = ScheduleGrid::new().with_max_block_slots(Some(4));
        grid.occupy(0, 0, 0, A).unwrap();
        let outcome = grid.resize_block(BlockId { day: 0, start: 0 }, 9).unwrap();
        assert_eq!(outcome.block, block(0, A, 0, 3));
        assert_eq!(outcome.stop, Some(ResizeStop::MaxLength { max_slots: 4 }));
    }

    #[test]
    fn test_resize_clamps_to_end_of_day() {
        let mut grid = ScheduleGrid::with_slots(10);
        grid.occupy(6, 8, 8, A).unwrap();
        let outcome = grid.resize_block(BlockId { day: 6, start: 8 }, 20).unwrap();
        assert_eq!(outcome.block, block(6, A, 8, 9));
        assert_eq!(outcome.stop, Some(ResizeStop::EndOfDay));
    }

    #[test]
    fn test_resize_into_same_lesson_merges() {
        let mut grid = ScheduleGrid::new();
        grid.occupy(0, 0, 0, A).unwrap();
        grid.occupy(0, 2, 3, A).unwrap();
        let outcome = grid.resize_block(BlockId { day: 0, start: 0 }, 1).unwrap();
        assert_eq!(outcome.block, block(0, A, 0, 3));
        assert_eq!(outcome.stop, None);
    }

    #[test]
    fn test_can_place_ignores_own_block() {
        let mut grid = ScheduleGrid::new();
        grid.occupy(0, 2, 3, A).unwrap();
        grid.occupy(0, 6, 6, B).unwrap();
        let a = grid.block(BlockId { day: 0, start: 2 }).unwrap();
        assert!(grid.can_place(0, 3, 4, B, Some(&a)).is_ok());
        assert!(grid.can_place(0, 3, 4, B, None).is_err());
        assert!(grid.can_place(0, 5, 6, A, Some(&a)).is_err());
    }

    #[test]
    fn test_wire_map_round_trip() {
        let mut grid = ScheduleGrid::new();
        grid.occupy(0, 2, 3, A).unwrap();
        grid.occupy(6, 30, 34, B).unwrap();

        let wire = grid.to_wire_map();
        assert_eq!(wire.get("0_2").map(String::as_str), Some("1"));
        assert_eq!(wire.len(), 7);

        let rebuilt = ScheduleGrid::from_wire_map(&wire, DEFAULT_SLOTS_PER_DAY);
        assert_eq!(rebuilt.compute_blocks(), grid.compute_blocks());
        assert_eq!(rebuilt, grid);
    }

    #[test]
    fn test_from_wire_map_drops_bad_entries() {
        let entries = vec![
            ("0_3", "5"),
            ("0_2", "5"),
            ("garbage", "5"),
            ("9_1", "5"),
            ("1_99", "5"),
            ("1_x", "5"),
            ("2_1", "abc"),
            ("2_2", ""),
            ("0_03", "7"),
        ];
        let grid = ScheduleGrid::from_wire_map(entries, DEFAULT_SLOTS_PER_DAY);
        assert_eq!(grid.compute_blocks(), vec![block(0, LessonId(5), 2, 3)]);
    }

    fn arb_grid() -> impl Strategy<Value = ScheduleGrid> {
        proptest::collection::vec((0u8..7, 0usize..35, 0usize..4, 1u32..4), 0..20).prop_map(
            |ops| {
                let mut grid = ScheduleGrid::new();
                for (day, start, extra, lesson) in ops {
                    let end = (start + extra).min(34);
                    let _ = grid.occupy(day, start, end, LessonId(lesson));
                }
                grid
            },
        )
    }

    proptest! {
        #[test]
        fn prop_wire_round_trip_preserves_blocks(grid in arb_grid()) {
            let wire = grid.to_wire_map();
            let mut reversed: Vec<(String, String)> = wire.into_iter().collect();
            reversed.reverse();
            let rebuilt = ScheduleGrid::from_wire_map(reversed, DEFAULT_SLOTS_PER_DAY);
            prop_assert_eq!(rebuilt.compute_blocks(), grid.compute_blocks());
        }

        #[test]
        fn prop_disjoint_occupy_reproduces_blocks(
            starts in proptest::collection::btree_set(0usize..17, 0..8),
            day in 0u8..7,
        ) {
            // even slot pairs with alternating lessons never touch as same lesson
            let mut grid = ScheduleGrid::new();
            let mut expected = Vec::new();
            for (i, s) in starts.iter().enumerate() {
                let start = s * 2;
                let lesson = LessonId(if i % 2 == 0 { 10 } else { 20 } + i as u32);
                grid.occupy(day, start, start + 1, lesson).unwrap();
                expected.push(block(day, lesson, start, start + 1));
            }
            prop_assert_eq!(grid.compute_blocks(), expected);
        }

        #[test]
        fn prop_conflicting_occupy_is_rejected(grid in arb_grid(), day in 0u8..7, slot in 0usize..35) {
            let mut grid = grid;
            if let Some(existing) = grid.get(day, slot) {
                let other = LessonId(existing.0 + 100);
                let before = grid.clone();
                prop_assert!(grid.occupy(day, slot, slot, other).is_err());
                prop_assert_eq!(grid, before);
            }
        }
    }
}
