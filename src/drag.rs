use crate::error::{ConflictError, GridError};
use crate::grid::{BlockId, LessonBlock, ScheduleGrid};

/// State of one drag gesture, from pick-up to drop. Coordinates are grid
/// positions resolved by whatever UI hosts the drag.
#[derive(Debug, Clone)]
pub struct DragGesture {
    origin: LessonBlock,
    target: Option<(u8, usize)>,
}

/// Where the block would land and whether it fits there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropPreview {
    pub day: u8,
    pub start: usize,
    pub end: usize,
    pub conflict: Option<ConflictError>,
    pub in_range: bool,
}

impl DropPreview {
    pub fn is_droppable(&self) -> bool {
        self.in_range && self.conflict.is_none()
    }
}

impl DragGesture {
    pub fn begin(grid: &ScheduleGrid, id: BlockId) -> Result<Self, GridError> {
        Ok(Self {
            origin: grid.block(id)?,
            target: None,
        })
    }

    pub fn origin(&self) -> &LessonBlock {
        &self.origin
    }

    /// Track the hovered cell. The block's own slots count as free.
    pub fn hover(&mut self, grid: &ScheduleGrid, day: u8, slot: usize) -> DropPreview {
        self.target = Some((day, slot));
        let end = slot + self.origin.len() - 1;
        let (conflict, in_range) =
            match grid.can_place(day, slot, end, self.origin.lesson, Some(&self.origin)) {
                Ok(()) => (None, true),
                Err(GridError::Conflict(c)) => (Some(c), true),
                Err(_) => (None, false),
            };
        DropPreview {
            day,
            start: slot,
            end,
            conflict,
            in_range,
        }
    }

    /// Last hovered position, if it differs from where the block started.
    pub fn target(&self) -> Option<(u8, usize)> {
        self.target
            .filter(|&(day, slot)| (day, slot) != (self.origin.day, self.origin.start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::LessonId;

    #[test]
    fn test_hover_previews_conflicts() {
        let mut grid = ScheduleGrid::new();
        grid.occupy(0, 2, 3, LessonId(1)).unwrap();
        grid.occupy(0, 6, 6, LessonId(2)).unwrap();

        let mut drag = DragGesture::begin(&grid, BlockId { day: 0, start: 2 }).unwrap();

        let overlap_self = drag.hover(&grid, 0, 3);
        assert!(overlap_self.is_droppable());
        assert_eq!(overlap_self.end, 4);

        let blocked = drag.hover(&grid, 0, 5);
        assert_eq!(blocked.conflict.as_ref().map(|c| c.slot), Some(6));
        assert!(!blocked.is_droppable());

        let off_grid = drag.hover(&grid, 0, 34);
        assert!(!off_grid.in_range);
        assert_eq!(drag.target(), Some((0, 34)));
    }

    #[test]
    fn test_target_ignores_origin() {
        let mut grid = ScheduleGrid::new();
        grid.occupy(4, 1, 1, LessonId(1)).unwrap();
        let mut drag = DragGesture::begin(&grid, BlockId { day: 4, start: 1 }).unwrap();
        assert_eq!(drag.target(), None);
        drag.hover(&grid, 4, 1);
        assert_eq!(drag.target(), None);
    }

    #[test]
    fn test_begin_requires_block_start() {
        let grid = ScheduleGrid::new();
        assert!(DragGesture::begin(&grid, BlockId { day: 0, start: 0 }).is_err());
    }
}
