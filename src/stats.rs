use std::collections::BTreeMap;

use crate::grid::{LessonBlock, LessonId};

/// Study time totals for one week.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct WeeklySummary {
    pub total_minutes: u32,
    pub per_lesson: BTreeMap<LessonId, u32>,
}

impl WeeklySummary {
    pub fn from_blocks(blocks: &[LessonBlock]) -> Self {
        let mut summary = Self::default();
        for block in blocks {
            let minutes = block.duration_minutes();
            summary.total_minutes += minutes;
            *summary.per_lesson.entry(block.lesson).or_insert(0) += minutes;
        }
        summary
    }
}

pub fn format_minutes(minutes: u32) -> String {
    let (h, m) = (minutes / 60, minutes % 60);
    match (h, m) {
        (0, m) => format!("{m} min"),
        (h, 0) => format!("{h} h"),
        (h, m) => format!("{h} h {m} min"),
    }
}
