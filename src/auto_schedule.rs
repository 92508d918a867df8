use crate::error::{PlannerError, PlannerResult};
use crate::grid::LessonId;
use crate::models::ScheduleRequest;
use crate::time_slots::{self, clock_label};

pub const DEFAULT_LESSON_MINUTES: u32 = 45;
pub const DEFAULT_BREAK_MINUTES: u32 = 15;

/// Parameters for the backend's automatic weekly plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoScheduleParams {
    pub days: Vec<u8>,
    pub start: String,
    pub end: String,
    pub lesson_minutes: u32,
    pub break_minutes: u32,
}

/// One lesson the backend would place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedLesson {
    pub day: u8,
    pub lesson: LessonId,
    pub start: String,
    pub end: String,
}

impl AutoScheduleParams {
    pub fn new(days: Vec<u8>, start: &str, end: &str) -> Self {
        Self {
            days,
            start: start.to_string(),
            end: end.to_string(),
            lesson_minutes: DEFAULT_LESSON_MINUTES,
            break_minutes: DEFAULT_BREAK_MINUTES,
        }
    }

    /// Number of lesson+break blocks that fit in one day, after validation.
    pub fn validate(&self) -> PlannerResult<u32> {
        if self.days.is_empty() {
            return Err(PlannerError::Validation("no days selected".into()));
        }
        if let Some(bad) = self.days.iter().find(|d| **d > 6) {
            return Err(PlannerError::Validation(format!("day {bad} is not in 0-6")));
        }
        let start = time_slots::parse_clock(&self.start)
            .ok_or_else(|| PlannerError::Validation(format!("bad start time '{}'", self.start)))?;
        let end = time_slots::parse_clock(&self.end)
            .ok_or_else(|| PlannerError::Validation(format!("bad end time '{}'", self.end)))?;
        if start >= end {
            return Err(PlannerError::Validation(
                "start time must be before end time".into(),
            ));
        }
        if self.lesson_minutes == 0 {
            return Err(PlannerError::Validation("lesson length must be positive".into()));
        }
        let per_block = self.lesson_minutes + self.break_minutes;
        let blocks = (end - start) / per_block;
        if blocks == 0 {
            return Err(PlannerError::Validation("time window is too short".into()));
        }
        Ok(blocks)
    }

    pub fn to_request(&self) -> ScheduleRequest {
        ScheduleRequest::AutoSchedule {
            days: self.days.clone(),
            start: self.start.clone(),
            end: self.end.clone(),
            lesson_minutes: self.lesson_minutes,
            break_minutes: self.break_minutes,
        }
    }

    /// What the backend will create: lessons dealt round-robin across every
    /// block of every selected day.
    pub fn preview(&self, lessons: &[LessonId]) -> PlannerResult<Vec<PlannedLesson>> {
        let blocks = self.validate()?;
        if lessons.is_empty() {
            return Err(PlannerError::Validation("no lessons to schedule".into()));
        }
        let start = time_slots::parse_clock(&self.start).unwrap_or_default();
        let per_block = self.lesson_minutes + self.break_minutes;

        let mut next = 0usize;
        let mut planned = Vec::new();
        for &day in &self.days {
            for b in 0..blocks {
                let from = start + b * per_block;
                planned.push(PlannedLesson {
                    day,
                    lesson: lessons[next % lessons.len()],
                    start: clock_label(from),
                    end: clock_label(from + self.lesson_minutes),
                });
                next += 1;
            }
        }
        Ok(planned)
    }
}
