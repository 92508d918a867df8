use crate::grid::{BlockId, LessonId};

/// A slot in the requested range already belongs to another lesson.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("slot {day}_{slot} is already taken by lesson {existing} (wanted {requested})")]
pub struct ConflictError {
    pub day: u8,
    pub slot: usize,
    pub existing: LessonId,
    pub requested: LessonId,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error("no block starts at {0}")]
    NotFound(BlockId),

    #[error("slots {start}..={end} on day {day} are outside the grid")]
    OutOfRange { day: u8, start: usize, end: usize },

    /// A block must keep at least one slot.
    #[error("a block must cover at least one slot")]
    BelowMinimum,
}

/// Failures surfaced to whoever drives a planning session.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("backend request failed: {0}")]
    Network(String),

    #[error("not found: {0}")]
    NotFound(String),
}

impl From<GridError> for PlannerError {
    fn from(err: GridError) -> Self {
        match err {
            GridError::Conflict(c) => PlannerError::Conflict(c),
            GridError::NotFound(id) => PlannerError::NotFound(format!("block {id}")),
            other @ (GridError::OutOfRange { .. } | GridError::BelowMinimum) => {
                PlannerError::Validation(other.to_string())
            }
        }
    }
}

pub type PlannerResult<T> = Result<T, PlannerError>;
