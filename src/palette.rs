use crate::grid::LessonId;

/// Lesson colours, indexed by `lesson id mod 10` unless the backend sends an
/// explicit `renk_index`.
pub const PALETTE: [&str; 10] = [
    "#6200ea", "#e91e63", "#2e7d32", "#8e24aa", "#37474f", "#c2185b", "#f57c00", "#00897b",
    "#1565c0", "#512da8",
];

pub fn color_index(lesson: LessonId, renk_index: Option<u32>) -> usize {
    let raw = renk_index.unwrap_or(lesson.0);
    raw as usize % PALETTE.len()
}

pub fn color_for(lesson: LessonId, renk_index: Option<u32>) -> &'static str {
    PALETTE[color_index(lesson, renk_index)]
}

pub fn css_class(lesson: LessonId, renk_index: Option<u32>) -> String {
    format!("ders-renk-{}", color_index(lesson, renk_index))
}
