use std::collections::HashMap;

use leptos::prelude::*;

use crate::grid::{LessonBlock, LessonId};
use crate::palette;

/// What the page needs from a calendar widget.
pub trait EventRenderer {
    fn render_event(&self, block: &LessonBlock, title: &str) -> String;
    fn set_event_color(&mut self, lesson: LessonId, color: String);
}

/// Server-rendered HTML blocks coloured by the lesson palette.
#[derive(Default)]
pub struct HtmlCalendar {
    colors: HashMap<LessonId, String>,
    color_indices: HashMap<LessonId, u32>,
}

impl HtmlCalendar {
    pub fn new(color_indices: HashMap<LessonId, u32>) -> Self {
        Self {
            colors: HashMap::new(),
            color_indices,
        }
    }

    fn color(&self, lesson: LessonId) -> String {
        self.colors.get(&lesson).cloned().unwrap_or_else(|| {
            palette::color_for(lesson, self.color_indices.get(&lesson).copied()).to_string()
        })
    }
}

impl EventRenderer for HtmlCalendar {
    fn render_event(&self, block: &LessonBlock, title: &str) -> String {
        let class = format!(
            "lesson-block {}",
            palette::css_class(block.lesson, self.color_indices.get(&block.lesson).copied())
        );
        let style = format!("background-color: {};", self.color(block.lesson));
        let title = title.to_string();
        let range = format!(
            "{} - {} ({} min)",
            block.start_time(),
            block.end_time(),
            block.duration_minutes()
        );

        view! {
            <div class=class style=style>
                <strong>{title}</strong>
                <span class="time">{range}</span>
            </div>
        }
        .to_html()
    }

    fn set_event_color(&mut self, lesson: LessonId, color: String) {
        self.colors.insert(lesson, color);
    }
}
