use leptos::prelude::*;

use super::calendar::EventRenderer;
use crate::grid::{LessonBlock, LessonId, DAYS};
use crate::stats::{format_minutes, WeeklySummary};
use crate::time_slots::{self, DAY_NAMES};

const STYLE: &str = include_str!("../style.css");

/// What the week page shows.
pub(super) struct WeekView<'a> {
    pub(super) student_id: u64,
    pub(super) slots_per_day: usize,
    pub(super) blocks: &'a [LessonBlock],
    pub(super) error: Option<String>,
}

pub(super) fn render_page<F>(view_data: &WeekView<'_>, renderer: &dyn EventRenderer, title_of: F) -> String
where
    F: Fn(LessonId) -> String,
{
    let now = time_slots::now().format("%Y-%m-%d %H:%M:%S %Z").to_string();
    let heading = format!("Weekly plan for student {}", view_data.student_id);
    let body_html = match &view_data.error {
        Some(err) => {
            let err = err.clone();
            view! { <div class="error">{err}</div> }.to_html()
        }
        None => {
            let grid_html = render_week_table(view_data, renderer, &title_of);
            let summary_html = render_summary(view_data.blocks, &title_of);
            grid_html + &summary_html
        }
    };

    view! {
        <html lang="en">
            <head>
                <meta charset="utf-8" />
                <meta name="viewport" content="width=device-width, initial-scale=1" />
                <title>"YKS Weekly Plan"</title>
                <style>{STYLE}</style>
            </head>
            <body>
                <h1>{heading}</h1>
                <p class="timestamp">"Updated: " {now}</p>
                <div inner_html=body_html />
            </body>
        </html>
    }
    .to_html()
}

fn render_week_table(
    view_data: &WeekView<'_>,
    renderer: &dyn EventRenderer,
    title_of: &dyn Fn(LessonId) -> String,
) -> String {
    let header_html: String = DAY_NAMES
        .iter()
        .map(|d| {
            let d = d.to_string();
            view! { <th>{d}</th> }.to_html()
        })
        .collect();

    let rows_html: String = (0..view_data.slots_per_day)
        .map(|slot| {
            let label = time_slots::slot_label(slot);
            let mut cells = view! { <td class="time-label">{label}</td> }.to_html();
            for day in 0..DAYS as u8 {
                let covering = view_data.blocks.iter().find(|b| b.contains(day, slot));
                match covering {
                    Some(b) if b.start == slot => {
                        let rowspan = b.len().to_string();
                        let content = renderer.render_event(b, &title_of(b.lesson));
                        cells += &view! { <td class="slot busy" rowspan=rowspan inner_html=content /> }
                            .to_html();
                    }
                    // covered by a rowspan above
                    Some(_) => {}
                    None => cells += &view! { <td class="slot" /> }.to_html(),
                }
            }
            view! { <tr inner_html=cells /> }.to_html()
        })
        .collect();

    let header_html = view! { <th>"Time"</th> }.to_html() + &header_html;

    view! {
        <table class="week">
            <thead>
                <tr inner_html=header_html />
            </thead>
            <tbody inner_html=rows_html />
        </table>
    }
    .to_html()
}

fn render_summary(blocks: &[LessonBlock], title_of: &dyn Fn(LessonId) -> String) -> String {
    if blocks.is_empty() {
        return view! { <p class="empty">"No lessons scheduled this week."</p> }.to_html();
    }

    let summary = WeeklySummary::from_blocks(blocks);
    let total = format!("Total: {}", format_minutes(summary.total_minutes));
    let rows_html: String = summary
        .per_lesson
        .iter()
        .map(|(lesson, minutes)| {
            let name = title_of(*lesson);
            let time = format_minutes(*minutes);
            view! {
                <tr>
                    <td>{name}</td>
                    <td>{time}</td>
                </tr>
            }
            .to_html()
        })
        .collect();

    view! {
        <section>
            <h2>{total}</h2>
            <table>
                <thead>
                    <tr><th>"Lesson"</th><th>"Time"</th></tr>
                </thead>
                <tbody inner_html=rows_html />
            </table>
        </section>
    }
    .to_html()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::calendar::HtmlCalendar;

    fn title(lesson: LessonId) -> String {
        format!("Lesson {lesson}")
    }

    #[test]
    fn test_week_table_spans_blocks() {
        let blocks = vec![LessonBlock {
            day: 2,
            lesson: LessonId(5),
            start: 1,
            end: 3,
        }];
        let data = WeekView {
            student_id: 1,
            slots_per_day: 6,
            blocks: &blocks,
            error: None,
        };
        let html = render_week_table(&data, &HtmlCalendar::default(), &title);
        assert!(html.contains("Lesson 5"));
        assert!(html.contains("rowspan=\"3\""));
        // 6 rows × 7 days, minus the 2 slots hidden under the rowspan
        assert_eq!(html.matches("class=\"slot").count(), 40);
        assert_eq!(html.matches("<td").count(), 40 + 6);
    }

    #[test]
    fn test_page_shows_error() {
        let data = WeekView {
            student_id: 9,
            slots_per_day: 4,
            blocks: &[],
            error: Some("backend unreachable".into()),
        };
        let html = render_page(&data, &HtmlCalendar::default(), title);
        assert!(html.contains("backend unreachable"));
        assert!(html.contains("Weekly plan for student 9"));
    }

    #[test]
    fn test_summary_lists_lessons() {
        let blocks = vec![
            LessonBlock { day: 0, lesson: LessonId(1), start: 0, end: 1 },
            LessonBlock { day: 1, lesson: LessonId(1), start: 0, end: 0 },
        ];
        let html = render_summary(&blocks, &title);
        assert!(html.contains("Total: 1 h 30 min"));
        assert!(html.contains("Lesson 1"));
    }
}
