use std::collections::BTreeMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use tracing::warn;

use super::calendar::{EventRenderer, HtmlCalendar};
use super::views::{render_page, WeekView};
use super::AppState;
use crate::grid::{LessonBlock, LessonId};
use crate::session::{events_to_grid, LoadedSchedule};
use crate::time_slots;

async fn load_week(state: &AppState) -> anyhow::Result<LoadedSchedule> {
    let events = state.client.get_events(time_slots::today()).await?;
    let grid = &state.config.grid;
    Ok(events_to_grid(&events, grid.slots_per_day, grid.max_block_slots()))
}

pub(crate) async fn week_page(State(state): State<AppState>) -> Html<String> {
    let cfg = &state.config;
    let (loaded, error) = match load_week(&state).await {
        Ok(loaded) => (Some(loaded), None),
        Err(e) => {
            warn!("Could not load schedule: {:#}", e);
            (None, Some(format!("Could not load schedule: {e}")))
        }
    };

    let blocks = loaded
        .as_ref()
        .map(|l| l.grid.compute_blocks())
        .unwrap_or_default();
    let mut renderer = HtmlCalendar::new(
        loaded
            .as_ref()
            .map(|l| l.color_indices.clone())
            .unwrap_or_default(),
    );
    if let Some(l) = &loaded {
        for (lesson, color) in &l.colors {
            renderer.set_event_color(*lesson, color.clone());
        }
    }
    let title_of = |lesson: LessonId| {
        loaded
            .as_ref()
            .and_then(|l| l.titles.get(&lesson).cloned())
            .or_else(|| cfg.lesson_name(lesson).map(str::to_string))
            .unwrap_or_else(|| format!("Lesson {lesson}"))
    };

    let data = WeekView {
        student_id: cfg.api.student_id,
        slots_per_day: cfg.grid.slots_per_day,
        blocks: &blocks,
        error,
    };
    Html(render_page(&data, &renderer, title_of))
}

pub(crate) async fn blocks_json(
    State(state): State<AppState>,
) -> Result<Json<Vec<LessonBlock>>, (StatusCode, String)> {
    let loaded = load_week(&state)
        .await
        .map_err(|e| (StatusCode::BAD_GATEWAY, format!("{e:#}")))?;
    Ok(Json(loaded.grid.compute_blocks()))
}

pub(crate) async fn wire_map_json(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, String>>, (StatusCode, String)> {
    let loaded = load_week(&state)
        .await
        .map_err(|e| (StatusCode::BAD_GATEWAY, format!("{e:#}")))?;
    Ok(Json(loaded.grid.to_wire_map()))
}
