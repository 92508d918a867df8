use serde::{Deserialize, Serialize};

use crate::grid::LessonId;
use crate::time_slots::{DEFAULT_SLOTS_PER_DAY, SLOT_MINUTES};

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

impl Config {
    pub fn lesson_name(&self, id: LessonId) -> Option<&str> {
        self.lessons
            .iter()
            .find(|l| l.id == id)
            .map(|l| l.name.as_str())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub student_id: u64,
    /// Path template; `{student_id}` is substituted.
    #[serde(default = "default_schedule_path")]
    pub schedule_path: String,
}

fn default_schedule_path() -> String {
    "/calisma-programi/{student_id}/api/haftalik-plan".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GridConfig {
    #[serde(default = "default_slots_per_day")]
    pub slots_per_day: usize,
    #[serde(default = "default_max_block_minutes")]
    pub max_block_minutes: u32,
}

fn default_slots_per_day() -> usize {
    DEFAULT_SLOTS_PER_DAY
}

fn default_max_block_minutes() -> u32 {
    120
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            slots_per_day: default_slots_per_day(),
            max_block_minutes: default_max_block_minutes(),
        }
    }
}

impl GridConfig {
    pub fn max_block_slots(&self) -> Option<usize> {
        match self.max_block_minutes / SLOT_MINUTES {
            0 => None,
            n => Some(n as usize),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Lesson {
    pub id: LessonId,
    pub name: String,
}

/// Mutation sent to the per-student schedule endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScheduleRequest {
    Add {
        #[serde(rename = "ders_id")]
        lesson: LessonId,
        #[serde(rename = "gun")]
        day: u8,
        start: String,
        end: String,
    },
    Update {
        id: u64,
        #[serde(rename = "gun")]
        day: u8,
        start: String,
        end: String,
    },
    Delete {
        id: u64,
    },
    Clear,
    AutoSchedule {
        #[serde(rename = "gunler")]
        days: Vec<u8>,
        #[serde(rename = "baslangic_saat")]
        start: String,
        #[serde(rename = "bitis_saat")]
        end: String,
        #[serde(rename = "ders_suresi")]
        lesson_minutes: u32,
        #[serde(rename = "mola_suresi")]
        break_minutes: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    pub status: ApiStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status == ApiStatus::Success
    }
}

/// Calendar-shaped record returned by the event source.
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarEvent {
    pub id: serde_json::Value,
    #[serde(default)]
    pub title: Option<String>,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub ders_id: Option<LessonId>,
    #[serde(default, rename = "extendedProps")]
    pub extended_props: EventProps,
    #[serde(default, rename = "backgroundColor")]
    pub background_color: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventProps {
    #[serde(default)]
    pub ders_id: Option<LessonId>,
    #[serde(default)]
    pub gun: Option<u8>,
    #[serde(default)]
    pub renk_index: Option<u32>,
    #[serde(default)]
    pub baslangic_saat: Option<String>,
    #[serde(default)]
    pub bitis_saat: Option<String>,
}

impl CalendarEvent {
    pub fn lesson(&self) -> Option<LessonId> {
        self.ders_id.or(self.extended_props.ders_id)
    }

    /// Numeric server id. Ids arrive as `"ders_12"`, `"12"` or `12`.
    pub fn server_id(&self) -> Option<u64> {
        match &self.id {
            serde_json::Value::Number(n) => n.as_u64(),
            serde_json::Value::String(s) => s.trim_start_matches("ders_").parse().ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_request_shape() {
        let req = ScheduleRequest::Add {
            lesson: LessonId(4),
            day: 2,
            start: "09:00".into(),
            end: "10:30".into(),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"action": "add", "ders_id": 4, "gun": 2, "start": "09:00", "end": "10:30"})
        );
    }

    #[test]
    fn test_clear_and_auto_schedule_shape() {
        assert_eq!(
            serde_json::to_value(ScheduleRequest::Clear).unwrap(),
            json!({"action": "clear"})
        );
        let req = ScheduleRequest::AutoSchedule {
            days: vec![0, 2],
            start: "09:00".into(),
            end: "12:00".into(),
            lesson_minutes: 45,
            break_minutes: 15,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "action": "auto_schedule",
                "gunler": [0, 2],
                "baslangic_saat": "09:00",
                "bitis_saat": "12:00",
                "ders_suresi": 45,
                "mola_suresi": 15
            })
        );
    }

    #[test]
    fn test_parse_event() {
        let event: CalendarEvent = serde_json::from_value(json!({
            "id": "ders_12",
            "title": "Matematik",
            "start": "2024-01-01T09:00:00",
            "end": "2024-01-01T10:00:00",
            "className": "bg-info",
            "extendedProps": {"ders_id": 3, "gun": 0, "renk_index": 3}
        }))
        .unwrap();
        assert_eq!(event.server_id(), Some(12));
        assert_eq!(event.lesson(), Some(LessonId(3)));
        assert_eq!(event.extended_props.renk_index, Some(3));
    }

    #[test]
    fn test_parse_response() {
        let resp: ApiResponse =
            serde_json::from_value(json!({"status": "error", "message": "Geçersiz"})).unwrap();
        assert!(!resp.is_success());
        assert_eq!(resp.message.as_deref(), Some("Geçersiz"));
    }

    #[test]
    fn test_grid_config_defaults() {
        let grid = GridConfig::default();
        assert_eq!(grid.slots_per_day, 35);
        assert_eq!(grid.max_block_slots(), Some(4));
        let uncapped = GridConfig {
            max_block_minutes: 0,
            ..GridConfig::default()
        };
        assert_eq!(uncapped.max_block_slots(), None);
    }
}
