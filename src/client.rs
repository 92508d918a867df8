use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use tracing::debug;

use crate::error::{PlannerError, PlannerResult};
use crate::models::{ApiConfig, ApiResponse, CalendarEvent, ScheduleRequest};
use crate::time_slots;

const CLIENT_UA: &str = concat!("yks-planner/", env!("CARGO_PKG_VERSION"));

/// Remote source of truth for a student's weekly plan.
#[allow(async_fn_in_trait)]
pub trait ScheduleBackend {
    async fn fetch_events(&self) -> PlannerResult<Vec<CalendarEvent>>;
    async fn send(&self, request: &ScheduleRequest) -> PlannerResult<ApiResponse>;
}

pub struct PlanClient {
    client: Client,
    endpoint: String,
}

impl PlanClient {
    pub fn new(api: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .default_headers(default_headers())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint_url(api),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch the events of the week containing `around`.
    pub async fn get_events(&self, around: NaiveDate) -> Result<Vec<CalendarEvent>> {
        let monday = time_slots::week_monday(around);
        let url = week_query_url(&self.endpoint, monday);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to fetch schedule events")?;

        let status = resp.status();
        let text = resp.text().await.context("Failed to read events response")?;
        debug!("Events response (status {}): {}", status, text);

        if !status.is_success() {
            anyhow::bail!("Event source returned status {status}: {text}");
        }

        let events: Vec<CalendarEvent> = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse events (status {status}): {text}"))?;
        debug!("Fetched {} events", events.len());
        Ok(events)
    }

    /// POST a mutation. A body with `status: "error"` is still returned as a
    /// response; only transport and parse failures are errors here.
    pub async fn post(&self, request: &ScheduleRequest) -> Result<ApiResponse> {
        debug!("Sending {:?}", request);
        let resp = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .context("Failed to send schedule request")?;

        let status = resp.status();
        let text = resp.text().await.context("Failed to read schedule response")?;
        debug!("Schedule response (status {}): {}", status, text);

        let body: ApiResponse = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse schedule response (status {status}): {text}"))?;
        Ok(body)
    }
}

impl ScheduleBackend for PlanClient {
    async fn fetch_events(&self) -> PlannerResult<Vec<CalendarEvent>> {
        self.get_events(time_slots::today())
            .await
            .map_err(|e| PlannerError::Network(format!("{e:#}")))
    }

    async fn send(&self, request: &ScheduleRequest) -> PlannerResult<ApiResponse> {
        self.post(request)
            .await
            .map_err(|e| PlannerError::Network(format!("{e:#}")))
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_UA));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert("X-Requested-With", HeaderValue::from_static("XMLHttpRequest"));
    headers
}

fn endpoint_url(api: &ApiConfig) -> String {
    let path = api
        .schedule_path
        .replace("{student_id}", &api.student_id.to_string());
    format!(
        "{}/{}",
        api.base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn week_query_url(endpoint: &str, monday: NaiveDate) -> String {
    let start = format!("{}T00:00:00", monday.format("%Y-%m-%d"));
    let sunday = time_slots::date_for_day(monday, 6);
    let end = format!("{}T00:00:00", (sunday + Duration::days(1)).format("%Y-%m-%d"));
    format!(
        "{}?start={}&end={}",
        endpoint,
        urlencoding::encode(&start),
        urlencoding::encode(&end)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base: &str) -> ApiConfig {
        ApiConfig {
            base_url: base.to_string(),
            student_id: 42,
            schedule_path: "/calisma-programi/{student_id}/api/haftalik-plan".to_string(),
        }
    }

    #[test]
    fn test_endpoint_url() {
        assert_eq!(
            endpoint_url(&api("http://localhost:5000/")),
            "http://localhost:5000/calisma-programi/42/api/haftalik-plan"
        );
    }

    #[test]
    fn test_week_query_url() {
        let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(
            week_query_url("http://h/plan", monday),
            "http://h/plan?start=2024-01-01T00%3A00%3A00&end=2024-01-08T00%3A00%3A00"
        );
    }
}
