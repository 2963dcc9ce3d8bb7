use super::ApiClient;
use crate::domain::ports::ScheduleRepository;
use crate::domain::schedule::DaySchedule;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Method;

#[async_trait]
impl ScheduleRepository for ApiClient {
    async fn week(&self, from: NaiveDate) -> Result<Vec<DaySchedule>> {
        self.get("/horario", &[("desde", from.to_string())]).await
    }

    async fn toggle_day(&self, date: NaiveDate) -> Result<DaySchedule> {
        self.send(
            Method::POST,
            &format!("/horario/{}/toggle", date),
            &serde_json::json!({}),
        )
        .await
    }
}
