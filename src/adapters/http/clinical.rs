use super::{segment, ApiClient};
use crate::domain::clinical::{Appointment, Consultation};
use crate::domain::ports::ClinicalRepository;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Method;

#[async_trait]
impl ClinicalRepository for ApiClient {
    async fn list_appointments(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Appointment>> {
        let mut query = Vec::new();
        if let Some(from) = from {
            query.push(("desde", from.to_string()));
        }
        if let Some(to) = to {
            query.push(("hasta", to.to_string()));
        }
        self.get("/citas", &query).await
    }

    async fn pet_history(&self, pet_id: &str) -> Result<Vec<Consultation>> {
        self.get(&format!("/mascotas/{}/consultas", segment(pet_id)), &[])
            .await
    }

    async fn start_consultation(&self, appointment_id: &str) -> Result<Consultation> {
        self.send(
            Method::POST,
            &format!("/citas/{}/consulta", segment(appointment_id)),
            &serde_json::json!({}),
        )
        .await
    }

    async fn get_consultation(&self, id: &str) -> Result<Consultation> {
        self.get(&format!("/consultas/{}", segment(id)), &[]).await
    }

    async fn save_consultation(&self, consultation: &Consultation) -> Result<Consultation> {
        self.send(
            Method::PUT,
            &format!("/consultas/{}", segment(&consultation.id)),
            consultation,
        )
        .await
    }

    async fn finish_consultation(&self, consultation: &Consultation) -> Result<Consultation> {
        self.send(
            Method::POST,
            &format!("/consultas/{}/finalizar", segment(&consultation.id)),
            consultation,
        )
        .await
    }
}
