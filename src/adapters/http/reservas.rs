use super::{segment, ApiClient};
use crate::domain::booking::{CancelReservaRequest, NewReserva, Reserva, ReservaStatus};
use crate::domain::ports::ReservaRepository;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Method;

#[async_trait]
impl ReservaRepository for ApiClient {
    async fn list_reservas(&self, status: Option<ReservaStatus>) -> Result<Vec<Reserva>> {
        let query: Vec<(&str, String)> = status
            .map(|s| vec![("estado", s.to_string())])
            .unwrap_or_default();
        self.get("/reservas", &query).await
    }

    async fn book_slot(&self, reserva: &NewReserva) -> Result<Reserva> {
        self.send(Method::POST, "/reservas", reserva).await
    }

    async fn confirm(&self, id: &str) -> Result<()> {
        self.execute::<()>(Method::POST, &format!("/reservas/{}/confirmar", segment(id)), None)
            .await
    }

    async fn cancel(&self, id: &str, request: &CancelReservaRequest) -> Result<()> {
        self.execute(
            Method::POST,
            &format!("/reservas/{}/cancelar", segment(id)),
            Some(request),
        )
        .await
    }

    async fn complete(&self, id: &str) -> Result<()> {
        self.execute::<()>(Method::POST, &format!("/reservas/{}/realizar", segment(id)), None)
            .await
    }
}
