use super::{segment, ApiClient};
use crate::domain::booking::{AcceptOfertaRequest, NewOferta, NewSolicitud, Oferta, Reserva, Solicitud};
use crate::domain::ports::{MarketplaceRepository, NearbyFilter};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;

#[async_trait]
impl MarketplaceRepository for ApiClient {
    async fn my_solicitudes(&self) -> Result<Vec<Solicitud>> {
        self.get("/solicitudes/mias", &[]).await
    }

    async fn open_solicitudes(&self, near: Option<NearbyFilter>) -> Result<Vec<Solicitud>> {
        let query = match near {
            Some(near) => vec![
                ("lat", near.latitude.to_string()),
                ("lng", near.longitude.to_string()),
                ("radioKm", near.radius_km.to_string()),
            ],
            None => Vec::new(),
        };
        self.get("/solicitudes/abiertas", &query).await
    }

    async fn create_solicitud(&self, solicitud: &NewSolicitud) -> Result<Solicitud> {
        self.send(Method::POST, "/solicitudes", solicitud).await
    }

    async fn withdraw_solicitud(&self, id: &str) -> Result<()> {
        self.execute::<()>(Method::POST, &format!("/solicitudes/{}/retirar", segment(id)), None)
            .await
    }

    async fn offers_for(&self, solicitud_id: &str) -> Result<Vec<Oferta>> {
        self.get(&format!("/solicitudes/{}/ofertas", segment(solicitud_id)), &[])
            .await
    }

    async fn my_offers(&self) -> Result<Vec<Oferta>> {
        self.get("/ofertas/mias", &[]).await
    }

    async fn create_offer(&self, solicitud_id: &str, oferta: &NewOferta) -> Result<Oferta> {
        self.send(
            Method::POST,
            &format!("/solicitudes/{}/ofertas", segment(solicitud_id)),
            oferta,
        )
        .await
    }

    async fn accept_offer(&self, id: &str, chosen_time: DateTime<Utc>) -> Result<Reserva> {
        self.send(
            Method::POST,
            &format!("/ofertas/{}/aceptar", segment(id)),
            &AcceptOfertaRequest { chosen_time },
        )
        .await
    }

    async fn withdraw_offer(&self, id: &str) -> Result<()> {
        self.execute::<()>(Method::POST, &format!("/ofertas/{}/retirar", segment(id)), None)
            .await
    }
}
