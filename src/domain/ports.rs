use crate::app::render::OutputFormat;
use crate::core::optimistic::OnFailure;
use crate::domain::booking::{
    CancelReservaRequest, NewOferta, NewReserva, NewSolicitud, Oferta, Reserva, ReservaStatus,
    Solicitud,
};
use crate::domain::clinical::{Appointment, Consultation};
use crate::domain::inventory::{InventoryItem, InventoryKind, NewInventoryItem};
use crate::domain::model::{NewPet, Pet, Service};
use crate::domain::schedule::DaySchedule;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn remove_file(&self, path: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn on_failure(&self) -> OnFailure;
    fn output_format(&self) -> OutputFormat;
}

/// Radius search around a point, used by the vet marketplace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyFilter {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
}

#[async_trait]
pub trait PetRepository: Send + Sync {
    async fn list_pets(&self) -> Result<Vec<Pet>>;
    async fn get_pet(&self, id: &str) -> Result<Pet>;
    async fn create_pet(&self, pet: &NewPet) -> Result<Pet>;
}

#[async_trait]
pub trait ServiceCatalog: Send + Sync {
    async fn list_services(&self) -> Result<Vec<Service>>;
}

#[async_trait]
pub trait MarketplaceRepository: Send + Sync {
    async fn my_solicitudes(&self) -> Result<Vec<Solicitud>>;
    async fn open_solicitudes(&self, near: Option<NearbyFilter>) -> Result<Vec<Solicitud>>;
    async fn create_solicitud(&self, solicitud: &NewSolicitud) -> Result<Solicitud>;
    async fn withdraw_solicitud(&self, id: &str) -> Result<()>;
    async fn offers_for(&self, solicitud_id: &str) -> Result<Vec<Oferta>>;
    async fn my_offers(&self) -> Result<Vec<Oferta>>;
    async fn create_offer(&self, solicitud_id: &str, oferta: &NewOferta) -> Result<Oferta>;
    async fn accept_offer(&self, id: &str, chosen_time: DateTime<Utc>) -> Result<Reserva>;
    async fn withdraw_offer(&self, id: &str) -> Result<()>;
}

#[async_trait]
pub trait ReservaRepository: Send + Sync {
    async fn list_reservas(&self, status: Option<ReservaStatus>) -> Result<Vec<Reserva>>;
    async fn book_slot(&self, reserva: &NewReserva) -> Result<Reserva>;
    async fn confirm(&self, id: &str) -> Result<()>;
    async fn cancel(&self, id: &str, request: &CancelReservaRequest) -> Result<()>;
    async fn complete(&self, id: &str) -> Result<()>;
}

#[async_trait]
pub trait ClinicalRepository: Send + Sync {
    async fn list_appointments(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Appointment>>;
    async fn pet_history(&self, pet_id: &str) -> Result<Vec<Consultation>>;
    async fn start_consultation(&self, appointment_id: &str) -> Result<Consultation>;
    async fn get_consultation(&self, id: &str) -> Result<Consultation>;
    async fn save_consultation(&self, consultation: &Consultation) -> Result<Consultation>;
    /// Persists the whole record and closes it in one write.
    async fn finish_consultation(&self, consultation: &Consultation) -> Result<Consultation>;
}

#[async_trait]
pub trait InventoryRepository: Send + Sync {
    async fn list_items(&self, kind: Option<InventoryKind>) -> Result<Vec<InventoryItem>>;
    async fn create_item(&self, item: &NewInventoryItem) -> Result<InventoryItem>;
    async fn adjust_stock(&self, id: &str, delta: i64) -> Result<InventoryItem>;
}

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn week(&self, from: NaiveDate) -> Result<Vec<DaySchedule>>;
    async fn toggle_day(&self, date: NaiveDate) -> Result<DaySchedule>;
}
