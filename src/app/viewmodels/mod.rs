//! State holders behind each screen. Every action updates `state` (items and
//! a transient notice) and also hands the outcome back to the caller.

mod appointments;
mod consultation;
mod inventory;
mod marketplace;
mod ofertas;
mod pets;
mod reservas;
mod schedule;
mod solicitudes;

pub use appointments::AppointmentsViewModel;
pub use consultation::ConsultationViewModel;
pub use inventory::InventoryViewModel;
pub use marketplace::MarketplaceViewModel;
pub use ofertas::OfertasViewModel;
pub use pets::PetsViewModel;
pub use reservas::ReservasViewModel;
pub use schedule::ScheduleViewModel;
pub use solicitudes::SolicitudesViewModel;

use chrono::{DateTime, Utc};

/// Source of "now"; swapped out in tests.
pub type Clock = fn() -> DateTime<Utc>;

pub(crate) fn system_clock() -> DateTime<Utc> {
    Utc::now()
}
