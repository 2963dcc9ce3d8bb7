pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{AppConfig, TomlConfig};

pub use adapters::{ApiClient, LocalStorage};
pub use app::render::{render, OutputFormat, Render};
pub use app::viewmodels::{
    AppointmentsViewModel, ConsultationViewModel, InventoryViewModel, MarketplaceViewModel,
    OfertasViewModel, PetsViewModel, ReservasViewModel, ScheduleViewModel, SolicitudesViewModel,
};
pub use core::{ListState, Notice, OnFailure, Session, SessionStore};
pub use utils::error::{ClinicError, Result};
