use crate::core::{ListState, OnFailure};
use crate::domain::booking::{Oferta, OfertaStatus, Reserva};
use crate::domain::ports::MarketplaceRepository;
use crate::utils::error::{ClinicError, Result};

/// Offers received on one of the client's solicitudes.
pub struct OfertasViewModel<M: MarketplaceRepository> {
    repo: M,
    policy: OnFailure,
    solicitud_id: Option<String>,
    pub state: ListState<Oferta>,
    pub reserva: Option<Reserva>,
}

impl<M: MarketplaceRepository> OfertasViewModel<M> {
    pub fn new(repo: M) -> Self {
        Self {
            repo,
            policy: OnFailure::default(),
            solicitud_id: None,
            state: ListState::new(),
            reserva: None,
        }
    }

    pub fn with_policy(mut self, policy: OnFailure) -> Self {
        self.policy = policy;
        self
    }

    pub async fn load(&mut self, solicitud_id: &str) -> Result<()> {
        self.solicitud_id = Some(solicitud_id.to_string());
        self.refresh().await
    }

    pub async fn refresh(&mut self) -> Result<()> {
        let Some(solicitud_id) = self.solicitud_id.clone() else {
            return Ok(());
        };

        self.state.loading = true;
        match self.repo.offers_for(&solicitud_id).await {
            Ok(items) => {
                tracing::debug!("Loaded {} ofertas for {}", items.len(), solicitud_id);
                self.state.replace(items);
                Ok(())
            }
            Err(e) => {
                self.state.fail(&e);
                Err(e)
            }
        }
    }

    /// Accepts `oferta_id` at one of its proposed times. The sibling offers
    /// are shown as rejected right away.
    pub async fn accept(&mut self, oferta_id: &str, option: usize) -> Result<Reserva> {
        let chosen_time = match self.chosen_time(oferta_id, option) {
            Ok(at) => at,
            Err(e) => {
                self.state.fail(&e);
                return Err(e);
            }
        };

        let patch = self.state.patch_each(|oferta| {
            if oferta.id == oferta_id {
                oferta.status = OfertaStatus::Aceptada;
                true
            } else if oferta.status == OfertaStatus::Pendiente {
                oferta.status = OfertaStatus::Rechazada;
                true
            } else {
                false
            }
        });

        let outcome = self.repo.accept_offer(oferta_id, chosen_time).await;
        let reserva = self
            .state
            .settle(patch, self.policy, outcome, "Oferta aceptada, reserva creada")?;

        tracing::info!("Oferta {} accepted -> reserva {}", oferta_id, reserva.id);
        self.reserva = Some(reserva.clone());
        if let Err(e) = self.refresh().await {
            tracing::warn!("Reload after action failed: {}", e);
        }
        Ok(reserva)
    }

    fn chosen_time(&self, oferta_id: &str, option: usize) -> Result<chrono::DateTime<chrono::Utc>> {
        let oferta = self
            .state
            .find(|o| o.id == oferta_id)
            .ok_or_else(|| ClinicError::NotFound {
                resource: "la oferta".to_string(),
                id: oferta_id.to_string(),
            })?;

        if oferta.status != OfertaStatus::Pendiente {
            return Err(ClinicError::validation("Esta oferta ya no está disponible."));
        }

        oferta
            .time_options
            .get(option)
            .copied()
            .ok_or_else(|| ClinicError::validation("Elige uno de los horarios propuestos."))
    }
}
