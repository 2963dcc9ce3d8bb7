use super::{system_clock, Clock};
use crate::core::{ListState, OnFailure};
use crate::domain::booking::{NewOferta, Oferta, OfertaStatus, Solicitud};
use crate::domain::ports::{MarketplaceRepository, NearbyFilter};
use crate::utils::error::{ClinicError, Result};
use std::collections::HashSet;

/// Veterinarian side of the marketplace: open requests and own offers.
pub struct MarketplaceViewModel<M: MarketplaceRepository> {
    repo: M,
    policy: OnFailure,
    clock: Clock,
    near: Option<NearbyFilter>,
    pub state: ListState<Solicitud>,
    pub offers: ListState<Oferta>,
}

impl<M: MarketplaceRepository> MarketplaceViewModel<M> {
    pub fn new(repo: M) -> Self {
        Self {
            repo,
            policy: OnFailure::default(),
            clock: system_clock,
            near: None,
            state: ListState::new(),
            offers: ListState::new(),
        }
    }

    pub fn with_policy(mut self, policy: OnFailure) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub async fn load(&mut self, near: Option<NearbyFilter>) -> Result<()> {
        if let Some(near) = near {
            if let Err(e) = crate::utils::validation::validate_coordinates(near.latitude, near.longitude)
            {
                self.state.fail(&e);
                return Err(e);
            }
        }
        self.near = near;
        self.refresh().await
    }

    /// Open requests minus expired ones and those this vet already bid on.
    pub async fn refresh(&mut self) -> Result<()> {
        self.state.loading = true;

        let offers = match self.repo.my_offers().await {
            Ok(offers) => offers,
            Err(e) => {
                self.state.fail(&e);
                return Err(e);
            }
        };
        let solicitudes = match self.repo.open_solicitudes(self.near).await {
            Ok(items) => items,
            Err(e) => {
                self.state.fail(&e);
                return Err(e);
            }
        };

        let now = (self.clock)();
        let offered: HashSet<&str> = offers
            .iter()
            .filter(|o| o.status.is_live())
            .map(|o| o.solicitud_id.as_str())
            .collect();
        let visible: Vec<Solicitud> = solicitudes
            .into_iter()
            .filter(|s| s.is_visible_to_vets(now) && !offered.contains(s.id.as_str()))
            .collect();

        tracing::debug!(
            "Marketplace: {} visible solicitudes, {} own offers",
            visible.len(),
            offers.len()
        );
        self.state.replace(visible);
        self.offers.replace(offers);
        Ok(())
    }

    pub async fn send_offer(&mut self, solicitud_id: &str, oferta: NewOferta) -> Result<Oferta> {
        if let Err(e) = oferta.validate_for((self.clock)()) {
            self.state.fail(&e);
            return Err(e);
        }

        // offered-on requests leave the vet's list
        let patch = self.state.remove(|s| s.id == solicitud_id);
        let outcome = self.repo.create_offer(solicitud_id, &oferta).await;
        let created = self
            .state
            .settle(patch, self.policy, outcome, "Oferta enviada")?;

        tracing::info!("Oferta {} sent for solicitud {}", created.id, solicitud_id);
        self.offers.insert_front(created.clone());
        self.reload_after_action().await;
        Ok(created)
    }

    pub async fn withdraw_offer(&mut self, oferta_id: &str) -> Result<()> {
        let status = self.offers.find(|o| o.id == oferta_id).map(|o| o.status);
        if let Some(status) = status {
            if status != OfertaStatus::Pendiente {
                let err = ClinicError::validation("Solo se pueden retirar ofertas pendientes.");
                self.offers.fail(&err);
                return Err(err);
            }
        }

        let patch = self
            .offers
            .patch(|o| o.id == oferta_id, |o| o.status = OfertaStatus::Retirada);
        let outcome = self.repo.withdraw_offer(oferta_id).await;
        self.offers
            .settle(patch, self.policy, outcome, "Oferta retirada")?;

        self.reload_after_action().await;
        Ok(())
    }

    async fn reload_after_action(&mut self) {
        if let Err(e) = self.refresh().await {
            tracing::warn!("Reload after action failed: {}", e);
        }
    }
}
