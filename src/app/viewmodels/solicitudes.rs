use super::{system_clock, Clock};
use crate::core::{ListState, OnFailure, Session};
use crate::domain::booking::{NewSolicitud, Solicitud, SolicitudStatus};
use crate::domain::model::Service;
use crate::domain::ports::{MarketplaceRepository, ServiceCatalog};
use crate::utils::error::{ClinicError, Result};

/// Client side of the marketplace: the owner's own requests.
pub struct SolicitudesViewModel<M: MarketplaceRepository, C: ServiceCatalog> {
    repo: M,
    catalog: C,
    client_id: String,
    policy: OnFailure,
    clock: Clock,
    local_seq: u32,
    pub services: Vec<Service>,
    pub state: ListState<Solicitud>,
}

impl<M: MarketplaceRepository, C: ServiceCatalog> SolicitudesViewModel<M, C> {
    pub fn new(repo: M, catalog: C, session: &Session) -> Self {
        Self {
            repo,
            catalog,
            client_id: session.user_id.clone(),
            policy: OnFailure::default(),
            clock: system_clock,
            local_seq: 0,
            services: Vec::new(),
            state: ListState::new(),
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

    pub async fn load(&mut self) -> Result<()> {
        self.state.loading = true;
        match self.repo.my_solicitudes().await {
            Ok(items) => {
                tracing::debug!("Loaded {} solicitudes", items.len());
                self.state.replace(items);
                Ok(())
            }
            Err(e) => {
                self.state.fail(&e);
                Err(e)
            }
        }
    }

    /// Services offered in the request form.
    pub async fn load_services(&mut self) -> Result<()> {
        match self.catalog.list_services().await {
            Ok(services) => {
                self.services = services;
                Ok(())
            }
            Err(e) => {
                self.state.fail(&e);
                Err(e)
            }
        }
    }

    pub async fn submit(&mut self, solicitud: NewSolicitud) -> Result<Solicitud> {
        let now = (self.clock)();
        if let Err(e) = self.check(&solicitud, now) {
            self.state.fail(&e);
            return Err(e);
        }

        self.local_seq += 1;
        let pending = solicitud.to_pending(
            format!("local-{}", self.local_seq),
            self.client_id.clone(),
            now,
        );
        let patch = self.state.push_front(pending);

        let outcome = self.repo.create_solicitud(&solicitud).await;
        let created = self
            .state
            .settle(patch, self.policy, outcome, "Solicitud publicada")?;

        tracing::info!("Solicitud {} published", created.id);
        self.reload_after_action().await;
        Ok(created)
    }

    pub async fn withdraw(&mut self, id: &str) -> Result<()> {
        let blocked = self
            .state
            .find(|s| s.id == id)
            .is_some_and(|s| !s.can_withdraw());
        if blocked {
            let err = ClinicError::validation("Solo se pueden retirar solicitudes abiertas.");
            self.state.fail(&err);
            return Err(err);
        }

        let patch = self
            .state
            .patch(|s| s.id == id, |s| s.status = SolicitudStatus::Retirada);
        let outcome = self.repo.withdraw_solicitud(id).await;
        self.state
            .settle(patch, self.policy, outcome, "Solicitud retirada")?;

        self.reload_after_action().await;
        Ok(())
    }

    fn check(&self, solicitud: &NewSolicitud, now: chrono::DateTime<chrono::Utc>) -> Result<()> {
        solicitud.validate_for(now.date_naive())?;

        let service = solicitud
            .service_id
            .as_ref()
            .and_then(|id| self.services.iter().find(|s| &s.id == id));
        if let Some(service) = service {
            if !service.supports(solicitud.mode) {
                return Err(ClinicError::validation(format!(
                    "{} no está disponible en esa modalidad.",
                    service.name
                )));
            }
        }
        Ok(())
    }

    async fn reload_after_action(&mut self) {
        if let Err(e) = self.load().await {
            tracing::warn!("Reload after action failed: {}", e);
        }
    }
}
