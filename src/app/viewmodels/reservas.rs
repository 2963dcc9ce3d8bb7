use super::{system_clock, Clock};
use crate::core::{ListState, OnFailure, Patch};
use crate::domain::booking::{CancelReservaRequest, NewReserva, Reserva, ReservaStatus};
use crate::domain::model::Role;
use crate::domain::ports::ReservaRepository;
use crate::utils::error::{ClinicError, Result};

pub struct ReservasViewModel<R: ReservaRepository> {
    repo: R,
    role: Role,
    policy: OnFailure,
    filter: Option<ReservaStatus>,
    clock: Clock,
    pub state: ListState<Reserva>,
}

impl<R: ReservaRepository> ReservasViewModel<R> {
    pub fn new(repo: R, role: Role) -> Self {
        Self {
            repo,
            role,
            policy: OnFailure::default(),
            filter: None,
            clock: system_clock,
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

    pub async fn load(&mut self, filter: Option<ReservaStatus>) -> Result<()> {
        self.filter = filter;
        self.refresh().await
    }

    pub async fn refresh(&mut self) -> Result<()> {
        self.state.loading = true;
        match self.repo.list_reservas(self.filter).await {
            Ok(items) => {
                tracing::debug!("Loaded {} reservas", items.len());
                self.state.replace(items);
                Ok(())
            }
            Err(e) => {
                self.state.fail(&e);
                Err(e)
            }
        }
    }

    pub async fn confirm(&mut self, id: &str) -> Result<()> {
        self.guard(id, ReservaStatus::Confirmada)?;

        let patch = self
            .state
            .patch(|r| r.id == id, |r| r.status = ReservaStatus::Confirmada);
        let outcome = self.repo.confirm(id).await;
        self.state
            .settle(patch, self.policy, outcome, "Reserva confirmada")?;

        self.reload_after_action().await;
        Ok(())
    }

    /// Cancels on behalf of the current role.
    pub async fn cancel(&mut self, id: &str, reason: Option<String>) -> Result<()> {
        let next = ReservaStatus::cancelled_by(self.role);
        self.guard(id, next)?;

        let request = CancelReservaRequest {
            reason: reason.clone(),
            cancelled_by: self.role,
        };
        let patch = self.state.patch(
            |r| r.id == id,
            |r| {
                r.status = next;
                r.cancel_reason = reason;
            },
        );
        let outcome = self.repo.cancel(id, &request).await;
        self.state
            .settle(patch, self.policy, outcome, "Reserva cancelada")?;

        self.reload_after_action().await;
        Ok(())
    }

    pub async fn complete(&mut self, id: &str) -> Result<()> {
        self.guard(id, ReservaStatus::Realizada)?;

        let patch = self
            .state
            .patch(|r| r.id == id, |r| r.status = ReservaStatus::Realizada);
        let outcome = self.repo.complete(id).await;
        self.state
            .settle(patch, self.policy, outcome, "Reserva marcada como realizada")?;

        self.reload_after_action().await;
        Ok(())
    }

    /// Books a clinic slot directly, without going through the marketplace.
    pub async fn book_slot(&mut self, reserva: NewReserva) -> Result<Reserva> {
        if reserva.scheduled_at <= (self.clock)() {
            let err = ClinicError::validation("El horario elegido ya pasó.");
            self.state.fail(&err);
            return Err(err);
        }

        let outcome = self.repo.book_slot(&reserva).await;
        let created = self
            .state
            .settle(Patch::none(), self.policy, outcome, "Reserva creada")?;

        self.reload_after_action().await;
        Ok(created)
    }

    fn guard(&mut self, id: &str, next: ReservaStatus) -> Result<()> {
        let Some(current) = self.state.find(|r| r.id == id).map(|r| r.status) else {
            return Ok(());
        };
        if let Err(e) = current.check_transition(next) {
            self.state.fail(&e);
            return Err(e);
        }
        Ok(())
    }

    async fn reload_after_action(&mut self) {
        if let Err(e) = self.refresh().await {
            tracing::warn!("Reload after action failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Notice;
    use crate::domain::model::AttentionMode;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct MockRepo {
        server: Arc<Mutex<Vec<Reserva>>>,
        calls: Arc<Mutex<Vec<String>>>,
        fail_next: Arc<Mutex<bool>>,
    }

    impl MockRepo {
        fn with(items: Vec<Reserva>) -> Self {
            let repo = Self::default();
            *repo.server.lock().unwrap() = items;
            repo
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) -> Result<()> {
            self.calls.lock().unwrap().push(call);
            if std::mem::take(&mut *self.fail_next.lock().unwrap()) {
                return Err(ClinicError::ApiError {
                    status: 409,
                    message: "Conflicto de estado".to_string(),
                });
            }
            Ok(())
        }

        fn set_status(&self, id: &str, status: ReservaStatus) {
            for r in self.server.lock().unwrap().iter_mut() {
                if r.id == id {
                    r.status = status;
                }
            }
        }
    }

    #[async_trait]
    impl ReservaRepository for MockRepo {
        async fn list_reservas(&self, _status: Option<ReservaStatus>) -> Result<Vec<Reserva>> {
            self.calls.lock().unwrap().push("list".to_string());
            Ok(self.server.lock().unwrap().clone())
        }

        async fn book_slot(&self, reserva: &NewReserva) -> Result<Reserva> {
            self.record("book".to_string())?;
            let created = reservation("r-new", ReservaStatus::Pendiente);
            let created = Reserva {
                pet_id: reserva.pet_id.clone(),
                ..created
            };
            self.server.lock().unwrap().push(created.clone());
            Ok(created)
        }

        async fn confirm(&self, id: &str) -> Result<()> {
            self.record(format!("confirm:{}", id))?;
            self.set_status(id, ReservaStatus::Confirmada);
            Ok(())
        }

        async fn cancel(&self, id: &str, request: &CancelReservaRequest) -> Result<()> {
            self.record(format!("cancel:{}:{}", id, request.cancelled_by))?;
            self.set_status(id, ReservaStatus::cancelled_by(request.cancelled_by));
            Ok(())
        }

        async fn complete(&self, id: &str) -> Result<()> {
            self.record(format!("complete:{}", id))?;
            self.set_status(id, ReservaStatus::Realizada);
            Ok(())
        }
    }

    fn reservation(id: &str, status: ReservaStatus) -> Reserva {
        Reserva {
            id: id.to_string(),
            solicitud_id: None,
            oferta_id: None,
            client_id: "c1".to_string(),
            vet_id: Some("v1".to_string()),
            clinic_id: None,
            pet_id: "p1".to_string(),
            procedure: "Control".to_string(),
            scheduled_at: Utc.with_ymd_and_hms(2026, 10, 25, 15, 0, 0).unwrap(),
            mode: AttentionMode::Clinica,
            price: None,
            status,
            cancel_reason: None,
        }
    }

    fn fixed_now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_confirm_calls_endpoint_and_reloads() {
        let repo = MockRepo::with(vec![
            reservation("r1", ReservaStatus::Pendiente),
            reservation("r2", ReservaStatus::Pendiente),
        ]);
        let mut vm = ReservasViewModel::new(repo.clone(), Role::Veterinario);
        vm.load(None).await.unwrap();

        vm.confirm("r2").await.unwrap();

        assert_eq!(repo.calls(), vec!["list", "confirm:r2", "list"]);
        assert_eq!(vm.state.items[1].status, ReservaStatus::Confirmada);
        assert_eq!(vm.state.items[0].status, ReservaStatus::Pendiente);
        assert_eq!(
            vm.state.take_notice(),
            Some(Notice::Info("Reserva confirmada".to_string()))
        );
    }

    #[tokio::test]
    async fn test_failed_confirm_rolls_back() {
        let repo = MockRepo::with(vec![reservation("r1", ReservaStatus::Pendiente)]);
        let mut vm = ReservasViewModel::new(repo.clone(), Role::Veterinario);
        vm.load(None).await.unwrap();
        *repo.fail_next.lock().unwrap() = true;

        assert!(vm.confirm("r1").await.is_err());

        assert_eq!(vm.state.items[0].status, ReservaStatus::Pendiente);
        assert_eq!(
            vm.state.take_notice(),
            Some(Notice::Error("Conflicto de estado".to_string()))
        );
        // no reload after a failure
        assert_eq!(repo.calls(), vec!["list", "confirm:r1"]);
    }

    #[tokio::test]
    async fn test_failed_confirm_keeps_patch_under_keep_policy() {
        let repo = MockRepo::with(vec![reservation("r1", ReservaStatus::Pendiente)]);
        let mut vm =
            ReservasViewModel::new(repo.clone(), Role::Veterinario).with_policy(OnFailure::Keep);
        vm.load(None).await.unwrap();
        *repo.fail_next.lock().unwrap() = true;

        assert!(vm.confirm("r1").await.is_err());
        assert_eq!(vm.state.items[0].status, ReservaStatus::Confirmada);
    }

    #[tokio::test]
    async fn test_cancel_uses_role_specific_status() {
        let repo = MockRepo::with(vec![reservation("r1", ReservaStatus::Confirmada)]);
        let mut vm = ReservasViewModel::new(repo.clone(), Role::Cliente);
        vm.load(None).await.unwrap();

        vm.cancel("r1", Some("Viaje".to_string())).await.unwrap();

        assert_eq!(repo.calls()[1], "cancel:r1:CLIENTE");
        assert_eq!(vm.state.items[0].status, ReservaStatus::CanceladaCliente);
    }

    #[tokio::test]
    async fn test_cancelled_reserva_cannot_be_confirmed() {
        let repo = MockRepo::with(vec![reservation("r1", ReservaStatus::CanceladaClinica)]);
        let mut vm = ReservasViewModel::new(repo.clone(), Role::Veterinario);
        vm.load(None).await.unwrap();

        let err = vm.confirm("r1").await.unwrap_err();
        assert!(matches!(err, ClinicError::InvalidTransition { .. }));
        assert_eq!(repo.calls(), vec!["list"]);
        assert!(vm.state.take_notice().unwrap().is_error());
    }

    #[tokio::test]
    async fn test_book_slot_rejects_past_time() {
        let repo = MockRepo::default();
        let mut vm = ReservasViewModel::new(repo.clone(), Role::Cliente).with_clock(fixed_now);

        let past = NewReserva {
            pet_id: "p1".to_string(),
            clinic_id: "cl1".to_string(),
            service_id: None,
            procedure: "Baño".to_string(),
            scheduled_at: Utc.with_ymd_and_hms(2026, 10, 18, 10, 0, 0).unwrap(),
            mode: AttentionMode::Clinica,
        };
        assert!(vm.book_slot(past.clone()).await.is_err());
        assert!(repo.calls().is_empty());

        let future = NewReserva {
            scheduled_at: Utc.with_ymd_and_hms(2026, 10, 22, 10, 0, 0).unwrap(),
            ..past
        };
        let created = vm.book_slot(future).await.unwrap();
        assert_eq!(created.id, "r-new");
        assert_eq!(vm.state.items.len(), 1);
    }
}
