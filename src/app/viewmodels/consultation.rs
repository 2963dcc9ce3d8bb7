use super::{system_clock, Clock};
use crate::core::billing::compute_billing;
use crate::core::{Notice, OnFailure};
use crate::domain::clinical::{
    AppliedMedication, AppliedService, AppliedVaccine, Consultation, ConsultationEdit,
    ConsultationStatus, PaymentMethod, Vitals,
};
use crate::domain::inventory::{InventoryItem, InventoryKind};
use crate::domain::model::Service;
use crate::domain::ports::ClinicalRepository;
use crate::utils::error::{ClinicError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// One consultation being worked on. Edits stay local until `save` or
/// `finish`.
pub struct ConsultationViewModel<C: ClinicalRepository> {
    repo: C,
    policy: OnFailure,
    clock: Clock,
    pub consultation: Option<Consultation>,
    pub saving: bool,
    pub notice: Option<Notice>,
    /// The backend holds this consultation as closed. A local `FINALIZADA`
    /// left by a failed finish under [`OnFailure::Keep`] does not count.
    closed: bool,
}

impl<C: ClinicalRepository> ConsultationViewModel<C> {
    pub fn new(repo: C) -> Self {
        Self {
            repo,
            policy: OnFailure::default(),
            clock: system_clock,
            consultation: None,
            saving: false,
            notice: None,
            closed: false,
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

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub async fn start(&mut self, appointment_id: &str) -> Result<()> {
        let outcome = self.repo.start_consultation(appointment_id).await;
        self.install(outcome, "Consulta iniciada")
    }

    pub async fn open(&mut self, id: &str) -> Result<()> {
        let outcome = self.repo.get_consultation(id).await;
        self.install(outcome, "")
    }

    pub fn set_vitals(&mut self, vitals: Vitals) -> Result<()> {
        let invalid = if vitals.weight_kg.is_some_and(|w| w <= 0.0) {
            Some("El peso debe ser mayor a cero.")
        } else if vitals.temperature_c.is_some_and(|t| !(30.0..=45.0).contains(&t)) {
            Some("La temperatura registrada está fuera de rango.")
        } else {
            None
        };
        if let Some(message) = invalid {
            let err = ClinicError::validation(message);
            self.fail(&err);
            return Err(err);
        }

        self.draft_mut()?.vitals = vitals;
        Ok(())
    }

    pub fn set_findings(
        &mut self,
        anamnesis: Option<String>,
        diagnosis: Option<String>,
        treatment: Option<String>,
    ) -> Result<()> {
        let draft = self.draft_mut()?;
        if anamnesis.is_some() {
            draft.anamnesis = anamnesis;
        }
        if diagnosis.is_some() {
            draft.diagnosis = diagnosis;
        }
        if treatment.is_some() {
            draft.treatment = treatment;
        }
        Ok(())
    }

    pub fn set_notes(&mut self, notes: Option<String>) -> Result<()> {
        self.draft_mut()?.notes = notes;
        Ok(())
    }

    pub fn add_service(&mut self, service: &Service, quantity: u32) -> Result<()> {
        self.require_quantity(quantity)?;
        self.draft_mut()?.services.push(AppliedService {
            service_id: service.id.clone(),
            name: service.name.clone(),
            unit_price: service.base_price,
            quantity,
        });
        self.retotal()
    }

    pub fn add_medication(&mut self, item: &InventoryItem, dose: &str, quantity: u32) -> Result<()> {
        self.require_quantity(quantity)?;
        let problem = if item.kind() != InventoryKind::Medicamento {
            Some(format!("{} no es un medicamento.", item.name))
        } else if item.stock < i64::from(quantity) {
            Some(format!("No hay stock suficiente de {}.", item.name))
        } else {
            None
        };
        if let Some(message) = problem {
            let err = ClinicError::validation(message);
            self.fail(&err);
            return Err(err);
        }

        self.draft_mut()?.medications.push(AppliedMedication {
            item_id: item.id.clone(),
            name: item.name.clone(),
            dose: dose.to_string(),
            unit_price: item.unit_price,
            quantity,
        });
        self.retotal()
    }

    pub fn add_vaccine(&mut self, item: &InventoryItem, next_dose_on: Option<NaiveDate>) -> Result<()> {
        let today = (self.clock)().date_naive();
        let problem = if item.kind() != InventoryKind::Vacuna {
            Some(format!("{} no es una vacuna.", item.name))
        } else if item.stock < 1 {
            Some(format!("No hay stock de {}.", item.name))
        } else if item.is_expired(today) {
            Some(format!("El lote de {} está vencido.", item.name))
        } else if next_dose_on.is_some_and(|d| d <= today) {
            Some("La próxima dosis debe ser una fecha futura.".to_string())
        } else {
            None
        };
        if let Some(message) = problem {
            let err = ClinicError::validation(message);
            self.fail(&err);
            return Err(err);
        }

        self.draft_mut()?.vaccines.push(AppliedVaccine {
            item_id: item.id.clone(),
            name: item.name.clone(),
            lot: item.lot.clone(),
            next_dose_on,
            unit_price: item.unit_price,
        });
        self.retotal()
    }

    /// Current subtotal of the draft, for display while editing.
    pub fn subtotal(&self) -> Decimal {
        self.consultation
            .as_ref()
            .map(crate::core::billing::subtotal)
            .unwrap_or_default()
    }

    pub fn set_diagnosis(&mut self, diagnosis: impl Into<String>) -> Result<()> {
        self.set_findings(None, Some(diagnosis.into()), None)
    }

    /// Discount on the draft bill. Payment already recorded is kept.
    pub fn set_discount(&mut self, discount: Decimal) -> Result<()> {
        let billing = self.draft_mut()?.billing.clone();
        self.rebill(discount, billing.amount_paid, billing.payment_method)
    }

    pub fn record_payment(&mut self, amount_paid: Decimal, method: PaymentMethod) -> Result<()> {
        let discount = self.draft_mut()?.billing.discount;
        self.rebill(discount, amount_paid, Some(method))
    }

    /// Applies a whole batch of edits, or none of them.
    pub fn apply(
        &mut self,
        edit: ConsultationEdit,
        services: &[Service],
        items: &[InventoryItem],
    ) -> Result<()> {
        let snapshot = self.draft_mut()?.clone();
        let outcome = self.apply_all(edit, services, items);
        if outcome.is_err() {
            self.consultation = Some(snapshot);
        }
        outcome
    }

    fn apply_all(
        &mut self,
        edit: ConsultationEdit,
        services: &[Service],
        items: &[InventoryItem],
    ) -> Result<()> {
        if let Some(vitals) = edit.vitals {
            self.set_vitals(vitals)?;
        }
        self.set_findings(edit.anamnesis, edit.diagnosis, edit.treatment)?;
        if edit.notes.is_some() {
            self.set_notes(edit.notes)?;
        }

        for line in &edit.services {
            let found = services.iter().find(|s| s.id == line.service_id);
            let service = self.lookup(found, &line.service_id)?;
            self.add_service(service, line.quantity)?;
        }
        for line in &edit.medications {
            let found = items.iter().find(|i| i.id == line.item_id);
            let item = self.lookup(found, &line.item_id)?;
            self.add_medication(item, &line.dose, line.quantity)?;
        }
        for line in &edit.vaccines {
            let found = items.iter().find(|i| i.id == line.item_id);
            let item = self.lookup(found, &line.item_id)?;
            self.add_vaccine(item, line.next_dose_on)?;
        }

        if let Some(discount) = edit.discount {
            self.set_discount(discount)?;
        }
        if let Some(payment) = edit.payment {
            self.record_payment(payment.amount, payment.method)?;
        }
        Ok(())
    }

    fn lookup<'a, T>(&mut self, found: Option<&'a T>, id: &str) -> Result<&'a T> {
        found.ok_or_else(|| {
            let err = ClinicError::validation(format!("No se encontró {} en el catálogo.", id));
            self.fail(&err);
            err
        })
    }

    /// Keeps the bill in step with the lines, same discount and payment.
    fn retotal(&mut self) -> Result<()> {
        let billing = self.draft_mut()?.billing.clone();
        self.rebill(billing.discount, billing.amount_paid, billing.payment_method)
    }

    fn rebill(
        &mut self,
        discount: Decimal,
        amount_paid: Decimal,
        method: Option<PaymentMethod>,
    ) -> Result<()> {
        let outcome = compute_billing(self.draft_mut()?, discount, amount_paid, method);
        match outcome {
            Ok(billing) => {
                self.draft_mut()?.billing = billing;
                Ok(())
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    pub async fn save(&mut self) -> Result<()> {
        self.retotal()?;
        let mut draft = self.draft_mut()?.clone();
        if draft.is_finished() {
            // closing only happens through `finish`
            draft.status = ConsultationStatus::EnProgreso;
            draft.finished_at = None;
        }

        self.saving = true;
        let outcome = self.repo.save_consultation(&draft).await;
        self.saving = false;
        self.install(outcome, "Consulta guardada")
    }

    /// Bills and closes the consultation in a single write.
    pub async fn finish(
        &mut self,
        discount: Decimal,
        amount_paid: Decimal,
        method: Option<PaymentMethod>,
    ) -> Result<Consultation> {
        let before = self.draft_mut()?.clone();

        let billing = match compute_billing(&before, discount, amount_paid, method) {
            Ok(billing) => billing,
            Err(e) => {
                self.fail(&e);
                return Err(e);
            }
        };

        let mut finished = before.clone();
        finished.billing = billing;
        finished.status = ConsultationStatus::Finalizada;
        finished.finished_at = Some((self.clock)());
        self.consultation = Some(finished.clone());

        self.saving = true;
        let outcome = self.repo.finish_consultation(&finished).await;
        self.saving = false;

        match outcome {
            Ok(stored) => {
                tracing::info!(
                    "✅ Consultation {} finished, total {}",
                    stored.id,
                    stored.billing.total
                );
                self.consultation = Some(stored.clone());
                self.closed = true;
                self.notice = Some(Notice::Info("Consulta finalizada".to_string()));
                Ok(stored)
            }
            Err(e) => {
                self.fail(&e);
                if self.policy == OnFailure::Rollback {
                    self.consultation = Some(before);
                }
                Err(e)
            }
        }
    }

    fn install(&mut self, outcome: Result<Consultation>, success: &str) -> Result<()> {
        match outcome {
            Ok(consultation) => {
                tracing::debug!("Consultation {} loaded", consultation.id);
                self.closed = consultation.is_finished();
                self.consultation = Some(consultation);
                if !success.is_empty() {
                    self.notice = Some(Notice::Info(success.to_string()));
                }
                Ok(())
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    fn require_quantity(&mut self, quantity: u32) -> Result<()> {
        if quantity == 0 {
            let err = ClinicError::validation("La cantidad debe ser al menos 1.");
            self.fail(&err);
            return Err(err);
        }
        Ok(())
    }

    fn draft_mut(&mut self) -> Result<&mut Consultation> {
        let problem = match &self.consultation {
            None => Some("No hay una consulta abierta."),
            Some(_) if self.closed => Some("La consulta ya fue finalizada."),
            Some(_) => None,
        };
        if let Some(message) = problem {
            let err = ClinicError::validation(message);
            self.fail(&err);
            return Err(err);
        }

        self.consultation
            .as_mut()
            .ok_or_else(|| ClinicError::validation("No hay una consulta abierta."))
    }

    fn fail(&mut self, err: &ClinicError) {
        tracing::warn!("⚠️ {}", err);
        self.notice = Some(Notice::Error(err.user_message()));
    }
}
