use crate::core::ListState;
use crate::domain::clinical::{Appointment, Consultation};
use crate::domain::ports::ClinicalRepository;
use crate::utils::error::{ClinicError, Result};
use chrono::NaiveDate;

pub struct AppointmentsViewModel<C: ClinicalRepository> {
    repo: C,
    pub state: ListState<Appointment>,
    pub history: ListState<Consultation>,
}

impl<C: ClinicalRepository> AppointmentsViewModel<C> {
    pub fn new(repo: C) -> Self {
        Self {
            repo,
            state: ListState::new(),
            history: ListState::new(),
        }
    }

    pub async fn load(&mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<()> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                let err = ClinicError::validation("El rango de fechas está invertido.");
                self.state.fail(&err);
                return Err(err);
            }
        }

        self.state.loading = true;
        match self.repo.list_appointments(from, to).await {
            Ok(mut items) => {
                items.sort_by_key(|a| a.scheduled_at);
                self.state.replace(items);
                Ok(())
            }
            Err(e) => {
                self.state.fail(&e);
                Err(e)
            }
        }
    }

    /// Past consultations of one pet, newest first.
    pub async fn history(&mut self, pet_id: &str) -> Result<()> {
        self.history.loading = true;
        match self.repo.pet_history(pet_id).await {
            Ok(mut items) => {
                items.sort_by(|a, b| b.started_at.cmp(&a.started_at));
                self.history.replace(items);
                Ok(())
            }
            Err(e) => {
                self.history.fail(&e);
                Err(e)
            }
        }
    }
}
