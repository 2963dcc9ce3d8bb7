use crate::core::{ListState, OnFailure};
use crate::domain::ports::ScheduleRepository;
use crate::domain::schedule::DaySchedule;
use crate::utils::error::Result;
use chrono::NaiveDate;

/// A veterinarian's week, one row per day.
pub struct ScheduleViewModel<S: ScheduleRepository> {
    repo: S,
    policy: OnFailure,
    from: Option<NaiveDate>,
    pub state: ListState<DaySchedule>,
}

impl<S: ScheduleRepository> ScheduleViewModel<S> {
    pub fn new(repo: S) -> Self {
        Self {
            repo,
            policy: OnFailure::default(),
            from: None,
            state: ListState::new(),
        }
    }

    pub fn with_policy(mut self, policy: OnFailure) -> Self {
        self.policy = policy;
        self
    }

    pub async fn load(&mut self, from: NaiveDate) -> Result<()> {
        self.from = Some(from);
        self.refresh().await
    }

    pub async fn refresh(&mut self) -> Result<()> {
        let Some(from) = self.from else {
            return Ok(());
        };

        self.state.loading = true;
        match self.repo.week(from).await {
            Ok(mut days) => {
                days.sort_by_key(|d| d.date);
                self.state.replace(days);
                Ok(())
            }
            Err(e) => {
                self.state.fail(&e);
                Err(e)
            }
        }
    }

    pub async fn toggle_day(&mut self, date: NaiveDate) -> Result<DaySchedule> {
        let patch = self
            .state
            .patch(|d| d.date == date, |d| *d = d.toggled());
        let outcome = self.repo.toggle_day(date).await;

        let message = match &outcome {
            Ok(day) if day.enabled => format!("{} habilitado", date),
            Ok(_) => format!("{} bloqueado", date),
            Err(_) => String::new(),
        };
        let day = self.state.settle(patch, self.policy, outcome, &message)?;

        if let Err(e) = self.refresh().await {
            tracing::warn!("Reload after action failed: {}", e);
        }
        Ok(day)
    }
}
