use crate::core::{ListState, OnFailure, Patch};
use crate::domain::model::{NewPet, Pet};
use crate::domain::ports::PetRepository;
use crate::utils::error::{ClinicError, Result};

pub struct PetsViewModel<P: PetRepository> {
    repo: P,
    policy: OnFailure,
    pub state: ListState<Pet>,
}

impl<P: PetRepository> PetsViewModel<P> {
    pub fn new(repo: P) -> Self {
        Self {
            repo,
            policy: OnFailure::default(),
            state: ListState::new(),
        }
    }

    pub async fn load(&mut self) -> Result<()> {
        self.state.loading = true;
        match self.repo.list_pets().await {
            Ok(items) => {
                self.state.replace(items);
                Ok(())
            }
            Err(e) => {
                self.state.fail(&e);
                Err(e)
            }
        }
    }

    pub async fn register(&mut self, pet: NewPet) -> Result<Pet> {
        let invalid = if pet.name.trim().is_empty() {
            Some("El nombre de la mascota es obligatorio.")
        } else if pet.weight_kg.is_some_and(|w| w <= 0.0) {
            Some("El peso debe ser mayor a cero.")
        } else {
            None
        };
        if let Some(message) = invalid {
            let err = ClinicError::validation(message);
            self.state.fail(&err);
            return Err(err);
        }

        let outcome = self.repo.create_pet(&pet).await;
        let created = self
            .state
            .settle(Patch::none(), self.policy, outcome, "Mascota registrada")?;

        if let Err(e) = self.load().await {
            tracing::warn!("Reload after action failed: {}", e);
        }
        Ok(created)
    }
}
