use crate::core::{ListState, OnFailure, Patch};
use crate::domain::inventory::{InventoryItem, InventoryKind, NewInventoryItem};
use crate::domain::ports::InventoryRepository;
use crate::utils::error::{ClinicError, Result};
use rust_decimal::Decimal;

pub struct InventoryViewModel<I: InventoryRepository> {
    repo: I,
    policy: OnFailure,
    kind: Option<InventoryKind>,
    pub state: ListState<InventoryItem>,
}

impl<I: InventoryRepository> InventoryViewModel<I> {
    pub fn new(repo: I) -> Self {
        Self {
            repo,
            policy: OnFailure::default(),
            kind: None,
            state: ListState::new(),
        }
    }

    pub fn with_policy(mut self, policy: OnFailure) -> Self {
        self.policy = policy;
        self
    }

    pub async fn load(&mut self, kind: Option<InventoryKind>) -> Result<()> {
        self.kind = kind;
        self.refresh().await
    }

    pub async fn refresh(&mut self) -> Result<()> {
        self.state.loading = true;
        match self.repo.list_items(self.kind).await {
            Ok(items) => {
                tracing::debug!("Loaded {} inventory items", items.len());
                self.state.replace(items);
                Ok(())
            }
            Err(e) => {
                self.state.fail(&e);
                Err(e)
            }
        }
    }

    pub async fn add_item(&mut self, item: NewInventoryItem) -> Result<InventoryItem> {
        let invalid = if item.name.trim().is_empty() {
            Some("El producto necesita un nombre.")
        } else if item.stock < 0 || item.min_stock < 0 {
            Some("El stock no puede ser negativo.")
        } else if item.unit_price < Decimal::ZERO {
            Some("El precio no puede ser negativo.")
        } else {
            None
        };
        if let Some(message) = invalid {
            let err = ClinicError::validation(message);
            self.state.fail(&err);
            return Err(err);
        }

        let outcome = self.repo.create_item(&item).await;
        let created = self
            .state
            .settle(Patch::none(), self.policy, outcome, "Producto agregado")?;

        self.reload_after_action().await;
        Ok(created)
    }

    /// Applies `delta` to the stock (negative for usage, positive for restock).
    pub async fn adjust_stock(&mut self, id: &str, delta: i64) -> Result<InventoryItem> {
        if delta == 0 {
            let err = ClinicError::validation("La cantidad a ajustar no puede ser cero.");
            self.state.fail(&err);
            return Err(err);
        }

        let current = self.state.find(|i| i.id == id).map(|i| i.stock);
        let mut adjusted = None;
        if let Some(stock) = current {
            let problem = match stock.checked_add(delta) {
                None => Some(format!("Ajuste fuera de rango para un stock de {}.", stock)),
                Some(next) if next < 0 => Some(format!(
                    "Stock insuficiente: hay {} y se intentan descontar {}.",
                    stock,
                    delta.unsigned_abs()
                )),
                Some(next) => {
                    adjusted = Some(next);
                    None
                }
            };
            if let Some(message) = problem {
                let err = ClinicError::validation(message);
                self.state.fail(&err);
                return Err(err);
            }
        }

        let patch = match adjusted {
            Some(next) => self.state.patch(|i| i.id == id, |i| i.stock = next),
            None => Patch::none(),
        };
        let outcome = self.repo.adjust_stock(id, delta).await;
        let updated = self
            .state
            .settle(patch, self.policy, outcome, "Stock actualizado")?;

        if updated.is_low_stock() {
            tracing::warn!("Low stock on {}: {} left", updated.name, updated.stock);
        }
        self.reload_after_action().await;
        Ok(updated)
    }

    pub fn low_stock(&self) -> Vec<&InventoryItem> {
        self.state.items.iter().filter(|i| i.is_low_stock()).collect()
    }

    async fn reload_after_action(&mut self) {
        if let Err(e) = self.refresh().await {
            tracing::warn!("Reload after action failed: {}", e);
        }
    }
}
