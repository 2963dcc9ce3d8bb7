//! Observable list state with optimistic patches.
//!
//! Every view-model action follows the same shape: patch the local list,
//! call the backend, then either announce success (and reload) or surface
//! the error and undo the patch according to [`OnFailure`].

use crate::utils::error::{ClinicError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnFailure {
    /// Restore the items touched by the patch.
    #[default]
    Rollback,
    /// Leave the patched items as they are until the next reload.
    Keep,
}

impl std::str::FromStr for OnFailure {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rollback" => Ok(Self::Rollback),
            "keep" => Ok(Self::Keep),
            other => Err(format!("unknown failure policy: {}", other)),
        }
    }
}

/// Transient message for the front end, shown once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Self::Info(text) | Self::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

enum Undo<T> {
    Restore(usize, T),
    RemoveAt(usize),
    InsertAt(usize, T),
}

/// Record of what a patch changed, enough to put it back.
pub struct Patch<T> {
    undo: Vec<Undo<T>>,
}

impl<T> Patch<T> {
    /// A patch that changed nothing; settling it only sets the notice.
    pub fn none() -> Self {
        Self { undo: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.undo.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ListState<T> {
    pub items: Vec<T>,
    pub loading: bool,
    pub notice: Option<Notice>,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            notice: None,
        }
    }
}

impl<T: Clone> ListState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
        self.loading = false;
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.notice = Some(Notice::Info(message.into()));
    }

    pub fn fail(&mut self, err: &ClinicError) {
        tracing::warn!("⚠️ {}", err);
        self.loading = false;
        self.notice = Some(Notice::Error(err.user_message()));
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub fn find(&self, pred: impl Fn(&T) -> bool) -> Option<&T> {
        self.items.iter().find(|item| pred(item))
    }

    /// Mutates the first item matching `pred`.
    pub fn patch(&mut self, pred: impl Fn(&T) -> bool, mutate: impl FnOnce(&mut T)) -> Patch<T> {
        let mut patch = Patch::none();
        if let Some(index) = self.items.iter().position(|item| pred(item)) {
            patch.undo.push(Undo::Restore(index, self.items[index].clone()));
            mutate(&mut self.items[index]);
        }
        patch
    }

    /// Mutates every item; `mutate` returns whether it touched the item.
    pub fn patch_each(&mut self, mut mutate: impl FnMut(&mut T) -> bool) -> Patch<T> {
        let mut patch = Patch::none();
        for index in 0..self.items.len() {
            let before = self.items[index].clone();
            if mutate(&mut self.items[index]) {
                patch.undo.push(Undo::Restore(index, before));
            }
        }
        patch
    }

    /// Adds an item the backend already holds; nothing to undo.
    pub fn insert_front(&mut self, item: T) {
        self.items.insert(0, item);
    }

    pub fn push_front(&mut self, item: T) -> Patch<T> {
        self.insert_front(item);
        Patch {
            undo: vec![Undo::RemoveAt(0)],
        }
    }

    pub fn remove(&mut self, pred: impl Fn(&T) -> bool) -> Patch<T> {
        let mut patch = Patch::none();
        if let Some(index) = self.items.iter().position(|item| pred(item)) {
            let removed = self.items.remove(index);
            patch.undo.push(Undo::InsertAt(index, removed));
        }
        patch
    }

    pub fn rollback(&mut self, patch: Patch<T>) {
        for undo in patch.undo.into_iter().rev() {
            match undo {
                Undo::Restore(index, item) => {
                    if let Some(slot) = self.items.get_mut(index) {
                        *slot = item;
                    }
                }
                Undo::RemoveAt(index) => {
                    if index < self.items.len() {
                        self.items.remove(index);
                    }
                }
                Undo::InsertAt(index, item) => {
                    let index = index.min(self.items.len());
                    self.items.insert(index, item);
                }
            }
        }
    }

    /// Closes an optimistic action: success notice, or error notice plus
    /// rollback under [`OnFailure::Rollback`]. The outcome is handed back.
    pub fn settle<R>(
        &mut self,
        patch: Patch<T>,
        policy: OnFailure,
        outcome: Result<R>,
        success: &str,
    ) -> Result<R> {
        match outcome {
            Ok(value) => {
                tracing::info!("✅ {}", success);
                self.info(success);
                Ok(value)
            }
            Err(err) => {
                self.fail(&err);
                if policy == OnFailure::Rollback {
                    self.rollback(patch);
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: u32,
        flag: bool,
    }

    fn rows() -> ListState<Row> {
        let mut state = ListState::new();
        state.replace(vec![
            Row { id: 1, flag: false },
            Row { id: 2, flag: false },
            Row { id: 3, flag: false },
        ]);
        state
    }

    fn boom() -> ClinicError {
        ClinicError::ApiError {
            status: 500,
            message: "fallo".to_string(),
        }
    }

    #[test]
    fn test_patch_and_rollback_restores_item() {
        let mut state = rows();
        let patch = state.patch(|r| r.id == 2, |r| r.flag = true);
        assert!(state.items[1].flag);

        state.rollback(patch);
        assert!(!state.items[1].flag);
    }

    #[test]
    fn test_patch_without_match_is_empty() {
        let mut state = rows();
        let patch = state.patch(|r| r.id == 9, |r| r.flag = true);
        assert!(patch.is_empty());
        assert!(state.items.iter().all(|r| !r.flag));
    }

    #[test]
    fn test_remove_and_push_roll_back_in_place() {
        let mut state = rows();
        let removed = state.remove(|r| r.id == 2);
        assert_eq!(state.items.len(), 2);
        state.rollback(removed);
        assert_eq!(state.items[1].id, 2);

        let pushed = state.push_front(Row { id: 0, flag: true });
        assert_eq!(state.items[0].id, 0);
        state.rollback(pushed);
        assert_eq!(state.items[0].id, 1);
        assert_eq!(state.items.len(), 3);
    }

    #[test]
    fn test_insert_front_leaves_notice_alone() {
        let mut state = rows();
        state.insert_front(Row { id: 0, flag: true });
        assert_eq!(state.items[0].id, 0);
        assert_eq!(state.items.len(), 4);
        assert!(state.notice.is_none());
    }

    #[test]
    fn test_settle_failure_with_rollback() {
        let mut state = rows();
        let patch = state.patch_each(|r| {
            r.flag = true;
            true
        });

        let outcome: Result<()> = Err(boom());
        assert!(state.settle(patch, OnFailure::Rollback, outcome, "ok").is_err());
        assert!(state.items.iter().all(|r| !r.flag));
        assert_eq!(state.take_notice(), Some(Notice::Error("fallo".to_string())));
        assert_eq!(state.take_notice(), None);
    }

    #[test]
    fn test_settle_failure_keeps_patch() {
        let mut state = rows();
        let patch = state.patch(|r| r.id == 1, |r| r.flag = true);

        let outcome: Result<()> = Err(boom());
        assert!(state.settle(patch, OnFailure::Keep, outcome, "ok").is_err());
        assert!(state.items[0].flag);
        assert!(state.notice.as_ref().is_some_and(Notice::is_error));
    }

    #[test]
    fn test_settle_success_sets_info() {
        let mut state = rows();
        let patch = state.patch(|r| r.id == 3, |r| r.flag = true);
        let value = state
            .settle(patch, OnFailure::Rollback, Ok(7), "Listo")
            .unwrap();
        assert_eq!(value, 7);
        assert!(state.items[2].flag);
        assert_eq!(state.notice, Some(Notice::Info("Listo".to_string())));
    }

    #[test]
    fn test_on_failure_parse() {
        assert_eq!("KEEP".parse::<OnFailure>().unwrap(), OnFailure::Keep);
        assert_eq!("rollback".parse::<OnFailure>().unwrap(), OnFailure::Rollback);
        assert!("retry".parse::<OnFailure>().is_err());
    }
}
