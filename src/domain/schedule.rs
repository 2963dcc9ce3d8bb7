use crate::domain::model::TimeBlock;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of a veterinarian's agenda.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub enabled: bool,
    #[serde(default)]
    pub blocks: Vec<TimeBlock>,
}

impl DaySchedule {
    pub fn toggled(&self) -> Self {
        Self {
            enabled: !self.enabled,
            ..self.clone()
        }
    }
}
