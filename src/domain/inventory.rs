use crate::domain::model::Species;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InventoryKind {
    Medicamento,
    Vacuna,
}

impl InventoryKind {
    pub fn as_query(self) -> &'static str {
        match self {
            Self::Medicamento => "MEDICAMENTO",
            Self::Vacuna => "VACUNA",
        }
    }
}

impl std::str::FromStr for InventoryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MEDICAMENTO" | "MEDICATION" => Ok(Self::Medicamento),
            "VACUNA" | "VACCINE" => Ok(Self::Vacuna),
            other => Err(format!("unknown inventory kind: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub active_ingredient: String,
    #[serde(default)]
    pub concentration: Option<String>,
    #[serde(default)]
    pub route: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vaccine {
    #[serde(default)]
    pub target_species: Vec<Species>,
    pub doses_required: u8,
    #[serde(default)]
    pub booster_interval_days: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tipo", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemDetails {
    Medicamento(Medication),
    Vacuna(Vaccine),
}

impl ItemDetails {
    pub fn kind(&self) -> InventoryKind {
        match self {
            Self::Medicamento(_) => InventoryKind::Medicamento,
            Self::Vacuna(_) => InventoryKind::Vacuna,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub details: ItemDetails,
    pub stock: i64,
    #[serde(default)]
    pub min_stock: i64,
    pub unit_price: Decimal,
    #[serde(default)]
    pub lot: Option<String>,
    #[serde(default)]
    pub expires_on: Option<NaiveDate>,
}

impl InventoryItem {
    pub fn kind(&self) -> InventoryKind {
        self.details.kind()
    }

    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expires_on.is_some_and(|date| date < today)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInventoryItem {
    pub name: String,
    pub details: ItemDetails,
    pub stock: i64,
    pub min_stock: i64,
    pub unit_price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub delta: i64,
}
