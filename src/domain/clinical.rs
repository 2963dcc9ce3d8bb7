use crate::domain::model::{wire_name, AttentionMode};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Programada,
    EnCurso,
    Atendida,
    Cancelada,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    #[serde(default)]
    pub reserva_id: Option<String>,
    pub pet_id: String,
    #[serde(default)]
    pub pet_name: Option<String>,
    pub client_id: String,
    #[serde(default)]
    pub vet_id: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub mode: AttentionMode,
    #[serde(default)]
    pub reason: Option<String>,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsultationStatus {
    EnProgreso,
    Finalizada,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vitals {
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub temperature_c: Option<f64>,
    #[serde(default)]
    pub heart_rate_bpm: Option<u32>,
    #[serde(default)]
    pub respiratory_rate_rpm: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedService {
    pub service_id: String,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedMedication {
    pub item_id: String,
    pub name: String,
    pub dose: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedVaccine {
    pub item_id: String,
    pub name: String,
    #[serde(default)]
    pub lot: Option<String>,
    #[serde(default)]
    pub next_dose_on: Option<NaiveDate>,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pendiente,
    Parcial,
    Pagado,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Efectivo,
    Tarjeta,
    Transferencia,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&wire_name(self))
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_ascii_uppercase()))
            .map_err(|_| format!("unknown payment method: {}", s))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Billing {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub amount_paid: Decimal,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consultation {
    pub id: String,
    pub appointment_id: String,
    pub pet_id: String,
    pub vet_id: String,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    pub status: ConsultationStatus,
    #[serde(default)]
    pub vitals: Vitals,
    #[serde(default)]
    pub anamnesis: Option<String>,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub treatment: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub services: Vec<AppliedService>,
    #[serde(default)]
    pub medications: Vec<AppliedMedication>,
    #[serde(default)]
    pub vaccines: Vec<AppliedVaccine>,
    #[serde(default)]
    pub billing: Billing,
}

impl Consultation {
    pub fn is_finished(&self) -> bool {
        self.status == ConsultationStatus::Finalizada
    }
}

/// A batch of draft edits read from a file, resolved against the service
/// catalog and the inventory before it touches the draft.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationEdit {
    pub vitals: Option<Vitals>,
    pub anamnesis: Option<String>,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub services: Vec<ServiceLineEdit>,
    #[serde(default)]
    pub medications: Vec<MedicationLineEdit>,
    #[serde(default)]
    pub vaccines: Vec<VaccineLineEdit>,
    pub discount: Option<Decimal>,
    pub payment: Option<PaymentEdit>,
}

impl ConsultationEdit {
    pub fn needs_services(&self) -> bool {
        !self.services.is_empty()
    }

    pub fn needs_inventory(&self) -> bool {
        !self.medications.is_empty() || !self.vaccines.is_empty()
    }
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLineEdit {
    pub service_id: String,
    #[serde(default = "one")]
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationLineEdit {
    pub item_id: String,
    pub dose: String,
    #[serde(default = "one")]
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaccineLineEdit {
    pub item_id: String,
    #[serde(default)]
    pub next_dose_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentEdit {
    pub amount: Decimal,
    pub method: PaymentMethod,
}
