//! Marketplace and booking records: solicitud → oferta → reserva.
//!
//! The backend owns every state change. The predicates here only tell the
//! view-models which optimistic patch is plausible before the call is made.

use crate::domain::model::{wire_name, AttentionMode, GeoPoint, Role, TimeBlock};
use crate::utils::error::{ClinicError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Logistics {
    TrasladoPropio,
    RecojoADomicilio,
    Indiferente,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolicitudStatus {
    Abierta,
    Cerrada,
    Retirada,
    Expirada,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solicitud {
    pub id: String,
    pub client_id: String,
    pub pet_id: String,
    #[serde(default)]
    pub pet_name: Option<String>,
    #[serde(default)]
    pub service_id: Option<String>,
    pub procedure: String,
    pub desired_date: NaiveDate,
    pub time_block: TimeBlock,
    pub mode: AttentionMode,
    pub logistics: Logistics,
    pub location: GeoPoint,
    #[serde(default)]
    pub notes: Option<String>,
    pub status: SolicitudStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub offers_count: u32,
}

impl Solicitud {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == SolicitudStatus::Expirada || self.expires_at.is_some_and(|at| at <= now)
    }

    /// Veterinarians only see open, unexpired requests.
    pub fn is_visible_to_vets(&self, now: DateTime<Utc>) -> bool {
        self.status == SolicitudStatus::Abierta && !self.is_expired(now)
    }

    pub fn can_withdraw(&self) -> bool {
        self.status == SolicitudStatus::Abierta
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSolicitud {
    pub pet_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    pub procedure: String,
    pub desired_date: NaiveDate,
    pub time_block: TimeBlock,
    pub mode: AttentionMode,
    pub logistics: Logistics,
    pub location: GeoPoint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewSolicitud {
    pub fn validate_for(&self, today: NaiveDate) -> Result<()> {
        if self.pet_id.trim().is_empty() {
            return Err(ClinicError::validation("Selecciona una mascota."));
        }
        if self.procedure.trim().is_empty() {
            return Err(ClinicError::validation("Indica el procedimiento que necesitas."));
        }
        if self.desired_date < today {
            return Err(ClinicError::validation(
                "La fecha deseada no puede estar en el pasado.",
            ));
        }
        crate::utils::validation::validate_coordinates(
            self.location.latitude,
            self.location.longitude,
        )
    }

    /// Local stand-in shown until the server copy arrives.
    pub fn to_pending(&self, local_id: String, client_id: String, now: DateTime<Utc>) -> Solicitud {
        Solicitud {
            id: local_id,
            client_id,
            pet_id: self.pet_id.clone(),
            pet_name: None,
            service_id: self.service_id.clone(),
            procedure: self.procedure.clone(),
            desired_date: self.desired_date,
            time_block: self.time_block,
            mode: self.mode,
            logistics: self.logistics,
            location: self.location.clone(),
            notes: self.notes.clone(),
            status: SolicitudStatus::Abierta,
            created_at: now,
            expires_at: None,
            offers_count: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceLine {
    pub concept: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfertaStatus {
    Pendiente,
    Aceptada,
    Rechazada,
    Retirada,
}

impl OfertaStatus {
    /// Still holds the vet's slot on the solicitud.
    pub fn is_live(self) -> bool {
        matches!(self, Self::Pendiente | Self::Aceptada)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Oferta {
    pub id: String,
    pub solicitud_id: String,
    pub vet_id: String,
    #[serde(default)]
    pub vet_name: Option<String>,
    pub prices: Vec<PriceLine>,
    pub time_options: Vec<DateTime<Utc>>,
    #[serde(default)]
    pub message: Option<String>,
    pub status: OfertaStatus,
    pub created_at: DateTime<Utc>,
}

impl Oferta {
    pub fn total_price(&self) -> Decimal {
        self.prices.iter().map(|line| line.amount).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOferta {
    pub prices: Vec<PriceLine>,
    pub time_options: Vec<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl NewOferta {
    pub fn validate_for(&self, now: DateTime<Utc>) -> Result<()> {
        if self.prices.is_empty() {
            return Err(ClinicError::validation("La oferta necesita al menos un precio."));
        }
        if self.prices.iter().any(|line| line.amount <= Decimal::ZERO) {
            return Err(ClinicError::validation("Los precios deben ser mayores a cero."));
        }
        if self.time_options.is_empty() {
            return Err(ClinicError::validation("Propón al menos un horario."));
        }
        if self.time_options.iter().any(|at| *at <= now) {
            return Err(ClinicError::validation("Los horarios propuestos deben ser futuros."));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptOfertaRequest {
    #[serde(rename = "horario")]
    pub chosen_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservaStatus {
    Pendiente,
    Confirmada,
    Realizada,
    CanceladaCliente,
    CanceladaVeterinario,
    CanceladaClinica,
}

impl ReservaStatus {
    pub fn is_cancelled(self) -> bool {
        matches!(
            self,
            Self::CanceladaCliente | Self::CanceladaVeterinario | Self::CanceladaClinica
        )
    }

    pub fn can_transition_to(self, next: ReservaStatus) -> bool {
        match (self, next) {
            (Self::Pendiente, Self::Confirmada) => true,
            (Self::Pendiente | Self::Confirmada, n) if n.is_cancelled() => true,
            (Self::Confirmada, Self::Realizada) => true,
            _ => false,
        }
    }

    pub fn check_transition(self, next: ReservaStatus) -> Result<()> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(ClinicError::InvalidTransition {
                entity: "reserva".to_string(),
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }

    /// Cancellation status recorded when `role` cancels.
    pub fn cancelled_by(role: Role) -> Self {
        match role {
            Role::Cliente => Self::CanceladaCliente,
            Role::Veterinario => Self::CanceladaVeterinario,
            Role::Clinica => Self::CanceladaClinica,
        }
    }
}

impl fmt::Display for ReservaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&wire_name(self))
    }
}

impl std::str::FromStr for ReservaStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_ascii_uppercase()))
            .map_err(|_| format!("unknown reserva status: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reserva {
    pub id: String,
    #[serde(default)]
    pub solicitud_id: Option<String>,
    #[serde(default)]
    pub oferta_id: Option<String>,
    pub client_id: String,
    #[serde(default)]
    pub vet_id: Option<String>,
    #[serde(default)]
    pub clinic_id: Option<String>,
    pub pet_id: String,
    pub procedure: String,
    pub scheduled_at: DateTime<Utc>,
    pub mode: AttentionMode,
    #[serde(default)]
    pub price: Option<Decimal>,
    pub status: ReservaStatus,
    #[serde(default)]
    pub cancel_reason: Option<String>,
}

/// Direct clinic slot booking, no marketplace round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReserva {
    pub pet_id: String,
    pub clinic_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    pub procedure: String,
    pub scheduled_at: DateTime<Utc>,
    pub mode: AttentionMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelReservaRequest {
    #[serde(rename = "motivo", skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(rename = "canceladaPor")]
    pub cancelled_by: Role,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reserva_transitions_are_one_directional() {
        use ReservaStatus::*;

        assert!(Pendiente.can_transition_to(Confirmada));
        assert!(Pendiente.can_transition_to(CanceladaCliente));
        assert!(Confirmada.can_transition_to(Realizada));
        assert!(Confirmada.can_transition_to(CanceladaClinica));

        assert!(!Pendiente.can_transition_to(Realizada));
        assert!(!Confirmada.can_transition_to(Pendiente));
        assert!(!CanceladaCliente.can_transition_to(Confirmada));
        assert!(!CanceladaVeterinario.can_transition_to(Pendiente));
        assert!(!Realizada.can_transition_to(CanceladaCliente));

        let err = Realizada.check_transition(Confirmada).unwrap_err();
        assert!(err.to_string().contains("REALIZADA -> CONFIRMADA"));
    }

    #[test]
    fn test_cancel_status_follows_role() {
        assert_eq!(
            ReservaStatus::cancelled_by(Role::Cliente),
            ReservaStatus::CanceladaCliente
        );
        assert_eq!(
            ReservaStatus::cancelled_by(Role::Veterinario),
            ReservaStatus::CanceladaVeterinario
        );
        assert_eq!(
            ReservaStatus::cancelled_by(Role::Clinica),
            ReservaStatus::CanceladaClinica
        );
    }

    #[test]
    fn test_reserva_status_parses_wire_names() {
        assert_eq!(
            "cancelada_cliente".parse::<ReservaStatus>().unwrap(),
            ReservaStatus::CanceladaCliente
        );
        assert!("BORRADA".parse::<ReservaStatus>().is_err());
    }

    #[test]
    fn test_solicitud_visibility() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        let mut solicitud: Solicitud = serde_json::from_value(serde_json::json!({
            "id": "s1",
            "clientId": "c1",
            "petId": "p1",
            "procedure": "Vacuna antirrábica",
            "desiredDate": "2026-10-21",
            "timeBlock": "MANANA",
            "mode": "DOMICILIO",
            "logistics": "INDIFERENTE",
            "location": {"latitude": -12.1, "longitude": -77.0},
            "status": "ABIERTA",
            "createdAt": "2026-10-19T08:00:00Z",
            "expiresAt": "2026-10-20T08:00:00Z"
        }))
        .unwrap();

        assert!(solicitud.is_visible_to_vets(now));

        solicitud.expires_at = Some(now);
        assert!(!solicitud.is_visible_to_vets(now));

        solicitud.expires_at = None;
        solicitud.status = SolicitudStatus::Cerrada;
        assert!(!solicitud.is_visible_to_vets(now));
        assert!(!solicitud.can_withdraw());
    }

    #[test]
    fn test_new_oferta_validation() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        let mut oferta = NewOferta {
            prices: vec![PriceLine {
                concept: "Consulta".to_string(),
                amount: dec!(80),
            }],
            time_options: vec![now + chrono::Duration::hours(20)],
            message: None,
        };
        assert!(oferta.validate_for(now).is_ok());

        oferta.time_options = vec![now - chrono::Duration::hours(1)];
        assert!(oferta.validate_for(now).is_err());

        oferta.time_options = vec![now + chrono::Duration::hours(1)];
        oferta.prices[0].amount = dec!(0);
        assert!(oferta.validate_for(now).is_err());
    }

    #[test]
    fn test_oferta_total_sums_lines() {
        let oferta: Oferta = serde_json::from_value(serde_json::json!({
            "id": "o1",
            "solicitudId": "s1",
            "vetId": "v1",
            "prices": [
                {"concept": "Consulta", "amount": 60},
                {"concept": "Movilidad", "amount": 15.5}
            ],
            "timeOptions": ["2026-10-21T14:00:00Z"],
            "status": "PENDIENTE",
            "createdAt": "2026-10-19T09:00:00Z"
        }))
        .unwrap();
        assert_eq!(oferta.total_price(), dec!(75.5));
        assert!(oferta.status.is_live());
    }
}
