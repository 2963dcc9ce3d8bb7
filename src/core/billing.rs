use crate::domain::clinical::{Billing, Consultation, PaymentMethod, PaymentStatus};
use crate::utils::error::{ClinicError, Result};
use rust_decimal::Decimal;

/// Sum of every billable line on the consultation. Vaccines bill once each.
pub fn subtotal(consultation: &Consultation) -> Decimal {
    let services: Decimal = consultation
        .services
        .iter()
        .map(|line| line.unit_price * Decimal::from(line.quantity))
        .sum();
    let medications: Decimal = consultation
        .medications
        .iter()
        .map(|line| line.unit_price * Decimal::from(line.quantity))
        .sum();
    let vaccines: Decimal = consultation.vaccines.iter().map(|v| v.unit_price).sum();

    services + medications + vaccines
}

pub fn payment_status(total: Decimal, amount_paid: Decimal) -> PaymentStatus {
    if amount_paid >= total {
        PaymentStatus::Pagado
    } else if amount_paid > Decimal::ZERO {
        PaymentStatus::Parcial
    } else {
        PaymentStatus::Pendiente
    }
}

/// total = subtotal - discount, with 0 <= discount <= subtotal.
pub fn compute_billing(
    consultation: &Consultation,
    discount: Decimal,
    amount_paid: Decimal,
    method: Option<PaymentMethod>,
) -> Result<Billing> {
    let subtotal = subtotal(consultation);

    if discount < Decimal::ZERO {
        return Err(ClinicError::validation("El descuento no puede ser negativo."));
    }
    if discount > subtotal {
        return Err(ClinicError::validation(format!(
            "El descuento ({}) supera el subtotal ({}).",
            discount, subtotal
        )));
    }
    if amount_paid < Decimal::ZERO {
        return Err(ClinicError::validation("El monto pagado no puede ser negativo."));
    }
    if amount_paid > Decimal::ZERO && method.is_none() {
        return Err(ClinicError::validation("Indica el método de pago."));
    }

    let total = subtotal - discount;
    Ok(Billing {
        subtotal,
        discount,
        total,
        amount_paid,
        payment_status: payment_status(total, amount_paid),
        payment_method: method,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clinical::{
        AppliedMedication, AppliedService, AppliedVaccine, ConsultationStatus, Vitals,
    };
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn consultation() -> Consultation {
        Consultation {
            id: "c1".to_string(),
            appointment_id: "a1".to_string(),
            pet_id: "p1".to_string(),
            vet_id: "v1".to_string(),
            started_at: Utc::now(),
            finished_at: None,
            status: ConsultationStatus::EnProgreso,
            vitals: Vitals::default(),
            anamnesis: None,
            diagnosis: None,
            treatment: None,
            notes: None,
            services: vec![AppliedService {
                service_id: "s1".to_string(),
                name: "Consulta general".to_string(),
                unit_price: dec!(60),
                quantity: 1,
            }],
            medications: vec![AppliedMedication {
                item_id: "m1".to_string(),
                name: "Meloxicam".to_string(),
                dose: "0.1 mg/kg".to_string(),
                unit_price: dec!(7.50),
                quantity: 2,
            }],
            vaccines: vec![AppliedVaccine {
                item_id: "v1".to_string(),
                name: "Séxtuple".to_string(),
                lot: Some("L-22".to_string()),
                next_dose_on: None,
                unit_price: dec!(40),
            }],
            billing: Billing::default(),
        }
    }

    #[test]
    fn test_total_is_subtotal_minus_discount() {
        let billing =
            compute_billing(&consultation(), dec!(15), dec!(0), None).unwrap();
        assert_eq!(billing.subtotal, dec!(115));
        assert_eq!(billing.total, dec!(100));
        assert_eq!(billing.payment_status, PaymentStatus::Pendiente);
    }

    #[test]
    fn test_payment_status_thresholds() {
        let c = consultation();
        let partial =
            compute_billing(&c, dec!(0), dec!(50), Some(PaymentMethod::Efectivo)).unwrap();
        assert_eq!(partial.payment_status, PaymentStatus::Parcial);

        let paid =
            compute_billing(&c, dec!(15), dec!(100), Some(PaymentMethod::Tarjeta)).unwrap();
        assert_eq!(paid.payment_status, PaymentStatus::Pagado);
    }

    #[test]
    fn test_rejects_discount_above_subtotal() {
        let err = compute_billing(&consultation(), dec!(116), dec!(0), None).unwrap_err();
        assert!(matches!(err, ClinicError::ValidationError { .. }));
        assert!(compute_billing(&consultation(), dec!(-1), dec!(0), None).is_err());
    }

    #[test]
    fn test_payment_requires_method() {
        assert!(compute_billing(&consultation(), dec!(0), dec!(10), None).is_err());
    }
}
