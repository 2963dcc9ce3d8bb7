use crate::domain::booking::{Oferta, Reserva, Solicitud};
use crate::domain::clinical::{Appointment, Consultation};
use crate::domain::inventory::InventoryItem;
use crate::domain::model::{wire_name, Pet, Service, TimeBlock};
use crate::domain::schedule::DaySchedule;
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

/// Flat row view of a record for table and CSV output.
pub trait Render {
    fn headers() -> &'static [&'static str];
    fn row(&self) -> Vec<String>;
}

pub fn render<T: Render + Serialize, W: Write>(
    format: OutputFormat,
    items: &[T],
    out: &mut W,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, items)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(out);
            writer.write_record(T::headers())?;
            for item in items {
                writer.write_record(item.row())?;
            }
            writer.flush()?;
        }
        OutputFormat::Table => write_table(T::headers(), items.iter().map(|item| item.row()), out)?,
    }
    Ok(())
}

fn write_table<W: Write>(
    headers: &[&str],
    rows: impl Iterator<Item = Vec<String>>,
    out: &mut W,
) -> Result<()> {
    let rows: Vec<Vec<String>> = rows.collect();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<String>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    writeln!(out, "{}", line(headers.iter().map(|h| h.to_string()).collect()))?;
    for row in rows {
        writeln!(out, "{}", line(row))?;
    }
    Ok(())
}

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

impl Render for Reserva {
    fn headers() -> &'static [&'static str] {
        &["id", "mascota", "procedimiento", "fecha", "modalidad", "precio", "estado"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.pet_id.clone(),
            self.procedure.clone(),
            self.scheduled_at.format("%Y-%m-%d %H:%M").to_string(),
            wire_name(&self.mode),
            opt(&self.price),
            self.status.to_string(),
        ]
    }
}

impl Render for Solicitud {
    fn headers() -> &'static [&'static str] {
        &["id", "mascota", "procedimiento", "fecha", "bloque", "modalidad", "ofertas", "estado"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.pet_name.clone().unwrap_or_else(|| self.pet_id.clone()),
            self.procedure.clone(),
            self.desired_date.to_string(),
            wire_name(&self.time_block),
            wire_name(&self.mode),
            self.offers_count.to_string(),
            wire_name(&self.status),
        ]
    }
}

impl Render for Oferta {
    fn headers() -> &'static [&'static str] {
        &["id", "solicitud", "veterinario", "total", "horarios", "estado"]
    }

    fn row(&self) -> Vec<String> {
        let times = self
            .time_options
            .iter()
            .enumerate()
            .map(|(i, at)| format!("[{}] {}", i, at.format("%Y-%m-%d %H:%M")))
            .collect::<Vec<_>>()
            .join(" ");
        vec![
            self.id.clone(),
            self.solicitud_id.clone(),
            self.vet_name.clone().unwrap_or_else(|| self.vet_id.clone()),
            self.total_price().to_string(),
            times,
            wire_name(&self.status),
        ]
    }
}

impl Render for Appointment {
    fn headers() -> &'static [&'static str] {
        &["id", "mascota", "fecha", "modalidad", "motivo", "estado"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.pet_name.clone().unwrap_or_else(|| self.pet_id.clone()),
            self.scheduled_at.format("%Y-%m-%d %H:%M").to_string(),
            wire_name(&self.mode),
            opt(&self.reason),
            wire_name(&self.status),
        ]
    }
}

impl Render for Consultation {
    fn headers() -> &'static [&'static str] {
        &["id", "mascota", "inicio", "diagnostico", "total", "pagado", "pago", "estado"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.pet_id.clone(),
            self.started_at.format("%Y-%m-%d %H:%M").to_string(),
            opt(&self.diagnosis),
            self.billing.total.to_string(),
            self.billing.amount_paid.to_string(),
            self.billing.payment_status.to_string(),
            wire_name(&self.status),
        ]
    }
}

impl Render for InventoryItem {
    fn headers() -> &'static [&'static str] {
        &["id", "nombre", "tipo", "stock", "minimo", "precio", "vence"]
    }

    fn row(&self) -> Vec<String> {
        let stock = if self.is_low_stock() {
            format!("{} (!)", self.stock)
        } else {
            self.stock.to_string()
        };
        vec![
            self.id.clone(),
            self.name.clone(),
            self.kind().as_query().to_string(),
            stock,
            self.min_stock.to_string(),
            self.unit_price.to_string(),
            opt(&self.expires_on),
        ]
    }
}

impl Render for DaySchedule {
    fn headers() -> &'static [&'static str] {
        &["fecha", "dia", "habilitado", "bloques"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.date.to_string(),
            self.date.format("%a").to_string(),
            if self.enabled { "si" } else { "no" }.to_string(),
            self.blocks
                .iter()
                .map(wire_name::<TimeBlock>)
                .collect::<Vec<_>>()
                .join(","),
        ]
    }
}

impl Render for Pet {
    fn headers() -> &'static [&'static str] {
        &["id", "nombre", "especie", "raza", "peso_kg"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            wire_name(&self.species),
            opt(&self.breed),
            opt(&self.weight_kg),
        ]
    }
}

impl Render for Service {
    fn headers() -> &'static [&'static str] {
        &["id", "nombre", "precio", "minutos"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.base_price.to_string(),
            self.duration_minutes.to_string(),
        ]
    }
}
