use crate::app::render::OutputFormat;
use crate::domain::booking::ReservaStatus;
use crate::domain::clinical::PaymentMethod;
use crate::domain::inventory::InventoryKind;
use crate::domain::model::Role;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "vetclinic")]
#[command(about = "Client for the veterinary booking marketplace")]
pub struct CliConfig {
    /// TOML config file
    #[arg(long, global = true, env = "VETCLINIC_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, env = "VETCLINIC_API_URL")]
    pub api_url: Option<String>,

    /// table, json or csv
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Where the login session is kept
    #[arg(long, global = true, env = "VETCLINIC_SESSION_DIR", default_value = ".vetclinic")]
    pub session_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the token issued by the identity provider
    Login {
        #[arg(long)]
        token: String,
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        role: Role,
    },
    Logout,
    #[command(subcommand)]
    Reservas(ReservaCommand),
    #[command(subcommand)]
    Solicitudes(SolicitudCommand),
    #[command(subcommand)]
    Ofertas(OfertaCommand),
    /// Open requests seen by veterinarians
    #[command(subcommand)]
    Mercado(MercadoCommand),
    #[command(subcommand)]
    Inventario(InventarioCommand),
    #[command(subcommand)]
    Horario(HorarioCommand),
    #[command(subcommand)]
    Citas(CitaCommand),
    #[command(subcommand)]
    Consulta(ConsultaCommand),
    #[command(subcommand)]
    Mascotas(MascotaCommand),
    Servicios,
}

#[derive(Debug, Subcommand)]
pub enum ReservaCommand {
    List {
        #[arg(long)]
        estado: Option<ReservaStatus>,
    },
    Confirm {
        id: String,
    },
    Cancel {
        id: String,
        #[arg(long)]
        motivo: Option<String>,
    },
    Complete {
        id: String,
    },
    /// Book a published clinic slot (JSON body)
    Book {
        #[arg(long)]
        from: PathBuf,
    },
}

#[derive(Debug, Subcommand)]
pub enum SolicitudCommand {
    List,
    /// Publish a request read from a JSON file
    Submit {
        #[arg(long)]
        from: PathBuf,
    },
    Withdraw {
        id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum OfertaCommand {
    /// Offers received on one of your requests
    List { solicitud_id: String },
    Accept {
        solicitud_id: String,
        oferta_id: String,
        /// Index of the proposed time
        #[arg(long, default_value_t = 0)]
        horario: usize,
    },
}

#[derive(Debug, Subcommand)]
pub enum MercadoCommand {
    List {
        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,
        #[arg(long, default_value_t = 10.0)]
        radio_km: f64,
    },
    /// Your own offers
    Mine,
    Offer {
        solicitud_id: String,
        #[arg(long)]
        from: PathBuf,
    },
    Withdraw {
        oferta_id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum InventarioCommand {
    List {
        #[arg(long)]
        tipo: Option<InventoryKind>,
        /// Only items at or below their minimum stock
        #[arg(long)]
        bajo: bool,
    },
    Add {
        #[arg(long)]
        from: PathBuf,
    },
    Adjust {
        id: String,
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum HorarioCommand {
    List {
        #[arg(long)]
        desde: Option<NaiveDate>,
    },
    Toggle {
        date: NaiveDate,
    },
}

#[derive(Debug, Subcommand)]
pub enum CitaCommand {
    List {
        #[arg(long)]
        desde: Option<NaiveDate>,
        #[arg(long)]
        hasta: Option<NaiveDate>,
    },
    /// Clinical history of a pet
    History { pet_id: String },
}

#[derive(Debug, Subcommand)]
pub enum ConsultaCommand {
    Start {
        cita_id: String,
    },
    Show {
        id: String,
    },
    /// Apply draft edits (vitals, findings, lines, discount, payment) and save
    Edit {
        id: String,
        #[arg(long)]
        from: PathBuf,
    },
    Finish {
        id: String,
        #[arg(long, default_value = "0")]
        descuento: Decimal,
        #[arg(long, default_value = "0")]
        pagado: Decimal,
        #[arg(long)]
        metodo: Option<PaymentMethod>,
    },
}

#[derive(Debug, Subcommand)]
pub enum MascotaCommand {
    List,
    Register {
        #[arg(long)]
        from: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = CliConfig::try_parse_from([
            "vetclinic",
            "reservas",
            "list",
            "--estado",
            "PENDIENTE",
            "--format",
            "json",
            "--api-url",
            "http://localhost:8080",
        ])
        .unwrap();

        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:8080"));
        assert!(matches!(
            cli.command,
            Command::Reservas(ReservaCommand::List {
                estado: Some(ReservaStatus::Pendiente)
            })
        ));
    }

    #[test]
    fn test_negative_stock_delta() {
        let cli =
            CliConfig::try_parse_from(["vetclinic", "inventario", "adjust", "item-1", "-3"]).unwrap();
        match cli.command {
            Command::Inventario(InventarioCommand::Adjust { id, delta }) => {
                assert_eq!(id, "item-1");
                assert_eq!(delta, -3);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_finish_consultation_amounts() {
        let cli = CliConfig::try_parse_from([
            "vetclinic",
            "consulta",
            "finish",
            "c-1",
            "--pagado",
            "120.50",
            "--metodo",
            "EFECTIVO",
        ])
        .unwrap();
        match cli.command {
            Command::Consulta(ConsultaCommand::Finish {
                descuento,
                pagado,
                metodo,
                ..
            }) => {
                assert_eq!(descuento, Decimal::ZERO);
                assert_eq!(pagado, Decimal::new(12050, 2));
                assert_eq!(metodo, Some(PaymentMethod::Efectivo));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_edit_consultation_reads_draft_file() {
        let cli = CliConfig::try_parse_from([
            "vetclinic",
            "consulta",
            "edit",
            "c-1",
            "--from",
            "draft.json",
        ])
        .unwrap();
        match cli.command {
            Command::Consulta(ConsultaCommand::Edit { id, from }) => {
                assert_eq!(id, "c-1");
                assert_eq!(from, PathBuf::from("draft.json"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_login_requires_role() {
        assert!(CliConfig::try_parse_from(["vetclinic", "login", "--token", "t", "--user-id", "u"])
            .is_err());
    }
}
