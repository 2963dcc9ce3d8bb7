use anyhow::Context as _;
use clap::Parser;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use vetclinic_client::config::cli::{
    CitaCommand, ConsultaCommand, HorarioCommand, InventarioCommand, MascotaCommand,
    MercadoCommand, OfertaCommand, ReservaCommand, SolicitudCommand,
};
use vetclinic_client::config::Command;
use vetclinic_client::domain::booking::NewSolicitud;
use vetclinic_client::domain::clinical::ConsultationEdit;
use vetclinic_client::domain::inventory::InventoryItem;
use vetclinic_client::domain::ports::{
    ConfigProvider, InventoryRepository, NearbyFilter, ServiceCatalog,
};
use vetclinic_client::utils::{logger, validation::Validate};
use vetclinic_client::{
    render, ApiClient, AppConfig, AppointmentsViewModel, CliConfig, ClinicError,
    ConsultationViewModel, InventoryViewModel, ListState, LocalStorage, MarketplaceViewModel,
    Notice, OfertasViewModel, OutputFormat, PetsViewModel, Render, ReservasViewModel,
    ScheduleViewModel, Session, SessionStore, SolicitudesViewModel, TomlConfig,
};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting vetclinic CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(err) = run(cli).await {
        let exit_code = match err.downcast_ref::<ClinicError>() {
            Some(e) => {
                tracing::error!("❌ {}", e);
                eprintln!("❌ {}", e.user_message());
                e.exit_code()
            }
            None => {
                tracing::error!("❌ {:#}", err);
                eprintln!("❌ {:#}", err);
                1
            }
        };
        std::process::exit(exit_code);
    }
}

/// Everything a command needs once config and session are resolved.
struct Context {
    config: AppConfig,
    session: Option<Session>,
    client: ApiClient,
}

impl Context {
    fn format(&self) -> OutputFormat {
        self.config.output_format()
    }

    fn session(&self) -> Result<&Session, ClinicError> {
        self.session.as_ref().ok_or_else(|| ClinicError::Unauthorized {
            message: "no active session, run `vetclinic login` first".to_string(),
        })
    }
}

async fn run(cli: CliConfig) -> anyhow::Result<()> {
    let CliConfig {
        config: config_path,
        api_url,
        format,
        session_dir,
        command,
        ..
    } = cli;
    let store = SessionStore::new(LocalStorage::new(session_dir));

    let command = match command {
        Command::Login {
            token,
            user_id,
            role,
        } => {
            let session = Session {
                token,
                user_id,
                role,
            };
            store.save(&session).await?;
            eprintln!("✅ Sesión iniciada como {} ({})", session.user_id, session.role);
            return Ok(());
        }
        Command::Logout => {
            store.clear().await?;
            eprintln!("✅ Sesión cerrada");
            return Ok(());
        }
        other => other,
    };

    let file = match config_path.as_deref() {
        Some(path) => {
            let file = TomlConfig::from_file(path)
                .with_context(|| format!("cannot load config {}", path.display()))?;
            file.validate()?;
            Some(file)
        }
        None => None,
    };
    let config = AppConfig::layered(file.as_ref(), api_url, format)?;

    // a session pinned in the config file wins over the stored one
    let session = match config.session.clone() {
        Some(session) => Some(session),
        None => store.load().await?,
    };
    let client = ApiClient::new(&config, session.as_ref().map(|s| s.token.clone()))?;
    tracing::debug!("Using API at {}", client.base_url());

    let ctx = Context {
        config,
        session,
        client,
    };

    match command {
        Command::Login { .. } | Command::Logout => Ok(()),
        Command::Reservas(cmd) => reservas(&ctx, cmd).await,
        Command::Solicitudes(cmd) => solicitudes(&ctx, cmd).await,
        Command::Ofertas(cmd) => ofertas(&ctx, cmd).await,
        Command::Mercado(cmd) => mercado(&ctx, cmd).await,
        Command::Inventario(cmd) => inventario(&ctx, cmd).await,
        Command::Horario(cmd) => horario(&ctx, cmd).await,
        Command::Citas(cmd) => citas(&ctx, cmd).await,
        Command::Consulta(cmd) => consulta(&ctx, cmd).await,
        Command::Mascotas(cmd) => mascotas(&ctx, cmd).await,
        Command::Servicios => {
            let services = ctx.client.list_services().await?;
            print_items(ctx.format(), &services)
        }
    }
}

async fn reservas(ctx: &Context, cmd: ReservaCommand) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let mut vm = ReservasViewModel::new(ctx.client.clone(), session.role)
        .with_policy(ctx.config.on_failure());

    match cmd {
        ReservaCommand::List { estado } => vm.load(estado).await?,
        ReservaCommand::Confirm { id } => {
            vm.load(None).await?;
            vm.confirm(&id).await?;
        }
        ReservaCommand::Cancel { id, motivo } => {
            vm.load(None).await?;
            vm.cancel(&id, motivo).await?;
        }
        ReservaCommand::Complete { id } => {
            vm.load(None).await?;
            vm.complete(&id).await?;
        }
        ReservaCommand::Book { from } => {
            let reserva = read_json(&from)?;
            vm.load(None).await?;
            vm.book_slot(reserva).await?;
        }
    }
    show(ctx.format(), &mut vm.state)
}

async fn solicitudes(ctx: &Context, cmd: SolicitudCommand) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let mut vm = SolicitudesViewModel::new(ctx.client.clone(), ctx.client.clone(), session)
        .with_policy(ctx.config.on_failure());

    vm.load().await?;
    match cmd {
        SolicitudCommand::List => {}
        SolicitudCommand::Submit { from } => {
            let solicitud: NewSolicitud = read_json(&from)?;
            if solicitud.service_id.is_some() {
                vm.load_services().await?;
            }
            vm.submit(solicitud).await?;
        }
        SolicitudCommand::Withdraw { id } => vm.withdraw(&id).await?,
    }
    show(ctx.format(), &mut vm.state)
}

async fn ofertas(ctx: &Context, cmd: OfertaCommand) -> anyhow::Result<()> {
    let mut vm = OfertasViewModel::new(ctx.client.clone()).with_policy(ctx.config.on_failure());

    match cmd {
        OfertaCommand::List { solicitud_id } => vm.load(&solicitud_id).await?,
        OfertaCommand::Accept {
            solicitud_id,
            oferta_id,
            horario,
        } => {
            vm.load(&solicitud_id).await?;
            let reserva = vm.accept(&oferta_id, horario).await?;
            show(ctx.format(), &mut vm.state)?;
            return print_items(ctx.format(), std::slice::from_ref(&reserva));
        }
    }
    show(ctx.format(), &mut vm.state)
}

async fn mercado(ctx: &Context, cmd: MercadoCommand) -> anyhow::Result<()> {
    let mut vm =
        MarketplaceViewModel::new(ctx.client.clone()).with_policy(ctx.config.on_failure());

    match cmd {
        MercadoCommand::List { lat, lng, radio_km } => {
            let near = match (lat, lng) {
                (Some(latitude), Some(longitude)) => Some(NearbyFilter {
                    latitude,
                    longitude,
                    radius_km: radio_km,
                }),
                _ => None,
            };
            vm.load(near).await?;
        }
        MercadoCommand::Mine => {
            vm.load(None).await?;
            return show(ctx.format(), &mut vm.offers);
        }
        MercadoCommand::Offer { solicitud_id, from } => {
            let oferta = read_json(&from)?;
            vm.load(None).await?;
            vm.send_offer(&solicitud_id, oferta).await?;
            return show(ctx.format(), &mut vm.offers);
        }
        MercadoCommand::Withdraw { oferta_id } => {
            vm.load(None).await?;
            vm.withdraw_offer(&oferta_id).await?;
            return show(ctx.format(), &mut vm.offers);
        }
    }
    show(ctx.format(), &mut vm.state)
}

async fn inventario(ctx: &Context, cmd: InventarioCommand) -> anyhow::Result<()> {
    let mut vm = InventoryViewModel::new(ctx.client.clone()).with_policy(ctx.config.on_failure());

    match cmd {
        InventarioCommand::List { tipo, bajo } => {
            vm.load(tipo).await?;
            if bajo {
                let low: Vec<InventoryItem> = vm.low_stock().into_iter().cloned().collect();
                return print_items(ctx.format(), &low);
            }
        }
        InventarioCommand::Add { from } => {
            let item = read_json(&from)?;
            vm.load(None).await?;
            vm.add_item(item).await?;
        }
        InventarioCommand::Adjust { id, delta } => {
            vm.load(None).await?;
            vm.adjust_stock(&id, delta).await?;
        }
    }
    show(ctx.format(), &mut vm.state)
}

async fn horario(ctx: &Context, cmd: HorarioCommand) -> anyhow::Result<()> {
    let mut vm = ScheduleViewModel::new(ctx.client.clone()).with_policy(ctx.config.on_failure());
    let today = chrono::Local::now().date_naive();

    match cmd {
        HorarioCommand::List { desde } => vm.load(desde.unwrap_or(today)).await?,
        HorarioCommand::Toggle { date } => {
            vm.load(date).await?;
            vm.toggle_day(date).await?;
        }
    }
    show(ctx.format(), &mut vm.state)
}

async fn citas(ctx: &Context, cmd: CitaCommand) -> anyhow::Result<()> {
    let mut vm = AppointmentsViewModel::new(ctx.client.clone());

    match cmd {
        CitaCommand::List { desde, hasta } => {
            vm.load(desde, hasta).await?;
            show(ctx.format(), &mut vm.state)
        }
        CitaCommand::History { pet_id } => {
            vm.history(&pet_id).await?;
            show(ctx.format(), &mut vm.history)
        }
    }
}

async fn consulta(ctx: &Context, cmd: ConsultaCommand) -> anyhow::Result<()> {
    let mut vm =
        ConsultationViewModel::new(ctx.client.clone()).with_policy(ctx.config.on_failure());

    match cmd {
        ConsultaCommand::Start { cita_id } => vm.start(&cita_id).await?,
        ConsultaCommand::Show { id } => vm.open(&id).await?,
        ConsultaCommand::Edit { id, from } => {
            let edit: ConsultationEdit = read_json(&from)?;
            let services = if edit.needs_services() {
                ctx.client.list_services().await?
            } else {
                Vec::new()
            };
            let items = if edit.needs_inventory() {
                ctx.client.list_items(None).await?
            } else {
                Vec::new()
            };
            vm.open(&id).await?;
            vm.apply(edit, &services, &items)?;
            vm.save().await?;
        }
        ConsultaCommand::Finish {
            id,
            descuento,
            pagado,
            metodo,
        } => {
            vm.open(&id).await?;
            vm.finish(descuento, pagado, metodo).await?;
        }
    }

    if let Some(Notice::Info(text)) = vm.take_notice() {
        eprintln!("✅ {}", text);
    }
    let consultation: Vec<_> = vm.consultation.into_iter().collect();
    print_items(ctx.format(), &consultation)
}

async fn mascotas(ctx: &Context, cmd: MascotaCommand) -> anyhow::Result<()> {
    let mut vm = PetsViewModel::new(ctx.client.clone());

    vm.load().await?;
    if let MascotaCommand::Register { from } = cmd {
        let pet = read_json(&from)?;
        vm.register(pet).await?;
    }
    show(ctx.format(), &mut vm.state)
}

/// Prints the pending notice on stderr and the list on stdout.
fn show<T: Render + Serialize + Clone>(format: OutputFormat, state: &mut ListState<T>) -> anyhow::Result<()> {
    if let Some(notice) = state.take_notice() {
        let mark = if notice.is_error() { "⚠️" } else { "✅" };
        eprintln!("{} {}", mark, notice.text());
    }
    print_items(format, &state.items)
}

fn print_items<T: Render + Serialize>(format: OutputFormat, items: &[T]) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    render(format, items, &mut stdout.lock())?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let data = std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("invalid JSON in {}", path.display()))
}
