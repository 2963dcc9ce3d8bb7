use anyhow::Result;
use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;
use vetclinic_client::domain::model::{NewPet, Role, Species};
use vetclinic_client::domain::ports::{ConfigProvider, PetRepository};
use vetclinic_client::{
    ApiClient, AppConfig, ClinicError, LocalStorage, Notice, OnFailure, OutputFormat,
    PetsViewModel, Session, SessionStore, TomlConfig,
};

#[tokio::test]
async fn test_session_survives_restart() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let session = Session {
        token: "tok-abc".to_string(),
        user_id: "vet-7".to_string(),
        role: Role::Veterinario,
    };

    SessionStore::new(LocalStorage::new(temp_dir.path().join("nested")))
        .save(&session)
        .await?;
    assert!(temp_dir.path().join("nested/session.json").exists());

    let store = SessionStore::new(LocalStorage::new(temp_dir.path().join("nested")));
    assert_eq!(store.load().await?, Some(session));

    store.clear().await?;
    assert_eq!(store.load().await?, None);
    // clearing twice is fine
    store.clear().await?;
    Ok(())
}

#[tokio::test]
async fn test_config_file_drives_client() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();

    let config_path = temp_dir.path().join("vetclinic.toml");
    tokio::fs::write(
        &config_path,
        format!(
            r#"
[api]
base_url = "{}/v1/"
timeout_seconds = 5

[session]
token = "pinned-token"
user_id = "cli-3"
role = "CLIENTE"

[ui]
on_failure = "keep"

[output]
format = "csv"
"#,
            server.base_url()
        ),
    )
    .await?;

    let file = TomlConfig::from_file(&config_path)?;
    let config = AppConfig::layered(Some(&file), None, None)?;

    assert_eq!(config.request_timeout(), Duration::from_secs(5));
    assert_eq!(config.on_failure(), OnFailure::Keep);
    assert_eq!(config.output_format(), OutputFormat::Csv);
    let session = config.session.clone().unwrap();
    assert_eq!(session.role, Role::Cliente);

    let pets_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/mascotas")
            .header("authorization", "Bearer pinned-token");
        then.status(200).json_body(json!([
            {
                "id": "pet-1",
                "ownerId": "cli-3",
                "name": "Luna",
                "species": "GATO",
                "weightKg": 4.2
            }
        ]));
    });

    let client = ApiClient::new(&config, Some(session.token))?;
    assert_eq!(client.base_url(), format!("{}/v1", server.base_url()));

    let mut vm = PetsViewModel::new(client);
    vm.load().await?;

    pets_mock.assert();
    assert_eq!(vm.state.items[0].name, "Luna");
    Ok(())
}

#[tokio::test]
async fn test_not_found_maps_to_resource() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/mascotas/pet-404");
        then.status(404).json_body(json!({ "message": "not here" }));
    });

    let config = AppConfig::layered(None, Some(server.base_url()), None)?;
    let client = ApiClient::new(&config, None)?;

    let err = client.get_pet("pet-404").await.unwrap_err();
    assert!(matches!(err, ClinicError::NotFound { .. }));
    assert_eq!(err.exit_code(), 1);
    Ok(())
}

#[test]
fn test_invalid_config_file_exit_code() {
    let file = TomlConfig::from_toml_str("[api]\nbase_url = \"https://x.example\"\ntimeout_seconds = 900\n")
        .unwrap();
    let err = AppConfig::layered(Some(&file), None, None).unwrap_err();
    assert!(matches!(err, ClinicError::InvalidConfigValueError { .. }));
    assert_eq!(err.exit_code(), 2);
}

fn pet_json(id: &str, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "ownerId": "cli-3",
        "name": name,
        "species": "PERRO",
        "weightKg": 18.0
    })
}

fn new_pet(name: &str, weight_kg: Option<f64>) -> NewPet {
    NewPet {
        name: name.to_string(),
        species: Species::Perro,
        breed: Some("Mestizo".to_string()),
        sex: None,
        birth_date: None,
        weight_kg,
    }
}

#[tokio::test]
async fn test_register_pet_reloads_list() -> Result<()> {
    let server = MockServer::start();

    let list_mock = server.mock(|when, then| {
        when.method(GET).path("/mascotas");
        then.status(200).json_body(json!([pet_json("pet-1", "Luna")]));
    });
    let create_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/mascotas")
            .json_body(json!({
                "name": "Toby",
                "species": "PERRO",
                "breed": "Mestizo",
                "weightKg": 18.0
            }));
        then.status(201).json_body(pet_json("pet-2", "Toby"));
    });

    let config = AppConfig::layered(None, Some(server.base_url()), None)?;
    let mut vm = PetsViewModel::new(ApiClient::new(&config, Some("tok".to_string()))?);
    vm.load().await?;

    let created = vm.register(new_pet("Toby", Some(18.0))).await?;

    create_mock.assert();
    list_mock.assert_hits(2);
    assert_eq!(created.id, "pet-2");
    assert!(vm.state.take_notice().is_some_and(|n| !n.is_error()));
    Ok(())
}

#[tokio::test]
async fn test_register_pet_validation_and_failure() -> Result<()> {
    let server = MockServer::start();

    let list_mock = server.mock(|when, then| {
        when.method(GET).path("/mascotas");
        then.status(200).json_body(json!([pet_json("pet-1", "Luna")]));
    });
    let create_mock = server.mock(|when, then| {
        when.method(POST).path("/mascotas");
        then.status(500)
            .json_body(json!({ "error": "No se pudo registrar" }));
    });

    let config = AppConfig::layered(None, Some(server.base_url()), None)?;
    let mut vm = PetsViewModel::new(ApiClient::new(&config, None)?);
    vm.load().await?;

    assert!(matches!(
        vm.register(new_pet("  ", None)).await,
        Err(ClinicError::ValidationError { .. })
    ));
    assert!(vm.register(new_pet("Toby", Some(0.0))).await.is_err());
    create_mock.assert_hits(0);

    assert!(vm.register(new_pet("Toby", None)).await.is_err());
    create_mock.assert_hits(1);
    list_mock.assert_hits(1);
    assert_eq!(vm.state.items.len(), 1);
    assert_eq!(
        vm.state.take_notice(),
        Some(Notice::Error("No se pudo registrar".to_string()))
    );
    Ok(())
}
