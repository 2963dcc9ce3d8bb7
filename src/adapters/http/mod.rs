//! reqwest implementation of every repository port.

mod clinical;
mod inventory;
mod marketplace;
mod pets;
mod reservas;
mod schedule;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ClinicError, Result};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new<C: ConfigProvider>(config: &C, token: Option<String>) -> Result<Self> {
        crate::utils::validation::validate_url("api.base_url", config.api_base_url())?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("vetclinic-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url().trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("📡 {} {}", method, url);

        let request = self.client.request(method, url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self.request(Method::GET, path).query(query).send().await?;
        Self::read_json(path, response).await
    }

    pub(crate) async fn send<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self.request(method, path).json(body).send().await?;
        Self::read_json(path, response).await
    }

    /// For endpoints whose response body we ignore.
    pub(crate) async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<()> {
        let mut request = self.request(method, path);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        Self::check_status(path, response).await.map(|_| ())
    }

    async fn read_json<T: DeserializeOwned>(path: &str, response: Response) -> Result<T> {
        let response = Self::check_status(path, response).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn check_status(path: &str, response: Response) -> Result<Response> {
        let status = response.status();
        tracing::debug!("📡 {} -> {}", path, status);

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ClinicError::Unauthorized { message }
            }
            StatusCode::NOT_FOUND => ClinicError::NotFound {
                resource: resource_name(path),
                id: path.to_string(),
            },
            _ => ClinicError::ApiError {
                status: status.as_u16(),
                message,
            },
        })
    }
}

/// Backend errors come as `{"message": ...}` or `{"error": ...}`; anything
/// else is passed through raw.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "error", "mensaje"]
                .iter()
                .find_map(|key| value.get(*key).and_then(|v| v.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string())
}

fn resource_name(path: &str) -> String {
    let name = path
        .trim_start_matches('/')
        .split('/')
        .next()
        .unwrap_or_default();
    match name {
        "mascotas" => "la mascota",
        "solicitudes" => "la solicitud",
        "ofertas" => "la oferta",
        "reservas" => "la reserva",
        "citas" => "la cita",
        "consultas" => "la consulta",
        "inventario" => "el producto",
        "horario" => "el horario",
        _ => "el recurso",
    }
    .to_string()
}

/// Path segment escaping for ids coming from user input.
pub(crate) fn segment(id: &str) -> String {
    let Ok(mut url) = url::Url::parse("http://segment.invalid/") else {
        return id.to_string();
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().push(id);
    }
    url.path().trim_start_matches('/').to_string()
}
