//! HTTP клиент сервера заявок

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::{AuthApi, CarbonateApi};
use crate::config::Settings;
use crate::error::ApiError;
use crate::models::*;

/// Клиент REST API заявок
pub struct CarbonateClient {
    client: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl CarbonateClient {
    /// Создать клиент по настройкам
    pub fn new(settings: &Settings) -> Result<Self, ApiError> {
        let client = Client::builder()
            .gzip(true)
            .timeout(settings.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(settings.api_token.clone()),
        })
    }

    /// Клиент с адресом по умолчанию и заданным таймаутом
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let settings = Settings {
            api_base_url: base_url.to_string(),
            request_timeout: timeout,
            ..Settings::default()
        };
        Self::new(&settings)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("{} request to: {}", method, url);

        let builder = self.client.request(method, &url);
        match self.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and return the raw body of a successful response
    async fn send(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let response = builder.send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("API error response: {} - {}", status, body);
            return Err(ApiError::from_status(status.as_u16(), body));
        }

        debug!("Response body (first 500 chars): {}", body.chars().take(500).collect::<String>());
        Ok(body)
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let body = self.send(self.request(Method::GET, endpoint)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Запрос с телом, ответ не разбирается
    async fn send_json<B: Serialize>(
        &self,
        method: Method,
        endpoint: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        self.send(self.request(method, endpoint).json(body)).await?;
        Ok(())
    }

    /// Запрос без тела, ответ не разбирается
    async fn send_empty(&self, method: Method, endpoint: &str) -> Result<(), ApiError> {
        self.send(self.request(method, endpoint)).await?;
        Ok(())
    }
}

#[async_trait]
impl CarbonateApi for CarbonateClient {
    async fn current_carbonate(&self) -> Result<CurrentCarbonateInfo, ApiError> {
        self.get("/carbonates/current").await
    }

    async fn list_carbonates(&self, filter: &ListFilter) -> Result<Vec<CarbonateListEntry>, ApiError> {
        let response: CarbonateListResponse = self
            .get(&format!("/carbonates{}", filter.query_string()))
            .await?;
        Ok(response.carbonates.unwrap_or_default())
    }

    async fn carbonate_detail(&self, id: i64) -> Result<CarbonateDetail, ApiError> {
        self.get(&format!("/carbonates/{}", id)).await
    }

    async fn update_carbonate_mass(&self, id: i64, mass: f64) -> Result<(), ApiError> {
        info!("Updating carbonate {} mass to {}", id, mass);
        self.send_json(Method::PUT, &format!("/carbonates/{}", id), &MassRequest { mass })
            .await
    }

    async fn set_carbonate_status(&self, id: i64, status: CarbonateStatus) -> Result<(), ApiError> {
        info!("Setting carbonate {} status to {}", id, status.as_wire());
        let body = StatusRequest {
            status: status.as_wire().to_string(),
        };
        self.send_json(Method::PUT, &format!("/carbonates/{}/status", id), &body)
            .await
    }

    async fn delete_carbonate(&self, id: i64) -> Result<(), ApiError> {
        info!("Deleting carbonate {}", id);
        self.send_empty(Method::DELETE, &format!("/carbonates/{}", id))
            .await
    }

    async fn submit_form(&self) -> Result<(), ApiError> {
        info!("Submitting current carbonate draft");
        self.send_empty(Method::PUT, "/carbonates/form").await
    }

    async fn add_acid(&self, acid_id: i64) -> Result<(), ApiError> {
        info!("Adding acid {} to current draft", acid_id);
        self.send_empty(Method::POST, &format!("/acids-to-carbonate/{}", acid_id))
            .await
    }

    async fn update_acid_mass(&self, acid_id: i64, mass: f64) -> Result<(), ApiError> {
        info!("Updating acid {} mass to {}", acid_id, mass);
        self.send_json(
            Method::PUT,
            &format!("/carbonate-acids/{}", acid_id),
            &MassRequest { mass },
        )
        .await
    }

    async fn remove_acid(&self, acid_id: i64) -> Result<(), ApiError> {
        info!("Removing acid {} from draft", acid_id);
        self.send_empty(Method::DELETE, &format!("/carbonate-acids/{}", acid_id))
            .await
    }
}

#[async_trait]
impl AuthApi for CarbonateClient {
    async fn login(&self, login: &str, password: &str) -> Result<LoginResponse, ApiError> {
        info!("Logging in as {}", login);

        let request = LoginRequest {
            login: login.to_string(),
            password: password.to_string(),
        };
        let body = self
            .send(self.request(Method::POST, "/auth/login").json(&request))
            .await?;
        let response: LoginResponse = serde_json::from_str(&body)?;

        if let Ok(mut token) = self.token.write() {
            *token = Some(response.token.clone());
        }
        Ok(response)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let result = self.send_empty(Method::POST, "/auth/logout").await;

        // Токен больше не действителен, даже если сервер ответил ошибкой
        if let Ok(mut token) = self.token.write() {
            *token = None;
        }
        result
    }

    async fn profile(&self) -> Result<User, ApiError> {
        self.get("/users/profile").await
    }
}
