//! Доступ к серверу заявок

mod client;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::models::*;

pub use client::CarbonateClient;

/// Ресурсы заявок и кислот
#[async_trait]
pub trait CarbonateApi: Send + Sync {
    /// Сводка по текущему черновику пользователя
    async fn current_carbonate(&self) -> Result<CurrentCarbonateInfo, ApiError>;

    async fn list_carbonates(&self, filter: &ListFilter) -> Result<Vec<CarbonateListEntry>, ApiError>;

    async fn carbonate_detail(&self, id: i64) -> Result<CarbonateDetail, ApiError>;

    async fn update_carbonate_mass(&self, id: i64, mass: f64) -> Result<(), ApiError>;

    async fn set_carbonate_status(&self, id: i64, status: CarbonateStatus) -> Result<(), ApiError>;

    async fn delete_carbonate(&self, id: i64) -> Result<(), ApiError>;

    /// Сформировать текущий черновик
    async fn submit_form(&self) -> Result<(), ApiError>;

    /// Добавить кислоту в текущий черновик
    async fn add_acid(&self, acid_id: i64) -> Result<(), ApiError>;

    async fn update_acid_mass(&self, acid_id: i64, mass: f64) -> Result<(), ApiError>;

    async fn remove_acid(&self, acid_id: i64) -> Result<(), ApiError>;
}

/// Сессия пользователя
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, login: &str, password: &str) -> Result<LoginResponse, ApiError>;

    async fn logout(&self) -> Result<(), ApiError>;

    async fn profile(&self) -> Result<User, ApiError>;
}
