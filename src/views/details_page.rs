//! Просмотр и редактирование одной заявки

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use super::ViewError;
use crate::error::ApiError;
use crate::models::*;
use crate::routes::Route;
use crate::state::CarbonateStore;

/// Строка таблицы кислот
#[derive(Debug, Clone, PartialEq)]
pub struct AcidRow {
    pub acid_id: Option<i64>,
    pub name: String,
    pub image: Option<String>,
    /// Текст в поле массы
    pub mass_input: String,
    /// Объём CO2 или `-`
    pub co2_volume: String,
    pub show_remove: bool,
}

/// Содержимое загруженной заявки
#[derive(Debug, Clone, PartialEq)]
pub struct DetailsContent {
    pub title: String,
    pub status: String,
    pub show_delete: bool,
    pub show_submit: bool,
    pub inputs_enabled: bool,
    pub error: Option<String>,
    pub carbonate_mass: String,
    pub rows: Vec<AcidRow>,
    pub column_count: usize,
    pub empty_message: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailsView {
    Loading,
    NotFound,
    Loaded(DetailsContent),
}

/// Страница заявки
pub struct CarbonateDetailsPage {
    store: Arc<CarbonateStore>,
    id: Option<i64>,
    carbonate_mass: String,
    acid_masses: HashMap<i64, String>,
    seeded_from: Option<CarbonateDetail>,
}

impl CarbonateDetailsPage {
    pub fn new(store: Arc<CarbonateStore>) -> Self {
        Self {
            store,
            id: None,
            carbonate_mass: String::new(),
            acid_masses: HashMap::new(),
            seeded_from: None,
        }
    }

    /// Открыть заявку: старая деталь сбрасывается до загрузки новой
    pub async fn open(&mut self, id: i64) -> Result<(), ApiError> {
        self.store.reset_detail();
        self.id = Some(id);
        self.seeded_from = None;

        let result = self.store.fetch_carbonate_detail(id).await;
        self.sync_inputs();
        result
    }

    /// Уйти со страницы
    pub fn close(&mut self) {
        self.store.reset_detail();
        self.id = None;
        self.seeded_from = None;
    }

    /// Заполнить поля ввода из детали, если она изменилась
    pub fn sync_inputs(&mut self) {
        let detail = self.store.snapshot().detail;
        if detail == self.seeded_from {
            return;
        }

        if let Some(detail) = &detail {
            self.carbonate_mass = detail.mass.map(|m| m.to_string()).unwrap_or_default();
            self.acid_masses = detail
                .acids()
                .iter()
                .filter_map(|item| {
                    let acid_id = item.target_acid_id()?;
                    Some((acid_id, item.mass.map(|m| m.to_string()).unwrap_or_default()))
                })
                .collect();
        }
        self.seeded_from = detail;
    }

    pub fn carbonate_mass_input(&self) -> &str {
        &self.carbonate_mass
    }

    pub fn set_carbonate_mass_input(&mut self, text: &str) {
        self.carbonate_mass = text.to_string();
    }

    pub fn acid_mass_input(&self, acid_id: i64) -> Option<&str> {
        self.acid_masses.get(&acid_id).map(String::as_str)
    }

    pub fn set_acid_mass_input(&mut self, acid_id: i64, text: &str) {
        self.acid_masses.insert(acid_id, text.to_string());
    }

    /// Заявку можно править только в статусе черновика
    pub fn is_draft(&self) -> bool {
        self.store
            .snapshot()
            .detail
            .is_some_and(|d| d.status() == Some(CarbonateStatus::Draft))
    }

    fn ensure_draft(&self) -> Result<(), ViewError> {
        if self.store.snapshot().detail.is_none() {
            return Err(ViewError::NoDetail);
        }
        if !self.is_draft() {
            return Err(ViewError::NotDraft);
        }
        Ok(())
    }

    /// Сохранить массу CaCO3; возвращает отправленное значение
    pub async fn save_carbonate_mass(&mut self) -> Result<f64, ViewError> {
        self.ensure_draft()?;

        let mass = parse_mass(&self.carbonate_mass);
        self.store.update_carbonate_mass(mass).await?;
        self.sync_inputs();
        Ok(mass)
    }

    /// Сохранить массу кислоты; возвращает отправленное значение
    pub async fn save_acid_mass(&mut self, acid_id: i64) -> Result<f64, ViewError> {
        self.ensure_draft()?;

        let mass = parse_mass(self.acid_mass_input(acid_id).unwrap_or_default());
        self.store.update_acid_mass(acid_id, mass).await?;
        self.sync_inputs();
        Ok(mass)
    }

    pub async fn remove_acid(&mut self, acid_id: i64) -> Result<(), ViewError> {
        self.ensure_draft()?;

        self.store.remove_acid_from_carbonate(acid_id).await?;
        self.sync_inputs();
        Ok(())
    }

    /// Сформировать заявку и перейти к списку
    pub async fn submit(&mut self) -> Result<Route, ViewError> {
        self.ensure_draft()?;

        self.store.submit_carbonate_form().await?;
        info!("Carbonate {:?} submitted", self.id);
        Ok(Route::CarbonateList)
    }

    /// Удалить черновик и перейти к каталогу кислот
    pub async fn delete(&mut self) -> Result<Route, ViewError> {
        self.ensure_draft()?;
        let id = self.id.ok_or(ViewError::NoDetail)?;

        self.store.delete_carbonate(id).await?;
        self.store.reset_detail();
        info!("Carbonate {} deleted", id);
        Ok(Route::Acids)
    }

    /// Отрисовать страницу. Поля ввода перед этим подтягиваются к
    /// текущей детали, если она сменилась в хранилище
    pub fn view(&mut self) -> DetailsView {
        self.sync_inputs();
        let state = self.store.snapshot();

        let Some(detail) = &state.detail else {
            return if state.loading {
                DetailsView::Loading
            } else {
                DetailsView::NotFound
            };
        };

        let is_draft = detail.status() == Some(CarbonateStatus::Draft);

        let rows: Vec<AcidRow> = detail
            .acids()
            .iter()
            .map(|item| {
                let acid_id = item.target_acid_id();
                let mass_input = acid_id
                    .and_then(|id| self.acid_masses.get(&id).cloned())
                    .or_else(|| item.mass.map(|m| m.to_string()))
                    .unwrap_or_default();

                AcidRow {
                    acid_id,
                    name: item
                        .acid
                        .as_ref()
                        .and_then(|a| a.name.clone())
                        .unwrap_or_default(),
                    image: item.acid.as_ref().and_then(|a| a.img.clone()),
                    mass_input,
                    co2_volume: match item.result {
                        Some(v) if v != 0.0 => format!("{:.2}", v),
                        _ => "-".to_string(),
                    },
                    show_remove: is_draft,
                }
            })
            .collect();

        let empty_message = rows.is_empty().then_some("Список кислот пуст");

        DetailsView::Loaded(DetailsContent {
            title: format!("Заявка №{}", detail.id),
            status: detail.status.clone().unwrap_or_default(),
            show_delete: is_draft,
            show_submit: is_draft,
            inputs_enabled: is_draft,
            error: state.error.as_ref().map(|e| format!("Ошибка: {}", e)),
            carbonate_mass: self.carbonate_mass.clone(),
            rows,
            column_count: if is_draft { 5 } else { 4 },
            empty_message,
        })
    }
}

/// Разобрать массу из поля ввода. Нечисловой ввод сохраняется как 0
pub fn parse_mass(text: &str) -> f64 {
    let normalized = text.trim().replace(',', ".");

    match normalized.parse::<f64>() {
        Ok(mass) if mass.is_finite() => mass,
        _ => {
            warn!("Mass input '{}' is not a number, saving 0", text);
            0.0
        }
    }
}
