//! Хранилище заявок
//!
//! Каждое действие делает один запрос к API и по его завершении
//! обновляет состояние. Деталь заявки никогда не правится локально:
//! после любой мутации она перезапрашивается целиком, потому что объём
//! CO2 пересчитывает сервер.
//!
//! Итог мутации определяется только её собственным запросом. Ошибка
//! последующего перезапроса записывается в `error`, но мутацию не отменяет.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::CarbonateApi;
use crate::error::ApiError;
use crate::events::{AuthEvent, EventBus, SubscriptionId};
use crate::models::*;

/// Состояние заявок
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarbonateState {
    /// Текущий черновик пользователя
    pub current_carbonate_id: Option<i64>,
    /// Сколько кислот в текущем черновике
    pub current_acid_count: u32,
    pub detail: Option<CarbonateDetail>,
    pub list: Vec<CarbonateListEntry>,
    /// Есть незавершённые запросы
    pub loading: bool,
    /// Ошибка последнего завершившегося запроса
    pub error: Option<ApiError>,
    in_flight: usize,
}

impl CarbonateState {
    /// Забыть всё, что относится к сессии пользователя
    fn clear_session(&mut self) {
        self.current_carbonate_id = None;
        self.current_acid_count = 0;
        self.detail = None;
        self.list.clear();
    }

    fn begin(&mut self) {
        self.in_flight += 1;
        self.loading = true;
    }

    fn settle(&mut self, error: Option<ApiError>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.loading = self.in_flight > 0;
        self.error = error;
    }
}

/// Хранилище заявок
pub struct CarbonateStore {
    api: Arc<dyn CarbonateApi>,
    state: Arc<watch::Sender<CarbonateState>>,
    bus: Arc<EventBus>,
    subscription: SubscriptionId,
}

impl CarbonateStore {
    /// Создать хранилище и подписать его на выход из сессии
    pub fn new(api: Arc<dyn CarbonateApi>, bus: Arc<EventBus>) -> Self {
        let (sender, _) = watch::channel(CarbonateState::default());
        let state = Arc::new(sender);

        let weak = Arc::downgrade(&state);
        let subscription = bus.subscribe(move |event| {
            if *event == AuthEvent::LogoutCompleted {
                if let Some(state) = weak.upgrade() {
                    info!("Logout completed, clearing carbonate state");
                    state.send_modify(CarbonateState::clear_session);
                }
            }
        });

        Self {
            api,
            state,
            bus,
            subscription,
        }
    }

    /// Снимок состояния
    pub fn snapshot(&self) -> CarbonateState {
        self.state.borrow().clone()
    }

    /// Подписка на изменения состояния
    pub fn subscribe(&self) -> watch::Receiver<CarbonateState> {
        self.state.subscribe()
    }

    fn detail_id(&self) -> Option<i64> {
        self.state.borrow().detail.as_ref().map(|d| d.id)
    }

    /// Run one request with the loading/error lifecycle; `apply` runs in the
    /// same state transaction as the settle on success
    async fn run<T, Fut>(
        &self,
        action: &'static str,
        request: Fut,
        apply: impl FnOnce(&mut CarbonateState, &T),
    ) -> Result<T, ApiError>
    where
        Fut: Future<Output = Result<T, ApiError>>,
    {
        debug!(action, "Carbonate action started");
        self.state.send_modify(CarbonateState::begin);

        let result = request.await;

        self.state.send_modify(|state| match &result {
            Ok(value) => {
                apply(state, value);
                state.settle(None);
            }
            Err(err) => state.settle(Some(err.clone())),
        });

        if let Err(err) = &result {
            warn!(action, error = %err, "Carbonate action failed");
        }
        result
    }

    /// Refetch after a mutation that already succeeded on the server
    async fn follow_up<T>(
        &self,
        action: &'static str,
        refetch: impl Future<Output = Result<T, ApiError>>,
    ) {
        if let Err(err) = refetch.await {
            debug!(action, error = %err, "Refetch after mutation failed");
        }
    }

    /// Обновить сводку по текущему черновику
    pub async fn fetch_current_carbonate_info(&self) -> Result<CurrentCarbonateInfo, ApiError> {
        self.run("fetch_current_info", self.api.current_carbonate(), |state, info| {
            state.current_carbonate_id = info.carbonate_id.filter(|id| *id != 0);
            state.current_acid_count = info.acid_count.unwrap_or(0);
        })
        .await
    }

    /// Загрузить список заявок; список заменяется целиком
    pub async fn fetch_carbonates_list(&self, filter: &ListFilter) -> Result<(), ApiError> {
        self.run("fetch_list", self.api.list_carbonates(filter), |state, list| {
            state.list = list.clone();
        })
        .await
        .map(|list| debug!("Fetched {} carbonates", list.len()))
    }

    /// Загрузить заявку по id
    pub async fn fetch_carbonate_detail(&self, id: i64) -> Result<(), ApiError> {
        self.run("fetch_detail", self.api.carbonate_detail(id), |state, detail| {
            state.detail = Some(detail.clone());
        })
        .await
        .map(|_| ())
    }

    /// Перезагрузить деталь, если она открыта
    async fn refresh_detail(&self, action: &'static str) {
        if let Some(id) = self.detail_id() {
            self.follow_up(action, self.fetch_carbonate_detail(id)).await;
        }
    }

    async fn refresh_current(&self, action: &'static str) {
        self.follow_up(action, self.fetch_current_carbonate_info()).await;
    }

    pub async fn add_acid_to_carbonate(&self, acid_id: i64) -> Result<(), ApiError> {
        self.run("add_acid", self.api.add_acid(acid_id), |_, _| {})
            .await?;
        self.refresh_current("add_acid").await;
        Ok(())
    }

    pub async fn remove_acid_from_carbonate(&self, acid_id: i64) -> Result<(), ApiError> {
        self.run("remove_acid", self.api.remove_acid(acid_id), |_, _| {})
            .await?;
        self.refresh_detail("remove_acid").await;
        Ok(())
    }

    pub async fn update_acid_mass(&self, acid_id: i64, mass: f64) -> Result<(), ApiError> {
        self.run("update_acid_mass", self.api.update_acid_mass(acid_id, mass), |_, _| {})
            .await?;
        self.refresh_detail("update_acid_mass").await;
        Ok(())
    }

    /// Изменить массу CaCO3 открытой заявки (или текущего черновика)
    pub async fn update_carbonate_mass(&self, mass: f64) -> Result<(), ApiError> {
        let target = {
            let state = self.state.borrow();
            state
                .detail
                .as_ref()
                .map(|d| d.id)
                .or(state.current_carbonate_id)
        };

        let Some(id) = target else {
            warn!("No carbonate draft to update mass for");
            self.state.send_modify(|state| state.error = Some(ApiError::NoDraft));
            return Err(ApiError::NoDraft);
        };

        self.run(
            "update_carbonate_mass",
            self.api.update_carbonate_mass(id, mass),
            |_, _| {},
        )
        .await?;
        self.refresh_detail("update_carbonate_mass").await;
        Ok(())
    }

    /// Сформировать текущий черновик
    pub async fn submit_carbonate_form(&self) -> Result<(), ApiError> {
        self.run("submit_form", self.api.submit_form(), |state, _| {
            state.current_carbonate_id = None;
            state.current_acid_count = 0;
            state.detail = None;
        })
        .await?;
        self.refresh_current("submit_form").await;
        Ok(())
    }

    pub async fn delete_carbonate(&self, id: i64) -> Result<(), ApiError> {
        self.run("delete", self.api.delete_carbonate(id), |_, _| {})
            .await?;
        self.refresh_current("delete").await;
        Ok(())
    }

    /// Сменить статус; список после этого перезапрашивает вызывающий
    pub async fn set_carbonate_status(&self, id: i64, status: CarbonateStatus) -> Result<(), ApiError> {
        self.run("set_status", self.api.set_carbonate_status(id, status), |_, _| {})
            .await
    }

    /// Сбросить открытую заявку
    pub fn reset_detail(&self) {
        self.state.send_modify(|state| state.detail = None);
    }
}

impl Drop for CarbonateStore {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.subscription);
    }
}
