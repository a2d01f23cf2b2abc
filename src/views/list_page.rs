//! Список заявок с фильтрами, автообновлением и модерацией

use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use super::{Confirm, ViewError};
use crate::error::ApiError;
use crate::models::*;
use crate::routes::Route;
use crate::state::CarbonateStore;

/// Источник сегодняшней даты
pub type Today = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Фильтры страницы. Автор фильтруется только на клиенте
#[derive(Debug, Clone, PartialEq)]
pub struct ListFilters {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub status: Option<CarbonateStatus>,
    pub creator: String,
}

impl ListFilters {
    pub fn for_day(day: NaiveDate) -> Self {
        Self {
            date_from: day,
            date_to: day,
            status: None,
            creator: String::new(),
        }
    }

    /// Часть фильтра, которая уходит на сервер
    pub fn to_query(&self) -> ListFilter {
        ListFilter {
            status: self.status,
            date_from: Some(self.date_from),
            date_to: Some(self.date_to),
        }
    }
}

/// Смена статуса, доступная модератору
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAction {
    Finish,
    Reject,
}

impl StatusAction {
    pub fn target(self) -> CarbonateStatus {
        match self {
            StatusAction::Finish => CarbonateStatus::Finished,
            StatusAction::Reject => CarbonateStatus::Rejected,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            StatusAction::Finish => "Завершить и рассчитать",
            StatusAction::Reject => "Отклонить",
        }
    }
}

/// Строка таблицы
#[derive(Debug, Clone, PartialEq)]
pub struct ListRow {
    pub id: i64,
    pub date: String,
    /// Только для модератора
    pub creator: Option<String>,
    pub mass: String,
    pub acid_count: i64,
    pub status: StatusBadge,
    pub actions: Vec<StatusAction>,
}

/// Страница целиком
#[derive(Debug, Clone, PartialEq)]
pub struct ListView {
    pub heading: &'static str,
    pub breadcrumb: &'static str,
    pub loading: bool,
    pub column_count: usize,
    /// Варианты фильтра по статусу
    pub status_options: Vec<(Option<CarbonateStatus>, &'static str)>,
    pub rows: Vec<ListRow>,
    pub empty_message: Option<&'static str>,
}

/// Страница списка заявок
pub struct CarbonatesListPage {
    store: Arc<CarbonateStore>,
    filters: Arc<RwLock<ListFilters>>,
    is_admin: bool,
    poll_interval: Duration,
    today: Today,
    poller: Option<JoinHandle<()>>,
}

impl CarbonatesListPage {
    pub fn new(store: Arc<CarbonateStore>, viewer: Option<&User>, poll_interval: Duration) -> Self {
        let today: Today = Arc::new(|| Local::now().date_naive());

        Self {
            store,
            filters: Arc::new(RwLock::new(ListFilters::for_day(today()))),
            is_admin: viewer.is_some_and(User::is_admin),
            poll_interval,
            today,
            poller: None,
        }
    }

    /// Подменить источник даты (для сброса фильтров)
    pub fn with_today(mut self, today: Today) -> Self {
        self.set_filters(ListFilters::for_day(today()));
        self.today = today;
        self
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn filters(&self) -> ListFilters {
        read_filters(&self.filters)
    }

    fn set_filters(&self, filters: ListFilters) {
        if let Ok(mut current) = self.filters.write() {
            *current = filters;
        }
    }

    fn edit_filters(&self, edit: impl FnOnce(&mut ListFilters)) {
        if let Ok(mut current) = self.filters.write() {
            edit(&mut current);
        }
    }

    pub fn set_date_from(&self, date: NaiveDate) {
        self.edit_filters(|f| f.date_from = date);
    }

    pub fn set_date_to(&self, date: NaiveDate) {
        self.edit_filters(|f| f.date_to = date);
    }

    pub fn set_status(&self, status: Option<CarbonateStatus>) {
        self.edit_filters(|f| f.status = status);
    }

    pub fn set_creator(&self, creator: &str) {
        self.edit_filters(|f| f.creator = creator.to_string());
    }

    /// Показать страницу: сразу загрузить список и запустить опрос.
    /// Такты опроса отсчитываются от момента показа, а не от ответа
    pub async fn mount(&mut self) -> Result<(), ApiError> {
        self.unmount();

        let mounted_at = Instant::now();
        let result = self.search().await;

        let store = self.store.clone();
        let filters = self.filters.clone();
        let period = self.poll_interval;

        info!("Polling carbonate list every {:?}", period);
        self.poller = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(mounted_at + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                // Each tick fires independently of requests still in flight
                let filter = read_filters(&filters).to_query();
                let store = store.clone();
                tokio::spawn(async move {
                    if let Err(err) = store.fetch_carbonates_list(&filter).await {
                        debug!(error = %err, "Polling fetch failed");
                    }
                });
            }
        }));

        result
    }

    /// Скрыть страницу: остановить опрос
    pub fn unmount(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.abort();
            debug!("Carbonate list polling stopped");
        }
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(|p| !p.is_finished())
    }

    /// Запросить список с текущими фильтрами
    pub async fn search(&self) -> Result<(), ApiError> {
        let filter = self.filters().to_query();
        self.store.fetch_carbonates_list(&filter).await
    }

    /// Вернуть фильтры к сегодняшнему дню и перезапросить
    pub async fn reset(&self) -> Result<(), ApiError> {
        self.set_filters(ListFilters::for_day((self.today)()));
        self.search().await
    }

    /// Открыть заявку по клику на строку
    pub fn open_row(&self, id: i64) -> Route {
        Route::CarbonateDetail(id)
    }

    /// Сменить статус заявки после подтверждения.
    ///
    /// Возвращает `Ok(false)`, если пользователь отказался. Клик по кнопке
    /// не открывает заявку, поэтому навигации здесь нет. Ошибка
    /// перезапроса списка остаётся в состоянии хранилища и не отменяет
    /// уже выполненную смену статуса.
    pub async fn change_status(
        &self,
        id: i64,
        action: StatusAction,
        confirm: &dyn Confirm,
    ) -> Result<bool, ViewError> {
        if !self.is_admin {
            return Err(ViewError::NotAdmin);
        }

        let accepts = self
            .store
            .snapshot()
            .list
            .iter()
            .any(|e| e.id == id && e.status() == Some(CarbonateStatus::Created));
        if !accepts {
            return Err(ViewError::ActionUnavailable(id));
        }

        let target = action.target();
        let message = format!(
            "Вы уверены, что хотите перевести заявку {} в статус \"{}\"?",
            id,
            target.as_wire()
        );
        if !confirm.confirm(&message) {
            debug!("Status change for carbonate {} cancelled", id);
            return Ok(false);
        }

        self.store.set_carbonate_status(id, target).await?;
        if let Err(err) = self.search().await {
            debug!(error = %err, "List refresh after status change failed");
        }
        Ok(true)
    }

    /// Строки с учётом клиентского фильтра по автору
    pub fn rows(&self) -> Vec<ListRow> {
        let creator = self.filters().creator.to_lowercase();

        self.store
            .snapshot()
            .list
            .iter()
            .filter(|entry| {
                !self.is_admin
                    || creator.is_empty()
                    || entry
                        .creator
                        .as_deref()
                        .is_some_and(|c| c.to_lowercase().contains(&creator))
            })
            .map(|entry| self.render_row(entry))
            .collect()
    }

    fn render_row(&self, entry: &CarbonateListEntry) -> ListRow {
        let actions = if self.is_admin && entry.status() == Some(CarbonateStatus::Created) {
            vec![StatusAction::Finish, StatusAction::Reject]
        } else {
            Vec::new()
        };

        ListRow {
            id: entry.id,
            date: format_date(entry.date_create.as_deref()),
            creator: self
                .is_admin
                .then(|| entry.creator.clone().unwrap_or_else(|| "Unknown".to_string())),
            mass: match entry.mass {
                Some(mass) if mass != 0.0 => format!("{} г", mass),
                _ => "-".to_string(),
            },
            acid_count: entry.calculated.unwrap_or(0),
            status: status_badge(entry.status.as_deref()),
            actions,
        }
    }

    pub fn view(&self) -> ListView {
        let rows = self.rows();
        let empty_message = rows.is_empty().then_some("Заявок не найдено");

        ListView {
            heading: if self.is_admin {
                "Управление заявками"
            } else {
                "История расчетов"
            },
            breadcrumb: if self.is_admin {
                "Панель модератора"
            } else {
                "Мои заявки"
            },
            loading: self.store.snapshot().loading,
            column_count: if self.is_admin { 7 } else { 5 },
            status_options: std::iter::once((None, "Все"))
                .chain(CarbonateStatus::ALL.map(|s| (Some(s), s.label())))
                .collect(),
            rows,
            empty_message,
        }
    }
}

impl Drop for CarbonatesListPage {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn read_filters(filters: &RwLock<ListFilters>) -> ListFilters {
    match filters.read() {
        Ok(f) => f.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Дата создания в виде `ДД.ММ.ГГГГ, ЧЧ:ММ`
pub fn format_date(raw: Option<&str>) -> String {
    let Some(raw) = raw.filter(|s| !s.is_empty()) else {
        return "-".to_string();
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%d.%m.%Y, %H:%M").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format("%d.%m.%Y, %H:%M").to_string();
    }
    raw.to_string()
}
