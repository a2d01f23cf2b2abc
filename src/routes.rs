//! Маршруты интерфейса

use std::fmt;

/// Экран, на который ведёт ссылка или действие
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Acids,
    Login,
    Profile,
    CarbonateList,
    CarbonateDetail(i64),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Acids => "/acids".to_string(),
            Route::Login => "/login".to_string(),
            Route::Profile => "/profile".to_string(),
            Route::CarbonateList => "/carbonates".to_string(),
            Route::CarbonateDetail(id) => format!("/carbonates/{}", id),
        }
    }

    /// Подпись ссылки в навигации
    pub fn label(&self) -> &'static str {
        match self {
            Route::Home => "Домой",
            Route::Acids => "Кислоты",
            Route::Login => "Вход",
            Route::Profile => "Профиль",
            Route::CarbonateList => "Мои заявки",
            Route::CarbonateDetail(_) => "Заявка",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
